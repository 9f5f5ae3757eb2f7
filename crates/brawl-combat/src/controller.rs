//! Per-fighter combat controller.
//!
//! Wires the combo tracker, move selection, the attack scheduler and hit
//! resolution together and drives them from one `tick` call per frame.
//!
//! Each tick runs, in order:
//! 1. combo expiry
//! 2. armed hits due by `now` (resolution, heavy combo break)
//! 3. session expiry (movement and vertical lock release)
//! 4. intents: block, air aim sampling, then attack start
//!
//! A started attack whose hit delay is zero fires on the same tick.
//!
//! Steps 1 to 3 also run while the controller is disabled, so a hit armed
//! before `set_enabled(false)` still lands.

use std::sync::Arc;

use brawl_common::{EntityId, Vec2};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::combo::{ComboConfig, ComboResetCause, ComboTracker};
use crate::events::CombatEvent;
use crate::hit::{resolve_hit, HitQuery, HitReport};
use crate::intent::InputFrame;
use crate::moves::{AirAim, MoveFamily, MoveTable};
use crate::ports::{AnimationBridge, Damageable, LayerMask, Locomotion, SpatialQuery};
use crate::scheduler::{AttackRefused, AttackScheduler, AttackSession, FighterState, PendingHit};
use crate::selector::select_move;

/// Controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Combo window and length.
    pub combo: ComboConfig,
    /// Radius of the hit circle.
    pub attack_radius: f32,
    /// Offset of the hit circle from the fighter, mirrored by facing.
    pub attack_offset: Vec2,
    /// Layers a hit can strike.
    pub target_layers: LayerMask,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            combo: ComboConfig::default(),
            attack_radius: 3.0,
            attack_offset: Vec2::ZERO,
            target_layers: LayerMask::ALL,
        }
    }
}

impl ControllerConfig {
    /// Set the combo configuration.
    #[must_use]
    pub fn with_combo(mut self, combo: ComboConfig) -> Self {
        self.combo = combo;
        self
    }

    /// Set the hit radius.
    #[must_use]
    pub fn with_attack_radius(mut self, radius: f32) -> Self {
        self.attack_radius = radius;
        self
    }

    /// Set the hit offset (for a fighter facing right).
    #[must_use]
    pub fn with_attack_offset(mut self, offset: Vec2) -> Self {
        self.attack_offset = offset;
        self
    }

    /// Set the layers a hit can strike.
    #[must_use]
    pub fn with_target_layers(mut self, layers: LayerMask) -> Self {
        self.target_layers = layers;
        self
    }
}

/// What happened during one `tick`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Attack started this tick.
    pub started: Option<AttackSession>,
    /// Attack intent dropped this tick.
    pub refused: Option<AttackRefused>,
    /// Targets struck by hits that fired this tick.
    pub hits: Vec<HitReport>,
    /// Combo resets that happened this tick.
    pub combo_resets: Vec<ComboResetCause>,
}

impl TickReport {
    /// Total damage dealt this tick.
    #[must_use]
    pub fn total_damage(&self) -> f32 {
        self.hits.iter().map(|h| h.damage).sum()
    }
}

/// Combat brain of one fighter.
#[derive(Debug)]
pub struct CombatController<L, A> {
    owner: EntityId,
    locomotion: L,
    animation: A,
    moves: Arc<MoveTable>,
    config: ControllerConfig,
    combo: ComboTracker,
    scheduler: AttackScheduler,
    air_aim: AirAim,
    enabled: bool,
    events: Option<Sender<CombatEvent>>,
}

impl<L: Locomotion, A: AnimationBridge> CombatController<L, A> {
    /// Create a controller for `owner` with its collaborators.
    pub fn new(
        owner: EntityId,
        locomotion: L,
        animation: A,
        moves: Arc<MoveTable>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            owner,
            locomotion,
            animation,
            moves,
            combo: ComboTracker::new(config.combo.clone()),
            scheduler: AttackScheduler::new(owner),
            config,
            air_aim: AirAim::Neutral,
            enabled: true,
            events: None,
        }
    }

    /// Publish combat events to `sender`.
    #[must_use]
    pub fn with_events(mut self, sender: Sender<CombatEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Fighter this controller drives.
    #[must_use]
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Combo tracker.
    #[must_use]
    pub fn combo(&self) -> &ComboTracker {
        &self.combo
    }

    /// Attack scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &AttackScheduler {
        &self.scheduler
    }

    /// Current action state.
    #[must_use]
    pub fn state(&self) -> &FighterState {
        self.scheduler.state()
    }

    /// Air aim sampled on the last tick.
    #[must_use]
    pub fn air_aim(&self) -> AirAim {
        self.air_aim
    }

    /// Move table in use.
    #[must_use]
    pub fn moves(&self) -> &MoveTable {
        &self.moves
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Locomotion collaborator.
    #[must_use]
    pub fn locomotion(&self) -> &L {
        &self.locomotion
    }

    /// Mutable locomotion collaborator.
    pub fn locomotion_mut(&mut self) -> &mut L {
        &mut self.locomotion
    }

    /// Animation collaborator.
    #[must_use]
    pub fn animation(&self) -> &A {
        &self.animation
    }

    /// Check if intents are processed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable intent processing. Armed hits fire either way.
    ///
    /// Disabling releases a held block.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.release_block();
        }
        self.enabled = enabled;
    }

    /// Stagger hook: being hit drops the current combo.
    pub fn on_hit_received(&mut self) {
        if self.combo.force_reset() {
            self.combo_reset(ComboResetCause::Forced, &mut Vec::new());
        }
    }

    /// Advance the fighter to `now`.
    pub fn tick<W>(&mut self, now: f32, input: &InputFrame, world: &mut W) -> TickReport
    where
        W: SpatialQuery + Damageable + ?Sized,
    {
        let mut report = TickReport::default();

        if let Some(cause) = self.combo.tick(now) {
            self.combo_reset(cause, &mut report.combo_resets);
        }

        self.settle(now, &mut *world, &mut report);

        if !self.enabled {
            return report;
        }

        self.update_block(input.block);
        self.sample_air_aim(input.aim);

        if let Some(intent) = input.attack() {
            let grounded = self.locomotion.is_grounded();
            let index = self.combo.count() as usize;
            let selection = select_move(
                &self.moves,
                grounded,
                intent.strength(),
                index,
                self.air_aim,
            );

            match self.scheduler.begin_attack(selection, now) {
                Ok(session) => {
                    self.start_attack(&session, now, &mut report);
                    report.started = Some(session);
                    // A zero hit delay is already due.
                    self.settle(now, &mut *world, &mut report);
                },
                Err(reason) => {
                    debug!("{} dropped {:?}: {}", self.owner, intent, reason);
                    self.emit(CombatEvent::AttackRefused {
                        fighter: self.owner,
                        reason,
                    });
                    report.refused = Some(reason);
                },
            }
        }

        report
    }

    /// Fire hits due by `now`, then release elapsed locks and sessions.
    fn settle<W>(&mut self, now: f32, world: &mut W, report: &mut TickReport)
    where
        W: SpatialQuery + Damageable + ?Sized,
    {
        for fired in self.scheduler.due_hits(now) {
            self.fire_hit(&fired.payload, &mut *world, report);
        }

        let released = self.scheduler.tick(now);
        if released.vertical_released {
            self.locomotion.set_vertical_lock(false);
        }
        if let Some(done) = released.finished {
            if done.movement_locked {
                self.locomotion.set_movement_enabled(true);
            }
            trace!("{} finished {} at {:.3}", self.owner, done.mv, now);
        }
    }

    fn start_attack(&mut self, session: &AttackSession, now: f32, report: &mut TickReport) {
        debug!(
            "{} started {:?}[{}] {} at {:.3}",
            self.owner, session.family, session.combo_index, session.mv, now
        );

        self.animation.set_combo_index(session.combo_index);
        if session.family.is_heavy() {
            self.animation.trigger_heavy_punch();
        } else {
            self.animation.trigger_punch();
        }

        if session.movement_locked {
            self.locomotion.set_movement_enabled(false);
        }
        if session.vertical_lock_until.is_some() {
            self.locomotion.set_vertical_lock(true);
        }

        match session.family {
            MoveFamily::RegularGrounded => {
                if let Some(cause) = self.combo.on_grounded_hit(now) {
                    self.combo_reset(cause, &mut report.combo_resets);
                }
            },
            MoveFamily::RegularAir => self.combo.on_air_hit(now),
            _ => {},
        }

        self.emit(CombatEvent::AttackStarted {
            fighter: self.owner,
            family: session.family,
            index: session.combo_index,
            at: now,
        });
    }

    fn fire_hit<W>(&mut self, pending: &PendingHit, world: &mut W, report: &mut TickReport)
    where
        W: SpatialQuery + Damageable + ?Sized,
    {
        let Some(position) = self.locomotion.position() else {
            debug!("{} is gone, dropping {:?} hit", self.owner, pending.family);
            return;
        };

        let facing = self.locomotion.facing();
        let offset = self.config.attack_offset;
        let query = HitQuery {
            origin: position + Vec2::new(offset.x * facing, offset.y),
            radius: self.config.attack_radius,
            attacker: self.owner,
            layers: self.config.target_layers,
        };

        let hits = resolve_hit(world, &query, &pending.mv, facing);
        if !hits.is_empty() {
            info!(
                "{} {} struck {} target(s) for {}",
                self.owner,
                pending.mv,
                hits.len(),
                pending.mv.damage()
            );
        }

        // A landed or whiffed heavy ends the grounded chain.
        if pending.family == MoveFamily::HeavyGrounded && self.combo.force_reset() {
            self.combo_reset(ComboResetCause::Forced, &mut report.combo_resets);
        }

        self.emit(CombatEvent::HitResolved {
            fighter: self.owner,
            family: pending.family,
            targets: hits.iter().map(|h| h.target).collect(),
            damage: pending.mv.damage(),
        });
        report.hits.extend(hits);
    }

    fn update_block(&mut self, held: bool) {
        if held {
            if self.scheduler.begin_block() {
                self.locomotion.set_movement_enabled(false);
                self.animation.set_blocking(true);
                self.emit(CombatEvent::BlockChanged {
                    fighter: self.owner,
                    blocking: true,
                });
            }
        } else {
            self.release_block();
        }
    }

    fn release_block(&mut self) {
        if self.scheduler.end_block() {
            self.locomotion.set_movement_enabled(true);
            self.animation.set_blocking(false);
            self.emit(CombatEvent::BlockChanged {
                fighter: self.owner,
                blocking: false,
            });
        }
    }

    fn sample_air_aim(&mut self, axis: f32) {
        let aim = if self.locomotion.is_grounded() {
            AirAim::Neutral
        } else {
            AirAim::from_axis(axis)
        };
        if aim != self.air_aim {
            self.air_aim = aim;
            self.animation.set_air_aim_direction(aim.sign());
        }
    }

    fn combo_reset(&mut self, cause: ComboResetCause, resets: &mut Vec<ComboResetCause>) {
        trace!("{} combo reset: {:?}", self.owner, cause);
        self.animation.set_combo_index(0);
        self.emit(CombatEvent::ComboReset {
            fighter: self.owner,
            cause,
        });
        resets.push(cause);
    }

    fn emit(&self, event: CombatEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.try_send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::intent::InputFrame;
    use crate::moves::Move;
    use crate::ports::mock::{AnimSignal, MockAnimation, MockLocomotion, MockWorld};
    use crate::scheduler::AttackPhase;

    type TestController = CombatController<MockLocomotion, MockAnimation>;

    fn fighter() -> EntityId {
        EntityId::from_raw(1)
    }

    fn dummy() -> EntityId {
        EntityId::from_raw(2)
    }

    fn controller(config: ControllerConfig) -> TestController {
        CombatController::new(
            fighter(),
            MockLocomotion::default(),
            MockAnimation::default(),
            Arc::new(MoveTable::standard()),
            config,
        )
    }

    fn with_move(family: MoveFamily, mv: Move) -> TestController {
        let families = MoveFamily::ALL.map(|f| {
            if f == family {
                vec![mv.clone()]
            } else {
                MoveTable::standard().family(f).to_vec()
            }
        });
        CombatController::new(
            fighter(),
            MockLocomotion::default(),
            MockAnimation::default(),
            Arc::new(MoveTable::from_families(families).unwrap()),
            ControllerConfig::default(),
        )
    }

    fn world() -> MockWorld {
        let mut world = MockWorld::default();
        world.add_body(fighter(), Vec2::ZERO, 100.0);
        world.add_body(dummy(), Vec2::new(1.0, 0.0), 100.0);
        world
    }

    #[test]
    fn test_light_attack_timeline() {
        let mut ctl = controller(ControllerConfig::default());
        let mut world = world();

        let report = ctl.tick(0.0, &InputFrame::light(), &mut world);
        let started = report.started.unwrap();
        assert_eq!(started.family, MoveFamily::RegularGrounded);
        assert_eq!(started.mv.damage(), 15.0);

        let report = ctl.tick(0.16, &InputFrame::idle(), &mut world);
        assert!(report.hits.is_empty());
        assert_eq!(world.hp(dummy()), 100.0);

        let report = ctl.tick(0.17, &InputFrame::idle(), &mut world);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(world.hp(dummy()), 85.0);
        assert_eq!(world.hp(fighter()), 100.0);
        assert_eq!(
            ctl.scheduler().session().unwrap().phase,
            AttackPhase::Recovery
        );

        let report = ctl.tick(0.2, &InputFrame::light(), &mut world);
        assert!(matches!(
            report.refused,
            Some(AttackRefused::OnCooldown { .. })
        ));

        let report = ctl.tick(0.33, &InputFrame::light(), &mut world);
        assert!(report.started.is_some());
    }

    #[test]
    fn test_air_heavy_aimed_down_ignores_combo() {
        let config = ControllerConfig::default().with_combo(ComboConfig::new(100.0, 3));
        let mut ctl = controller(config);
        let mut world = world();

        ctl.tick(0.0, &InputFrame::light(), &mut world);
        assert_eq!(ctl.combo().count(), 1);

        ctl.locomotion_mut().grounded = false;
        let report = ctl.tick(0.5, &InputFrame::heavy().with_aim(-1.0), &mut world);
        let started = report.started.unwrap();
        assert_eq!(started.family, MoveFamily::HeavyAirDown);
        assert_eq!(started.combo_index, 0);
        assert_eq!(ctl.combo().count(), 1);
        assert_eq!(ctl.air_aim(), AirAim::Down);
        assert!(ctl.animation().signals.contains(&AnimSignal::AirAim(-1)));
        assert!(ctl.animation().signals.contains(&AnimSignal::HeavyPunch));

        assert!(ctl.locomotion().vertical_locked);
        assert!(!ctl.locomotion().movement_enabled);

        ctl.tick(1.0, &InputFrame::idle(), &mut world);
        assert!(!ctl.locomotion().vertical_locked);
        assert!(!ctl.locomotion().movement_enabled);
        assert_eq!(ctl.combo().count(), 1);

        ctl.tick(2.0, &InputFrame::idle(), &mut world);
        assert!(ctl.locomotion().movement_enabled);
        assert_eq!(ctl.state(), &FighterState::Idle);
    }

    #[test]
    fn test_three_lights_wrap_combo() {
        let mut ctl = controller(ControllerConfig::default());
        let mut world = world();

        let mut indices = Vec::new();
        for now in [0.0, 0.5, 1.0] {
            let report = ctl.tick(now, &InputFrame::light(), &mut world);
            indices.push(report.started.unwrap().combo_index);
            if now < 1.0 {
                assert!(report.combo_resets.is_empty());
            } else {
                assert_eq!(report.combo_resets, vec![ComboResetCause::MaxReached]);
            }
        }

        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(ctl.combo().count(), 0);
        assert_eq!(
            ctl.animation().signals.last(),
            Some(&AnimSignal::ComboIndex(0))
        );
    }

    #[test]
    fn test_combo_expires_between_lights() {
        let mut ctl = controller(ControllerConfig::default());
        let mut world = world();

        ctl.tick(0.0, &InputFrame::light(), &mut world);
        let report = ctl.tick(1.5, &InputFrame::light(), &mut world);
        assert_eq!(report.combo_resets, vec![ComboResetCause::Expired]);
        assert_eq!(report.started.unwrap().combo_index, 0);
    }

    #[test]
    fn test_heavy_grounded_locks_movement_and_breaks_combo() {
        let bus = EventBus::default();
        let mut ctl = controller(ControllerConfig::default()).with_events(bus.sender());
        let mut world = world();

        ctl.tick(0.0, &InputFrame::light(), &mut world);
        let report = ctl.tick(0.5, &InputFrame::heavy(), &mut world);
        let started = report.started.unwrap();
        assert_eq!(started.family, MoveFamily::HeavyGrounded);
        assert_eq!(started.combo_index, 1);
        assert!(!ctl.locomotion().movement_enabled);
        assert_eq!(ctl.combo().count(), 1);

        let report = ctl.tick(1.0, &InputFrame::idle(), &mut world);
        assert_eq!(report.combo_resets, vec![ComboResetCause::Forced]);
        assert_eq!(world.hp(dummy()), 100.0 - 15.0 - 35.0);
        assert!(!ctl.locomotion().movement_enabled);

        ctl.tick(2.0, &InputFrame::idle(), &mut world);
        assert!(ctl.locomotion().movement_enabled);

        let events = bus.drain();
        assert!(events.contains(&CombatEvent::ComboReset {
            fighter: fighter(),
            cause: ComboResetCause::Forced,
        }));
        let hits = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::HitResolved { .. }))
            .count();
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_block_refuses_attacks_and_restores_movement() {
        let mut ctl = controller(ControllerConfig::default());
        let mut world = world();

        ctl.tick(0.0, &InputFrame::idle().with_block(), &mut world);
        assert_eq!(ctl.state(), &FighterState::Blocking);
        assert!(!ctl.locomotion().movement_enabled);

        let report = ctl.tick(0.1, &InputFrame::light().with_block(), &mut world);
        assert_eq!(report.refused, Some(AttackRefused::Blocking));

        ctl.tick(0.2, &InputFrame::idle(), &mut world);
        assert!(ctl.locomotion().movement_enabled);
        assert_eq!(
            ctl.animation().signals,
            vec![AnimSignal::Blocking(true), AnimSignal::Blocking(false)]
        );
    }

    #[test]
    fn test_disabled_controller_still_lands_armed_hit() {
        let mut ctl = controller(ControllerConfig::default());
        let mut world = world();

        ctl.tick(0.0, &InputFrame::light(), &mut world);
        ctl.set_enabled(false);

        let report = ctl.tick(0.5, &InputFrame::light(), &mut world);
        assert!(report.started.is_none());
        assert_eq!(report.hits.len(), 1);
        assert_eq!(world.hp(dummy()), 85.0);
    }

    #[test]
    fn test_torn_down_attacker_hit_is_noop() {
        let mut ctl = controller(ControllerConfig::default());
        let mut world = world();

        ctl.tick(0.0, &InputFrame::light(), &mut world);
        ctl.locomotion_mut().position = None;

        let report = ctl.tick(0.2, &InputFrame::idle(), &mut world);
        assert!(report.hits.is_empty());
        assert_eq!(world.hp(dummy()), 100.0);
    }

    #[test]
    fn test_offset_is_mirrored_by_facing() {
        let config = ControllerConfig::default()
            .with_attack_radius(0.5)
            .with_attack_offset(Vec2::new(1.0, 0.0));
        let mut ctl = controller(config);
        let mut world = world();
        let behind = EntityId::from_raw(3);
        world.add_body(behind, Vec2::new(-1.0, 0.0), 100.0);

        ctl.locomotion_mut().facing = -1.0;
        ctl.tick(0.0, &InputFrame::light(), &mut world);
        let report = ctl.tick(0.2, &InputFrame::idle(), &mut world);

        assert_eq!(report.hits.len(), 1);
        assert_eq!(report.hits[0].target, behind);
        assert_eq!(report.hits[0].knockback.x, -2.0);
        assert_eq!(world.hp(dummy()), 100.0);
    }

    #[test]
    fn test_on_hit_received_resets_combo() {
        let mut ctl = controller(ControllerConfig::default());
        let mut world = world();

        ctl.tick(0.0, &InputFrame::light(), &mut world);
        assert!(ctl.combo().is_active());
        ctl.on_hit_received();
        assert_eq!(ctl.combo().count(), 0);
    }

    #[test]
    fn test_zero_hit_delay_lands_on_start_tick() {
        let jab = Move::new(15.0, 0.33, 0.0, Vec2::X, 2.0).unwrap();
        let mut ctl = with_move(MoveFamily::RegularGrounded, jab);
        let mut world = world();

        let report = ctl.tick(0.0, &InputFrame::light(), &mut world);
        assert!(report.started.is_some());
        assert_eq!(report.hits.len(), 1);
        assert_eq!(world.hp(dummy()), 85.0);
        assert_eq!(ctl.scheduler().pending_hits(), 0);
        assert_eq!(
            ctl.scheduler().session().unwrap().phase,
            AttackPhase::Recovery
        );

        let report = ctl.tick(0.016, &InputFrame::idle(), &mut world);
        assert!(report.hits.is_empty());
        assert_eq!(world.hp(dummy()), 85.0);
    }

    #[test]
    fn test_zero_hit_delay_air_heavy_releases_vertical_lock_at_start() {
        let slam = Move::new(10.0, 0.3, 0.0, Vec2::NEG_Y, 5.0).unwrap();
        let mut ctl = with_move(MoveFamily::HeavyAirDown, slam);
        let mut world = world();
        ctl.locomotion_mut().grounded = false;

        let report = ctl.tick(0.0, &InputFrame::heavy().with_aim(-1.0), &mut world);
        assert_eq!(report.started.unwrap().family, MoveFamily::HeavyAirDown);
        assert_eq!(report.hits.len(), 1);
        assert!(!ctl.locomotion().vertical_locked);
        assert_eq!(ctl.locomotion().vertical_unlocks, 1);
        assert!(!ctl.locomotion().movement_enabled);
    }

    #[test]
    fn test_hit_at_end_of_move_resolves_before_session_ends() {
        let slam = Move::new(10.0, 0.3, 0.3, Vec2::NEG_Y, 5.0).unwrap();
        let mut ctl = with_move(MoveFamily::HeavyAirDown, slam);
        let mut world = world();
        ctl.locomotion_mut().grounded = false;

        ctl.tick(0.0, &InputFrame::heavy().with_aim(-1.0), &mut world);
        assert!(ctl.locomotion().vertical_locked);
        assert!(!ctl.locomotion().movement_enabled);

        let report = ctl.tick(0.2, &InputFrame::idle(), &mut world);
        assert!(report.hits.is_empty());
        assert!(ctl.locomotion().vertical_locked);

        let report = ctl.tick(0.3, &InputFrame::idle(), &mut world);
        assert_eq!(report.hits.len(), 1);
        assert_eq!(world.hp(dummy()), 90.0);
        assert!(!ctl.locomotion().vertical_locked);
        assert_eq!(ctl.locomotion().vertical_unlocks, 1);
        assert!(ctl.locomotion().movement_enabled);
        assert_eq!(ctl.state(), &FighterState::Idle);

        ctl.tick(0.5, &InputFrame::idle(), &mut world);
        assert_eq!(ctl.locomotion().vertical_unlocks, 1);
    }
}
