//! Training room: one scripted fighter and a set of punching dummies.
//!
//! The room is a minimal host for the combat core. It owns the bodies, answers
//! overlap queries, applies damage and knockback, integrates a little gravity
//! and drives the fighter's controller once per fixed tick.

use std::collections::HashMap;
use std::sync::Arc;

use brawl_combat::{
    AnimationBridge, CombatController, CombatEvent, ComboResetCause, Damageable, EventBus,
    FighterState, Health, LayerMask, Locomotion, MoveTable, SpatialQuery, TickReport,
};
use brawl_common::{BrawlError, BrawlResult, EntityId, Vec2};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::EngineConfig;
use crate::script::InputScript;

/// Layer of the scripted fighter.
pub const FIGHTER_LAYER: u8 = 0;
/// Layer of the dummies.
pub const DUMMY_LAYER: u8 = 1;

// ============================================================================
// World
// ============================================================================

/// A physical body in the room.
#[derive(Debug, Clone)]
pub struct Body {
    /// Center position.
    pub position: Vec2,
    /// Current velocity.
    pub velocity: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Layers the body sits on.
    pub layers: LayerMask,
    /// Hit points.
    pub health: Health,
}

/// The room's bodies, queried and mutated by hit resolution.
#[derive(Debug, Default)]
pub struct TrainingWorld {
    bodies: HashMap<EntityId, Body>,
}

impl TrainingWorld {
    /// Add a body.
    pub fn insert(&mut self, id: EntityId, body: Body) {
        self.bodies.insert(id, body);
    }

    /// Remove a body.
    pub fn remove(&mut self, id: EntityId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    /// Look up a body.
    #[must_use]
    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Number of bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if the room is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn integrate(&mut self, skip: EntityId, dt: f32, gravity: f32, damping: f32) {
        let friction = (1.0 - damping * dt).max(0.0);
        for (id, body) in &mut self.bodies {
            if *id == skip {
                continue;
            }
            if body.position.y > 0.0 || body.velocity.y > 0.0 {
                body.velocity.y -= gravity * dt;
            }
            body.position += body.velocity * dt;
            if body.position.y <= 0.0 {
                body.position.y = 0.0;
                body.velocity.y = 0.0;
                body.velocity.x *= friction;
            }
        }
    }
}

impl SpatialQuery for TrainingWorld {
    fn query_circle(&self, center: Vec2, radius: f32, layers: LayerMask) -> Vec<EntityId> {
        let mut found: Vec<EntityId> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.layers.intersects(layers))
            .filter(|(_, b)| b.position.distance(center) <= radius + b.radius)
            .map(|(id, _)| *id)
            .collect();
        found.sort();
        found
    }
}

impl Damageable for TrainingWorld {
    fn apply_damage(&mut self, target: EntityId, amount: f32) -> bool {
        let Some(body) = self.bodies.get_mut(&target) else {
            return false;
        };
        if body.health.apply_damage(amount) {
            info!("{} knocked out", target);
        }
        true
    }

    fn apply_velocity(&mut self, target: EntityId, velocity: Vec2) -> bool {
        let Some(body) = self.bodies.get_mut(&target) else {
            return false;
        };
        body.velocity = velocity;
        true
    }
}

// ============================================================================
// Fighter collaborators
// ============================================================================

/// Movement state of the scripted fighter.
#[derive(Debug, Clone)]
pub struct FighterBody {
    /// Position, `None` once despawned.
    pub position: Option<Vec2>,
    /// Velocity.
    pub velocity: Vec2,
    /// Facing sign.
    pub facing: f32,
    /// On the ground.
    pub grounded: bool,
    /// Player movement allowed.
    pub movement_enabled: bool,
    /// Vertical motion frozen.
    pub vertical_locked: bool,
}

impl FighterBody {
    /// Fighter standing at `position`.
    #[must_use]
    pub fn new(position: Vec2, facing: f32) -> Self {
        Self {
            position: Some(position),
            velocity: Vec2::ZERO,
            facing,
            grounded: true,
            movement_enabled: true,
            vertical_locked: false,
        }
    }

    /// Leave the ground. Ignored while airborne or while movement is locked.
    pub fn jump(&mut self, speed: f32) -> bool {
        if !self.grounded || !self.movement_enabled || self.position.is_none() {
            return false;
        }
        self.grounded = false;
        self.velocity.y = speed;
        true
    }

    /// Remove the fighter from the room.
    pub fn despawn(&mut self) {
        self.position = None;
    }

    fn integrate(&mut self, dt: f32, gravity: f32) {
        let Some(position) = self.position.as_mut() else {
            return;
        };
        if self.grounded {
            return;
        }
        if self.vertical_locked {
            self.velocity.y = 0.0;
        } else {
            self.velocity.y -= gravity * dt;
        }
        *position += self.velocity * dt;
        if position.y <= 0.0 {
            position.y = 0.0;
            self.velocity.y = 0.0;
            self.grounded = true;
        }
    }
}

impl Locomotion for FighterBody {
    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    fn position(&self) -> Option<Vec2> {
        self.position
    }

    fn facing(&self) -> f32 {
        self.facing
    }

    fn set_vertical_lock(&mut self, locked: bool) {
        self.vertical_locked = locked;
        if locked {
            self.velocity.y = 0.0;
        }
    }
}

/// Animation bridge that logs signals and remembers the current pose.
#[derive(Debug, Clone, Default)]
pub struct LoggingAnimator {
    /// Last combo index written.
    pub combo_index: usize,
    /// Last air aim written.
    pub air_aim: i8,
    /// Blocking pose.
    pub blocking: bool,
    /// Light punches triggered.
    pub punches: u32,
    /// Heavy punches triggered.
    pub heavy_punches: u32,
}

impl AnimationBridge for LoggingAnimator {
    fn set_combo_index(&mut self, index: usize) {
        trace!("anim combo_index = {}", index);
        self.combo_index = index;
    }

    fn trigger_punch(&mut self) {
        trace!("anim punch");
        self.punches += 1;
    }

    fn trigger_heavy_punch(&mut self) {
        trace!("anim heavy punch");
        self.heavy_punches += 1;
    }

    fn set_air_aim_direction(&mut self, sign: i8) {
        trace!("anim air_aim = {}", sign);
        self.air_aim = sign;
    }

    fn set_blocking(&mut self, blocking: bool) {
        trace!("anim blocking = {}", blocking);
        self.blocking = blocking;
    }
}

// ============================================================================
// Room
// ============================================================================

/// Totals for one training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Ticks simulated.
    pub ticks: u32,
    /// Attacks started.
    pub attacks: u32,
    /// Attack inputs dropped.
    pub refused: u32,
    /// Target hits landed.
    pub hits: u32,
    /// Damage dealt.
    pub total_damage: f32,
    /// Combos completed.
    pub combos_completed: u32,
    /// Combos dropped by timeout or reset.
    pub combos_dropped: u32,
    /// Longest combo.
    pub best_combo: u32,
    /// Remaining hit points per dummy.
    pub dummies: Vec<(EntityId, f32)>,
}

/// Fighter controller used by the room.
pub type RoomController = CombatController<FighterBody, LoggingAnimator>;

/// One fighter, some dummies, a script.
#[derive(Debug)]
pub struct TrainingRoom {
    world: TrainingWorld,
    fighter: RoomController,
    dummies: Vec<EntityId>,
    events: EventBus,
    script: InputScript,
    tick: u32,
    dt: f32,
    gravity: f32,
    jump_speed: f32,
    damping: f32,
    summary: SessionSummary,
}

impl TrainingRoom {
    /// Build the room described by `config`.
    pub fn new(config: &EngineConfig, moves: Arc<MoveTable>) -> BrawlResult<Self> {
        if config.tick_rate == 0 {
            return Err(BrawlError::Config("tick_rate must be positive".to_string()));
        }
        if config.dummy_positions.is_empty() {
            return Err(BrawlError::Config("training room needs a dummy".to_string()));
        }

        let owner = EntityId::new();
        let events = EventBus::default();
        let body = FighterBody::new(config.fighter_position, config.fighter_facing);
        let fighter = CombatController::new(
            owner,
            body,
            LoggingAnimator::default(),
            moves,
            config.controller_config(),
        )
        .with_events(events.sender());

        let mut world = TrainingWorld::default();
        world.insert(
            owner,
            Body {
                position: config.fighter_position,
                velocity: Vec2::ZERO,
                radius: 0.5,
                layers: LayerMask::layer(FIGHTER_LAYER),
                health: Health::new(100.0),
            },
        );

        let dummies: Vec<EntityId> = config
            .dummy_positions
            .iter()
            .map(|&position| {
                let id = EntityId::new();
                world.insert(
                    id,
                    Body {
                        position,
                        velocity: Vec2::ZERO,
                        radius: 0.5,
                        layers: LayerMask::layer(DUMMY_LAYER),
                        health: Health::new(config.dummy_max_hp),
                    },
                );
                id
            })
            .collect();

        info!(
            "Training room: fighter {} vs {} dummies at {} Hz",
            owner,
            dummies.len(),
            config.tick_rate
        );

        Ok(Self {
            world,
            fighter,
            dummies,
            events,
            script: config.input_script(),
            tick: 0,
            dt: config.tick_dt(),
            gravity: config.gravity,
            jump_speed: config.jump_speed,
            damping: config.knockback_damping,
            summary: SessionSummary::default(),
        })
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> f32 {
        self.tick as f32 * self.dt
    }

    /// The room's bodies.
    #[must_use]
    pub fn world(&self) -> &TrainingWorld {
        &self.world
    }

    /// The fighter's controller.
    #[must_use]
    pub fn fighter(&self) -> &RoomController {
        &self.fighter
    }

    /// Mutable access to the fighter's controller.
    pub fn fighter_mut(&mut self) -> &mut RoomController {
        &mut self.fighter
    }

    /// Dummy handles in spawn order.
    #[must_use]
    pub fn dummies(&self) -> &[EntityId] {
        &self.dummies
    }

    /// Hit points of a dummy, if it still exists.
    #[must_use]
    pub fn dummy_hp(&self, id: EntityId) -> Option<f32> {
        self.world.body(id).map(|b| b.health.current())
    }

    /// Replace the input script.
    pub fn set_script(&mut self, script: InputScript) {
        self.script = script;
    }

    /// Remove a dummy from the room.
    pub fn remove_dummy(&mut self, id: EntityId) -> bool {
        self.dummies.retain(|d| *d != id);
        self.world.remove(id).is_some()
    }

    /// Advance one tick.
    pub fn step(&mut self) -> TickReport {
        let now = self.now();
        let frame = self.script.frame_at(now);

        if frame.jump && self.fighter.locomotion_mut().jump(self.jump_speed) {
            debug!("{} jumps at {:.3}", self.fighter.owner(), now);
        }

        let owner = self.fighter.owner();
        let report = self.fighter.tick(now, &frame.input, &mut self.world);

        self.fighter.locomotion_mut().integrate(self.dt, self.gravity);
        match self.fighter.locomotion().position {
            Some(position) => {
                if let Some(body) = self.world.bodies.get_mut(&owner) {
                    body.position = position;
                }
            },
            None => {
                self.world.remove(owner);
            },
        }
        self.world.integrate(owner, self.dt, self.gravity, self.damping);

        self.record(&report);
        self.tick += 1;
        report
    }

    /// Run `ticks` ticks and return the session totals.
    pub fn run(&mut self, ticks: u32) -> SessionSummary {
        for _ in 0..ticks {
            self.step();
        }
        self.summary()
    }

    /// Totals so far.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        let mut summary = self.summary.clone();
        summary.ticks = self.tick;
        summary.best_combo = self.fighter.combo().state().best_combo;
        summary.dummies = self
            .dummies
            .iter()
            .map(|&id| (id, self.dummy_hp(id).unwrap_or(0.0)))
            .collect();
        summary
    }

    fn record(&mut self, report: &TickReport) {
        for event in self.events.drain_for(self.fighter.owner()) {
            match &event {
                CombatEvent::AttackStarted { family, index, at, .. } => {
                    debug!("attack {:?}[{}] at {:.3}", family, index, at);
                    self.summary.attacks += 1;
                },
                CombatEvent::AttackRefused { reason, .. } => {
                    debug!("attack refused: {}", reason);
                    self.summary.refused += 1;
                },
                CombatEvent::HitResolved { family, targets, damage, .. } => {
                    debug!("{:?} hit {} target(s) for {}", family, targets.len(), damage);
                },
                CombatEvent::ComboReset { cause, .. } => match cause {
                    ComboResetCause::MaxReached => self.summary.combos_completed += 1,
                    ComboResetCause::Expired | ComboResetCause::Forced => {
                        self.summary.combos_dropped += 1;
                    },
                },
                CombatEvent::BlockChanged { blocking, .. } => {
                    debug!("blocking = {}", blocking);
                },
            }
        }

        self.summary.hits += report.hits.len() as u32;
        self.summary.total_damage += report.total_damage();

        if let FighterState::Attacking(session) = self.fighter.state() {
            trace!("{:?} {:?}", session.family, session.phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptStep;
    use brawl_combat::{AttackIntent, MoveFamily};

    fn config() -> EngineConfig {
        EngineConfig {
            dummy_positions: vec![Vec2::new(1.5, 0.0)],
            dummy_max_hp: 100.0,
            ..EngineConfig::default()
        }
    }

    fn room(steps: Vec<ScriptStep>) -> TrainingRoom {
        let mut room = TrainingRoom::new(&config(), Arc::new(MoveTable::standard()))
            .expect("Failed to build room");
        room.set_script(InputScript::new(steps));
        room
    }

    #[test]
    fn test_room_requires_dummies() {
        let mut config = config();
        config.dummy_positions.clear();
        let err = TrainingRoom::new(&config, Arc::new(MoveTable::standard())).unwrap_err();
        assert!(matches!(err, BrawlError::Config(_)));
    }

    #[test]
    fn test_jab_lands_on_dummy() {
        let mut room = room(vec![ScriptStep::at(0.0).attack(AttackIntent::LightAttack)]);
        let dummy = room.dummies()[0];

        let summary = room.run(30);
        assert_eq!(summary.attacks, 1);
        assert_eq!(summary.hits, 1);
        assert_eq!(room.dummy_hp(dummy), Some(85.0));
        // Fighter never strikes itself.
        let owner = room.fighter().owner();
        assert_eq!(room.world().body(owner).map(|b| b.health.current()), Some(100.0));
        // Knockback pushed the dummy away from the fighter.
        assert!(room.world().body(dummy).is_some_and(|b| b.position.x > 1.5));
    }

    #[test]
    fn test_jump_into_air_heavy() {
        let mut room = room(vec![
            ScriptStep::at(0.0).jump(),
            ScriptStep::at(0.1).aim(-1.0).attack(AttackIntent::HeavyAttack),
        ]);

        let mut started = None;
        for _ in 0..20 {
            if let Some(session) = room.step().started {
                started = Some(session);
            }
        }
        let session = started.expect("air heavy should start");
        assert_eq!(session.family, MoveFamily::HeavyAirDown);
        assert!(room.fighter().locomotion().vertical_locked);

        let summary = room.run(120);
        assert!(room.fighter().locomotion().grounded);
        assert!(room.fighter().locomotion().movement_enabled);
        assert_eq!(summary.attacks, 1);
    }

    #[test]
    fn test_removed_dummy_is_not_struck() {
        let mut room = room(vec![ScriptStep::at(0.0).attack(AttackIntent::LightAttack)]);
        let dummy = room.dummies()[0];
        room.step();
        assert!(room.remove_dummy(dummy));

        let summary = room.run(30);
        assert_eq!(summary.hits, 0);
        assert!(summary.dummies.is_empty());
    }

    #[test]
    fn test_despawned_fighter_drops_hit() {
        let mut room = room(vec![ScriptStep::at(0.0).attack(AttackIntent::LightAttack)]);
        let dummy = room.dummies()[0];
        room.step();
        room.fighter_mut().locomotion_mut().despawn();

        let summary = room.run(30);
        assert_eq!(summary.hits, 0);
        assert_eq!(room.dummy_hp(dummy), Some(100.0));
    }
}
