//! Attack sessions, cooldowns and armed hits.
//!
//! This module provides:
//! - `FighterState`, the single action state of a fighter (idle, attacking, blocking)
//! - `AttackSession`, the bookkeeping for one attack from start to cooldown end
//! - `AttackScheduler`, which starts sessions, arms their delayed hit and
//!   releases the locks they hold

use brawl_common::EntityId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::moves::{Move, MoveFamily};
use crate::selector::Selection;
use crate::timer::{Fired, TimerId, TimerWheel};

// ============================================================================
// Session
// ============================================================================

/// Phase of an attack session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackPhase {
    /// Hit not yet applied.
    Windup,
    /// Hit applied, cooldown still running.
    Recovery,
}

/// One attack from its start until its cooldown elapses.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackSession {
    /// Family the move came from.
    pub family: MoveFamily,
    /// Combo step of the move within its family.
    pub combo_index: usize,
    /// The move being performed.
    pub mv: Move,
    /// Time the attack started.
    pub armed_at: f32,
    /// Time the hit query fires.
    pub hit_at: f32,
    /// Time the fighter may attack again.
    pub cooldown_until: f32,
    /// Air heavy only: time vertical motion is released.
    pub vertical_lock_until: Option<f32>,
    /// Heavy attacks lock movement for the whole session.
    pub movement_locked: bool,
    /// Current phase.
    pub phase: AttackPhase,
    hit_timer: TimerId,
}

impl AttackSession {
    /// Time left until the cooldown elapses.
    #[must_use]
    pub fn remaining(&self, now: f32) -> f32 {
        (self.cooldown_until - now).max(0.0)
    }

    /// Check if the cooldown has elapsed.
    #[must_use]
    pub fn is_expired(&self, now: f32) -> bool {
        self.cooldown_until <= now
    }
}

/// Action state of a fighter.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FighterState {
    /// Free to act.
    #[default]
    Idle,
    /// Performing an attack.
    Attacking(AttackSession),
    /// Holding block.
    Blocking,
}

/// Why an attack did not start. Callers treat this as a dropped input.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
pub enum AttackRefused {
    /// A previous attack's cooldown is still running.
    #[error("attack on cooldown for {remaining:.3}s")]
    OnCooldown {
        /// Time remaining on cooldown.
        remaining: f32,
    },
    /// The fighter is blocking.
    #[error("fighter is blocking")]
    Blocking,
}

/// Armed hit waiting for its fire time.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingHit {
    /// Family of the move that armed it.
    pub family: MoveFamily,
    /// Combo step of that move.
    pub combo_index: usize,
    /// Move snapshot taken at attack start.
    pub mv: Move,
}

/// Lock changes produced by `AttackScheduler::tick`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerTick {
    /// The air-heavy vertical lock was released this tick.
    pub vertical_released: bool,
    /// The session whose cooldown elapsed this tick.
    pub finished: Option<AttackSession>,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Per-fighter attack scheduler.
#[derive(Debug, Clone)]
pub struct AttackScheduler {
    owner: EntityId,
    state: FighterState,
    timers: TimerWheel<PendingHit>,
}

impl AttackScheduler {
    /// Create a scheduler for `owner` in the Idle state.
    #[must_use]
    pub fn new(owner: EntityId) -> Self {
        Self {
            owner,
            state: FighterState::Idle,
            timers: TimerWheel::new(),
        }
    }

    /// Current action state.
    #[must_use]
    pub fn state(&self) -> &FighterState {
        &self.state
    }

    /// Active attack session, if any (expired sessions included until `tick`).
    #[must_use]
    pub fn session(&self) -> Option<&AttackSession> {
        match &self.state {
            FighterState::Attacking(session) => Some(session),
            _ => None,
        }
    }

    /// Check if an attack session is held.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.session().is_some()
    }

    /// Check if blocking.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        matches!(self.state, FighterState::Blocking)
    }

    /// Check if the current session locks movement.
    #[must_use]
    pub fn movement_locked(&self) -> bool {
        self.session().is_some_and(|s| s.movement_locked)
    }

    /// Check if the current session freezes vertical motion.
    #[must_use]
    pub fn vertical_locked(&self) -> bool {
        self.session().is_some_and(|s| s.vertical_lock_until.is_some())
    }

    /// Number of armed hits not yet fired.
    #[must_use]
    pub fn pending_hits(&self) -> usize {
        self.timers.len()
    }

    /// Start an attack with the selected move at `now`.
    ///
    /// Refused while blocking or while a previous session's cooldown is
    /// running; the existing session is left untouched in that case.
    ///
    /// Call [`tick`](Self::tick) for `now` first. An elapsed session that was
    /// never ticked is replaced silently, so its `finished` report (and the
    /// movement unlock it carries) is never produced.
    pub fn begin_attack(
        &mut self,
        selection: Selection<'_>,
        now: f32,
    ) -> Result<AttackSession, AttackRefused> {
        match &self.state {
            FighterState::Blocking => return Err(AttackRefused::Blocking),
            FighterState::Attacking(session) if !session.is_expired(now) => {
                return Err(AttackRefused::OnCooldown {
                    remaining: session.remaining(now),
                });
            },
            _ => {},
        }

        let mv = selection.mv.clone();
        let hit_at = now + mv.hit_delay();
        let hit_timer = self.timers.schedule(
            self.owner,
            hit_at,
            PendingHit {
                family: selection.family,
                combo_index: selection.index,
                mv: mv.clone(),
            },
        );
        trace!("{} armed {} to hit at {:.3}", self.owner, mv, hit_at);

        let session = AttackSession {
            family: selection.family,
            combo_index: selection.index,
            armed_at: now,
            hit_at,
            cooldown_until: now + mv.total_duration(),
            vertical_lock_until: selection.family.is_air_heavy().then_some(hit_at),
            movement_locked: selection.family.is_heavy(),
            phase: AttackPhase::Windup,
            hit_timer,
            mv,
        };

        self.state = FighterState::Attacking(session.clone());
        Ok(session)
    }

    /// Remove and return every armed hit due by `now`, in fire order.
    ///
    /// The active session moves to `Recovery` once its own hit has fired.
    pub fn due_hits(&mut self, now: f32) -> Vec<Fired<PendingHit>> {
        let fired = self.timers.drain_due(now);
        if let FighterState::Attacking(session) = &mut self.state {
            if fired.iter().any(|f| f.id == session.hit_timer) {
                session.phase = AttackPhase::Recovery;
            }
        }
        fired
    }

    /// Release locks whose time has come and end an elapsed session.
    pub fn tick(&mut self, now: f32) -> SchedulerTick {
        let mut report = SchedulerTick::default();

        let FighterState::Attacking(session) = &mut self.state else {
            return report;
        };

        if session.vertical_lock_until.is_some_and(|t| t <= now) {
            session.vertical_lock_until = None;
            report.vertical_released = true;
        }

        if session.is_expired(now) {
            if let FighterState::Attacking(mut done) = std::mem::take(&mut self.state) {
                if done.vertical_lock_until.take().is_some() {
                    report.vertical_released = true;
                }
                report.finished = Some(done);
            }
        }

        report
    }

    /// Enter the Blocking state. Only possible from Idle.
    pub fn begin_block(&mut self) -> bool {
        if matches!(self.state, FighterState::Idle) {
            self.state = FighterState::Blocking;
            true
        } else {
            false
        }
    }

    /// Leave the Blocking state.
    pub fn end_block(&mut self) -> bool {
        if self.is_blocking() {
            self.state = FighterState::Idle;
            true
        } else {
            false
        }
    }
}
