//! Combat event bus.
//!
//! Controllers publish what happened each tick; hosts drain the bus for logs,
//! UI feedback or tests.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::trace;

use brawl_common::EntityId;

use crate::combo::ComboResetCause;
use crate::moves::MoveFamily;
use crate::scheduler::AttackRefused;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// An attack started
    AttackStarted {
        /// Attacking fighter
        fighter: EntityId,
        /// Move family
        family: MoveFamily,
        /// Combo step within the family
        index: usize,
        /// Start time
        at: f32,
    },
    /// An attack input was dropped
    AttackRefused {
        /// Fighter whose input was dropped
        fighter: EntityId,
        /// Reason
        reason: AttackRefused,
    },
    /// A delayed hit fired
    HitResolved {
        /// Attacking fighter
        fighter: EntityId,
        /// Move family
        family: MoveFamily,
        /// Bodies struck
        targets: Vec<EntityId>,
        /// Damage per target
        damage: f32,
    },
    /// A combo went back to zero
    ComboReset {
        /// Fighter
        fighter: EntityId,
        /// Reason
        cause: ComboResetCause,
    },
    /// Block held or released
    BlockChanged {
        /// Fighter
        fighter: EntityId,
        /// New blocking state
        blocking: bool,
    },
}

impl CombatEvent {
    /// Fighter the event is about.
    #[must_use]
    pub fn fighter(&self) -> EntityId {
        match self {
            Self::AttackStarted { fighter, .. }
            | Self::AttackRefused { fighter, .. }
            | Self::HitResolved { fighter, .. }
            | Self::ComboReset { fighter, .. }
            | Self::BlockChanged { fighter, .. } => *fighter,
        }
    }
}

/// Bounded queue shared by every controller in a session.
///
/// Controllers hold a [`Sender`] from [`EventBus::sender`] and never block:
/// once the queue is full further events are dropped until the host drains.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<CombatEvent>,
    receiver: Receiver<CombatEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a bus holding at most `capacity` undrained events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Publishes an event, dropping it if the bus is full.
    pub fn publish(&self, event: CombatEvent) {
        if let Err(TrySendError::Full(event) | TrySendError::Disconnected(event)) =
            self.sender.try_send(event)
        {
            trace!("event bus full, dropped {:?}", event);
        }
    }

    /// Drains all pending events in publish order.
    pub fn drain(&self) -> Vec<CombatEvent> {
        self.receiver.try_iter().collect()
    }

    /// Drains the events about `fighter`; events about other fighters stay
    /// queued in their original order.
    pub fn drain_for(&self, fighter: EntityId) -> Vec<CombatEvent> {
        let (mine, others): (Vec<_>, Vec<_>) = self
            .receiver
            .try_iter()
            .partition(|event| event.fighter() == fighter);
        for event in others {
            self.publish(event);
        }
        mine
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Creates a sender handle for a controller.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}
