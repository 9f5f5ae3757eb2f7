//! # Brawl Combat
//!
//! Tick-driven 2D melee combat core.
//!
//! This crate provides everything one fighter needs to punch things:
//! - Move catalog with grounded combos, air attacks and aimed air heavies
//! - Combo tracking with a time window and maximum length
//! - Attack scheduling with delayed hits, cooldowns and movement locks
//! - Hit resolution against a host-provided spatial world
//! - A per-fighter controller tying it all together
//! - Event bus for inter-system communication
//!
//! The crate has no engine dependency. Hosts plug in through the traits in
//! [`ports`] and drive each controller with one `tick` call per frame.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod combo;
pub mod controller;
pub mod events;
pub mod health;
pub mod hit;
pub mod intent;
pub mod moves;
pub mod ports;
pub mod scheduler;
pub mod selector;
pub mod timer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::combo::*;
    pub use crate::controller::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::hit::*;
    pub use crate::intent::*;
    pub use crate::moves::*;
    pub use crate::ports::{AnimationBridge, Damageable, LayerMask, Locomotion, SpatialQuery};
    pub use crate::scheduler::*;
    pub use crate::selector::*;
    pub use crate::timer::*;
}

pub use prelude::*;
