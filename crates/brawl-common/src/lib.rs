//! # Brawl Common
//!
//! Common types shared by every Brawl crate.
//!
//! This crate provides the foundational pieces the combat core and its hosts
//! agree on:
//! - Entity/body handles (`EntityId`)
//! - Schema versions for data tables and config files
//! - The top-level error type
//! - The 2D vector type used for positions, directions and velocities

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

pub use glam::Vec2;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
    pub use glam::Vec2;
}

pub use prelude::*;
