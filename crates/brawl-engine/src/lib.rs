//! # Brawl Engine
//!
//! Host for the Brawl combat core.
//!
//! This crate provides:
//! - Engine configuration loaded from TOML
//! - Move table files with validation and version checks
//! - Timed input scripts
//! - A training room that drives one fighter against punching dummies

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod move_loader;
pub mod script;
pub mod training;

use std::sync::Arc;

use brawl_combat::MoveTable;
use brawl_common::BrawlResult;
use tracing::info;

pub use config::EngineConfig;
pub use move_loader::{load_move_table, save_move_table, MoveLoadError};
pub use script::{InputScript, ScriptStep};
pub use training::{SessionSummary, TrainingRoom};

/// Resolve the move table named by `config`, or the built-in one.
pub fn resolve_moves(config: &EngineConfig) -> BrawlResult<Arc<MoveTable>> {
    match &config.move_table_path {
        Some(path) => Ok(Arc::new(load_move_table(path)?)),
        None => {
            info!("Using built-in move table");
            Ok(Arc::new(MoveTable::standard()))
        },
    }
}

/// Build a room from `config` and run it for the configured duration.
pub fn run_session(config: &EngineConfig) -> BrawlResult<SessionSummary> {
    let moves = resolve_moves(config)?;
    let mut room = TrainingRoom::new(config, moves)?;
    Ok(room.run(config.total_ticks()))
}
