//! # Brawl
//!
//! Runs a scripted training session against the combat core and logs what
//! happened.
//!
//! Run `brawl --help` for usage.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod cli;

use anyhow::{Context, Result};
use brawl_combat::MoveTable;
use brawl_engine::{run_session, save_move_table, EngineConfig};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;

/// Main entry point.
fn main() -> Result<()> {
    let Cli {
        config: config_path,
        write_moves,
    } = Cli::parse();

    let config = EngineConfig::load_from(&config_path);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(config.log_filter.parse()?))
        .init();

    info!("Brawl starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = write_moves {
        save_move_table(&MoveTable::standard(), &path)
            .with_context(|| format!("writing {}", path.display()))?;
        return Ok(());
    }

    let summary = run_session(&config)?;
    info!(
        "Session: {} ticks, {} attacks ({} refused), {} hits for {} damage, best combo {}",
        summary.ticks,
        summary.attacks,
        summary.refused,
        summary.hits,
        summary.total_damage,
        summary.best_combo
    );
    for (dummy, hp) in &summary.dummies {
        info!("Dummy {}: {} HP left", dummy, hp);
    }

    info!("Brawl shutdown complete");
    Ok(())
}
