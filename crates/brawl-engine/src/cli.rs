//! Command-line interface for the `brawl` binary.

use std::path::PathBuf;

use brawl_engine::config::CONFIG_FILE;
use clap::Parser;

/// Scripted training sessions against the Brawl combat core
#[derive(Parser, Debug)]
#[command(name = "brawl")]
#[command(about = "Scripted training sessions against the Brawl combat core")]
#[command(version)]
pub struct Cli {
    /// Engine config file
    #[arg(value_name = "CONFIG", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Write the built-in move table to this path and exit
    #[arg(long, value_name = "PATH")]
    pub write_moves: Option<PathBuf>,
}
