//! Engine configuration.
//!
//! Provides the simulation, combat, training room and logging settings.
//! Configuration can be loaded from and saved to a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use brawl_combat::{ComboConfig, ControllerConfig, LayerMask};
use brawl_common::{SchemaVersion, Vec2};

use crate::script::{InputScript, ScriptStep};

/// Configuration file name.
pub const CONFIG_FILE: &str = "brawl.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Config format version
    pub version: SchemaVersion,

    // === Simulation ===
    /// Fixed simulation ticks per second
    pub tick_rate: u32,
    /// Simulated seconds per run
    pub duration: f32,
    /// Default `tracing` filter directive
    pub log_filter: String,

    // === Combat ===
    /// Move table file (None = built-in table)
    pub move_table_path: Option<PathBuf>,
    /// Seconds a grounded combo stays open after a hit
    pub combo_window: f32,
    /// Grounded hits before the combo wraps
    pub max_combo_count: u32,
    /// Hit circle radius
    pub attack_radius: f32,
    /// Hit circle offset for a fighter facing right
    pub attack_offset: Vec2,
    /// Layers hits can strike
    pub target_layers: LayerMask,

    // === Training Room ===
    /// Fighter spawn position
    pub fighter_position: Vec2,
    /// Fighter facing (1 = right, -1 = left)
    pub fighter_facing: f32,
    /// Dummy hit points
    pub dummy_max_hp: f32,
    /// Dummy spawn positions
    pub dummy_positions: Vec<Vec2>,
    /// Downward acceleration
    pub gravity: f32,
    /// Upward speed of a jump
    pub jump_speed: f32,
    /// Horizontal velocity damping per second for knocked-back bodies
    pub knockback_damping: f32,

    /// Scripted input (empty = built-in demo)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<ScriptStep>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: SchemaVersion::ENGINE_CONFIG,

            // Simulation
            tick_rate: 60,
            duration: 6.0,
            log_filter: "brawl=info".to_string(),

            // Combat
            move_table_path: None,
            combo_window: 1.0,
            max_combo_count: 3,
            attack_radius: 3.0,
            attack_offset: Vec2::new(1.0, 0.0),
            target_layers: LayerMask::ALL,

            // Training room
            fighter_position: Vec2::ZERO,
            fighter_facing: 1.0,
            dummy_max_hp: 200.0,
            dummy_positions: vec![Vec2::new(2.0, 0.0), Vec2::new(-2.5, 0.0)],
            gravity: 30.0,
            jump_speed: 12.0,
            knockback_damping: 4.0,

            script: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        if !SchemaVersion::ENGINE_CONFIG.can_read(&config.version) {
                            warn!(
                                "Config version {} unsupported (expected {}), using defaults",
                                config.version,
                                SchemaVersion::ENGINE_CONFIG
                            );
                            return Self::default();
                        }
                        config.validate();
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        // Simulation
        self.tick_rate = self.tick_rate.clamp(1, 1000);
        self.duration = self.duration.clamp(0.0, 3600.0);

        // Combat
        self.combo_window = self.combo_window.max(0.0);
        self.max_combo_count = self.max_combo_count.max(1);
        self.attack_radius = self.attack_radius.max(0.0);

        // Training room
        self.fighter_facing = if self.fighter_facing < 0.0 { -1.0 } else { 1.0 };
        self.dummy_max_hp = self.dummy_max_hp.max(1.0);
        self.gravity = self.gravity.max(0.0);
        self.jump_speed = self.jump_speed.max(0.0);
        self.knockback_damping = self.knockback_damping.max(0.0);
    }

    /// Seconds per simulation tick.
    #[must_use]
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Number of ticks in a run.
    #[must_use]
    pub fn total_ticks(&self) -> u32 {
        (self.duration * self.tick_rate as f32).ceil() as u32
    }

    /// Controller settings derived from this config.
    #[must_use]
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::default()
            .with_combo(ComboConfig::new(self.combo_window, self.max_combo_count))
            .with_attack_radius(self.attack_radius)
            .with_attack_offset(self.attack_offset)
            .with_target_layers(self.target_layers)
    }

    /// Input script for the training room.
    #[must_use]
    pub fn input_script(&self) -> InputScript {
        if self.script.is_empty() {
            InputScript::demo()
        } else {
            InputScript::new(self.script.clone())
        }
    }
}
