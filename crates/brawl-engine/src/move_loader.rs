//! Move table loading.
//!
//! This module provides:
//! - Loading a move table from a TOML file with one array per family
//! - Validation of every move and of the table shape on load
//! - Schema version checks against the supported move table version
//! - Writing a table back out in the same format
//!
//! File layout:
//!
//! ```toml
//! version = "1.0.0"
//!
//! [[moves.regular_grounded]]
//! name = "jab"
//! damage = 15.0
//! total_duration = 0.33
//! hit_delay = 0.17
//! knockback_direction = [1.0, 0.25]
//! knockback_magnitude = 2.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use brawl_combat::{Move, MoveFamily, MoveTable, MoveTableError};
use brawl_common::{BrawlError, SchemaVersion, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during move table loading.
#[derive(Debug, Error)]
pub enum MoveLoadError {
    /// File not found.
    #[error("Move file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read or write file.
    #[error("Failed to access move file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse move TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize TOML.
    #[error("Failed to write move TOML: {0}")]
    WriteError(#[from] toml::ser::Error),

    /// Table failed validation.
    #[error("Move validation error: {0}")]
    ValidationError(#[from] MoveTableError),

    /// File written for an unsupported schema.
    #[error("Move file version {found} is not readable (supported: {supported})")]
    VersionMismatch {
        /// Version this build reads.
        supported: SchemaVersion,
        /// Version found in the file.
        found: SchemaVersion,
    },
}

/// Result type for move loading operations.
pub type MoveLoadResult<T> = Result<T, MoveLoadError>;

impl From<MoveLoadError> for BrawlError {
    fn from(err: MoveLoadError) -> Self {
        match err {
            MoveLoadError::ReadError(e) => Self::Io(e),
            MoveLoadError::VersionMismatch { supported, found } => Self::VersionMismatch {
                expected: supported.to_string(),
                actual: found.to_string(),
            },
            MoveLoadError::ParseError(e) => Self::Serialization(e.to_string()),
            MoveLoadError::WriteError(e) => Self::Serialization(e.to_string()),
            other => Self::MoveData(other.to_string()),
        }
    }
}

/// A move as written in a move file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveDefinition {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Damage per target.
    pub damage: f32,
    /// Cooldown from start to the next attack (seconds).
    pub total_duration: f32,
    /// Delay from start to the hit (seconds).
    pub hit_delay: f32,
    /// Knockback direction for a fighter facing right.
    #[serde(default)]
    pub knockback_direction: Vec2,
    /// Knockback speed.
    #[serde(default)]
    pub knockback_magnitude: f32,
}

impl MoveDefinition {
    fn into_move(self, family: MoveFamily, index: usize) -> Result<Move, MoveTableError> {
        let mv = Move::new(
            self.damage,
            self.total_duration,
            self.hit_delay,
            self.knockback_direction,
            self.knockback_magnitude,
        )
        .map_err(|source| MoveTableError::InvalidMove {
            family,
            index,
            source,
        })?;
        Ok(match self.name {
            Some(name) => mv.named(name),
            None => mv,
        })
    }
}

impl From<&Move> for MoveDefinition {
    fn from(mv: &Move) -> Self {
        Self {
            name: mv.name().map(str::to_string),
            damage: mv.damage(),
            total_duration: mv.total_duration(),
            hit_delay: mv.hit_delay(),
            knockback_direction: mv.knockback_direction(),
            knockback_magnitude: mv.knockback_magnitude(),
        }
    }
}

/// Per-family move lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoveSections {
    /// Light grounded combo steps.
    pub regular_grounded: Vec<MoveDefinition>,
    /// Heavy grounded combo steps.
    pub heavy_grounded: Vec<MoveDefinition>,
    /// The light air attack.
    pub regular_air: Vec<MoveDefinition>,
    /// Heavy air attack aimed up.
    pub heavy_air_up: Vec<MoveDefinition>,
    /// Heavy air attack without aim.
    pub heavy_air_neutral: Vec<MoveDefinition>,
    /// Heavy air attack aimed down.
    pub heavy_air_down: Vec<MoveDefinition>,
}

impl MoveSections {
    fn take(&mut self, family: MoveFamily) -> Vec<MoveDefinition> {
        std::mem::take(self.section_mut(family))
    }

    fn section_mut(&mut self, family: MoveFamily) -> &mut Vec<MoveDefinition> {
        match family {
            MoveFamily::RegularGrounded => &mut self.regular_grounded,
            MoveFamily::HeavyGrounded => &mut self.heavy_grounded,
            MoveFamily::RegularAir => &mut self.regular_air,
            MoveFamily::HeavyAirUp => &mut self.heavy_air_up,
            MoveFamily::HeavyAirNeutral => &mut self.heavy_air_neutral,
            MoveFamily::HeavyAirDown => &mut self.heavy_air_down,
        }
    }
}

/// Contents of a move file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveFile {
    /// File format version.
    #[serde(default)]
    pub version: SchemaVersion,
    /// Moves by family.
    pub moves: MoveSections,
}

impl MoveFile {
    /// Snapshot a table into file form.
    #[must_use]
    pub fn from_table(table: &MoveTable) -> Self {
        let mut moves = MoveSections::default();
        for family in MoveFamily::ALL {
            *moves.section_mut(family) =
                table.family(family).iter().map(MoveDefinition::from).collect();
        }
        Self {
            version: table.version(),
            moves,
        }
    }

    /// Validate and build the table.
    pub fn into_table(mut self) -> MoveLoadResult<MoveTable> {
        if !SchemaVersion::MOVE_TABLE.can_read(&self.version) {
            return Err(MoveLoadError::VersionMismatch {
                supported: SchemaVersion::MOVE_TABLE,
                found: self.version,
            });
        }

        let mut builder = MoveTable::builder().version(self.version);
        for family in MoveFamily::ALL {
            let moves = self
                .moves
                .take(family)
                .into_iter()
                .enumerate()
                .map(|(index, def)| def.into_move(family, index))
                .collect::<Result<Vec<_>, _>>()?;
            debug!("{:?}: {} move(s)", family, moves.len());
            builder = builder.family(family, moves);
        }

        Ok(builder.build()?)
    }
}

/// Parse a move table from TOML text.
pub fn parse_move_table(content: &str) -> MoveLoadResult<MoveTable> {
    let file: MoveFile = toml::from_str(content)?;
    file.into_table()
}

/// Load a move table from `path`.
pub fn load_move_table(path: impl AsRef<Path>) -> MoveLoadResult<MoveTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(MoveLoadError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let table = parse_move_table(&content)?;
    info!(
        "Loaded move table v{} from {}",
        table.version(),
        path.display()
    );
    Ok(table)
}

/// Write `table` to `path` as TOML, creating parent directories.
pub fn save_move_table(table: &MoveTable, path: impl AsRef<Path>) -> MoveLoadResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(&MoveFile::from_table(table))?;
    fs::write(path, contents)?;
    info!("Saved move table to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_combat::MoveError;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
version = "1.0.0"

[[moves.regular_grounded]]
name = "poke"
damage = 5.0
total_duration = 0.2
hit_delay = 0.1
knockback_direction = [1.0, 0.0]
knockback_magnitude = 1.0

[[moves.heavy_grounded]]
damage = 20.0
total_duration = 1.0
hit_delay = 0.4

[[moves.regular_air]]
damage = 5.0
total_duration = 0.2
hit_delay = 0.1

[[moves.heavy_air_up]]
damage = 20.0
total_duration = 1.0
hit_delay = 0.4

[[moves.heavy_air_neutral]]
damage = 20.0
total_duration = 1.0
hit_delay = 0.4

[[moves.heavy_air_down]]
damage = 20.0
total_duration = 1.0
hit_delay = 0.4
knockback_direction = [0.0, -1.0]
knockback_magnitude = 6.0
"#;

    #[test]
    fn test_parse_minimal_table() {
        let table = parse_move_table(MINIMAL).unwrap();
        assert_eq!(table.len(MoveFamily::RegularGrounded), 1);
        let poke = table.lookup(MoveFamily::RegularGrounded, 4);
        assert_eq!(poke.name(), Some("poke"));
        assert_eq!(poke.damage(), 5.0);
        assert_eq!(
            table.lookup(MoveFamily::HeavyAirDown, 0).knockback_direction(),
            Vec2::new(0.0, -1.0)
        );
    }

    #[test]
    fn test_missing_family_rejected() {
        let content = MINIMAL.replace("[[moves.regular_air]]", "[[moves.heavy_air_up]]");
        let err = parse_move_table(&content).unwrap_err();
        assert!(matches!(
            err,
            MoveLoadError::ValidationError(MoveTableError::EmptyFamily(MoveFamily::RegularAir))
        ));
    }

    #[test]
    fn test_hit_after_cooldown_rejected_with_position() {
        let content = MINIMAL.replacen("hit_delay = 0.1", "hit_delay = 0.5", 1);
        match parse_move_table(&content).unwrap_err() {
            MoveLoadError::ValidationError(MoveTableError::InvalidMove {
                family,
                index,
                source,
            }) => {
                assert_eq!(family, MoveFamily::RegularGrounded);
                assert_eq!(index, 0);
                assert!(matches!(source, MoveError::HitDelayOutOfRange { .. }));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_future_major_version_rejected() {
        let content = MINIMAL.replace("1.0.0", "2.0.0");
        assert!(matches!(
            parse_move_table(&content).unwrap_err(),
            MoveLoadError::VersionMismatch { .. }
        ));
    }

    #[test]
    fn test_unknown_family_rejected() {
        let content = format!("{MINIMAL}\n[[moves.spinning_kick]]\ndamage = 1.0\n");
        assert!(matches!(
            parse_move_table(&content).unwrap_err(),
            MoveLoadError::ParseError(_)
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_move_table("/nonexistent/moves.toml").unwrap_err();
        assert!(matches!(err, MoveLoadError::NotFound(_)));
        assert!(matches!(BrawlError::from(err), BrawlError::MoveData(_)));
    }

    #[test]
    fn test_standard_table_survives_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("data/moves.toml");

        let standard = MoveTable::standard();
        save_move_table(&standard, &path).expect("Failed to save moves");
        let loaded = load_move_table(&path).expect("Failed to load moves");

        for family in MoveFamily::ALL {
            assert_eq!(loaded.family(family), standard.family(family));
        }
    }
}
