//! Move catalog.
//!
//! This module provides:
//! - `Move`, a validated attack definition (damage, timing, knockback)
//! - `MoveFamily`, the six grounded/air and light/heavy move families
//! - `MoveTable`, the immutable catalog indexed by family and combo step

use brawl_common::{SchemaVersion, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Reasons a move definition is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoveError {
    /// Damage must be strictly positive.
    #[error("damage must be > 0, got {0}")]
    NonPositiveDamage(f32),

    /// Total duration must be strictly positive.
    #[error("total duration must be > 0, got {0}")]
    NonPositiveDuration(f32),

    /// Hit delay must lie within `[0, total_duration]`.
    #[error("hit delay {hit_delay} outside [0, {total_duration}]")]
    HitDelayOutOfRange {
        /// Offending hit delay.
        hit_delay: f32,
        /// Total duration of the move.
        total_duration: f32,
    },

    /// Knockback magnitude must not be negative.
    #[error("knockback magnitude must be >= 0, got {0}")]
    NegativeKnockback(f32),

    /// A numeric field was NaN or infinite.
    #[error("non-finite value in field `{0}`")]
    NonFinite(&'static str),
}

/// Reasons a move table is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MoveTableError {
    /// A family has no entries.
    #[error("move family {0:?} has no entries")]
    EmptyFamily(MoveFamily),

    /// The regular air family must hold exactly one move.
    #[error("regular air family must have exactly one entry, got {0}")]
    RegularAirCount(usize),

    /// A move inside a family failed validation.
    #[error("{family:?}[{index}]: {source}")]
    InvalidMove {
        /// Family containing the move.
        family: MoveFamily,
        /// Position of the move in its family.
        index: usize,
        /// Underlying validation error.
        #[source]
        source: MoveError,
    },
}

// ============================================================================
// Move
// ============================================================================

/// A single attack definition.
///
/// Constructed once when a table is built and never mutated afterwards.
/// `hit_delay <= total_duration` holds for every value of this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Move {
    name: Option<String>,
    damage: f32,
    total_duration: f32,
    hit_delay: f32,
    knockback_direction: Vec2,
    knockback_magnitude: f32,
}

impl Move {
    /// Create a validated move.
    pub fn new(
        damage: f32,
        total_duration: f32,
        hit_delay: f32,
        knockback_direction: Vec2,
        knockback_magnitude: f32,
    ) -> Result<Self, MoveError> {
        let checks = [
            ("damage", damage),
            ("total_duration", total_duration),
            ("hit_delay", hit_delay),
            ("knockback_direction.x", knockback_direction.x),
            ("knockback_direction.y", knockback_direction.y),
            ("knockback_magnitude", knockback_magnitude),
        ];
        if let Some(&(field, _)) = checks.iter().find(|(_, v)| !v.is_finite()) {
            return Err(MoveError::NonFinite(field));
        }
        if damage <= 0.0 {
            return Err(MoveError::NonPositiveDamage(damage));
        }
        if total_duration <= 0.0 {
            return Err(MoveError::NonPositiveDuration(total_duration));
        }
        if !(0.0..=total_duration).contains(&hit_delay) {
            return Err(MoveError::HitDelayOutOfRange {
                hit_delay,
                total_duration,
            });
        }
        if knockback_magnitude < 0.0 {
            return Err(MoveError::NegativeKnockback(knockback_magnitude));
        }

        Ok(Self {
            name: None,
            damage,
            total_duration,
            hit_delay,
            knockback_direction,
            knockback_magnitude,
        })
    }

    /// Attach a display name used in logs.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Damage applied to each struck target.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.damage
    }

    /// Time before the attacker can act again (seconds).
    #[must_use]
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    /// Time from move start until the hit query fires (seconds).
    #[must_use]
    pub fn hit_delay(&self) -> f32 {
        self.hit_delay
    }

    /// Knockback direction before facing adjustment.
    #[must_use]
    pub fn knockback_direction(&self) -> Vec2 {
        self.knockback_direction
    }

    /// Knockback magnitude.
    #[must_use]
    pub fn knockback_magnitude(&self) -> f32 {
        self.knockback_magnitude
    }

    /// Knockback velocity for an attacker facing `facing` (+1 right, -1 left).
    ///
    /// Only the horizontal component is mirrored.
    #[must_use]
    pub fn knockback_for_facing(&self, facing: f32) -> Vec2 {
        Vec2::new(
            self.knockback_direction.x * facing,
            self.knockback_direction.y,
        ) * self.knockback_magnitude
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}"),
            None => write!(
                f,
                "move(dmg={}, dur={}, hit={})",
                self.damage, self.total_duration, self.hit_delay
            ),
        }
    }
}

// ============================================================================
// Families and inputs
// ============================================================================

/// Family of moves sharing a context (grounded/air) and strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFamily {
    /// Light attacks on the ground, indexed by combo step.
    RegularGrounded,
    /// Heavy attacks on the ground, indexed by combo step.
    HeavyGrounded,
    /// Light attack in the air (single entry).
    RegularAir,
    /// Heavy air attack aimed upward.
    HeavyAirUp,
    /// Heavy air attack with no aim.
    HeavyAirNeutral,
    /// Heavy air attack aimed downward.
    HeavyAirDown,
}

impl MoveFamily {
    /// Number of families.
    pub const COUNT: usize = 6;

    /// All families in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::RegularGrounded,
        Self::HeavyGrounded,
        Self::RegularAir,
        Self::HeavyAirUp,
        Self::HeavyAirNeutral,
        Self::HeavyAirDown,
    ];

    const fn slot(self) -> usize {
        match self {
            Self::RegularGrounded => 0,
            Self::HeavyGrounded => 1,
            Self::RegularAir => 2,
            Self::HeavyAirUp => 3,
            Self::HeavyAirNeutral => 4,
            Self::HeavyAirDown => 5,
        }
    }

    /// Heavy families lock movement while they play.
    #[must_use]
    pub const fn is_heavy(self) -> bool {
        matches!(
            self,
            Self::HeavyGrounded | Self::HeavyAirUp | Self::HeavyAirNeutral | Self::HeavyAirDown
        )
    }

    /// Grounded families take part in the combo system.
    #[must_use]
    pub const fn is_grounded(self) -> bool {
        matches!(self, Self::RegularGrounded | Self::HeavyGrounded)
    }

    /// Air heavy families freeze vertical motion until the hit lands.
    #[must_use]
    pub const fn is_air_heavy(self) -> bool {
        matches!(
            self,
            Self::HeavyAirUp | Self::HeavyAirNeutral | Self::HeavyAirDown
        )
    }
}

/// Strength of an attack input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackStrength {
    /// Light punch.
    Light,
    /// Heavy punch.
    Heavy,
}

/// Quantised air aim, sampled only while airborne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AirAim {
    /// Aiming down (-1).
    Down,
    /// No vertical aim (0).
    #[default]
    Neutral,
    /// Aiming up (+1).
    Up,
}

impl AirAim {
    /// Quantise a continuous aim axis in `[-1, 1]` by its sign.
    #[must_use]
    pub fn from_axis(axis: f32) -> Self {
        if axis > 0.0 {
            Self::Up
        } else if axis < 0.0 {
            Self::Down
        } else {
            Self::Neutral
        }
    }

    /// Build from a sign value; any positive is up, any negative is down.
    #[must_use]
    pub const fn from_sign(sign: i8) -> Self {
        if sign > 0 {
            Self::Up
        } else if sign < 0 {
            Self::Down
        } else {
            Self::Neutral
        }
    }

    /// Sign value (-1, 0, 1) as written to the animation bridge.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Down => -1,
            Self::Neutral => 0,
            Self::Up => 1,
        }
    }

    /// Family of the heavy air attack selected by this aim.
    #[must_use]
    pub const fn heavy_family(self) -> MoveFamily {
        match self {
            Self::Up => MoveFamily::HeavyAirUp,
            Self::Neutral => MoveFamily::HeavyAirNeutral,
            Self::Down => MoveFamily::HeavyAirDown,
        }
    }
}

// ============================================================================
// Move Table
// ============================================================================

/// Immutable catalog of moves, one ordered sequence per family.
///
/// Every family holds at least one move, so lookups never fail: indices past
/// the end clamp to the last (strongest) entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveTable {
    version: SchemaVersion,
    families: [Vec<Move>; MoveFamily::COUNT],
}

impl MoveTable {
    /// Start building a table.
    #[must_use]
    pub fn builder() -> MoveTableBuilder {
        MoveTableBuilder::default()
    }

    /// Build a table from per-family lists in `MoveFamily::ALL` order.
    pub fn from_families(families: [Vec<Move>; MoveFamily::COUNT]) -> Result<Self, MoveTableError> {
        MoveTableBuilder {
            version: None,
            families,
        }
        .build()
    }

    /// Look up the move for `family` at combo step `index`, clamped.
    #[must_use]
    pub fn lookup(&self, family: MoveFamily, index: usize) -> &Move {
        let moves = self.family(family);
        &moves[self.clamp_index(family, index)]
    }

    /// Clamp `index` to the valid range of `family`.
    #[must_use]
    pub fn clamp_index(&self, family: MoveFamily, index: usize) -> usize {
        index.min(self.len(family).saturating_sub(1))
    }

    /// All moves of a family, in combo order.
    #[must_use]
    pub fn family(&self, family: MoveFamily) -> &[Move] {
        &self.families[family.slot()]
    }

    /// Number of moves in a family (always >= 1).
    #[must_use]
    pub fn len(&self, family: MoveFamily) -> usize {
        self.family(family).len()
    }

    /// Schema version the table was authored against.
    #[must_use]
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// The built-in catalog.
    ///
    /// Light punches are 15 damage with a 0.17s hit, heavy punches 30/35/40
    /// with a 0.47s hit. Air heavy variants reuse the heavy entries: up is the
    /// first, down the second, neutral the last.
    #[must_use]
    pub fn standard() -> Self {
        const LIGHT_KNOCKBACK: f32 = 2.0;
        const HEAVY_KNOCKBACK: f32 = 5.0;

        let light = |name: &'static str, duration: f32, dir: Vec2| {
            StaticMove::new(name, 15.0, duration, 0.17, dir, LIGHT_KNOCKBACK)
        };
        let heavy = |name: &'static str, damage: f32, duration: f32, dir: Vec2| {
            StaticMove::new(name, damage, duration, 0.47, dir, HEAVY_KNOCKBACK)
        };

        let jab = light("jab", 0.33, Vec2::new(1.0, 0.25));
        let cross = light("cross", 0.43, Vec2::new(1.0, 0.25));
        let hook = light("hook", 0.40, Vec2::new(1.0, 0.5));
        let haymaker = heavy("haymaker", 30.0, 1.05, Vec2::new(1.0, 0.3));
        let slam = heavy("slam", 35.0, 1.35, Vec2::new(1.0, 0.4));
        let uppercut = heavy("uppercut", 40.0, 1.35, Vec2::new(1.0, 0.6));

        let families = [
            vec![jab.build(), cross.build(), hook.build()],
            vec![haymaker.build(), slam.build(), uppercut.build()],
            vec![jab.renamed("air jab").build()],
            vec![haymaker
                .renamed("rising haymaker")
                .with_direction(Vec2::new(0.2, 1.0))
                .build()],
            vec![uppercut
                .renamed("air uppercut")
                .with_direction(Vec2::new(1.0, 0.0))
                .build()],
            vec![slam
                .renamed("meteor slam")
                .with_direction(Vec2::new(0.2, -1.0))
                .build()],
        ];

        Self {
            version: SchemaVersion::MOVE_TABLE,
            families,
        }
    }
}

impl Default for MoveTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Compile-time move data for the built-in catalog.
///
/// The values are known to satisfy `Move` validation, so `build` bypasses it.
#[derive(Clone, Copy)]
struct StaticMove<'a> {
    name: &'a str,
    damage: f32,
    total_duration: f32,
    hit_delay: f32,
    direction: Vec2,
    magnitude: f32,
}

impl<'a> StaticMove<'a> {
    fn new(
        name: &'a str,
        damage: f32,
        total_duration: f32,
        hit_delay: f32,
        direction: Vec2,
        magnitude: f32,
    ) -> Self {
        Self {
            name,
            damage,
            total_duration,
            hit_delay,
            direction,
            magnitude,
        }
    }

    fn renamed(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }

    fn with_direction(mut self, direction: Vec2) -> Self {
        self.direction = direction;
        self
    }

    fn build(self) -> Move {
        debug_assert!(self.hit_delay <= self.total_duration);
        Move {
            name: Some(self.name.to_string()),
            damage: self.damage,
            total_duration: self.total_duration,
            hit_delay: self.hit_delay,
            knockback_direction: self.direction,
            knockback_magnitude: self.magnitude,
        }
    }
}

/// Builder that validates a `MoveTable` before handing it out.
#[derive(Debug, Clone, Default)]
pub struct MoveTableBuilder {
    version: Option<SchemaVersion>,
    families: [Vec<Move>; MoveFamily::COUNT],
}

impl MoveTableBuilder {
    /// Set the schema version recorded in the table.
    #[must_use]
    pub fn version(mut self, version: SchemaVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Replace the moves of a family.
    #[must_use]
    pub fn family(mut self, family: MoveFamily, moves: Vec<Move>) -> Self {
        self.families[family.slot()] = moves;
        self
    }

    /// Append one move to a family.
    #[must_use]
    pub fn push(mut self, family: MoveFamily, mv: Move) -> Self {
        self.families[family.slot()].push(mv);
        self
    }

    /// Validate and build the table.
    pub fn build(self) -> Result<MoveTable, MoveTableError> {
        for family in MoveFamily::ALL {
            let moves = &self.families[family.slot()];
            if moves.is_empty() {
                return Err(MoveTableError::EmptyFamily(family));
            }
            for (index, mv) in moves.iter().enumerate() {
                // Re-run validation so hand-built moves cannot slip through.
                Move::new(
                    mv.damage,
                    mv.total_duration,
                    mv.hit_delay,
                    mv.knockback_direction,
                    mv.knockback_magnitude,
                )
                .map_err(|source| MoveTableError::InvalidMove {
                    family,
                    index,
                    source,
                })?;
            }
        }

        let air = self.families[MoveFamily::RegularAir.slot()].len();
        if air != 1 {
            return Err(MoveTableError::RegularAirCount(air));
        }

        Ok(MoveTable {
            version: self.version.unwrap_or(SchemaVersion::MOVE_TABLE),
            families: self.families,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
