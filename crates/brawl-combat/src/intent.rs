//! Per-tick input intents.

use serde::{Deserialize, Serialize};

use crate::moves::AttackStrength;

/// Discrete, edge-triggered attack request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackIntent {
    /// Light attack pressed this tick.
    LightAttack,
    /// Heavy attack pressed this tick.
    HeavyAttack,
}

impl AttackIntent {
    /// Strength of the requested attack.
    #[must_use]
    pub const fn strength(self) -> AttackStrength {
        match self {
            Self::LightAttack => AttackStrength::Light,
            Self::HeavyAttack => AttackStrength::Heavy,
        }
    }
}

/// Everything the controller reads from input in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    /// Light attack pressed this tick.
    pub light: bool,
    /// Heavy attack pressed this tick.
    pub heavy: bool,
    /// Block held.
    pub block: bool,
    /// Vertical aim axis in `[-1, 1]`.
    pub aim: f32,
}

impl InputFrame {
    /// No input.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// Light attack pressed.
    #[must_use]
    pub fn light() -> Self {
        Self {
            light: true,
            ..Self::default()
        }
    }

    /// Heavy attack pressed.
    #[must_use]
    pub fn heavy() -> Self {
        Self {
            heavy: true,
            ..Self::default()
        }
    }

    /// Set the aim axis (clamped to `[-1, 1]`).
    #[must_use]
    pub fn with_aim(mut self, aim: f32) -> Self {
        self.aim = aim.clamp(-1.0, 1.0);
        self
    }

    /// Hold block.
    #[must_use]
    pub fn with_block(mut self) -> Self {
        self.block = true;
        self
    }

    /// Press the attack for `intent`.
    #[must_use]
    pub fn with_attack(mut self, intent: AttackIntent) -> Self {
        match intent {
            AttackIntent::LightAttack => self.light = true,
            AttackIntent::HeavyAttack => self.heavy = true,
        }
        self
    }

    /// Attack requested this tick. Light wins when both are pressed.
    #[must_use]
    pub fn attack(&self) -> Option<AttackIntent> {
        if self.light {
            Some(AttackIntent::LightAttack)
        } else if self.heavy {
            Some(AttackIntent::HeavyAttack)
        } else {
            None
        }
    }
}
