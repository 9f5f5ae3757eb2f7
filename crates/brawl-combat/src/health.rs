//! Clamped hit points for damageable bodies.

use serde::{Deserialize, Serialize};

/// Hit-point pool clamped to `[0, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    /// Full health pool of `max` points (negative max is treated as 0).
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Current hit points.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Add `amount` (negative to hurt), clamped to `[0, max]`.
    pub fn change(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    /// Remove `amount` hit points.
    ///
    /// Returns `true` if this damage emptied the pool.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        let was_alive = !self.is_depleted();
        self.change(-amount);
        was_alive && self.is_depleted()
    }

    /// Restore `amount` hit points.
    pub fn heal(&mut self, amount: f32) {
        self.change(amount);
    }

    /// Check if no hit points remain.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Remaining fraction (0.0-1.0).
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}
