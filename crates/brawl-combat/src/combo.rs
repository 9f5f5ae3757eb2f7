//! Grounded combo tracking.
//!
//! A fighter's combo count advances on every grounded hit and falls back to
//! zero when the combo window lapses, when the maximum count is reached, or
//! when the controller forces a reset. Air attacks never touch it.

use serde::{Deserialize, Serialize};

/// Combo timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Time after a grounded hit during which the combo continues (seconds).
    pub window: f32,
    /// Count at which the combo wraps back to zero.
    pub max_count: u32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            window: 1.0,
            max_count: 3,
        }
    }
}

impl ComboConfig {
    /// Create a combo configuration. `max_count` is at least 1.
    #[must_use]
    pub fn new(window: f32, max_count: u32) -> Self {
        Self {
            window: window.max(0.0),
            max_count: max_count.max(1),
        }
    }
}

/// Why a combo went back to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboResetCause {
    /// The combo window lapsed without a new grounded hit.
    Expired,
    /// The maximum combo count was reached.
    MaxReached,
    /// Reset requested from outside (stagger, heavy attack).
    Forced,
}

/// Snapshot of a fighter's combo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    /// Current combo count.
    pub count: u32,
    /// Time of the last grounded hit.
    pub last_hit: f32,
    /// Grounded hits registered since creation.
    pub total_hits: u32,
    /// Highest count reached before a wrap or reset.
    pub best_combo: u32,
}

/// Per-fighter combo state machine (Idle when count is 0, Active otherwise).
#[derive(Debug, Clone, Default)]
pub struct ComboTracker {
    config: ComboConfig,
    state: ComboState,
}

impl ComboTracker {
    /// Create a tracker in the Idle state.
    #[must_use]
    pub fn new(config: ComboConfig) -> Self {
        Self {
            config,
            state: ComboState::default(),
        }
    }

    /// Current combo count; also the combo index of the next grounded move.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.state.count
    }

    /// Check if in combo.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.count > 0
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> &ComboState {
        &self.state
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ComboConfig {
        &self.config
    }

    /// Register a grounded hit at `now`.
    ///
    /// Returns `Some(ComboResetCause::MaxReached)` when this hit completed the
    /// combo and the tracker wrapped back to Idle.
    pub fn on_grounded_hit(&mut self, now: f32) -> Option<ComboResetCause> {
        self.state.count = self.state.count.saturating_add(1);
        self.state.last_hit = now;
        self.state.total_hits = self.state.total_hits.saturating_add(1);
        self.state.best_combo = self.state.best_combo.max(self.state.count);

        if self.state.count >= self.config.max_count {
            self.state.count = 0;
            return Some(ComboResetCause::MaxReached);
        }
        None
    }

    /// Air hits sit outside the combo system.
    pub fn on_air_hit(&mut self, _now: f32) {}

    /// Expire the combo if the window has lapsed.
    pub fn tick(&mut self, now: f32) -> Option<ComboResetCause> {
        if self.is_active() && now - self.state.last_hit > self.config.window {
            self.state.count = 0;
            return Some(ComboResetCause::Expired);
        }
        None
    }

    /// Drop back to Idle regardless of state.
    ///
    /// Returns `true` if a combo was actually in progress.
    pub fn force_reset(&mut self) -> bool {
        let was_active = self.is_active();
        self.state.count = 0;
        was_active
    }
}
