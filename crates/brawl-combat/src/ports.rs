//! Interfaces to the host.
//!
//! The combat core never reaches into rendering, physics or movement code.
//! Hosts implement these traits and hand them to the controller:
//! - `Locomotion` and `AnimationBridge` are owned per fighter
//! - `SpatialQuery` and `Damageable` describe the shared world and are
//!   passed to every tick

use brawl_common::{EntityId, Vec2};
use serde::{Deserialize, Serialize};

/// Bit set of collision layers used to filter hit queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);

    /// Matches every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Mask containing the single layer `index`.
    ///
    /// Only layers 0..32 exist. Debug builds panic on a larger index; release
    /// builds wrap it modulo 32.
    #[must_use]
    pub const fn layer(index: u8) -> Self {
        debug_assert!(index < 32, "layer index out of range");
        Self(1u32 << (index % 32))
    }

    /// Creates a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Union of two masks.
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if the masks share at least one layer.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

/// Movement side of a fighter.
pub trait Locomotion {
    /// Whether the fighter is standing on the ground.
    fn is_grounded(&self) -> bool;

    /// Enable or disable player-driven movement.
    fn set_movement_enabled(&mut self, enabled: bool);

    /// World position of the fighter, `None` once the actor is torn down.
    fn position(&self) -> Option<Vec2>;

    /// Horizontal facing: `1.0` right, `-1.0` left.
    fn facing(&self) -> f32;

    /// Freeze vertical motion (zero vertical velocity, no gravity).
    fn set_vertical_lock(&mut self, _locked: bool) {}
}

/// Write-only signals to the animation layer.
pub trait AnimationBridge {
    /// Combo step currently playing.
    fn set_combo_index(&mut self, index: usize);

    /// Start a light punch animation.
    fn trigger_punch(&mut self);

    /// Start a heavy punch animation.
    fn trigger_heavy_punch(&mut self);

    /// Air aim direction (-1, 0, 1).
    fn set_air_aim_direction(&mut self, sign: i8);

    /// Blocking pose on or off.
    fn set_blocking(&mut self, _blocking: bool) {}
}

/// Overlap queries against the host's physics world.
pub trait SpatialQuery {
    /// Bodies overlapping the circle at `center` whose layers intersect `layers`.
    fn query_circle(&self, center: Vec2, radius: f32, layers: LayerMask) -> Vec<EntityId>;
}

/// Mutation interface of struck bodies.
///
/// Both methods return `false` when the handle no longer names a live body.
pub trait Damageable {
    /// Reduce the target's hit points by `amount`.
    fn apply_damage(&mut self, target: EntityId, amount: f32) -> bool;

    /// Overwrite the target's velocity.
    fn apply_velocity(&mut self, target: EntityId, velocity: Vec2) -> bool;
}

/// Test doubles for the host traits.
#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::health::Health;
    use std::collections::HashMap;

    #[derive(Debug, Clone)]
    pub struct MockLocomotion {
        pub grounded: bool,
        pub movement_enabled: bool,
        pub position: Option<Vec2>,
        pub facing: f32,
        pub vertical_locked: bool,
        pub vertical_unlocks: u32,
    }

    impl Default for MockLocomotion {
        fn default() -> Self {
            Self {
                grounded: true,
                movement_enabled: true,
                position: Some(Vec2::ZERO),
                facing: 1.0,
                vertical_locked: false,
                vertical_unlocks: 0,
            }
        }
    }

    impl Locomotion for MockLocomotion {
        fn is_grounded(&self) -> bool {
            self.grounded
        }

        fn set_movement_enabled(&mut self, enabled: bool) {
            self.movement_enabled = enabled;
        }

        fn position(&self) -> Option<Vec2> {
            self.position
        }

        fn facing(&self) -> f32 {
            self.facing
        }

        fn set_vertical_lock(&mut self, locked: bool) {
            if !locked {
                self.vertical_unlocks += 1;
            }
            self.vertical_locked = locked;
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum AnimSignal {
        ComboIndex(usize),
        Punch,
        HeavyPunch,
        AirAim(i8),
        Blocking(bool),
    }

    #[derive(Debug, Default)]
    pub struct MockAnimation {
        pub signals: Vec<AnimSignal>,
    }

    impl AnimationBridge for MockAnimation {
        fn set_combo_index(&mut self, index: usize) {
            self.signals.push(AnimSignal::ComboIndex(index));
        }

        fn trigger_punch(&mut self) {
            self.signals.push(AnimSignal::Punch);
        }

        fn trigger_heavy_punch(&mut self) {
            self.signals.push(AnimSignal::HeavyPunch);
        }

        fn set_air_aim_direction(&mut self, sign: i8) {
            self.signals.push(AnimSignal::AirAim(sign));
        }

        fn set_blocking(&mut self, blocking: bool) {
            self.signals.push(AnimSignal::Blocking(blocking));
        }
    }

    #[derive(Debug, Clone)]
    pub struct MockBody {
        pub position: Vec2,
        pub layers: LayerMask,
        pub health: Health,
        pub velocity: Vec2,
    }

    /// World of circle-overlap bodies. `ghosts` are handles the query still
    /// reports although their bodies are gone.
    #[derive(Debug, Default)]
    pub struct MockWorld {
        pub bodies: HashMap<EntityId, MockBody>,
        pub ghosts: Vec<EntityId>,
    }

    impl MockWorld {
        pub fn add_body(&mut self, id: EntityId, position: Vec2, max_hp: f32) {
            self.bodies.insert(
                id,
                MockBody {
                    position,
                    layers: LayerMask::layer(0),
                    health: Health::new(max_hp),
                    velocity: Vec2::ZERO,
                },
            );
        }

        pub fn hp(&self, id: EntityId) -> f32 {
            self.bodies[&id].health.current()
        }

        pub fn velocity(&self, id: EntityId) -> Vec2 {
            self.bodies[&id].velocity
        }
    }

    impl SpatialQuery for MockWorld {
        fn query_circle(&self, center: Vec2, radius: f32, layers: LayerMask) -> Vec<EntityId> {
            let mut hits: Vec<EntityId> = self
                .bodies
                .iter()
                .filter(|(_, b)| b.layers.intersects(layers))
                .filter(|(_, b)| b.position.distance(center) <= radius)
                .map(|(id, _)| *id)
                .collect();
            hits.sort();
            hits.extend(self.ghosts.iter().copied());
            hits
        }
    }

    impl Damageable for MockWorld {
        fn apply_damage(&mut self, target: EntityId, amount: f32) -> bool {
            self.bodies
                .get_mut(&target)
                .map(|b| b.health.apply_damage(amount))
                .is_some()
        }

        fn apply_velocity(&mut self, target: EntityId, velocity: Vec2) -> bool {
            self.bodies
                .get_mut(&target)
                .map(|b| b.velocity = velocity)
                .is_some()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask() {
        let enemy = LayerMask::layer(3);
        let player = LayerMask::layer(1);
        assert!(enemy.intersects(LayerMask::ALL));
        assert!(!enemy.intersects(player));
        assert!(enemy.with(player).intersects(player));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
        assert_eq!(LayerMask::layer(3).bits(), 8);
        assert_eq!(LayerMask::layer(31).bits(), 1 << 31);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "layer index out of range")]
    fn test_layer_index_past_31_panics_in_debug() {
        let _ = LayerMask::layer(33);
    }
}
