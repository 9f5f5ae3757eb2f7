//! Hit resolution.
//!
//! Runs the overlap query at the attack point and applies the move's damage
//! and knockback to everything found, except the attacker itself.

use brawl_common::{EntityId, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::moves::Move;
use crate::ports::{Damageable, LayerMask, SpatialQuery};

/// Where and against what a hit is checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitQuery {
    /// Center of the overlap circle.
    pub origin: Vec2,
    /// Radius of the overlap circle.
    pub radius: f32,
    /// Body of the attacker, never struck by its own hit.
    pub attacker: EntityId,
    /// Layers that can be struck.
    pub layers: LayerMask,
}

/// Effect applied to one struck target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReport {
    /// Struck body.
    pub target: EntityId,
    /// Damage applied.
    pub damage: f32,
    /// Velocity the target was set to.
    pub knockback: Vec2,
}

/// Resolve a hit and return the targets it affected.
///
/// Handles that no longer name a body are treated as not found. A handle
/// reported twice by the query is only struck once. Knockback overwrites the
/// target's velocity with `(dir.x * facing, dir.y) * magnitude`.
pub fn resolve_hit<W>(world: &mut W, query: &HitQuery, mv: &Move, facing: f32) -> Vec<HitReport>
where
    W: SpatialQuery + Damageable + ?Sized,
{
    let candidates = world.query_circle(query.origin, query.radius, query.layers);
    trace!(
        "hit query at {:?} r={} found {} bodies",
        query.origin,
        query.radius,
        candidates.len()
    );

    let knockback = mv.knockback_for_facing(facing);
    let mut struck: Vec<EntityId> = Vec::with_capacity(candidates.len());
    let mut reports = Vec::with_capacity(candidates.len());

    for target in candidates {
        if target == query.attacker || struck.contains(&target) {
            continue;
        }
        struck.push(target);

        if !world.apply_damage(target, mv.damage()) {
            debug!("hit target {} no longer exists, skipping", target);
            continue;
        }
        if !world.apply_velocity(target, knockback) {
            debug!("hit target {} has no body to push", target);
        }

        reports.push(HitReport {
            target,
            damage: mv.damage(),
            knockback,
        });
    }

    reports
}
