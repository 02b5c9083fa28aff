//! Ballistic resolver - turns a shot into ordered hits.
//!
//! Every function here is a pure read of the scene; damage is only delivered
//! afterwards by [`dispatch_hits`].

use bevy::prelude::*;
use rand::Rng;

use crate::profile::WeaponProfile;
use crate::systems::accuracy::sample_cone_direction;
use crate::systems::falloff::falloff_damage;
use crate::types::{
    AimFrame, CollisionScene, DamageTargets, HitResult, RayIntersection, ShotTrace,
};

/// Intersections along a ray, nearest first, with the shooter's own body
/// removed.
///
/// Self-exclusion walks the ownership hierarchy instead of relying on
/// collision layers. Equal distances keep the scene's order.
pub fn ordered_intersections(
    scene: &dyn CollisionScene,
    shooter: Entity,
    origin: Vec3,
    direction: Vec3,
    max_range: f32,
) -> Vec<RayIntersection> {
    let mut intersections = scene.intersections(origin, direction, max_range);
    intersections.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    intersections.retain(|hit| !scene.is_part_of(hit.entity, shooter));
    intersections
}

/// Keep only the nearest intersection of each body, preserving order.
///
/// A compound target crossed through several of its colliders counts once.
pub fn first_per_body(scene: &dyn CollisionScene, intersections: Vec<RayIntersection>) -> Vec<RayIntersection> {
    let mut seen: Vec<Entity> = Vec::with_capacity(intersections.len());
    intersections
        .into_iter()
        .filter(|hit| {
            let body = scene.body_of(hit.entity);
            if seen.contains(&body) {
                false
            } else {
                seen.push(body);
                true
            }
        })
        .collect()
}

fn hit_from(intersection: &RayIntersection, damage: i32) -> HitResult {
    HitResult {
        point: intersection.point,
        normal: intersection.normal,
        target: intersection.entity,
        distance: intersection.distance,
        damage,
        was_damageable: false,
        damage_applied: 0,
    }
}

/// A single ray that stops at the first thing it meets.
///
/// # Arguments
/// * `scene` - Collision query
/// * `shooter` - Entity whose body is ignored
/// * `origin` - Ray origin (the viewpoint)
/// * `direction` - Normalized ray direction
/// * `damage` - Tier-adjusted damage before falloff
/// * `profile` - Range and falloff curve
pub fn resolve_single(
    scene: &dyn CollisionScene,
    shooter: Entity,
    origin: Vec3,
    direction: Vec3,
    damage: i32,
    profile: &WeaponProfile,
) -> ShotTrace {
    let intersections = ordered_intersections(scene, shooter, origin, direction, profile.max_range);

    match intersections.first() {
        Some(first) => {
            let dealt = falloff_damage(first.distance, damage, profile);
            ShotTrace {
                origin,
                direction,
                hits: vec![hit_from(first, dealt)],
                end_point: first.point,
            }
        }
        None => ShotTrace::miss(origin, direction, profile.max_range),
    }
}

/// A ray that passes through up to `max_penetrations` targets.
///
/// Targets are counted per body, so a compound target takes one hit at its
/// nearest collider. Each hit's damage is falloff-adjusted first, then multiplied by
/// `penetration_damage_retention` once for every target already passed.
/// At most `max_penetrations + 1` hits are produced.
pub fn resolve_penetrating(
    scene: &dyn CollisionScene,
    shooter: Entity,
    origin: Vec3,
    direction: Vec3,
    damage: i32,
    profile: &WeaponProfile,
) -> ShotTrace {
    let intersections = first_per_body(
        scene,
        ordered_intersections(scene, shooter, origin, direction, profile.max_range),
    );
    let max_hits = profile.max_penetrations as usize + 1;

    let mut multiplier = 1.0_f32;
    let mut hits = Vec::with_capacity(intersections.len().min(max_hits));
    for intersection in intersections.iter().take(max_hits) {
        let after_falloff = falloff_damage(intersection.distance, damage, profile);
        let dealt = ((after_falloff as f32 * multiplier).round() as i32).max(1);
        hits.push(hit_from(intersection, dealt));
        multiplier *= profile.penetration_damage_retention;
    }

    let end_point = match hits.last() {
        // Stopped by the last target it was allowed to pass into.
        Some(last) if intersections.len() >= max_hits => last.point,
        _ => origin + direction * profile.max_range,
    };

    ShotTrace { origin, direction, hits, end_point }
}

/// Fire `pellets_per_shot` independent non-penetrating pellets.
///
/// Pellets scatter inside `pellet_cone_angle` around the aim direction. Each
/// carries `pellet_damage` (tier-adjusted, see `TierStats::pellet_damage`)
/// through its own falloff. One trace per pellet is returned, connecting or
/// not.
pub fn resolve_pellets<R: Rng + ?Sized>(
    scene: &dyn CollisionScene,
    shooter: Entity,
    aim: &AimFrame,
    pellet_damage: i32,
    profile: &WeaponProfile,
    spread_epsilon: f32,
    rng: &mut R,
) -> Vec<ShotTrace> {
    (0..profile.pellets_per_shot)
        .map(|_| {
            let direction = sample_cone_direction(aim, profile.pellet_cone_angle, spread_epsilon, rng);
            resolve_single(scene, shooter, aim.origin, direction, pellet_damage, profile)
        })
        .collect()
}

/// Deliver every hit in `trace` to the damageable capability behind it.
///
/// Entities without the capability, or already dead, keep their visual hit
/// but receive nothing.
pub fn dispatch_hits(trace: &mut ShotTrace, targets: &mut dyn DamageTargets) {
    let direction = trace.direction;
    for hit in trace.hits.iter_mut() {
        match targets.target_mut(hit.target) {
            Some(target) if target.is_alive() => {
                target.take_damage(hit.damage, hit.point, direction);
                hit.was_damageable = true;
                hit.damage_applied = hit.damage;
            }
            _ => {
                hit.was_damageable = false;
                hit.damage_applied = 0;
            }
        }
    }
}
