//! Common types and collaborator contracts for the weapon core.

use bevy::prelude::*;

/// One collider crossed by a ray, as reported by the scene.
///
/// # Fields
/// * `entity` - Collider entity that was crossed
/// * `point` - World-space entry point
/// * `normal` - Surface normal at the entry point
/// * `distance` - Distance from the ray origin to the entry point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayIntersection {
    pub entity: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Result of one ray (or pellet) connecting with something.
///
/// `damage` is what the shot carried after falloff and penetration decay;
/// `damage_applied` is what the target actually took (zero when the entity
/// is not damageable or already dead).
#[derive(Clone, Debug, PartialEq)]
pub struct HitResult {
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal
    pub normal: Vec3,
    /// Entity that was hit
    pub target: Entity,
    /// Distance along the ray
    pub distance: f32,
    /// Damage carried by the ray at this hit
    pub damage: i32,
    /// Whether a live damageable target received the damage
    pub was_damageable: bool,
    /// Damage actually delivered
    pub damage_applied: i32,
}

/// Everything one ray produced: its direction, ordered hits and the point
/// where a tracer should end.
#[derive(Clone, Debug, PartialEq)]
pub struct ShotTrace {
    pub origin: Vec3,
    pub direction: Vec3,
    pub hits: Vec<HitResult>,
    pub end_point: Vec3,
}

impl ShotTrace {
    /// A ray that crossed nothing within range.
    pub fn miss(origin: Vec3, direction: Vec3, max_range: f32) -> Self {
        Self {
            origin,
            direction,
            hits: Vec::new(),
            end_point: origin + direction * max_range,
        }
    }

    pub fn did_hit(&self) -> bool {
        !self.hits.is_empty()
    }
}

/// Viewpoint the shot leaves from, with the basis used for cone sampling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimFrame {
    pub origin: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl AimFrame {
    /// Build a frame from an origin and a look direction.
    ///
    /// The right/up basis is any orthonormal pair around `forward`.
    pub fn looking(origin: Vec3, forward: Vec3) -> Self {
        let forward = forward.normalize_or(Vec3::NEG_Z);
        let (right, up) = forward.any_orthonormal_pair();
        Self { origin, forward, right, up }
    }

    /// Build a frame from a camera (or shooter) transform.
    pub fn from_global(transform: &GlobalTransform) -> Self {
        Self {
            origin: transform.translation(),
            forward: *transform.forward(),
            right: *transform.right(),
            up: *transform.up(),
        }
    }
}

/// Whether a multi-tick task needs more ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Continue,
    Done,
}

/// Read-only collision query used by the ballistic resolver.
pub trait CollisionScene {
    /// Every collider crossed by the ray up to `max_distance`, in any order.
    ///
    /// `direction` is normalized.
    fn intersections(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayIntersection>;

    /// Whether `entity` is `owner` or sits anywhere below it in the ownership
    /// hierarchy.
    fn is_part_of(&self, entity: Entity, owner: Entity) -> bool;

    /// Top of `entity`'s ownership hierarchy: the body a compound collider
    /// belongs to. An unowned collider is its own body.
    fn body_of(&self, entity: Entity) -> Entity;
}

/// Capability implemented by anything that can be shot.
pub trait DamageableTarget {
    fn take_damage(&mut self, amount: i32, point: Vec3, direction: Vec3);
    fn is_alive(&self) -> bool;
}

/// Lookup from a hit collider to the damageable capability behind it.
pub trait DamageTargets {
    /// `None` when the entity does not (or no longer) carry the capability.
    fn target_mut(&mut self, entity: Entity) -> Option<&mut dyn DamageableTarget>;
}

/// Movement collaborator consulted once per fire-direction computation.
pub trait MovementState {
    fn is_grounded(&self) -> bool;
    fn is_moving(&self) -> bool;
}

/// Perk collaborator consulted when a reload starts.
pub trait ReloadSpeedProvider {
    /// Reload speed factor; 2.0 halves the reload time.
    fn reload_speed_multiplier(&self) -> f32;
}

impl ReloadSpeedProvider for f32 {
    fn reload_speed_multiplier(&self) -> f32 {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_frame_basis_is_orthonormal() {
        let frame = AimFrame::looking(Vec3::ZERO, Vec3::new(1.0, 2.0, -3.0));
        assert!((frame.forward.length() - 1.0).abs() < 1e-5);
        assert!(frame.forward.dot(frame.right).abs() < 1e-5);
        assert!(frame.forward.dot(frame.up).abs() < 1e-5);
        assert!(frame.right.dot(frame.up).abs() < 1e-5);
    }

    #[test]
    fn test_aim_frame_from_identity_transform() {
        let frame = AimFrame::from_global(&GlobalTransform::IDENTITY);
        assert_eq!(frame.forward, Vec3::NEG_Z);
        assert_eq!(frame.right, Vec3::X);
        assert_eq!(frame.up, Vec3::Y);
    }

    #[test]
    fn test_miss_trace_ends_at_max_range() {
        let trace = ShotTrace::miss(Vec3::ZERO, Vec3::NEG_Z, 50.0);
        assert!(!trace.did_hit());
        assert_eq!(trace.end_point, Vec3::new(0.0, 0.0, -50.0));
    }
}
