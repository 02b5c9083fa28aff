//! In-memory scene and target table for headless simulation.
//!
//! Lets the weapon core run without a physics backend: colliders are
//! spheres, ownership is an explicit parent map and damageable targets live
//! in a table keyed by entity.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::components::Health;
use crate::types::{CollisionScene, DamageTargets, DamageableTarget, RayIntersection};

/// Sphere collider owned by an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereCollider {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
}

impl SphereCollider {
    /// Entry distance along a normalized ray, or `None` when missed.
    ///
    /// A ray starting inside the sphere enters at distance zero.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let to_origin = origin - self.center;
        let b = to_origin.dot(direction);
        let c = to_origin.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let exit = -b + root;
        if exit < 0.0 {
            return None;
        }
        Some((-b - root).max(0.0))
    }
}

/// Collision scene made of spheres.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_hitscan_arsenal::headless::HeadlessScene;
/// use bevy_hitscan_arsenal::types::CollisionScene;
///
/// let mut world = World::new();
/// let target = world.spawn_empty().id();
/// let mut scene = HeadlessScene::default();
/// scene.add_sphere(target, Vec3::new(0.0, 0.0, -10.0), 1.0);
///
/// let hits = scene.intersections(Vec3::ZERO, Vec3::NEG_Z, 50.0);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].distance, 9.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct HeadlessScene {
    colliders: Vec<SphereCollider>,
    parents: HashMap<Entity, Entity>,
}

impl HeadlessScene {
    pub fn add_sphere(&mut self, entity: Entity, center: Vec3, radius: f32) {
        self.colliders.push(SphereCollider { entity, center, radius });
    }

    /// Attach `child` under `parent` in the ownership hierarchy.
    pub fn set_parent(&mut self, child: Entity, parent: Entity) {
        self.parents.insert(child, parent);
    }

    pub fn remove(&mut self, entity: Entity) {
        self.colliders.retain(|c| c.entity != entity);
        self.parents.remove(&entity);
    }

    pub fn colliders(&self) -> &[SphereCollider] {
        &self.colliders
    }
}

impl CollisionScene for HeadlessScene {
    fn intersections(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayIntersection> {
        self.colliders
            .iter()
            .filter_map(|collider| {
                let distance = collider.ray_entry(origin, direction)?;
                if distance > max_distance {
                    return None;
                }
                let point = origin + direction * distance;
                Some(RayIntersection {
                    entity: collider.entity,
                    point,
                    normal: (point - collider.center).normalize_or(-direction),
                    distance,
                })
            })
            .collect()
    }

    fn is_part_of(&self, entity: Entity, owner: Entity) -> bool {
        let mut current = Some(entity);
        // Parent maps are tiny; the bound guards against accidental cycles.
        for _ in 0..=self.parents.len() {
            match current {
                Some(e) if e == owner => return true,
                Some(e) => current = self.parents.get(&e).copied(),
                None => return false,
            }
        }
        false
    }

    fn body_of(&self, entity: Entity) -> Entity {
        let mut current = entity;
        for _ in 0..self.parents.len() {
            match self.parents.get(&current) {
                Some(parent) => current = *parent,
                None => break,
            }
        }
        current
    }
}

/// Damageable targets keyed by entity.
#[derive(Clone, Debug, Default)]
pub struct TargetTable {
    targets: HashMap<Entity, Health>,
}

impl TargetTable {
    pub fn insert(&mut self, entity: Entity, health: Health) {
        self.targets.insert(entity, health);
    }

    pub fn get(&self, entity: Entity) -> Option<&Health> {
        self.targets.get(&entity)
    }

    pub fn remove(&mut self, entity: Entity) -> Option<Health> {
        self.targets.remove(&entity)
    }
}

impl DamageTargets for TargetTable {
    fn target_mut(&mut self, entity: Entity) -> Option<&mut dyn DamageableTarget> {
        self.targets
            .get_mut(&entity)
            .map(|health| health as &mut dyn DamageableTarget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_entry_from_outside_and_inside() {
        let mut world = World::new();
        let sphere = SphereCollider {
            entity: world.spawn_empty().id(),
            center: Vec3::new(0.0, 0.0, -5.0),
            radius: 1.0,
        };
        assert_eq!(sphere.ray_entry(Vec3::ZERO, Vec3::NEG_Z), Some(4.0));
        assert_eq!(sphere.ray_entry(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z), Some(0.0));
        assert_eq!(sphere.ray_entry(Vec3::ZERO, Vec3::Z), None);
        assert_eq!(sphere.ray_entry(Vec3::new(3.0, 0.0, 0.0), Vec3::NEG_Z), None);
    }

    #[test]
    fn test_ownership_walks_parents() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let arm = world.spawn_empty().id();
        let hand = world.spawn_empty().id();
        let stranger = world.spawn_empty().id();

        let mut scene = HeadlessScene::default();
        scene.set_parent(arm, root);
        scene.set_parent(hand, arm);

        assert!(scene.is_part_of(root, root));
        assert!(scene.is_part_of(hand, root));
        assert!(!scene.is_part_of(stranger, root));
        assert!(!scene.is_part_of(root, hand));
        assert_eq!(scene.body_of(hand), root);
        assert_eq!(scene.body_of(stranger), stranger);
    }

    #[test]
    fn test_range_limit() {
        let mut world = World::new();
        let mut scene = HeadlessScene::default();
        scene.add_sphere(world.spawn_empty().id(), Vec3::new(0.0, 0.0, -30.0), 1.0);
        assert!(scene.intersections(Vec3::ZERO, Vec3::NEG_Z, 20.0).is_empty());
        assert_eq!(scene.intersections(Vec3::ZERO, Vec3::NEG_Z, 40.0).len(), 1);
    }
}
