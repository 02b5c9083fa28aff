//! Physics-backed firing - avian3d ray queries feeding the weapon core.

use avian3d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{Health, Loadout, MovementFlags, TriggerInput, Viewpoint};
use crate::resources::{ArsenalConfig, ArsenalRng};
use crate::types::{AimFrame, CollisionScene, DamageTargets, DamageableTarget, RayIntersection};
use crate::weapon::FireContext;

/// Scene query over the avian3d spatial pipeline.
///
/// Ownership follows `ChildOf` links and collider-to-body links, so a
/// shooter's compound body is excluded no matter which collision layers it
/// uses.
#[derive(SystemParam)]
pub struct AvianScene<'w, 's> {
    spatial: SpatialQuery<'w, 's>,
    parents: Query<'w, 's, &'static ChildOf>,
    bodies: Query<'w, 's, &'static ColliderOf>,
}

impl AvianScene<'_, '_> {
    fn owner_of(&self, entity: Entity) -> Option<Entity> {
        if let Ok(child_of) = self.parents.get(entity) {
            return Some(child_of.parent());
        }
        self.bodies
            .get(entity)
            .ok()
            .map(|collider_of| collider_of.body)
            .filter(|body| *body != entity)
    }
}

impl CollisionScene for AvianScene<'_, '_> {
    fn intersections(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayIntersection> {
        let Ok(dir) = Dir3::new(direction) else {
            return Vec::new();
        };
        // Unbounded: hits arrive in tree order, not by distance.
        let mut intersections = Vec::new();
        self.spatial.ray_hits_callback(
            origin,
            dir,
            max_distance,
            true,
            &SpatialQueryFilter::default(),
            |hit| {
                intersections.push(RayIntersection {
                    entity: hit.entity,
                    point: origin + *dir * hit.distance,
                    normal: hit.normal,
                    distance: hit.distance,
                });
                true
            },
        );
        intersections
    }

    fn is_part_of(&self, entity: Entity, owner: Entity) -> bool {
        let mut current = entity;
        // Hierarchies are shallow; the bound only stops malformed cycles.
        for _ in 0..64 {
            if current == owner {
                return true;
            }
            match self.owner_of(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }

    fn body_of(&self, entity: Entity) -> Entity {
        let mut current = entity;
        for _ in 0..64 {
            match self.owner_of(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}

/// Damage lookup over [`Health`] components.
///
/// A hit collider without health passes the damage up to the nearest
/// ancestor that has it.
#[derive(SystemParam)]
pub struct HealthTargets<'w, 's> {
    health: Query<'w, 's, &'static mut Health>,
    parents: Query<'w, 's, &'static ChildOf>,
}

impl DamageTargets for HealthTargets<'_, '_> {
    fn target_mut(&mut self, entity: Entity) -> Option<&mut dyn DamageableTarget> {
        let mut current = entity;
        for _ in 0..64 {
            if self.health.contains(current) {
                let health = self.health.get_mut(current).ok()?;
                return Some(health.into_inner() as &mut dyn DamageableTarget);
            }
            current = self.parents.get(current).ok()?.parent();
        }
        None
    }
}

/// Feed each shooter's trigger into its drawn weapon and resolve the shots
/// against the physics scene.
///
/// # Arguments
/// * `time` - Bevy Time resource for the shot clock and burst timing
/// * `config` - Global arsenal tuning
/// * `rng` - Shared random source
/// * `scene` - Ray queries against avian3d colliders
/// * `targets` - Health lookup for hit dispatch
/// * `shooters` - Loadout, trigger and aim of every shooter
/// * `cameras` - Viewpoint transforms
pub fn fire_weapons(
    time: Res<Time>,
    config: Res<ArsenalConfig>,
    mut rng: ResMut<ArsenalRng>,
    scene: AvianScene,
    mut targets: HealthTargets,
    mut shooters: Query<(
        Entity,
        &mut Loadout,
        &TriggerInput,
        &GlobalTransform,
        Option<&MovementFlags>,
        Option<&Viewpoint>,
    )>,
    cameras: Query<&GlobalTransform, Without<Loadout>>,
) {
    let now = time.elapsed_secs_f64();
    let dt = time.delta_secs();

    for (shooter, mut loadout, trigger, transform, movement, viewpoint) in shooters.iter_mut() {
        let Some(weapon) = loadout.active_mut() else {
            continue;
        };
        let aim = viewpoint
            .and_then(|viewpoint| cameras.get(viewpoint.camera).ok())
            .map(AimFrame::from_global)
            .unwrap_or_else(|| AimFrame::from_global(transform));
        let movement = movement.copied().unwrap_or_default();

        let mut ctx = FireContext {
            now,
            shooter,
            aim,
            scene: &scene,
            targets: &mut targets,
            movement: &movement,
            rng: &mut rng.0,
            config: &config,
        };
        weapon.update_trigger(trigger.held, dt, &mut ctx);
    }
}
