#[cfg(all(test, feature = "dim3"))]
mod avian_scene {
    use std::time::Duration;

    use avian3d::prelude::*;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::prelude::*;
    use bevy::time::TimeUpdateStrategy;
    use bevy_hitscan_arsenal::prelude::*;
    use bevy_hitscan_arsenal::systems::ballistics::resolve_single;
    use bevy_hitscan_arsenal::systems::scene::AvianScene;
    use bevy_hitscan_arsenal::types::CollisionScene;

    fn physics_app() -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            TransformPlugin,
            PhysicsPlugins::default(),
            bevy::asset::AssetPlugin::default(),
        ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            1.0 / 60.0,
        )));
        app.finish();
        app
    }

    /// A row of static spheres down -Z, nearest first in the returned list.
    fn spawn_row(app: &mut App, count: usize) -> Vec<Entity> {
        (0..count)
            .map(|i| {
                app.world_mut()
                    .spawn((
                        RigidBody::Static,
                        Collider::sphere(0.4),
                        Transform::from_xyz(0.0, 0.0, -2.0 - i as f32),
                    ))
                    .id()
            })
            .collect()
    }

    fn settle(app: &mut App) {
        for _ in 0..10 {
            app.update();
        }
    }

    #[test]
    fn long_rows_report_every_collider() {
        let mut app = physics_app();
        let row = spawn_row(&mut app, 40);
        settle(&mut app);

        let found = app
            .world_mut()
            .run_system_once(|scene: AvianScene| scene.intersections(Vec3::ZERO, Vec3::NEG_Z, 100.0).len())
            .unwrap();
        assert_eq!(found, row.len());
    }

    #[test]
    fn nearest_collider_wins_behind_shooter_body() {
        let mut app = physics_app();
        let shooter = app
            .world_mut()
            .spawn((RigidBody::Static, Collider::sphere(0.5), Transform::IDENTITY))
            .id();
        let row = spawn_row(&mut app, 40);
        settle(&mut app);

        let profile = WeaponProfile {
            max_range: 100.0,
            ..Default::default()
        };
        let hit = app
            .world_mut()
            .run_system_once(move |scene: AvianScene| {
                let trace = resolve_single(&scene, shooter, Vec3::ZERO, Vec3::NEG_Z, 10, &profile);
                trace.hits.first().map(|hit| hit.target)
            })
            .unwrap();
        assert_eq!(hit, Some(row[0]));
    }
}
