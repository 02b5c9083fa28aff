//! Benchmarks for shot resolution.

use bevy::prelude::*;
use bevy_hitscan_arsenal::headless::HeadlessScene;
use bevy_hitscan_arsenal::profile::WeaponProfile;
use bevy_hitscan_arsenal::resources::presets;
use bevy_hitscan_arsenal::systems::{accuracy, ballistics, falloff};
use bevy_hitscan_arsenal::types::AimFrame;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A row of spheres down the -Z axis, one metre apart.
fn corridor(world: &mut World, count: usize) -> (Entity, HeadlessScene) {
    let shooter = world.spawn_empty().id();
    let mut scene = HeadlessScene::default();
    for i in 0..count {
        let entity = world.spawn_empty().id();
        scene.add_sphere(entity, Vec3::new(0.0, 0.0, -2.0 - i as f32), 0.4);
    }
    (shooter, scene)
}

fn benchmark_penetration(c: &mut Criterion) {
    let profile = presets::marksman_rifle();
    let mut group = c.benchmark_group("Penetrating Shot");

    for collider_count in [8, 64, 512].iter() {
        let mut world = World::new();
        let (shooter, scene) = corridor(&mut world, *collider_count);

        group.bench_with_input(
            BenchmarkId::from_parameter(collider_count),
            collider_count,
            |b, &_count| {
                b.iter(|| {
                    ballistics::resolve_penetrating(
                        &scene,
                        shooter,
                        Vec3::ZERO,
                        Vec3::NEG_Z,
                        black_box(profile.damage_per_shot),
                        &profile,
                    )
                });
            },
        );
    }

    group.finish();
}

fn benchmark_pellets(c: &mut Criterion) {
    let profile = presets::pump_shotgun();
    let mut world = World::new();
    let (shooter, scene) = corridor(&mut world, 16);
    let aim = AimFrame::looking(Vec3::ZERO, Vec3::NEG_Z);
    let mut rng = StdRng::seed_from_u64(12345);

    c.bench_function("Shotgun Pellets", |b| {
        b.iter(|| {
            ballistics::resolve_pellets(
                &scene,
                shooter,
                &aim,
                profile.pellet_damage(),
                &profile,
                0.01,
                &mut rng,
            )
        });
    });
}

fn benchmark_spread_and_falloff(c: &mut Criterion) {
    let aim = AimFrame::looking(Vec3::ZERO, Vec3::new(0.3, 0.1, -1.0));
    let mut rng = StdRng::seed_from_u64(12345);

    c.bench_function("Cone Sampling", |b| {
        b.iter(|| accuracy::sample_cone_direction(&aim, black_box(4.0), 0.01, &mut rng));
    });

    let profile = WeaponProfile {
        falloff_enabled: true,
        falloff_start_distance: 20.0,
        min_damage_fraction: 0.3,
        ..presets::assault_rifle()
    };
    c.bench_function("Damage Falloff", |b| {
        b.iter(|| {
            (0..100)
                .map(|d| falloff::falloff_damage(d as f32, black_box(30), &profile))
                .sum::<i32>()
        });
    });
}

criterion_group!(
    benches,
    benchmark_penetration,
    benchmark_pellets,
    benchmark_spread_and_falloff
);
criterion_main!(benches);
