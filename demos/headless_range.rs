use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_hitscan_arsenal::headless::{HeadlessScene, TargetTable};
use bevy_hitscan_arsenal::prelude::*;
use std::time::Duration;

fn main() {
    println!("Starting headless firing range...");
    println!("An assault rifle empties magazines into three dummies for 6 seconds.");

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        .add_plugins(ArsenalCorePlugin)
        .insert_resource(ArsenalRng::seeded(42))
        .init_resource::<Range>()
        .add_systems(Startup, setup_range)
        .add_systems(Update, hold_triggers.in_set(ArsenalSet::Fire))
        .add_systems(Update, (report_impacts, reload_when_dry, finish).after(ArsenalSet::Signals))
        .run();
}

/// Scene and health table standing in for a physics world.
#[derive(Resource, Default)]
struct Range {
    scene: HeadlessScene,
    targets: TargetTable,
}

#[derive(Component)]
struct Dummy;

fn setup_range(mut commands: Commands, mut range: ResMut<Range>) {
    println!("\n[SETUP] Placing dummies and arming the shooter...");

    for (i, distance) in [10.0, 25.0, 40.0].into_iter().enumerate() {
        let dummy = commands.spawn((Dummy, Name::new(format!("Dummy {}", i + 1)))).id();
        range
            .scene
            .add_sphere(dummy, Vec3::new(0.0, 1.6, -distance), 0.6);
        range.targets.insert(dummy, Health::new(400));
    }

    let profiles = WeaponProfiles::with_defaults();
    let mut loadout = Loadout::default();
    if let Some(rifle) = profiles.get("Assault Rifle") {
        loadout.add(WeaponInstance::new(rifle));
    }
    commands.spawn((loadout, Name::new("Shooter")));
}

fn hold_triggers(
    time: Res<Time>,
    config: Res<ArsenalConfig>,
    mut rng: ResMut<ArsenalRng>,
    mut range: ResMut<Range>,
    mut shooters: Query<(Entity, &mut Loadout)>,
) {
    let Range { scene, targets } = &mut *range;
    let movement = MovementFlags::default();

    for (shooter, mut loadout) in shooters.iter_mut() {
        let Some(weapon) = loadout.active_mut() else {
            continue;
        };
        let mut ctx = FireContext {
            now: time.elapsed_secs_f64(),
            shooter,
            aim: AimFrame::looking(Vec3::new(0.0, 1.6, 0.0), Vec3::NEG_Z),
            scene: &*scene,
            targets: &mut *targets,
            movement: &movement,
            rng: &mut rng.0,
            config: &config,
        };
        weapon.update_trigger(true, time.delta_secs(), &mut ctx);
    }
}

fn report_impacts(
    mut impacts: MessageReader<BulletImpact>,
    range: Res<Range>,
    names: Query<&Name, With<Dummy>>,
) {
    for impact in impacts.read() {
        let Ok(name) = names.get(impact.target) else {
            continue;
        };
        let health = range.targets.get(impact.target).map_or(0, |h| h.current);
        println!(
            "[HIT] {} at {:.1}m: {} damage, {} hp left",
            name,
            impact.point.length(),
            impact.damage_applied,
            health
        );
    }
}

fn reload_when_dry(
    mut ammo: MessageReader<AmmoChanged>,
    mut reloads: MessageWriter<ReloadRequest>,
    mut started: MessageReader<ReloadStarted>,
) {
    for change in ammo.read() {
        println!("[AMMO] {} / {}", change.in_magazine, change.in_reserve);
        if change.in_magazine == 0 {
            reloads.write(ReloadRequest { shooter: change.shooter });
        }
    }
    for reload in started.read() {
        println!("[RELOAD] {:.2}s", reload.duration);
    }
}

fn finish(
    time: Res<Time>,
    range: Res<Range>,
    dummies: Query<(Entity, &Name), With<Dummy>>,
    mut exit: MessageWriter<AppExit>,
) {
    if time.elapsed_secs() < 6.0 {
        return;
    }
    println!("\n[FINISHED] Range closed.");
    for (dummy, name) in dummies.iter() {
        let health = range.targets.get(dummy).map_or(0, |h| h.current);
        println!("  {name}: {health} hp");
    }
    exit.write(AppExit::Success);
}
