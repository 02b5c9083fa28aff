#[cfg(test)]
mod plugin_messages {
    use std::sync::Arc;
    use std::time::Duration;

    use bevy::ecs::message::MessageReader;
    use bevy::prelude::*;
    use bevy::time::TimeUpdateStrategy;
    use bevy_hitscan_arsenal::headless::{HeadlessScene, TargetTable};
    use bevy_hitscan_arsenal::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Resource, Default)]
    struct Log {
        started: Vec<ReloadStarted>,
        finished: Vec<ReloadFinished>,
        ammo: Vec<AmmoChanged>,
        upgraded: Vec<WeaponUpgraded>,
    }

    fn record(
        mut started: MessageReader<ReloadStarted>,
        mut finished: MessageReader<ReloadFinished>,
        mut ammo: MessageReader<AmmoChanged>,
        mut upgraded: MessageReader<WeaponUpgraded>,
        mut log: ResMut<Log>,
    ) {
        log.started.extend(started.read().copied());
        log.finished.extend(finished.read().copied());
        log.ammo.extend(ammo.read().copied());
        log.upgraded.extend(upgraded.read().copied());
    }

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(ArsenalCorePlugin)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
            .init_resource::<Log>()
            .add_systems(Update, record.after(ArsenalSet::Signals));
        app
    }

    fn shooter_with(profiles: &WeaponProfiles, names: &[&str]) -> Loadout {
        let mut loadout = Loadout::default();
        for name in names {
            let profile = profiles.get(name).unwrap();
            loadout.add(WeaponInstance::new(profile));
        }
        loadout
    }

    /// A pistol with one round already spent.
    fn spent_pistol(profiles: &WeaponProfiles) -> WeaponInstance {
        let mut world = World::new();
        let shooter = world.spawn_empty().id();
        let scene = HeadlessScene::default();
        let mut targets = TargetTable::default();
        let movement = MovementFlags::default();
        let mut rng = StdRng::seed_from_u64(7);
        let config = ArsenalConfig::default();

        let mut weapon = WeaponInstance::new(profiles.get("Pistol").unwrap());
        let mut ctx = FireContext {
            now: 0.0,
            shooter,
            aim: AimFrame::looking(Vec3::ZERO, Vec3::NEG_Z),
            scene: &scene,
            targets: &mut targets,
            movement: &movement,
            rng: &mut rng,
            config: &config,
        };
        assert!(weapon.try_shoot(&mut ctx));
        weapon
    }

    #[test]
    fn reload_request_runs_to_completion() {
        let profiles = WeaponProfiles::with_defaults();
        let mut app = app();
        let mut loadout = Loadout::default();
        loadout.add(spent_pistol(&profiles));
        let shooter = app.world_mut().spawn((loadout, ReloadSpeed(2.0))).id();
        app.update();

        app.world_mut().write_message(ReloadRequest { shooter });
        app.update();
        {
            let log = app.world().resource::<Log>();
            assert_eq!(log.started.len(), 1);
            assert_eq!(log.started[0].shooter, shooter);
            assert!((log.started[0].duration - 0.65).abs() < 1e-4);
            assert!(log.finished.is_empty());
        }

        for _ in 0..12 {
            app.update();
        }

        let log = app.world().resource::<Log>();
        assert_eq!(log.finished.len(), 1);
        assert_eq!(log.finished[0].transferred, 1);
        let last = log.ammo.last().unwrap();
        assert_eq!(last.in_magazine, 12);
        assert_eq!(last.in_reserve, 71);
    }

    #[test]
    fn full_magazine_refuses_reload() {
        let profiles = WeaponProfiles::with_defaults();
        let mut app = app();
        let shooter = app
            .world_mut()
            .spawn(shooter_with(&profiles, &["Pistol"]))
            .id();
        app.update();

        app.world_mut().write_message(ReloadRequest { shooter });
        app.update();
        assert!(app.world().resource::<Log>().started.is_empty());
    }

    #[test]
    fn upgrade_request_reports_new_tier() {
        let profiles = WeaponProfiles::with_defaults();
        let mut app = app();
        let shooter = app
            .world_mut()
            .spawn(shooter_with(&profiles, &["Pistol"]))
            .id();
        app.update();

        app.world_mut().write_message(UpgradeRequest { shooter, slot: 0 });
        app.update();
        let upgraded_magazine = {
            let loadout = app.world().get::<Loadout>(shooter).unwrap();
            loadout.active().unwrap().in_magazine()
        };
        let log = app.world().resource::<Log>();
        assert_eq!(log.upgraded.len(), 1);
        assert_eq!(log.upgraded[0].tier, UpgradeTier::Improved);
        assert_eq!(upgraded_magazine, 16);
        assert_eq!(log.ammo.last().unwrap().in_magazine, upgraded_magazine);
    }

    #[test]
    fn signals_carry_shooter_and_slot() {
        let profiles = WeaponProfiles::with_defaults();
        let mut app = app();
        let first = app
            .world_mut()
            .spawn(shooter_with(&profiles, &["Pistol", "SMG"]))
            .id();
        let second = app
            .world_mut()
            .spawn(shooter_with(&profiles, &["Pump Shotgun"]))
            .id();
        app.update();

        let log = app.world().resource::<Log>();
        assert_eq!(log.ammo.len(), 3);
        assert!(log.ammo.iter().any(|m| m.shooter == first && m.slot == 1));
        assert!(log.ammo.iter().any(|m| m.shooter == second && m.slot == 0));
    }

    #[test]
    fn refill_request_tops_up_reserve() {
        let profiles = WeaponProfiles::with_defaults();
        let mut app = app();
        let shooter = app
            .world_mut()
            .spawn(shooter_with(&profiles, &["Assault Rifle"]))
            .id();
        app.update();

        app.world_mut().write_message(RefillRequest { shooter, slot: 0 });
        app.world_mut().write_message(RefillRequest { shooter, slot: 4 });
        app.update();

        let log = app.world().resource::<Log>();
        let rifle: Arc<WeaponProfile> = profiles.get("Assault Rifle").unwrap();
        let last = log.ammo.last().unwrap();
        assert_eq!(last.in_magazine, rifle.magazine_capacity);
        assert_eq!(last.in_reserve, rifle.reserve_capacity);
    }
}
