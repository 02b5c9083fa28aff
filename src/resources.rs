//! Global resources for the weapon core.

use std::sync::Arc;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::profile::{FireMode, ProfileError, ProfileResult, WeaponProfile};

/// Global tuning shared by every weapon.
///
/// # Fields
/// * `empty_click_cooldown` - Minimum time between two "empty" signals from one weapon (seconds)
/// * `deterministic_spread_epsilon` - Spread (degrees) at or below which shots go exactly down the aim line
/// * `recoil_rest_epsilon` - Spring states smaller than this snap to zero
///
/// # Example
/// ```
/// use bevy_hitscan_arsenal::resources::ArsenalConfig;
///
/// let config = ArsenalConfig {
///     empty_click_cooldown: 0.5,
///     ..Default::default()
/// };
/// assert_eq!(config.deterministic_spread_epsilon, 0.01);
/// ```
#[derive(Resource, Reflect, Clone, Debug)]
#[reflect(Resource)]
pub struct ArsenalConfig {
    pub empty_click_cooldown: f64,
    pub deterministic_spread_epsilon: f32,
    pub recoil_rest_epsilon: f32,
}

impl Default for ArsenalConfig {
    fn default() -> Self {
        Self {
            empty_click_cooldown: 1.25,
            deterministic_spread_epsilon: 0.01,
            recoil_rest_epsilon: 1e-4,
        }
    }
}

/// Random source for spread sampling and recoil jitter.
///
/// Seed it for headless or replayable runs.
#[derive(Resource)]
pub struct ArsenalRng(pub StdRng);

impl Default for ArsenalRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl ArsenalRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Registry of validated weapon profiles, looked up by name.
///
/// # Example
/// ```
/// use bevy_hitscan_arsenal::resources::WeaponProfiles;
///
/// let profiles = WeaponProfiles::with_defaults();
/// let rifle = profiles.get("Assault Rifle").unwrap();
/// assert!(rifle.is_automatic);
/// ```
#[derive(Resource, Default, Clone)]
pub struct WeaponProfiles {
    profiles: Vec<Arc<WeaponProfile>>,
}

#[derive(Deserialize)]
struct ProfileFile {
    #[serde(default)]
    weapon: Vec<WeaponProfile>,
}

impl WeaponProfiles {
    /// Validate and register a profile.
    pub fn insert(&mut self, profile: WeaponProfile) -> ProfileResult<Arc<WeaponProfile>> {
        if let Err(err) = profile.validate() {
            warn!("Rejected weapon profile: {err}");
            return Err(err);
        }
        if self.get(&profile.name).is_some() {
            return Err(ProfileError::DuplicateName(profile.name));
        }
        let profile = Arc::new(profile);
        self.profiles.push(profile.clone());
        Ok(profile)
    }

    pub fn get(&self, name: &str) -> Option<Arc<WeaponProfile>> {
        self.profiles.iter().find(|p| p.name == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<WeaponProfile>> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Load a registry from a TOML document of `[[weapon]]` tables.
    ///
    /// Fails on the first invalid or duplicate profile; nothing is partially
    /// registered.
    pub fn from_toml_str(source: &str) -> ProfileResult<Self> {
        let file: ProfileFile = toml::from_str(source)?;
        let mut registry = Self::default();
        for profile in file.weapon {
            registry.insert(profile)?;
        }
        info!("Loaded {} weapon profiles", registry.len());
        Ok(registry)
    }

    /// Built-in profiles, one or more per fire-control variant.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        for profile in presets::all() {
            if let Err(err) = registry.insert(profile) {
                error!("Built-in weapon profile rejected: {err}");
            }
        }
        registry
    }
}

/// Built-in weapon profiles.
pub mod presets {
    use super::*;

    /// Semi-automatic sidearm with mild falloff.
    pub fn pistol() -> WeaponProfile {
        WeaponProfile {
            name: "Pistol".to_string(),
            damage_per_shot: 24,
            fire_interval: 0.18,
            max_range: 60.0,
            magazine_capacity: 12,
            reserve_capacity: 72,
            reload_duration: 1.3,
            falloff_enabled: true,
            falloff_start_distance: 20.0,
            min_damage_fraction: 0.5,
            upgrade_costs: [400, 900],
            ..Default::default()
        }
    }

    /// Heavy revolver that punches through one target.
    pub fn magnum() -> WeaponProfile {
        WeaponProfile {
            name: "Magnum".to_string(),
            damage_per_shot: 70,
            fire_interval: 0.55,
            max_range: 90.0,
            magazine_capacity: 6,
            reserve_capacity: 36,
            reload_duration: 2.2,
            base_spread_degrees: 0.6,
            max_spread_degrees: 5.0,
            spread_gain_per_shot: 1.6,
            spread_decay_rate: 3.0,
            penetration_enabled: true,
            max_penetrations: 1,
            penetration_damage_retention: 0.6,
            recoil_position_kick: Vec3::new(0.008, 0.03, 0.07),
            recoil_rotation_kick: Vec3::new(9.0, 2.0, 3.0),
            recoil_camera_kick: Vec3::new(3.0, 0.8, 0.4),
            reload_direction_sign: -1.0,
            upgrade_costs: [900, 1800],
            ..Default::default()
        }
    }

    /// Fast automatic with wide bloom.
    pub fn smg() -> WeaponProfile {
        WeaponProfile {
            name: "SMG".to_string(),
            damage_per_shot: 14,
            fire_interval: 0.07,
            max_range: 50.0,
            magazine_capacity: 32,
            reserve_capacity: 160,
            reload_duration: 1.6,
            is_automatic: true,
            base_spread_degrees: 1.5,
            max_spread_degrees: 7.0,
            spread_gain_per_shot: 0.35,
            spread_decay_rate: 6.0,
            falloff_enabled: true,
            falloff_start_distance: 15.0,
            min_damage_fraction: 0.4,
            recoil_position_kick: Vec3::new(0.003, 0.006, 0.025),
            recoil_rotation_kick: Vec3::new(2.0, 1.2, 1.0),
            recoil_camera_kick: Vec3::new(0.6, 0.5, 0.1),
            upgrade_costs: [700, 1500],
            ..Default::default()
        }
    }

    /// Full-auto rifle.
    pub fn assault_rifle() -> WeaponProfile {
        WeaponProfile {
            name: "Assault Rifle".to_string(),
            damage_per_shot: 30,
            fire_interval: 0.1,
            max_range: 100.0,
            magazine_capacity: 30,
            reserve_capacity: 120,
            reload_duration: 2.0,
            is_automatic: true,
            base_spread_degrees: 0.8,
            max_spread_degrees: 5.0,
            spread_gain_per_shot: 0.3,
            spread_decay_rate: 4.5,
            falloff_enabled: true,
            falloff_start_distance: 20.0,
            min_damage_fraction: 0.3,
            recoil_position_kick: Vec3::new(0.004, 0.01, 0.035),
            recoil_rotation_kick: Vec3::new(3.0, 1.0, 1.2),
            recoil_camera_kick: Vec3::new(0.9, 0.45, 0.15),
            upgrade_costs: [1000, 2200],
            ..Default::default()
        }
    }

    /// Three-round burst rifle.
    pub fn burst_rifle() -> WeaponProfile {
        WeaponProfile {
            name: "Burst Rifle".to_string(),
            damage_per_shot: 32,
            fire_interval: 0.35,
            max_range: 110.0,
            magazine_capacity: 24,
            reserve_capacity: 96,
            reload_duration: 2.1,
            fire_mode: FireMode::Burst,
            burst_count: 3,
            burst_interval: 0.07,
            base_spread_degrees: 0.5,
            max_spread_degrees: 3.5,
            spread_gain_per_shot: 0.4,
            spread_decay_rate: 4.0,
            falloff_enabled: true,
            falloff_start_distance: 30.0,
            min_damage_fraction: 0.4,
            upgrade_costs: [1100, 2400],
            ..Default::default()
        }
    }

    /// Bolt-style rifle that penetrates several targets.
    pub fn marksman_rifle() -> WeaponProfile {
        WeaponProfile {
            name: "Marksman Rifle".to_string(),
            damage_per_shot: 90,
            fire_interval: 0.9,
            max_range: 250.0,
            magazine_capacity: 5,
            reserve_capacity: 30,
            reload_duration: 2.8,
            base_spread_degrees: 0.05,
            max_spread_degrees: 3.0,
            spread_gain_per_shot: 2.5,
            spread_decay_rate: 2.5,
            moving_spread_multiplier: 4.0,
            airborne_spread_multiplier: 8.0,
            penetration_enabled: true,
            max_penetrations: 3,
            penetration_damage_retention: 0.7,
            falloff_enabled: true,
            falloff_start_distance: 120.0,
            min_damage_fraction: 0.6,
            recoil_position_kick: Vec3::new(0.01, 0.04, 0.1),
            recoil_rotation_kick: Vec3::new(12.0, 2.0, 2.0),
            recoil_camera_kick: Vec3::new(4.0, 0.6, 0.3),
            recoil_spring_stiffness: 120.0,
            recoil_spring_damping: 18.0,
            upgrade_costs: [1500, 3000],
            ..Default::default()
        }
    }

    /// Pump-action shotgun.
    pub fn pump_shotgun() -> WeaponProfile {
        WeaponProfile {
            name: "Pump Shotgun".to_string(),
            damage_per_shot: 80,
            fire_interval: 0.8,
            max_range: 35.0,
            magazine_capacity: 6,
            reserve_capacity: 30,
            reload_duration: 2.5,
            fire_mode: FireMode::Shotgun,
            pellets_per_shot: 8,
            pellet_cone_angle: 10.0,
            base_spread_degrees: 0.0,
            max_spread_degrees: 0.0,
            spread_gain_per_shot: 0.0,
            falloff_enabled: true,
            falloff_start_distance: 8.0,
            min_damage_fraction: 0.2,
            recoil_position_kick: Vec3::new(0.01, 0.03, 0.09),
            recoil_rotation_kick: Vec3::new(10.0, 2.5, 3.0),
            recoil_camera_kick: Vec3::new(3.5, 1.0, 0.5),
            reload_direction_sign: -1.0,
            upgrade_costs: [800, 1700],
            ..Default::default()
        }
    }

    /// Magazine-fed automatic shotgun.
    pub fn auto_shotgun() -> WeaponProfile {
        WeaponProfile {
            name: "Auto Shotgun".to_string(),
            damage_per_shot: 60,
            fire_interval: 0.3,
            max_range: 30.0,
            magazine_capacity: 10,
            reserve_capacity: 40,
            reload_duration: 2.7,
            is_automatic: true,
            fire_mode: FireMode::Shotgun,
            pellets_per_shot: 6,
            pellet_cone_angle: 12.0,
            per_pellet_damage: Some(9),
            base_spread_degrees: 0.0,
            max_spread_degrees: 0.0,
            spread_gain_per_shot: 0.0,
            falloff_enabled: true,
            falloff_start_distance: 6.0,
            min_damage_fraction: 0.25,
            recoil_position_kick: Vec3::new(0.008, 0.02, 0.06),
            recoil_rotation_kick: Vec3::new(6.0, 2.0, 2.0),
            recoil_camera_kick: Vec3::new(2.0, 0.8, 0.4),
            upgrade_costs: [1200, 2500],
            ..Default::default()
        }
    }

    pub fn all() -> Vec<WeaponProfile> {
        vec![
            pistol(),
            magnum(),
            smg(),
            assault_rifle(),
            burst_rifle(),
            marksman_rifle(),
            pump_shotgun(),
            auto_shotgun(),
        ]
    }
}
