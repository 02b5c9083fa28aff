//! Weapon profiles - immutable per-weapon-type tuning.
//!
//! A [`WeaponProfile`] is authored once (in code or in TOML) and validated
//! before any weapon instance is built from it. Nothing in the firing path
//! re-checks or clamps these values.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating or loading weapon profiles.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Max range must be a positive, finite distance.
    #[error("weapon `{name}`: max range must be positive (got {value})")]
    ZeroRange { name: String, value: f32 },

    /// A shot must produce at least one pellet.
    #[error("weapon `{name}`: pellets per shot must be at least 1")]
    ZeroPellets { name: String },

    /// Shotgun pellets would deal zero damage each.
    #[error("weapon `{name}`: {damage} damage split across {pellets} pellets rounds to zero")]
    PelletDamageTooLow { name: String, damage: i32, pellets: u32 },

    /// Magazine must hold at least one round.
    #[error("weapon `{name}`: magazine capacity must be at least 1")]
    ZeroMagazine { name: String },

    /// Damage per shot must be at least 1.
    #[error("weapon `{name}`: damage per shot must be at least 1 (got {value})")]
    NonPositiveDamage { name: String, value: i32 },

    /// Fire interval must be positive.
    #[error("weapon `{name}`: fire interval must be positive (got {value})")]
    NonPositiveFireInterval { name: String, value: f32 },

    /// Penetration retention must be in (0, 1].
    #[error("weapon `{name}`: penetration damage retention must be in (0, 1] (got {value})")]
    InvalidRetention { name: String, value: f32 },

    /// Minimum falloff fraction must be in (0, 1].
    #[error("weapon `{name}`: minimum damage fraction must be in (0, 1] (got {value})")]
    InvalidMinDamageFraction { name: String, value: f32 },

    /// Spread range is negative or inverted.
    #[error("weapon `{name}`: spread must satisfy 0 <= base ({base}) <= max ({max})")]
    InvalidSpreadRange { name: String, base: f32, max: f32 },

    /// Burst weapons need a positive round count and a non-negative interval.
    #[error("weapon `{name}`: burst needs count >= 1 and interval >= 0 (got {count}, {interval})")]
    InvalidBurst { name: String, count: u32, interval: f32 },

    /// Reload duration must not be negative.
    #[error("weapon `{name}`: reload duration must not be negative (got {value})")]
    NegativeReloadDuration { name: String, value: f32 },

    /// Spring constants must not be negative.
    #[error("weapon `{name}`: recoil spring stiffness and damping must be >= 0")]
    InvalidRecoilSpring { name: String },

    /// Two profiles in one registry share a name.
    #[error("duplicate weapon profile name: {0}")]
    DuplicateName(String),

    /// TOML could not be parsed into profiles.
    #[error("failed to parse weapon profile TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for profile validation and loading.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// How a trigger pull turns into rays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireMode {
    /// One ray per shot (optionally penetrating).
    #[default]
    Normal,
    /// A press fires a short sequence of rounds.
    Burst,
    /// One shot fires several independent pellets.
    Shotgun,
}

/// Immutable per-weapon-type tuning.
///
/// Angles are in degrees, distances in world units, times in seconds.
/// Spread values describe the full cone angle; shots sample inside a cone of
/// half of that angle around the aim direction.
///
/// # Example
/// ```
/// use bevy_hitscan_arsenal::profile::{FireMode, WeaponProfile};
///
/// let profile = WeaponProfile {
///     name: "Carbine".to_string(),
///     damage_per_shot: 28,
///     fire_interval: 0.1,
///     is_automatic: true,
///     ..Default::default()
/// };
/// assert!(profile.validate().is_ok());
/// assert_eq!(profile.fire_mode, FireMode::Normal);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponProfile {
    pub name: String,
    pub damage_per_shot: i32,
    /// Minimum time between shots (seconds)
    pub fire_interval: f32,
    pub max_range: f32,
    pub magazine_capacity: u32,
    pub reserve_capacity: u32,
    /// Base reload time before tier and perk multipliers (seconds)
    pub reload_duration: f32,
    pub is_automatic: bool,
    pub fire_mode: FireMode,

    pub burst_count: u32,
    /// Time between rounds inside one burst (seconds)
    pub burst_interval: f32,

    pub pellets_per_shot: u32,
    /// Full cone angle pellets are scattered in (degrees)
    pub pellet_cone_angle: f32,
    /// Overrides `damage_per_shot / pellets_per_shot` when set
    pub per_pellet_damage: Option<i32>,

    pub base_spread_degrees: f32,
    pub max_spread_degrees: f32,
    pub spread_gain_per_shot: f32,
    /// Spread recovered per second (degrees/s)
    pub spread_decay_rate: f32,
    pub moving_spread_multiplier: f32,
    pub airborne_spread_multiplier: f32,

    pub penetration_enabled: bool,
    pub max_penetrations: u32,
    /// Damage multiplier kept after each penetrated target, in (0, 1]
    pub penetration_damage_retention: f32,

    pub falloff_enabled: bool,
    pub falloff_start_distance: f32,
    /// Floor of the falloff factor, in (0, 1]
    pub min_damage_fraction: f32,

    /// Weapon pose kick: (lateral jitter, rise, retreat)
    pub recoil_position_kick: Vec3,
    /// Weapon rotation kick in degrees: (pitch, yaw jitter, roll jitter)
    pub recoil_rotation_kick: Vec3,
    /// Camera rotation kick in degrees: (pitch, yaw jitter, roll jitter)
    pub recoil_camera_kick: Vec3,
    pub recoil_spring_stiffness: f32,
    pub recoil_spring_damping: f32,
    /// Largest weapon position offset the spring may reach
    pub recoil_max_position_offset: f32,
    /// Largest rotation offset in degrees (weapon and camera)
    pub recoil_max_rotation_offset: f32,

    /// Which way the reload animation turns the weapon (+1 or -1)
    pub reload_direction_sign: f32,
    /// Cost of reaching tier 1 and tier 2
    pub upgrade_costs: [u32; 2],
}

impl Default for WeaponProfile {
    /// A plain semi-automatic sidearm.
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            damage_per_shot: 20,
            fire_interval: 0.25,
            max_range: 100.0,
            magazine_capacity: 12,
            reserve_capacity: 48,
            reload_duration: 1.5,
            is_automatic: false,
            fire_mode: FireMode::Normal,
            burst_count: 3,
            burst_interval: 0.08,
            pellets_per_shot: 1,
            pellet_cone_angle: 0.0,
            per_pellet_damage: None,
            base_spread_degrees: 1.0,
            max_spread_degrees: 4.0,
            spread_gain_per_shot: 0.5,
            spread_decay_rate: 4.0,
            moving_spread_multiplier: 1.5,
            airborne_spread_multiplier: 2.5,
            penetration_enabled: false,
            max_penetrations: 0,
            penetration_damage_retention: 0.5,
            falloff_enabled: false,
            falloff_start_distance: 30.0,
            min_damage_fraction: 0.5,
            recoil_position_kick: Vec3::new(0.004, 0.01, 0.04),
            recoil_rotation_kick: Vec3::new(4.0, 1.0, 1.5),
            recoil_camera_kick: Vec3::new(1.2, 0.4, 0.2),
            recoil_spring_stiffness: 180.0,
            recoil_spring_damping: 24.0,
            recoil_max_position_offset: 0.15,
            recoil_max_rotation_offset: 20.0,
            reload_direction_sign: 1.0,
            upgrade_costs: [500, 1200],
        }
    }
}

impl WeaponProfile {
    /// Check every invariant the firing path relies on.
    ///
    /// Malformed values are reported, never clamped.
    pub fn validate(&self) -> ProfileResult<()> {
        let name = || self.name.clone();

        if !(self.max_range.is_finite() && self.max_range > 0.0) {
            return Err(ProfileError::ZeroRange { name: name(), value: self.max_range });
        }
        if self.magazine_capacity == 0 {
            return Err(ProfileError::ZeroMagazine { name: name() });
        }
        if self.damage_per_shot < 1 {
            return Err(ProfileError::NonPositiveDamage { name: name(), value: self.damage_per_shot });
        }
        if !(self.fire_interval > 0.0) {
            return Err(ProfileError::NonPositiveFireInterval {
                name: name(),
                value: self.fire_interval,
            });
        }
        if self.pellets_per_shot == 0 {
            return Err(ProfileError::ZeroPellets { name: name() });
        }
        if self.fire_mode == FireMode::Shotgun && self.pellet_damage() < 1 {
            return Err(ProfileError::PelletDamageTooLow {
                name: name(),
                damage: self.per_pellet_damage.unwrap_or(self.damage_per_shot),
                pellets: self.pellets_per_shot,
            });
        }
        let retention = self.penetration_damage_retention;
        if !(retention > 0.0 && retention <= 1.0) {
            return Err(ProfileError::InvalidRetention { name: name(), value: retention });
        }
        let min_fraction = self.min_damage_fraction;
        if !(min_fraction > 0.0 && min_fraction <= 1.0) {
            return Err(ProfileError::InvalidMinDamageFraction { name: name(), value: min_fraction });
        }
        if !(self.base_spread_degrees >= 0.0 && self.base_spread_degrees <= self.max_spread_degrees) {
            return Err(ProfileError::InvalidSpreadRange {
                name: name(),
                base: self.base_spread_degrees,
                max: self.max_spread_degrees,
            });
        }
        if self.fire_mode == FireMode::Burst
            && (self.burst_count == 0 || !(self.burst_interval >= 0.0))
        {
            return Err(ProfileError::InvalidBurst {
                name: name(),
                count: self.burst_count,
                interval: self.burst_interval,
            });
        }
        if !(self.reload_duration >= 0.0) {
            return Err(ProfileError::NegativeReloadDuration {
                name: name(),
                value: self.reload_duration,
            });
        }
        if !(self.recoil_spring_stiffness >= 0.0 && self.recoil_spring_damping >= 0.0) {
            return Err(ProfileError::InvalidRecoilSpring { name: name() });
        }
        Ok(())
    }

    /// Untiered damage dealt by one pellet before falloff.
    ///
    /// The explicit override wins; otherwise the shot damage is split evenly
    /// and rounded down.
    pub fn pellet_damage(&self) -> i32 {
        match self.per_pellet_damage {
            Some(damage) => damage,
            None => self.damage_per_shot / self.pellets_per_shot.max(1) as i32,
        }
    }

    /// Parse a single profile from TOML and validate it.
    pub fn from_toml_str(source: &str) -> ProfileResult<Self> {
        let profile: WeaponProfile = toml::from_str(source)?;
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(WeaponProfile::default().validate().is_ok());
    }

    #[test]
    fn test_zero_range_rejected() {
        let profile = WeaponProfile { max_range: 0.0, ..Default::default() };
        assert!(matches!(profile.validate(), Err(ProfileError::ZeroRange { .. })));
    }

    #[test]
    fn test_zero_pellets_rejected() {
        let profile = WeaponProfile {
            fire_mode: FireMode::Shotgun,
            pellets_per_shot: 0,
            ..Default::default()
        };
        assert!(matches!(profile.validate(), Err(ProfileError::ZeroPellets { .. })));
    }

    #[test]
    fn test_retention_bounds() {
        let zero = WeaponProfile { penetration_damage_retention: 0.0, ..Default::default() };
        assert!(matches!(zero.validate(), Err(ProfileError::InvalidRetention { .. })));

        let above_one = WeaponProfile { penetration_damage_retention: 1.2, ..Default::default() };
        assert!(matches!(above_one.validate(), Err(ProfileError::InvalidRetention { .. })));

        let one = WeaponProfile { penetration_damage_retention: 1.0, ..Default::default() };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_min_damage_fraction_bounds() {
        let zero = WeaponProfile { min_damage_fraction: 0.0, ..Default::default() };
        assert!(matches!(
            zero.validate(),
            Err(ProfileError::InvalidMinDamageFraction { .. })
        ));
    }

    #[test]
    fn test_pellet_damage_split_rounds_down() {
        let profile = WeaponProfile {
            fire_mode: FireMode::Shotgun,
            damage_per_shot: 80,
            pellets_per_shot: 8,
            ..Default::default()
        };
        assert_eq!(profile.pellet_damage(), 10);

        let uneven = WeaponProfile { damage_per_shot: 85, ..profile.clone() };
        assert_eq!(uneven.pellet_damage(), 10);

        let overridden = WeaponProfile { per_pellet_damage: Some(14), ..profile };
        assert_eq!(overridden.pellet_damage(), 14);
    }

    #[test]
    fn test_pellets_that_round_to_zero_are_rejected() {
        let profile = WeaponProfile {
            fire_mode: FireMode::Shotgun,
            damage_per_shot: 5,
            pellets_per_shot: 8,
            ..Default::default()
        };
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::PelletDamageTooLow { .. })
        ));
    }

    #[test]
    fn test_inverted_spread_rejected() {
        let profile = WeaponProfile {
            base_spread_degrees: 5.0,
            max_spread_degrees: 2.0,
            ..Default::default()
        };
        assert!(matches!(profile.validate(), Err(ProfileError::InvalidSpreadRange { .. })));
    }

    #[test]
    fn test_from_toml_applies_defaults() {
        let profile = WeaponProfile::from_toml_str(
            r#"
            name = "Scattergun"
            damage_per_shot = 96
            fire_mode = "shotgun"
            pellets_per_shot = 12
            pellet_cone_angle = 9.0
            recoil_position_kick = [0.01, 0.02, 0.08]
            "#,
        )
        .unwrap();

        assert_eq!(profile.name, "Scattergun");
        assert_eq!(profile.fire_mode, FireMode::Shotgun);
        assert_eq!(profile.pellet_damage(), 8);
        assert_eq!(profile.recoil_position_kick, Vec3::new(0.01, 0.02, 0.08));
        assert_eq!(profile.magazine_capacity, WeaponProfile::default().magazine_capacity);
    }

    #[test]
    fn test_from_toml_rejects_invalid_profile() {
        let result = WeaponProfile::from_toml_str("name = \"Broken\"\nmax_range = 0.0\n");
        assert!(matches!(result, Err(ProfileError::ZeroRange { .. })));
    }
}
