//! Distance-based damage falloff, shared by single shots and pellets.

use crate::profile::WeaponProfile;

/// Scale `base_damage` by how far the hit travelled.
///
/// Damage is untouched up to `falloff_start_distance`, then drops linearly
/// towards `max_range`, never below `min_damage_fraction` of the base. Once
/// falloff applies, a connecting hit always deals at least 1.
///
/// # Arguments
/// * `distance` - Distance from the ray origin to the hit
/// * `base_damage` - Damage before falloff (tier-adjusted)
/// * `profile` - Supplies the falloff curve
pub fn falloff_damage(distance: f32, base_damage: i32, profile: &WeaponProfile) -> i32 {
    if !profile.falloff_enabled || distance <= profile.falloff_start_distance {
        return base_damage;
    }

    let falloff_range = profile.max_range - profile.falloff_start_distance;
    if falloff_range <= 0.0 {
        return base_damage;
    }

    let factor = (1.0 - (distance - profile.falloff_start_distance) / falloff_range)
        .clamp(profile.min_damage_fraction, 1.0);

    ((base_damage as f32 * factor).round() as i32).max(1)
}
