//! Upgrade ladder - three permanent tiers of stat multipliers.

use bevy::prelude::*;

use crate::profile::WeaponProfile;

/// Damage multiplier per tier.
pub const DAMAGE_MULTIPLIERS: [f32; 3] = [1.0, 1.25, 1.55];
/// Fire interval multiplier per tier (lower is faster).
pub const FIRE_INTERVAL_MULTIPLIERS: [f32; 3] = [1.0, 0.88, 0.75];
/// Magazine and reserve capacity multiplier per tier.
pub const CAPACITY_MULTIPLIERS: [f32; 3] = [1.0, 1.3, 1.6];
/// Base and max spread multiplier per tier.
pub const SPREAD_MULTIPLIERS: [f32; 3] = [1.0, 0.9, 0.8];
/// Reload duration multiplier per tier.
pub const RELOAD_MULTIPLIERS: [f32; 3] = [1.0, 0.92, 0.85];

/// Upgrade level of one weapon instance. Never decreases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub enum UpgradeTier {
    #[default]
    Base,
    Improved,
    Maxed,
}

impl UpgradeTier {
    pub fn index(self) -> usize {
        match self {
            UpgradeTier::Base => 0,
            UpgradeTier::Improved => 1,
            UpgradeTier::Maxed => 2,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            UpgradeTier::Base => Some(UpgradeTier::Improved),
            UpgradeTier::Improved => Some(UpgradeTier::Maxed),
            UpgradeTier::Maxed => None,
        }
    }
}

/// Profile values with one tier's multipliers applied.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct TierStats {
    pub damage: i32,
    /// Damage carried by one pellet of a multi-pellet shot
    pub pellet_damage: i32,
    pub fire_interval: f32,
    pub magazine_capacity: u32,
    pub reserve_capacity: u32,
    pub base_spread: f32,
    pub max_spread: f32,
    pub reload_duration: f32,
}

fn scale_count(value: u32, multiplier: f32) -> u32 {
    (value as f32 * multiplier).round() as u32
}

fn scale_damage(value: i32, multiplier: f32) -> i32 {
    ((value as f32 * multiplier).round() as i32).max(1)
}

impl TierStats {
    /// Apply the tier tables to `profile`.
    ///
    /// Integer stats are rounded to the nearest whole value; the magazine
    /// never drops below one round and damage never below one point. A
    /// per-pellet override is scaled like shot damage; otherwise pellets
    /// split the tiered shot damage evenly, rounding down.
    pub fn compute(profile: &WeaponProfile, tier: UpgradeTier) -> Self {
        let i = tier.index();
        let damage = scale_damage(profile.damage_per_shot, DAMAGE_MULTIPLIERS[i]);
        let pellet_damage = match profile.per_pellet_damage {
            Some(per_pellet) => scale_damage(per_pellet, DAMAGE_MULTIPLIERS[i]),
            None => (damage / profile.pellets_per_shot.max(1) as i32).max(1),
        };
        Self {
            damage,
            pellet_damage,
            fire_interval: profile.fire_interval * FIRE_INTERVAL_MULTIPLIERS[i],
            magazine_capacity: scale_count(profile.magazine_capacity, CAPACITY_MULTIPLIERS[i]).max(1),
            reserve_capacity: scale_count(profile.reserve_capacity, CAPACITY_MULTIPLIERS[i]),
            base_spread: profile.base_spread_degrees * SPREAD_MULTIPLIERS[i],
            max_spread: profile.max_spread_degrees * SPREAD_MULTIPLIERS[i],
            reload_duration: profile.reload_duration * RELOAD_MULTIPLIERS[i],
        }
    }
}

/// Current tier plus the stats derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct UpgradeLadder {
    tier: UpgradeTier,
    stats: TierStats,
}

impl UpgradeLadder {
    pub fn new(profile: &WeaponProfile) -> Self {
        Self {
            tier: UpgradeTier::Base,
            stats: TierStats::compute(profile, UpgradeTier::Base),
        }
    }

    pub fn tier(&self) -> UpgradeTier {
        self.tier
    }

    pub fn stats(&self) -> &TierStats {
        &self.stats
    }

    pub fn is_maxed(&self) -> bool {
        self.tier.next().is_none()
    }

    /// Move one tier up and recompute stats. `None` at the top tier.
    pub fn try_advance(&mut self, profile: &WeaponProfile) -> Option<UpgradeTier> {
        let next = self.tier.next()?;
        self.tier = next;
        self.stats = TierStats::compute(profile, next);
        Some(next)
    }
}

/// Price of the next tier for this archetype, `None` when maxed.
pub fn upgrade_cost(profile: &WeaponProfile, current: UpgradeTier) -> Option<u32> {
    current.next().map(|next| profile.upgrade_costs[next.index() - 1])
}
