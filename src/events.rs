//! Messages in and out of the weapon system.
//!
//! Requests are written by gameplay code (input, shop, pickups) and read by
//! the arsenal systems. Signals are written by the arsenal and are
//! fire-and-forget for UI, audio and effects.
//!
//! Note: In Bevy 0.18, buffered events use the `Message` trait instead of `Event`.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::systems::upgrade::UpgradeTier;

/// Ask a shooter's active weapon to reload.
#[derive(Message, Clone, Copy, Debug)]
pub struct ReloadRequest {
    pub shooter: Entity,
}

/// Apply one upgrade tier to the weapon in `slot`.
///
/// Send only after the purchase has been paid for; the arsenal performs no
/// currency checks.
#[derive(Message, Clone, Copy, Debug)]
pub struct UpgradeRequest {
    pub shooter: Entity,
    pub slot: usize,
}

/// Draw the weapon in `slot`.
#[derive(Message, Clone, Copy, Debug)]
pub struct SwitchWeaponRequest {
    pub shooter: Entity,
    pub slot: usize,
}

/// Refill a weapon to its current capacities (ammo pickup).
#[derive(Message, Clone, Copy, Debug)]
pub struct RefillRequest {
    pub shooter: Entity,
    pub slot: usize,
}

/// Magazine or reserve count changed.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct AmmoChanged {
    pub shooter: Entity,
    pub slot: usize,
    pub in_magazine: u32,
    pub in_reserve: u32,
}

/// A reload began.
///
/// # Fields
/// * `duration` - Seconds until the rounds are transferred
/// * `direction_sign` - Which way the reload animation should turn the weapon
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ReloadStarted {
    pub shooter: Entity,
    pub slot: usize,
    pub duration: f32,
    pub direction_sign: f32,
}

/// A reload completed and `transferred` rounds moved into the magazine.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ReloadFinished {
    pub shooter: Entity,
    pub slot: usize,
    pub transferred: u32,
}

/// A reload was dropped (holster or upgrade) without moving rounds.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ReloadCancelled {
    pub shooter: Entity,
    pub slot: usize,
}

/// A round left the barrel.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ShotFired {
    pub shooter: Entity,
    pub slot: usize,
}

/// One ray (or pellet) with its tracer endpoints.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct ShotTraced {
    pub shooter: Entity,
    pub origin: Vec3,
    pub end_point: Vec3,
    pub did_hit: bool,
}

/// A ray connected with something.
///
/// # Fields
/// * `point` - World-space hit point
/// * `normal` - Surface normal for decals
/// * `target` - Collider entity that was hit
/// * `was_damageable` - Whether a live target took damage
/// * `damage_applied` - Damage actually delivered
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct BulletImpact {
    pub shooter: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub target: Entity,
    pub was_damageable: bool,
    pub damage_applied: i32,
}

/// Trigger pulled on an empty magazine (rate limited).
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct EmptyClick {
    pub shooter: Entity,
    pub slot: usize,
}

/// A weapon reached a new tier.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct WeaponUpgraded {
    pub shooter: Entity,
    pub slot: usize,
    pub tier: UpgradeTier,
}
