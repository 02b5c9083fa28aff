//! Weapon logic systems - requests, per-frame upkeep and signal forwarding.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{Loadout, OffsetLayer, PoseOffsets, ReloadSpeed, Viewpoint, WeaponViewModel};
use crate::events::*;
use crate::resources::ArsenalConfig;
use crate::weapon::WeaponSignal;

/// Ordering of the arsenal's per-frame work.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArsenalSet {
    /// Switch, reload, upgrade and refill requests
    Requests,
    /// Reload timers, spread recovery, recoil springs
    Advance,
    /// Trigger handling and ray resolution
    Fire,
    /// Weapon signals forwarded as messages
    Signals,
    /// Camera offsets and view models
    Presentation,
}

/// Draw the requested weapon slot.
pub fn handle_switch_requests(
    mut requests: MessageReader<SwitchWeaponRequest>,
    mut loadouts: Query<&mut Loadout>,
) {
    for request in requests.read() {
        let Ok(mut loadout) = loadouts.get_mut(request.shooter) else {
            warn!("Switch request for {:?} which has no loadout", request.shooter);
            continue;
        };
        if !loadout.switch_to(request.slot) {
            debug!("Ignored switch of {:?} to slot {}", request.shooter, request.slot);
        }
    }
}

/// Start a reload on the shooter's drawn weapon.
///
/// The shooter's [`ReloadSpeed`] is read here, once per reload.
pub fn handle_reload_requests(
    mut requests: MessageReader<ReloadRequest>,
    mut loadouts: Query<(&mut Loadout, Option<&ReloadSpeed>)>,
) {
    for request in requests.read() {
        let Ok((mut loadout, speed)) = loadouts.get_mut(request.shooter) else {
            warn!("Reload request for {:?} which has no loadout", request.shooter);
            continue;
        };
        let speed = speed.copied().unwrap_or_default();
        if let Some(weapon) = loadout.active_mut() {
            weapon.reload(&speed);
        }
    }
}

/// Apply a paid-for upgrade to one weapon of the shooter.
pub fn handle_upgrade_requests(
    mut requests: MessageReader<UpgradeRequest>,
    mut loadouts: Query<&mut Loadout>,
) {
    for request in requests.read() {
        let Ok(mut loadout) = loadouts.get_mut(request.shooter) else {
            warn!("Upgrade request for {:?} which has no loadout", request.shooter);
            continue;
        };
        match loadout.get_mut(request.slot) {
            Some(weapon) => {
                if !weapon.apply_upgrade() {
                    warn!(
                        "Upgrade of {} rejected: already at max tier",
                        weapon.profile().name
                    );
                }
            }
            None => warn!("Upgrade request for empty slot {}", request.slot),
        }
    }
}

/// Refill one weapon of the shooter to its current capacities.
pub fn handle_refill_requests(
    mut requests: MessageReader<RefillRequest>,
    mut loadouts: Query<&mut Loadout>,
) {
    for request in requests.read() {
        let Ok(mut loadout) = loadouts.get_mut(request.shooter) else {
            warn!("Refill request for {:?} which has no loadout", request.shooter);
            continue;
        };
        if let Some(weapon) = loadout.get_mut(request.slot) {
            weapon.refill_ammo();
        }
    }
}

/// Tick every owned weapon, drawn or not.
///
/// # Arguments
/// * `time` - Bevy Time resource to get delta time
/// * `config` - Global arsenal tuning
/// * `loadouts` - Every shooter's weapons
pub fn advance_weapons(time: Res<Time>, config: Res<ArsenalConfig>, mut loadouts: Query<&mut Loadout>) {
    let dt = time.delta_secs();
    for mut loadout in loadouts.iter_mut() {
        for weapon in loadout.weapons_mut() {
            weapon.tick(dt, &config);
        }
    }
}

/// Writers for every outgoing arsenal message.
#[derive(SystemParam)]
pub struct SignalWriters<'w> {
    ammo_changed: MessageWriter<'w, AmmoChanged>,
    reload_started: MessageWriter<'w, ReloadStarted>,
    reload_finished: MessageWriter<'w, ReloadFinished>,
    reload_cancelled: MessageWriter<'w, ReloadCancelled>,
    shot_fired: MessageWriter<'w, ShotFired>,
    shot_traced: MessageWriter<'w, ShotTraced>,
    bullet_impact: MessageWriter<'w, BulletImpact>,
    empty_click: MessageWriter<'w, EmptyClick>,
    weapon_upgraded: MessageWriter<'w, WeaponUpgraded>,
}

impl SignalWriters<'_> {
    fn forward(&mut self, shooter: Entity, slot: usize, signal: WeaponSignal) {
        match signal {
            WeaponSignal::AmmoChanged { in_magazine, in_reserve } => {
                self.ammo_changed.write(AmmoChanged { shooter, slot, in_magazine, in_reserve });
            }
            WeaponSignal::ReloadStarted { duration, direction_sign } => {
                self.reload_started.write(ReloadStarted { shooter, slot, duration, direction_sign });
            }
            WeaponSignal::ReloadFinished { transferred } => {
                self.reload_finished.write(ReloadFinished { shooter, slot, transferred });
            }
            WeaponSignal::ReloadCancelled => {
                self.reload_cancelled.write(ReloadCancelled { shooter, slot });
            }
            WeaponSignal::ShotFired => {
                self.shot_fired.write(ShotFired { shooter, slot });
            }
            WeaponSignal::ShotTraced { origin, end_point, did_hit } => {
                self.shot_traced.write(ShotTraced { shooter, origin, end_point, did_hit });
            }
            WeaponSignal::BulletImpact { point, normal, target, was_damageable, damage_applied } => {
                self.bullet_impact.write(BulletImpact {
                    shooter,
                    point,
                    normal,
                    target,
                    was_damageable,
                    damage_applied,
                });
            }
            WeaponSignal::EmptyClick => {
                self.empty_click.write(EmptyClick { shooter, slot });
            }
            WeaponSignal::WeaponUpgraded { tier } => {
                self.weapon_upgraded.write(WeaponUpgraded { shooter, slot, tier });
            }
        }
    }
}

/// Drain every weapon's queued signals into messages.
pub fn forward_weapon_signals(mut writers: SignalWriters, mut loadouts: Query<(Entity, &mut Loadout)>) {
    for (shooter, mut loadout) in loadouts.iter_mut() {
        for (slot, weapon) in loadout.weapons_mut().enumerate() {
            for signal in weapon.drain_signals() {
                writers.forward(shooter, slot, signal);
            }
        }
    }
}

/// Put the drawn weapon's camera recoil on the viewpoint's offset layer.
///
/// Runs after gameplay code has written the camera's base pose.
pub fn apply_camera_offsets(
    shooters: Query<(&Loadout, &Viewpoint)>,
    mut cameras: Query<(&mut Transform, &mut PoseOffsets)>,
) {
    for (loadout, viewpoint) in shooters.iter() {
        let Ok((mut transform, mut offsets)) = cameras.get_mut(viewpoint.camera) else {
            continue;
        };
        match loadout.active() {
            Some(weapon) => offsets.set(OffsetLayer::RECOIL, weapon.recoil().camera_offset()),
            None => offsets.clear(OffsetLayer::RECOIL),
        }
        offsets.apply_to(&mut transform);
    }
}

/// Pose first-person weapon models from their owner's weapon recoil.
pub fn update_weapon_view_models(
    loadouts: Query<&Loadout>,
    mut models: Query<(&WeaponViewModel, &mut Transform)>,
) {
    for (model, mut transform) in models.iter_mut() {
        let pose = loadouts
            .get(model.owner)
            .ok()
            .and_then(Loadout::active)
            .map(|weapon| weapon.recoil().weapon_pose(&model.rest_pose))
            .unwrap_or(model.rest_pose);
        *transform = pose;
    }
}
