//! Core components for the weapon system.

use bevy::prelude::*;

use crate::types::{DamageableTarget, MovementState, ReloadSpeedProvider};
use crate::weapon::WeaponInstance;

/// Hit points of anything that can be shot.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_hitscan_arsenal::components::Health;
/// use bevy_hitscan_arsenal::types::DamageableTarget;
///
/// let mut health = Health::new(100);
/// health.take_damage(30, Vec3::ZERO, Vec3::NEG_Z);
/// assert_eq!(health.current, 70);
/// assert!(health.is_alive());
/// ```
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq, Eq)]
#[reflect(Component)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }
}

impl DamageableTarget for Health {
    fn take_damage(&mut self, amount: i32, _point: Vec3, _direction: Vec3) {
        self.current = self.current.saturating_sub(amount.max(0)).max(0);
    }

    fn is_alive(&self) -> bool {
        self.current > 0
    }
}

/// Locomotion flags written by the movement controller.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq, Eq)]
#[reflect(Component)]
pub struct MovementFlags {
    pub grounded: bool,
    pub moving: bool,
}

impl Default for MovementFlags {
    fn default() -> Self {
        Self { grounded: true, moving: false }
    }
}

impl MovementState for MovementFlags {
    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn is_moving(&self) -> bool {
        self.moving
    }
}

/// Reload speed factor granted by perks; 1.0 is unmodified.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct ReloadSpeed(pub f32);

impl Default for ReloadSpeed {
    fn default() -> Self {
        Self(1.0)
    }
}

impl ReloadSpeedProvider for ReloadSpeed {
    fn reload_speed_multiplier(&self) -> f32 {
        self.0
    }
}

/// Trigger state for this frame, written by input handling.
#[derive(Component, Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct TriggerInput {
    pub held: bool,
}

/// Camera a shooter aims and fires from.
///
/// Without one, the shooter's own transform is used as the aim frame.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct Viewpoint {
    pub camera: Entity,
}

/// First-person weapon model driven by the owner's active weapon recoil.
///
/// # Fields
/// * `owner` - Shooter entity carrying the [`Loadout`]
/// * `rest_pose` - Local transform the recoil springs are added onto
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct WeaponViewModel {
    pub owner: Entity,
    pub rest_pose: Transform,
}

/// Weapons owned by a shooter and which one is drawn.
///
/// Switching holsters the drawn weapon (its reload and burst are cancelled)
/// and equips the new one with its recoil reset.
#[derive(Component, Default)]
pub struct Loadout {
    weapons: Vec<WeaponInstance>,
    active: Option<usize>,
}

impl Loadout {
    /// Add a weapon; the first one added is drawn immediately.
    pub fn add(&mut self, mut weapon: WeaponInstance) -> usize {
        let slot = self.weapons.len();
        if self.active.is_none() {
            weapon.equip();
            self.active = Some(slot);
        }
        self.weapons.push(weapon);
        slot
    }

    /// Remove a weapon from the loadout.
    ///
    /// Removing the drawn weapon leaves nothing drawn.
    pub fn remove(&mut self, slot: usize) -> Option<WeaponInstance> {
        if slot >= self.weapons.len() {
            return None;
        }
        let mut weapon = self.weapons.remove(slot);
        self.active = match self.active {
            Some(active) if active == slot => {
                weapon.holster();
                None
            }
            Some(active) if active > slot => Some(active - 1),
            other => other,
        };
        Some(weapon)
    }

    /// Draw the weapon in `slot`. `false` for an unknown or already drawn slot.
    pub fn switch_to(&mut self, slot: usize) -> bool {
        if slot >= self.weapons.len() || self.active == Some(slot) {
            return false;
        }
        if let Some(current) = self.active_mut() {
            current.holster();
        }
        self.weapons[slot].equip();
        self.active = Some(slot);
        true
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.active
    }

    pub fn active(&self) -> Option<&WeaponInstance> {
        self.active.and_then(|slot| self.weapons.get(slot))
    }

    pub fn active_mut(&mut self) -> Option<&mut WeaponInstance> {
        self.active.and_then(|slot| self.weapons.get_mut(slot))
    }

    pub fn get(&self, slot: usize) -> Option<&WeaponInstance> {
        self.weapons.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut WeaponInstance> {
        self.weapons.get_mut(slot)
    }

    pub fn weapons(&self) -> &[WeaponInstance] {
        &self.weapons
    }

    pub fn weapons_mut(&mut self) -> impl Iterator<Item = &mut WeaponInstance> {
        self.weapons.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}

/// Additive transform offset contributed by one layer.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct PoseOffset {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl PoseOffset {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };
}

impl Default for PoseOffset {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Name of one contributor to a [`PoseOffsets`] accumulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OffsetLayer(pub &'static str);

impl OffsetLayer {
    pub const RECOIL: Self = Self("recoil");
}

/// Accumulates additive offsets from named layers onto a transform that
/// other systems also write.
///
/// Each application first retracts what was applied last time, so the
/// offsets never accumulate into the base pose.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_hitscan_arsenal::components::{OffsetLayer, PoseOffset, PoseOffsets};
///
/// let mut offsets = PoseOffsets::default();
/// let mut camera = Transform::IDENTITY;
/// offsets.set(OffsetLayer::RECOIL, PoseOffset { translation: Vec3::Y, rotation: Quat::IDENTITY });
/// offsets.apply_to(&mut camera);
/// offsets.apply_to(&mut camera);
/// assert_eq!(camera.translation, Vec3::Y);
/// ```
#[derive(Component, Clone, Debug, Default)]
pub struct PoseOffsets {
    layers: Vec<(OffsetLayer, PoseOffset)>,
    applied: PoseOffset,
}

impl PoseOffsets {
    /// Replace one layer's contribution.
    pub fn set(&mut self, layer: OffsetLayer, offset: PoseOffset) {
        match self.layers.iter_mut().find(|(name, _)| *name == layer) {
            Some((_, existing)) => *existing = offset,
            None => self.layers.push((layer, offset)),
        }
    }

    pub fn clear(&mut self, layer: OffsetLayer) {
        self.layers.retain(|(name, _)| *name != layer);
    }

    pub fn get(&self, layer: OffsetLayer) -> Option<PoseOffset> {
        self.layers.iter().find(|(name, _)| *name == layer).map(|(_, offset)| *offset)
    }

    /// Sum of every layer.
    pub fn total(&self) -> PoseOffset {
        self.layers.iter().fold(PoseOffset::IDENTITY, |acc, (_, offset)| PoseOffset {
            translation: acc.translation + offset.translation,
            rotation: acc.rotation * offset.rotation,
        })
    }

    /// Offset currently baked into the target transform.
    pub fn applied(&self) -> PoseOffset {
        self.applied
    }

    /// Retract the previous total from `transform` and apply the current one.
    pub fn apply_to(&mut self, transform: &mut Transform) {
        let total = self.total();
        transform.translation += total.translation - self.applied.translation;
        transform.rotation =
            (transform.rotation * self.applied.rotation.inverse() * total.rotation).normalize();
        self.applied = total;
    }
}
