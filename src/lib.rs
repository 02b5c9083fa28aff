//! # Bevy Hitscan Arsenal
//!
//! Hitscan weapon combat for first-person games on Bevy 0.18.
//!
//! ## Features
//! - Cone-sampled hitscan rays with penetration and multi-pellet shots
//! - Distance damage falloff
//! - Automatic, semi-automatic, burst and shotgun fire control
//! - Magazine/reserve ammunition with timed, cancellable reloads
//! - Three-tier weapon upgrades
//! - Spring-driven recoil for the weapon model and the camera
//! - TOML weapon profiles
//! - 3D physics scene queries via avian3d (feature `dim3`)
//!
//! The algorithms live in plain structs ([`weapon::WeaponInstance`] and the
//! `systems::*` modules) that take their collaborators as traits, so they run
//! without an ECS world. The plugins wire them to Bevy messages and
//! components.
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_hitscan_arsenal::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(ArsenalPluginGroup)
//!         .run();
//! }
//! ```

pub mod components;
pub mod events;
pub mod headless;
pub mod profile;
pub mod resources;
pub mod systems;
pub mod types;
pub mod weapon;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::events::*;
    pub use crate::profile::{FireMode, ProfileError, ProfileResult, WeaponProfile};
    pub use crate::resources::*;
    pub use crate::systems::logic::ArsenalSet;
    pub use crate::systems::upgrade::UpgradeTier;
    pub use crate::types::*;
    pub use crate::weapon::{FireContext, WeaponInstance, WeaponSignal};
    pub use crate::ArsenalPluginGroup;
    pub use crate::ArsenalCorePlugin;
    #[cfg(feature = "dim3")]
    pub use crate::ArsenalScenePlugin;
}

use bevy::prelude::*;

use systems::logic::ArsenalSet;

/// Main plugin group that includes all arsenal subsystems.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_hitscan_arsenal::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(MinimalPlugins)
///         .add_plugins(ArsenalPluginGroup)
///         .update();
/// }
/// ```
#[derive(Default)]
pub struct ArsenalPluginGroup;

impl PluginGroup for ArsenalPluginGroup {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        let builder = bevy::app::PluginGroupBuilder::start::<Self>().add(ArsenalCorePlugin);
        #[cfg(feature = "dim3")]
        let builder = builder.add(ArsenalScenePlugin);
        builder
    }
}

/// Weapon state, requests and signals.
///
/// Runs every frame in `Update`, in [`ArsenalSet`] order:
/// - `Requests` - switch, reload, upgrade and refill requests
/// - `Advance` - reload timers, spread recovery, recoil springs
/// - `Fire` - trigger handling (added by [`ArsenalScenePlugin`])
/// - `Signals` - weapon signals written as messages
/// - `Presentation` - camera recoil offsets and weapon view models
pub struct ArsenalCorePlugin;

impl Plugin for ArsenalCorePlugin {
    /// Registers components, resources and messages, and schedules the
    /// per-frame systems.
    ///
    /// # Arguments
    /// * `app` - Mutable reference to the Bevy App
    fn build(&self, app: &mut App) {
        app.register_type::<components::Health>()
            .register_type::<components::MovementFlags>()
            .register_type::<components::ReloadSpeed>()
            .register_type::<components::TriggerInput>()
            .register_type::<components::Viewpoint>()
            .register_type::<components::WeaponViewModel>()
            .register_type::<resources::ArsenalConfig>()
            .init_resource::<resources::ArsenalConfig>()
            .init_resource::<resources::ArsenalRng>()
            .add_message::<events::ReloadRequest>()
            .add_message::<events::UpgradeRequest>()
            .add_message::<events::SwitchWeaponRequest>()
            .add_message::<events::RefillRequest>()
            .add_message::<events::AmmoChanged>()
            .add_message::<events::ReloadStarted>()
            .add_message::<events::ReloadFinished>()
            .add_message::<events::ReloadCancelled>()
            .add_message::<events::ShotFired>()
            .add_message::<events::ShotTraced>()
            .add_message::<events::BulletImpact>()
            .add_message::<events::EmptyClick>()
            .add_message::<events::WeaponUpgraded>()
            .configure_sets(
                Update,
                (
                    ArsenalSet::Requests,
                    ArsenalSet::Advance,
                    ArsenalSet::Fire,
                    ArsenalSet::Signals,
                    ArsenalSet::Presentation,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    systems::logic::handle_switch_requests,
                    systems::logic::handle_reload_requests,
                    systems::logic::handle_upgrade_requests,
                    systems::logic::handle_refill_requests,
                )
                    .chain()
                    .in_set(ArsenalSet::Requests),
            )
            .add_systems(
                Update,
                systems::logic::advance_weapons.in_set(ArsenalSet::Advance),
            )
            .add_systems(
                Update,
                systems::logic::forward_weapon_signals.in_set(ArsenalSet::Signals),
            )
            .add_systems(
                Update,
                (
                    systems::logic::apply_camera_offsets,
                    systems::logic::update_weapon_view_models,
                )
                    .in_set(ArsenalSet::Presentation),
            );
    }
}

/// Firing against the avian3d physics scene.
///
/// # Systems
/// - `fire_weapons` - Reads each shooter's trigger and resolves shots with
///   spatial ray queries
#[cfg(feature = "dim3")]
pub struct ArsenalScenePlugin;

#[cfg(feature = "dim3")]
impl Plugin for ArsenalScenePlugin {
    fn build(&self, app: &mut App) {
        use avian3d::prelude::SpatialQueryPipeline;
        app.add_systems(
            Update,
            systems::scene::fire_weapons
                .in_set(ArsenalSet::Fire)
                .run_if(resource_exists::<SpatialQueryPipeline>),
        );
    }
}
