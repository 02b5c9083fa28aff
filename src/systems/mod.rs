//! Systems module - weapon algorithms and the ECS systems driving them.

pub mod accuracy;
pub mod ammo;
pub mod ballistics;
pub mod falloff;
pub mod fire_control;
pub mod logic;
pub mod recoil;
pub mod upgrade;

#[cfg(feature = "dim3")]
pub mod scene;
