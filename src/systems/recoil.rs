//! Recoil - damped springs driving the weapon pose and a camera offset.
//!
//! Shots add to the spring state instead of replacing it, so sustained fire
//! climbs. The springs are integrated every tick whether or not the weapon
//! fires.

use bevy::prelude::*;
use rand::Rng;

use crate::components::PoseOffset;
use crate::profile::WeaponProfile;

/// Longest step the integrator takes; larger frame times are substepped.
const MAX_STEP: f32 = 1.0 / 120.0;

/// One 3D damped spring pulling towards zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct RecoilSpring {
    pub displacement: Vec3,
    pub velocity: Vec3,
    pub stiffness: f32,
    pub damping: f32,
    /// Largest displacement length the spring may reach
    pub max_displacement: f32,
}

impl RecoilSpring {
    pub fn new(stiffness: f32, damping: f32, max_displacement: f32) -> Self {
        Self {
            displacement: Vec3::ZERO,
            velocity: Vec3::ZERO,
            stiffness,
            damping,
            max_displacement,
        }
    }

    /// Add an impulse on top of the current state.
    ///
    /// The kick moves the displacement immediately and also feeds the
    /// velocity, scaled by the spring's natural frequency.
    pub fn kick(&mut self, impulse: Vec3) {
        self.displacement += impulse;
        self.velocity += impulse * self.stiffness.sqrt();
        self.displacement = self.displacement.clamp_length_max(self.max_displacement);
    }

    /// Semi-implicit Euler integration, then clamp and snap to rest.
    pub fn integrate(&mut self, dt: f32, rest_epsilon: f32) {
        if dt <= 0.0 || self.is_at_rest() {
            return;
        }

        let steps = (dt / MAX_STEP).ceil().max(1.0) as u32;
        let h = dt / steps as f32;
        for _ in 0..steps {
            let acceleration = -self.stiffness * self.displacement - self.damping * self.velocity;
            self.velocity += acceleration * h;
            self.displacement += self.velocity * h;
        }
        self.displacement = self.displacement.clamp_length_max(self.max_displacement);

        if self.displacement.length() < rest_epsilon && self.velocity.length() < rest_epsilon {
            self.displacement = Vec3::ZERO;
            self.velocity = Vec3::ZERO;
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.displacement == Vec3::ZERO && self.velocity == Vec3::ZERO
    }

    pub fn reset(&mut self) {
        self.displacement = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
    }
}

/// Recoil of one weapon: weapon position, weapon rotation and camera
/// rotation, each its own spring.
///
/// Rotation springs hold Euler angles in degrees as (pitch, yaw, roll).
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct RecoilState {
    pub position: RecoilSpring,
    pub rotation: RecoilSpring,
    pub camera: RecoilSpring,
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, amplitude: f32) -> f32 {
    if amplitude > 0.0 {
        rng.random_range(-amplitude..=amplitude)
    } else {
        0.0
    }
}

impl RecoilState {
    pub fn from_profile(profile: &WeaponProfile) -> Self {
        let k = profile.recoil_spring_stiffness;
        let c = profile.recoil_spring_damping;
        Self {
            position: RecoilSpring::new(k, c, profile.recoil_max_position_offset),
            rotation: RecoilSpring::new(k, c, profile.recoil_max_rotation_offset),
            camera: RecoilSpring::new(k, c, profile.recoil_max_rotation_offset),
        }
    }

    /// Kick all three springs for one shot.
    ///
    /// Position: random lateral, rise, retreat. Rotation and camera: pitch up
    /// plus random yaw and roll.
    pub fn apply_shot<R: Rng + ?Sized>(&mut self, profile: &WeaponProfile, rng: &mut R) {
        let p = profile.recoil_position_kick;
        self.position.kick(Vec3::new(jitter(rng, p.x), p.y, p.z));

        let r = profile.recoil_rotation_kick;
        self.rotation.kick(Vec3::new(r.x, jitter(rng, r.y), jitter(rng, r.z)));

        let c = profile.recoil_camera_kick;
        self.camera.kick(Vec3::new(c.x, jitter(rng, c.y), jitter(rng, c.z)));
    }

    pub fn advance(&mut self, dt: f32, rest_epsilon: f32) {
        self.position.integrate(dt, rest_epsilon);
        self.rotation.integrate(dt, rest_epsilon);
        self.camera.integrate(dt, rest_epsilon);
    }

    pub fn reset(&mut self) {
        self.position.reset();
        self.rotation.reset();
        self.camera.reset();
    }

    pub fn is_at_rest(&self) -> bool {
        self.position.is_at_rest() && self.rotation.is_at_rest() && self.camera.is_at_rest()
    }

    /// Weapon pose: `rest` plus the current spring displacement.
    pub fn weapon_pose(&self, rest: &Transform) -> Transform {
        Transform {
            translation: rest.translation + self.position.displacement,
            rotation: rest.rotation * degrees_to_quat(self.rotation.displacement),
            scale: rest.scale,
        }
    }

    /// Contribution to the camera's recoil offset layer.
    pub fn camera_offset(&self) -> PoseOffset {
        PoseOffset {
            translation: Vec3::ZERO,
            rotation: degrees_to_quat(self.camera.displacement),
        }
    }
}

fn degrees_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        euler.x.to_radians(),
        euler.y.to_radians(),
        euler.z.to_radians(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_kicks_accumulate() {
        let mut spring = RecoilSpring::new(180.0, 24.0, 10.0);
        spring.kick(Vec3::new(0.0, 0.0, 0.05));
        let after_one = spring.displacement.z;
        spring.kick(Vec3::new(0.0, 0.0, 0.05));
        assert!(spring.displacement.z > after_one);
        assert!(spring.velocity.z > 0.0);
    }

    #[test]
    fn test_settles_to_exact_zero() {
        let mut spring = RecoilSpring::new(180.0, 24.0, 1.0);
        spring.kick(Vec3::new(0.01, 0.02, 0.05));
        for _ in 0..600 {
            spring.integrate(1.0 / 60.0, EPS);
        }
        assert_eq!(spring.displacement, Vec3::ZERO);
        assert_eq!(spring.velocity, Vec3::ZERO);
        assert!(spring.is_at_rest());
    }

    #[test]
    fn test_displacement_clamped() {
        let mut spring = RecoilSpring::new(180.0, 24.0, 0.1);
        for _ in 0..20 {
            spring.kick(Vec3::Z * 0.05);
            spring.integrate(1.0 / 60.0, EPS);
            assert!(spring.displacement.length() <= 0.1 + 1e-6);
        }
    }

    #[test]
    fn test_large_frame_stays_stable() {
        let mut spring = RecoilSpring::new(400.0, 10.0, 100.0);
        spring.kick(Vec3::X);
        spring.integrate(0.5, EPS);
        assert!(spring.displacement.is_finite());
        assert!(spring.displacement.length() < 2.0);
    }

    #[test]
    fn test_shot_kicks_every_spring() {
        let profile = WeaponProfile::default();
        let mut state = RecoilState::from_profile(&profile);
        let mut rng = StdRng::seed_from_u64(3);
        state.apply_shot(&profile, &mut rng);

        assert!(state.position.displacement.z > 0.0);
        assert!(state.rotation.displacement.x > 0.0);
        assert!(state.camera.displacement.x > 0.0);
        assert!(!state.is_at_rest());

        state.reset();
        assert!(state.is_at_rest());
    }

    #[test]
    fn test_pose_at_rest_is_base_pose() {
        let state = RecoilState::from_profile(&WeaponProfile::default());
        let rest = Transform::from_xyz(0.3, -0.2, -0.5);
        assert_eq!(state.weapon_pose(&rest), rest);
        assert_eq!(state.camera_offset().rotation, Quat::IDENTITY);
    }
}
