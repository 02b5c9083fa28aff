//! Accuracy - spread bloom, recovery and cone sampling.

use bevy::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, UnitDisc};

use crate::profile::WeaponProfile;
use crate::types::{AimFrame, MovementState};

/// Current spread of one weapon, in degrees.
///
/// Always kept inside the tier-adjusted `[base, max]` band handed to it.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct SpreadState {
    current: f32,
}

impl SpreadState {
    pub fn new(base: f32) -> Self {
        Self { current: base }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Bloom after a shot, capped at `max`.
    pub fn apply_shot(&mut self, gain: f32, max: f32) {
        self.current = (self.current + gain).min(max);
    }

    /// Recover towards `base` at `rate` degrees per second.
    pub fn recover(&mut self, rate: f32, dt: f32, base: f32) {
        self.current = (self.current - rate * dt).max(base);
    }

    pub fn reset(&mut self, base: f32) {
        self.current = base;
    }
}

/// Spread actually used for the next shot.
///
/// Airborne wins over moving; standing still on the ground applies no
/// penalty.
pub fn effective_spread(current: f32, profile: &WeaponProfile, movement: &dyn MovementState) -> f32 {
    let multiplier = if !movement.is_grounded() {
        profile.airborne_spread_multiplier
    } else if movement.is_moving() {
        profile.moving_spread_multiplier
    } else {
        1.0
    };
    current * multiplier
}

/// Pick a shot direction inside a cone around the aim direction.
///
/// `cone_degrees` is the full cone angle; samples land uniformly on a disk of
/// radius `tan(cone / 2)` laid across the aim's right/up basis. At or below
/// `epsilon` degrees the aim direction is returned untouched and no random
/// numbers are drawn.
///
/// # Arguments
/// * `aim` - Viewpoint and its basis
/// * `cone_degrees` - Full cone angle in degrees
/// * `epsilon` - Threshold for deterministic shots
/// * `rng` - Random source
pub fn sample_cone_direction<R: Rng + ?Sized>(
    aim: &AimFrame,
    cone_degrees: f32,
    epsilon: f32,
    rng: &mut R,
) -> Vec3 {
    if cone_degrees <= epsilon {
        return aim.forward;
    }

    let half_angle = (cone_degrees * 0.5).to_radians();
    let [x, y]: [f32; 2] = UnitDisc.sample(rng);
    let radius = half_angle.tan();
    let offset = (aim.right * x + aim.up * y) * radius;

    (aim.forward + offset).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MovementFlags;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bloom_accumulates_and_caps() {
        let mut spread = SpreadState::new(1.0);
        spread.apply_shot(0.5, 2.0);
        assert_eq!(spread.current(), 1.5);
        spread.apply_shot(0.5, 2.0);
        spread.apply_shot(0.5, 2.0);
        assert_eq!(spread.current(), 2.0);
    }

    #[test]
    fn test_recovery_stops_at_base() {
        let mut spread = SpreadState::new(1.0);
        spread.apply_shot(3.0, 5.0);
        spread.recover(2.0, 0.5, 1.0);
        assert_eq!(spread.current(), 3.0);
        spread.recover(2.0, 10.0, 1.0);
        assert_eq!(spread.current(), 1.0);
    }

    #[test]
    fn test_effective_spread_multipliers() {
        let profile = WeaponProfile {
            moving_spread_multiplier: 1.5,
            airborne_spread_multiplier: 3.0,
            ..Default::default()
        };
        let standing = MovementFlags { grounded: true, moving: false };
        let running = MovementFlags { grounded: true, moving: true };
        let jumping = MovementFlags { grounded: false, moving: true };

        assert_eq!(effective_spread(2.0, &profile, &standing), 2.0);
        assert_eq!(effective_spread(2.0, &profile, &running), 3.0);
        assert_eq!(effective_spread(2.0, &profile, &jumping), 6.0);
    }

    #[test]
    fn test_tiny_spread_is_deterministic() {
        let aim = AimFrame::looking(Vec3::ZERO, Vec3::NEG_Z);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(sample_cone_direction(&aim, 0.005, 0.01, &mut rng), Vec3::NEG_Z);
        }
    }

    #[test]
    fn test_samples_stay_inside_cone() {
        let aim = AimFrame::looking(Vec3::ZERO, Vec3::new(0.3, -0.2, -1.0));
        let mut rng = StdRng::seed_from_u64(42);
        let cone = 12.0_f32;
        let half = (cone * 0.5).to_radians();

        let mut off_axis = 0;
        for _ in 0..500 {
            let dir = sample_cone_direction(&aim, cone, 0.01, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);
            let angle = dir.dot(aim.forward).clamp(-1.0, 1.0).acos();
            assert!(angle <= half + 1e-4);
            if angle > 1e-3 {
                off_axis += 1;
            }
        }
        assert!(off_axis > 400);
    }
}
