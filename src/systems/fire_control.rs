//! Fire control - when does a trigger state become a shot.

use bevy::prelude::*;

use crate::profile::{FireMode, WeaponProfile};
use crate::types::TaskStatus;

/// Trigger discipline of a weapon, picked once from its profile.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub enum FireControl {
    /// Fires every tick the trigger is held.
    Automatic,
    /// Fires once per press.
    SemiAutomatic,
    /// One press fires `count` rounds spaced `interval` apart.
    Burst { count: u32, interval: f32 },
    /// Semi-automatic press discipline, pellet shots.
    ShotgunSemi,
    /// Automatic press discipline, pellet shots.
    ShotgunAutomatic,
}

impl FireControl {
    pub fn for_profile(profile: &WeaponProfile) -> Self {
        match (profile.fire_mode, profile.is_automatic) {
            (FireMode::Burst, _) => FireControl::Burst {
                count: profile.burst_count,
                interval: profile.burst_interval,
            },
            (FireMode::Shotgun, true) => FireControl::ShotgunAutomatic,
            (FireMode::Shotgun, false) => FireControl::ShotgunSemi,
            (FireMode::Normal, true) => FireControl::Automatic,
            (FireMode::Normal, false) => FireControl::SemiAutomatic,
        }
    }

    pub fn fires_pellets(&self) -> bool {
        matches!(self, FireControl::ShotgunSemi | FireControl::ShotgunAutomatic)
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self, FireControl::Automatic | FireControl::ShotgunAutomatic)
    }

    /// Turn this tick's trigger state into an intent.
    ///
    /// The latch is always updated, so a press made while a burst is running
    /// is swallowed rather than replayed once the burst ends.
    pub fn intent(&self, latch: &mut TriggerLatch, held: bool, burst_active: bool) -> FireIntent {
        let pressed = latch.update(held);
        if burst_active || latch.is_suppressed() {
            return FireIntent::Hold;
        }

        match self {
            FireControl::Automatic | FireControl::ShotgunAutomatic if held => FireIntent::Shoot,
            FireControl::SemiAutomatic | FireControl::ShotgunSemi if pressed => FireIntent::Shoot,
            FireControl::Burst { .. } if pressed => FireIntent::BeginBurst,
            _ => FireIntent::Hold,
        }
    }
}

/// What the weapon should do this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireIntent {
    Hold,
    Shoot,
    BeginBurst,
}

/// Press-edge tracker for one weapon's trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct TriggerLatch {
    held: bool,
    suppressed: bool,
}

impl TriggerLatch {
    /// Record the trigger state; `true` on the tick it goes down.
    pub fn update(&mut self, held: bool) -> bool {
        let pressed = held && !self.held;
        self.held = held;
        if !held {
            self.suppressed = false;
        }
        pressed
    }

    /// Ignore the trigger until it has been released once.
    pub fn suppress(&mut self) {
        self.suppressed = true;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Outcome of one scheduled burst round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BurstRound {
    /// Round fired, more may follow.
    Fired,
    /// Round fired and nothing can follow it (magazine now empty).
    FiredLast,
    /// Round could not fire; the burst aborts.
    Blocked,
}

/// Rounds still owed by a burst that has already fired its first one.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct BurstTask {
    remaining: u32,
    interval: f32,
    until_next: f32,
}

impl BurstTask {
    pub fn new(remaining: u32, interval: f32) -> Self {
        Self { remaining, interval: interval.max(0.0), until_next: interval.max(0.0) }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Fire every round that falls due within `dt`.
    ///
    /// `fire_round` is called once per due round; the task finishes when all
    /// rounds are spent or a round reports it cannot be followed.
    pub fn advance(&mut self, dt: f32, mut fire_round: impl FnMut() -> BurstRound) -> TaskStatus {
        self.until_next -= dt;
        while self.remaining > 0 && self.until_next <= 0.0 {
            match fire_round() {
                BurstRound::Fired => {
                    self.remaining -= 1;
                    self.until_next += self.interval;
                }
                BurstRound::FiredLast => {
                    self.remaining -= 1;
                    return TaskStatus::Done;
                }
                BurstRound::Blocked => return TaskStatus::Done,
            }
        }

        if self.remaining == 0 {
            TaskStatus::Done
        } else {
            TaskStatus::Continue
        }
    }
}
