//! Ammunition counters and the reload state machine.
//!
//! Two states: ready and reloading. A reload is a [`ReloadTask`] advanced
//! once per tick; dropping the task cancels the reload without moving any
//! rounds.

use bevy::prelude::*;

use crate::types::TaskStatus;

/// Countdown for one reload.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct ReloadTask {
    duration: f32,
    elapsed: f32,
}

impl ReloadTask {
    pub fn new(duration: f32) -> Self {
        Self { duration: duration.max(0.0), elapsed: 0.0 }
    }

    pub fn advance(&mut self, dt: f32) -> TaskStatus {
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            TaskStatus::Done
        } else {
            TaskStatus::Continue
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Fraction complete in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Magazine and reserve counters plus the in-flight reload, if any.
///
/// Capacities are passed in on every call because they depend on the
/// weapon's upgrade tier.
#[derive(Clone, Debug, Default, PartialEq, Reflect)]
pub struct AmmoState {
    in_magazine: u32,
    in_reserve: u32,
    reload: Option<ReloadTask>,
    initialized: bool,
}

impl AmmoState {
    /// Fill both counters the first time a weapon is acquired.
    ///
    /// Returns `false` (and changes nothing) on every later call.
    pub fn initialize(&mut self, magazine_capacity: u32, reserve_capacity: u32) -> bool {
        if self.initialized {
            return false;
        }
        self.in_magazine = magazine_capacity;
        self.in_reserve = reserve_capacity;
        self.initialized = true;
        true
    }

    pub fn in_magazine(&self) -> u32 {
        self.in_magazine
    }

    pub fn in_reserve(&self) -> u32 {
        self.in_reserve
    }

    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    pub fn reload_task(&self) -> Option<&ReloadTask> {
        self.reload.as_ref()
    }

    pub fn can_start_reload(&self, magazine_capacity: u32) -> bool {
        !self.is_reloading() && self.in_magazine < magazine_capacity && self.in_reserve > 0
    }

    /// Ready -> Reloading. Returns `false` without side effects when the
    /// magazine is full, the reserve is empty or a reload is already running.
    pub fn start_reload(&mut self, magazine_capacity: u32, duration: f32) -> bool {
        if !self.can_start_reload(magazine_capacity) {
            return false;
        }
        self.reload = Some(ReloadTask::new(duration));
        true
    }

    /// Advance the reload timer; returns the rounds transferred on the tick it
    /// completes.
    pub fn advance_reload(&mut self, dt: f32, magazine_capacity: u32) -> Option<u32> {
        let status = self.reload.as_mut()?.advance(dt);
        match status {
            TaskStatus::Continue => None,
            TaskStatus::Done => self.finish_reload(magazine_capacity),
        }
    }

    /// Reloading -> Ready, moving `min(space, reserve)` rounds.
    ///
    /// A no-op returning `None` when no reload is running.
    pub fn finish_reload(&mut self, magazine_capacity: u32) -> Option<u32> {
        self.reload.take()?;
        let space = magazine_capacity.saturating_sub(self.in_magazine);
        let transferred = space.min(self.in_reserve);
        self.in_magazine += transferred;
        self.in_reserve -= transferred;
        Some(transferred)
    }

    /// Drop a running reload without moving rounds.
    pub fn cancel_reload(&mut self) -> bool {
        self.reload.take().is_some()
    }

    /// Take one round from the magazine.
    pub fn consume_round(&mut self) -> bool {
        if self.in_magazine == 0 {
            return false;
        }
        self.in_magazine -= 1;
        true
    }

    /// Set both counters to the given capacities.
    pub fn fill(&mut self, magazine_capacity: u32, reserve_capacity: u32) {
        self.in_magazine = magazine_capacity;
        self.in_reserve = reserve_capacity;
        self.initialized = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(magazine: u32, reserve: u32) -> AmmoState {
        let mut ammo = AmmoState::default();
        ammo.initialize(magazine, reserve);
        ammo
    }

    #[test]
    fn test_initialize_only_once() {
        let mut ammo = AmmoState::default();
        assert!(ammo.initialize(30, 90));
        ammo.consume_round();
        assert!(!ammo.initialize(30, 90));
        assert_eq!(ammo.in_magazine(), 29);
        assert_eq!(ammo.in_reserve(), 90);
    }

    #[test]
    fn test_reload_rejected_when_full_or_dry() {
        let mut full = loaded(30, 90);
        assert!(!full.start_reload(30, 2.0));

        let mut dry = loaded(30, 0);
        dry.consume_round();
        assert!(!dry.start_reload(30, 2.0));
        assert!(!dry.is_reloading());
    }

    #[test]
    fn test_reload_transfers_after_duration() {
        let mut ammo = loaded(30, 90);
        for _ in 0..12 {
            ammo.consume_round();
        }
        assert!(ammo.start_reload(30, 1.0));
        assert_eq!(ammo.advance_reload(0.5, 30), None);
        assert_eq!(ammo.in_magazine(), 18);
        assert_eq!(ammo.advance_reload(0.5, 30), Some(12));
        assert_eq!(ammo.in_magazine(), 30);
        assert_eq!(ammo.in_reserve(), 78);
        assert!(!ammo.is_reloading());
        // Completion fires exactly once.
        assert_eq!(ammo.advance_reload(1.0, 30), None);
    }

    #[test]
    fn test_partial_reserve_transfer() {
        let mut ammo = loaded(30, 5);
        for _ in 0..20 {
            ammo.consume_round();
        }
        ammo.start_reload(30, 0.1);
        assert_eq!(ammo.advance_reload(0.2, 30), Some(5));
        assert_eq!(ammo.in_magazine(), 15);
        assert_eq!(ammo.in_reserve(), 0);
    }

    #[test]
    fn test_second_reload_is_ignored() {
        let mut ammo = loaded(10, 40);
        ammo.consume_round();
        assert!(ammo.start_reload(10, 2.0));
        ammo.advance_reload(1.5, 10);
        assert!(!ammo.start_reload(10, 2.0));
        // The original timer keeps running.
        assert_eq!(ammo.advance_reload(0.5, 10), Some(1));
    }

    #[test]
    fn test_cancel_keeps_counters() {
        let mut ammo = loaded(10, 40);
        ammo.consume_round();
        ammo.start_reload(10, 2.0);
        assert!(ammo.cancel_reload());
        assert_eq!(ammo.in_magazine(), 9);
        assert_eq!(ammo.in_reserve(), 40);
        assert!(!ammo.cancel_reload());
    }

    #[test]
    fn test_finish_without_reload_is_noop() {
        let mut ammo = loaded(10, 40);
        ammo.consume_round();
        assert_eq!(ammo.finish_reload(10), None);
        assert_eq!(ammo.in_magazine(), 9);
    }

    #[test]
    fn test_reload_progress() {
        let mut task = ReloadTask::new(2.0);
        assert_eq!(task.progress(), 0.0);
        task.advance(0.5);
        assert_eq!(task.progress(), 0.25);
        assert_eq!(ReloadTask::new(0.0).progress(), 1.0);
    }
}
