//! A weapon at runtime: one profile plus all of its mutable state.
//!
//! [`WeaponInstance`] is plain data driven by three entry points per tick:
//! [`WeaponInstance::update_trigger`] for firing, [`WeaponInstance::tick`]
//! for timers and springs, and the request methods (`reload`,
//! `apply_upgrade`, `refill_ammo`). Everything that other systems may want to
//! react to is queued as a [`WeaponSignal`] and drained by the caller.

use std::sync::Arc;

use bevy::prelude::*;
use rand::RngCore;

use crate::profile::{ProfileResult, WeaponProfile};
use crate::resources::ArsenalConfig;
use crate::systems::accuracy::{effective_spread, sample_cone_direction, SpreadState};
use crate::systems::ammo::AmmoState;
use crate::systems::ballistics::{dispatch_hits, resolve_penetrating, resolve_pellets, resolve_single};
use crate::systems::fire_control::{BurstRound, BurstTask, FireControl, FireIntent, TriggerLatch};
use crate::systems::recoil::RecoilState;
use crate::systems::upgrade::{upgrade_cost, TierStats, UpgradeLadder, UpgradeTier};
use crate::types::{
    AimFrame, CollisionScene, DamageTargets, MovementState, ReloadSpeedProvider, ShotTrace, TaskStatus,
};

/// Something observable that happened to a weapon.
#[derive(Clone, Debug, PartialEq)]
pub enum WeaponSignal {
    AmmoChanged { in_magazine: u32, in_reserve: u32 },
    ReloadStarted { duration: f32, direction_sign: f32 },
    ReloadFinished { transferred: u32 },
    ReloadCancelled,
    ShotFired,
    ShotTraced { origin: Vec3, end_point: Vec3, did_hit: bool },
    BulletImpact {
        point: Vec3,
        normal: Vec3,
        target: Entity,
        was_damageable: bool,
        damage_applied: i32,
    },
    EmptyClick,
    WeaponUpgraded { tier: UpgradeTier },
}

/// Everything a fire attempt needs from the outside world.
///
/// # Fields
/// * `now` - Current time in seconds
/// * `shooter` - Entity whose body is excluded from hits
/// * `aim` - Viewpoint the rays leave from
/// * `scene` - Collision query
/// * `targets` - Damage capability lookup
/// * `movement` - Grounded/moving state for spread multipliers
/// * `rng` - Random source for spread and recoil jitter
/// * `config` - Global tuning
pub struct FireContext<'a> {
    pub now: f64,
    pub shooter: Entity,
    pub aim: AimFrame,
    pub scene: &'a dyn CollisionScene,
    pub targets: &'a mut dyn DamageTargets,
    pub movement: &'a dyn MovementState,
    pub rng: &'a mut dyn RngCore,
    pub config: &'a ArsenalConfig,
}

/// One owned weapon.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bevy_hitscan_arsenal::profile::WeaponProfile;
/// use bevy_hitscan_arsenal::weapon::WeaponInstance;
///
/// let mut weapon = WeaponInstance::from_profile(WeaponProfile::default()).unwrap();
/// assert_eq!(weapon.in_magazine(), 12);
/// assert!(weapon.apply_upgrade());
/// assert_eq!(weapon.in_magazine(), 16);
/// ```
#[derive(Clone, Debug)]
pub struct WeaponInstance {
    profile: Arc<WeaponProfile>,
    ladder: UpgradeLadder,
    ammo: AmmoState,
    spread: SpreadState,
    recoil: RecoilState,
    fire_control: FireControl,
    latch: TriggerLatch,
    burst: Option<BurstTask>,
    next_fire_time: f64,
    melee_active: bool,
    last_empty_click: Option<f64>,
    signals: Vec<WeaponSignal>,
}

impl WeaponInstance {
    /// Build a weapon from an already validated profile, fully loaded.
    pub fn new(profile: Arc<WeaponProfile>) -> Self {
        let ladder = UpgradeLadder::new(&profile);
        let mut weapon = Self {
            ladder,
            ammo: AmmoState::default(),
            spread: SpreadState::new(ladder.stats().base_spread),
            recoil: RecoilState::from_profile(&profile),
            fire_control: FireControl::for_profile(&profile),
            latch: TriggerLatch::default(),
            burst: None,
            next_fire_time: 0.0,
            melee_active: false,
            last_empty_click: None,
            signals: Vec::new(),
            profile,
        };
        weapon.initialize_ammo();
        weapon
    }

    /// Validate `profile` and build a weapon from it.
    pub fn from_profile(profile: WeaponProfile) -> ProfileResult<Self> {
        profile.validate()?;
        Ok(Self::new(Arc::new(profile)))
    }

    /// Fill magazine and reserve on acquisition. Later calls do nothing.
    pub fn initialize_ammo(&mut self) -> bool {
        let stats = *self.ladder.stats();
        if !self.ammo.initialize(stats.magazine_capacity, stats.reserve_capacity) {
            return false;
        }
        self.push_ammo_changed();
        true
    }

    pub fn profile(&self) -> &Arc<WeaponProfile> {
        &self.profile
    }

    pub fn tier(&self) -> UpgradeTier {
        self.ladder.tier()
    }

    pub fn stats(&self) -> &TierStats {
        self.ladder.stats()
    }

    pub fn in_magazine(&self) -> u32 {
        self.ammo.in_magazine()
    }

    pub fn in_reserve(&self) -> u32 {
        self.ammo.in_reserve()
    }

    pub fn is_reloading(&self) -> bool {
        self.ammo.is_reloading()
    }

    /// Completion of the running reload in `[0, 1]`, `None` when idle.
    pub fn reload_progress(&self) -> Option<f32> {
        self.ammo.reload_task().map(|task| task.progress())
    }

    pub fn current_spread(&self) -> f32 {
        self.spread.current()
    }

    pub fn recoil(&self) -> &RecoilState {
        &self.recoil
    }

    pub fn fire_control(&self) -> FireControl {
        self.fire_control
    }

    pub fn next_fire_time(&self) -> f64 {
        self.next_fire_time
    }

    pub fn is_bursting(&self) -> bool {
        self.burst.is_some()
    }

    pub fn is_melee_active(&self) -> bool {
        self.melee_active
    }

    /// Price of the next tier, `None` at the top tier. Payment is the
    /// caller's business.
    pub fn next_upgrade_cost(&self) -> Option<u32> {
        upgrade_cost(&self.profile, self.ladder.tier())
    }

    /// Block firing while a melee action plays.
    pub fn set_melee_active(&mut self, active: bool) {
        self.melee_active = active;
    }

    /// Whether a round could leave the barrel at `now`.
    pub fn can_shoot(&self, now: f64) -> bool {
        self.gate_open() && now >= self.next_fire_time
    }

    fn gate_open(&self) -> bool {
        !self.ammo.is_reloading() && !self.melee_active && self.ammo.in_magazine() > 0
    }

    /// Single fire attempt. Returns `false` with no state change (other than
    /// the empty-click rate limit) when the gate is closed.
    pub fn try_shoot(&mut self, ctx: &mut FireContext) -> bool {
        if !self.can_shoot(ctx.now) {
            self.note_failed_attempt(ctx.now, ctx.config);
            return false;
        }
        self.fire_round(ctx);
        true
    }

    /// Feed this tick's trigger state through the weapon's fire control.
    ///
    /// A running burst is advanced by `dt` before the trigger is read.
    pub fn update_trigger(&mut self, held: bool, dt: f32, ctx: &mut FireContext) {
        self.advance_burst(dt, ctx);

        match self.fire_control.intent(&mut self.latch, held, self.burst.is_some()) {
            FireIntent::Hold => {}
            FireIntent::Shoot => {
                self.try_shoot(ctx);
            }
            FireIntent::BeginBurst => self.begin_burst(ctx),
        }
    }

    /// Per-frame upkeep: reload countdown, spread recovery, recoil springs.
    pub fn tick(&mut self, dt: f32, config: &ArsenalConfig) {
        let stats = *self.ladder.stats();
        if let Some(transferred) = self.ammo.advance_reload(dt, stats.magazine_capacity) {
            debug!("{}: reload finished, {} rounds loaded", self.profile.name, transferred);
            self.signals.push(WeaponSignal::ReloadFinished { transferred });
            self.push_ammo_changed();
        }
        self.spread.recover(self.profile.spread_decay_rate, dt, stats.base_spread);
        self.recoil.advance(dt, config.recoil_rest_epsilon);
    }

    /// Start a reload. The speed multiplier is read once, here.
    pub fn reload(&mut self, speed: &dyn ReloadSpeedProvider) -> bool {
        let stats = *self.ladder.stats();
        let mut multiplier = speed.reload_speed_multiplier();
        if !(multiplier > 0.0 && multiplier.is_finite()) {
            warn!(
                "{}: ignoring reload speed multiplier {}",
                self.profile.name, multiplier
            );
            multiplier = 1.0;
        }
        let duration = stats.reload_duration / multiplier;

        if !self.ammo.start_reload(stats.magazine_capacity, duration) {
            return false;
        }
        debug!("{}: reload started ({:.2}s)", self.profile.name, duration);
        self.signals.push(WeaponSignal::ReloadStarted {
            duration,
            direction_sign: self.profile.reload_direction_sign,
        });
        true
    }

    /// Move one tier up, refill everything and reset spread.
    ///
    /// `false` at the top tier. Payment must already have been taken.
    pub fn apply_upgrade(&mut self) -> bool {
        let Some(tier) = self.ladder.try_advance(&self.profile) else {
            return false;
        };
        self.cancel_reload();
        let stats = *self.ladder.stats();
        self.ammo.fill(stats.magazine_capacity, stats.reserve_capacity);
        self.spread.reset(stats.base_spread);
        debug!("{}: upgraded to tier {}", self.profile.name, tier.index());
        self.signals.push(WeaponSignal::WeaponUpgraded { tier });
        self.push_ammo_changed();
        true
    }

    /// Fill magazine and reserve to the current tier's capacities.
    pub fn refill_ammo(&mut self) {
        self.cancel_reload();
        let stats = *self.ladder.stats();
        self.ammo.fill(stats.magazine_capacity, stats.reserve_capacity);
        self.push_ammo_changed();
    }

    /// Put the weapon away: cancel any reload and pending burst rounds.
    pub fn holster(&mut self) {
        self.cancel_reload();
        if self.burst.take().is_some() {
            debug!("{}: burst dropped on holster", self.profile.name);
        }
    }

    /// Draw the weapon: recoil starts from rest and a trigger already held
    /// must be released before it fires.
    pub fn equip(&mut self) {
        self.recoil.reset();
        self.latch.suppress();
    }

    /// Take every signal queued since the last drain.
    pub fn drain_signals(&mut self) -> std::vec::Drain<'_, WeaponSignal> {
        self.signals.drain(..)
    }

    fn cancel_reload(&mut self) {
        if self.ammo.cancel_reload() {
            debug!("{}: reload cancelled", self.profile.name);
            self.signals.push(WeaponSignal::ReloadCancelled);
        }
    }

    fn push_ammo_changed(&mut self) {
        self.signals.push(WeaponSignal::AmmoChanged {
            in_magazine: self.ammo.in_magazine(),
            in_reserve: self.ammo.in_reserve(),
        });
    }

    /// Rate-limited "empty" signal for attempts on a dry magazine.
    fn note_failed_attempt(&mut self, now: f64, config: &ArsenalConfig) {
        let dry = self.ammo.in_magazine() == 0 && !self.ammo.is_reloading() && !self.melee_active;
        if !dry {
            return;
        }
        let ready = self
            .last_empty_click
            .is_none_or(|last| now - last >= config.empty_click_cooldown);
        if ready {
            self.last_empty_click = Some(now);
            self.signals.push(WeaponSignal::EmptyClick);
        }
    }

    /// One round, gate already checked: ammo, cooldown, rays, damage,
    /// spread, recoil - in that order.
    fn fire_round(&mut self, ctx: &mut FireContext) {
        let stats = *self.ladder.stats();
        let profile = self.profile.clone();
        let epsilon = ctx.config.deterministic_spread_epsilon;

        self.ammo.consume_round();
        self.next_fire_time = ctx.now + stats.fire_interval as f64;

        let mut traces: Vec<ShotTrace> = if self.fire_control.fires_pellets() {
            resolve_pellets(
                ctx.scene,
                ctx.shooter,
                &ctx.aim,
                stats.pellet_damage,
                &profile,
                epsilon,
                &mut *ctx.rng,
            )
        } else {
            let spread = effective_spread(self.spread.current(), &profile, ctx.movement);
            let direction = sample_cone_direction(&ctx.aim, spread, epsilon, &mut *ctx.rng);
            let trace = if profile.penetration_enabled {
                resolve_penetrating(ctx.scene, ctx.shooter, ctx.aim.origin, direction, stats.damage, &profile)
            } else {
                resolve_single(ctx.scene, ctx.shooter, ctx.aim.origin, direction, stats.damage, &profile)
            };
            vec![trace]
        };

        self.push_ammo_changed();
        self.signals.push(WeaponSignal::ShotFired);
        for trace in traces.iter_mut() {
            dispatch_hits(trace, &mut *ctx.targets);
            self.signals.push(WeaponSignal::ShotTraced {
                origin: trace.origin,
                end_point: trace.end_point,
                did_hit: trace.did_hit(),
            });
            for hit in &trace.hits {
                self.signals.push(WeaponSignal::BulletImpact {
                    point: hit.point,
                    normal: hit.normal,
                    target: hit.target,
                    was_damageable: hit.was_damageable,
                    damage_applied: hit.damage_applied,
                });
            }
        }

        self.spread.apply_shot(profile.spread_gain_per_shot, stats.max_spread);
        self.recoil.apply_shot(&profile, &mut *ctx.rng);
    }

    fn begin_burst(&mut self, ctx: &mut FireContext) {
        let FireControl::Burst { count, interval } = self.fire_control else {
            return;
        };
        if !self.can_shoot(ctx.now) {
            self.note_failed_attempt(ctx.now, ctx.config);
            return;
        }

        self.fire_round(ctx);
        if count > 1 && self.ammo.in_magazine() > 0 {
            self.burst = Some(BurstTask::new(count - 1, interval));
        } else {
            self.end_burst(ctx.now);
        }
    }

    fn advance_burst(&mut self, dt: f32, ctx: &mut FireContext) {
        let Some(mut task) = self.burst.take() else {
            return;
        };

        let status = task.advance(dt, || {
            if !self.gate_open() {
                return BurstRound::Blocked;
            }
            self.fire_round(ctx);
            if self.ammo.in_magazine() == 0 {
                BurstRound::FiredLast
            } else {
                BurstRound::Fired
            }
        });

        match status {
            TaskStatus::Continue => self.burst = Some(task),
            TaskStatus::Done => {
                if task.remaining() > 0 {
                    debug!(
                        "{}: burst aborted with {} rounds unfired",
                        self.profile.name,
                        task.remaining()
                    );
                }
                self.end_burst(ctx.now);
            }
        }
    }

    /// Cooldown after a burst runs from its last round, not its first.
    fn end_burst(&mut self, now: f64) {
        self.burst = None;
        self.next_fire_time = now + self.ladder.stats().fire_interval as f64;
    }
}
