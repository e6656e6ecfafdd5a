//! Physiology: health, breath, mating readiness, corpse remains.
//!
//! # Health
//!
//! Health only goes down through [`Vitality::damage`] and only goes up
//! through [`Vitality::heal`]; both clamp to `[0, max_health]`.  A creature
//! is dead exactly when its health is 0.  Hunger is modelled as metabolism
//! draining health, so "hungry" means "below a health fraction".
//!
//! # Hysteresis
//!
//! The hunting and mating predicates use separate begin and stop thresholds
//! (see [`Thresholds`]).  Between the two a creature keeps doing whatever it
//! was doing, so a value sitting on a boundary cannot flip the task every
//! tick.
//!
//! # Breath
//!
//! `breath` is a signed balance in seconds: 0 is fully rested, negative is
//! time spent without air.  Once the debt exceeds the (genome-scaled) hold
//! time the creature takes suffocation damage, capped per tick.

/// What the body is currently immersed in, as last reported by the host.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Medium {
    Solid,
    Liquid,
    #[default]
    Gas,
}

/// Health-fraction thresholds for the hunting and mating predicates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds {
    /// Start looking for food below this fraction.
    pub begin_hunt: f32,
    /// Stop looking for food at or above this fraction.
    pub stop_hunt:  f32,
    /// May start courting at or above this fraction.
    pub begin_mate: f32,
    /// Give up courting below this fraction.
    pub stop_mate:  f32,
}

impl Thresholds {
    /// `true` if both pairs leave a dead band between begin and stop.
    pub fn is_consistent(&self) -> bool {
        self.begin_hunt < self.stop_hunt && self.stop_mate < self.begin_mate
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { begin_hunt: 0.5, stop_hunt: 0.9, begin_mate: 0.8, stop_mate: 0.6 }
    }
}

/// Breathing parameters for one tick, already scaled by genetics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BreathParams {
    /// Breathes liquid instead of gas.
    pub aquatic:         bool,
    /// Seconds of debt before suffocation damage starts.
    pub hold_time:       f32,
    /// Debt repaid per second while breathing.
    pub recovery:        f32,
    /// Suffocation damage per second.
    pub damage_rate:     f32,
    /// Upper bound on suffocation damage in a single tick.
    pub max_tick_damage: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitality {
    pub max_health:    f32,
    health:            f32,
    /// Signed breath balance; see module docs.
    pub breath:        f32,
    /// Seconds until mating is possible again.
    pub mate_cooldown: f32,
    /// Food left on the body once dead.
    pub remains:       f32,
    /// Offspring to release when the current `Reproduce` ends.
    pub gestating:     u8,
    pub medium:        Medium,
}

impl Vitality {
    /// Full health, no debts.  `remains` is what a carcass will feed.
    pub fn new(max_health: f32, remains: f32) -> Self {
        let max_health = max_health.max(f32::EPSILON);
        Self {
            max_health,
            health: max_health,
            breath: 0.0,
            mate_cooldown: 0.0,
            remains: remains.max(0.0),
            gestating: 0,
            medium: Medium::Gas,
        }
    }

    #[inline]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health as a fraction of `max_health`.
    #[inline]
    pub fn fraction(&self) -> f32 {
        self.health / self.max_health
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Living creatures can be hurt; a corpse can be fed on while anything
    /// is left of it.
    #[inline]
    pub fn is_attackable(&self) -> bool {
        !self.is_dead() || self.remains > 0.0
    }

    /// Reduce health.  Returns `false` (and changes nothing) when the amount
    /// is not positive or the creature is already dead.
    pub fn damage(&mut self, amount: f32) -> bool {
        if amount.is_nan() || amount <= 0.0 || self.is_dead() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        true
    }

    /// Increase health, clamped to `max_health`.  Works on corpses too: a
    /// healed corpse is alive again.
    pub fn heal(&mut self, amount: f32) {
        if amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    /// Land a blow on `target`.  Returns whether any damage was applied.
    pub fn attack(target: &mut Vitality, damage: f32) -> bool {
        target.is_attackable() && target.damage(damage)
    }

    /// Take up to `bite` from a corpse's remains and return the amount taken.
    pub fn consume_remains(&mut self, bite: f32) -> f32 {
        let taken = bite.max(0.0).min(self.remains);
        self.remains -= taken;
        taken
    }

    // ── Predicates ────────────────────────────────────────────────────────

    pub fn begin_hunting(&self, t: &Thresholds) -> bool {
        self.fraction() < t.begin_hunt
    }

    pub fn stop_hunting(&self, t: &Thresholds) -> bool {
        self.fraction() >= t.stop_hunt
    }

    pub fn begin_mating(&self, t: &Thresholds) -> bool {
        self.mate_cooldown <= 0.0 && self.fraction() >= t.begin_mate
    }

    pub fn stop_mating(&self, t: &Thresholds) -> bool {
        self.fraction() < t.stop_mate
    }

    /// Breath debt has reached `threshold` seconds.
    pub fn needs_air(&self, threshold: f32) -> bool {
        -self.breath >= threshold
    }

    // ── Environment ───────────────────────────────────────────────────────

    /// Buried: nothing to breathe.  Returns suffocation damage applied.
    pub fn process_in_solid(&mut self, density: f32, dt: f32, p: &BreathParams) -> f32 {
        self.medium = Medium::Solid;
        self.hold(density, dt, p)
    }

    pub fn process_in_liquid(&mut self, density: f32, dt: f32, p: &BreathParams) -> f32 {
        self.medium = Medium::Liquid;
        if p.aquatic { self.breathe(dt, p) } else { self.hold(density, dt, p) }
    }

    pub fn process_in_gas(&mut self, density: f32, dt: f32, p: &BreathParams) -> f32 {
        self.medium = Medium::Gas;
        if p.aquatic { self.hold(density, dt, p) } else { self.breathe(dt, p) }
    }

    fn breathe(&mut self, dt: f32, p: &BreathParams) -> f32 {
        self.breath = (self.breath + p.recovery * dt).min(0.0);
        0.0
    }

    fn hold(&mut self, density: f32, dt: f32, p: &BreathParams) -> f32 {
        let floor = -2.0 * p.hold_time.max(0.0) - dt;
        self.breath = (self.breath - density.clamp(0.0, 1.0) * dt).max(floor);
        if -self.breath <= p.hold_time {
            return 0.0;
        }
        let amount = (p.damage_rate * dt).min(p.max_tick_damage);
        if self.damage(amount) { amount } else { 0.0 }
    }

    // ── Per-tick upkeep ───────────────────────────────────────────────────

    /// Metabolism drains `metabolism * dt` health; the mating cooldown runs
    /// down.  Dead creatures are left untouched.
    pub fn update(&mut self, dt: f32, metabolism: f32) {
        if self.is_dead() {
            return;
        }
        self.damage(metabolism * dt);
        self.mate_cooldown = (self.mate_cooldown - dt).max(0.0);
    }
}
