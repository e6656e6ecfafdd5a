//! Species configuration.
//!
//! All creature kinds share one state machine.  What differs between a
//! trout, a crow and a wolf is captured here: a capability set, a diet, a
//! movement profile, an override table, and nominal numbers that the
//! individual's [`Genetics`][eco_agent::Genetics] then scales.
//!
//! A [`SpeciesTable`] is built once, validated, and shared immutably (behind
//! an `Arc` in `eco-sim`) with every tick.  There is no global species state.

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use eco_agent::{BreathParams, GeneTrait, Genetics, Task, TaskSet, Thresholds};
use eco_core::SpeciesId;
use eco_spatial::MoveProfile;

use crate::{BehaviorError, BehaviorResult};

// ── Capabilities & diet ───────────────────────────────────────────────────────

bitflags! {
    /// Behaviour variants a species opts into.
    #[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Capabilities: u8 {
        /// Wanders as a flock instead of alone.
        const FLOCKING = 1 << 0;
        /// Breathes liquid; flops when stranded in gas.
        const AQUATIC  = 1 << 1;
        /// Moves in three dimensions through air.
        const FLYING   = 1 << 2;
        /// Can be mounted and steered by the host.
        const RIDEABLE = 1 << 3;
    }
}

impl Capabilities {
    /// Parse a `|`-separated list such as `"flocking|aquatic"`.  Empty and
    /// `"none"` mean no capabilities.
    pub fn parse(s: &str) -> BehaviorResult<Self> {
        let mut caps = Capabilities::empty();
        for part in s.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            caps |= match part.to_ascii_lowercase().as_str() {
                "none"     => Capabilities::empty(),
                "flocking" => Capabilities::FLOCKING,
                "aquatic"  => Capabilities::AQUATIC,
                "flying"   => Capabilities::FLYING,
                "rideable" => Capabilities::RIDEABLE,
                other => {
                    return Err(BehaviorError::Parse(format!("unknown capability {other:?}")));
                }
            };
        }
        Ok(caps)
    }
}

/// What a species eats.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Diet {
    /// Grazes foliage voxels.
    #[default]
    Herbivore,
    /// Hunts living prey and feeds on the kill.
    Carnivore,
    /// Feeds only on bodies that are already dead.
    Scavenger,
}

impl Diet {
    pub fn parse(s: &str) -> BehaviorResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "herbivore" => Ok(Diet::Herbivore),
            "carnivore" => Ok(Diet::Carnivore),
            "scavenger" => Ok(Diet::Scavenger),
            other => Err(BehaviorError::Parse(format!("unknown diet {other:?}"))),
        }
    }

    /// Feeds on other agents rather than on the world.
    pub fn eats_agents(self) -> bool {
        !matches!(self, Diet::Herbivore)
    }
}

// ── Override table ────────────────────────────────────────────────────────────

/// Which tasks each priority override is allowed to preempt.
///
/// Overrides run in the order death, environment, predator.  Death always
/// wins and is not configurable.  `Death` is never in either set.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct OverrideTable {
    /// Tasks that surfacing / flopping may interrupt.
    pub environment: TaskSet,
    /// Tasks that fleeing a predator may interrupt.
    pub predator:    TaskSet,
}

impl OverrideTable {
    /// Same table, with `Reproduce` made interruptible (or not) by the
    /// environment override.
    pub fn with_surface_during_reproduce(mut self, allow: bool) -> Self {
        self.environment = if allow {
            self.environment.with(Task::Reproduce)
        } else {
            self.environment.without(Task::Reproduce)
        };
        self
    }
}

impl Default for OverrideTable {
    fn default() -> Self {
        Self {
            environment: TaskSet::ALL.difference(TaskSet::of(&[
                Task::Reproduce,
                Task::FollowRider,
                Task::Surface,
                Task::FlopOnGround,
                Task::Death,
            ])),
            predator: TaskSet::ALL.difference(TaskSet::of(&[
                Task::FollowRider,
                Task::Surface,
                Task::FlopOnGround,
                Task::RunFromPredator,
                Task::Death,
            ])),
        }
    }
}

// ── Flocking ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct FlockConfig {
    /// Neighbours within this distance influence the heading.
    pub radius:      f32,
    /// Neighbours closer than this push the agent away.
    pub min_spacing: f32,
    /// Above this many neighbours the flock disperses.
    pub max_size:    usize,
    pub separation:  f32,
    pub alignment:   f32,
    pub cohesion:    f32,
    /// Weight of the new steering against the previous heading, in `[0, 1]`.
    pub blend:       f32,
    /// Length of each flocking path leg.
    pub leg_steps:   u32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            radius:      8.0,
            min_spacing: 1.5,
            max_size:    12,
            separation:  1.5,
            alignment:   1.0,
            cohesion:    0.8,
            blend:       0.3,
            leg_steps:   4,
        }
    }
}

// ── SpeciesConfig ─────────────────────────────────────────────────────────────

/// Nominal parameters of one species.  Durations are seconds, distances are
/// voxels, speeds are voxels per second.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesConfig {
    pub name:          String,
    pub capabilities:  Capabilities,
    pub diet:          Diet,
    pub profile:       MoveProfile,
    pub overrides:     OverrideTable,
    pub thresholds:    Thresholds,
    pub flock:         FlockConfig,

    // ── Body ──────────────────────────────────────────────────────────────
    pub max_health:    f32,
    /// Food a carcass of this species provides.
    pub remains:       f32,
    /// Health lost to hunger per second.
    pub metabolism:    f32,
    pub walk_speed:    f32,
    pub run_speed:     f32,

    // ── Perception & combat ───────────────────────────────────────────────
    pub sight_distance:  f32,
    /// Radius searched for foliage by grazers.
    pub forage_radius:   i32,
    pub attack_distance: f32,
    pub attack_damage:   f32,
    /// Seconds between bites.
    pub attack_cooldown: f32,
    /// Food taken per bite, from a carcass or a foliage voxel.
    pub bite:            f32,

    // ── Timing ────────────────────────────────────────────────────────────
    /// Mean idle time; each idle period is `average_idle_time * U(0, 2)`.
    pub average_idle_time: f32,
    pub decompose_time:    f32,

    // ── Paths ─────────────────────────────────────────────────────────────
    pub wander_steps:       u32,
    pub chase_steps:        u32,
    pub flee_steps:         u32,
    /// How far (voxels) a pursued target may move before the path is redone.
    pub retarget_tolerance: i32,

    // ── Breathing ─────────────────────────────────────────────────────────
    /// Seconds of breath debt before suffocation damage.
    pub hold_breath:       f32,
    /// Fraction of `hold_breath` at which a diver heads for air.
    pub surface_at:        f32,
    pub breath_recovery:   f32,
    pub suffocation_rate:  f32,
    pub suffocation_cap:   f32,

    // ── Reproduction ──────────────────────────────────────────────────────
    pub pregnancy_length: f32,
    /// Health paid by each partner.
    pub mate_cost:        f32,
    pub mate_cooldown:    f32,
    pub litter_size:      u8,

    // ── Riding ────────────────────────────────────────────────────────────
    /// Remove the body immediately when a ridden mount dies.
    pub despawn_ridden_corpse: bool,
}

impl SpeciesConfig {
    /// A generic solitary ground grazer.  Other presets start from this.
    pub fn herbivore(name: impl Into<String>) -> Self {
        Self {
            name:          name.into(),
            capabilities:  Capabilities::empty(),
            diet:          Diet::Herbivore,
            profile:       MoveProfile::walker(),
            overrides:     OverrideTable::default(),
            thresholds:    Thresholds::default(),
            flock:         FlockConfig::default(),

            max_health:    100.0,
            remains:       40.0,
            metabolism:    0.2,
            walk_speed:    2.0,
            run_speed:     5.0,

            sight_distance:  10.0,
            forage_radius:   6,
            attack_distance: 1.5,
            attack_damage:   5.0,
            attack_cooldown: 1.0,
            bite:            15.0,

            average_idle_time: 3.0,
            decompose_time:    30.0,

            wander_steps:       8,
            chase_steps:        24,
            flee_steps:         12,
            retarget_tolerance: 2,

            hold_breath:       10.0,
            surface_at:        0.5,
            breath_recovery:   5.0,
            suffocation_rate:  5.0,
            suffocation_cap:   1.0,

            pregnancy_length: 20.0,
            mate_cost:        10.0,
            mate_cooldown:    60.0,
            litter_size:      1,

            despawn_ridden_corpse: false,
        }
    }

    /// A solitary ground hunter.
    pub fn carnivore(name: impl Into<String>) -> Self {
        Self {
            diet:            Diet::Carnivore,
            sight_distance:  14.0,
            attack_damage:   20.0,
            run_speed:       6.0,
            metabolism:      0.3,
            bite:            25.0,
            ..Self::herbivore(name)
        }
    }

    /// A schooling fish.
    pub fn fish(name: impl Into<String>) -> Self {
        Self {
            capabilities:   Capabilities::AQUATIC | Capabilities::FLOCKING,
            profile:        MoveProfile::swimmer(),
            max_health:     20.0,
            remains:        10.0,
            walk_speed:     1.5,
            run_speed:      4.0,
            sight_distance: 6.0,
            hold_breath:    4.0,
            wander_steps:   6,
            ..Self::herbivore(name)
        }
    }

    /// A flocking bird.
    pub fn bird(name: impl Into<String>) -> Self {
        Self {
            capabilities:   Capabilities::FLYING | Capabilities::FLOCKING,
            profile:        MoveProfile::flyer(),
            max_health:     15.0,
            remains:        5.0,
            walk_speed:     3.0,
            run_speed:      7.0,
            sight_distance: 12.0,
            ..Self::herbivore(name)
        }
    }

    /// A rideable grazer.
    pub fn mount(name: impl Into<String>) -> Self {
        Self {
            capabilities:          Capabilities::RIDEABLE,
            max_health:            200.0,
            walk_speed:            3.0,
            run_speed:             9.0,
            despawn_ridden_corpse: true,
            ..Self::herbivore(name)
        }
    }

    #[inline]
    pub fn has(&self, caps: Capabilities) -> bool {
        self.capabilities.contains(caps)
    }

    /// Moves in all three dimensions (swims or flies).
    pub fn is_volumetric(&self) -> bool {
        self.capabilities.intersects(Capabilities::AQUATIC | Capabilities::FLYING)
    }

    /// Breathing parameters scaled by `genetics`.
    pub fn breath_params(&self, genetics: &Genetics) -> BreathParams {
        BreathParams {
            aquatic:         self.has(Capabilities::AQUATIC),
            hold_time:       genetics.get(GeneTrait::HoldBreath, self.hold_breath),
            recovery:        self.breath_recovery,
            damage_rate:     self.suffocation_rate,
            max_tick_damage: self.suffocation_cap,
        }
    }

    /// Reject configurations the state machine cannot run.
    pub fn validate(&self) -> BehaviorResult<()> {
        let bad = |msg: &str| Err(BehaviorError::Config(format!("species {:?}: {msg}", self.name)));
        if self.name.trim().is_empty() {
            return Err(BehaviorError::Config("species name is empty".into()));
        }
        if !(self.max_health > 0.0) {
            return bad("max_health must be positive");
        }
        if !self.thresholds.is_consistent() {
            return bad("begin/stop thresholds must leave a dead band");
        }
        if self.walk_speed < 0.0 || self.run_speed < self.walk_speed {
            return bad("speeds must satisfy 0 <= walk_speed <= run_speed");
        }
        if self.sight_distance < 0.0 || self.attack_distance <= 0.0 {
            return bad("sight_distance must be >= 0 and attack_distance > 0");
        }
        if self.average_idle_time < 0.0 || self.decompose_time < 0.0 || self.pregnancy_length < 0.0 {
            return bad("durations must be non-negative");
        }
        if !(0.0..=1.0).contains(&self.flock.blend) {
            return bad("flock blend must be in [0, 1]");
        }
        if self.overrides.environment.contains(Task::Death) || self.overrides.predator.contains(Task::Death) {
            return bad("no override may preempt Death");
        }
        if self.has(Capabilities::AQUATIC | Capabilities::FLYING) {
            return bad("a species cannot be both aquatic and flying");
        }
        Ok(())
    }
}

// ── Relations ─────────────────────────────────────────────────────────────────

/// How one species regards another.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Relation {
    /// The other species hunts this one.
    Predator,
    /// This species hunts the other one.
    Prey,
    Mate,
    Neutral,
}

impl Relation {
    /// The same relation seen from the other side.
    pub fn inverse(self) -> Relation {
        match self {
            Relation::Predator => Relation::Prey,
            Relation::Prey     => Relation::Predator,
            r => r,
        }
    }

    pub fn parse(s: &str) -> BehaviorResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "predator" => Ok(Relation::Predator),
            "prey"     => Ok(Relation::Prey),
            "mate"     => Ok(Relation::Mate),
            "neutral"  => Ok(Relation::Neutral),
            other => Err(BehaviorError::Parse(format!("unknown relation {other:?}"))),
        }
    }
}

// ── SpeciesTable ──────────────────────────────────────────────────────────────

/// Every species in a run plus the pairwise relationship table.
#[derive(Clone, Debug, Default)]
pub struct SpeciesTable {
    species:   Vec<SpeciesConfig>,
    by_name:   FxHashMap<String, SpeciesId>,
    relations: FxHashMap<(SpeciesId, SpeciesId), Relation>,
}

impl SpeciesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a species.
    pub fn add(&mut self, config: SpeciesConfig) -> BehaviorResult<SpeciesId> {
        config.validate()?;
        if self.by_name.contains_key(&config.name) {
            return Err(BehaviorError::Config(format!("duplicate species {:?}", config.name)));
        }
        let id = SpeciesId::try_from(self.species.len())
            .map_err(|_| BehaviorError::Config("too many species".into()))?;
        self.by_name.insert(config.name.clone(), id);
        self.species.push(config);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: SpeciesId) -> Option<&SpeciesConfig> {
        self.species.get(id.index())
    }

    pub fn id_of(&self, name: &str) -> Option<SpeciesId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &SpeciesConfig)> {
        self.species.iter().enumerate().map(|(i, c)| (SpeciesId(i as u16), c))
    }

    /// Declare how `subject` regards `object`; the inverse is recorded for
    /// `object` automatically.
    pub fn set_relation(&mut self, subject: SpeciesId, object: SpeciesId, relation: Relation) {
        self.relations.insert((subject, object), relation);
        if subject != object {
            self.relations.insert((object, subject), relation.inverse());
        }
    }

    /// `subject` hunts `object`.
    pub fn set_predation(&mut self, hunter: SpeciesId, prey: SpeciesId) {
        self.set_relation(hunter, prey, Relation::Prey);
    }

    /// How `subject` regards `object`.  Undeclared pairs are `Mate` within a
    /// species and `Neutral` across species.
    pub fn relation(&self, subject: SpeciesId, object: SpeciesId) -> Relation {
        match self.relations.get(&(subject, object)) {
            Some(r) => *r,
            None if subject == object => Relation::Mate,
            None => Relation::Neutral,
        }
    }
}
