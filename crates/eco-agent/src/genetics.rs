//! Per-individual trait variation.
//!
//! Every creature carries one multiplier per [`GeneTrait`], rolled once from
//! a seed derived from its id.  Wherever behaviour code needs a species
//! constant it asks `genetics.get(trait, nominal)` instead of reading the
//! constant directly, so two wolves of the same species see, run and bite
//! slightly differently.
//!
//! Only the seed and variance are persisted; multipliers are re-rolled on
//! deserialization, which reproduces them exactly.

use eco_core::AgentRng;

/// Traits that vary between individuals.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GeneTrait {
    MaxHealth,
    WalkSpeed,
    RunSpeed,
    SightDistance,
    AttackDistance,
    AttackDamage,
    AttackCooldown,
    HoldBreath,
    Metabolism,
    DecomposeTime,
    PregnancyLength,
    MateCost,
}

impl GeneTrait {
    pub const COUNT: usize = 12;
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "GenomeRecord", into = "GenomeRecord"))]
pub struct Genetics {
    seed:        u64,
    variance:    f32,
    multipliers: [f32; GeneTrait::COUNT],
}

impl Genetics {
    /// Roll a genome: each multiplier is `1 + U(-variance, variance)`.
    pub fn new(seed: u64, variance: f32) -> Self {
        let variance = variance.clamp(0.0, 0.95);
        let mut rng = AgentRng::from_seed(seed);
        let mut multipliers = [1.0; GeneTrait::COUNT];
        if variance > 0.0 {
            for m in &mut multipliers {
                *m = 1.0 + rng.gen_range(-variance..variance);
            }
        }
        Self { seed, variance, multipliers }
    }

    /// A genome with every multiplier exactly 1.
    pub fn nominal() -> Self {
        Self::new(0, 0.0)
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn variance(&self) -> f32 {
        self.variance
    }

    #[inline]
    pub fn multiplier(&self, t: GeneTrait) -> f32 {
        self.multipliers[t as usize]
    }

    /// `nominal` scaled by this individual's multiplier for `t`.
    #[inline]
    pub fn get(&self, t: GeneTrait, nominal: f32) -> f32 {
        nominal * self.multiplier(t)
    }

    /// Replace the genome with a fresh roll from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed, self.variance);
    }
}

impl Default for Genetics {
    fn default() -> Self {
        Self::nominal()
    }
}

/// Persisted form of [`Genetics`].
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenomeRecord {
    pub seed:     u64,
    pub variance: f32,
}

impl From<GenomeRecord> for Genetics {
    fn from(r: GenomeRecord) -> Self {
        Genetics::new(r.seed, r.variance)
    }
}

impl From<Genetics> for GenomeRecord {
    fn from(g: Genetics) -> Self {
        GenomeRecord { seed: g.seed, variance: g.variance }
    }
}
