//! Deterministic per-agent RNG.
//!
//! Every agent owns a `SmallRng` whose seed mixes the run seed with the
//! agent id:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The constant is the golden-ratio fraction, so neighbouring ids land far
//! apart in seed space.  A stream is only ever advanced by the thread ticking
//! its agent, and a newborn never shifts the streams of the living.
//!
//! Genomes come from a separate, salted seed so rolling one never consumes
//! behaviour randomness.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Salt separating genome seeds from behaviour seeds.
const GENOME_SALT: u64 = 0x6a09_e667_f3bc_c908;

/// Seed for the genome of `agent` in a run seeded with `global_seed`.
#[inline]
pub fn genome_seed(global_seed: u64, agent: AgentId) -> u64 {
    (global_seed ^ GENOME_SALT) ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT)
}

/// Per-agent deterministic RNG.
///
/// Stored in a parallel `Vec` alongside the agent registry (see
/// `eco_agent::AgentRngs`).  The type is not `Sync` in spirit: each agent's
/// stream must only ever be advanced by the thread ticking that agent.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed from an explicit 64-bit value (genome rolls, tests).
    pub fn from_seed(seed: u64) -> Self {
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed for an agent restored from storage at `tick`.  Mixing in the tick
    /// keeps a reloaded run from replaying the stream the agent already used.
    pub fn resume(global_seed: u64, agent: AgentId, tick: u64) -> Self {
        Self::new(global_seed ^ tick.wrapping_mul(MIXING_CONSTANT).rotate_left(17), agent)
    }

    /// A uniform sample of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `base * U(0, 2)`: the re-rolled duration used for idle and wander
    /// timers.  Mean is `base`.
    #[inline]
    pub fn reroll(&mut self, base: f32) -> f32 {
        base * self.0.gen_range(0.0f32..2.0)
    }

    /// Uniformly distributed unit vector.
    pub fn unit_vec3(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.0.gen_range(-1.0f32..1.0),
                self.0.gen_range(-1.0f32..1.0),
                self.0.gen_range(-1.0f32..1.0),
            );
            let len2 = v.length_squared();
            if len2 > 1e-4 && len2 <= 1.0 {
                return v / len2.sqrt();
            }
        }
    }

    /// Uniformly distributed unit vector in the horizontal plane.
    pub fn unit_vec3_flat(&mut self) -> Vec3 {
        let angle = self.0.gen_range(0.0f32..std::f32::consts::TAU);
        Vec3::new(angle.cos(), 0.0, angle.sin())
    }
}
