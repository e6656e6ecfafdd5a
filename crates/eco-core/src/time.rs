//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  Every tick advances
//! simulated time by a fixed `tick_secs`, which is the `dt` handed to every
//! task function, vitality update and timer decrement:
//!
//!   elapsed_secs = tick * tick_secs
//!
//! Using an integer tick as the canonical clock keeps ordering exact; the
//! float `dt` is only used for physiology and timers.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and converts it to simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated seconds per tick (the `dt` of every update).
    pub tick_secs: f32,
    /// The current tick, advanced once per iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(tick_secs: f32) -> Self {
        Self { tick_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.tick_secs as f64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}s)", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Species parameters live in `eco_behavior::SpeciesTable`; this struct only
/// holds run-wide settings.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Simulated seconds per tick.
    pub tick_secs: f32,

    /// Total ticks to simulate when calling `Sim::run`.
    pub total_ticks: u64,

    /// Worker thread count for the parallel intent phase.  `None` uses
    /// Rayon's global pool (all logical cores).  Ignored without the
    /// `parallel` feature.
    pub num_threads: Option<usize>,

    /// Call the snapshot observer every N ticks.  `0` disables snapshots.
    pub output_interval_ticks: u64,

    /// Half-width of the per-trait genetic multiplier range: every genome
    /// trait is scaled by `U(1 - v, 1 + v)`.  `0.0` gives clones.
    pub genetic_variance: f32,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_secs)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed:                  0,
            tick_secs:             0.05,
            total_ticks:           0,
            num_threads:           None,
            output_interval_ticks: 0,
            genetic_variance:      0.1,
        }
    }
}
