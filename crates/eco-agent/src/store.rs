//! The live-agent registry: `AgentStore` (creatures) and `AgentRngs`
//! (per-agent RNG).
//!
//! # Why two structs?
//!
//! The parallel intent phase needs exclusive access to each agent's RNG and
//! to the agent itself while every agent also reads a shared snapshot.
//! Keeping RNGs in a separate `AgentRngs` lets the tick loop zip the two
//! slot vectors and hand each worker one `(&mut Agent, &mut AgentRng)` pair.
//!
//! # Ids
//!
//! An `AgentId` is a slot index.  Ids are handed out in increasing order and
//! a despawned slot is never reused, so a stale id resolves to nothing
//! rather than to a different creature.

use eco_core::{AgentId, AgentRng};

use crate::{Agent, AgentError, AgentResult};

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, one entry per registry slot.
#[derive(Default)]
pub struct AgentRngs {
    pub inner: Vec<AgentRng>,
}

impl AgentRngs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `rng` for `agent`, growing the table as needed.  Slots below
    /// `agent` that have no RNG yet get one seeded from their own id.
    pub fn install(&mut self, global_seed: u64, agent: AgentId, rng: AgentRng) {
        while self.inner.len() < agent.index() {
            let id = AgentId(self.inner.len() as u32);
            self.inner.push(AgentRng::new(global_seed, id));
        }
        if agent.index() < self.inner.len() {
            self.inner[agent.index()] = rng;
        } else {
            self.inner.push(rng);
        }
    }

    /// Mutable reference to one agent's RNG.
    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut AgentRng> {
        self.inner.get_mut(agent.index())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Slab of creatures indexed by `AgentId`.
#[derive(Default)]
pub struct AgentStore {
    slots: Vec<Option<Agent>>,
    live:  usize,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live agents.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots ever allocated (live or despawned).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The id the next spawned agent will receive.
    #[inline]
    pub fn next_id(&self) -> AgentId {
        AgentId(self.slots.len() as u32)
    }

    /// Create an agent in a fresh slot.  `make` receives the new id.
    pub fn spawn(&mut self, make: impl FnOnce(AgentId) -> Agent) -> AgentId {
        let id = self.next_id();
        let mut agent = make(id);
        agent.id = id;
        self.slots.push(Some(agent));
        self.live += 1;
        id
    }

    /// Put a stored agent back into its original slot.
    pub fn restore(&mut self, agent: Agent) -> AgentResult<()> {
        let i = agent.id.index();
        if i >= self.slots.len() {
            self.slots.resize_with(i + 1, || None);
        }
        if self.slots[i].is_some() {
            return Err(AgentError::SlotOccupied(agent.id));
        }
        self.slots[i] = Some(agent);
        self.live += 1;
        Ok(())
    }

    /// Retire every id below `next` that has no slot yet, so the next spawn
    /// gets at least `next`.  Never shrinks.
    pub fn reserve_ids(&mut self, next: AgentId) {
        if next.index() > self.slots.len() {
            self.slots.resize_with(next.index(), || None);
        }
    }

    /// Remove an agent.  Returns it, or `None` if the id was already gone.
    pub fn despawn(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.slots.get_mut(id.index())?.take()?;
        self.live -= 1;
        Some(agent)
    }

    /// Look up a live agent.
    #[inline]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(id.index())?.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    #[inline]
    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    /// Mutable access to two different live agents at once.
    pub fn pair_mut(&mut self, a: AgentId, b: AgentId) -> Option<(&mut Agent, &mut Agent)> {
        let (ia, ib) = (a.index(), b.index());
        if ia == ib || ia >= self.slots.len() || ib >= self.slots.len() {
            return None;
        }
        let (lo, hi) = if ia < ib { (ia, ib) } else { (ib, ia) };
        let (left, right) = self.slots.split_at_mut(hi);
        let first = left[lo].as_mut()?;
        let second = right[0].as_mut()?;
        if ia < ib { Some((first, second)) } else { Some((second, first)) }
    }

    /// Live agents in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.slots.iter_mut().flatten()
    }

    /// Live agent ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.iter().map(|a| a.id)
    }

    /// Raw slot access for the tick loop, which zips slots with RNGs.
    pub fn slots_mut(&mut self) -> &mut [Option<Agent>] {
        &mut self.slots
    }

    /// Drop every `target` that no longer resolves to a live agent.  Returns
    /// how many were cleared.
    pub fn clear_stale_targets(&mut self) -> usize {
        let stale: Vec<AgentId> = self
            .iter()
            .filter(|a| a.target.is_some_and(|t| !self.contains(t)))
            .map(|a| a.id)
            .collect();
        for id in &stale {
            if let Some(agent) = self.get_mut(*id) {
                agent.target = None;
            }
        }
        stale.len()
    }
}
