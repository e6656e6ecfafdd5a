//! Start-of-tick snapshot of every live agent.
//!
//! Tasks never read another agent's live state: they read its [`AgentView`]
//! from the snapshot taken before the intent phase began.  The snapshot and
//! its neighbour index are immutable for the whole batch.

use glam::Vec3;

use eco_agent::{AgentStore, Task, Vitality};
use eco_core::{AgentId, SpeciesId};
use eco_spatial::NeighborIndex;

/// Read-only copy of the parts of an agent others may look at.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentView {
    pub id:       AgentId,
    pub species:  SpeciesId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub heading:  Vec3,
    pub task:     Task,
    pub target:   Option<AgentId>,
    pub vitality: Vitality,
    pub ridden:   bool,
}

impl AgentView {
    #[inline]
    pub fn is_dead(&self) -> bool {
        self.vitality.is_dead()
    }

    #[inline]
    pub fn is_attackable(&self) -> bool {
        self.vitality.is_attackable()
    }
}

#[derive(Default)]
pub struct Snapshot {
    views: Vec<Option<AgentView>>,
    index: NeighborIndex,
}

impl Snapshot {
    /// Copy every live agent and index their positions.
    pub fn capture(store: &AgentStore) -> Self {
        let mut views: Vec<Option<AgentView>> = vec![None; store.capacity()];
        for a in store.iter() {
            views[a.id.index()] = Some(AgentView {
                id:       a.id,
                species:  a.species,
                position: a.pose.position,
                velocity: a.velocity,
                heading:  a.heading,
                task:     a.task,
                target:   a.target,
                vitality: a.vitality.clone(),
                ridden:   a.ride.is_some(),
            });
        }
        let index = NeighborIndex::build(views.iter().flatten().map(|v| (v.id, v.position)));
        Self { views, index }
    }

    /// Look up an agent as it was at the start of the tick.
    #[inline]
    pub fn try_get(&self, id: AgentId) -> Option<&AgentView> {
        self.views.get(id.index())?.as_ref()
    }

    /// Agents within `radius` of `center`, in unspecified order.
    pub fn within(&self, center: Vec3, radius: f32) -> impl Iterator<Item = &AgentView> + '_ {
        self.index.within_radius(center, radius).filter_map(|id| self.try_get(id))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
