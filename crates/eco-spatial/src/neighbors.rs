//! Spatial index over live agent positions.
//!
//! Built once per tick batch from the start-of-tick snapshot (`bulk_load`)
//! and never mutated while agents read it, so every neighbour query inside a
//! batch observes the same world.

use glam::Vec3;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use eco_core::AgentId;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct AgentEntry {
    point: [f32; 3],
    id:    AgentId,
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    /// Squared Euclidean distance in world units.
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── NeighborIndex ─────────────────────────────────────────────────────────────

/// Read-only R-tree of agent positions.
#[derive(Default)]
pub struct NeighborIndex {
    tree: RTree<AgentEntry>,
}

impl NeighborIndex {
    pub fn build(agents: impl IntoIterator<Item = (AgentId, Vec3)>) -> Self {
        let entries: Vec<AgentEntry> = agents
            .into_iter()
            .map(|(id, p)| AgentEntry { point: p.to_array(), id })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Every agent within `radius` of `center` (inclusive), in unspecified
    /// order.
    pub fn within_radius(&self, center: Vec3, radius: f32) -> impl Iterator<Item = AgentId> + '_ {
        self.tree
            .locate_within_distance(center.to_array(), radius * radius)
            .map(|e| e.id)
    }

    /// The agent nearest to `center`, if any.
    pub fn nearest(&self, center: Vec3) -> Option<AgentId> {
        self.tree.nearest_neighbor(&center.to_array()).map(|e| e.id)
    }
}
