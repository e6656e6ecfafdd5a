//! Pathfinding trait and default bounded A* implementation.
//!
//! # Pluggability
//!
//! The behaviour core calls pathfinding via the [`Pathfinder`] trait, so hosts
//! can swap in hierarchical or cached search without touching the state
//! machine.  The default [`GridPathfinder`] searches the raw voxel lattice.
//!
//! # Bounds
//!
//! Every query takes `max_steps` and every search is additionally capped by a
//! node budget, so a call always completes in bounded time.  When the exact
//! goal is out of reach the "approach" queries return the path to the
//! reachable voxel closest to the goal and set [`PathPlan::reached`] to
//! `false`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::{IVec3, Vec3};
use rustc_hash::FxHashMap;

use eco_core::{Step, chebyshev};

use crate::profile::MoveProfile;
use crate::world::VoxelQuery;
use crate::{SpatialError, SpatialResult};

// ── PathPlan ──────────────────────────────────────────────────────────────────

/// The result of a path query: a start voxel and the steps to walk from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPlan {
    pub origin:  IVec3,
    pub steps:   Vec<Step>,
    /// `false` when the search gave up on the true goal and the plan only
    /// approaches it.
    pub reached: bool,
}

impl PathPlan {
    /// An empty plan that has already arrived.
    pub fn trivial(origin: IVec3) -> Self {
        Self { origin, steps: Vec::new(), reached: true }
    }

    /// The voxel the plan ends in.
    pub fn destination(&self) -> IVec3 {
        self.steps.iter().fold(self.origin, |c, s| c + s.offset())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// ── Pathfinder trait ──────────────────────────────────────────────────────────

/// Pluggable voxel path search.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// worker threads during parallel intent computation.
pub trait Pathfinder: Send + Sync {
    /// Path from `from` to exactly `to`, at most `max_steps` long.
    ///
    /// Returns [`SpatialError::NoPath`] if `to` cannot be reached within the
    /// bounds.
    fn find_path(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        from: IVec3,
        to: IVec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan>;

    /// Path toward `to`; if it is unreachable, the path to the closest
    /// reachable voxel instead (`reached == false`).
    fn find_path_or_approach(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        from: IVec3,
        to: IVec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan>;

    /// Path heading along `direction` for up to `max_steps`.
    fn find_path_along_ray(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        from: IVec3,
        direction: Vec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan>;

    /// Search along `direction` until a voxel satisfying `goal` is found.
    ///
    /// The body moves under `profile`; only the final voxel has to satisfy
    /// `goal` (a diver surfacing moves through water and ends in air).
    fn find_match_along_ray(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        goal: &MoveProfile,
        from: IVec3,
        direction: Vec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan>;
}

// ── GridPathfinder ────────────────────────────────────────────────────────────

/// A* over the 26-neighbour voxel lattice.
///
/// Every step costs 1, so path length equals step count and the Chebyshev
/// distance is an exact-when-unobstructed heuristic.  Ties are broken by
/// lower heuristic and then by insertion order, which makes results
/// deterministic for a given world.
#[derive(Debug, Clone, Copy)]
pub struct GridPathfinder {
    /// Maximum number of voxels a single query may visit.
    pub max_nodes: usize,
}

impl GridPathfinder {
    pub const DEFAULT_MAX_NODES: usize = 4096;

    pub fn new(max_nodes: usize) -> Self {
        Self { max_nodes: max_nodes.max(1) }
    }
}

impl Default for GridPathfinder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_NODES)
    }
}

impl Pathfinder for GridPathfinder {
    fn find_path(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        from: IVec3,
        to: IVec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan> {
        let plan = self.find_path_or_approach(world, profile, from, to, max_steps)?;
        if plan.reached {
            Ok(plan)
        } else {
            Err(SpatialError::NoPath { from, to })
        }
    }

    fn find_path_or_approach(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        from: IVec3,
        to: IVec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan> {
        check_origin(world, profile, from)?;
        let query = Query {
            world,
            profile,
            goal: None,
            target: to,
            max_steps,
            max_nodes: self.max_nodes,
        };
        Ok(query.run(from, |cell| cell == to))
    }

    fn find_path_along_ray(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        from: IVec3,
        direction: Vec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan> {
        check_origin(world, profile, from)?;
        let target = ray_target(from, direction, max_steps)?;
        let query = Query {
            world,
            profile,
            goal: None,
            target,
            max_steps,
            max_nodes: self.max_nodes,
        };
        Ok(query.run(from, |cell| cell == target))
    }

    fn find_match_along_ray(
        &self,
        world: &dyn VoxelQuery,
        profile: &MoveProfile,
        goal: &MoveProfile,
        from: IVec3,
        direction: Vec3,
        max_steps: u32,
    ) -> SpatialResult<PathPlan> {
        if goal.is_valid(world, from) {
            return Ok(PathPlan::trivial(from));
        }
        check_origin(world, profile, from)?;
        let target = ray_target(from, direction, max_steps)?;
        let query = Query {
            world,
            profile,
            goal: Some(goal),
            target,
            max_steps,
            max_nodes: self.max_nodes,
        };
        Ok(query.run(from, |cell| goal.is_valid(world, cell)))
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// The origin only has to be a voxel the body may occupy; support is not
/// required so an airborne walker can still plan its landing.
fn check_origin(world: &dyn VoxelQuery, profile: &MoveProfile, from: IVec3) -> SpatialResult<()> {
    if profile.occupy.admits(world.material(from)) {
        Ok(())
    } else {
        Err(SpatialError::InvalidOrigin(from))
    }
}

fn ray_target(from: IVec3, direction: Vec3, max_steps: u32) -> SpatialResult<IVec3> {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return Err(SpatialError::ZeroDirection);
    }
    // Scale so the dominant axis moves exactly `max_steps` voxels.
    let scale = max_steps as f32 / dir.abs().max_element();
    Ok(from + (dir * scale).round().as_ivec3())
}

struct Node {
    cell:   IVec3,
    parent: u32,
    step:   Step,
    g:      u32,
    h:      u32,
    /// Squared distance to the target; breaks `h` ties toward the straight
    /// line so open-ground paths do not zigzag.
    d:      u32,
}

const NO_PARENT: u32 = u32::MAX;

struct Query<'a> {
    world:     &'a dyn VoxelQuery,
    profile:   &'a MoveProfile,
    /// Match mode: voxels satisfying this profile are enterable (as terminals)
    /// even when the body profile rejects them.
    goal:      Option<&'a MoveProfile>,
    target:    IVec3,
    max_steps: u32,
    max_nodes: usize,
}

impl Query<'_> {
    fn run(&self, from: IVec3, is_goal: impl Fn(IVec3) -> bool) -> PathPlan {
        let mut nodes: Vec<Node> = Vec::new();
        let mut index: FxHashMap<IVec3, u32> = FxHashMap::default();
        // Min-heap keyed by (f, h, d, seq); seq is the node's insertion order.
        let mut heap: BinaryHeap<Reverse<(u32, u32, u32, u32)>> = BinaryHeap::new();

        let (h0, d0) = (self.heuristic(from), self.straightness(from));
        nodes.push(Node { cell: from, parent: NO_PARENT, step: Step::STAY, g: 0, h: h0, d: d0 });
        index.insert(from, 0);
        heap.push(Reverse((h0, h0, d0, 0)));

        // Closest-to-target node seen so far; ties go to the shorter path.
        let mut best = 0u32;

        while let Some(Reverse((f, _, _, seq))) = heap.pop() {
            let node = &nodes[seq as usize];
            let (cell, g, h) = (node.cell, node.g, node.h);

            // Skip stale heap entries.
            if f != g + h {
                continue;
            }

            if is_goal(cell) {
                return reconstruct(&nodes, seq, true);
            }

            let b = &nodes[best as usize];
            if (h, g) < (b.h, b.g) {
                best = seq;
            }

            if g >= self.max_steps || self.is_terminal(cell) {
                continue;
            }

            for step in Step::neighbours() {
                let next = cell + step.offset();
                if !self.is_enterable(next) {
                    continue;
                }
                let ng = g + 1;
                match index.get(&next) {
                    Some(&i) if nodes[i as usize].g <= ng => continue,
                    Some(&i) => {
                        let n = &mut nodes[i as usize];
                        n.g = ng;
                        n.parent = seq;
                        n.step = step;
                        heap.push(Reverse((ng + n.h, n.h, n.d, i)));
                    }
                    None => {
                        if nodes.len() >= self.max_nodes {
                            continue;
                        }
                        let (nh, nd) = (self.heuristic(next), self.straightness(next));
                        let i = nodes.len() as u32;
                        nodes.push(Node { cell: next, parent: seq, step, g: ng, h: nh, d: nd });
                        index.insert(next, i);
                        heap.push(Reverse((ng + nh, nh, nd, i)));
                    }
                }
            }
        }

        reconstruct(&nodes, best, false)
    }

    #[inline]
    fn heuristic(&self, cell: IVec3) -> u32 {
        chebyshev(cell, self.target) as u32
    }

    #[inline]
    fn straightness(&self, cell: IVec3) -> u32 {
        let d = cell - self.target;
        d.length_squared().unsigned_abs()
    }

    #[inline]
    fn is_enterable(&self, cell: IVec3) -> bool {
        self.profile.is_valid(self.world, cell)
            || self.goal.is_some_and(|g| g.is_valid(self.world, cell))
    }

    #[inline]
    fn is_terminal(&self, cell: IVec3) -> bool {
        self.goal.is_some() && !self.profile.is_valid(self.world, cell)
    }
}

fn reconstruct(nodes: &[Node], end: u32, reached: bool) -> PathPlan {
    let mut steps = Vec::new();
    let mut cur = end;
    while nodes[cur as usize].parent != NO_PARENT {
        let n = &nodes[cur as usize];
        steps.push(n.step);
        cur = n.parent;
    }
    steps.reverse();
    PathPlan { origin: nodes[cur as usize].cell, steps, reached }
}
