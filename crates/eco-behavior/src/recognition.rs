//! Perception: find the nearest predator, prey or mate in sight.
//!
//! Candidates come from the snapshot's neighbour index, are filtered by the
//! species relationship table and an optional caller predicate, and the
//! nearest by straight-line distance wins.  Path cost is not
//! considered here; it is only paid once a candidate has been chosen.  On an
//! exact distance tie the first candidate found wins.

use eco_agent::Agent;
use eco_core::AgentId;

use crate::config::Relation;
use crate::{AgentView, TickContext};

/// Caller-supplied eligibility check.
pub type Predicate<'p> = &'p dyn Fn(&AgentView) -> bool;

/// Nearest agent within `sight` of `agent` that its species regards as
/// `relation` and that passes `predicate`.
pub fn find_closest(
    ctx:       &TickContext<'_>,
    agent:     &Agent,
    sight:     f32,
    relation:  Relation,
    predicate: Option<Predicate<'_>>,
) -> Option<AgentId> {
    let position = agent.position();
    let mut best: Option<(f32, AgentId)> = None;
    for view in ctx.snapshot.within(position, sight) {
        if view.id == agent.id || ctx.species.relation(agent.species, view.species) != relation {
            continue;
        }
        if predicate.is_some_and(|p| !p(view)) {
            continue;
        }
        let d2 = view.position.distance_squared(position);
        if best.is_none_or(|(bd, _)| d2 < bd) {
            best = Some((d2, view.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Nearest living predator in sight.
pub fn find_closest_predator(
    ctx:       &TickContext<'_>,
    agent:     &Agent,
    sight:     f32,
    predicate: Option<Predicate<'_>>,
) -> Option<AgentId> {
    let alive = |v: &AgentView| !v.is_dead() && predicate.is_none_or(|p| p(v));
    find_closest(ctx, agent, sight, Relation::Predator, Some(&alive))
}

/// Nearest attackable prey in sight.
pub fn find_closest_prey(
    ctx:       &TickContext<'_>,
    agent:     &Agent,
    sight:     f32,
    predicate: Option<Predicate<'_>>,
) -> Option<AgentId> {
    let edible = |v: &AgentView| v.is_attackable() && predicate.is_none_or(|p| p(v));
    find_closest(ctx, agent, sight, Relation::Prey, Some(&edible))
}

/// Nearest living potential mate in sight.
pub fn find_closest_mate(
    ctx:       &TickContext<'_>,
    agent:     &Agent,
    sight:     f32,
    predicate: Option<Predicate<'_>>,
) -> Option<AgentId> {
    let alive = |v: &AgentView| !v.is_dead() && predicate.is_none_or(|p| p(v));
    find_closest(ctx, agent, sight, Relation::Mate, Some(&alive))
}
