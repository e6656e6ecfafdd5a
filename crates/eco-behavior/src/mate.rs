//! Mating preconditions and commitment.

use eco_agent::{Agent, GeneTrait, Task, Vitality};
use eco_core::{AgentId, SpeciesId};

use crate::config::{Relation, SpeciesTable};
use crate::AgentView;

/// The fields mating looks at, from either a live agent or a snapshot view.
#[derive(Copy, Clone)]
pub struct MateCandidate<'a> {
    pub id:       AgentId,
    pub species:  SpeciesId,
    pub task:     Task,
    pub ridden:   bool,
    pub vitality: &'a Vitality,
}

impl<'a> From<&'a Agent> for MateCandidate<'a> {
    fn from(a: &'a Agent) -> Self {
        Self {
            id:       a.id,
            species:  a.species,
            task:     a.task,
            ridden:   a.ride.is_some(),
            vitality: &a.vitality,
        }
    }
}

impl<'a> From<&'a AgentView> for MateCandidate<'a> {
    fn from(v: &'a AgentView) -> Self {
        Self {
            id:       v.id,
            species:  v.species,
            task:     v.task,
            ridden:   v.ridden,
            vitality: &v.vitality,
        }
    }
}

/// Alive, free, off cooldown and healthy enough.  An agent already courting
/// stays ready down to the stop threshold; anyone else needs the begin
/// threshold.
fn ready(c: &MateCandidate<'_>, species: &SpeciesTable) -> bool {
    let Some(cfg) = species.get(c.species) else {
        return false;
    };
    let v = c.vitality;
    let healthy = if c.task.is_courting() {
        !v.stop_mating(&cfg.thresholds)
    } else {
        v.begin_mating(&cfg.thresholds)
    };
    !v.is_dead() && !c.ridden && c.task < Task::Reproduce && v.mate_cooldown <= 0.0 && healthy
}

/// Whether `a` and `b` may mate right now.  Symmetric.
///
/// Both must be alive, unridden, healthy enough and off cooldown, neither may
/// be at or past `Reproduce` in task order, and each must regard the other as
/// a mate.  Evaluated against whatever state is passed in, so a check made
/// during the intent phase must be repeated when the effect is applied.
pub fn can_mate_with(a: MateCandidate<'_>, b: MateCandidate<'_>, species: &SpeciesTable) -> bool {
    a.id != b.id
        && species.relation(a.species, b.species) == Relation::Mate
        && species.relation(b.species, a.species) == Relation::Mate
        && ready(&a, species)
        && ready(&b, species)
}

/// Commit `agent` to reproduction: pay the health cost, enter `Reproduce`
/// for the pregnancy length, and (for the carrying partner) record the
/// litter to release at the end.  The mating cooldown covers the pregnancy
/// plus the species cooldown.
pub fn mate_with(agent: &mut Agent, partner: AgentId, carries: bool, species: &SpeciesTable) {
    let Some(cfg) = species.get(agent.species) else {
        return;
    };
    let cost = agent.genetics.get(GeneTrait::MateCost, cfg.mate_cost);
    agent.vitality.damage(cost);
    let pregnancy = agent.genetics.get(GeneTrait::PregnancyLength, cfg.pregnancy_length);
    agent.set_task(Task::Reproduce, pregnancy);
    agent.vitality.mate_cooldown = pregnancy + cfg.mate_cooldown;
    agent.target = Some(partner);
    agent.vitality.gestating = if carries { cfg.litter_size } else { 0 };
}
