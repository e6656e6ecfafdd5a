//! Integration tests for eco-sim.
//!
//! These drive whole ticks (snapshot, intent phase, apply phase) on a small
//! flat meadow.  Nobody integrates movement here, so agents stay where they
//! were placed unless a test moves them.

use glam::{IVec3, Vec3};

use eco_agent::{Agent, Task};
use eco_behavior::{Effect, SpeciesConfig, SpeciesTable};
use eco_core::{AgentId, SimConfig, SpeciesId, Tick};
use eco_spatial::{GridPathfinder, Material, VoxelGrid, VoxelQuery};

use crate::{Sim, SimBuilder, SimObserver, TickStats};

// ── Helpers ───────────────────────────────────────────────────────────────────

type TestSim = Sim<VoxelGrid, GridPathfinder>;

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        seed:                  42,
        tick_secs:             0.25,
        total_ticks,
        num_threads:           Some(1),
        output_interval_ticks: 5,
        genetic_variance:      0.0,
    }
}

/// A 32×12×32 arena: solid at `y < 0`, air above, sealed outside.
fn meadow() -> VoxelGrid {
    let mut g = VoxelGrid::new(
        IVec3::new(-16, -4, -16),
        IVec3::new(32, 12, 32),
        Material::Gas,
        Material::Solid,
    )
    .unwrap();
    g.fill_box(IVec3::new(-16, -4, -16), IVec3::new(15, -1, 15), Material::Solid);
    g
}

/// Deer (herbivore), wolf (carnivore, hunts deer), trout (fish) and horse
/// (mount).
fn species() -> SpeciesTable {
    let mut t = SpeciesTable::new();
    let deer = t.add(SpeciesConfig::herbivore("deer")).unwrap();
    let wolf = t
        .add(SpeciesConfig { attack_distance: 2.0, ..SpeciesConfig::carnivore("wolf") })
        .unwrap();
    t.add(SpeciesConfig::fish("trout")).unwrap();
    t.add(SpeciesConfig::mount("horse")).unwrap();
    t.set_predation(wolf, deer);
    t
}

fn build(config: SimConfig) -> TestSim {
    SimBuilder::new(config, species(), meadow(), GridPathfinder::default())
        .build()
        .unwrap()
}

fn sid(sim: &TestSim, name: &str) -> SpeciesId {
    sim.species.id_of(name).unwrap()
}

fn spawn(sim: &mut TestSim, name: &str, position: Vec3) -> AgentId {
    let species = sid(sim, name);
    let id = sim.spawn(species, position).unwrap();
    // Long idle so nothing wanders off on its own mid-test.
    sim.agents.get_mut(id).unwrap().task_timer = 100.0;
    id
}

fn agent(sim: &TestSim, id: AgentId) -> &Agent {
    sim.agents.get(id).unwrap()
}

fn set_health(sim: &mut TestSim, id: AgentId, fraction: f32) {
    let v = &mut sim.agents.get_mut(id).unwrap().vitality;
    let drop = v.health() - v.max_health * fraction;
    v.damage(drop);
}

fn set_task(sim: &mut TestSim, id: AgentId, task: Task, timer: f32, target: Option<AgentId>) {
    let a = sim.agents.get_mut(id).unwrap();
    a.set_task(task, timer);
    a.target = target;
}

/// Records every observer callback.
#[derive(Default)]
struct Recorder {
    started:   Vec<Tick>,
    ended:     Vec<(Tick, TickStats)>,
    changes:   Vec<(AgentId, Task, Task)>,
    effects:   Vec<(Effect, bool)>,
    despawned: Vec<AgentId>,
    snapshots: Vec<(Tick, usize)>,
    finished:  Option<Tick>,
}

impl Recorder {
    fn applied(&self) -> Vec<&Effect> {
        self.effects.iter().filter(|(_, ok)| *ok).map(|(e, _)| e).collect()
    }
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.started.push(tick);
    }

    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        self.ended.push((tick, *stats));
    }

    fn on_task_change(&mut self, _tick: Tick, agent: AgentId, from: Task, to: Task) {
        self.changes.push((agent, from, to));
    }

    fn on_effect(&mut self, _tick: Tick, effect: &Effect, applied: bool) {
        self.effects.push((effect.clone(), applied));
    }

    fn on_despawn(&mut self, _tick: Tick, agent: &Agent) {
        self.despawned.push(agent.id);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &eco_agent::AgentStore) {
        self.snapshots.push((tick, agents.len()));
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.finished = Some(final_tick);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use eco_agent::{Agent, AgentRngs, AgentStore, Genetics, Vitality};
    use eco_core::SpeciesId;
    use eco_spatial::GridPathfinder;
    use glam::Vec3;

    use super::*;
    use crate::SimError;

    #[test]
    fn build_succeeds() {
        let sim = build(test_config(10));
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
        assert!(sim.agents.is_empty());
    }

    #[test]
    fn zero_tick_length_rejected() {
        let config = SimConfig { tick_secs: 0.0, ..test_config(10) };
        let err = SimBuilder::new(config, species(), meadow(), GridPathfinder::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn excessive_variance_rejected() {
        let config = SimConfig { genetic_variance: 1.5, ..test_config(10) };
        let err = SimBuilder::new(config, species(), meadow(), GridPathfinder::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn zero_threads_rejected() {
        let config = SimConfig { num_threads: Some(0), ..test_config(10) };
        let err = SimBuilder::new(config, species(), meadow(), GridPathfinder::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn thread_count_sizes_the_intent_pool() {
        let sim = build(SimConfig { num_threads: Some(2), ..test_config(1) });
        assert_eq!(sim.pool.as_ref().map(|p| p.current_num_threads()), Some(2));
        let sim = build(SimConfig { num_threads: None, ..test_config(1) });
        assert!(sim.pool.is_none());
    }

    #[test]
    fn population_with_unknown_species_rejected() {
        let mut store = AgentStore::new();
        store.spawn(|id| {
            Agent::new(id, SpeciesId(99), Vec3::ZERO, Vitality::new(10.0, 1.0), Genetics::nominal())
        });
        let err = SimBuilder::new(test_config(1), species(), meadow(), GridPathfinder::default())
            .agents(store, AgentRngs::new())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::UnknownSpecies(SpeciesId(99))));
    }

    #[test]
    fn supplied_population_gets_rngs() {
        let mut store = AgentStore::new();
        for _ in 0..3 {
            store.spawn(|id| {
                Agent::new(id, SpeciesId(0), Vec3::ZERO, Vitality::new(10.0, 1.0), Genetics::nominal())
            });
        }
        let sim = SimBuilder::new(test_config(1), species(), meadow(), GridPathfinder::default())
            .agents(store, AgentRngs::new())
            .build()
            .unwrap();
        assert_eq!(sim.rngs.len(), 3);
    }
}

// ── Basic run ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn run_reaches_end_tick() {
        let mut sim = build(test_config(20));
        let mut rec = Recorder::default();
        sim.run(&mut rec);
        assert_eq!(sim.clock.current_tick, Tick(20));
        assert_eq!(rec.started.len(), 20);
        assert_eq!(rec.ended.len(), 20);
        assert_eq!(rec.finished, Some(Tick(20)));
    }

    #[test]
    fn snapshots_at_interval() {
        let mut sim = build(test_config(20));
        spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        let mut rec = Recorder::default();
        sim.run(&mut rec);
        let ticks: Vec<Tick> = rec.snapshots.iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, vec![Tick(0), Tick(5), Tick(10), Tick(15)]);
        assert!(rec.snapshots.iter().all(|(_, n)| *n == 1));
    }

    #[test]
    fn run_ticks_ignores_end() {
        let mut sim = build(test_config(2));
        sim.run_ticks(7, &mut NoopObserver);
        assert_eq!(sim.clock.current_tick, Tick(7));
    }

    #[test]
    fn every_agent_is_ticked() {
        let mut sim = build(test_config(1));
        for x in 0..4 {
            spawn(&mut sim, "deer", Vec3::new(x as f32 * 3.0 + 0.5, 0.0, 0.5));
        }
        let stats = sim.step(&mut NoopObserver);
        assert_eq!(stats.ticked, 4);
    }

    #[test]
    fn same_seed_same_run() {
        let run = || {
            let mut sim = build(SimConfig { genetic_variance: 0.1, ..test_config(60) });
            let deer = sid(&sim, "deer");
            let wolf = sid(&sim, "wolf");
            for i in 0..6 {
                let species = if i % 3 == 0 { wolf } else { deer };
                sim.spawn(species, Vec3::new(i as f32 * 2.0 + 0.5, 0.0, 0.5)).unwrap();
            }
            sim.run(&mut NoopObserver);
            sim.agents
                .iter()
                .map(|a| (a.id, a.task, a.task_timer, a.vitality.health(), a.genetics.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}

// ── Population ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod spawn_tests {
    use eco_agent::GeneTrait;

    use super::*;
    use crate::SimError;

    #[test]
    fn spawn_is_healthy_and_idle() {
        let mut sim = build(test_config(1));
        let deer = sid(&sim, "deer");
        let id = sim.spawn(deer, Vec3::new(0.5, 0.0, 0.5)).unwrap();
        let a = agent(&sim, id);
        assert_eq!(a.task, Task::Idle);
        assert_eq!(a.vitality.fraction(), 1.0);
        assert!((0.0..6.0).contains(&a.task_timer));
        assert!(sim.rngs.get_mut(id).is_some());
    }

    #[test]
    fn unknown_species_rejected() {
        let mut sim = build(test_config(1));
        let err = sim.spawn(SpeciesId(77), Vec3::ZERO).err().unwrap();
        assert!(matches!(err, SimError::UnknownSpecies(SpeciesId(77))));
    }

    #[test]
    fn genomes_follow_seed_and_id() {
        let config = SimConfig { genetic_variance: 0.2, ..test_config(1) };
        let mut a = build(config.clone());
        let mut b = build(config);
        let deer = sid(&a, "deer");
        let x = a.spawn(deer, Vec3::ZERO).unwrap();
        let y = a.spawn(deer, Vec3::ZERO).unwrap();
        let x2 = b.spawn(deer, Vec3::ZERO).unwrap();
        assert_eq!(agent(&a, x).genetics, agent(&b, x2).genetics);
        assert_ne!(agent(&a, x).genetics, agent(&a, y).genetics);
        let h = agent(&a, x).genetics.get(GeneTrait::MaxHealth, 100.0);
        assert_eq!(agent(&a, x).vitality.max_health, h);
    }

    #[test]
    fn host_despawn_removes() {
        let mut sim = build(test_config(1));
        let id = spawn(&mut sim, "deer", Vec3::ZERO);
        assert!(sim.despawn(id).is_some());
        assert!(sim.despawn(id).is_none());
        assert!(sim.agents.is_empty());
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn predator_flee() {
        let mut sim = build(test_config(1));
        let deer = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        spawn(&mut sim, "wolf", Vec3::new(5.5, 0.0, 0.5));
        set_health(&mut sim, deer, 0.5);

        let mut rec = Recorder::default();
        sim.step(&mut rec);

        let a = agent(&sim, deer);
        assert_eq!(a.task, Task::RunFromPredator);
        assert!(a.path.destination().unwrap().x < 0);
        assert!(rec.changes.iter().any(|&(id, _, to)| id == deer && to == Task::RunFromPredator));
    }

    #[test]
    fn attack_then_loot() {
        let mut sim = build(test_config(2));
        let wolf = spawn(&mut sim, "wolf", Vec3::new(0.5, 0.0, 0.5));
        let deer = spawn(&mut sim, "deer", Vec3::new(1.5, 0.0, 0.5));
        set_health(&mut sim, deer, 0.0);
        set_health(&mut sim, wolf, 0.8);
        set_task(&mut sim, wolf, Task::AttackTarget, 0.0, Some(deer));

        let mut rec = Recorder::default();
        sim.step(&mut rec);

        let w = agent(&sim, wolf);
        assert_eq!(w.vitality.fraction(), 1.0);
        assert_eq!(w.task, Task::Idle);
        assert!((0.0..6.0).contains(&w.task_timer));
        assert_eq!(agent(&sim, deer).vitality.remains, 15.0);
        assert_eq!(agent(&sim, deer).task, Task::Death);

        sim.step(&mut rec);
        let collects: Vec<_> = rec
            .applied()
            .into_iter()
            .filter(|e| matches!(e, Effect::Collect { .. }))
            .cloned()
            .collect();
        assert_eq!(collects, vec![Effect::Collect { collector: wolf, target: deer, bite: 25.0 }]);
    }

    #[test]
    fn mate_commitment() {
        let mut sim = build(test_config(1));
        let a = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        let b = spawn(&mut sim, "deer", Vec3::new(1.5, 0.0, 0.5));
        set_task(&mut sim, a, Task::ChaseMate, 0.0, Some(b));
        set_task(&mut sim, b, Task::ChaseMate, 0.0, Some(a));

        let mut rec = Recorder::default();
        sim.step(&mut rec);

        // Both proposed; the second finds both already committed.
        let mates: Vec<bool> = rec
            .effects
            .iter()
            .filter(|(e, _)| matches!(e, Effect::Mate { .. }))
            .map(|(_, ok)| *ok)
            .collect();
        assert_eq!(mates, vec![true, false]);

        let (pa, pb) = (agent(&sim, a), agent(&sim, b));
        assert_eq!(pa.task, Task::Reproduce);
        assert_eq!(pb.task, Task::Reproduce);
        assert_eq!(pa.task_timer, 20.0);
        assert_eq!(pa.vitality.gestating, 1);
        assert_eq!(pb.vitality.gestating, 0);
        assert_eq!(pa.target, Some(b));
    }

    #[test]
    fn pregnancy_ends_in_birth() {
        let mut sim = build(test_config(1));
        let a = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        let b = spawn(&mut sim, "deer", Vec3::new(1.5, 0.0, 0.5));
        set_task(&mut sim, a, Task::ChaseMate, 0.0, Some(b));
        set_task(&mut sim, b, Task::ChaseMate, 0.0, Some(a));

        let mut rec = Recorder::default();
        sim.run_ticks(82, &mut rec);

        assert_eq!(sim.agents.len(), 3);
        let spawned: usize = rec.ended.iter().map(|(_, s)| s.spawned).sum();
        assert_eq!(spawned, 1);
        assert_ne!(agent(&sim, a).task, Task::Reproduce);
        let child = sim.agents.iter().find(|x| x.id != a && x.id != b).unwrap();
        assert_eq!(child.position(), Vec3::new(0.5, 0.0, 0.5));
        assert_eq!(child.species, agent(&sim, a).species);
    }

    #[test]
    fn attacked_herbivore_runs() {
        let mut sim = build(test_config(1));
        let a = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        let b = spawn(&mut sim, "deer", Vec3::new(1.5, 0.0, 0.5));
        set_task(&mut sim, a, Task::AttackTarget, 0.0, Some(b));
        sim.agents.get_mut(b).unwrap().vitality.mate_cooldown = 100.0;

        let mut rec = Recorder::default();
        sim.step(&mut rec);

        let v = agent(&sim, b);
        assert!((v.vitality.health() - 94.95).abs() < 1e-3);
        assert_eq!(v.task, Task::RunFromTarget);
        assert_eq!(v.target, Some(a));
        assert!(rec.changes.contains(&(b, Task::Idle, Task::RunFromTarget)));
    }

    #[test]
    fn attacked_carnivore_fights_back() {
        let mut sim = build(test_config(1));
        let a = spawn(&mut sim, "wolf", Vec3::new(0.5, 0.0, 0.5));
        let b = spawn(&mut sim, "wolf", Vec3::new(1.5, 0.0, 0.5));
        set_task(&mut sim, a, Task::AttackTarget, 0.0, Some(b));

        sim.step(&mut Recorder::default());

        let v = agent(&sim, b);
        assert_eq!(v.task, Task::ChaseTarget);
        assert_eq!(v.target, Some(a));
    }

    #[test]
    fn dead_attacker_strikes_nothing() {
        let mut sim = build(test_config(1));
        let a = spawn(&mut sim, "wolf", Vec3::new(0.5, 0.0, 0.5));
        let b = spawn(&mut sim, "deer", Vec3::new(1.5, 0.0, 0.5));
        // The wolf's own tick pushes nothing once it is dead, so hand the
        // apply phase a stale effect directly.
        set_health(&mut sim, a, 0.0);
        let mut stats = TickStats::default();
        let ok = sim.apply_effect(
            Tick::ZERO,
            &Effect::Attack { attacker: a, target: b, damage: 50.0 },
            &mut Recorder::default(),
            &mut stats,
        );
        assert!(!ok);
        assert_eq!(agent(&sim, b).vitality.fraction(), 1.0);
    }

    #[test]
    fn grazing_claims_the_cell_once() {
        let mut sim = build(test_config(1));
        let cell = IVec3::new(2, -1, 0);
        sim.world.set(cell, Material::Foliage);
        let a = spawn(&mut sim, "deer", Vec3::new(2.5, 0.0, 0.5));
        let b = spawn(&mut sim, "deer", Vec3::new(2.5, 0.0, 1.5));
        for id in [a, b] {
            set_health(&mut sim, id, 0.3);
            set_task(&mut sim, id, Task::Attack, 0.0, None);
            sim.agents.get_mut(id).unwrap().forage = Some(cell);
        }

        let mut rec = Recorder::default();
        sim.step(&mut rec);

        let grazes: Vec<(AgentId, bool)> = rec
            .effects
            .iter()
            .filter_map(|(e, ok)| match e {
                Effect::Graze { agent, .. } => Some((*agent, *ok)),
                _ => None,
            })
            .collect();
        assert_eq!(grazes, vec![(a, true), (b, false)]);
        assert!(agent(&sim, a).vitality.fraction() > agent(&sim, b).vitality.fraction());

        assert_eq!(sim.pending_world_edits().len(), 1);
        assert_eq!(sim.apply_world_edits(), 1);
        assert_eq!(sim.world.material(cell), Material::Solid);
        assert!(sim.pending_world_edits().is_empty());
    }

    #[test]
    fn drained_cell_can_be_claimed_again() {
        let mut sim = build(test_config(1));
        let cell = IVec3::new(2, -1, 0);
        sim.world.set(cell, Material::Foliage);
        let a = spawn(&mut sim, "deer", Vec3::new(2.5, 0.0, 0.5));
        set_health(&mut sim, a, 0.3);
        let graze = Effect::Graze { agent: a, cell, nutrition: 5.0 };
        let mut stats = TickStats::default();
        let mut rec = Recorder::default();

        assert!(sim.apply_effect(Tick::ZERO, &graze, &mut rec, &mut stats));
        assert!(!sim.apply_effect(Tick::ZERO, &graze, &mut rec, &mut stats));

        // Drained but not applied by the host: the foliage is still there.
        assert_eq!(sim.take_world_edits().len(), 1);
        assert!(sim.apply_effect(Tick::ZERO, &graze, &mut rec, &mut stats));
        assert_eq!(sim.pending_world_edits().len(), 1);
    }

    #[test]
    fn death_holds_until_healed() {
        let mut sim = build(test_config(1));
        let deer = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        set_health(&mut sim, deer, 0.0);

        sim.run_ticks(3, &mut Recorder::default());
        assert_eq!(agent(&sim, deer).task, Task::Death);
        assert_eq!(agent(&sim, deer).vitality.health(), 0.0);

        sim.heal(deer, 50.0).unwrap();
        sim.step(&mut Recorder::default());
        assert_eq!(agent(&sim, deer).task, Task::Idle);
    }

    #[test]
    fn corpse_decomposes() {
        let mut sim = build(test_config(1));
        let deer = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        set_health(&mut sim, deer, 0.0);

        let mut rec = Recorder::default();
        // 30 s at 0.25 s per tick, plus the tick that starts decomposition.
        sim.run_ticks(122, &mut rec);
        assert!(sim.agents.get(deer).is_none());
        assert_eq!(rec.despawned, vec![deer]);
    }
}

// ── Host API ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod host_tests {
    use eco_agent::Medium;

    use super::*;
    use crate::SimError;

    #[test]
    fn rider_steers_mount() {
        let mut sim = build(test_config(1));
        let horse = spawn(&mut sim, "horse", Vec3::new(0.5, 0.0, 0.5));
        sim.mount(horse, 9).unwrap();
        assert_eq!(agent(&sim, horse).task, Task::FollowRider);
        sim.steer(horse, Vec3::Z, true).unwrap();

        sim.step(&mut Recorder::default());

        let intent = sim.intent(horse).unwrap();
        assert!((intent.velocity - Vec3::new(0.0, 0.0, 9.0)).length() < 1e-4);
    }

    #[test]
    fn mount_rules() {
        let mut sim = build(test_config(1));
        let deer = spawn(&mut sim, "deer", Vec3::ZERO);
        let horse = spawn(&mut sim, "horse", Vec3::new(3.5, 0.0, 0.5));
        assert!(matches!(sim.mount(deer, 1), Err(SimError::NotRideable(_))));
        sim.mount(horse, 1).unwrap();
        assert!(matches!(sim.mount(horse, 2), Err(SimError::AlreadyRidden(_))));
        assert!(matches!(sim.steer(deer, Vec3::X, false), Err(SimError::NotRidden(_))));
    }

    #[test]
    fn dismount_returns_rider() {
        let mut sim = build(test_config(1));
        let horse = spawn(&mut sim, "horse", Vec3::ZERO);
        sim.mount(horse, 4).unwrap();
        assert_eq!(sim.dismount(horse).unwrap(), Some(4));
        assert_eq!(agent(&sim, horse).task, Task::Idle);
        assert_eq!(sim.dismount(horse).unwrap(), None);
    }

    #[test]
    fn ridden_mount_death_throws_rider() {
        let mut sim = build(test_config(1));
        let horse = spawn(&mut sim, "horse", Vec3::new(0.5, 0.0, 0.5));
        sim.mount(horse, 12).unwrap();
        set_health(&mut sim, horse, 0.0);

        let mut rec = Recorder::default();
        sim.step(&mut rec);

        let applied = rec.applied();
        assert!(applied.contains(&&Effect::Dismount { agent: horse, rider: 12 }));
        assert!(applied.contains(&&Effect::Despawn { agent: horse }));
        assert_eq!(rec.despawned, vec![horse]);
    }

    #[test]
    fn stranded_fish_flops() {
        let mut sim = build(test_config(1));
        let trout = spawn(&mut sim, "trout", Vec3::new(0.5, 0.0, 0.5));
        sim.report_environment(trout, Medium::Gas, 1.0).unwrap();
        sim.step(&mut Recorder::default());
        assert_eq!(agent(&sim, trout).task, Task::FlopOnGround);
    }

    #[test]
    fn buried_creature_suffocates() {
        let mut sim = build(test_config(1));
        let deer = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        let mut total = 0.0;
        for _ in 0..60 {
            total += sim.report_environment(deer, Medium::Solid, 1.0).unwrap();
        }
        assert!(total > 0.0);
        assert!(agent(&sim, deer).vitality.fraction() < 1.0);
        assert_eq!(agent(&sim, deer).vitality.medium, Medium::Solid);
    }

    #[test]
    fn drowning_creature_surfaces() {
        let mut sim = build(test_config(1));
        let deer = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        for _ in 0..24 {
            sim.report_environment(deer, Medium::Liquid, 1.0).unwrap();
        }
        sim.step(&mut Recorder::default());
        assert_eq!(agent(&sim, deer).task, Task::Surface);
    }

    #[test]
    fn motion_feedback_updates_pose() {
        let mut sim = build(test_config(1));
        let deer = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        sim.set_motion(deer, Vec3::new(1.0, 0.0, 0.5), Vec3::X).unwrap();
        assert_eq!(agent(&sim, deer).position(), Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(agent(&sim, deer).velocity, Vec3::X);
        assert!(matches!(
            sim.set_motion(AgentId(40), Vec3::ZERO, Vec3::ZERO),
            Err(SimError::AgentNotFound(AgentId(40)))
        ));
    }
}

// ── Persistence ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod persist_tests {
    use super::*;
    use crate::SimError;

    fn courting_pair() -> (TestSim, AgentId, AgentId) {
        let mut sim = build(SimConfig { genetic_variance: 0.1, ..test_config(10) });
        let a = spawn(&mut sim, "deer", Vec3::new(0.5, 0.0, 0.5));
        let b = spawn(&mut sim, "deer", Vec3::new(4.5, 0.0, 0.5));
        set_task(&mut sim, a, Task::ChaseMate, 3.5, Some(b));
        set_health(&mut sim, a, 0.75);
        sim.agents.get_mut(a).unwrap().vitality.breath = -1.5;
        (sim, a, b)
    }

    #[test]
    fn json_round_trip() {
        let (mut sim, a, b) = courting_pair();
        sim.run_ticks(3, &mut Recorder::default());
        let before = agent(&sim, a).clone();

        let mut buf = Vec::new();
        sim.save_json(&mut buf).unwrap();

        let mut restored = build(test_config(1));
        let cleared = restored.load_json(buf.as_slice()).unwrap();
        assert_eq!(cleared, 0);

        let after = agent(&restored, a);
        assert_eq!(after.vitality, before.vitality);
        assert_eq!(after.genetics, before.genetics);
        assert_eq!(after.task, before.task);
        assert_eq!(after.task_timer, before.task_timer);
        assert_eq!(after.target, before.target);
        assert_eq!(after.pose, before.pose);
        assert!(restored.agents.get(b).is_some());
        assert_eq!(restored.clock.current_tick, Tick(3));
        assert_eq!(restored.config.genetic_variance, 0.1);
        assert_eq!(restored.rngs.len(), restored.agents.capacity());
    }

    #[test]
    fn stale_target_cleared_on_restore() {
        let (sim, a, b) = courting_pair();
        let mut state = sim.save();
        state.agents.retain(|x| x.id != b);

        let mut restored = build(test_config(1));
        assert_eq!(restored.restore(state).unwrap(), 1);
        assert_eq!(agent(&restored, a).target, None);

        // And the orphaned chaser recovers on its next tick.
        restored.step(&mut Recorder::default());
        assert_ne!(agent(&restored, a).task, Task::ChaseMate);
    }

    #[test]
    fn unknown_version_rejected() {
        let (sim, _, _) = courting_pair();
        let mut state = sim.save();
        state.version = 99;
        let mut restored = build(test_config(1));
        assert!(matches!(restored.restore(state), Err(SimError::Version { got: 99, .. })));
    }

    #[test]
    fn unknown_species_rejected() {
        let (sim, a, _) = courting_pair();
        let mut state = sim.save();
        for x in &mut state.agents {
            if x.id == a {
                x.species = SpeciesId(50);
            }
        }
        let mut restored = build(test_config(1));
        assert!(matches!(restored.restore(state), Err(SimError::UnknownSpecies(SpeciesId(50)))));
    }

    #[test]
    fn despawned_ids_stay_retired_after_restore() {
        let mut sim = build(SimConfig { genetic_variance: 0.2, ..test_config(1) });
        for x in 0..3 {
            spawn(&mut sim, "deer", Vec3::new(x as f32 * 2.0 + 0.5, 0.0, 0.5));
        }
        let gone = agent(&sim, AgentId(2)).genetics.clone();
        sim.despawn(AgentId(2));
        let state = sim.save();
        assert_eq!(state.next_id, 3);

        let mut restored = build(SimConfig { genetic_variance: 0.2, ..test_config(1) });
        restored.restore(state).unwrap();
        assert_eq!(restored.rngs.len(), restored.agents.capacity());
        let deer = sid(&restored, "deer");
        let fresh = restored.spawn(deer, Vec3::ZERO).unwrap();
        assert_eq!(fresh, AgentId(3));
        assert_ne!(agent(&restored, fresh).genetics, gone);
    }

    #[test]
    fn pending_edits_survive() {
        let mut sim = build(test_config(1));
        let cell = IVec3::new(2, -1, 0);
        sim.world.set(cell, Material::Foliage);
        let a = spawn(&mut sim, "deer", Vec3::new(2.5, 0.0, 0.5));
        set_health(&mut sim, a, 0.3);
        set_task(&mut sim, a, Task::Attack, 0.0, None);
        sim.agents.get_mut(a).unwrap().forage = Some(cell);
        sim.step(&mut Recorder::default());

        let mut restored = build(test_config(1));
        restored.restore(sim.save()).unwrap();
        assert_eq!(restored.pending_world_edits(), sim.pending_world_edits());
        assert_eq!(restored.pending_world_edits().len(), 1);

        // The restored queue still claims its cell.
        restored.world.set(cell, Material::Foliage);
        let graze = Effect::Graze { agent: a, cell, nutrition: 5.0 };
        let ok = restored.apply_effect(Tick(1), &graze, &mut Recorder::default(), &mut TickStats::default());
        assert!(!ok);
    }
}
