//! Unit tests for eco-agent.

#[cfg(test)]
mod helpers {
    use glam::Vec3;

    use eco_core::{AgentId, SpeciesId};

    use crate::{Agent, Genetics, Vitality};

    pub fn agent(id: u32) -> Agent {
        Agent::new(
            AgentId(id),
            SpeciesId(0),
            Vec3::new(id as f32, 0.0, 0.0),
            Vitality::new(100.0, 20.0),
            Genetics::nominal(),
        )
    }
}

// ── Tasks ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod task {
    use crate::{Task, TaskSet};

    #[test]
    fn all_is_in_index_order() {
        for (i, t) in Task::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
            assert_eq!(Task::from_index(i), Some(*t));
        }
        assert_eq!(Task::from_index(Task::COUNT), None);
    }

    #[test]
    fn reproduce_guard_ordering() {
        assert!(Task::ChaseMate < Task::Reproduce);
        assert!(Task::Death > Task::Reproduce);
        assert!(Task::RunFromPredator > Task::Reproduce);
    }

    #[test]
    fn task_set_ops() {
        let s = TaskSet::of(&[Task::Idle, Task::Death]);
        assert!(s.contains(Task::Idle));
        assert!(!s.contains(Task::Attack));
        assert!(!s.without(Task::Death).contains(Task::Death));
        assert!(s.with(Task::Attack).contains(Task::Attack));
        assert_eq!(TaskSet::ALL.iter().count(), Task::COUNT);
        assert_eq!(TaskSet::ALL.difference(s).iter().count(), Task::COUNT - 2);
        assert_eq!(TaskSet::EMPTY.iter().count(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(Task::RunFromPredator.to_string(), "run_from_predator");
    }
}

// ── Vitality ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vitality {
    use crate::{BreathParams, Medium, Thresholds, Vitality};

    fn lungs() -> BreathParams {
        BreathParams {
            aquatic:         false,
            hold_time:       2.0,
            recovery:        4.0,
            damage_rate:     10.0,
            max_tick_damage: 1.0,
        }
    }

    #[test]
    fn damage_and_heal_clamp() {
        let mut v = Vitality::new(100.0, 0.0);
        assert!(v.damage(30.0));
        assert_eq!(v.health(), 70.0);
        v.heal(500.0);
        assert_eq!(v.health(), 100.0);
        assert!(v.damage(1000.0));
        assert_eq!(v.health(), 0.0);
        assert!(v.is_dead());
    }

    #[test]
    fn no_damage_when_dead_or_non_positive() {
        let mut v = Vitality::new(10.0, 0.0);
        assert!(!v.damage(0.0));
        assert!(!v.damage(-5.0));
        assert!(!v.damage(f32::NAN));
        v.damage(10.0);
        assert!(!v.damage(1.0));
    }

    #[test]
    fn heal_revives() {
        let mut v = Vitality::new(10.0, 0.0);
        v.damage(10.0);
        v.heal(1.0);
        assert!(!v.is_dead());
    }

    #[test]
    fn corpse_is_attackable_while_remains_last() {
        let mut v = Vitality::new(10.0, 3.0);
        v.damage(10.0);
        assert!(v.is_attackable());
        assert_eq!(v.consume_remains(2.0), 2.0);
        assert_eq!(v.consume_remains(2.0), 1.0);
        assert_eq!(v.consume_remains(2.0), 0.0);
        assert!(!v.is_attackable());
    }

    #[test]
    fn attack_respects_attackability() {
        let mut target = Vitality::new(10.0, 0.0);
        assert!(Vitality::attack(&mut target, 4.0));
        assert_eq!(target.health(), 6.0);
        target.damage(100.0);
        assert!(!Vitality::attack(&mut target, 4.0));
    }

    #[test]
    fn hunting_hysteresis_has_a_dead_band() {
        let t = Thresholds::default();
        assert!(t.is_consistent());
        let mut v = Vitality::new(100.0, 0.0);
        // Drift downward across begin_hunt, then back up across stop_hunt.
        let mut hunting = false;
        let mut toggles = 0;
        let trajectory: Vec<f32> = (0..50)
            .map(|i| 60.0 - i as f32)
            .chain((10..100).map(|i| i as f32))
            .collect();
        for target in trajectory {
            // Move health to `target` through the public API.
            let h = v.health();
            if target < h { v.damage(h - target); } else { v.heal(target - h); }
            let next = if hunting { !v.stop_hunting(&t) } else { v.begin_hunting(&t) };
            if next != hunting {
                toggles += 1;
                hunting = next;
            }
        }
        assert_eq!(toggles, 2, "one switch on the way down, one on the way up");
    }

    #[test]
    fn boundary_value_does_not_oscillate() {
        let t = Thresholds::default();
        let mut v = Vitality::new(100.0, 0.0);
        v.damage(50.0); // exactly begin_hunt
        assert!(!v.begin_hunting(&t));
        assert!(!v.stop_hunting(&t));
    }

    #[test]
    fn mating_needs_cooldown_and_health() {
        let t = Thresholds::default();
        let mut v = Vitality::new(100.0, 0.0);
        assert!(v.begin_mating(&t));
        v.mate_cooldown = 5.0;
        assert!(!v.begin_mating(&t));
        v.update(5.0, 0.0);
        assert!(v.begin_mating(&t));
        v.damage(50.0);
        assert!(v.stop_mating(&t));
    }

    #[test]
    fn breath_debt_then_rate_limited_damage() {
        let p = lungs();
        let mut v = Vitality::new(100.0, 0.0);
        let mut total = 0.0;
        for _ in 0..8 {
            total += v.process_in_liquid(1.0, 0.25, &p);
        }
        assert_eq!(v.medium, Medium::Liquid);
        assert_eq!(v.breath, -2.0);
        assert_eq!(total, 0.0, "no damage within hold time");

        let dmg = v.process_in_liquid(1.0, 1.0, &p);
        assert_eq!(dmg, 1.0, "capped per tick");
        assert_eq!(v.health(), 99.0);
    }

    #[test]
    fn breath_is_clamped_and_recovers() {
        let p = lungs();
        let mut v = Vitality::new(1000.0, 0.0);
        for _ in 0..100 {
            v.process_in_solid(1.0, 1.0, &p);
        }
        assert!(v.breath >= -2.0 * p.hold_time - 1.0);
        v.process_in_gas(1.0, 10.0, &p);
        assert_eq!(v.breath, 0.0);
        assert!(!v.needs_air(0.5));
    }

    #[test]
    fn aquatic_suffocates_in_gas() {
        let p = BreathParams { aquatic: true, ..lungs() };
        let mut v = Vitality::new(100.0, 0.0);
        v.process_in_gas(1.0, 3.0, &p);
        assert!(v.health() < 100.0);
        assert!(v.needs_air(2.0));
        v.process_in_liquid(1.0, 10.0, &p);
        assert_eq!(v.breath, 0.0);
    }

    #[test]
    fn metabolism_drains_health() {
        let mut v = Vitality::new(100.0, 0.0);
        v.update(10.0, 1.0);
        assert_eq!(v.health(), 90.0);
    }
}

// ── Genetics ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod genetics {
    use crate::{GeneTrait, Genetics};

    #[test]
    fn same_seed_same_genome() {
        assert_eq!(Genetics::new(7, 0.2), Genetics::new(7, 0.2));
        assert_ne!(Genetics::new(7, 0.2), Genetics::new(8, 0.2));
    }

    #[test]
    fn multipliers_within_variance() {
        for seed in 0..50 {
            let g = Genetics::new(seed, 0.1);
            let m = g.multiplier(GeneTrait::SightDistance);
            assert!((0.89..1.11).contains(&m));
        }
    }

    #[test]
    fn nominal_is_identity() {
        let g = Genetics::nominal();
        assert_eq!(g.get(GeneTrait::AttackDamage, 12.5), 12.5);
    }

    #[test]
    fn reseed_rerolls() {
        let mut g = Genetics::new(1, 0.3);
        g.reseed(2);
        assert_eq!(g, Genetics::new(2, 0.3));
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use eco_core::{AgentId, AgentRng};

    use super::helpers::agent;
    use crate::{AgentError, AgentRngs, AgentStore, Task};

    #[test]
    fn spawn_assigns_monotonic_ids() {
        let mut s = AgentStore::new();
        let a = s.spawn(|_| agent(99));
        let b = s.spawn(|_| agent(99));
        assert_eq!((a, b), (AgentId(0), AgentId(1)));
        assert_eq!(s.get(b).unwrap().id, b);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn despawned_ids_are_not_reused() {
        let mut s = AgentStore::new();
        let a = s.spawn(agent_from_id);
        assert!(s.despawn(a).is_some());
        assert!(s.despawn(a).is_none());
        assert!(s.get(a).is_none());
        let b = s.spawn(agent_from_id);
        assert_ne!(a, b);
        assert_eq!(s.len(), 1);
        assert_eq!(s.capacity(), 2);
    }

    fn agent_from_id(id: AgentId) -> crate::Agent {
        agent(id.0)
    }

    #[test]
    fn restore_into_gap_and_reject_collision() {
        let mut s = AgentStore::new();
        s.restore(agent(3)).unwrap();
        assert_eq!(s.len(), 1);
        assert_eq!(s.next_id(), AgentId(4));
        assert!(matches!(s.restore(agent(3)), Err(AgentError::SlotOccupied(_))));
    }

    #[test]
    fn reserved_ids_are_skipped() {
        let mut s = AgentStore::new();
        s.restore(agent(1)).unwrap();
        s.reserve_ids(AgentId(5));
        assert_eq!(s.capacity(), 5);
        assert_eq!(s.len(), 1);
        assert_eq!(s.spawn(agent_from_id), AgentId(5));
        s.reserve_ids(AgentId(2));
        assert_eq!(s.next_id(), AgentId(6));
    }

    #[test]
    fn pair_mut_is_ordered_and_rejects_self() {
        let mut s = AgentStore::new();
        let a = s.spawn(agent_from_id);
        let b = s.spawn(agent_from_id);
        let (x, y) = s.pair_mut(b, a).unwrap();
        assert_eq!((x.id, y.id), (b, a));
        x.task = Task::Attack;
        assert!(s.pair_mut(a, a).is_none());
        s.despawn(a);
        assert!(s.pair_mut(a, b).is_none());
    }

    #[test]
    fn stale_targets_cleared() {
        let mut s = AgentStore::new();
        let a = s.spawn(agent_from_id);
        let b = s.spawn(agent_from_id);
        s.get_mut(a).unwrap().target = Some(b);
        s.get_mut(b).unwrap().target = Some(AgentId(40));
        assert_eq!(s.clear_stale_targets(), 1);
        assert_eq!(s.get(a).unwrap().target, Some(b));
        assert_eq!(s.get(b).unwrap().target, None);
    }

    #[test]
    fn iteration_is_ascending() {
        let mut s = AgentStore::new();
        for _ in 0..5 {
            s.spawn(agent_from_id);
        }
        s.despawn(AgentId(2));
        let ids: Vec<_> = s.ids().map(|i| i.0).collect();
        assert_eq!(ids, vec![0, 1, 3, 4]);
    }

    #[test]
    fn rngs_fill_gaps() {
        let mut r = AgentRngs::new();
        r.install(1, AgentId(3), AgentRng::from_seed(9));
        assert_eq!(r.len(), 4);
        assert!(r.get_mut(AgentId(3)).is_some());
        r.install(1, AgentId(1), AgentRng::from_seed(10));
        assert_eq!(r.len(), 4);
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod agent {
    use glam::Vec3;

    use eco_core::AgentId;

    use super::helpers::agent;
    use crate::{MoveIntent, Task};

    #[test]
    fn new_agent_is_idle_and_healthy() {
        let a = agent(1);
        assert_eq!(a.task, Task::Idle);
        assert_eq!(a.vitality.health(), a.vitality.max_health);
        assert!(!a.path.is_active());
    }

    #[test]
    fn set_task_keeps_target_reset_drops_it() {
        let mut a = agent(1);
        a.target = Some(AgentId(5));
        a.set_task(Task::ChasePrey, 0.0);
        assert_eq!(a.target, Some(AgentId(5)));
        a.reset_task(Task::Idle, 3.0);
        assert_eq!(a.target, None);
        assert_eq!(a.task_timer, 3.0);
    }

    #[test]
    fn intent_toward() {
        let i = MoveIntent::toward(Vec3::ZERO, Vec3::new(0.0, 0.0, 4.0), 2.0);
        assert_eq!(i.velocity, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(MoveIntent::toward(Vec3::ONE, Vec3::ONE, 2.0).face, None);
    }
}
