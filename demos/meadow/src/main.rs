//! meadow — a small voxel meadow with grazers, a wolf pack, fish in a pond,
//! a flock of sparrows and one ridden horse.
//!
//! The sim only decides what each creature wants to do.  This binary plays
//! the host: it moves bodies along their intents, reports what medium each
//! one ends up in, applies grazing edits to the grid, and steers the horse.
//!
//! Set `RUST_LOG=debug` to see spawns, mounts and despawns.

use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use glam::{IVec3, Vec3};
use tracing::info;
use tracing_subscriber::EnvFilter;

use eco_agent::{Agent, AgentStore, Medium, Task};
use eco_behavior::{Capabilities, Effect, SpeciesTable, load_relations_reader, load_species_reader};
use eco_core::{AgentId, SimConfig, Tick, voxel_of};
use eco_output::{CsvWriter, OutputWriter, SimOutputObserver};
use eco_sim::{Sim, SimBuilder, SimObserver, TickStats};
use eco_spatial::{GridPathfinder, Material, VoxelGrid, VoxelQuery};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const TICK_SECS:             f32 = 0.25;
const SIM_SECS:              f32 = 300.0;
const OUTPUT_INTERVAL_TICKS: u64 = 20; // one snapshot every 5 simulated seconds
const GENETIC_VARIANCE:      f32 = 0.15;

const DEER:     usize = 10;
const WOLVES:   usize = 3;
const TROUT:    usize = 8;
const SPARROWS: usize = 12;

/// Host entity id of the horse's rider.
const RIDER: u64 = 7;
/// The rider gets off after this many ticks.
const RIDE_TICKS: u64 = 200;

// ── Species tables ────────────────────────────────────────────────────────────

const SPECIES_CSV: &str = "\
name,preset,diet,capabilities,max_health,walk_speed,run_speed,sight_distance,attack_distance,attack_damage,average_idle_time,metabolism,hold_breath,pregnancy_length,litter_size\n\
deer,herbivore,,flocking,120,2.5,6,12,,,4,,,40,1\n\
wolf,carnivore,,flocking,,,7,16,2,25,,0.4,,60,2\n\
trout,fish,,,,,,,,,,,,30,3\n\
sparrow,bird,,,,,,,,,2,,,,\n\
horse,mount,,,,,,,,,,,,,\n\
";

const RELATIONS_CSV: &str = "\
subject,relation,object\n\
wolf,prey,deer\n\
wolf,prey,horse\n\
";

// ── World ─────────────────────────────────────────────────────────────────────

/// A 64×20×64 arena: soil below `y = 0`, a pond in the middle, and a few
/// patches of foliage set into the ground surface.
fn build_meadow() -> Result<VoxelGrid> {
    let mut grid = VoxelGrid::new(
        IVec3::new(-32, -6, -32),
        IVec3::new(64, 20, 64),
        Material::Gas,
        Material::Solid,
    )?;
    grid.fill_box(IVec3::new(-32, -6, -32), IVec3::new(31, -1, 31), Material::Solid);
    grid.fill_box(IVec3::new(-6, -4, -6), IVec3::new(6, -1, 6), Material::Liquid);
    for (a, b) in [
        (IVec3::new(-24, -1, -24), IVec3::new(-14, -1, -14)),
        (IVec3::new(14, -1, -20), IVec3::new(22, -1, -10)),
        (IVec3::new(-20, -1, 12), IVec3::new(-10, -1, 24)),
    ] {
        grid.fill_box(a, b, Material::Foliage);
    }
    Ok(grid)
}

fn foliage_count(grid: &VoxelGrid) -> usize {
    let (min, max) = (grid.min(), grid.max());
    let mut n = 0;
    for x in min.x..max.x {
        for z in min.z..max.z {
            if grid.material(IVec3::new(x, -1, z)) == Material::Foliage {
                n += 1;
            }
        }
    }
    n
}

// ── Host locomotion ───────────────────────────────────────────────────────────

fn medium_of(material: Material) -> Medium {
    match material {
        Material::Gas => Medium::Gas,
        Material::Liquid => Medium::Liquid,
        Material::Solid | Material::Foliage => Medium::Solid,
    }
}

/// Move one body along its intent for `dt` seconds.  A move into a voxel
/// the body can't stand in is retried one voxel up (stepping onto a ledge)
/// and one voxel down (stepping off one); failing both, the body stays put.
fn integrate(agent: &Agent, species: &SpeciesTable, world: &VoxelGrid, dt: f32) -> (Vec3, Vec3) {
    let pos = agent.position();
    let Some(cfg) = species.get(agent.species) else {
        return (pos, Vec3::ZERO);
    };
    if agent.is_dead() {
        return (pos, Vec3::ZERO);
    }
    let velocity = agent.intent.velocity;
    let wanted = pos + velocity * dt;
    for dy in [0.0, 1.0, -1.0] {
        let candidate = wanted + Vec3::Y * dy;
        if cfg.profile.is_valid(world, voxel_of(candidate)) {
            return (candidate, (candidate - pos) / dt);
        }
    }
    (pos, Vec3::ZERO)
}

/// Move every creature, then tell each what it is breathing.
fn host_motion(sim: &mut Sim<VoxelGrid, GridPathfinder>) -> Result<f32> {
    let dt = sim.config.tick_secs;
    let moves: Vec<(AgentId, Vec3, Vec3)> = sim
        .agents
        .iter()
        .map(|a| {
            let (p, v) = integrate(a, &sim.species, &sim.world, dt);
            (a.id, p, v)
        })
        .collect();

    let mut suffocation = 0.0;
    for (id, position, velocity) in moves {
        sim.set_motion(id, position, velocity)?;
        let material = sim.world.material(voxel_of(position));
        suffocation += sim.report_environment(id, medium_of(material), 1.0)?;
    }
    Ok(suffocation)
}

// ── Observer wrapper to count events ──────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    summary_rows:  usize,
    kills:         usize,
    births:        usize,
    meals:         usize,
    despawned:     usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, summary_rows: 0, kills: 0, births: 0, meals: 0, despawned: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        self.summary_rows += 1;
        self.inner.on_tick_end(tick, stats);
    }

    fn on_task_change(&mut self, tick: Tick, agent: AgentId, from: Task, to: Task) {
        if to == Task::Death {
            self.kills += 1;
        }
        self.inner.on_task_change(tick, agent, from, to);
    }

    fn on_effect(&mut self, tick: Tick, effect: &Effect, applied: bool) {
        if applied {
            match effect {
                Effect::Spawn { .. } => self.births += 1,
                Effect::Collect { .. } | Effect::Graze { .. } => self.meals += 1,
                _ => {}
            }
        }
        self.inner.on_effect(tick, effect, applied);
    }

    fn on_despawn(&mut self, tick: Tick, agent: &Agent) {
        self.despawned += 1;
        self.inner.on_despawn(tick, agent);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore) {
        self.snapshot_rows += agents.len();
        self.inner.on_snapshot(tick, agents);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== meadow — eco creature behaviour ===");
    println!("Seed: {SEED}  |  Simulated: {SIM_SECS} s at {TICK_SECS} s/tick");
    println!();

    // 1. Species and relations.
    let mut species = SpeciesTable::new();
    let added = load_species_reader(Cursor::new(SPECIES_CSV), &mut species)?;
    let relations = load_relations_reader(Cursor::new(RELATIONS_CSV), &mut species)?;
    println!("Loaded {added} species, {relations} relations");
    let id = |name: &str| species.id_of(name).ok_or_else(|| anyhow::anyhow!("species {name} missing"));
    let (deer, wolf, trout, sparrow, horse) = (id("deer")?, id("wolf")?, id("trout")?, id("sparrow")?, id("horse")?);

    // 2. World.
    let world = build_meadow()?;
    let foliage_before = foliage_count(&world);
    println!("World: {} → {}, {foliage_before} foliage voxels", world.min(), world.max());

    // 3. Sim config.
    let config = SimConfig {
        seed:                  SEED,
        tick_secs:             TICK_SECS,
        total_ticks:           (SIM_SECS / TICK_SECS) as u64,
        num_threads:           None,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
        genetic_variance:      GENETIC_VARIANCE,
    };
    println!(
        "Sim: {} ticks, output every {} ticks",
        config.total_ticks, OUTPUT_INTERVAL_TICKS
    );
    println!();

    // 4. Build sim and populate it.
    let mut sim = SimBuilder::new(config.clone(), species, world, GridPathfinder::default()).build()?;
    for i in 0..DEER {
        let (x, z) = ((i % 5) as f32 * 3.0 - 22.0, (i / 5) as f32 * 3.0 + 14.0);
        sim.spawn(deer, Vec3::new(x + 0.5, 0.0, z + 0.5))?;
    }
    for i in 0..WOLVES {
        sim.spawn(wolf, Vec3::new(20.5 + i as f32 * 2.0, 0.0, 20.5))?;
    }
    for i in 0..TROUT {
        let (x, z) = ((i % 4) as f32 * 2.0 - 4.0, (i / 4) as f32 * 2.0 - 2.0);
        sim.spawn(trout, Vec3::new(x + 0.5, -2.5, z + 0.5))?;
    }
    for i in 0..SPARROWS {
        sim.spawn(sparrow, Vec3::new(i as f32 - 6.0, 6.5, -20.5))?;
    }
    let mount = sim.spawn(horse, Vec3::new(0.5, 0.0, -12.5))?;
    sim.mount(mount, RIDER)?;
    sim.steer(mount, Vec3::X, false)?;
    println!("Spawned {} creatures; rider {RIDER} is on the horse", sim.agents.len());

    // 5. Set up output.
    std::fs::create_dir_all("output/meadow")?;
    let writer = CsvWriter::new(Path::new("output/meadow"))?;
    let inner_obs = SimOutputObserver::new(writer, &config);
    let mut obs = CountingObserver::new(inner_obs);

    // 6. Run, interleaving host locomotion with behaviour ticks.
    let t0 = Instant::now();
    let mut totals = TickStats::default();
    let mut suffocation = 0.0;
    let mut edits = 0;
    while sim.clock.current_tick < sim.config.end_tick() {
        let now = sim.clock.current_tick;
        if now.0 == RIDE_TICKS / 2 {
            sim.steer(mount, Vec3::new(-1.0, 0.0, 1.0).normalize(), true)?;
        }
        if now.0 == RIDE_TICKS && sim.agents.contains(mount) {
            if let Some(rider) = sim.dismount(mount)? {
                info!(rider, tick = %now, "rider dismounted");
            }
        }

        let stats = sim.step(&mut obs);
        totals.ticked += stats.ticked;
        totals.effects += stats.effects;
        totals.applied += stats.applied;
        totals.spawned += stats.spawned;
        totals.despawned += stats.despawned;
        totals.transitions += stats.transitions;

        suffocation += host_motion(&mut sim)?;
        edits += sim.apply_world_edits();
    }
    obs.on_sim_end(sim.clock.current_tick);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 7. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  agent_snapshots.csv : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv  : {} rows", obs.summary_rows);
    println!();
    println!(
        "Effects: {} produced, {} applied, {} rejected",
        totals.effects,
        totals.applied,
        totals.rejected()
    );
    println!(
        "Deaths: {}  Births: {}  Meals: {}  Despawned: {}",
        obs.kills, obs.births, obs.meals, obs.despawned
    );
    println!(
        "Foliage grazed: {edits} ({} → {} voxels)  |  Suffocation damage: {suffocation:.1}",
        foliage_before,
        foliage_count(&sim.world)
    );
    println!();

    // 8. Save the final state.
    let save_path = Path::new("output/meadow/state.json");
    let mut file = BufWriter::new(File::create(save_path)?);
    sim.save_json(&mut file)?;
    file.flush()?;
    println!("Saved {} agents to {}", sim.agents.len(), save_path.display());
    println!();

    // 9. Final population table.
    println!("{:<10} {:>6} {:>6} {:>10}", "Species", "Alive", "Dead", "Avg health");
    println!("{}", "-".repeat(36));
    for (sid, cfg) in sim.species.iter() {
        let members: Vec<&Agent> = sim.agents.iter().filter(|a| a.species == sid).collect();
        let alive: Vec<&&Agent> = members.iter().filter(|a| !a.is_dead()).collect();
        let avg = if alive.is_empty() {
            0.0
        } else {
            alive.iter().map(|a| a.vitality.fraction()).sum::<f32>() / alive.len() as f32
        };
        println!(
            "{:<10} {:>6} {:>6} {:>9.0}%",
            cfg.name,
            alive.len(),
            members.len() - alive.len(),
            avg * 100.0
        );
    }
    println!();

    // 10. What everyone is doing at the end.
    let mut tasks: Vec<(&'static str, usize)> = Vec::new();
    for agent in sim.agents.iter() {
        match tasks.iter_mut().find(|(name, _)| *name == agent.task.name()) {
            Some((_, n)) => *n += 1,
            None => tasks.push((agent.task.name(), 1)),
        }
    }
    tasks.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    println!("{:<18} {:>6}", "Task", "Agents");
    println!("{}", "-".repeat(25));
    for (name, n) in tasks {
        println!("{name:<18} {n:>6}");
    }

    let flyers = sim
        .agents
        .iter()
        .filter(|a| sim.species.get(a.species).is_some_and(|c| c.has(Capabilities::FLYING)))
        .count();
    info!(flyers, agents = sim.agents.len(), "done");
    Ok(())
}
