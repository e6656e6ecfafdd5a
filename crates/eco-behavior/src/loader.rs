//! CSV species loader.
//!
//! # Species CSV
//!
//! One row per species.  `preset` picks the defaults every other column
//! overrides; empty cells keep the preset value.
//!
//! ```csv
//! name,preset,diet,capabilities,max_health,walk_speed,run_speed,sight_distance,attack_damage,average_idle_time,litter_size
//! deer,herbivore,,,120,2.5,6,12,,4,
//! wolf,carnivore,,flocking,,,7,16,25,,2
//! trout,fish,,,,,,,,,
//! ```
//!
//! **`preset`**: `herbivore`, `carnivore`, `fish`, `bird`, or `mount`.
//!
//! # Relations CSV
//!
//! ```csv
//! subject,relation,object
//! wolf,prey,deer
//! ```
//!
//! reads "to a wolf, a deer is prey".  The inverse (deer sees wolf as
//! predator) is implied.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::config::{Capabilities, Diet, Relation, SpeciesConfig, SpeciesTable};
use crate::{BehaviorError, BehaviorResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SpeciesRecord {
    name:              String,
    preset:            String,
    diet:              Option<String>,
    capabilities:      Option<String>,
    max_health:        Option<f32>,
    walk_speed:        Option<f32>,
    run_speed:         Option<f32>,
    sight_distance:    Option<f32>,
    attack_distance:   Option<f32>,
    attack_damage:     Option<f32>,
    average_idle_time: Option<f32>,
    metabolism:        Option<f32>,
    hold_breath:       Option<f32>,
    pregnancy_length:  Option<f32>,
    litter_size:       Option<u8>,
}

#[derive(Deserialize)]
struct RelationRecord {
    subject:  String,
    relation: String,
    object:   String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load species from a CSV file into a fresh table.
pub fn load_species_csv(path: &Path) -> BehaviorResult<SpeciesTable> {
    let file = std::fs::File::open(path)?;
    let mut table = SpeciesTable::new();
    load_species_reader(file, &mut table)?;
    Ok(table)
}

/// Like [`load_species_csv`] but reads from any source and appends to an
/// existing table.  Returns the number of species added.
pub fn load_species_reader<R: Read>(reader: R, table: &mut SpeciesTable) -> BehaviorResult<usize> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut added = 0;
    for result in csv_reader.deserialize::<SpeciesRecord>() {
        let row = result.map_err(|e| BehaviorError::Parse(e.to_string()))?;
        table.add(build_species(row)?)?;
        added += 1;
    }
    Ok(added)
}

/// Read a relations CSV into `table`.  Species must already be registered.
pub fn load_relations_reader<R: Read>(reader: R, table: &mut SpeciesTable) -> BehaviorResult<usize> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut added = 0;
    for result in csv_reader.deserialize::<RelationRecord>() {
        let row = result.map_err(|e| BehaviorError::Parse(e.to_string()))?;
        let subject = lookup(table, &row.subject)?;
        let object = lookup(table, &row.object)?;
        table.set_relation(subject, object, Relation::parse(&row.relation)?);
        added += 1;
    }
    Ok(added)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn lookup(table: &SpeciesTable, name: &str) -> BehaviorResult<eco_core::SpeciesId> {
    table
        .id_of(name.trim())
        .ok_or_else(|| BehaviorError::UnknownSpecies(name.trim().to_string()))
}

fn build_species(r: SpeciesRecord) -> BehaviorResult<SpeciesConfig> {
    let name = r.name.trim().to_string();
    let mut c = match r.preset.trim().to_ascii_lowercase().as_str() {
        "herbivore" => SpeciesConfig::herbivore(name),
        "carnivore" => SpeciesConfig::carnivore(name),
        "fish"      => SpeciesConfig::fish(name),
        "bird"      => SpeciesConfig::bird(name),
        "mount"     => SpeciesConfig::mount(name),
        other => return Err(BehaviorError::Parse(format!("unknown preset {other:?}"))),
    };

    if let Some(d) = r.diet.as_deref().filter(|s| !s.trim().is_empty()) {
        c.diet = Diet::parse(d)?;
    }
    if let Some(caps) = r.capabilities.as_deref().filter(|s| !s.trim().is_empty()) {
        c.capabilities = Capabilities::parse(caps)?;
    }

    let set = |slot: &mut f32, v: Option<f32>| {
        if let Some(v) = v {
            *slot = v;
        }
    };
    set(&mut c.max_health, r.max_health);
    set(&mut c.walk_speed, r.walk_speed);
    set(&mut c.run_speed, r.run_speed);
    set(&mut c.sight_distance, r.sight_distance);
    set(&mut c.attack_distance, r.attack_distance);
    set(&mut c.attack_damage, r.attack_damage);
    set(&mut c.average_idle_time, r.average_idle_time);
    set(&mut c.metabolism, r.metabolism);
    set(&mut c.hold_breath, r.hold_breath);
    set(&mut c.pregnancy_length, r.pregnancy_length);
    if let Some(n) = r.litter_size {
        c.litter_size = n;
    }
    Ok(c)
}
