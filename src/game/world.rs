//! External Capabilities
//!
//! Narrow interfaces to everything the combat core does not own: terrain,
//! the actor roster, persistent stats, localization and the effect/damage
//! output. Also ships small in-memory implementations used by the demo
//! driver and the test suite.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use crate::core::geom::{Bounds, Position};
use crate::core::rng::DeterministicRng;
use crate::game::damage::{DamageCause, DamageTick};
use crate::game::roster::ActorId;

// =============================================================================
// TERRAIN
// =============================================================================

/// Block material as far as hazard targeting cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    Stone,
    Dirt,
    Grass,
    Sand,
    Wood,
    Glass,
    Water,
    Lava,
    /// Unbreakable map floor
    Bedrock,
    /// Invisible map wall
    Barrier,
}

impl Material {
    /// Flows rather than holds weight.
    pub fn is_liquid(self) -> bool {
        matches!(self, Material::Water | Material::Lava)
    }

    /// Part of the map shell that hazards must never land on.
    pub fn is_indestructible_floor(self) -> bool {
        matches!(self, Material::Bedrock | Material::Barrier)
    }

    /// Lowercase name used as a death-message key.
    pub fn key(self) -> &'static str {
        match self {
            Material::Stone => "stone",
            Material::Dirt => "dirt",
            Material::Grass => "grass",
            Material::Sand => "sand",
            Material::Wood => "wood",
            Material::Glass => "glass",
            Material::Water => "water",
            Material::Lava => "lava",
            Material::Bedrock => "bedrock",
            Material::Barrier => "barrier",
        }
    }
}

/// Topmost non-empty block of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Height of the block
    pub y: i32,
    /// What the block is made of
    pub material: Material,
    /// Liquid surface
    pub is_liquid: bool,
}

impl Column {
    /// Column topped with `material` at height `y`.
    pub fn new(y: i32, material: Material) -> Self {
        Self { y, material, is_liquid: material.is_liquid() }
    }
}

/// Read-only terrain queries.
pub trait WorldQuery {
    /// Topmost non-empty block at `(x, z)`, or `None` for an empty column.
    fn highest_solid_column(&self, x: i32, z: i32) -> Option<Column>;

    /// Full map limits as generated, including the vertical build range.
    fn bounds(&self) -> Bounds;
}

// =============================================================================
// ROSTER
// =============================================================================

/// Read-only view of one actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Actor identity
    pub id: ActorId,
    /// Display name
    pub name: String,
    /// Current position
    pub position: Position,
    /// Team in team matches
    pub team: Option<String>,
}

/// Who is alive and where.
pub trait ActorRoster {
    /// Living, participating actors whose column lies within `bounds`.
    fn living_actors_in_bounds(&self, bounds: &Bounds) -> Vec<ActorSnapshot>;

    /// Living, non-spectating actors that should hear match cues.
    fn audience(&self) -> Vec<ActorId>;

    /// Look up one actor.
    fn actor(&self, id: &ActorId) -> Option<ActorSnapshot>;
}

// =============================================================================
// STATS
// =============================================================================

/// Persistent per-actor counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatKey {
    /// Kills credited
    Kills,
    /// Assists credited
    Assists,
    /// Times eliminated
    Deaths,
    /// Effective damage dealt to others
    DamageDealt,
    /// Effective damage received
    DamageTaken,
}

/// Stat lookups.
pub trait Stats {
    /// Current value of a counter, zero if never recorded.
    fn get_stat(&self, actor: ActorId, key: StatKey) -> f64;
}

/// In-memory stat store.
#[derive(Clone, Debug, Default)]
pub struct StatsBook {
    values: BTreeMap<(ActorId, StatKey), f64>,
}

impl StatsBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to a counter.
    pub fn add(&mut self, actor: ActorId, key: StatKey, amount: f64) {
        *self.values.entry((actor, key)).or_insert(0.0) += amount;
    }

    /// Add one to a counter.
    pub fn increment(&mut self, actor: ActorId, key: StatKey) {
        self.add(actor, key, 1.0);
    }
}

impl Stats for StatsBook {
    fn get_stat(&self, actor: ActorId, key: StatKey) -> f64 {
        self.values.get(&(actor, key)).copied().unwrap_or(0.0)
    }
}

// =============================================================================
// LOCALIZATION
// =============================================================================

/// Per-actor text lookup.
pub trait Localization {
    /// Render `key` for `actor`, substituting `{name}` placeholders.
    fn translate(&self, actor: ActorId, key: &str, placeholders: &[(&str, String)]) -> String;
}

/// Replace every `{name}` in `template` with its value.
///
/// Unknown placeholders are left in place so gaps are visible in game.
pub fn fill_template(template: &str, placeholders: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in placeholders {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Single-language catalog. Unknown keys render as the key itself.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageCatalog {
    entries: BTreeMap<String, String>,
}

impl MessageCatalog {
    /// Catalog with the built-in English strings.
    pub fn english() -> Self {
        let entries = [
            ("scoreboard.next_event", "{event}: {time}"),
            ("scoreboard.no_event", "No upcoming events"),
            ("scoreboard.teammate", "Team:"),
            ("scoreboard.alive", "Alive: {count}"),
            ("scoreboard.kills", "Kills: {count}"),
            ("scoreboard.assists", "Assists: {count}"),
            ("scoreboard.waiting", "Waiting for players..."),
            ("scoreboard.players", "Players: {count}/{needed}"),
            ("scoreboard.starting", "Starting in {time}"),
            ("event.hazard.lightning", "Lightning Storm"),
            ("event.hazard.meteor", "Meteor Shower"),
            ("event.hazard.earthquake", "Earthquake"),
            ("event.hazard.acid_rain", "Acid Rain"),
            ("event.border_shrink", "Border Shrink"),
            ("event.match_end", "Match End"),
            ("announce.winner", "{winner} wins the match!"),
            ("announce.draw", "Nobody survived."),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Add or replace a string.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.entries.insert(key.into(), template.into());
    }
}

impl Localization for MessageCatalog {
    fn translate(&self, _actor: ActorId, key: &str, placeholders: &[(&str, String)]) -> String {
        match self.entries.get(key) {
            Some(template) => fill_template(template, placeholders),
            None => key.to_string(),
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Visual shape of a particle burst.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParticleShape {
    /// Vertical column, e.g. a lightning bolt
    Bolt { height: f64 },
    /// Filled sphere, e.g. an explosion
    Sphere { radius: f64 },
    /// Flat ring along the ground
    Ring { radius: f64 },
    /// Drifting cloud
    Cloud { radius: f64 },
}

/// Side effects produced by the core.
pub trait EffectSink {
    /// Damage resolved against an actor.
    fn apply_damage(&mut self, actor: ActorId, tick: &DamageTick);

    /// Play a sound to one actor.
    fn emit_sound(&mut self, actor: ActorId, sound: &str, volume: f32, pitch: f32);

    /// Spawn particles at a location.
    fn emit_particles(&mut self, location: Position, shape: ParticleShape);

    /// Chat line for everyone.
    fn broadcast(&mut self, _text: &str) {}
}

/// One recorded side effect.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Damage { actor: ActorId, amount: f64, cause: DamageCause },
    Sound { actor: ActorId, sound: String, volume: f32, pitch: f32 },
    Particles { location: Position, shape: ParticleShape },
    Broadcast(String),
}

/// Effect sink that keeps everything in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingEffects {
    /// Effects in emission order
    pub records: Vec<Effect>,
}

impl RecordingEffects {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sounds emitted so far.
    pub fn sounds(&self) -> impl Iterator<Item = (&ActorId, &str)> {
        self.records.iter().filter_map(|e| match e {
            Effect::Sound { actor, sound, .. } => Some((actor, sound.as_str())),
            _ => None,
        })
    }

    /// Chat lines broadcast so far.
    pub fn broadcasts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(|e| match e {
            Effect::Broadcast(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Drop everything recorded.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl EffectSink for RecordingEffects {
    fn apply_damage(&mut self, actor: ActorId, tick: &DamageTick) {
        self.records.push(Effect::Damage {
            actor,
            amount: tick.effective_damage(),
            cause: tick.cause,
        });
    }

    fn emit_sound(&mut self, actor: ActorId, sound: &str, volume: f32, pitch: f32) {
        self.records.push(Effect::Sound {
            actor,
            sound: sound.to_string(),
            volume,
            pitch,
        });
    }

    fn emit_particles(&mut self, location: Position, shape: ParticleShape) {
        self.records.push(Effect::Particles { location, shape });
    }

    fn broadcast(&mut self, text: &str) {
        self.records.push(Effect::Broadcast(text.to_string()));
    }
}

// =============================================================================
// HEIGHTMAP WORLD
// =============================================================================

/// Terrain stored as one top block per column.
#[derive(Clone, Debug)]
pub struct HeightmapWorld {
    bounds: Bounds,
    columns: BTreeMap<(i32, i32), Column>,
}

impl HeightmapWorld {
    /// Every column topped with `material` at height `y`.
    pub fn flat(bounds: Bounds, y: i32, material: Material) -> Self {
        let mut columns = BTreeMap::new();
        for x in bounds.min_x..=bounds.max_x {
            for z in bounds.min_z..=bounds.max_z {
                columns.insert((x, z), Column::new(y, material));
            }
        }
        Self { bounds, columns }
    }

    /// Rolling grassland with scattered ponds and a few holes to the void.
    pub fn generate(bounds: Bounds, seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let base = bounds.min_y + (bounds.max_y - bounds.min_y) / 2;
        let mut world = Self::flat(bounds, base, Material::Grass);

        for x in bounds.min_x..=bounds.max_x {
            for z in bounds.min_z..=bounds.max_z {
                let roll = rng.next_int(100);
                let column = match roll {
                    0..=5 => Some(Column::new(base - 1, Material::Water)),
                    6..=7 => None,
                    8..=20 => Some(Column::new(base + 1, Material::Dirt)),
                    21..=25 => Some(Column::new(base + 2, Material::Stone)),
                    _ => Some(Column::new(base, Material::Grass)),
                };
                world.set_column(x, z, column);
            }
        }
        world
    }

    /// Overwrite one column. `None` makes it an empty shaft.
    pub fn set_column(&mut self, x: i32, z: i32, column: Option<Column>) {
        match column {
            Some(column) => {
                self.columns.insert((x, z), column);
            }
            None => {
                self.columns.remove(&(x, z));
            }
        }
    }
}

impl WorldQuery for HeightmapWorld {
    fn highest_solid_column(&self, x: i32, z: i32) -> Option<Column> {
        self.columns.get(&(x, z)).copied()
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }
}
