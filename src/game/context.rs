//! Match Context
//!
//! Everything one match owns, passed explicitly to phases, hazards and the
//! controller. There is no global match instance.

use tracing::info;

use crate::config::{ConfigError, GameConfig};
use crate::core::geom::Bounds;
use crate::core::rng::{derive_hazard_seed, DeterministicRng};
use crate::core::time::GameInstant;
use crate::game::attribution::DeathMessageResolver;
use crate::game::events::GameEvent;
use crate::game::hazard::{HazardKind, HazardSet};
use crate::game::ledger::DamageLedger;
use crate::game::roster::{ActorId, MatchMode, Roster};
use crate::game::schedule::MatchSchedule;
use crate::game::world::{EffectSink, Localization, MessageCatalog, StatsBook};

/// Shared state of one match.
#[derive(Debug)]
pub struct MatchContext {
    /// Validated configuration
    pub config: GameConfig,

    /// Seed every other seed derives from
    pub match_seed: u64,

    /// Match-level RNG (death message verbs)
    pub rng: DeterministicRng,

    /// All actors (BTreeMap inside for deterministic iteration)
    pub roster: Roster,

    /// Current playable area
    pub bounds: Bounds,

    /// Playable area at match start
    pub initial_bounds: Bounds,

    /// Damage history of every victim
    pub ledger: DamageLedger,

    /// Running hazards
    pub hazards: HazardSet,

    /// Per-actor counters
    pub stats: StatsBook,

    /// Timed in-game events
    pub schedule: MatchSchedule,

    /// Player-facing strings
    pub catalog: MessageCatalog,

    /// Death message templates
    pub resolver: DeathMessageResolver,

    /// Victims in elimination order
    pub eliminated: Vec<ActorId>,

    /// Events generated this tick (drained by the controller)
    pub pending_events: Vec<GameEvent>,

    hazard_activations: u32,
}

impl MatchContext {
    /// Create a match context, validating `config`.
    pub fn new(config: GameConfig, initial_bounds: Bounds, match_seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let ledger = DamageLedger::new(config.combat.clone())?;
        let resolver = DeathMessageResolver::new(config.death_messages.clone(), config.combat.melee_range);

        Ok(Self {
            config,
            match_seed,
            rng: DeterministicRng::new(match_seed),
            roster: Roster::new(),
            bounds: initial_bounds,
            initial_bounds,
            ledger,
            hazards: HazardSet::new(),
            stats: StatsBook::new(),
            schedule: MatchSchedule::new(),
            catalog: MessageCatalog::english(),
            resolver,
            eliminated: Vec::new(),
            pending_events: Vec::new(),
            hazard_activations: 0,
        })
    }

    /// Solo or team play.
    pub fn mode(&self) -> MatchMode {
        self.config.rules.mode
    }

    /// Narrow the playable area symmetrically, never below zero width.
    pub fn shrink_bounds(&mut self, by: i32) -> Bounds {
        self.bounds = self.bounds.shrunk(by);
        info!(
            min_x = self.bounds.min_x,
            max_x = self.bounds.max_x,
            min_z = self.bounds.min_z,
            max_z = self.bounds.max_z,
            "Border shrunk"
        );
        self.bounds
    }

    /// Start a hazard with its configured timing and a derived seed.
    ///
    /// Broadcasts its flavour text. Returns false if it was already running.
    pub fn activate_hazard(&mut self, kind: HazardKind, now: GameInstant, effects: &mut dyn EffectSink) -> bool {
        let seed = derive_hazard_seed(self.match_seed, kind.name(), self.hazard_activations);
        let timing = self.config.hazards.timing_for(kind);
        if !self.hazards.activate(kind, timing, now, seed) {
            return false;
        }
        self.hazard_activations += 1;
        for line in kind.flavor_text() {
            effects.broadcast(line);
        }
        self.push_event(GameEvent::hazard_activated(now, kind));
        true
    }

    /// Queue an event for this tick.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Drain queued events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Translate a key for `actor`.
    pub fn translate(&self, actor: ActorId, key: &str, placeholders: &[(&str, String)]) -> String {
        self.catalog.translate(actor, key, placeholders)
    }
}
