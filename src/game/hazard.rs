//! Hazard Engine
//!
//! Self-accelerating environmental threats. Each active hazard runs two
//! independent cadences on every tick:
//!
//! - **Strikes**: the interval shrinks by a fixed decrement per tick down to
//!   a floor; when it elapses the hazard aims (see [`crate::game::targeting`])
//!   and damages everyone near the impact.
//! - **Ambient cues**: one of three sounds every 5-13 seconds, played to every
//!   living participant.
//!
//! Hazard behaviour is data on [`HazardKind`] rather than per-type code.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn};

use crate::config::HazardTiming;
use crate::core::geom::{BlockPos, Bounds, Position};
use crate::core::rng::DeterministicRng;
use crate::core::time::GameInstant;
use crate::game::damage::{CombatError, DamageCause, DamageSource, DamageTick};
use crate::game::ledger::DamageLedger;
use crate::game::roster::ActorId;
use crate::game::targeting::{Target, TargetTier, Targeting};
use crate::game::world::{ActorRoster, EffectSink, ParticleShape, WorldQuery};

/// Spell damage multiplier contributed by each amplifying hazard.
pub const SPELL_AMPLIFIER: f64 = 1.25;

/// Share of strike damage left at the edge of the radius.
pub const EDGE_FALLOFF: f64 = 0.5;

/// Knockback multiplier on earthquake hits.
pub const QUAKE_KNOCKBACK: f64 = 1.5;

const MIN_CUE_DELAY_MS: i32 = 5_000;
const MAX_CUE_DELAY_MS: i32 = 13_000;

// =============================================================================
// HAZARD KIND
// =============================================================================

/// A sound played to one or more actors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundCue {
    /// Sound identifier
    pub sound: &'static str,
    /// Volume
    pub volume: f32,
    /// Pitch
    pub pitch: f32,
}

/// Available hazards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    /// Bolts from above, small radius
    Lightning,
    /// Heavy impacts, large radius
    Meteor,
    /// Wide tremors that throw actors around
    Earthquake,
    /// Frequent weak drizzle
    AcidRain,
}

impl HazardKind {
    /// Every kind, in declaration order.
    pub const ALL: [HazardKind; 4] = [
        HazardKind::Lightning,
        HazardKind::Meteor,
        HazardKind::Earthquake,
        HazardKind::AcidRain,
    ];

    /// Stable identifier, also used for seeds and config keys.
    pub fn name(self) -> &'static str {
        match self {
            HazardKind::Lightning => "Lightning",
            HazardKind::Meteor => "Meteor",
            HazardKind::Earthquake => "Earthquake",
            HazardKind::AcidRain => "AcidRain",
        }
    }

    /// Name shown to players.
    pub fn display_name(self) -> &'static str {
        match self {
            HazardKind::Lightning => "Lightning Storm",
            HazardKind::Meteor => "Meteor Shower",
            HazardKind::Earthquake => "Earthquake",
            HazardKind::AcidRain => "Acid Rain",
        }
    }

    /// Localization key for schedule and scoreboard lines.
    pub fn event_key(self) -> &'static str {
        match self {
            HazardKind::Lightning => "event.hazard.lightning",
            HazardKind::Meteor => "event.hazard.meteor",
            HazardKind::Earthquake => "event.hazard.earthquake",
            HazardKind::AcidRain => "event.hazard.acid_rain",
        }
    }

    /// Spell tags this hazard amplifies.
    pub fn spell_tags(self) -> &'static [&'static str] {
        match self {
            HazardKind::Lightning => &["lightning", "storm"],
            HazardKind::Meteor => &["fire"],
            HazardKind::Earthquake => &["earth"],
            HazardKind::AcidRain => &["poison", "storm"],
        }
    }

    /// Lines broadcast when the hazard activates.
    pub fn flavor_text(self) -> &'static [&'static str] {
        match self {
            HazardKind::Lightning => &[
                "The sky darkens and the air begins to crackle.",
                "Stay away from high ground!",
            ],
            HazardKind::Meteor => &[
                "Streaks of fire cross the sky.",
                "Something big is coming down.",
            ],
            HazardKind::Earthquake => &[
                "The ground starts to rumble.",
                "Find something to hold on to!",
            ],
            HazardKind::AcidRain => &[
                "A green haze rolls in.",
                "The rain burns.",
            ],
        }
    }

    /// The three ambient cues, chosen uniformly.
    pub fn ambient_cues(self) -> [SoundCue; 3] {
        let cue = |sound, volume, pitch| SoundCue { sound, volume, pitch };
        match self {
            HazardKind::Lightning => [
                cue("ambient.thunder.distant", 0.6, 0.8),
                cue("ambient.thunder.rumble", 0.8, 0.6),
                cue("ambient.wind.gust", 0.5, 1.0),
            ],
            HazardKind::Meteor => [
                cue("ambient.meteor.whistle", 0.7, 1.2),
                cue("ambient.meteor.roar", 0.9, 0.5),
                cue("ambient.fire.crackle", 0.5, 1.0),
            ],
            HazardKind::Earthquake => [
                cue("ambient.ground.rumble", 1.0, 0.5),
                cue("ambient.stone.crack", 0.7, 0.8),
                cue("ambient.ground.groan", 0.8, 0.4),
            ],
            HazardKind::AcidRain => [
                cue("ambient.rain.heavy", 0.6, 1.0),
                cue("ambient.acid.hiss", 0.5, 1.3),
                cue("ambient.rain.drip", 0.4, 1.1),
            ],
        }
    }

    /// Sound played to everyone on impact.
    pub fn strike_sound(self) -> SoundCue {
        match self {
            HazardKind::Lightning => SoundCue { sound: "strike.lightning", volume: 1.0, pitch: 1.0 },
            HazardKind::Meteor => SoundCue { sound: "strike.explosion", volume: 1.0, pitch: 0.7 },
            HazardKind::Earthquake => SoundCue { sound: "strike.quake", volume: 1.0, pitch: 0.5 },
            HazardKind::AcidRain => SoundCue { sound: "strike.acid", volume: 0.8, pitch: 1.2 },
        }
    }

    /// Impact radius in blocks.
    pub fn radius(self) -> f64 {
        match self {
            HazardKind::Lightning => 3.0,
            HazardKind::Meteor => 5.0,
            HazardKind::Earthquake => 7.0,
            HazardKind::AcidRain => 2.5,
        }
    }

    /// Damage at the centre of an impact.
    pub fn damage(self) -> f64 {
        match self {
            HazardKind::Lightning => 6.0,
            HazardKind::Meteor => 10.0,
            HazardKind::Earthquake => 4.0,
            HazardKind::AcidRain => 3.0,
        }
    }

    /// Particle burst for an impact of the given size.
    pub fn particle_shape(self, size: f64) -> ParticleShape {
        match self {
            HazardKind::Lightning => ParticleShape::Bolt { height: size * 8.0 },
            HazardKind::Meteor => ParticleShape::Sphere { radius: size },
            HazardKind::Earthquake => ParticleShape::Ring { radius: size },
            HazardKind::AcidRain => ParticleShape::Cloud { radius: size },
        }
    }

    /// Built-in strike pacing.
    pub fn default_timing(self) -> HazardTiming {
        let (initial_interval_ms, minimum_interval_ms, decrement_ms) = match self {
            HazardKind::Lightning => (10_000, 2_000, 50),
            HazardKind::Meteor => (15_000, 4_000, 40),
            HazardKind::Earthquake => (20_000, 6_000, 30),
            HazardKind::AcidRain => (8_000, 1_500, 25),
        };
        HazardTiming {
            initial_interval_ms,
            minimum_interval_ms,
            decrement_ms,
        }
    }
}

// =============================================================================
// HAZARD
// =============================================================================

/// Read-only view of the match a hazard needs each tick.
#[derive(Clone, Copy)]
pub struct HazardScene<'a> {
    /// Terrain
    pub world: &'a dyn WorldQuery,
    /// Who is still fighting
    pub roster: &'a dyn ActorRoster,
    /// Current playable area
    pub bounds: Bounds,
    /// Playable area at match start (vertical limits for targeting)
    pub initial_bounds: Bounds,
}

/// Outcome of one strike.
#[derive(Clone, Debug, PartialEq)]
pub struct StrikeReport {
    /// Striking hazard
    pub kind: HazardKind,
    /// Impact block
    pub location: BlockPos,
    /// Targeting tier that found it
    pub tier: TargetTier,
    /// Damage dealt, already recorded in the ledger
    pub hits: Vec<(ActorId, DamageTick)>,
}

/// One running hazard.
#[derive(Clone, Debug)]
pub struct Hazard {
    kind: HazardKind,
    timing: HazardTiming,
    activated_at: GameInstant,
    last_strike: Option<GameInstant>,
    current_interval: Duration,
    next_sound_at: GameInstant,
    size: f64,
    strikes: u32,
    targeting: Targeting,
    rng: DeterministicRng,
}

impl Hazard {
    /// Activate a hazard at `now`.
    pub fn new(kind: HazardKind, timing: HazardTiming, now: GameInstant, seed: u64) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let next_sound_at = now + cue_delay(&mut rng);
        Self {
            kind,
            timing,
            activated_at: now,
            last_strike: None,
            current_interval: timing.initial_interval(),
            next_sound_at,
            size: kind.radius(),
            strikes: 0,
            targeting: Targeting::new(),
            rng,
        }
    }

    /// Hazard kind.
    pub fn kind(&self) -> HazardKind {
        self.kind
    }

    /// Current strike interval.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// When the last strike landed.
    pub fn last_strike(&self) -> Option<GameInstant> {
        self.last_strike
    }

    /// When the hazard was activated.
    pub fn activated_at(&self) -> GameInstant {
        self.activated_at
    }

    /// Targeting accuracy factor.
    pub fn accuracy(&self) -> f64 {
        self.targeting.accuracy()
    }

    /// Strikes landed so far.
    pub fn strike_count(&self) -> u32 {
        self.strikes
    }

    /// Visual size of impacts.
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Advance one tick.
    pub fn update(
        &mut self,
        now: GameInstant,
        scene: HazardScene<'_>,
        ledger: &mut DamageLedger,
        effects: &mut dyn EffectSink,
    ) -> Option<StrikeReport> {
        self.decay_interval();

        let report = if self.strike_due(now) {
            let target = self.targeting.next_location(
                scene.world,
                scene.roster,
                &scene.bounds,
                &scene.initial_bounds,
                &mut self.rng,
            );
            target.map(|target| self.strike(now, target, scene, ledger, effects))
        } else {
            None
        };

        if now >= self.next_sound_at {
            self.play_ambient(now, scene.roster, effects);
        }
        report
    }

    fn decay_interval(&mut self) {
        let minimum = self.timing.minimum_interval();
        if self.current_interval > minimum {
            self.current_interval = self
                .current_interval
                .saturating_sub(self.timing.decrement())
                .max(minimum);
        }
    }

    fn strike_due(&self, now: GameInstant) -> bool {
        match self.last_strike {
            // First strike waits out the undecayed interval from activation
            None => now.saturating_since(self.activated_at) >= self.timing.initial_interval(),
            Some(last) => now.saturating_since(last) >= self.current_interval,
        }
    }

    fn strike(
        &mut self,
        now: GameInstant,
        target: Target,
        scene: HazardScene<'_>,
        ledger: &mut DamageLedger,
        effects: &mut dyn EffectSink,
    ) -> StrikeReport {
        let impact = target.block.top_center();
        effects.emit_particles(impact, self.kind.particle_shape(self.size));

        let sound = self.kind.strike_sound();
        for listener in scene.roster.audience() {
            effects.emit_sound(listener, sound.sound, sound.volume, sound.pitch);
        }

        let radius = self.kind.radius();
        let mut hits = Vec::new();
        for actor in scene.roster.living_actors_in_bounds(&scene.bounds) {
            let distance = actor.position.distance(impact);
            if distance > radius {
                continue;
            }
            let falloff = 1.0 - (1.0 - EDGE_FALLOFF) * (distance / radius);
            match self.hit(self.kind.damage() * falloff, impact, now) {
                Ok(tick) => {
                    effects.apply_damage(actor.id, &tick);
                    ledger.record(actor.id, tick.clone());
                    hits.push((actor.id, tick));
                }
                Err(err) => warn!(hazard = self.kind.name(), error = %err, "Dropped hazard hit"),
            }
        }

        self.last_strike = Some(now);
        self.strikes += 1;
        debug!(
            hazard = self.kind.name(),
            location = %target.block,
            tier = ?target.tier,
            hits = hits.len(),
            "Hazard strike"
        );

        StrikeReport {
            kind: self.kind,
            location: target.block,
            tier: target.tier,
            hits,
        }
    }

    fn hit(&self, amount: f64, impact: Position, now: GameInstant) -> Result<DamageTick, CombatError> {
        let tick = DamageTick::new(
            amount,
            DamageCause::Hazard,
            DamageSource::Hazard { kind: self.kind },
            self.kind.name(),
            now,
        )?;
        match self.kind {
            HazardKind::Earthquake => tick
                .with_knockback(impact)
                .with_knockback_modifier("quake", QUAKE_KNOCKBACK),
            _ => Ok(tick),
        }
    }

    fn play_ambient(&mut self, now: GameInstant, roster: &dyn ActorRoster, effects: &mut dyn EffectSink) {
        let cues = self.kind.ambient_cues();
        if let Some(cue) = self.rng.choose(&cues) {
            for listener in roster.audience() {
                effects.emit_sound(listener, cue.sound, cue.volume, cue.pitch);
            }
        }
        self.next_sound_at = now + cue_delay(&mut self.rng);
    }
}

fn cue_delay(rng: &mut DeterministicRng) -> Duration {
    let ms = rng.next_int_range(MIN_CUE_DELAY_MS, MAX_CUE_DELAY_MS + 1);
    Duration::from_millis(ms as u64)
}

// =============================================================================
// HAZARD SET
// =============================================================================

/// Every hazard active in a match.
#[derive(Clone, Debug, Default)]
pub struct HazardSet {
    active: BTreeMap<HazardKind, Hazard>,
}

impl HazardSet {
    /// No active hazards.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a hazard. Returns false if it is already running.
    pub fn activate(&mut self, kind: HazardKind, timing: HazardTiming, now: GameInstant, seed: u64) -> bool {
        if self.active.contains_key(&kind) {
            return false;
        }
        info!(hazard = kind.name(), at = %now, "Hazard activated");
        self.active.insert(kind, Hazard::new(kind, timing, now, seed));
        true
    }

    /// Stop one hazard, discarding its timers.
    pub fn deactivate(&mut self, kind: HazardKind) -> Option<Hazard> {
        let removed = self.active.remove(&kind);
        if removed.is_some() {
            info!(hazard = kind.name(), "Hazard deactivated");
        }
        removed
    }

    /// Stop everything.
    pub fn deactivate_all(&mut self) {
        let kinds: Vec<HazardKind> = self.active.keys().copied().collect();
        for kind in kinds {
            self.deactivate(kind);
        }
    }

    /// Whether `kind` is running.
    pub fn is_active(&self, kind: HazardKind) -> bool {
        self.active.contains_key(&kind)
    }

    /// Running hazard of a kind.
    pub fn get(&self, kind: HazardKind) -> Option<&Hazard> {
        self.active.get(&kind)
    }

    /// Running hazards in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.active.values()
    }

    /// Number of running hazards.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// True if nothing is running.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Update every hazard in kind order.
    pub fn update_all(
        &mut self,
        now: GameInstant,
        scene: HazardScene<'_>,
        ledger: &mut DamageLedger,
        effects: &mut dyn EffectSink,
    ) -> Vec<StrikeReport> {
        self.active
            .values_mut()
            .filter_map(|hazard| hazard.update(now, scene, ledger, effects))
            .collect()
    }

    /// Combined multiplier for a spell carrying `tag`.
    pub fn spell_multiplier(&self, tag: &str) -> f64 {
        self.active
            .keys()
            .filter(|kind| kind.spell_tags().contains(&tag))
            .fold(1.0, |acc, _| acc * SPELL_AMPLIFIER)
    }

    /// Running hazards that amplify `tag`.
    pub fn amplifiers(&self, tag: &str) -> Vec<HazardKind> {
        self.active
            .keys()
            .copied()
            .filter(|kind| kind.spell_tags().contains(&tag))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::game::roster::{ActorState, Roster};
    use crate::game::world::{Column, Effect, HeightmapWorld, Material, RecordingEffects};
    use proptest::prelude::*;

    const ARENA: Bounds = Bounds::new(-16, 16, -16, 16, 0, 128);
    const TICK: Duration = Duration::from_millis(50);

    struct Fixture {
        world: HeightmapWorld,
        roster: Roster,
        ledger: DamageLedger,
        effects: RecordingEffects,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: HeightmapWorld::flat(ARENA, 64, Material::Stone),
                roster: Roster::new(),
                ledger: DamageLedger::new(CombatConfig::default()).unwrap(),
                effects: RecordingEffects::new(),
            }
        }

        fn update(&mut self, hazard: &mut Hazard, now: GameInstant) -> Option<StrikeReport> {
            let scene = HazardScene {
                world: &self.world,
                roster: &self.roster,
                bounds: ARENA,
                initial_bounds: ARENA,
            };
            hazard.update(now, scene, &mut self.ledger, &mut self.effects)
        }
    }

    fn lightning() -> HazardTiming {
        HazardTiming {
            initial_interval_ms: 10_000,
            minimum_interval_ms: 2_000,
            decrement_ms: 50,
        }
    }

    #[test]
    fn test_first_strike_waits_initial_interval() {
        let mut fx = Fixture::new();
        let start = GameInstant::ZERO;
        let mut hazard = Hazard::new(HazardKind::Lightning, lightning(), start, 1);

        let mut first = None;
        for n in 1..=200u32 {
            let now = start + TICK * n;
            if fx.update(&mut hazard, now).is_some() {
                first = Some(now);
                break;
            }
        }
        assert_eq!(first, Some(GameInstant::from_millis(10_000)));
        assert_eq!(hazard.current_interval(), Duration::from_millis(2_000));

        // Next strike follows the decayed interval
        let mut next = None;
        for n in 201..=300u32 {
            let now = start + TICK * n;
            if fx.update(&mut hazard, now).is_some() {
                next = Some(now);
                break;
            }
        }
        assert_eq!(next, Some(GameInstant::from_millis(12_000)));
        assert_eq!(hazard.strike_count(), 2);
    }

    #[test]
    fn test_strike_damages_nearby_actors_with_falloff() {
        let mut fx = Fixture::new();
        // Only the centre column can take a strike
        fx.world = HeightmapWorld::flat(ARENA, 63, Material::Water);
        fx.world.set_column(0, 0, Some(Column::new(64, Material::Stone)));

        let center = ActorId::new([1; 16]);
        let edge = ActorId::new([2; 16]);
        let outside = ActorId::new([3; 16]);
        fx.roster.insert(ActorState::new(center, "center", Position::new(0.5, 65.0, 0.5)));
        fx.roster.insert(ActorState::new(edge, "edge", Position::new(5.5, 65.0, 0.5)));
        fx.roster.insert(ActorState::new(outside, "outside", Position::new(9.5, 65.0, 0.5)));

        let timing = HazardTiming { initial_interval_ms: 0, minimum_interval_ms: 1, decrement_ms: 0 };
        let mut hazard = Hazard::new(HazardKind::Meteor, timing, GameInstant::ZERO, 8);
        let report = fx.update(&mut hazard, GameInstant::from_millis(50)).unwrap();

        assert_eq!(report.location, BlockPos::new(0, 64, 0));
        let damage: BTreeMap<ActorId, f64> = report
            .hits
            .iter()
            .map(|(id, tick)| (*id, tick.effective_damage()))
            .collect();
        assert_eq!(damage.len(), 2);
        assert!((damage[&center] - 10.0).abs() < 1e-9);
        assert!((damage[&edge] - 5.0).abs() < 1e-9);
        assert!(!damage.contains_key(&outside));

        assert_eq!(fx.ledger.ticks(&center).len(), 1);
        assert!(fx.effects.records.iter().any(|e| matches!(e, Effect::Particles { .. })));
        assert!(fx.effects.records.iter().any(|e| matches!(e, Effect::Damage { actor, .. } if *actor == edge)));
    }

    #[test]
    fn test_earthquake_sets_knockback() {
        let hazard = Hazard::new(HazardKind::Earthquake, HazardKind::Earthquake.default_timing(), GameInstant::ZERO, 2);
        let impact = Position::new(1.5, 65.0, 1.5);
        let tick = hazard.hit(4.0, impact, GameInstant::ZERO).unwrap();
        assert_eq!(tick.knockback_origin, Some(impact));
        assert_eq!(tick.knockback_multiplier(), QUAKE_KNOCKBACK);
    }

    #[test]
    fn test_ambient_cues_reach_audience_on_schedule() {
        let mut fx = Fixture::new();
        let listener = ActorId::new([4; 16]);
        fx.roster.insert(ActorState::new(listener, "ear", Position::new(0.0, 65.0, 0.0)));
        let mut watcher = ActorState::new(ActorId::new([5; 16]), "spec", Position::default());
        watcher.spectating = true;
        fx.roster.insert(watcher);

        // Long strike interval so only cues make noise
        let timing = HazardTiming { initial_interval_ms: 600_000, minimum_interval_ms: 600_000, decrement_ms: 0 };
        let mut hazard = Hazard::new(HazardKind::AcidRain, timing, GameInstant::ZERO, 77);

        let mut cue_times = Vec::new();
        for n in 1..=1_200u32 {
            let now = GameInstant::ZERO + TICK * n;
            let before = fx.effects.sounds().count();
            fx.update(&mut hazard, now);
            if fx.effects.sounds().count() > before {
                cue_times.push(now.as_millis());
            }
        }

        assert!(cue_times.len() >= 4);
        assert!(cue_times[0] >= 5_000 && cue_times[0] <= 13_050);
        for pair in cue_times.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((5_000..=13_050).contains(&gap), "gap {gap}");
        }
        let cue_names: Vec<&str> = HazardKind::AcidRain.ambient_cues().iter().map(|c| c.sound).collect();
        for (actor, sound) in fx.effects.sounds() {
            assert_eq!(*actor, listener);
            assert!(cue_names.contains(&sound));
        }
    }

    #[test]
    fn test_no_target_skips_quietly() {
        let mut fx = Fixture::new();
        fx.world = HeightmapWorld::flat(ARENA, 63, Material::Water);
        let timing = HazardTiming { initial_interval_ms: 0, minimum_interval_ms: 1, decrement_ms: 0 };
        let mut hazard = Hazard::new(HazardKind::Lightning, timing, GameInstant::ZERO, 3);
        assert!(fx.update(&mut hazard, GameInstant::from_millis(50)).is_none());
        assert_eq!(hazard.last_strike(), None);
        assert!(hazard.accuracy() > 0.0);
    }

    #[test]
    fn test_hazard_set_activation_and_amplifiers() {
        let mut set = HazardSet::new();
        assert_eq!(set.spell_multiplier("storm"), 1.0);

        assert!(set.activate(HazardKind::Lightning, lightning(), GameInstant::ZERO, 1));
        assert!(!set.activate(HazardKind::Lightning, lightning(), GameInstant::ZERO, 1));
        assert_eq!(set.spell_multiplier("lightning"), SPELL_AMPLIFIER);

        set.activate(HazardKind::AcidRain, HazardKind::AcidRain.default_timing(), GameInstant::ZERO, 2);
        assert_eq!(set.spell_multiplier("storm"), SPELL_AMPLIFIER * SPELL_AMPLIFIER);
        assert_eq!(set.amplifiers("storm"), vec![HazardKind::Lightning, HazardKind::AcidRain]);
        assert_eq!(set.spell_multiplier("fire"), 1.0);

        set.deactivate_all();
        assert!(set.is_empty());
    }

    #[test]
    fn test_kind_metadata_is_consistent() {
        for kind in HazardKind::ALL {
            let t = kind.default_timing();
            assert!(t.minimum_interval_ms <= t.initial_interval_ms);
            assert_eq!(kind.ambient_cues().len(), 3);
            assert!(!kind.flavor_text().is_empty());
            assert!(kind.event_key().starts_with("event.hazard."));
        }
    }

    proptest! {
        #[test]
        fn prop_interval_decays_to_floor(
            initial in 1_000u64..30_000,
            floor_pct in 1u64..100,
            decrement in 0u64..500,
            ticks in 0u32..800,
        ) {
            let minimum = (initial * floor_pct / 100).max(1);
            let timing = HazardTiming { initial_interval_ms: initial, minimum_interval_ms: minimum, decrement_ms: decrement };
            let mut fx = Fixture::new();
            fx.world = HeightmapWorld::flat(ARENA, 63, Material::Water);
            let mut hazard = Hazard::new(HazardKind::Meteor, timing, GameInstant::ZERO, 5);

            for n in 1..=ticks {
                fx.update(&mut hazard, GameInstant::ZERO + TICK * n);
                let expected = initial.saturating_sub(decrement * u64::from(n)).max(minimum);
                prop_assert_eq!(hazard.current_interval(), Duration::from_millis(expected));
                prop_assert!(hazard.current_interval() >= Duration::from_millis(minimum));
            }
        }
    }
}
