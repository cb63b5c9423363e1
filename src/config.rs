//! Match Configuration
//!
//! Tunable constants for combat attribution, death messages, hazard pacing
//! and match flow. The tree deserializes from JSON with every section
//! optional; absent sections and fields take their defaults.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::game::hazard::HazardKind;
use crate::game::roster::MatchMode;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Assist threshold must be a percentage.
    #[error("assist threshold {0} is outside 0..=100")]
    AssistThresholdOutOfRange(f64),

    /// A zero log timeout would make every kill unattributed.
    #[error("log timeout must be greater than zero")]
    ZeroLogTimeout,

    /// Hazard interval settings are inconsistent.
    #[error("invalid timing for hazard {kind:?}: {reason}")]
    InvalidHazardTiming {
        /// Offending hazard.
        kind: HazardKind,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A verb list used for random selection is empty.
    #[error("verb list `{0}` must not be empty")]
    EmptyVerbList(&'static str),

    /// Melee range must be a finite, non-negative distance.
    #[error("melee range {0} is not a valid distance")]
    InvalidMeleeRange(f64),

    /// A border shrink would push the edges outward.
    #[error("border shrink at {at_ms}ms has negative size {shrink_by}")]
    NegativeBorderShrink {
        /// Offset of the offending entry.
        at_ms: u64,
        /// Configured shrink.
        shrink_by: i32,
    },

    /// A schedule offset or the match length exceeds the supported range.
    #[error("schedule offset {0}ms exceeds the {max}ms limit", max = MAX_SCHEDULE_OFFSET_MS)]
    ScheduleOffsetTooLarge(u64),

    /// JSON could not be parsed.
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// =============================================================================
// ROOT
// =============================================================================

/// Complete configuration for one match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Damage ledger and attribution constants
    pub combat: CombatConfig,
    /// Death message templates
    pub death_messages: DeathMessageConfig,
    /// Strike pacing per hazard kind
    pub hazards: HazardTimingConfig,
    /// Match flow
    pub rules: MatchRules,
}

impl GameConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for caller errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combat.validate()?;
        self.death_messages.validate()?;
        self.hazards.validate()?;
        self.rules.validate()?;
        Ok(())
    }
}

// =============================================================================
// COMBAT
// =============================================================================

/// Constants for the damage ledger and kill attribution.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// How long a damage tick counts towards kill credit
    pub log_timeout_ms: u64,
    /// Minimum share of damage (percent) to earn an assist
    pub assist_threshold_percentage: f64,
    /// Below this age a tick reads as "just now" in combat logs
    pub just_now_threshold_ms: u64,
    /// Hits from closer than this many blocks count as melee
    pub melee_range: f64,
    /// Continuous ticks from the same source within this window merge
    pub merge_window_ms: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            log_timeout_ms: 10_000,
            assist_threshold_percentage: 20.0,
            just_now_threshold_ms: 1_500,
            melee_range: 4.0,
            merge_window_ms: 1_000,
        }
    }
}

impl CombatConfig {
    /// Attribution window.
    pub fn log_timeout(&self) -> Duration {
        Duration::from_millis(self.log_timeout_ms)
    }

    /// "Just now" cutoff for combat logs.
    pub fn just_now_threshold(&self) -> Duration {
        Duration::from_millis(self.just_now_threshold_ms)
    }

    /// Merge window for continuous damage.
    pub fn merge_window(&self) -> Duration {
        Duration::from_millis(self.merge_window_ms)
    }

    /// Validate thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.assist_threshold_percentage;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::AssistThresholdOutOfRange(threshold));
        }
        if self.log_timeout_ms == 0 {
            return Err(ConfigError::ZeroLogTimeout);
        }
        if !self.melee_range.is_finite() || self.melee_range < 0.0 {
            return Err(ConfigError::InvalidMeleeRange(self.melee_range));
        }
        Ok(())
    }
}

// =============================================================================
// DEATH MESSAGES
// =============================================================================

/// Death message templates.
///
/// Placeholders: `{victim}`, `{killer}`, `{verb}`, `{spell}`, `{block}`,
/// `{hostile}`, `{hazard}`, `{distance}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathMessageConfig {
    /// Per-material templates for block destruction
    pub block: BTreeMap<String, String>,
    /// Block destruction fallback
    pub block_default: String,
    /// Fall damage
    pub fall: String,
    /// Void, last hit by a player
    pub void_player: String,
    /// Void, last hit by a hostile
    pub void_hostile: String,
    /// Void, nobody involved
    pub void_alone: String,
    /// Verbs for player melee kills
    pub melee_verbs: Vec<String>,
    /// Player melee format
    pub melee_format: String,
    /// Player ranged format
    pub ranged_format: String,
    /// Hostile melee
    pub hostile_melee: String,
    /// Hostile ranged
    pub hostile_ranged: String,
    /// Per-spell templates
    pub spell_overrides: BTreeMap<String, String>,
    /// Verbs for spell kills without an override
    pub spell_verbs: Vec<String>,
    /// Spell fallback format
    pub spell_format: String,
    /// Killed by your own spell
    pub spell_suicide: String,
    /// Hazard strike
    pub hazard: String,
    /// Burning
    pub burning: String,
    /// Anything else
    pub default: String,
}

impl Default for DeathMessageConfig {
    fn default() -> Self {
        let mut block = BTreeMap::new();
        block.insert("glass".to_string(), "{victim} was shredded by flying {block}".to_string());
        block.insert("sand".to_string(), "{victim} was buried under falling {block}".to_string());

        let mut spell_overrides = BTreeMap::new();
        spell_overrides.insert(
            "fireball".to_string(),
            "{victim} was incinerated by {killer}'s fireball".to_string(),
        );
        spell_overrides.insert(
            "frost_nova".to_string(),
            "{victim} was frozen solid by {killer}".to_string(),
        );

        Self {
            block,
            block_default: "{victim} was crushed by {block}".to_string(),
            fall: "{victim} hit the ground too hard".to_string(),
            void_player: "{victim} was knocked into the void by {killer}".to_string(),
            void_hostile: "{victim} was knocked into the void by a {hostile}".to_string(),
            void_alone: "{victim} fell out of the world".to_string(),
            melee_verbs: vec![
                "slain".to_string(),
                "obliterated".to_string(),
                "shredded".to_string(),
                "pummelled".to_string(),
            ],
            melee_format: "{victim} was {verb} by {killer}".to_string(),
            ranged_format: "{victim} was shot by {killer} ({distance} blocks)".to_string(),
            hostile_melee: "{victim} was slain by a {hostile}".to_string(),
            hostile_ranged: "{victim} was shot by a {hostile}".to_string(),
            spell_overrides,
            spell_verbs: vec![
                "blasted".to_string(),
                "hexed".to_string(),
                "smitten".to_string(),
            ],
            spell_format: "{victim} was {verb} by {killer} using {spell}".to_string(),
            spell_suicide: "{victim} was killed by their own {spell}".to_string(),
            hazard: "{victim} was struck down by the {hazard}".to_string(),
            burning: "{victim} burned to death".to_string(),
            default: "{victim} died".to_string(),
        }
    }
}

impl DeathMessageConfig {
    /// Validate verb lists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.melee_verbs.is_empty() {
            return Err(ConfigError::EmptyVerbList("melee_verbs"));
        }
        if self.spell_verbs.is_empty() {
            return Err(ConfigError::EmptyVerbList("spell_verbs"));
        }
        Ok(())
    }
}

// =============================================================================
// HAZARD TIMING
// =============================================================================

/// Strike pacing for one hazard kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardTiming {
    /// Interval at activation
    pub initial_interval_ms: u64,
    /// Floor the interval decays towards
    pub minimum_interval_ms: u64,
    /// Reduction applied every update
    pub decrement_ms: u64,
}

impl HazardTiming {
    /// Interval at activation.
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    /// Interval floor.
    pub fn minimum_interval(&self) -> Duration {
        Duration::from_millis(self.minimum_interval_ms)
    }

    /// Per-update reduction.
    pub fn decrement(&self) -> Duration {
        Duration::from_millis(self.decrement_ms)
    }
}

/// Strike pacing for every hazard kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HazardTimingConfig(pub BTreeMap<HazardKind, HazardTiming>);

impl Default for HazardTimingConfig {
    fn default() -> Self {
        Self(
            HazardKind::ALL
                .iter()
                .map(|kind| (*kind, kind.default_timing()))
                .collect(),
        )
    }
}

impl HazardTimingConfig {
    /// Timing for `kind`, falling back to its built-in defaults.
    pub fn timing_for(&self, kind: HazardKind) -> HazardTiming {
        match self.0.get(&kind) {
            Some(timing) => *timing,
            None => {
                warn!(hazard = kind.name(), "No timing configured, using defaults");
                kind.default_timing()
            }
        }
    }

    /// Validate every configured entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (kind, timing) in &self.0 {
            if timing.minimum_interval_ms == 0 {
                return Err(ConfigError::InvalidHazardTiming {
                    kind: *kind,
                    reason: "minimum interval must be positive",
                });
            }
            if timing.minimum_interval_ms > timing.initial_interval_ms {
                return Err(ConfigError::InvalidHazardTiming {
                    kind: *kind,
                    reason: "minimum interval exceeds initial interval",
                });
            }
        }
        Ok(())
    }
}

// =============================================================================
// MATCH RULES
// =============================================================================

/// One scheduled hazard activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardScheduleEntry {
    /// Hazard to activate
    pub kind: HazardKind,
    /// Offset from match start
    pub at_ms: u64,
}

/// One scheduled border shrink.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderShrinkEntry {
    /// Offset from match start
    pub at_ms: u64,
    /// Blocks pulled in from each edge
    pub shrink_by: i32,
}

/// Longest schedule offset or match length accepted (24 hours).
pub const MAX_SCHEDULE_OFFSET_MS: u64 = 24 * 60 * 60 * 1_000;

/// Match flow settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Actors needed before the lobby countdown starts
    pub min_players: usize,
    /// Lobby countdown once enough actors are present
    pub lobby_countdown_ms: u64,
    /// Solo or team play
    pub mode: MatchMode,
    /// Hazard activations, relative to match start
    pub hazard_schedule: Vec<HazardScheduleEntry>,
    /// Border shrinks, relative to match start
    pub border_shrinks: Vec<BorderShrinkEntry>,
    /// Hard time limit for the in-game phase
    pub match_duration_ms: u64,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            min_players: 2,
            lobby_countdown_ms: 10_000,
            mode: MatchMode::Solo,
            hazard_schedule: vec![
                HazardScheduleEntry { kind: HazardKind::Lightning, at_ms: 60_000 },
                HazardScheduleEntry { kind: HazardKind::Meteor, at_ms: 180_000 },
                HazardScheduleEntry { kind: HazardKind::AcidRain, at_ms: 300_000 },
                HazardScheduleEntry { kind: HazardKind::Earthquake, at_ms: 420_000 },
            ],
            border_shrinks: vec![
                BorderShrinkEntry { at_ms: 120_000, shrink_by: 16 },
                BorderShrinkEntry { at_ms: 240_000, shrink_by: 16 },
                BorderShrinkEntry { at_ms: 360_000, shrink_by: 16 },
                BorderShrinkEntry { at_ms: 480_000, shrink_by: 16 },
            ],
            match_duration_ms: 600_000,
        }
    }
}

impl MatchRules {
    /// Lobby countdown length.
    pub fn lobby_countdown(&self) -> Duration {
        Duration::from_millis(self.lobby_countdown_ms)
    }

    /// In-game time limit.
    pub fn match_duration(&self) -> Duration {
        Duration::from_millis(self.match_duration_ms)
    }

    /// Reject outward shrinks and offsets past the supported match length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let offsets = self
            .hazard_schedule
            .iter()
            .map(|e| e.at_ms)
            .chain(self.border_shrinks.iter().map(|e| e.at_ms))
            .chain([self.match_duration_ms]);
        for at_ms in offsets {
            if at_ms > MAX_SCHEDULE_OFFSET_MS {
                return Err(ConfigError::ScheduleOffsetTooLarge(at_ms));
            }
        }
        if let Some(entry) = self.border_shrinks.iter().find(|e| e.shrink_by < 0) {
            return Err(ConfigError::NegativeBorderShrink {
                at_ms: entry.at_ms,
                shrink_by: entry.shrink_by,
            });
        }
        Ok(())
    }
}
