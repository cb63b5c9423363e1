//! Damage Ledger
//!
//! Per-victim, time-ordered damage history. Feeds kill attribution and the
//! human-readable combat log. Shared by every hazard and attacker in a
//! match; callers serialize access (one tick loop, one ledger).

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::{CombatConfig, ConfigError};
use crate::core::time::GameInstant;
use crate::game::attribution::KillAssist;
use crate::game::damage::{DamageSource, DamageTick};
use crate::game::roster::ActorId;
use crate::game::world::ActorRoster;

/// How a recorded tick landed in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Stored as a new entry
    Appended,
    /// Folded into an existing entry from the same ongoing source
    Merged,
}

/// Damage history for every victim in a match.
#[derive(Clone, Debug)]
pub struct DamageLedger {
    config: CombatConfig,
    entries: BTreeMap<ActorId, Vec<DamageTick>>,
}

impl DamageLedger {
    /// Create a ledger, validating the attribution constants.
    pub fn new(config: CombatConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            entries: BTreeMap::new(),
        })
    }

    /// Attribution constants in use.
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Record a tick against `victim`.
    ///
    /// A tick that continues an existing entry (see [`DamageTick::matches`])
    /// is merged into it and the entry moves to its refreshed time slot.
    pub fn record(&mut self, victim: ActorId, tick: DamageTick) -> RecordOutcome {
        let window = self.config.merge_window();
        let history = self.entries.entry(victim).or_default();

        if let Some(idx) = history.iter().rposition(|existing| tick.matches(existing, window)) {
            let mut existing = history.remove(idx);
            tick.merge_into(&mut existing);
            #[cfg(feature = "debug-tracing")]
            debug!(victim = %victim, total = existing.effective_damage(), "Merged damage tick");
            let pos = history.partition_point(|t| t.timestamp <= existing.timestamp);
            history.insert(pos, existing);
            return RecordOutcome::Merged;
        }

        // Keep time order even if a late report arrives
        let pos = history.partition_point(|t| t.timestamp <= tick.timestamp);
        debug!(victim = %victim, damage = tick.effective_damage(), cause = tick.cause.label(), "Recorded damage");
        history.insert(pos, tick);
        RecordOutcome::Appended
    }

    /// Base damage times the product of its multipliers.
    #[inline]
    pub fn effective_damage(tick: &DamageTick) -> f64 {
        tick.effective_damage()
    }

    /// Full history for a victim, oldest first.
    pub fn ticks(&self, victim: &ActorId) -> &[DamageTick] {
        self.entries.get(victim).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Most recent tick against a victim.
    pub fn last_tick(&self, victim: &ActorId) -> Option<&DamageTick> {
        self.entries.get(victim).and_then(|h| h.last())
    }

    /// Ticks against `victim` that still count at `now`.
    pub fn recent_ticks<'a>(&'a self, victim: &ActorId, now: GameInstant) -> impl Iterator<Item = &'a DamageTick> + 'a {
        let timeout = self.config.log_timeout();
        self.ticks(victim)
            .iter()
            .filter(move |t| now.saturating_since(t.timestamp) <= timeout)
    }

    /// Proportional kill credit for `victim` at `now`.
    ///
    /// Sums effective damage per attacker inside the log window, converts to
    /// percentages of the attributed total, drops attackers below the assist
    /// threshold and returns the rest highest share first. Ties go to the
    /// lower actor ID. No history, or no attributable damage, gives an empty
    /// list.
    pub fn compute_assists(&self, victim: &ActorId, now: GameInstant) -> Vec<KillAssist> {
        let mut per_attacker: BTreeMap<ActorId, f64> = BTreeMap::new();
        for tick in self.recent_ticks(victim, now) {
            if let Some(attacker) = tick.attacker() {
                *per_attacker.entry(attacker).or_insert(0.0) += tick.effective_damage();
            }
        }

        let total: f64 = per_attacker.values().sum();
        if total <= 0.0 {
            return Vec::new();
        }

        let threshold = self.config.assist_threshold_percentage;
        let mut assists: Vec<KillAssist> = per_attacker
            .into_iter()
            .map(|(attacker, damage)| KillAssist::new(attacker, 100.0 * damage / total))
            .filter(|assist| assist.percentage >= threshold)
            .collect();

        assists.sort_by(|a, b| b.percentage.total_cmp(&a.percentage).then(a.attacker.cmp(&b.attacker)));
        assists
    }

    /// Human-readable age of a tick: `"just now"` or `"<n>s prior"`.
    pub fn time_diff(&self, tick: &DamageTick, now: GameInstant) -> String {
        let elapsed = now.saturating_since(tick.timestamp);
        if elapsed < self.config.just_now_threshold() {
            "just now".to_string()
        } else {
            format!("{}s prior", elapsed.as_secs())
        }
    }

    /// One line per tick in the window, newest first.
    pub fn combat_log(&self, victim: &ActorId, now: GameInstant, roster: &dyn ActorRoster) -> Vec<String> {
        let mut lines: Vec<String> = self
            .recent_ticks(victim, now)
            .map(|tick| {
                format!(
                    "{} - {} ({})",
                    describe_source(&tick.source, roster),
                    tick,
                    self.time_diff(tick, now)
                )
            })
            .collect();
        lines.reverse();
        lines
    }

    /// Drop ticks that fell out of the log window everywhere.
    pub fn prune(&mut self, now: GameInstant) {
        let timeout = self.config.log_timeout();
        for history in self.entries.values_mut() {
            history.retain(|t| now.saturating_since(t.timestamp) <= timeout);
        }
        self.entries.retain(|_, h| !h.is_empty());
    }

    /// Forget a victim's history (death, respawn, quit).
    pub fn clear(&mut self, victim: &ActorId) {
        self.entries.remove(victim);
    }

    /// Victims with any recorded history.
    pub fn victim_count(&self) -> usize {
        self.entries.len()
    }
}

/// Who dealt a tick, in words.
pub fn describe_source(source: &DamageSource, roster: &dyn ActorRoster) -> String {
    let name = |id: &ActorId| roster.actor(id).map(|a| a.name).unwrap_or_else(|| id.to_string());
    match source {
        DamageSource::Player(id) => name(id),
        DamageSource::Spell { caster, spell } => format!("{} [{}]", name(caster), spell),
        DamageSource::Hostile { kind } => kind.clone(),
        DamageSource::Block { material } => material.key().to_string(),
        DamageSource::Hazard { kind } => kind.name().to_string(),
        DamageSource::Environment => "environment".to_string(),
    }
}
