//! Match Schedule
//!
//! Timed events of the in-game phase: hazard activations, border shrinks
//! and the hard match end. Drives the scoreboard's "next event" line.

use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::config::MatchRules;
use crate::core::time::GameInstant;
use crate::game::hazard::HazardKind;

/// What happens when a scheduled event falls due.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Start a hazard
    ActivateHazard(HazardKind),
    /// Pull the border in by this many blocks
    ShrinkBorder(i32),
    /// Time limit reached
    EndMatch,
}

/// One timed event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// When it fires
    pub at: GameInstant,
    /// Localization key for its name
    pub key: String,
    /// What it does
    pub action: ScheduledAction,
}

/// Time-ordered queue of scheduled events.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchSchedule {
    events: Vec<ScheduledEvent>,
    fired: usize,
}

impl MatchSchedule {
    /// Empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the schedule for a match that starts at `start`.
    pub fn from_rules(rules: &MatchRules, start: GameInstant) -> Self {
        let mut schedule = Self::new();
        for entry in &rules.hazard_schedule {
            schedule.push(ScheduledEvent {
                at: start + Duration::from_millis(entry.at_ms),
                key: entry.kind.event_key().to_string(),
                action: ScheduledAction::ActivateHazard(entry.kind),
            });
        }
        for entry in &rules.border_shrinks {
            schedule.push(ScheduledEvent {
                at: start + Duration::from_millis(entry.at_ms),
                key: "event.border_shrink".to_string(),
                action: ScheduledAction::ShrinkBorder(entry.shrink_by),
            });
        }
        schedule.push(ScheduledEvent {
            at: start + rules.match_duration(),
            key: "event.match_end".to_string(),
            action: ScheduledAction::EndMatch,
        });
        schedule
    }

    /// Insert an event, keeping time order. Equal times keep insertion order.
    pub fn push(&mut self, event: ScheduledEvent) {
        let pos = self.events[self.fired..].partition_point(|e| e.at <= event.at) + self.fired;
        self.events.insert(pos, event);
    }

    /// Next event that has not fired yet.
    pub fn next_pending(&self) -> Option<&ScheduledEvent> {
        self.events.get(self.fired)
    }

    /// Every event due at `now`, in order. Each event is returned once.
    pub fn take_due(&mut self, now: GameInstant) -> Vec<ScheduledEvent> {
        let due = self.events[self.fired..].partition_point(|e| e.at <= now);
        let taken = self.events[self.fired..self.fired + due].to_vec();
        self.fired += due;
        taken
    }

    /// Events still to come.
    pub fn pending(&self) -> &[ScheduledEvent] {
        &self.events[self.fired..]
    }

    /// Nothing left to fire.
    pub fn is_finished(&self) -> bool {
        self.fired >= self.events.len()
    }
}
