//! Game Events
//!
//! Events generated during a match tick, returned to the host in a
//! deterministic order.

use serde::{Serialize, Deserialize};

use crate::core::geom::BlockPos;
use crate::core::time::GameInstant;
use crate::game::attribution::KillAssist;
use crate::game::damage::DamageCause;
use crate::game::hazard::HazardKind;
use crate::game::roster::ActorId;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Eliminations first so later events see the final roster
    Elimination = 0,
    /// Then damage
    Damage = 1,
    /// Then hazard strikes
    HazardStrike = 2,
    /// Then hazard activations
    HazardActivation = 3,
    /// Then phase changes
    PhaseChange = 4,
    /// Lowest priority
    Other = 255,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Damage landed on an actor
    ActorDamaged {
        victim: ActorId,
        attacker: Option<ActorId>,
        cause: DamageCause,
        amount: f64,
        health_left: f64,
    },

    /// Actor was eliminated
    ActorEliminated {
        victim: ActorId,
        killer: Option<ActorId>,
        assists: Vec<KillAssist>,
        message: String,
    },

    /// A hazard started
    HazardActivated {
        kind: HazardKind,
    },

    /// A hazard struck
    HazardStrike {
        kind: HazardKind,
        location: BlockPos,
        hits: usize,
    },

    /// Match phase changed
    PhaseChanged {
        old_phase: String,
        new_phase: String,
    },

    /// Match ended
    MatchEnded {
        winner: Option<ActorId>,
        winning_team: Option<String>,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameEvent {
    /// When the event occurred
    pub at: GameInstant,

    /// Processing priority
    pub priority: EventPriority,

    /// Actor involved (for tie-breaking)
    pub actor: Option<ActorId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(at: GameInstant, priority: EventPriority, data: GameEventData) -> Self {
        let actor = match &data {
            GameEventData::ActorDamaged { victim, .. } => Some(*victim),
            GameEventData::ActorEliminated { victim, .. } => Some(*victim),
            GameEventData::MatchEnded { winner, .. } => *winner,
            _ => None,
        };

        Self {
            at,
            priority,
            actor,
            data,
        }
    }

    /// Create actor damaged event.
    pub fn actor_damaged(
        at: GameInstant,
        victim: ActorId,
        attacker: Option<ActorId>,
        cause: DamageCause,
        amount: f64,
        health_left: f64,
    ) -> Self {
        Self::new(
            at,
            EventPriority::Damage,
            GameEventData::ActorDamaged {
                victim,
                attacker,
                cause,
                amount,
                health_left,
            },
        )
    }

    /// Create actor eliminated event.
    pub fn actor_eliminated(
        at: GameInstant,
        victim: ActorId,
        killer: Option<ActorId>,
        assists: Vec<KillAssist>,
        message: String,
    ) -> Self {
        Self::new(
            at,
            EventPriority::Elimination,
            GameEventData::ActorEliminated {
                victim,
                killer,
                assists,
                message,
            },
        )
    }

    /// Create hazard activated event.
    pub fn hazard_activated(at: GameInstant, kind: HazardKind) -> Self {
        Self::new(at, EventPriority::HazardActivation, GameEventData::HazardActivated { kind })
    }

    /// Create hazard strike event.
    pub fn hazard_strike(at: GameInstant, kind: HazardKind, location: BlockPos, hits: usize) -> Self {
        Self::new(
            at,
            EventPriority::HazardStrike,
            GameEventData::HazardStrike { kind, location, hits },
        )
    }

    /// Create phase changed event.
    pub fn phase_changed(at: GameInstant, old_phase: &str, new_phase: &str) -> Self {
        Self::new(
            at,
            EventPriority::PhaseChange,
            GameEventData::PhaseChanged {
                old_phase: old_phase.to_string(),
                new_phase: new_phase.to_string(),
            },
        )
    }

    /// Create match ended event.
    pub fn match_ended(at: GameInstant, winner: Option<ActorId>, winning_team: Option<String>) -> Self {
        Self::new(at, EventPriority::Other, GameEventData::MatchEnded { winner, winning_team })
    }
}

impl PartialEq for GameEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
            && self.priority == other.priority
            && self.actor == other.actor
    }
}

impl Eq for GameEvent {}

impl PartialOrd for GameEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Sort by: time, then priority, then actor
        self.at
            .cmp(&other.at)
            .then(self.priority.cmp(&other.priority))
            .then(self.actor.cmp(&other.actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_ordering() {
        let id1 = ActorId::new([1; 16]);
        let id2 = ActorId::new([2; 16]);
        let t = GameInstant::from_millis(500);

        let event1 = GameEvent::actor_eliminated(t, id1, None, Vec::new(), "x died".into());
        let event2 = GameEvent::actor_damaged(t, id1, None, DamageCause::Fall, 3.0, 0.0);
        let event3 = GameEvent::actor_eliminated(t, id2, None, Vec::new(), "y died".into());

        // Same time, but elimination < damage
        assert!(event1 < event2);

        // Same time and priority, but id1 < id2
        assert!(event1 < event3);

        // Earlier time wins regardless of priority
        let early = GameEvent::phase_changed(GameInstant::from_millis(100), "Lobby", "InGame");
        assert!(early < event1);
    }
}
