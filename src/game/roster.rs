//! Actor Roster
//!
//! Who is in the match, where they stand and whether they are still alive.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::geom::{Bounds, Position};
use crate::game::world::{ActorRoster, ActorSnapshot};

// =============================================================================
// ACTOR ID
// =============================================================================

/// Unique actor identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering and stable tie-breaks
/// in kill attribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub [u8; 16]);

impl ActorId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Random identifier.
    pub fn random() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for logs
        write!(f, "{}", hex::encode(&self.0[..4]))
    }
}

// =============================================================================
// MATCH MODE
// =============================================================================

/// Whether actors fight alone or in teams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Every actor for themselves
    #[default]
    Solo,
    /// Actors grouped into named teams
    Teams,
}

impl MatchMode {
    /// Whether team information is meaningful.
    pub fn is_team_based(self) -> bool {
        matches!(self, MatchMode::Teams)
    }
}

// =============================================================================
// ACTOR STATE
// =============================================================================

/// State of a single actor in the match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActorState {
    /// Unique actor ID
    pub id: ActorId,

    /// Display name used in death messages and combat logs
    pub name: String,

    /// Current position
    pub position: Position,

    /// Remaining health
    pub health: f64,

    /// Health cap
    pub max_health: f64,

    /// Still in the fight?
    pub alive: bool,

    /// Watching only (never targeted, never hears cues)
    pub spectating: bool,

    /// Team name in team matches
    pub team: Option<String>,
}

impl ActorState {
    /// Default health for new actors.
    pub const DEFAULT_HEALTH: f64 = 20.0;

    /// Create a new living actor.
    pub fn new(id: ActorId, name: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            health: Self::DEFAULT_HEALTH,
            max_health: Self::DEFAULT_HEALTH,
            alive: true,
            spectating: false,
            team: None,
        }
    }

    /// Builder-style team assignment.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Participating and not yet eliminated.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.alive && !self.spectating
    }

    /// Read-only view.
    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            team: self.team.clone(),
        }
    }
}

// =============================================================================
// ROSTER
// =============================================================================

/// All actors in a match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Roster {
    actors: BTreeMap<ActorId, ActorState>,
}

impl Roster {
    /// Empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an actor.
    pub fn insert(&mut self, actor: ActorState) {
        self.actors.insert(actor.id, actor);
    }

    /// Remove an actor entirely (quit).
    pub fn remove(&mut self, id: &ActorId) -> Option<ActorState> {
        self.actors.remove(id)
    }

    /// Get an actor by ID.
    pub fn get(&self, id: &ActorId) -> Option<&ActorState> {
        self.actors.get(id)
    }

    /// Get an actor mutably by ID.
    pub fn get_mut(&mut self, id: &ActorId) -> Option<&mut ActorState> {
        self.actors.get_mut(id)
    }

    /// Iterate in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.values()
    }

    /// Number of actors, including eliminated and spectating ones.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// True if nobody joined.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Count of actors still fighting.
    pub fn alive_count(&self) -> usize {
        self.actors.values().filter(|a| a.is_active()).count()
    }

    /// Distinct teams (or solo actors) still fighting.
    pub fn surviving_sides(&self) -> usize {
        let mut sides: Vec<String> = self
            .actors
            .values()
            .filter(|a| a.is_active())
            .map(|a| a.team.clone().unwrap_or_else(|| a.id.to_uuid_string()))
            .collect();
        sides.sort();
        sides.dedup();
        sides.len()
    }

    /// Display name, falling back to the short ID.
    pub fn name_of(&self, id: &ActorId) -> String {
        self.actors
            .get(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Mark an actor eliminated. Returns false if it was already out.
    pub fn eliminate(&mut self, id: &ActorId) -> bool {
        match self.actors.get_mut(id) {
            Some(actor) if actor.alive => {
                actor.alive = false;
                actor.health = 0.0;
                true
            }
            _ => false,
        }
    }
}

impl ActorRoster for Roster {
    fn living_actors_in_bounds(&self, bounds: &Bounds) -> Vec<ActorSnapshot> {
        self.actors
            .values()
            .filter(|a| a.is_active() && bounds.contains_position(a.position))
            .map(ActorState::snapshot)
            .collect()
    }

    fn audience(&self) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|a| a.is_active())
            .map(|a| a.id)
            .collect()
    }

    fn actor(&self, id: &ActorId) -> Option<ActorSnapshot> {
        self.actors.get(id).map(ActorState::snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(n: u8, x: f64, z: f64) -> ActorState {
        ActorState::new(ActorId::new([n; 16]), format!("actor{n}"), Position::new(x, 64.0, z))
    }

    #[test]
    fn test_actor_id_ordering() {
        let id1 = ActorId::new([0; 16]);
        let id2 = ActorId::new([1; 16]);
        assert!(id1 < id2);
        assert_eq!(id2.to_string(), "01010101");
    }

    #[test]
    fn test_uuid_round_trip() {
        let id = ActorId::random();
        assert_eq!(ActorId::from_uuid_str(&id.to_uuid_string()), Some(id));
        assert_eq!(ActorId::from_uuid_str("nope"), None);
    }

    #[test]
    fn test_living_actors_in_bounds_skips_dead_spectators_and_outsiders() {
        let mut roster = Roster::new();
        roster.insert(actor(1, 0.0, 0.0));
        roster.insert(actor(2, 50.0, 0.0));
        let mut dead = actor(3, 1.0, 1.0);
        dead.alive = false;
        roster.insert(dead);
        let mut watcher = actor(4, 2.0, 2.0);
        watcher.spectating = true;
        roster.insert(watcher);

        let bounds = Bounds::new(-10, 10, -10, 10, 0, 128);
        let inside = roster.living_actors_in_bounds(&bounds);
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].id, ActorId::new([1; 16]));
        assert_eq!(roster.audience().len(), 2);
    }

    #[test]
    fn test_eliminate_once() {
        let mut roster = Roster::new();
        roster.insert(actor(1, 0.0, 0.0));
        let id = ActorId::new([1; 16]);
        assert!(roster.eliminate(&id));
        assert!(!roster.eliminate(&id));
        assert_eq!(roster.alive_count(), 0);
    }

    #[test]
    fn test_surviving_sides_groups_teams() {
        let mut roster = Roster::new();
        roster.insert(actor(1, 0.0, 0.0).with_team("red"));
        roster.insert(actor(2, 0.0, 0.0).with_team("red"));
        roster.insert(actor(3, 0.0, 0.0).with_team("blue"));
        assert_eq!(roster.surviving_sides(), 2);

        roster.eliminate(&ActorId::new([3; 16]));
        assert_eq!(roster.surviving_sides(), 1);
    }
}
