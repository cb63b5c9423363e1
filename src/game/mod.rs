//! Game Logic Module
//!
//! Combat attribution, hazards and match flow. Deterministic for a given
//! seed and input order.
//!
//! ## Module Structure
//!
//! - `world`: Capabilities the host provides, plus in-memory versions
//! - `roster`: Actors and their state
//! - `damage`: Damage ticks and modifiers
//! - `ledger`: Per-victim damage history and assist shares
//! - `attribution`: Kill credit and death messages
//! - `targeting`: Layered strike location search
//! - `hazard`: Self-accelerating hazards
//! - `schedule`: Timed in-game events
//! - `phase`: Phase trait, machine and scoreboard delegation
//! - `phases`: Lobby, in-game and ended phases
//! - `context`: Everything one match owns
//! - `tick`: Per-tick pipeline
//! - `events`: Game events returned to the host

pub mod world;
pub mod roster;
pub mod damage;
pub mod ledger;
pub mod attribution;
pub mod targeting;
pub mod hazard;
pub mod schedule;
pub mod phase;
pub mod phases;
pub mod context;
pub mod tick;
pub mod events;

// Re-export key types
pub use attribution::{attribute_kill, DeathMessageResolver, KillAssist, KillCredit};
pub use context::MatchContext;
pub use damage::{CombatError, DamageCause, DamageSource, DamageTick, Modifiers};
pub use events::{GameEvent, GameEventData};
pub use hazard::{Hazard, HazardKind, HazardSet};
pub use ledger::DamageLedger;
pub use phase::{GamePhase, PhaseError, PhaseMachine, Scoreboard};
pub use roster::{ActorId, ActorState, MatchMode, Roster};
pub use tick::{MatchController, TickResult};
