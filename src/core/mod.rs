//! Core deterministic primitives.
//!
//! Time, geometry and randomness shared by every simulation module.

pub mod geom;
pub mod rng;
pub mod time;

// Re-export core types
pub use geom::{BlockPos, Bounds, Position};
pub use rng::{derive_hazard_seed, DeterministicRng};
pub use time::{format_countdown, Clock, GameInstant, ManualClock, SystemClock};
