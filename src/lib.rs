//! # Hazard Royale Server
//!
//! Combat resolution and hazard scheduling core for Hazard Royale
//! elimination matches.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   HAZARD ROYALE SERVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  ├── rng.rs       - Xorshift128+ PRNG, hazard seeds          │
//! │  ├── time.rs      - Game instants and clocks                 │
//! │  └── geom.rs      - Positions and bounds                     │
//! │                                                              │
//! │  config.rs        - Typed configuration tree                 │
//! │                                                              │
//! │  game/            - Match logic                              │
//! │  ├── damage.rs    - Damage ticks and modifiers               │
//! │  ├── ledger.rs    - Per-victim damage history                │
//! │  ├── attribution.rs - Kill credit and death messages         │
//! │  ├── targeting.rs - Strike location search                   │
//! │  ├── hazard.rs    - Hazards and their cadences               │
//! │  ├── phase.rs     - Phase machine and scoreboards            │
//! │  ├── phases.rs    - Lobby / in-game / ended                  │
//! │  ├── context.rs   - Match context                            │
//! │  └── tick.rs      - Per-tick pipeline                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tick Pipeline
//!
//! Every tick runs hazards first (strikes feed the damage ledger), then
//! resolves deaths, then lets the active phase do its bookkeeping and
//! possibly hand over to the next phase. Damage reported by the host
//! between ticks goes straight through the ledger.
//!
//! ## Determinism
//!
//! All randomness comes from seeded Xorshift128+ generators; each hazard
//! derives its own seed from the match seed. Collections that are iterated
//! use BTreeMap. Same seed and same host calls give the same match.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use core::rng::DeterministicRng;
pub use core::time::{Clock, GameInstant};
pub use game::{DamageLedger, DamageTick, KillAssist, MatchController, MatchContext};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tick rate (Hz)
pub const TICK_RATE: u32 = 20;

/// Milliseconds per tick
pub const TICK_DURATION_MS: u64 = 1000 / TICK_RATE as u64;
