//! Damage Ticks
//!
//! One record of harm applied to a victim, with the multiplicative
//! modifiers that scale it and the source it is credited to.

use std::fmt;

use serde::{Serialize, Deserialize};

use crate::core::geom::Position;
use crate::core::time::GameInstant;
use crate::game::hazard::HazardKind;
use crate::game::roster::ActorId;
use crate::game::world::Material;

/// Damage construction errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombatError {
    /// Base damage below zero.
    #[error("damage must be non-negative, got {0}")]
    NegativeDamage(f64),

    /// NaN or infinite base damage.
    #[error("damage must be finite")]
    NonFiniteDamage,

    /// Modifier multiplier negative or not finite.
    #[error("modifier `{reason}` has invalid multiplier {value}")]
    InvalidMultiplier {
        /// Modifier name
        reason: String,
        /// Rejected value
        value: f64,
    },
}

// =============================================================================
// CAUSE & SOURCE
// =============================================================================

/// What kind of harm this was.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DamageCause {
    /// Close-range weapon or fist
    Melee,
    /// Arrow, bolt or thrown item
    Projectile,
    /// Landing from height
    Fall,
    /// Dropping out of the world
    Void,
    /// Exploding or collapsing block
    BlockExplosion,
    /// Caster spell
    Spell,
    /// Environmental hazard strike
    Hazard,
    /// Fire and lava
    Burning,
    /// Anything unclassified
    Other,
}

impl DamageCause {
    /// Causes that arrive as a stream of small hits from one source.
    ///
    /// Only these ever merge in the ledger.
    pub fn is_continuous(self) -> bool {
        matches!(self, DamageCause::Spell | DamageCause::Hazard | DamageCause::Burning)
    }

    /// Short lowercase label for logs.
    pub fn label(self) -> &'static str {
        match self {
            DamageCause::Melee => "melee",
            DamageCause::Projectile => "ranged",
            DamageCause::Fall => "fall",
            DamageCause::Void => "void",
            DamageCause::BlockExplosion => "block",
            DamageCause::Spell => "spell",
            DamageCause::Hazard => "hazard",
            DamageCause::Burning => "fire",
            DamageCause::Other => "other",
        }
    }
}

/// Who or what dealt the damage.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// Another actor, directly
    Player(ActorId),
    /// A hostile creature
    Hostile {
        /// Creature type, e.g. "skeleton"
        kind: String,
    },
    /// A block
    Block {
        /// Block material
        material: Material,
    },
    /// A spell cast by an actor
    Spell {
        /// Who cast it
        caster: ActorId,
        /// Spell identifier, e.g. "fireball"
        spell: String,
    },
    /// An environmental hazard
    Hazard {
        /// Which hazard
        kind: HazardKind,
    },
    /// No identifiable source
    Environment,
}

impl DamageSource {
    /// Actor credited with this damage, if any.
    pub fn attacker(&self) -> Option<ActorId> {
        match self {
            DamageSource::Player(id) => Some(*id),
            DamageSource::Spell { caster, .. } => Some(*caster),
            _ => None,
        }
    }
}

// =============================================================================
// MODIFIERS
// =============================================================================

/// Named multipliers in insertion order.
///
/// The product is order-independent; order is kept for inspection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifiers(Vec<(String, f64)>);

impl Modifiers {
    /// No modifiers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a multiplier, replacing any previous value for the same reason.
    pub fn set(&mut self, reason: impl Into<String>, multiplier: f64) {
        let reason = reason.into();
        match self.0.iter_mut().find(|(r, _)| *r == reason) {
            Some(entry) => entry.1 = multiplier,
            None => self.0.push((reason, multiplier)),
        }
    }

    /// Multiplier for a reason.
    pub fn get(&self, reason: &str) -> Option<f64> {
        self.0.iter().find(|(r, _)| r == reason).map(|(_, m)| *m)
    }

    /// Product of all multipliers, 1.0 when empty.
    pub fn product(&self) -> f64 {
        self.0.iter().map(|(_, m)| m).product()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(r, m)| (r.as_str(), *m))
    }

    /// Number of modifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if nothing scales this tick.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn check_multiplier(reason: &str, value: f64) -> Result<(), CombatError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CombatError::InvalidMultiplier { reason: reason.to_string(), value })
    }
}

// =============================================================================
// DAMAGE TICK
// =============================================================================

/// One recorded instance of harm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageTick {
    /// Unscaled damage
    pub base: f64,
    /// Kind of harm
    pub cause: DamageCause,
    /// Credited source
    pub source: DamageSource,
    /// Free-text detail, e.g. weapon name
    pub reason: String,
    /// When the hit landed (refreshed on merge)
    pub timestamp: GameInstant,
    /// Damage multipliers
    pub damage_modifiers: Modifiers,
    /// Where knockback pushes away from
    pub knockback_origin: Option<Position>,
    /// Knockback multipliers
    pub knockback_modifiers: Modifiers,
}

impl DamageTick {
    /// Create a tick, rejecting negative or non-finite damage.
    pub fn new(
        base: f64,
        cause: DamageCause,
        source: DamageSource,
        reason: impl Into<String>,
        timestamp: GameInstant,
    ) -> Result<Self, CombatError> {
        if !base.is_finite() {
            return Err(CombatError::NonFiniteDamage);
        }
        if base < 0.0 {
            return Err(CombatError::NegativeDamage(base));
        }
        Ok(Self {
            base,
            cause,
            source,
            reason: reason.into(),
            timestamp,
            damage_modifiers: Modifiers::new(),
            knockback_origin: None,
            knockback_modifiers: Modifiers::new(),
        })
    }

    /// Add a damage multiplier.
    pub fn with_modifier(mut self, reason: &str, multiplier: f64) -> Result<Self, CombatError> {
        self.add_modifier(reason, multiplier)?;
        Ok(self)
    }

    /// Add a damage multiplier in place.
    pub fn add_modifier(&mut self, reason: &str, multiplier: f64) -> Result<(), CombatError> {
        check_multiplier(reason, multiplier)?;
        self.damage_modifiers.set(reason, multiplier);
        Ok(())
    }

    /// Set where knockback originates.
    pub fn with_knockback(mut self, origin: Position) -> Self {
        self.knockback_origin = Some(origin);
        self
    }

    /// Add a knockback multiplier.
    pub fn with_knockback_modifier(mut self, reason: &str, multiplier: f64) -> Result<Self, CombatError> {
        check_multiplier(reason, multiplier)?;
        self.knockback_modifiers.set(reason, multiplier);
        Ok(self)
    }

    /// Base damage times every damage multiplier.
    #[inline]
    pub fn effective_damage(&self) -> f64 {
        self.base * self.damage_modifiers.product()
    }

    /// Product of knockback multipliers.
    #[inline]
    pub fn knockback_multiplier(&self) -> f64 {
        self.knockback_modifiers.product()
    }

    /// Actor credited with this tick.
    #[inline]
    pub fn attacker(&self) -> Option<ActorId> {
        self.source.attacker()
    }

    /// Whether this tick continues `existing` rather than starting a new entry.
    ///
    /// True when both come from the same source with the same continuous
    /// cause and this tick lands within `merge_window` of the existing one.
    pub fn matches(&self, existing: &DamageTick, merge_window: std::time::Duration) -> bool {
        self.cause.is_continuous()
            && self.cause == existing.cause
            && self.source == existing.source
            && self.timestamp >= existing.timestamp
            && self.timestamp.saturating_since(existing.timestamp) <= merge_window
    }

    /// Fold this tick into `existing`.
    ///
    /// The new effective damage is added to the existing base, rescaled by
    /// the existing modifiers, so the entry's effective damage becomes the
    /// sum of both. Timestamp and knockback origin take the newer values.
    pub fn merge_into(self, existing: &mut DamageTick) {
        let added = self.effective_damage();
        let scale = existing.damage_modifiers.product();
        if scale > 0.0 {
            existing.base += added / scale;
        } else {
            // A zeroed entry would swallow the hit; restart it from this tick
            existing.base = self.base;
            existing.damage_modifiers = self.damage_modifiers;
        }
        existing.timestamp = self.timestamp;
        if self.knockback_origin.is_some() {
            existing.knockback_origin = self.knockback_origin;
        }
        for (reason, multiplier) in self.knockback_modifiers.iter() {
            existing.knockback_modifiers.set(reason, multiplier);
        }
    }
}

impl fmt::Display for DamageTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} {}", self.effective_damage(), self.cause.label())
    }
}
