//! Match Tick
//!
//! The per-tick pipeline and the entry points for damage reported by the
//! host. One controller owns one match; the host calls [`MatchController::tick`]
//! at a fixed cadence and forwards joins, leaves and damage between ticks.

use tracing::{debug, info};

use crate::config::{ConfigError, GameConfig};
use crate::core::geom::Bounds;
use crate::core::time::GameInstant;
use crate::game::attribution::{attribute_kill, KillCredit};
use crate::game::context::MatchContext;
use crate::game::damage::{CombatError, DamageCause, DamageSource, DamageTick};
use crate::game::events::{GameEvent, GameEventData};
use crate::game::hazard::{HazardScene, StrikeReport, SPELL_AMPLIFIER};
use crate::game::phase::{PhaseError, PhaseEvent, PhaseMachine, Scoreboard};
use crate::game::phases::LobbyPhase;
use crate::game::roster::{ActorId, ActorState};
use crate::game::world::{EffectSink, StatKey, WorldQuery};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, sorted
    pub events: Vec<GameEvent>,
    /// Hazard strikes this tick
    pub strikes: Vec<StrikeReport>,
    /// Deaths resolved this tick
    pub kills: Vec<KillCredit>,
    /// Whether the match ended this tick
    pub match_ended: bool,
}

/// Owns and drives one match.
#[derive(Debug)]
pub struct MatchController {
    ctx: MatchContext,
    machine: PhaseMachine,
}

impl MatchController {
    /// Create a match over `bounds`. No phase runs until [`start`](Self::start).
    pub fn new(config: GameConfig, bounds: Bounds, match_seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            ctx: MatchContext::new(config, bounds, match_seed)?,
            machine: PhaseMachine::new(),
        })
    }

    /// Install the lobby.
    pub fn start(&mut self, now: GameInstant, effects: &mut dyn EffectSink) {
        info!(seed = self.ctx.match_seed, "Match created");
        self.machine.install(Box::new(LobbyPhase::new()), &mut self.ctx, now, effects);
    }

    /// Match state.
    pub fn context(&self) -> &MatchContext {
        &self.ctx
    }

    /// Match state, mutably (host-side position updates and the like).
    pub fn context_mut(&mut self) -> &mut MatchContext {
        &mut self.ctx
    }

    /// Name of the active phase.
    pub fn phase_name(&self) -> Result<&'static str, PhaseError> {
        self.machine.active_name()
    }

    /// Phase machine.
    pub fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    /// Add an actor and tell the active phase.
    pub fn join(&mut self, actor: ActorState, now: GameInstant) {
        let id = actor.id;
        info!(actor = %id, name = %actor.name, "Actor joined");
        self.ctx.roster.insert(actor);
        self.machine.dispatch(&mut self.ctx, &PhaseEvent::ActorJoined(id), now);
    }

    /// Remove an actor and forget its damage history.
    pub fn leave(&mut self, id: ActorId, now: GameInstant) -> Option<ActorState> {
        let removed = self.ctx.roster.remove(&id)?;
        self.ctx.ledger.clear(&id);
        info!(actor = %id, "Actor left");
        self.machine.dispatch(&mut self.ctx, &PhaseEvent::ActorLeft(id), now);
        Some(removed)
    }

    /// Scoreboard for `actor`, with delegation to earlier phases.
    pub fn scoreboard(&self, actor: ActorId, now: GameInstant) -> Option<Scoreboard> {
        self.machine.scoreboard_for(&self.ctx, actor, now)
    }

    /// Combat log lines for `victim`.
    pub fn combat_log(&self, victim: ActorId, now: GameInstant) -> Vec<String> {
        self.ctx.ledger.combat_log(&victim, now, &self.ctx.roster)
    }

    /// Apply damage reported by the host.
    ///
    /// Spell ticks carry their element tag in `reason` and pick up one
    /// `hazard:<name>` modifier per running hazard that amplifies it.
    /// Returns the kill credit if the victim died. Damage against an actor
    /// that is not fighting is ignored.
    pub fn damage(
        &mut self,
        victim: ActorId,
        mut tick: DamageTick,
        effects: &mut dyn EffectSink,
    ) -> Result<Option<KillCredit>, CombatError> {
        let fighting = self.ctx.roster.get(&victim).is_some_and(ActorState::is_active);
        if !fighting {
            debug!(victim = %victim, "Ignored damage on inactive actor");
            return Ok(None);
        }

        if let DamageSource::Spell { .. } = tick.source {
            for kind in self.ctx.hazards.amplifiers(&tick.reason) {
                tick.add_modifier(&format!("hazard:{}", kind.name()), SPELL_AMPLIFIER)?;
            }
        }

        let now = tick.timestamp;
        effects.apply_damage(victim, &tick);
        let died = self.apply_health(victim, &tick);
        self.ctx.ledger.record(victim, tick);

        if died {
            Ok(self.handle_death(victim, now, effects))
        } else {
            Ok(None)
        }
    }

    /// Run one tick: hazards, then deaths, then the active phase.
    pub fn tick(
        &mut self,
        now: GameInstant,
        world: &dyn WorldQuery,
        effects: &mut dyn EffectSink,
    ) -> Result<TickResult, PhaseError> {
        let mut result = TickResult::default();

        // 1. Hazards
        let scene = HazardScene {
            world,
            roster: &self.ctx.roster,
            bounds: self.ctx.bounds,
            initial_bounds: self.ctx.initial_bounds,
        };
        let strikes = self.ctx.hazards.update_all(now, scene, &mut self.ctx.ledger, effects);

        let mut dying = Vec::new();
        for strike in &strikes {
            self.ctx.push_event(GameEvent::hazard_strike(now, strike.kind, strike.location, strike.hits.len()));
            for (victim, tick) in &strike.hits {
                if self.apply_health(*victim, tick) {
                    dying.push(*victim);
                }
            }
        }
        result.strikes = strikes;

        // 2. Deaths
        for victim in dying {
            if let Some(credit) = self.handle_death(victim, now, effects) {
                result.kills.push(credit);
            }
        }
        self.ctx.ledger.prune(now);

        // 3. Phase
        self.machine.tick(&mut self.ctx, now, effects)?;

        let mut events = self.ctx.take_events();
        events.sort();
        result.match_ended = events
            .iter()
            .any(|e| matches!(e.data, GameEventData::MatchEnded { .. }));
        result.events = events;
        Ok(result)
    }

    /// Subtract health and book stats. True if the actor just dropped to zero.
    fn apply_health(&mut self, victim: ActorId, tick: &DamageTick) -> bool {
        let amount = tick.effective_damage();
        let Some(actor) = self.ctx.roster.get_mut(&victim) else {
            return false;
        };
        if !actor.is_active() {
            return false;
        }
        actor.health = (actor.health - amount).max(0.0);
        let health_left = actor.health;

        self.ctx.stats.add(victim, StatKey::DamageTaken, amount);
        if let Some(attacker) = tick.attacker().filter(|a| *a != victim) {
            self.ctx.stats.add(attacker, StatKey::DamageDealt, amount);
        }
        self.ctx.push_event(GameEvent::actor_damaged(
            tick.timestamp,
            victim,
            tick.attacker(),
            tick.cause,
            amount,
            health_left,
        ));
        health_left <= 0.0
    }

    /// Credit a death, update stats, announce it and notify the phase.
    fn handle_death(&mut self, victim: ActorId, now: GameInstant, effects: &mut dyn EffectSink) -> Option<KillCredit> {
        let snapshot = self.ctx.roster.get(&victim)?.snapshot();

        let (killer, assists) = attribute_kill(&self.ctx.ledger, victim, now);
        let message = self.ctx.resolver.resolve(
            &snapshot,
            self.ctx.ledger.ticks(&victim),
            &self.ctx.roster,
            &mut self.ctx.rng,
        );
        for line in self.ctx.ledger.combat_log(&victim, now, &self.ctx.roster) {
            debug!(victim = %victim, "{line}");
        }

        if !self.ctx.roster.eliminate(&victim) {
            return None;
        }
        self.ctx.eliminated.push(victim);
        self.ctx.ledger.clear(&victim);

        self.ctx.stats.increment(victim, StatKey::Deaths);
        if let Some(killer) = killer {
            self.ctx.stats.increment(killer, StatKey::Kills);
        }
        for assist in &assists {
            self.ctx.stats.increment(assist.attacker, StatKey::Assists);
        }

        info!(
            victim = %victim,
            killer = ?killer.map(|k| k.to_string()),
            assists = assists.len(),
            "Actor eliminated"
        );
        effects.broadcast(&message);

        let credit = KillCredit {
            victim,
            killer,
            assists,
            message,
        };
        self.ctx.push_event(GameEvent::actor_eliminated(
            now,
            victim,
            credit.killer,
            credit.assists.clone(),
            credit.message.clone(),
        ));
        self.machine
            .dispatch(&mut self.ctx, &PhaseEvent::ActorDeath(credit.clone()), now);
        Some(credit)
    }
}

/// Convenience for hosts: a melee hit from one actor on another.
pub fn melee_hit(attacker: ActorId, base: f64, weapon: &str, at: GameInstant) -> Result<DamageTick, CombatError> {
    DamageTick::new(base, DamageCause::Melee, DamageSource::Player(attacker), weapon, at)
}
