//! Concrete Phases
//!
//! Lobby, in-game and ended. The lobby waits for enough actors and counts
//! down, the in-game phase runs the schedule until one side is left or time
//! runs out, and the ended phase announces the result.

use tracing::info;

use crate::core::time::{format_countdown, GameInstant};
use crate::game::context::MatchContext;
use crate::game::events::GameEvent;
use crate::game::phase::{
    default_game_scoreboard, EventInterest, GamePhase, ListenerProvider, PhaseEvent, Scoreboard,
};
use crate::game::roster::ActorId;
use crate::game::schedule::{MatchSchedule, ScheduledAction};
use crate::game::world::EffectSink;

// =============================================================================
// LOBBY
// =============================================================================

/// Waiting for actors, then counting down.
#[derive(Debug, Default)]
pub struct LobbyPhase {
    countdown_started: Option<GameInstant>,
}

impl LobbyPhase {
    /// Fresh lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// When the countdown began, if it is running.
    pub fn countdown_started(&self) -> Option<GameInstant> {
        self.countdown_started
    }

    // Spectators do not count towards the player minimum
    fn refresh_countdown(&mut self, ctx: &MatchContext, now: GameInstant) {
        let players = ctx.roster.alive_count();
        let enough = players >= ctx.config.rules.min_players;
        match (enough, self.countdown_started) {
            (true, None) => {
                info!(players, "Lobby countdown started");
                self.countdown_started = Some(now);
            }
            (false, Some(_)) => {
                info!(players, "Lobby countdown cancelled");
                self.countdown_started = None;
            }
            _ => {}
        }
    }
}

impl ListenerProvider for LobbyPhase {
    fn interests(&self) -> Vec<EventInterest> {
        vec![EventInterest::ActorJoined, EventInterest::ActorLeft]
    }
}

impl GamePhase for LobbyPhase {
    fn name(&self) -> &'static str {
        "Lobby"
    }

    fn listener_provider(&self) -> Option<&dyn ListenerProvider> {
        Some(self)
    }

    fn tick(
        &mut self,
        ctx: &mut MatchContext,
        now: GameInstant,
        _effects: &mut dyn EffectSink,
    ) -> Option<Box<dyn GamePhase>> {
        self.refresh_countdown(ctx, now);
        let started = self.countdown_started?;
        if now.saturating_since(started) >= ctx.config.rules.lobby_countdown() {
            Some(Box::new(InGamePhase::new()))
        } else {
            None
        }
    }

    fn on_event(&mut self, ctx: &mut MatchContext, event: &PhaseEvent, now: GameInstant) {
        if matches!(event, PhaseEvent::ActorJoined(_) | PhaseEvent::ActorLeft(_)) {
            self.refresh_countdown(ctx, now);
        }
    }

    fn scoreboard(&self, ctx: &MatchContext, actor: ActorId, now: GameInstant) -> Option<Scoreboard> {
        let rules = &ctx.config.rules;
        let headline = match self.countdown_started {
            Some(started) => {
                let ends = started + rules.lobby_countdown();
                let time = format_countdown(now.saturating_until(ends));
                ctx.translate(actor, "scoreboard.starting", &[("time", time)])
            }
            None => ctx.translate(actor, "scoreboard.waiting", &[]),
        };
        let players = ctx.translate(
            actor,
            "scoreboard.players",
            &[
                ("count", ctx.roster.alive_count().to_string()),
                ("needed", rules.min_players.to_string()),
            ],
        );
        Some(Scoreboard(vec![headline, String::new(), players]))
    }
}

// =============================================================================
// IN GAME
// =============================================================================

/// The fight itself.
#[derive(Debug, Default)]
pub struct InGamePhase {
    eliminations: u32,
}

impl InGamePhase {
    /// Fresh in-game phase; the schedule is built on enable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deaths seen while this phase was active.
    pub fn eliminations(&self) -> u32 {
        self.eliminations
    }
}

impl ListenerProvider for InGamePhase {
    fn interests(&self) -> Vec<EventInterest> {
        vec![EventInterest::ActorDeath]
    }
}

impl GamePhase for InGamePhase {
    fn name(&self) -> &'static str {
        "InGame"
    }

    fn listener_provider(&self) -> Option<&dyn ListenerProvider> {
        Some(self)
    }

    fn on_enable(&mut self, ctx: &mut MatchContext, now: GameInstant, _effects: &mut dyn EffectSink) {
        ctx.schedule = MatchSchedule::from_rules(&ctx.config.rules, now);
        info!(events = ctx.schedule.pending().len(), "Match schedule built");
    }

    fn on_disable(&mut self, ctx: &mut MatchContext, _now: GameInstant) {
        ctx.hazards.deactivate_all();
    }

    fn tick(
        &mut self,
        ctx: &mut MatchContext,
        now: GameInstant,
        effects: &mut dyn EffectSink,
    ) -> Option<Box<dyn GamePhase>> {
        let mut time_up = false;
        for event in ctx.schedule.take_due(now) {
            match event.action {
                ScheduledAction::ActivateHazard(kind) => {
                    ctx.activate_hazard(kind, now, effects);
                }
                ScheduledAction::ShrinkBorder(by) => {
                    ctx.shrink_bounds(by);
                }
                ScheduledAction::EndMatch => time_up = true,
            }
        }

        if time_up || ctx.roster.surviving_sides() <= 1 {
            info!(time_up, survivors = ctx.roster.alive_count(), "Match over");
            return Some(Box::new(EndedPhase::new()));
        }
        None
    }

    fn on_event(&mut self, _ctx: &mut MatchContext, event: &PhaseEvent, _now: GameInstant) {
        if let PhaseEvent::ActorDeath(_) = event {
            self.eliminations += 1;
        }
    }

    fn scoreboard(&self, ctx: &MatchContext, actor: ActorId, now: GameInstant) -> Option<Scoreboard> {
        Some(default_game_scoreboard(ctx, actor, now))
    }
}

// =============================================================================
// ENDED
// =============================================================================

/// Match finished. Shows no board of its own, so the final in-game board
/// stays up.
#[derive(Debug, Default)]
pub struct EndedPhase {
    winner: Option<ActorId>,
    winning_team: Option<String>,
}

impl EndedPhase {
    /// Ended phase; the result is decided on enable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last actor standing, if exactly one.
    pub fn winner(&self) -> Option<ActorId> {
        self.winner
    }

    /// Winning team in team play.
    pub fn winning_team(&self) -> Option<&str> {
        self.winning_team.as_deref()
    }
}

impl GamePhase for EndedPhase {
    fn name(&self) -> &'static str {
        "Ended"
    }

    fn on_enable(&mut self, ctx: &mut MatchContext, now: GameInstant, effects: &mut dyn EffectSink) {
        let survivors: Vec<_> = ctx.roster.iter().filter(|a| a.is_active()).collect();

        if ctx.roster.surviving_sides() == 1 {
            if let [only] = survivors.as_slice() {
                self.winner = Some(only.id);
            }
            if ctx.mode().is_team_based() {
                self.winning_team = survivors.first().and_then(|a| a.team.clone());
            }
        }

        let winner_name = self
            .winning_team
            .clone()
            .or_else(|| self.winner.map(|id| ctx.roster.name_of(&id)));
        let announcement = match winner_name {
            Some(name) => ctx.translate(ActorId::default(), "announce.winner", &[("winner", name)]),
            None => ctx.translate(ActorId::default(), "announce.draw", &[]),
        };
        info!(winner = ?self.winner.map(|id| id.to_string()), team = ?self.winning_team, "Match ended");
        effects.broadcast(&announcement);
        ctx.push_event(GameEvent::match_ended(now, self.winner, self.winning_team.clone()));
    }

    fn tick(
        &mut self,
        _ctx: &mut MatchContext,
        _now: GameInstant,
        _effects: &mut dyn EffectSink,
    ) -> Option<Box<dyn GamePhase>> {
        None
    }
}
