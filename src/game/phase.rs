//! Match Phases
//!
//! A match is a line of phases. The machine installs one phase at a time,
//! keeps every earlier phase in its history and resolves scoreboards by
//! delegation:
//!
//! ```text
//! history: [Lobby] [InGame] ─── active: [Ended]
//!                     ▲                    │ no scoreboard
//!                     └────────────────────┘ newest earlier phase with one
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Deserialize};
use tracing::info;

use crate::core::time::{format_countdown, GameInstant};
use crate::game::attribution::KillCredit;
use crate::game::context::MatchContext;
use crate::game::events::GameEvent;
use crate::game::roster::ActorId;
use crate::game::world::{EffectSink, StatKey, Stats};

/// Phase machine errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhaseError {
    /// Nothing has been installed yet.
    #[error("no phase is active")]
    NoActivePhase,
}

// =============================================================================
// LISTENERS
// =============================================================================

/// Match events a phase can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventInterest {
    /// An actor joined
    ActorJoined,
    /// An actor left
    ActorLeft,
    /// An actor was eliminated
    ActorDeath,
}

/// A match event delivered to subscribed phases.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseEvent {
    /// An actor joined
    ActorJoined(ActorId),
    /// An actor left
    ActorLeft(ActorId),
    /// An actor was eliminated
    ActorDeath(KillCredit),
}

impl PhaseEvent {
    /// Interest that receives this event.
    pub fn interest(&self) -> EventInterest {
        match self {
            PhaseEvent::ActorJoined(_) => EventInterest::ActorJoined,
            PhaseEvent::ActorLeft(_) => EventInterest::ActorLeft,
            PhaseEvent::ActorDeath(_) => EventInterest::ActorDeath,
        }
    }
}

/// Capability a phase exposes to receive events while active.
pub trait ListenerProvider {
    /// Events this provider wants.
    fn interests(&self) -> Vec<EventInterest>;
}

/// Which phases are subscribed to which events.
#[derive(Clone, Debug, Default)]
pub struct ListenerRegistry {
    subscriptions: BTreeMap<EventInterest, BTreeSet<String>>,
}

impl ListenerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `owner` to every interest of `provider`.
    pub fn activate(&mut self, owner: &str, provider: &dyn ListenerProvider) {
        for interest in provider.interests() {
            self.subscriptions
                .entry(interest)
                .or_default()
                .insert(owner.to_string());
        }
    }

    /// Remove every subscription held by `owner`.
    pub fn deactivate(&mut self, owner: &str) {
        for owners in self.subscriptions.values_mut() {
            owners.remove(owner);
        }
        self.subscriptions.retain(|_, owners| !owners.is_empty());
    }

    /// Whether `owner` receives `interest`.
    pub fn is_subscribed(&self, owner: &str, interest: EventInterest) -> bool {
        self.subscriptions
            .get(&interest)
            .is_some_and(|owners| owners.contains(owner))
    }

    /// Total number of subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.values().map(BTreeSet::len).sum()
    }

    /// No subscriptions at all.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

// =============================================================================
// SCOREBOARD
// =============================================================================

/// Lines of a sidebar scoreboard, top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard(pub Vec<String>);

impl Scoreboard {
    /// Scoreboard lines.
    pub fn lines(&self) -> &[String] {
        &self.0
    }
}

/// Standard in-match scoreboard for `actor`.
///
/// Next event with countdown, the actor's team in team play, alive count,
/// then the actor's kills and assists.
pub fn default_game_scoreboard(ctx: &MatchContext, actor: ActorId, now: GameInstant) -> Scoreboard {
    let mut lines = Vec::new();

    match ctx.schedule.next_pending() {
        Some(next) => {
            let event = ctx.translate(actor, &next.key, &[]);
            let time = format_countdown(now.saturating_until(next.at));
            lines.push(ctx.translate(actor, "scoreboard.next_event", &[("event", event), ("time", time)]));
        }
        None => lines.push(ctx.translate(actor, "scoreboard.no_event", &[])),
    }
    lines.push(String::new());

    if ctx.mode().is_team_based() {
        lines.push(ctx.translate(actor, "scoreboard.teammate", &[]));
        let team = ctx
            .roster
            .get(&actor)
            .and_then(|a| a.team.clone())
            .unwrap_or_else(|| "-".to_string());
        lines.push(team);
        lines.push(String::new());
    }

    let alive = ctx.roster.alive_count().to_string();
    lines.push(ctx.translate(actor, "scoreboard.alive", &[("count", alive)]));
    lines.push(String::new());

    let kills = ctx.stats.get_stat(actor, StatKey::Kills);
    let assists = ctx.stats.get_stat(actor, StatKey::Assists);
    lines.push(ctx.translate(actor, "scoreboard.kills", &[("count", format!("{kills}"))]));
    lines.push(ctx.translate(actor, "scoreboard.assists", &[("count", format!("{assists}"))]));

    Scoreboard(lines)
}

// =============================================================================
// PHASE TRAIT
// =============================================================================

/// One stage of a match.
///
/// Start time and listener registration are handled by [`PhaseMachine`];
/// the hooks here are for phase-specific work.
pub trait GamePhase: fmt::Debug {
    /// Short name for logs and events.
    fn name(&self) -> &'static str;

    /// Event capability, if the phase listens to anything.
    fn listener_provider(&self) -> Option<&dyn ListenerProvider> {
        None
    }

    /// Called once when installed.
    fn on_enable(&mut self, _ctx: &mut MatchContext, _now: GameInstant, _effects: &mut dyn EffectSink) {}

    /// Called once when replaced.
    fn on_disable(&mut self, _ctx: &mut MatchContext, _now: GameInstant) {}

    /// Per-tick bookkeeping. Returning a phase replaces this one.
    fn tick(
        &mut self,
        ctx: &mut MatchContext,
        now: GameInstant,
        effects: &mut dyn EffectSink,
    ) -> Option<Box<dyn GamePhase>>;

    /// A subscribed event arrived.
    fn on_event(&mut self, _ctx: &mut MatchContext, _event: &PhaseEvent, _now: GameInstant) {}

    /// Own scoreboard content, or `None` to delegate to earlier phases.
    fn scoreboard(&self, _ctx: &MatchContext, _actor: ActorId, _now: GameInstant) -> Option<Scoreboard> {
        None
    }
}

#[derive(Debug)]
struct PhaseSlot {
    phase: Box<dyn GamePhase>,
    started_at: GameInstant,
}

/// Active phase plus every phase that came before it.
#[derive(Debug, Default)]
pub struct PhaseMachine {
    active: Option<PhaseSlot>,
    history: Vec<PhaseSlot>,
    listeners: ListenerRegistry,
}

impl PhaseMachine {
    /// Machine with no phase installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active phase.
    ///
    /// The old phase is disabled and moved to history. The new phase gets
    /// its start time and listener subscriptions before its own hook runs.
    pub fn install(
        &mut self,
        mut phase: Box<dyn GamePhase>,
        ctx: &mut MatchContext,
        now: GameInstant,
        effects: &mut dyn EffectSink,
    ) {
        let old_name = match self.active.take() {
            Some(mut old) => {
                old.phase.on_disable(ctx, now);
                self.listeners.deactivate(old.phase.name());
                let name = old.phase.name();
                self.history.push(old);
                Some(name)
            }
            None => None,
        };

        if let Some(provider) = phase.listener_provider() {
            self.listeners.activate(phase.name(), provider);
        }
        phase.on_enable(ctx, now, effects);

        info!(from = old_name.unwrap_or("none"), to = phase.name(), at = %now, "Phase changed");
        ctx.push_event(GameEvent::phase_changed(now, old_name.unwrap_or("none"), phase.name()));
        self.active = Some(PhaseSlot { phase, started_at: now });
    }

    /// Run the active phase's tick and apply any transition it asks for.
    pub fn tick(
        &mut self,
        ctx: &mut MatchContext,
        now: GameInstant,
        effects: &mut dyn EffectSink,
    ) -> Result<(), PhaseError> {
        let slot = self.active.as_mut().ok_or(PhaseError::NoActivePhase)?;
        if let Some(next) = slot.phase.tick(ctx, now, effects) {
            self.install(next, ctx, now, effects);
        }
        Ok(())
    }

    /// Deliver an event to the active phase if it subscribed to it.
    ///
    /// Returns whether the event was delivered.
    pub fn dispatch(&mut self, ctx: &mut MatchContext, event: &PhaseEvent, now: GameInstant) -> bool {
        let Some(slot) = self.active.as_mut() else {
            return false;
        };
        if !self.listeners.is_subscribed(slot.phase.name(), event.interest()) {
            return false;
        }
        slot.phase.on_event(ctx, event, now);
        true
    }

    /// Scoreboard for `actor`, delegating backwards through history.
    ///
    /// The active phase is asked first, then earlier phases newest first.
    /// `None` if no phase has anything to show.
    pub fn scoreboard_for(&self, ctx: &MatchContext, actor: ActorId, now: GameInstant) -> Option<Scoreboard> {
        self.active
            .iter()
            .chain(self.history.iter().rev())
            .find_map(|slot| slot.phase.scoreboard(ctx, actor, now))
    }

    /// Name of the active phase.
    pub fn active_name(&self) -> Result<&'static str, PhaseError> {
        self.active
            .as_ref()
            .map(|slot| slot.phase.name())
            .ok_or(PhaseError::NoActivePhase)
    }

    /// When the active phase was installed.
    pub fn started_at(&self) -> Result<GameInstant, PhaseError> {
        self.active
            .as_ref()
            .map(|slot| slot.started_at)
            .ok_or(PhaseError::NoActivePhase)
    }

    /// Names of earlier phases, oldest first.
    pub fn history(&self) -> Vec<&'static str> {
        self.history.iter().map(|slot| slot.phase.name()).collect()
    }

    /// Current subscriptions.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::core::geom::{Bounds, Position};
    use crate::game::roster::{ActorState, MatchMode};
    use crate::game::schedule::{ScheduledAction, ScheduledEvent};
    use crate::game::world::RecordingEffects;

    const ARENA: Bounds = Bounds::new(-20, 20, -20, 20, 0, 128);
    const ALICE: ActorId = ActorId::new([1; 16]);

    fn ctx() -> MatchContext {
        MatchContext::new(GameConfig::default(), ARENA, 9).unwrap()
    }

    /// Test phase with fixed content and optional listening.
    #[derive(Debug)]
    struct Fixed {
        name: &'static str,
        content: Option<&'static str>,
        listens: bool,
        seen: usize,
    }

    impl Fixed {
        fn boxed(name: &'static str, content: Option<&'static str>) -> Box<dyn GamePhase> {
            Box::new(Self { name, content, listens: false, seen: 0 })
        }
    }

    impl ListenerProvider for Fixed {
        fn interests(&self) -> Vec<EventInterest> {
            vec![EventInterest::ActorJoined, EventInterest::ActorDeath]
        }
    }

    impl GamePhase for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn listener_provider(&self) -> Option<&dyn ListenerProvider> {
            if self.listens {
                Some(self)
            } else {
                None
            }
        }

        fn tick(&mut self, _: &mut MatchContext, _: GameInstant, _: &mut dyn EffectSink) -> Option<Box<dyn GamePhase>> {
            None
        }

        fn on_event(&mut self, _: &mut MatchContext, _: &PhaseEvent, _: GameInstant) {
            self.seen += 1;
        }

        fn scoreboard(&self, _: &MatchContext, _: ActorId, _: GameInstant) -> Option<Scoreboard> {
            self.content.map(|c| Scoreboard(vec![c.to_string()]))
        }
    }

    #[test]
    fn test_scoreboard_delegates_to_newest_earlier_phase() {
        let mut ctx = ctx();
        let mut fx = RecordingEffects::new();
        let mut machine = PhaseMachine::new();
        let t = GameInstant::ZERO;

        machine.install(Fixed::boxed("P1", None), &mut ctx, t, &mut fx);
        machine.install(Fixed::boxed("P2", Some("X")), &mut ctx, t, &mut fx);
        machine.install(Fixed::boxed("P3", None), &mut ctx, t, &mut fx);

        let board = machine.scoreboard_for(&ctx, ALICE, t);
        assert_eq!(board, Some(Scoreboard(vec!["X".to_string()])));
        assert_eq!(machine.history(), vec!["P1", "P2"]);
    }

    #[test]
    fn test_scoreboard_empty_history_is_none() {
        let mut ctx = ctx();
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.scoreboard_for(&ctx, ALICE, GameInstant::ZERO), None);

        machine.install(Fixed::boxed("P1", None), &mut ctx, GameInstant::ZERO, &mut RecordingEffects::new());
        assert_eq!(machine.scoreboard_for(&ctx, ALICE, GameInstant::ZERO), None);
    }

    #[test]
    fn test_active_content_wins() {
        let mut ctx = ctx();
        let mut fx = RecordingEffects::new();
        let mut machine = PhaseMachine::new();
        machine.install(Fixed::boxed("P1", Some("old")), &mut ctx, GameInstant::ZERO, &mut fx);
        machine.install(Fixed::boxed("P2", Some("new")), &mut ctx, GameInstant::ZERO, &mut fx);
        let board = machine.scoreboard_for(&ctx, ALICE, GameInstant::ZERO).unwrap();
        assert_eq!(board.lines(), ["new".to_string()]);
    }

    #[test]
    fn test_listener_lifecycle() {
        let mut ctx = ctx();
        let mut fx = RecordingEffects::new();
        let mut machine = PhaseMachine::new();
        let listening = Box::new(Fixed { name: "Listen", content: None, listens: true, seen: 0 });

        machine.install(listening, &mut ctx, GameInstant::from_millis(5), &mut fx);
        assert!(machine.listeners().is_subscribed("Listen", EventInterest::ActorJoined));
        assert!(!machine.listeners().is_subscribed("Listen", EventInterest::ActorLeft));
        assert_eq!(machine.started_at(), Ok(GameInstant::from_millis(5)));

        assert!(machine.dispatch(&mut ctx, &PhaseEvent::ActorJoined(ALICE), GameInstant::ZERO));
        assert!(!machine.dispatch(&mut ctx, &PhaseEvent::ActorLeft(ALICE), GameInstant::ZERO));

        machine.install(Fixed::boxed("Quiet", None), &mut ctx, GameInstant::from_millis(9), &mut fx);
        assert!(machine.listeners().is_empty());
        assert!(!machine.dispatch(&mut ctx, &PhaseEvent::ActorJoined(ALICE), GameInstant::ZERO));
    }

    #[test]
    fn test_no_active_phase() {
        let mut ctx = ctx();
        let mut machine = PhaseMachine::new();
        assert_eq!(machine.active_name(), Err(PhaseError::NoActivePhase));
        let result = machine.tick(&mut ctx, GameInstant::ZERO, &mut RecordingEffects::new());
        assert_eq!(result, Err(PhaseError::NoActivePhase));
    }

    #[test]
    fn test_install_emits_phase_changed() {
        let mut ctx = ctx();
        let mut machine = PhaseMachine::new();
        machine.install(Fixed::boxed("P1", None), &mut ctx, GameInstant::ZERO, &mut RecordingEffects::new());
        let events = ctx.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].data,
            crate::game::events::GameEventData::PhaseChanged { new_phase, .. } if new_phase == "P1"
        ));
    }

    #[test]
    fn test_default_scoreboard_layout() {
        let mut ctx = ctx();
        ctx.roster.insert(ActorState::new(ALICE, "Alice", Position::default()));
        ctx.stats.add(ALICE, StatKey::Kills, 2.0);
        ctx.schedule.push(ScheduledEvent {
            at: GameInstant::from_millis(65_000),
            key: "event.border_shrink".into(),
            action: ScheduledAction::ShrinkBorder(4),
        });

        let board = default_game_scoreboard(&ctx, ALICE, GameInstant::from_millis(1_000));
        assert_eq!(board.lines(), [
            "Border Shrink: 01:04",
            "",
            "Alive: 1",
            "",
            "Kills: 2",
            "Assists: 0",
        ].map(String::from));
    }

    #[test]
    fn test_default_scoreboard_team_and_elapsed_countdown() {
        let mut config = GameConfig::default();
        config.rules.mode = MatchMode::Teams;
        let mut ctx = MatchContext::new(config, ARENA, 1).unwrap();
        ctx.roster.insert(ActorState::new(ALICE, "Alice", Position::default()).with_team("Red"));
        ctx.schedule.push(ScheduledEvent {
            at: GameInstant::from_millis(500),
            key: "event.match_end".into(),
            action: ScheduledAction::EndMatch,
        });

        let board = default_game_scoreboard(&ctx, ALICE, GameInstant::from_millis(9_000));
        assert_eq!(board.lines()[0], "Match End: 00:00");
        assert_eq!(board.lines()[2], "Team:");
        assert_eq!(board.lines()[3], "Red");
    }
}
