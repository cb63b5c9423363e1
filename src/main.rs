//! Hazard Royale Server
//!
//! Runs a demo match on a generated heightmap: actors trade blows while
//! the scheduled hazards close in, and every kill, strike and phase change
//! is logged.

use std::time::Duration;

use anyhow::Context as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hazard_royale::{
    GameConfig, GameInstant, TICK_DURATION_MS, TICK_RATE, VERSION,
    core::{geom::{Bounds, Position}, rng::DeterministicRng, time::{Clock, ManualClock}},
    game::{
        damage::{DamageCause, DamageSource, DamageTick},
        events::GameEventData,
        roster::{ActorId, ActorState},
        tick::{melee_hit, MatchController},
        world::{HeightmapWorld, RecordingEffects},
    },
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Hazard Royale Server v{}", VERSION);
    info!("Tick Rate: {} Hz ({} ms per tick)", TICK_RATE, TICK_DURATION_MS);

    // Demo: Run a test match
    demo_match()
}

/// Demo function to exercise the full pipeline.
fn demo_match() -> anyhow::Result<()> {
    info!("=== Starting Demo Match ===");

    let match_seed = 12345u64;
    let arena = Bounds::new(-48, 48, -48, 48, 0, 128);
    let world = HeightmapWorld::generate(arena, match_seed);
    let config = GameConfig::from_json_str(r#"{ "rules": { "min_players": 4 } }"#)
        .context("demo config")?;

    let mut clock = ManualClock::new(GameInstant::ZERO);
    let mut effects = RecordingEffects::new();
    let mut controller = MatchController::new(config, arena, match_seed)?;
    controller.start(clock.now(), &mut effects);

    info!("RNG Seed: {}", match_seed);

    // Add actors in a ring
    let names = ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank"];
    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let id = ActorId::random();
        let angle = i as f64 / names.len() as f64 * std::f64::consts::TAU;
        let position = Position::new(angle.cos() * 20.0, 66.0, angle.sin() * 20.0);
        controller.join(ActorState::new(id, *name, position), clock.now());
        info!("Added actor {} ({}) at ({:.1}, {:.1})", name, hex::encode(&id.0[..4]), position.x, position.z);
        ids.push(id);
    }

    let tick = Duration::from_millis(TICK_DURATION_MS);
    let mut fights = DeterministicRng::new(match_seed ^ 0xF16);
    let mut strikes = 0usize;
    let max_ticks = 20 * 60 * u64::from(TICK_RATE);

    for t in 0..max_ticks {
        clock.advance(tick);
        let now = clock.now();

        // Every two seconds someone takes a swing or casts
        if controller.phase_name()? == "InGame" && t % (2 * u64::from(TICK_RATE)) == 0 {
            let alive: Vec<ActorId> = ids
                .iter()
                .copied()
                .filter(|id| controller.context().roster.get(id).is_some_and(ActorState::is_active))
                .collect();
            if alive.len() >= 2 {
                let attacker = alive[fights.next_int(alive.len() as u32) as usize];
                let victim = alive[fights.next_int(alive.len() as u32) as usize];
                if attacker != victim {
                    let hit = if fights.next_int(3) == 0 {
                        DamageTick::new(
                            fights.next_f64_range(2.0, 6.0),
                            DamageCause::Spell,
                            DamageSource::Spell { caster: attacker, spell: "chain_bolt".into() },
                            "lightning",
                            now,
                        )?
                    } else {
                        melee_hit(attacker, fights.next_f64_range(1.0, 5.0), "sword", now)?
                    };
                    controller.damage(victim, hit, &mut effects)?;
                }
            }
        }

        let result = controller.tick(now, &world, &mut effects)?;
        strikes += result.strikes.len();

        // Log important events
        for event in &result.events {
            match &event.data {
                GameEventData::ActorEliminated { victim, killer, assists, message } => {
                    info!(
                        "{} [{} killed by {:?}, {} assists]",
                        message,
                        hex::encode(&victim.0[..4]),
                        killer.map(|k| hex::encode(&k.0[..4])),
                        assists.len()
                    );
                }
                GameEventData::HazardActivated { kind } => {
                    info!("{} activated at {}", kind.display_name(), now);
                }
                GameEventData::PhaseChanged { old_phase, new_phase } => {
                    info!("Phase {} -> {}", old_phase, new_phase);
                }
                GameEventData::MatchEnded { winner, winning_team } => {
                    info!(
                        "Match ended! Winner: {:?} Team: {:?}",
                        winner.map(|w| hex::encode(&w.0[..4])),
                        winning_team
                    );
                }
                _ => {}
            }
        }

        // Report every 30 seconds
        if t % (30 * u64::from(TICK_RATE)) == 0 {
            if let (Some(first), Some(board)) = (ids.first(), ids.first().and_then(|id| controller.scoreboard(*id, now))) {
                info!("Scoreboard for {}: {}", hex::encode(&first.0[..4]), board.lines().join(" | "));
            }
        }

        if result.match_ended {
            info!("Match ended at {}", now);
            break;
        }
    }

    // Print final results
    info!("=== Match Results ===");
    let ctx = controller.context();
    for (order, id) in ctx.eliminated.iter().enumerate() {
        info!("Eliminated #{}: {}", order + 1, ctx.roster.name_of(id));
    }
    for survivor in ctx.roster.iter().filter(|a| a.is_active()) {
        info!("Survivor: {} ({:.1} hp)", survivor.name, survivor.health);
    }
    info!("Hazard strikes: {}", strikes);
    info!("Effects emitted: {}", effects.records.len());

    Ok(())
}
