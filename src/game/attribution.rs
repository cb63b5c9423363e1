//! Kill Attribution
//!
//! Turns a victim's damage history into a killer, an ordered assist list
//! and a formatted death message.

use std::cmp::Ordering;

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::config::DeathMessageConfig;
use crate::core::rng::DeterministicRng;
use crate::core::time::GameInstant;
use crate::game::damage::{DamageCause, DamageSource, DamageTick};
use crate::game::ledger::DamageLedger;
use crate::game::roster::ActorId;
use crate::game::world::{fill_template, ActorRoster, ActorSnapshot};

// =============================================================================
// KILL ASSIST
// =============================================================================

/// An attacker's share of the damage that led to a death.
///
/// Natural order is ascending by percentage, then by attacker, so a plain
/// sort puts the smallest contributor first.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct KillAssist {
    /// Contributing attacker
    pub attacker: ActorId,
    /// Share of attributed damage, 0-100
    pub percentage: f64,
}

impl KillAssist {
    /// Create an assist record.
    pub fn new(attacker: ActorId, percentage: f64) -> Self {
        Self { attacker, percentage }
    }
}

impl PartialEq for KillAssist {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KillAssist {}

impl PartialOrd for KillAssist {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KillAssist {
    fn cmp(&self, other: &Self) -> Ordering {
        self.percentage
            .total_cmp(&other.percentage)
            .then(self.attacker.cmp(&other.attacker))
    }
}

/// Final credit for one death.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KillCredit {
    /// Who died
    pub victim: ActorId,
    /// Who gets the kill, if anyone
    pub killer: Option<ActorId>,
    /// Everyone else who qualified, highest share first
    pub assists: Vec<KillAssist>,
    /// Rendered death message
    pub message: String,
}

/// Pick a killer and assisters for `victim` at `now`.
///
/// The last tick's attacker takes the kill when it is still inside the log
/// window and is not the victim. Otherwise the top assister does. The killer
/// is removed from the assist list and the victim never appears in either.
pub fn attribute_kill(ledger: &DamageLedger, victim: ActorId, now: GameInstant) -> (Option<ActorId>, Vec<KillAssist>) {
    let mut assists: Vec<KillAssist> = ledger
        .compute_assists(&victim, now)
        .into_iter()
        .filter(|a| a.attacker != victim)
        .collect();

    let last_hitter = ledger
        .last_tick(&victim)
        .filter(|t| now.saturating_since(t.timestamp) <= ledger.config().log_timeout())
        .and_then(DamageTick::attacker)
        .filter(|attacker| *attacker != victim);

    let killer = last_hitter.or_else(|| assists.first().map(|a| a.attacker));
    if let Some(killer) = killer {
        assists.retain(|a| a.attacker != killer);
    }
    (killer, assists)
}

// =============================================================================
// DEATH MESSAGES
// =============================================================================

const FALLBACK_MESSAGE: &str = "{victim} died";

/// Renders death messages from the configured templates.
#[derive(Clone, Debug)]
pub struct DeathMessageResolver {
    templates: DeathMessageConfig,
    melee_range: f64,
}

impl DeathMessageResolver {
    /// Create a resolver. `melee_range` separates close player shots from
    /// real ranged kills.
    pub fn new(templates: DeathMessageConfig, melee_range: f64) -> Self {
        Self { templates, melee_range }
    }

    /// Message for `victim`, given its damage history (oldest first).
    ///
    /// The last tick picks the template. Void deaths look further back for
    /// whoever pushed the victim.
    pub fn resolve(
        &self,
        victim: &ActorSnapshot,
        history: &[DamageTick],
        roster: &dyn ActorRoster,
        rng: &mut DeterministicRng,
    ) -> String {
        let name_of = |id: &ActorId| roster.actor(id).map(|a| a.name).unwrap_or_else(|| id.to_string());
        let mut placeholders: Vec<(&str, String)> = vec![("victim", victim.name.clone())];
        let t = &self.templates;

        let Some(last) = history.last() else {
            return self.render(&t.default, "default", &placeholders);
        };

        match (last.cause, &last.source) {
            (DamageCause::BlockExplosion, DamageSource::Block { material }) => {
                placeholders.push(("block", material.key().to_string()));
                match t.block.get(material.key()) {
                    Some(template) => self.render(template, "block", &placeholders),
                    None => self.render(&t.block_default, "block_default", &placeholders),
                }
            }
            (DamageCause::BlockExplosion, _) => {
                placeholders.push(("block", "block".to_string()));
                self.render(&t.block_default, "block_default", &placeholders)
            }
            (DamageCause::Fall, _) => self.render(&t.fall, "fall", &placeholders),
            (DamageCause::Void, _) => {
                let pusher = history
                    .iter()
                    .rev()
                    .map(|tick| &tick.source)
                    .find(|s| matches!(s, DamageSource::Player(_) | DamageSource::Hostile { .. }));
                match pusher {
                    Some(DamageSource::Player(id)) if *id != victim.id => {
                        placeholders.push(("killer", name_of(id)));
                        self.render(&t.void_player, "void_player", &placeholders)
                    }
                    Some(DamageSource::Hostile { kind }) => {
                        placeholders.push(("hostile", kind.clone()));
                        self.render(&t.void_hostile, "void_hostile", &placeholders)
                    }
                    _ => self.render(&t.void_alone, "void_alone", &placeholders),
                }
            }
            (DamageCause::Melee | DamageCause::Projectile, DamageSource::Player(id)) => {
                placeholders.push(("killer", name_of(id)));
                let distance = roster
                    .actor(id)
                    .map(|killer| killer.position.distance(victim.position));
                let ranged = last.cause == DamageCause::Projectile
                    && distance.map_or(true, |d| d > self.melee_range);
                if ranged {
                    placeholders.push(("distance", format!("{:.1}", distance.unwrap_or(0.0))));
                    self.render(&t.ranged_format, "ranged_format", &placeholders)
                } else {
                    placeholders.push(("verb", pick_verb(&t.melee_verbs, rng)));
                    self.render(&t.melee_format, "melee_format", &placeholders)
                }
            }
            (DamageCause::Melee, DamageSource::Hostile { kind }) => {
                placeholders.push(("hostile", kind.clone()));
                self.render(&t.hostile_melee, "hostile_melee", &placeholders)
            }
            (DamageCause::Projectile, DamageSource::Hostile { kind }) => {
                placeholders.push(("hostile", kind.clone()));
                self.render(&t.hostile_ranged, "hostile_ranged", &placeholders)
            }
            (DamageCause::Spell, DamageSource::Spell { caster, spell }) => {
                placeholders.push(("spell", spell.clone()));
                placeholders.push(("killer", name_of(caster)));
                if *caster == victim.id {
                    self.render(&t.spell_suicide, "spell_suicide", &placeholders)
                } else if let Some(template) = t.spell_overrides.get(spell) {
                    self.render(template, "spell_override", &placeholders)
                } else {
                    placeholders.push(("verb", pick_verb(&t.spell_verbs, rng)));
                    self.render(&t.spell_format, "spell_format", &placeholders)
                }
            }
            (DamageCause::Hazard, DamageSource::Hazard { kind }) => {
                placeholders.push(("hazard", kind.display_name().to_string()));
                self.render(&t.hazard, "hazard", &placeholders)
            }
            (DamageCause::Burning, _) => self.render(&t.burning, "burning", &placeholders),
            _ => self.render(&t.default, "default", &placeholders),
        }
    }

    /// Fill a template, degrading to the default when it is blank.
    fn render(&self, template: &str, key: &str, placeholders: &[(&str, String)]) -> String {
        if !template.trim().is_empty() {
            return fill_template(template, placeholders);
        }
        warn!(template = key, "Death message template is empty, using default");
        if self.templates.default.trim().is_empty() {
            fill_template(FALLBACK_MESSAGE, placeholders)
        } else {
            fill_template(&self.templates.default, placeholders)
        }
    }
}

fn pick_verb(verbs: &[String], rng: &mut DeterministicRng) -> String {
    rng.choose(verbs).cloned().unwrap_or_else(|| "killed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::core::geom::Position;
    use crate::game::hazard::HazardKind;
    use crate::game::roster::{ActorState, Roster};
    use crate::game::world::Material;

    const A: ActorId = ActorId::new([1; 16]);
    const B: ActorId = ActorId::new([2; 16]);
    const V: ActorId = ActorId::new([9; 16]);

    fn at(ms: u64) -> GameInstant {
        GameInstant::from_millis(ms)
    }

    fn tick(cause: DamageCause, source: DamageSource, base: f64, ms: u64) -> DamageTick {
        DamageTick::new(base, cause, source, "", at(ms)).unwrap()
    }

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster.insert(ActorState::new(A, "Alice", Position::new(0.0, 64.0, 0.0)));
        roster.insert(ActorState::new(B, "Bob", Position::new(30.0, 64.0, 0.0)));
        roster.insert(ActorState::new(V, "Vic", Position::new(2.0, 64.0, 0.0)));
        roster
    }

    fn resolve(history: &[DamageTick]) -> String {
        let roster = roster();
        let victim = roster.actor(&V).unwrap();
        let resolver = DeathMessageResolver::new(DeathMessageConfig::default(), 4.0);
        resolver.resolve(&victim, history, &roster, &mut DeterministicRng::new(7))
    }

    #[test]
    fn test_assist_natural_order_is_ascending() {
        let mut assists = vec![KillAssist::new(A, 75.0), KillAssist::new(B, 25.0)];
        assists.sort();
        assert_eq!(assists[0].attacker, B);
        assert!(KillAssist::new(A, 10.0) < KillAssist::new(A, 10.5));
    }

    #[test]
    fn test_last_hitter_gets_kill() {
        let mut ledger = DamageLedger::new(CombatConfig::default()).unwrap();
        ledger.record(V, tick(DamageCause::Melee, DamageSource::Player(A), 15.0, 0));
        ledger.record(V, tick(DamageCause::Melee, DamageSource::Player(B), 5.0, 500));

        let (killer, assists) = attribute_kill(&ledger, V, at(600));
        assert_eq!(killer, Some(B));
        assert_eq!(assists.len(), 1);
        assert_eq!(assists[0].attacker, A);
    }

    #[test]
    fn test_environment_kill_credits_top_assister() {
        let mut ledger = DamageLedger::new(CombatConfig::default()).unwrap();
        ledger.record(V, tick(DamageCause::Melee, DamageSource::Player(A), 8.0, 0));
        ledger.record(V, tick(DamageCause::Melee, DamageSource::Player(B), 2.0, 100));
        ledger.record(V, tick(DamageCause::Fall, DamageSource::Environment, 20.0, 2_000));

        let (killer, assists) = attribute_kill(&ledger, V, at(2_000));
        assert_eq!(killer, Some(A));
        // B holds 20% which meets the default threshold
        assert_eq!(assists.iter().map(|a| a.attacker).collect::<Vec<_>>(), vec![B]);
    }

    #[test]
    fn test_self_damage_never_credits_victim() {
        let mut ledger = DamageLedger::new(CombatConfig::default()).unwrap();
        let own_spell = DamageSource::Spell { caster: V, spell: "fireball".into() };
        ledger.record(V, tick(DamageCause::Spell, own_spell, 30.0, 0));

        let (killer, assists) = attribute_kill(&ledger, V, at(10));
        assert_eq!(killer, None);
        assert!(assists.is_empty());
    }

    #[test]
    fn test_stale_last_hit_is_ignored() {
        let mut ledger = DamageLedger::new(CombatConfig::default()).unwrap();
        ledger.record(V, tick(DamageCause::Melee, DamageSource::Player(A), 8.0, 0));
        let (killer, _) = attribute_kill(&ledger, V, at(60_000));
        assert_eq!(killer, None);
    }

    #[test]
    fn test_block_messages() {
        let wood = tick(DamageCause::BlockExplosion, DamageSource::Block { material: Material::Wood }, 5.0, 0);
        assert_eq!(resolve(&[wood]), "Vic was crushed by wood");

        let glass = tick(DamageCause::BlockExplosion, DamageSource::Block { material: Material::Glass }, 5.0, 0);
        assert_eq!(resolve(&[glass]), "Vic was shredded by flying glass");

        let sand = tick(DamageCause::BlockExplosion, DamageSource::Block { material: Material::Sand }, 5.0, 0);
        assert_eq!(resolve(&[sand]), "Vic was buried under falling sand");
    }

    #[test]
    fn test_default_block_templates_use_known_materials() {
        let known = [
            Material::Stone,
            Material::Dirt,
            Material::Grass,
            Material::Sand,
            Material::Wood,
            Material::Glass,
            Material::Water,
            Material::Lava,
            Material::Bedrock,
            Material::Barrier,
        ];
        for key in DeathMessageConfig::default().block.keys() {
            assert!(known.iter().any(|m| m.key() == key), "unknown block key {key}");
        }
    }

    #[test]
    fn test_hostile_melee_and_ranged() {
        let bite = tick(DamageCause::Melee, DamageSource::Hostile { kind: "zombie".into() }, 5.0, 0);
        assert_eq!(resolve(&[bite]), "Vic was slain by a zombie");

        let arrow = tick(DamageCause::Projectile, DamageSource::Hostile { kind: "skeleton".into() }, 5.0, 0);
        assert_eq!(resolve(&[arrow]), "Vic was shot by a skeleton");
    }

    #[test]
    fn test_burning() {
        let burn = tick(DamageCause::Burning, DamageSource::Environment, 1.0, 0);
        assert_eq!(resolve(&[burn]), "Vic burned to death");

        // Burning wins over whoever lit the fire
        let lit = tick(DamageCause::Burning, DamageSource::Player(A), 1.0, 0);
        assert_eq!(resolve(&[lit]), "Vic burned to death");
    }

    #[test]
    fn test_void_branches() {
        let void = tick(DamageCause::Void, DamageSource::Environment, 100.0, 1_000);
        assert_eq!(resolve(&[void.clone()]), "Vic fell out of the world");

        let push = tick(DamageCause::Melee, DamageSource::Player(A), 1.0, 0);
        assert_eq!(resolve(&[push, void.clone()]), "Vic was knocked into the void by Alice");

        let zombie = tick(DamageCause::Melee, DamageSource::Hostile { kind: "zombie".into() }, 1.0, 0);
        assert_eq!(resolve(&[zombie, void]), "Vic was knocked into the void by a zombie");
    }

    #[test]
    fn test_player_melee_uses_configured_verb() {
        let hit = tick(DamageCause::Melee, DamageSource::Player(A), 5.0, 0);
        let msg = resolve(&[hit]);
        let verbs = DeathMessageConfig::default().melee_verbs;
        assert!(verbs.iter().any(|v| msg == format!("Vic was {v} by Alice")), "{msg}");
    }

    #[test]
    fn test_ranged_split_by_distance() {
        let far = tick(DamageCause::Projectile, DamageSource::Player(B), 5.0, 0);
        assert_eq!(resolve(&[far]), "Vic was shot by Bob (28.0 blocks)");

        // Alice stands two blocks away, inside melee range
        let close = tick(DamageCause::Projectile, DamageSource::Player(A), 5.0, 0);
        assert!(resolve(&[close]).ends_with("by Alice"));
    }

    #[test]
    fn test_spell_branches() {
        let fireball = tick(
            DamageCause::Spell,
            DamageSource::Spell { caster: A, spell: "fireball".into() },
            5.0,
            0,
        );
        assert_eq!(resolve(&[fireball]), "Vic was incinerated by Alice's fireball");

        let own = tick(
            DamageCause::Spell,
            DamageSource::Spell { caster: V, spell: "hex".into() },
            5.0,
            0,
        );
        assert_eq!(resolve(&[own]), "Vic was killed by their own hex");

        let generic = tick(
            DamageCause::Spell,
            DamageSource::Spell { caster: A, spell: "hex".into() },
            5.0,
            0,
        );
        assert!(resolve(&[generic]).ends_with("by Alice using hex"));
    }

    #[test]
    fn test_hazard_and_default() {
        let strike = tick(DamageCause::Hazard, DamageSource::Hazard { kind: HazardKind::Meteor }, 5.0, 0);
        assert_eq!(resolve(&[strike]), "Vic was struck down by the Meteor Shower");
        assert_eq!(resolve(&[]), "Vic died");

        let other = tick(DamageCause::Other, DamageSource::Environment, 5.0, 0);
        assert_eq!(resolve(&[other]), "Vic died");
    }

    #[test]
    fn test_blank_template_falls_back() {
        let roster = roster();
        let victim = roster.actor(&V).unwrap();
        let templates = DeathMessageConfig {
            fall: "  ".to_string(),
            default: String::new(),
            ..DeathMessageConfig::default()
        };
        let resolver = DeathMessageResolver::new(templates, 4.0);
        let fall = tick(DamageCause::Fall, DamageSource::Environment, 5.0, 0);
        let msg = resolver.resolve(&victim, &[fall], &roster, &mut DeterministicRng::new(1));
        assert_eq!(msg, "Vic died");
    }
}
