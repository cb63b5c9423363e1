//! Strike Targeting
//!
//! Layered location search for hazard strikes:
//!
//! ```text
//! collapsed bounds? ──yes──► centre column
//!        │no
//!        ▼
//! 15 × (random living actor + shrinking spread)
//!        │none accepted
//!        ▼
//! 10 × random in-bounds column
//!        │none accepted
//!        ▼
//! centre column ──rejected──► no target this tick
//! ```
//!
//! Every tier uses the same acceptance rule, so a returned location always
//! sits inside the current bounds and the initial vertical range.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::geom::{BlockPos, Bounds};
use crate::core::rng::DeterministicRng;
use crate::game::world::{ActorRoster, WorldQuery};

/// Accuracy gained per location request.
pub const ACCURACY_STEP: f64 = 0.0001;

/// Candidate attempts around living actors.
pub const CANDIDATE_ATTEMPTS: u32 = 15;

/// Attempts on random in-bounds columns.
pub const RANDOM_ATTEMPTS: u32 = 10;

/// Base spread is drawn from `[MIN_BASE_SPREAD, MAX_BASE_SPREAD)`.
pub const MIN_BASE_SPREAD: i32 = 3;

/// Exclusive upper end of the base spread.
pub const MAX_BASE_SPREAD: i32 = 53;

/// Which tier produced a location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetTier {
    /// Bounds had no width left
    Collapsed,
    /// Near a living actor
    Candidate,
    /// Random column
    Random,
    /// Centre column fallback
    Center,
}

/// An accepted strike location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Topmost acceptable block of the chosen column
    pub block: BlockPos,
    /// Tier that found it
    pub tier: TargetTier,
}

/// Spread after accuracy is applied, never below one block.
#[inline]
pub fn final_spread(base_spread: i32, accuracy: f64) -> i32 {
    let base = f64::from(base_spread);
    ((base - accuracy * base).floor() as i32).max(1)
}

/// Adaptive aim for one hazard.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Targeting {
    accuracy: f64,
}

impl Targeting {
    /// Fresh aim with zero accuracy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current accuracy factor in `[0, 1]`.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Find the next strike location, or `None` if every tier failed.
    ///
    /// At most 35 columns are examined.
    pub fn next_location(
        &mut self,
        world: &dyn WorldQuery,
        roster: &dyn ActorRoster,
        bounds: &Bounds,
        initial: &Bounds,
        rng: &mut DeterministicRng,
    ) -> Option<Target> {
        if bounds.is_collapsed() {
            let (x, z) = bounds.center_column();
            return accept(world, x, z, bounds, initial).map(|block| Target {
                block,
                tier: TargetTier::Collapsed,
            });
        }

        let candidates = roster.living_actors_in_bounds(bounds);
        self.accuracy = (self.accuracy + ACCURACY_STEP).min(1.0);

        if !candidates.is_empty() {
            for _ in 0..CANDIDATE_ATTEMPTS {
                let Some(candidate) = rng.choose(&candidates) else {
                    break;
                };
                let base = rng.next_int_range(MIN_BASE_SPREAD, MAX_BASE_SPREAD);
                let spread = final_spread(base, self.accuracy);
                let dx = rng.next_int_range(-spread, spread);
                let dz = rng.next_int_range(-spread, spread);

                let origin = candidate.position.block();
                let (x, z) = bounds.clamp_column(origin.x.saturating_add(dx), origin.z.saturating_add(dz));
                if let Some(block) = accept(world, x, z, bounds, initial) {
                    return Some(Target { block, tier: TargetTier::Candidate });
                }
            }
        }

        for _ in 0..RANDOM_ATTEMPTS {
            let x = rng.next_int_range(bounds.min_x, bounds.max_x.saturating_add(1));
            let z = rng.next_int_range(bounds.min_z, bounds.max_z.saturating_add(1));
            if let Some(block) = accept(world, x, z, bounds, initial) {
                debug!(x, z, "Targeting fell back to a random column");
                return Some(Target { block, tier: TargetTier::Random });
            }
        }

        let (x, z) = bounds.center_column();
        let center = accept(world, x, z, bounds, initial).map(|block| Target {
            block,
            tier: TargetTier::Center,
        });
        if center.is_none() {
            debug!("No acceptable strike location this tick");
        }
        center
    }
}

/// Surface block of `(x, z)` if a hazard may land there.
fn accept(world: &dyn WorldQuery, x: i32, z: i32, bounds: &Bounds, initial: &Bounds) -> Option<BlockPos> {
    if !bounds.contains_column(x, z) {
        return None;
    }
    let column = world.highest_solid_column(x, z)?;
    if column.is_liquid || column.material.is_indestructible_floor() {
        return None;
    }
    if !initial.contains_height(column.y) {
        return None;
    }
    Some(BlockPos::new(x, column.y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geom::Position;
    use crate::game::roster::{ActorId, ActorState, Roster};
    use crate::game::world::{Column, HeightmapWorld, Material};
    use proptest::prelude::*;

    const ARENA: Bounds = Bounds::new(-32, 32, -32, 32, 0, 128);

    fn roster_at(points: &[(f64, f64)]) -> Roster {
        let mut roster = Roster::new();
        for (i, (x, z)) in points.iter().enumerate() {
            let id = ActorId::new([i as u8 + 1; 16]);
            roster.insert(ActorState::new(id, format!("p{i}"), Position::new(*x, 64.0, *z)));
        }
        roster
    }

    #[test]
    fn test_final_spread_floor_and_minimum() {
        assert_eq!(final_spread(10, 0.0), 10);
        assert_eq!(final_spread(10, 0.25), 7);
        assert_eq!(final_spread(3, 0.9), 1);
        assert_eq!(final_spread(52, 1.0), 1);
    }

    #[test]
    fn test_candidate_tier_near_actor() {
        // Wide arena so the spread, not the clamp, bounds the result
        let wide = Bounds::new(-200, 200, -200, 200, 0, 128);
        let world = HeightmapWorld::flat(wide, 64, Material::Grass);
        let roster = roster_at(&[(100.5, -100.5)]);
        let origin = BlockPos::new(100, 64, -101);
        let mut targeting = Targeting::new();
        let mut rng = DeterministicRng::new(3);

        for _ in 0..50 {
            let target = targeting.next_location(&world, &roster, &wide, &wide, &mut rng).unwrap();
            assert_eq!(target.tier, TargetTier::Candidate);
            assert_eq!(target.block.y, 64);
            assert!(wide.contains_column(target.block.x, target.block.z));
            // Largest first-step spread is 51, offsets are half-open
            assert!((target.block.x - origin.x).abs() <= 51, "{}", target.block);
            assert!((target.block.z - origin.z).abs() <= 51, "{}", target.block);
        }
    }

    #[test]
    fn test_no_actors_uses_random_column() {
        let world = HeightmapWorld::flat(ARENA, 64, Material::Stone);
        let mut targeting = Targeting::new();
        let target = targeting
            .next_location(&world, &Roster::new(), &ARENA, &ARENA, &mut DeterministicRng::new(1))
            .unwrap();
        assert_eq!(target.tier, TargetTier::Random);
    }

    #[test]
    fn test_all_liquid_yields_nothing() {
        let world = HeightmapWorld::flat(ARENA, 63, Material::Water);
        let roster = roster_at(&[(0.0, 0.0), (10.0, 10.0)]);
        let mut targeting = Targeting::new();
        let result = targeting.next_location(&world, &roster, &ARENA, &ARENA, &mut DeterministicRng::new(9));
        assert!(result.is_none());
        assert_eq!(targeting.accuracy(), ACCURACY_STEP);
    }

    #[test]
    fn test_center_fallback() {
        let bounds = Bounds::new(-40, 40, -40, 40, 0, 128);
        let mut world = HeightmapWorld::flat(bounds, 63, Material::Lava);
        world.set_column(0, 0, Some(Column::new(64, Material::Sand)));

        let mut targeting = Targeting::new();
        let target = targeting
            .next_location(&world, &Roster::new(), &bounds, &bounds, &mut DeterministicRng::new(5))
            .unwrap();
        assert_eq!(target.block, BlockPos::new(0, 64, 0));
    }

    #[test]
    fn test_collapsed_bounds_short_circuit() {
        let world = HeightmapWorld::flat(ARENA, 64, Material::Grass);
        let collapsed = Bounds::new(5, 5, -3, -3, 0, 128);
        let mut targeting = Targeting::new();
        let target = targeting
            .next_location(&world, &roster_at(&[(5.0, -3.0)]), &collapsed, &ARENA, &mut DeterministicRng::new(2))
            .unwrap();
        assert_eq!(target.tier, TargetTier::Collapsed);
        assert_eq!(target.block, BlockPos::new(5, 64, -3));
    }

    #[test]
    fn test_rejects_floor_and_out_of_range_heights() {
        let small = Bounds::new(0, 2, 0, 2, 0, 100);
        let mut world = HeightmapWorld::flat(small, 0, Material::Bedrock);
        world.set_column(1, 1, Some(Column::new(120, Material::Stone)));
        let mut targeting = Targeting::new();
        let result = targeting.next_location(&world, &Roster::new(), &small, &small, &mut DeterministicRng::new(4));
        assert!(result.is_none());
    }

    proptest! {
        #[test]
        fn prop_location_stays_in_bounds(
            seed in any::<u64>(),
            shrink in 0i32..40,
            actors in prop::collection::vec((-40.0f64..40.0, -40.0f64..40.0), 0..6),
        ) {
            let world = HeightmapWorld::generate(ARENA, seed);
            let roster = roster_at(&actors);
            let bounds = ARENA.shrunk(shrink);
            let mut targeting = Targeting::new();
            let mut rng = DeterministicRng::new(seed ^ 0xABCD);

            for _ in 0..20 {
                if let Some(target) = targeting.next_location(&world, &roster, &bounds, &ARENA, &mut rng) {
                    prop_assert!(bounds.contains_column(target.block.x, target.block.z));
                    prop_assert!(ARENA.contains_height(target.block.y));
                }
            }
        }

        #[test]
        fn prop_spread_non_increasing_in_accuracy(base in MIN_BASE_SPREAD..MAX_BASE_SPREAD, a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(final_spread(base, hi) <= final_spread(base, lo));
            prop_assert!(final_spread(base, hi) >= 1);
        }

        #[test]
        fn prop_accuracy_monotonic_and_capped(calls in 1usize..300) {
            let world = HeightmapWorld::flat(Bounds::new(0, 4, 0, 4, 0, 16), 8, Material::Dirt);
            let bounds = world.bounds();
            let mut targeting = Targeting::new();
            let mut rng = DeterministicRng::new(11);
            let mut prev = targeting.accuracy();
            for _ in 0..calls {
                targeting.next_location(&world, &Roster::new(), &bounds, &bounds, &mut rng);
                prop_assert!(targeting.accuracy() >= prev);
                prop_assert!(targeting.accuracy() <= 1.0);
                prev = targeting.accuracy();
            }
        }
    }
}
