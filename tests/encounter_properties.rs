//! Property tests for the encounter budget, selector and multiplier laws.

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use srdservice::config::MAX_SELECTION_ATTEMPTS;
use srdservice::{
    difficulty_multiplier, generate_encounter, select_monsters, threshold_for, Difficulty,
    MonsterCatalog, MonsterEntry,
};

fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard),
        Just(Difficulty::Deadly),
    ]
}

fn catalog_strategy() -> impl Strategy<Value = MonsterCatalog> {
    // XP in half-point steps, so fractional stat blocks are covered too
    prop::collection::btree_map("[A-Z][a-z]{2,8}", 0u32..=4000, 1..8).prop_map(|monsters| {
        monsters
            .into_iter()
            .map(|(name, half_xp)| (name, MonsterEntry::new(f64::from(half_xp) / 2.0)))
            .collect()
    })
}

proptest! {
    #[test]
    fn xp_target_follows_table(
        levels in prop::collection::vec(1u32..=20, 1..8),
        tier in difficulty_strategy(),
        catalog in catalog_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = generate_encounter(&levels, &catalog, tier.as_str(), &mut rng).unwrap();

        let mean = levels.iter().sum::<u32>() as f64 / levels.len() as f64;
        let level = (mean.round() as u32).clamp(1, 10);
        prop_assert_eq!(
            result.xp_target(),
            threshold_for(level, tier) * levels.len() as u64
        );
        prop_assert_eq!(result.difficulty(), tier);
    }

    #[test]
    fn selector_never_exceeds_cap(
        catalog in catalog_strategy(),
        target in 0u64..1_000_000,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let selection = select_monsters(&catalog, target, &mut rng).unwrap();

        prop_assert!(selection.attempts <= MAX_SELECTION_ATTEMPTS);
        prop_assert_eq!(selection.monsters.len(), selection.attempts as usize);
        prop_assert!(
            selection.raw_xp >= target as f64 || selection.attempts == MAX_SELECTION_ATTEMPTS
        );
    }

    #[test]
    fn scaled_total_never_below_raw(
        levels in prop::collection::vec(1u32..=10, 1..6),
        tier in difficulty_strategy(),
        catalog in catalog_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = generate_encounter(&levels, &catalog, tier.as_str(), &mut rng).unwrap();

        prop_assert!(result.xp_total() as f64 >= result.raw_xp().floor());
        prop_assert_eq!(
            result.xp_total(),
            (result.raw_xp() * difficulty_multiplier(result.monsters().len())) as u64
        );
    }

    #[test]
    fn multiplier_is_non_decreasing(count in 1usize..200) {
        prop_assert!(difficulty_multiplier(count) >= 1.0);
        prop_assert!(difficulty_multiplier(count + 1) >= difficulty_multiplier(count));
    }

    #[test]
    fn same_seed_same_result(
        levels in prop::collection::vec(1u32..=12, 1..6),
        difficulty in "[a-z]{0,8}",
        catalog in catalog_strategy(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let first = generate_encounter(&levels, &catalog, &difficulty, &mut rng).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let second = generate_encounter(&levels, &catalog, &difficulty, &mut rng).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_unknown_tier_matches_medium_target() {
    let catalog: MonsterCatalog = [("Goblin", MonsterEntry::new(50))].into_iter().collect();
    let mut rng = StdRng::seed_from_u64(0);

    let brutal = generate_encounter(&[6, 7], &catalog, "brutal", &mut rng).unwrap();
    let medium = generate_encounter(&[6, 7], &catalog, "medium", &mut rng).unwrap();

    assert_eq!(brutal.difficulty(), Difficulty::Medium);
    assert_eq!(brutal.xp_target(), medium.xp_target());
    assert_eq!(brutal.xp_target(), 1500);
}
