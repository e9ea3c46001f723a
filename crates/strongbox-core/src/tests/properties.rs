//! Property tests for the solver, the chest lifecycle and the lock economy.

use std::sync::Arc;

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::chest::{Chest, ChestId, ChestState};
use crate::config::{Amount, ChestConfig, LockConfig, LockConfigSpec, SimConfig, Toggle, ToggleSpec};
use crate::feedback::FeedbackQueue;
use crate::inventory::{Inventory, MemoryCurrencyStore};
use crate::lock::{try_unlock, LockSpec};
use crate::physics::CollisionResolver;
use crate::switch::{reroll_shop, RerollOutcome};

#[derive(Debug, Clone, Copy)]
enum Op {
    Open,
    Reveal,
    Advance(ChestState),
}

fn any_state() -> impl Strategy<Value = ChestState> {
    prop_oneof![
        Just(ChestState::Hidden),
        Just(ChestState::Closed),
        Just(ChestState::Open),
        Just(ChestState::Despawned),
    ]
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Open),
        Just(Op::Reveal),
        any_state().prop_map(Op::Advance),
    ]
}

fn moveable_chest(id: &str, x: u16, y: u16) -> Chest {
    let config = ChestConfig {
        x: f32::from(x),
        y: f32::from(y),
        moveable: true,
        ..ChestConfig::default()
    };
    Chest::from_config(ChestId::new(id), Arc::new(config), ChestState::Closed, 40.0, None)
}

proptest! {
    #[test]
    fn lifecycle_only_moves_forward(
        start in prop_oneof![Just(ChestState::Hidden), Just(ChestState::Closed)],
        chance in proptest::option::of(0.0f64..=1.0),
        ops in proptest::collection::vec(any_op(), 1..20),
        seed in any::<u64>(),
    ) {
        let config = ChestConfig {
            spawns_on_clear: Some(Toggle::Spec(ToggleSpec { active: Some(true), spawn_chance: chance })),
            ..ChestConfig::default()
        };
        let mut chest = Chest::from_config(ChestId::new("c"), Arc::new(config), start, 40.0, None);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut opens = 0;

        for op in ops {
            let before = chest.state();
            match op {
                Op::Open => {
                    if chest.open() {
                        opens += 1;
                    }
                }
                Op::Reveal => {
                    chest.reveal(&mut rng);
                }
                Op::Advance(next) => {
                    chest.advance(next);
                }
            }
            let after = chest.state();
            prop_assert!(before == after || before.can_advance_to(after));
            if before.is_terminal() {
                prop_assert_eq!(before, after);
            }
        }
        prop_assert!(opens <= 1);
    }

    #[test]
    fn moveable_pair_ends_separated(
        ax in 100u16..600, ay in 100u16..400,
        dx in 0u16..60, dy in 0u16..60,
    ) {
        let resolver = CollisionResolver::new(&SimConfig::default());
        let mut a = moveable_chest("a", ax, ay);
        let mut b = moveable_chest("b", ax + dx, ay + dy);
        let overlapping = a.aabb().intersects(&b.aabb());

        let moved = resolver.resolve_pair(&mut a, &mut b);

        prop_assert_eq!(moved, overlapping);
        prop_assert!(!a.aabb().intersects(&b.aabb()));
    }

    #[test]
    fn unlock_debits_exactly_the_cost(balance in 0u32..20, cost in 0u32..20, kind in 0usize..3) {
        let unlock_type = ["key", "red", "green"][kind];
        let spec = LockSpec::from_config(Some(&LockConfig::Spec(LockConfigSpec {
            active: Some(true),
            unlock_type: Some(unlock_type.to_string()),
            cost: Some(Amount::from(cost)),
        })));
        let mut inventory = Inventory { keys: balance, red_shards: balance, green_shards: balance };
        let mut store = MemoryCurrencyStore::new();

        let outcome = try_unlock(&spec, &mut inventory, &mut store);

        let currency = spec.unlock_type.currency().unwrap();
        let cost = spec.cost;
        prop_assert!(cost >= 1);
        if balance >= cost {
            prop_assert!(outcome.authorized);
            prop_assert_eq!(inventory.balance(currency), balance - cost);
        } else {
            prop_assert!(!outcome.authorized);
            prop_assert_eq!(inventory.balance(currency), balance);
        }
    }

    #[test]
    fn empty_pool_reroll_is_a_no_op(n in 0usize..6, seed in any::<u64>()) {
        let mut chests: Vec<Chest> = (0..n)
            .map(|i| moveable_chest(&format!("c{i}"), 100 + 50 * u16::try_from(i).unwrap(), 100))
            .collect();
        let before = chests.clone();
        let mut feedback = FeedbackQueue::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let outcome = reroll_shop(Vec2::ZERO, &mut chests, &[], &mut feedback, &mut rng);

        prop_assert_eq!(outcome, RerollOutcome::NoItems);
        prop_assert_eq!(chests, before);
        prop_assert!(!feedback.is_empty());
    }
}
