//! Determinism verification tests.
//!
//! Spawn rolls, reveal rolls, restock picks and loot scatter all draw from
//! the seeded simulation RNG, so the same seed and inputs must reproduce a
//! run exactly.

use std::sync::Arc;

use glam::Vec2;
use serde_json::{json, Map, Value};

use crate::chest::ChestState;
use crate::loot::{ItemTemplate, MemoryContentSource};
use crate::simulation::{GamePhase, Simulation};

use super::helpers::{init_tracing, room};

/// Twenty chests that each spawn with probability one half.
fn coin_flip_room() -> Value {
    let mut chests = Map::new();
    for i in 0..20 {
        chests.insert(
            format!("c{i:02}"),
            json!({
                "x": 40 + (i % 5) * 120,
                "y": 40 + (i / 5) * 120,
                "instantSpawn": { "active": true, "spawnChance": 0.5 },
                "spawnsOnClear": { "active": true, "spawnChance": 0.5 }
            }),
        );
    }
    json!({ "chests": chests })
}

fn run(seed: u64, ticks: u32) -> Vec<(String, ChestState)> {
    let mut sim = Simulation::new(seed, Arc::new(MemoryContentSource::new()));
    sim.load_room(&room(coin_flip_room()));
    sim.set_phase(GamePhase::Play);
    for _ in 0..ticks {
        sim.step();
    }
    sim.world()
        .chests
        .iter()
        .map(|chest| (chest.id.to_string(), chest.state()))
        .collect()
}

#[test]
fn same_seed_same_spawns() {
    init_tracing();
    assert_eq!(run(42, 3), run(42, 3));
}

#[test]
fn spawn_rolls_depend_on_seed() {
    let runs: Vec<_> = (0..8).map(|seed| run(seed, 1)).collect();
    assert!(
        runs.windows(2).any(|pair| pair[0] != pair[1]),
        "eight seeds produced identical rooms"
    );
}

#[test]
fn chests_iterate_in_id_order() {
    let states = run(1, 0);
    let ids: Vec<_> = states.iter().map(|(id, _)| id.clone()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn restock_picks_are_reproducible() {
    let catalog: Vec<ItemTemplate> = (0..10)
        .map(|i| ItemTemplate {
            location: Some(format!("items/{i}")),
            ..ItemTemplate::default()
        })
        .collect();

    let contents = |seed: u64| {
        let mut sim = Simulation::new(seed, Arc::new(MemoryContentSource::new()));
        sim.load_room(&room(json!({
            "chests": {
                "a": { "x": 100, "y": 100 },
                "b": { "x": 200, "y": 100 },
                "c": { "x": 300, "y": 100 }
            },
            "switches": { "x": 500, "y": 500, "action": "shop" }
        })));
        sim.set_catalog(catalog.clone());
        sim.set_phase(GamePhase::Play);
        sim.spawn_player(Vec2::new(500.0, 500.0));
        sim.step();
        sim.world()
            .chests
            .iter()
            .map(|chest| chest.config.contains.clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(contents(9), contents(9));
}

#[tokio::test]
async fn loot_scatter_is_reproducible() {
    let source = MemoryContentSource::new()
        .with("rewards/m.json", json!({ "items": ["x", "y"] }))
        .with("rewards/x.json", json!({ "name": "X" }))
        .with("rewards/y.json", json!({ "name": "Y" }));

    let mut positions = Vec::new();
    for _ in 0..2 {
        let mut sim = Simulation::new(5, Arc::new(source.clone()));
        sim.load_room(&room(json!({
            "chests": { "a": { "x": 100, "y": 100, "manifest": "/rewards/m.json", "contains": ["*"] } }
        })));
        sim.set_phase(GamePhase::Play);
        sim.spawn_player(Vec2::new(110.0, 110.0));
        sim.step();
        sim.flush_loot().await;

        let mut drops: Vec<_> = sim
            .world()
            .ground_items
            .iter()
            .map(|item| (item.item_path.clone(), item.pos))
            .collect();
        drops.sort_by(|a, b| a.0.cmp(&b.0));
        positions.push(drops);
    }

    assert_eq!(positions[0].len(), 2);
    let names: Vec<_> = positions[0].iter().map(|(path, _)| path.as_str()).collect();
    assert_eq!(names, ["x", "y"]);
    // Jitter is drawn per delivery in arrival order, so only the multiset of
    // positions is stable across runs.
    let mut a: Vec<_> = positions[0].iter().map(|(_, pos)| (pos.x.to_bits(), pos.y.to_bits())).collect();
    let mut b: Vec<_> = positions[1].iter().map(|(_, pos)| (pos.x.to_bits(), pos.y.to_bits())).collect();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
}
