//! Test helper functions for building rooms and simulations.

use std::sync::Arc;

use glam::Vec2;
use serde_json::Value;

use crate::chest::ChestState;
use crate::config::RoomDescriptor;
use crate::loot::MemoryContentSource;
use crate::simulation::{GamePhase, InputEvent, InputSender, KeyCode, Simulation};

/// Installs a test-writer subscriber so `tracing` output shows up under
/// `cargo test -- --nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Parses a room descriptor from a `json!` value.
pub fn room(value: Value) -> RoomDescriptor {
    serde_json::from_value(value).expect("room descriptor should parse")
}

/// A simulation in `Play` with `room_json` loaded and no player.
pub fn playing_sim_with(source: MemoryContentSource, room_json: Value) -> Simulation {
    init_tracing();
    let mut sim = Simulation::new(7, Arc::new(source));
    sim.load_room(&room(room_json));
    sim.set_phase(GamePhase::Play);
    sim
}

/// Same as [`playing_sim_with`] with an empty content source.
pub fn playing_sim(room_json: Value) -> Simulation {
    playing_sim_with(MemoryContentSource::new(), room_json)
}

/// State of the chest with the given id.
pub fn chest_state(sim: &Simulation, id: &str) -> ChestState {
    sim.world()
        .chest(id)
        .unwrap_or_else(|| panic!("chest `{id}` should exist"))
        .state()
}

/// Sends one interaction key press.
pub fn press_interact(tx: &InputSender) {
    tx.send(InputEvent::KeyDown(KeyCode::Space))
        .expect("simulation should be subscribed");
}

/// Spawns the player at `pos` and returns an input handle.
pub fn with_player(sim: &mut Simulation, pos: Vec2) -> InputSender {
    sim.spawn_player(pos);
    sim.subscribe_input()
}

/// Whether any drained feedback carries `text`.
pub fn saw_text(sim: &Simulation, text: &str) -> bool {
    sim.feedback().has_text(text)
}
