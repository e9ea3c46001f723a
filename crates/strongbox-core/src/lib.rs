//! # Strongbox Core
//!
//! Chest and floor-switch simulation for a room-based 2D action game.
//!
//! This crate owns everything that happens to a loot chest between the moment
//! a room is loaded and the moment its contents land on the floor: spawn
//! rules, the lock economy, box-vs-box collision resolution, reactions to
//! bullets and bombs, and the asynchronous loot reveal. Floor switches that
//! restock a shop room live here too, because they rewrite chest configuration.
//!
//! ## Architecture
//!
//! - **Geometry**: AABB overlap, minimum translation and room clamping
//! - **Lock**: unlock-type normalization and the currency debit rules
//! - **Chest / Switch**: per-entity state machines
//! - **Physics**: player-vs-chest and chest-vs-chest resolution
//! - **Loot**: manifest and item-template fetches on a tokio runtime
//! - **Simulation**: the per-tick orchestrator that owns the world
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strongbox_core::config::RoomDescriptor;
//! use strongbox_core::simulation::{GamePhase, Simulation};
//!
//! let runtime = tokio::runtime::Runtime::new()?;
//! let mut sim = Simulation::new(42, source).with_runtime(runtime.handle().clone());
//! sim.load_room(&RoomDescriptor::from_json_str(room_json)?);
//! sim.set_phase(GamePhase::Play);
//! loop {
//!     sim.step();
//!     for event in sim.drain_feedback() { /* play cues, draw text */ }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chest;
pub mod config;
pub mod error;
pub mod feedback;
pub mod geometry;
pub mod inventory;
pub mod lock;
pub mod loot;
pub mod physics;
pub mod simulation;
pub mod switch;
pub mod world;

pub use chest::{Chest, ChestId, ChestState};
pub use config::{ChestConfig, RoomDescriptor, SimConfig};
pub use error::{ConfigError, FetchError, LootError, StoreError};
pub use feedback::{Color, Cue, Feedback, FeedbackQueue};
pub use inventory::{Currency, CurrencyStore, Inventory};
pub use lock::{try_unlock, LockSpec, UnlockOutcome, UnlockType};
pub use loot::{ContentSource, GroundItem, ItemTemplate, LootPipeline};
pub use simulation::{GamePhase, Simulation};
pub use switch::{Switch, SwitchState};

#[cfg(test)]
mod tests;
