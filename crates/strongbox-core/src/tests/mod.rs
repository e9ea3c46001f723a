//! Scenario tests for the chest/switch simulation.
//!
//! - **Integration tests**: full ticks through `Simulation::step`
//! - **Determinism tests**: same seed, same rooms, same outcome
//! - **Property tests**: invariants of the solver, lifecycle and lock economy
//!
//! # Test Structure
//!
//! - `helpers.rs`: room builders and simulation setup
//! - `integration.rs`: end-to-end behaviour of chests, switches and loot
//! - `determinism.rs`: seed reproducibility
//! - `properties.rs`: proptest invariants

mod determinism;
mod helpers;
mod properties;

// Re-export for convenience
pub use helpers::*;
