//! Chest entities and their lifecycle.
//!
//! # State Machine
//!
//! ```text
//!            room cleared, draw < chance
//!   Hidden ───────────────────────────────▶ Closed ──open──▶ Open
//!     │                                        ▲               │
//!     │ room cleared, draw >= chance           └── restock ────┘
//!     ▼
//!   Despawned
//! ```
//!
//! `Open` and `Despawned` are terminal for the lifecycle. The only way back
//! from `Open` is a shop restock, which replaces the chest's configuration
//! wholesale and re-offers it as a new item.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ChestConfig, ChestMap, Toggle};
use crate::geometry::Aabb;
use crate::lock::LockSpec;

/// Identity of a chest, unique within a room.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChestId(String);

impl ChestId {
    /// Wraps a chest key from room data.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChestId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle state of a chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChestState {
    /// Waiting for the room to be cleared.
    Hidden,
    /// Visible and interactive.
    Closed,
    /// Looted.
    Open,
    /// Lost its reveal roll; gone for good.
    Despawned,
}

impl ChestState {
    /// Whether the lifecycle permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Hidden, Self::Closed | Self::Despawned) | (Self::Closed, Self::Open)
        )
    }

    /// Whether no lifecycle transition leaves this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Open | Self::Despawned)
    }

    /// Whether the chest takes part in collisions at all.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::Closed | Self::Open)
    }
}

impl fmt::Display for ChestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hidden => "hidden",
            Self::Closed => "closed",
            Self::Open => "open",
            Self::Despawned => "despawned",
        };
        f.write_str(name)
    }
}

/// Result of a reveal roll for a hidden chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// The chest appeared.
    Appeared,
    /// The chest lost its roll and despawned.
    Despawned,
}

/// A chest in the current room.
#[derive(Debug, Clone, PartialEq)]
pub struct Chest {
    /// Identity within the room.
    pub id: ChestId,
    /// Top-left corner.
    pub pos: Vec2,
    /// Box dimensions.
    pub size: Vec2,
    /// Current configuration snapshot.
    pub config: Arc<ChestConfig>,
    state: ChestState,
    /// Whether opening requires payment. Fixed at spawn; only a restock
    /// changes it.
    pub locked: bool,
    /// Blocks the player and bullets.
    pub solid: bool,
    /// Can be shoved while unlocked.
    pub moveable: bool,
    /// Resolved loot manifest path.
    pub manifest: Option<String>,
}

impl Chest {
    /// Builds a chest from its configuration.
    ///
    /// `room_manifest` is the room-wide fallback loot source.
    #[must_use]
    pub fn from_config(
        id: ChestId,
        config: Arc<ChestConfig>,
        state: ChestState,
        side: f32,
        room_manifest: Option<&str>,
    ) -> Self {
        let manifest = config
            .manifest_path()
            .or(room_manifest)
            .map(str::to_string);
        Self {
            id,
            pos: Vec2::new(config.x, config.y),
            size: Vec2::splat(side),
            locked: config.locked.as_ref().is_some_and(|lock| lock.engaged()),
            solid: config.solid,
            moveable: config.moveable,
            manifest,
            state,
            config,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChestState {
        self.state
    }

    /// Box occupied by the chest.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_top_left(self.pos, self.size)
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Whether the player (or another chest) can shove this one.
    #[must_use]
    pub fn is_pushable(&self) -> bool {
        self.moveable && !self.locked
    }

    /// Name drawn above the chest.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.config.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Lock currency and price from the current configuration.
    #[must_use]
    pub fn lock_spec(&self) -> LockSpec {
        LockSpec::from_config(self.config.locked.as_ref())
    }

    /// Whether the interact prompt shows for a player at `player_pos`.
    #[must_use]
    pub fn shows_prompt(&self, player_pos: Vec2, radius: f32) -> bool {
        self.state == ChestState::Closed && player_pos.distance(self.center()) < radius
    }

    /// Moves along the lifecycle. Returns `false` and leaves the state alone
    /// if the transition is not permitted.
    pub fn advance(&mut self, next: ChestState) -> bool {
        if !self.state.can_advance_to(next) {
            return false;
        }
        debug!(chest = %self.id, from = %self.state, to = %next, "chest transition");
        self.state = next;
        true
    }

    /// Flips a closed chest open. Returns `true` exactly once per chest.
    pub fn open(&mut self) -> bool {
        self.advance(ChestState::Open)
    }

    /// Rolls a hidden chest's reveal once its room is cleared.
    ///
    /// Returns `None` if the chest is not hidden. A `spawnsOnClear` object
    /// with a `spawnChance` requires a uniform draw below the chance; the
    /// roll is consumed either way.
    pub fn reveal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Reveal> {
        if self.state != ChestState::Hidden {
            return None;
        }
        let chance = self
            .config
            .spawns_on_clear
            .as_ref()
            .and_then(Toggle::spec)
            .map(|spec| spec.spawn_chance.unwrap_or(1.0));

        let appears = chance.map_or(true, |chance| rng.gen::<f64>() < chance);
        if appears {
            self.advance(ChestState::Closed);
            Some(Reveal::Appeared)
        } else {
            self.advance(ChestState::Despawned);
            Some(Reveal::Despawned)
        }
    }

    /// Replaces the configuration with a restocked offer.
    ///
    /// Visible chests go back to `Closed`. Hidden chests keep waiting for
    /// their reveal and despawned chests stay gone.
    pub fn restock(&mut self, config: Arc<ChestConfig>, locked: bool) {
        self.locked = locked;
        self.config = config;
        if self.state == ChestState::Open {
            debug!(chest = %self.id, "restocked open chest");
            self.state = ChestState::Closed;
        }
    }
}

/// Initial state for a chest entry, or `None` if it should not spawn.
///
/// Consumes a random draw only when `instantSpawn` is an active object with
/// a `spawnChance`.
pub fn initial_state<R: Rng + ?Sized>(config: &ChestConfig, rng: &mut R) -> Option<ChestState> {
    let on_clear = config.spawns_on_clear.as_ref();

    let spawn_now = match &config.instant_spawn {
        Some(Toggle::Flag(flag)) => *flag,
        Some(Toggle::Spec(spec)) => {
            spec.active == Some(true)
                && spec
                    .spawn_chance
                    .map_or(true, |chance| rng.gen::<f64>() <= chance)
        }
        None => !on_clear.is_some_and(Toggle::is_set),
    };

    let spawn_later = match on_clear {
        Some(Toggle::Flag(flag)) => *flag,
        Some(Toggle::Spec(spec)) => spec.active != Some(false),
        None => false,
    };

    if spawn_now {
        Some(ChestState::Closed)
    } else if spawn_later {
        Some(ChestState::Hidden)
    } else {
        None
    }
}

/// Builds the initial chest set for a room.
pub fn spawn_chests<R: Rng + ?Sized>(map: &ChestMap, side: f32, rng: &mut R) -> Vec<Chest> {
    map.entries
        .iter()
        .filter_map(|(id, config)| {
            let Some(state) = initial_state(config, rng) else {
                debug!(chest = %id, "chest not spawned");
                return None;
            };
            Some(Chest::from_config(
                ChestId::new(id.as_str()),
                Arc::new(config.clone()),
                state,
                side,
                map.default_manifest.as_deref(),
            ))
        })
        .collect()
}
