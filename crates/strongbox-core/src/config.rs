//! Configuration: simulation tunables and the declarative room data.
//!
//! Room data is hand-authored JSON that has accumulated legacy spellings and
//! overloaded fields over time (`manifest`/`manfest`, flags that are either a
//! boolean or an object, costs written as strings). The types here accept all
//! of those shapes; interpretation of what they *mean* lives next to the code
//! that acts on them (`chest`, `lock`, `switch`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::geometry::RoomBounds;

// =============================================================================
// Simulation Tunables
// =============================================================================

/// Tunables for the chest/switch simulation.
///
/// Every field has a default matching the shipped game, so a partial JSON
/// document only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Side length of a chest box.
    pub chest_size: f32,
    /// Player-to-chest-centre distance for the interact key and prompt.
    pub interact_radius: f32,
    /// Bomb-to-chest distance that blows a chest open.
    pub blast_radius: f32,
    /// Padding added around a chest when pushing the player back.
    pub pushback_padding: f32,
    /// Minimum displacement for a shoved chest to count as having moved.
    pub push_epsilon: f32,
    /// Chest-vs-chest solver passes per tick.
    pub solver_iterations: u32,
    /// Room width (clamp bound).
    pub room_width: f32,
    /// Room height (clamp bound).
    pub room_height: f32,
    /// Distance chests are kept from each room edge.
    pub boundary_inset: f32,
    /// Ticks a switch ignores the player after activating or refusing.
    pub switch_cooldown_ticks: u32,
    /// Extra distance beyond a switch's radius before it releases.
    pub switch_release_margin: f32,
    /// Activation radius for switches that do not declare one.
    pub default_switch_size: f32,
    /// Directory that content paths are resolved against.
    pub content_root: PathBuf,
    /// How spawned loot is scattered.
    pub loot: LootSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            chest_size: 40.0,
            interact_radius: 120.0,
            blast_radius: 100.0,
            pushback_padding: 25.0,
            push_epsilon: 0.1,
            solver_iterations: 2,
            room_width: 800.0,
            room_height: 600.0,
            boundary_inset: 20.0,
            switch_cooldown_ticks: 60,
            switch_release_margin: 10.0,
            default_switch_size: 40.0,
            content_root: PathBuf::from("json"),
            loot: LootSettings::default(),
        }
    }
}

impl SimConfig {
    /// Parses a (possibly partial) JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Clamp rectangle for chests.
    #[must_use]
    pub fn room_bounds(&self) -> RoomBounds {
        RoomBounds {
            width: self.room_width,
            height: self.room_height,
            inset: self.boundary_inset,
        }
    }
}

/// Scatter parameters for loot dropped by an opened chest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootSettings {
    /// Offset from the chest's top-left corner to the drop point.
    pub drop_offset: f32,
    /// Full width of the random positional jitter.
    pub jitter: f32,
    /// Full width of the random initial velocity per axis.
    pub velocity_spread: f32,
    /// Velocity damping applied by the pickup system.
    pub friction: f32,
    /// Pickup radius.
    pub radius: f32,
}

impl Default for LootSettings {
    fn default() -> Self {
        Self {
            drop_offset: 10.0,
            jitter: 20.0,
            velocity_spread: 5.0,
            friction: 0.9,
            radius: 15.0,
        }
    }
}

// =============================================================================
// Legacy Value Shapes
// =============================================================================

/// A feature flag that is either a plain boolean or an object.
///
/// Used for `instantSpawn`, `spawnsOnClear` and `canBomb`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    /// `true` / `false`.
    Flag(bool),
    /// `{ "active": ..., "spawnChance": ... }`.
    Spec(ToggleSpec),
}

/// Object form of a [`Toggle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSpec {
    /// Explicit on/off. Absent is distinct from `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Probability in `[0, 1]` that the feature fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_chance: Option<f64>,
}

impl Toggle {
    /// Whether the raw value is truthy (any object counts).
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Spec(_) => true,
        }
    }

    /// The object form, if this is one.
    #[must_use]
    pub fn spec(&self) -> Option<&ToggleSpec> {
        match self {
            Self::Flag(_) => None,
            Self::Spec(spec) => Some(spec),
        }
    }
}

/// A non-negative amount written as a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// `3`, `3.0`.
    Number(f64),
    /// `"3"`, `"3 shards"`.
    Text(String),
}

impl Amount {
    /// Integer value, reading leading digits from text.
    ///
    /// Negative and unreadable amounts yield `None`.
    #[must_use]
    pub fn value(&self) -> Option<u32> {
        match self {
            Self::Number(n) if n.is_finite() && *n >= 0.0 => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Some(n.trunc().min(f64::from(u32::MAX)) as u32)
            }
            Self::Number(_) => None,
            Self::Text(text) => {
                let digits: String = text
                    .trim_start()
                    .chars()
                    .take_while(char::is_ascii_digit)
                    .collect();
                digits.parse().ok()
            }
        }
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// `locked` field of a chest: a boolean or a lock object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LockConfig {
    /// `true` means a one-key lock.
    Flag(bool),
    /// Full lock description.
    Spec(LockConfigSpec),
}

/// Object form of [`LockConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockConfigSpec {
    /// Whether the lock is engaged at spawn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Free-form currency name (`"key"`, `"red"`, `"greenshards"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_type: Option<String>,
    /// Price in units of the unlock currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Amount>,
}

impl LockConfig {
    /// Whether a chest with this lock starts locked.
    #[must_use]
    pub fn engaged(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Spec(spec) => spec.active == Some(true),
        }
    }
}

// =============================================================================
// Chest Configuration
// =============================================================================

/// Declarative configuration of one chest.
///
/// Chests hold this behind an `Arc` and never mutate it; a shop restock swaps
/// in a whole new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChestConfig {
    /// Top-left x.
    #[serde(default)]
    pub x: f32,
    /// Top-left y.
    #[serde(default)]
    pub y: f32,
    /// Display name shown above the chest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Render colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Spawn when the room loads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant_spawn: Option<Toggle>,
    /// Spawn once the room is cleared of enemies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawns_on_clear: Option<Toggle>,
    /// Lock description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<LockConfig>,
    /// Legacy flat price, superseded by `locked.cost`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Amount>,
    /// Legacy flat currency, superseded by `locked.unlockType`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_type: Option<String>,
    /// Blocks movement and bullets.
    #[serde(default)]
    pub solid: bool,
    /// Can be shoved by the player while unlocked.
    #[serde(default)]
    pub moveable: bool,
    /// `false` makes bullets bounce off instead of opening the chest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_shoot: Option<bool>,
    /// Whether bomb blasts open the chest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_bomb: Option<Toggle>,
    /// Glob patterns selecting loot from the manifest.
    #[serde(default)]
    pub contains: Vec<String>,
    /// Loot manifest path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,
    /// Misspelled loot manifest path found in older rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manfest: Option<String>,
}

impl ChestConfig {
    /// Chest-level manifest, preferring the legacy spelling as older rooms do.
    #[must_use]
    pub fn manifest_path(&self) -> Option<&str> {
        self.manfest.as_deref().or(self.manifest.as_deref())
    }

    /// Whether bullets may open the chest.
    #[must_use]
    pub fn shootable(&self) -> bool {
        self.can_shoot != Some(false)
    }

    /// Whether bomb blasts may open the chest.
    ///
    /// An object with `active: false` only disables blasting on chests
    /// without a lock. `locked: false` counts as no lock.
    #[must_use]
    pub fn bombable(&self) -> bool {
        match &self.can_bomb {
            Some(Toggle::Flag(false)) => false,
            Some(Toggle::Spec(spec)) if spec.active == Some(false) => self
                .locked
                .as_ref()
                .is_some_and(|lock| !matches!(lock, LockConfig::Flag(false))),
            _ => true,
        }
    }
}

/// The `chests` object of a room: chest entries plus a room-wide manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ChestMap {
    /// Room-level default manifest.
    pub default_manifest: Option<String>,
    /// Chest entries keyed by id, in id order.
    pub entries: Vec<(String, ChestConfig)>,
}

const MANIFEST_KEYS: [&str; 2] = ["manifest", "manfest"];

impl TryFrom<Map<String, Value>> for ChestMap {
    type Error = ConfigError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut default_manifest = None;
        let mut entries = Vec::with_capacity(map.len());

        for key in MANIFEST_KEYS {
            match map.get(key) {
                None | Some(Value::Null) => {}
                Some(Value::String(path)) => {
                    default_manifest.get_or_insert_with(|| path.clone());
                }
                Some(_) => return Err(ConfigError::InvalidManifestKey(key.to_string())),
            }
        }

        for (id, value) in map {
            if MANIFEST_KEYS.contains(&id.as_str()) {
                continue;
            }
            let config = serde_json::from_value(value)
                .map_err(|source| ConfigError::InvalidChest { id: id.clone(), source })?;
            entries.push((id, config));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Self {
            default_manifest,
            entries,
        })
    }
}

// =============================================================================
// Switches and Rooms
// =============================================================================

/// Declarative configuration of one floor switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfig {
    /// Centre x.
    #[serde(default)]
    pub x: Option<f32>,
    /// Centre y.
    #[serde(default)]
    pub y: Option<f32>,
    /// Activation radius.
    #[serde(default)]
    pub size: Option<f32>,
    /// Action tag; `"shop"` restocks the room's chests.
    #[serde(default)]
    pub action: Option<String>,
    /// Green shards charged per activation.
    #[serde(default)]
    pub reroll_cost: Option<u32>,
    /// Fallback for `rerollCost`.
    #[serde(default)]
    pub default_cost: Option<u32>,
}

/// A field that may hold one value or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single object.
    One(T),
    /// A list.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Flattens into a list.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// What the room loader hands to the simulation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoomDescriptor {
    /// Room name, for logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Grid x of the room in the level.
    #[serde(default)]
    pub x: i32,
    /// Grid y of the room in the level.
    #[serde(default)]
    pub y: i32,
    /// Chest map.
    #[serde(default)]
    pub chests: Option<ChestMap>,
    /// Floor switches.
    #[serde(default)]
    pub switches: Option<OneOrMany<SwitchConfig>>,
}

impl RoomDescriptor {
    /// Parses a room descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed or a chest entry
    /// cannot be decoded.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
