//! Lock interpretation and the unlock economy.
//!
//! A chest's `locked` field is either `true` (one key) or an object naming a
//! currency and a price. Currency names are free-form in room data, so they
//! are normalized here before any counter is touched.

use std::fmt;

use tracing::{debug, warn};

use crate::config::{Amount, LockConfig};
use crate::feedback::Color;
use crate::inventory::{Currency, CurrencyStore, Inventory};

/// Price used when a lock does not state one, or states a numeric zero.
///
/// Only the text `"0"` makes a lock free.
pub const DEFAULT_COST: u32 = 1;

/// Normalized currency a lock charges.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnlockType {
    /// Keys.
    Key,
    /// Red shards.
    RedShard,
    /// Green shards.
    GreenShard,
    /// A name this build does not know. Such locks open for free.
    Unrecognized(String),
}

impl UnlockType {
    /// Normalizes a free-form currency name.
    ///
    /// Matching is case-insensitive and by substring: anything mentioning
    /// "red" is red shards, anything mentioning "green" (or the common typo
    /// "geen") is green shards, and green wins when both appear. An empty
    /// name means keys.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        if lowered.contains("green") || lowered.contains("geen") {
            Self::GreenShard
        } else if lowered.contains("red") {
            Self::RedShard
        } else if lowered.is_empty() || lowered == "key" {
            Self::Key
        } else {
            Self::Unrecognized(lowered)
        }
    }

    /// Counter this type debits, if known.
    #[must_use]
    pub fn currency(&self) -> Option<Currency> {
        match self {
            Self::Key => Some(Currency::Keys),
            Self::RedShard => Some(Currency::RedShards),
            Self::GreenShard => Some(Currency::GreenShards),
            Self::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for UnlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key => f.write_str("key"),
            Self::RedShard => f.write_str("redshard"),
            Self::GreenShard => f.write_str("greenshard"),
            Self::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Currency and price of a lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSpec {
    /// What the lock charges.
    pub unlock_type: UnlockType,
    /// How much.
    pub cost: u32,
}

impl Default for LockSpec {
    fn default() -> Self {
        Self {
            unlock_type: UnlockType::Key,
            cost: DEFAULT_COST,
        }
    }
}

impl LockSpec {
    /// Derives the spec from a chest's `locked` field.
    ///
    /// Anything other than the object form is a one-key lock.
    #[must_use]
    pub fn from_config(config: Option<&LockConfig>) -> Self {
        match config {
            Some(LockConfig::Spec(spec)) => Self {
                unlock_type: spec
                    .unlock_type
                    .as_deref()
                    .map_or(UnlockType::Key, UnlockType::normalize),
                cost: spec
                    .cost
                    .as_ref()
                    .filter(|amount| !matches!(amount, Amount::Number(n) if *n == 0.0))
                    .and_then(Amount::value)
                    .unwrap_or(DEFAULT_COST),
            },
            _ => Self::default(),
        }
    }

    /// Price tag drawn above a locked chest.
    #[must_use]
    pub fn label(&self) -> (String, Color) {
        match &self.unlock_type {
            UnlockType::Key if self.cost > 1 => (format!("{} KEYS", self.cost), Color::GOLD),
            UnlockType::Key => ("LOCKED (KEY)".to_string(), Color::GOLD),
            UnlockType::RedShard => (format!("{} RED", self.cost), Color::RED),
            UnlockType::GreenShard => (format!("{} GREEN", self.cost), Color::GREEN),
            UnlockType::Unrecognized(raw) => {
                (format!("{} {}", self.cost, raw.to_uppercase()), Color::GREEN)
            }
        }
    }
}

/// Result of an unlock attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlockOutcome {
    /// Whether the chest may open.
    pub authorized: bool,
    /// Message to float above the chest.
    pub message: Option<String>,
    /// Colour of the message.
    pub color: Color,
}

/// Attempts to pay for a lock out of the player's inventory.
///
/// On success the counter is debited by exactly `spec.cost`, and red shard
/// totals are written to `store`. On failure nothing changes. Unrecognized
/// lock types are authorized without charge.
pub fn try_unlock(
    spec: &LockSpec,
    inventory: &mut Inventory,
    store: &mut dyn CurrencyStore,
) -> UnlockOutcome {
    let Some(currency) = spec.unlock_type.currency() else {
        warn!(unlock_type = %spec.unlock_type, "unknown unlock type, opening without charge");
        return UnlockOutcome {
            authorized: true,
            message: None,
            color: Color::WHITE,
        };
    };

    let cost = spec.cost;
    match inventory.try_debit(currency, cost) {
        Some(remaining) => {
            if let Some(key) = currency.store_key() {
                store.persist(key, remaining);
            }
            debug!(?currency, cost, remaining, "lock paid");
            let (message, color) = match currency {
                Currency::Keys => ("Unlocked!".to_string(), Color::GOLD),
                Currency::RedShards => (format!("-{cost} Red"), Color::RED),
                Currency::GreenShards => (format!("-{cost} Green"), Color::GREEN),
            };
            UnlockOutcome {
                authorized: true,
                message: Some(message),
                color,
            }
        }
        None => {
            let (message, color) = match currency {
                Currency::Keys => ("Locked (Need Key)".to_string(), Color::RED),
                Currency::RedShards => (format!("Need {cost} Red Shards"), Color::RED),
                Currency::GreenShards => (format!("Need {cost} Green Shards"), Color::GREEN),
            };
            UnlockOutcome {
                authorized: false,
                message: Some(message),
                color,
            }
        }
    }
}
