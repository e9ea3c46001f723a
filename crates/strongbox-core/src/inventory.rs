//! Player currency counters and their external persistence.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;

/// Store key for the persisted red shard total.
pub const RED_SHARD_KEY: &str = "currency_red";

/// The three currencies chests and switches charge in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Keys.
    Keys,
    /// Red shards (persisted across sessions).
    RedShards,
    /// Green shards.
    GreenShards,
}

impl Currency {
    /// Key under which the running total is persisted, if it is.
    #[must_use]
    pub const fn store_key(self) -> Option<&'static str> {
        match self {
            Self::RedShards => Some(RED_SHARD_KEY),
            Self::Keys | Self::GreenShards => None,
        }
    }
}

/// Player inventory counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    /// Keys held.
    pub keys: u32,
    /// Red shards held.
    pub red_shards: u32,
    /// Green shards held.
    pub green_shards: u32,
}

impl Inventory {
    /// Current balance of a currency.
    #[must_use]
    pub fn balance(&self, currency: Currency) -> u32 {
        match currency {
            Currency::Keys => self.keys,
            Currency::RedShards => self.red_shards,
            Currency::GreenShards => self.green_shards,
        }
    }

    fn counter_mut(&mut self, currency: Currency) -> &mut u32 {
        match currency {
            Currency::Keys => &mut self.keys,
            Currency::RedShards => &mut self.red_shards,
            Currency::GreenShards => &mut self.green_shards,
        }
    }

    /// Debits `cost` if the balance covers it.
    ///
    /// Returns the new balance on success; leaves the counter untouched and
    /// returns `None` otherwise.
    pub fn try_debit(&mut self, currency: Currency, cost: u32) -> Option<u32> {
        let counter = self.counter_mut(currency);
        let remaining = counter.checked_sub(cost)?;
        *counter = remaining;
        Some(remaining)
    }

    /// Adds to a counter, saturating.
    pub fn credit(&mut self, currency: Currency, amount: u32) {
        let counter = self.counter_mut(currency);
        *counter = counter.saturating_add(amount);
    }
}

/// External key-value store for currency totals that outlive a session.
pub trait CurrencyStore: Send {
    /// Records the latest total for `key`.
    fn persist(&mut self, key: &str, value: u32);

    /// Last recorded total for `key`.
    fn load(&self, key: &str) -> Option<u32>;
}

/// In-memory store, used by tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryCurrencyStore {
    values: HashMap<String, u32>,
}

impl MemoryCurrencyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CurrencyStore for MemoryCurrencyStore {
    fn persist(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_string(), value);
    }

    fn load(&self, key: &str) -> Option<u32> {
        self.values.get(key).copied()
    }
}

/// Store backed by a JSON object on disk, rewritten on every change.
#[derive(Debug, Clone)]
pub struct JsonFileCurrencyStore {
    path: PathBuf,
    values: BTreeMap<String, u32>,
}

impl JsonFileCurrencyStore {
    /// Opens the store, reading existing totals if the file exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or is not
    /// a JSON object of non-negative integers.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl CurrencyStore for JsonFileCurrencyStore {
    fn persist(&mut self, key: &str, value: u32) {
        self.values.insert(key.to_string(), value);
        if let Err(err) = self.flush() {
            warn!(path = %self.path.display(), key, %err, "failed to persist currency total");
        }
    }

    fn load(&self, key: &str) -> Option<u32> {
        self.values.get(key).copied()
    }
}
