//! Error types.
//!
//! Nothing in the per-tick path returns these. They surface at the edges:
//! parsing a room descriptor, talking to the content source, and persisting
//! currency totals.

use thiserror::Error;

/// A room descriptor or simulation config could not be interpreted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON or does not match the expected shape.
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    /// A single chest entry in a room's chest map is malformed.
    #[error("invalid chest entry `{id}`: {source}")]
    InvalidChest {
        /// Key of the offending entry.
        id: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// A reserved manifest key holds something other than a path string.
    #[error("room manifest key `{0}` must be a string")]
    InvalidManifestKey(String),
}

/// Fetching a document from the content source failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No document exists at the path.
    #[error("content not found: {0}")]
    NotFound(String),

    /// Reading the document failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("malformed JSON at {path}: {source}")]
    Malformed {
        /// Path that was requested.
        path: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },
}

/// A loot resolution for one chest was aborted.
#[derive(Debug, Error)]
pub enum LootError {
    /// The manifest or an item template could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The manifest document does not have the manifest shape.
    #[error("invalid manifest {path}: {source}")]
    InvalidManifest {
        /// Manifest path.
        path: String,
        /// Underlying decode error.
        source: serde_json::Error,
    },

    /// The manifest carries neither an `items` nor an `unlocks` list.
    #[error("manifest {0} lists no items")]
    EmptyManifest(String),
}

/// Persisting currency totals failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("currency store I/O: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of counters.
    #[error("currency store format: {0}")]
    Json(#[from] serde_json::Error),
}
