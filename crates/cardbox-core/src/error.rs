//! Error types for cardbox.
//!
//! `StoreError` describes failures of a storage backend. `CardboxError` is
//! what the repository and study session surface to callers. Both live in
//! `cardbox-core` so backends and front-ends agree on one vocabulary.

use thiserror::Error;

/// Errors raised by a [`CardStore`](crate::traits::CardStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the underlying medium failed.
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized for writing.
    #[error("failed to serialize key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by list and card operations.
#[derive(Debug, Error)]
pub enum CardboxError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No list matches the given id or name.
    #[error("list not found: {0}")]
    ListNotFound(String),

    /// No card with this id exists in the list.
    #[error("card not found: {0}")]
    CardNotFound(String),

    /// User-provided text was rejected (blank prompt, blank list name, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An export/import envelope could not be parsed.
    #[error("invalid envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

impl CardboxError {
    /// Returns `true` when the error names something that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CardboxError::ListNotFound(_) | CardboxError::CardNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CardboxError>;
