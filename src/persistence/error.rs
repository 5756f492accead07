//! Error types raised while saving, loading and applying event state.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::EventId;
use crate::events::LifecycleState;

/// Reasons a save document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid save version {0}: must be a positive integer")]
    InvalidVersion(i64),

    #[error("save version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("save document is missing `{0}`")]
    MissingField(&'static str),

    #[error("event `{event_id}` is marked completed but its saved state is {state:?}")]
    CompletionMismatch {
        event_id: EventId,
        state: LifecycleState,
    },
}

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("invalid save document: {0}")]
    Validation(#[from] ValidationError),
}

impl PersistenceError {
    /// Wrap an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
