//! Saving and restoring event progress.
//!
//! ## Key Types
//!
//! - [`SaveDocument`]: Versioned snapshot of every event record plus the
//!   completion index and game mode
//! - [`EventStateSnapshot`]: The mutable subset of one event record
//! - [`SaveStore`]: Writes/reads documents on disk (archive + latest copy)
//!
//! The manager drives the cycle (`save_event_state`, `load_event_state`,
//! `apply_event_state`, `clear_event_state`). Documents are validated on
//! load and again before being applied; an invalid document is never
//! partially applied.

mod document;
mod error;
mod store;

pub use document::{EventStateSnapshot, SaveDocument, SAVE_FORMAT_VERSION};
pub use error::{PersistenceError, Result, ValidationError};
pub use store::SaveStore;
