//! Event orchestration.
//!
//! ## Key Types
//!
//! - [`EventManager`]: Owns entities, player, handlers and indexes; runs the
//!   per-tick scan and the save/load cycle
//! - [`EventEntity`]: What the manager needs from an entity
//! - [`SpatialEntity`]: Ready-made entity with a bounding box
//! - [`HistoryEntry`] / [`FiredEvent`]: What fired, when, and with what result
//! - [`TriggerError`]: Why a manual trigger was refused

mod entity;
mod error;
mod event_manager;
mod history;
mod save;
mod stats;

pub use entity::{EventEntity, SpatialEntity};
pub use error::TriggerError;
pub use event_manager::{EventManager, Registration};
pub use history::{FiredEvent, HistoryEntry};
pub use stats::EventStats;
