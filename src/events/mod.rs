//! Event records: the persistent state of triggerable world events.
//!
//! ## Key Types
//!
//! - [`EventRecord`]: One triggerable event and its lifecycle
//! - [`TriggerKind`]: The condition category that makes it eligible
//! - [`EventType`]: Selects the handler that performs the gameplay effect
//! - [`LifecycleState`]: Active / Triggered / Completed / Disabled
//! - [`EventPayload`]: Typed handler data, opaque to the engine
//!
//! Records are plain data. All gating lives on the record itself
//! (`can_trigger`, `trigger`, `reset`), so the same rules apply whether a
//! fire comes from the tick scan or from a manual trigger.

mod payload;
mod record;

pub use payload::{EventPayload, LootEntry};
pub use record::{
    ConditionData, EventRecord, EventType, LifecycleState, Presentation, QuestRequirement,
    TriggerKind,
};
