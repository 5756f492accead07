//! Execution history and per-fire outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, EventId};
use crate::events::{EventType, TriggerKind};
use crate::handlers::HandlerResult;

/// One entry in the append-only execution history.
///
/// Diagnostics and replay only. Future triggers never read it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub timestamp: DateTime<Utc>,
    pub trigger: TriggerKind,
    pub event_type: EventType,
    /// True if fired through the manual entry point.
    pub manual: bool,
    pub result: HandlerResult,
}

/// An event fired during an `update` tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FiredEvent {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub event_type: EventType,
    /// True if this fire completed the event.
    pub completed: bool,
    pub result: HandlerResult,
}
