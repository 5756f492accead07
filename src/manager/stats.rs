//! Aggregate statistics for diagnostics and tooling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::{EventType, LifecycleState};

/// Snapshot of the manager's event population.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStats {
    /// Registered entities carrying an event.
    pub total: usize,
    /// Events in the active-events index.
    pub active: usize,
    /// Events marked completed in the completion index.
    pub completed: usize,
    pub by_type: BTreeMap<EventType, usize>,
    pub by_state: BTreeMap<LifecycleState, usize>,
    pub history_len: usize,
    pub handlers: usize,
}

impl EventStats {
    /// Count for one event type (0 if none).
    #[must_use]
    pub fn count_of_type(&self, event_type: EventType) -> usize {
        self.by_type.get(&event_type).copied().unwrap_or(0)
    }

    /// Count for one lifecycle state (0 if none).
    #[must_use]
    pub fn count_in_state(&self, state: LifecycleState) -> usize {
        self.by_state.get(&state).copied().unwrap_or(0)
    }
}
