//! Errors returned by manual event control.

use std::time::Duration;

use thiserror::Error;

use crate::core::EventId;
use crate::events::{EventType, LifecycleState};

/// Why a manual trigger (or other by-id control) did not happen.
///
/// These are normal runtime outcomes, e.g. a UI asking to interact with a
/// chest that was already opened, so they are values and not panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("unknown event `{0}`")]
    UnknownEvent(EventId),

    #[error("no player is set")]
    NoPlayer,

    #[error("event `{event_id}` cannot trigger (state {state:?}, cooldown remaining {cooldown_remaining:?})")]
    CannotTrigger {
        event_id: EventId,
        state: LifecycleState,
        cooldown_remaining: Duration,
    },

    #[error("no handler registered for {event_type:?} (event `{event_id}`)")]
    NoHandler {
        event_id: EventId,
        event_type: EventType,
    },
}
