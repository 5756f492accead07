//! Handler registry.
//!
//! Maps each [`EventType`] to the handler that performs its gameplay effect.
//! The engine is handler-agnostic: it only knows how to look a handler up and
//! call it with the entity, the event record and the player.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::Vec2;
use crate::events::{EventRecord, EventType, LootEntry};

/// Suggested follow-up actions. Hints for the caller; the engine never acts on them.
pub mod next_action {
    pub const START_BATTLE: &str = "start_battle";
    pub const SHOW_DIALOG: &str = "show_dialog";
    pub const SHOW_LOOT: &str = "show_loot";
    pub const CHANGE_MAP: &str = "change_map";
    pub const OPEN_SHOP: &str = "open_shop";
    pub const PLAY_CUTSCENE: &str = "play_cutscene";
}

/// Typed data returned by a handler.
///
/// `Custom` is the escape hatch for fields the typed variants do not cover.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HandlerPayload {
    #[default]
    None,
    Battle {
        enemies: Vec<String>,
    },
    Loot {
        items: Vec<LootEntry>,
        gold: u32,
    },
    Teleport {
        map: Option<String>,
        target: Vec2,
    },
    Damage {
        amount: i32,
    },
    Message {
        text: String,
    },
    QuestUpdate {
        quest_id: String,
        stage: Option<String>,
    },
    Custom {
        fields: BTreeMap<String, serde_json::Value>,
    },
}

/// Structured result of running a handler.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerResult {
    /// Whether the gameplay effect happened.
    pub success: bool,

    /// Player- or log-facing description.
    pub message: String,

    /// Data produced by the handler.
    pub payload: HandlerPayload,

    /// Hint for what the caller should do next (e.g. `"start_battle"`).
    pub next_action: Option<String>,
}

impl HandlerResult {
    /// A successful result.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload: HandlerPayload::None,
            next_action: None,
        }
    }

    /// A failed result. The event still counts as fired.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: HandlerPayload::None,
            next_action: None,
        }
    }

    /// Attach a payload (builder pattern).
    #[must_use]
    pub fn with_payload(mut self, payload: HandlerPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Attach a follow-up hint (builder pattern).
    #[must_use]
    pub fn with_next_action(mut self, action: impl Into<String>) -> Self {
        self.next_action = Some(action.into());
        self
    }
}

/// Performs the gameplay effect of a triggered event.
///
/// Handlers run synchronously inside the tick. Anything that takes longer
/// than a frame (a battle transition, a cutscene) should be queued by the
/// handler and reported through `next_action`.
///
/// Any `FnMut(&E, &EventRecord, &E) -> HandlerResult` closure is a handler.
pub trait EventHandler<E> {
    /// Handle a fire of `record`, owned by `entity`, caused by `player`.
    fn handle(&mut self, entity: &E, record: &EventRecord, player: &E) -> HandlerResult;
}

impl<E, F> EventHandler<E> for F
where
    F: FnMut(&E, &EventRecord, &E) -> HandlerResult,
{
    fn handle(&mut self, entity: &E, record: &EventRecord, player: &E) -> HandlerResult {
        self(entity, record, player)
    }
}

/// Registry for event handlers, one per event type.
pub struct HandlerRegistry<E> {
    handlers: FxHashMap<EventType, Box<dyn EventHandler<E>>>,
}

impl<E> Default for HandlerRegistry<E> {
    fn default() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }
}

impl<E> std::fmt::Debug for HandlerRegistry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("HandlerRegistry")
            .field("types", &types)
            .finish()
    }
}

impl<E> HandlerRegistry<E> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any existing one for the type.
    ///
    /// Returns true if a handler was replaced.
    pub fn register(&mut self, event_type: EventType, handler: impl EventHandler<E> + 'static) -> bool {
        self.handlers
            .insert(event_type, Box::new(handler))
            .is_some()
    }

    /// Remove the handler for a type. Returns true if one was registered.
    pub fn unregister(&mut self, event_type: EventType) -> bool {
        self.handlers.remove(&event_type).is_some()
    }

    /// Check if a type has a handler.
    #[must_use]
    pub fn contains(&self, event_type: EventType) -> bool {
        self.handlers.contains_key(&event_type)
    }

    /// Run the handler for the record's type.
    ///
    /// Returns `None` if no handler is registered for it.
    pub fn dispatch(&mut self, entity: &E, record: &EventRecord, player: &E) -> Option<HandlerResult> {
        self.handlers
            .get_mut(&record.event_type)
            .map(|handler| handler.handle(entity, record, player))
    }

    /// Get the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
