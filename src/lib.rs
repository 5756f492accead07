//! # world-events
//!
//! Trigger and persistence engine for world events in a tile-based RPG:
//! chests, traps, doors, dialog hotspots, random-encounter zones.
//!
//! ## Design Principles
//!
//! 1. **Handler-Agnostic**: The engine decides *when* an event fires. What
//!    happens (a battle, a dialog, loot) is a handler registered by the game.
//!
//! 2. **Explicit Dependencies**: Configuration, time and quest state are
//!    injected into the manager. No global singletons.
//!
//! 3. **Durable Progress**: Event progress round-trips through a versioned,
//!    validated save document without breaking lifecycle invariants.
//!
//! ## Architecture
//!
//! - **Edge Detection**: An event fires on the tick its condition starts
//!   holding, not on every tick it keeps holding. Battle events are exempt.
//!
//! - **Completion Index**: Prerequisites are checked against a manager-owned
//!   id→completed map, never by walking sibling records.
//!
//! - **Indexed Lookups**: Event id → owning entity is a hash index, so manual
//!   triggers and queries never scan the entity list.
//!
//! ## Modules
//!
//! - `core`: Entity/event IDs, geometry, clock, configuration
//! - `events`: Event record, lifecycle state machine, payloads
//! - `triggers`: Trigger condition evaluation
//! - `handlers`: Handler trait, results and registry
//! - `manager`: The event manager (tick loop, gating, dispatch, queries)
//! - `persistence`: Save documents, validation and on-disk store

pub mod core;
pub mod events;
pub mod handlers;
pub mod manager;
pub mod persistence;
pub mod triggers;

// Re-export commonly used types
pub use crate::core::{
    ActiveMode, Bounds, Clock, EngineConfig, EntityId, EventId, GameMode, ManualClock,
    SaveFormat, SystemClock, Vec2,
};

pub use crate::events::{
    EventPayload, EventRecord, EventType, LifecycleState, QuestRequirement, TriggerKind,
};

pub use crate::triggers::{ConditionContext, QuestStateProvider, TriggerEvaluator};

pub use crate::handlers::{next_action, EventHandler, HandlerPayload, HandlerRegistry, HandlerResult};

pub use crate::manager::{
    EventEntity, EventManager, EventStats, FiredEvent, HistoryEntry, Registration, SpatialEntity,
    TriggerError,
};

pub use crate::persistence::{PersistenceError, SaveDocument, SaveStore, ValidationError};
