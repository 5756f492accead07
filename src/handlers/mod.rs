//! Pluggable handlers invoked when an event fires.
//!
//! Handlers are where gameplay happens (start a battle, open a dialog, hand
//! out loot). The trigger engine does not define any of them; games register
//! one per [`EventType`](crate::events::EventType) on the manager.
//!
//! ## Example
//!
//! ```
//! use world_events::events::{EventRecord, EventType};
//! use world_events::handlers::{next_action, HandlerRegistry, HandlerResult};
//! use world_events::manager::SpatialEntity;
//!
//! let mut handlers: HandlerRegistry<SpatialEntity> = HandlerRegistry::new();
//! handlers.register(
//!     EventType::Battle,
//!     |_: &SpatialEntity, record: &EventRecord, _: &SpatialEntity| {
//!         HandlerResult::ok(format!("battle {} begins", record.id))
//!             .with_next_action(next_action::START_BATTLE)
//!     },
//! );
//! assert!(handlers.contains(EventType::Battle));
//! ```

mod registry;

pub use registry::{next_action, EventHandler, HandlerPayload, HandlerRegistry, HandlerResult};
