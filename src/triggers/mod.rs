//! Trigger evaluation for world events.
//!
//! Each event names a [`TriggerKind`](crate::events::TriggerKind). Every tick
//! the manager builds a [`ConditionContext`] for the event's entity and the
//! player and asks the [`TriggerEvaluator`] whether the condition holds.
//!
//! ## Conditions
//!
//! | Trigger       | Holds when                                           |
//! |---------------|------------------------------------------------------|
//! | `OnTouch`     | entity and player boxes overlap on both axes         |
//! | `OnProximity` | center distance ≤ event radius (default 32)          |
//! | `OnRoomEntry` | center distance ≤ room radius (default 64)           |
//! | `OnTimeout`   | armed and the event's timeout has elapsed            |
//! | `OnQuestState`| the injected quest provider reports the state        |
//! | `OnInteract`  | never during the scan (manual entry point only)      |
//! | `Manual`      | never during the scan (manual entry point only)      |
//!
//! ## Example Usage
//!
//! ```
//! use chrono::Utc;
//! use world_events::core::Bounds;
//! use world_events::events::{EventRecord, EventType, TriggerKind};
//! use world_events::triggers::{ConditionContext, TriggerEvaluator};
//!
//! let ambush = EventRecord::new("ambush", TriggerKind::OnTouch, EventType::Battle);
//!
//! let entity = Some(Bounds::new(150.0, 100.0, 32.0, 32.0));
//! let player = Some(Bounds::new(150.0, 100.0, 32.0, 32.0));
//! let ctx = ConditionContext::new(entity, player, Utc::now());
//!
//! assert!(TriggerEvaluator::evaluate(&ambush, &ctx));
//! ```

mod condition;

pub use condition::{ConditionContext, QuestStateProvider, TriggerEvaluator};
