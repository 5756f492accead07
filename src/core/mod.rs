//! Core engine types: identifiers, geometry, time, configuration.
//!
//! This module contains the building blocks shared by every other module.
//! Games configure these via `EngineConfig` rather than modifying the core.

pub mod entity;
pub mod geometry;
pub mod clock;
pub mod config;

pub use entity::{EntityId, EventId};
pub use geometry::{Bounds, Vec2};
pub use clock::{elapsed_between, Clock, ManualClock, SystemClock};
pub use config::{
    ActiveMode, EngineConfig, GameMode, SaveFormat, DEFAULT_PROXIMITY_RADIUS,
    DEFAULT_ROOM_ENTRY_RADIUS,
};
