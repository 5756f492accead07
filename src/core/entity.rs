//! Entity and event identification.
//!
//! Two kinds of identity flow through the engine:
//! - [`EntityId`]: the spatial object in the world (a chest sprite, a trap tile,
//!   the player). Assigned by the host game's entity storage.
//! - [`EventId`]: the designer-authored key of the event attached to an entity.
//!   This is the primary key of save data and of prerequisite references, so it
//!   must stay stable across builds of the game content.
//!
//! ## Usage
//!
//! ```
//! use world_events::core::{EntityId, EventId};
//!
//! let chest = EntityId(12);
//! let event = EventId::new("forest_chest_01");
//!
//! assert_eq!(chest.raw(), 12);
//! assert_eq!(event.as_str(), "forest_chest_01");
//! assert_eq!(format!("{}", chest), "Entity(12)");
//! ```

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Unique identifier for any world entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Stable identifier of an event record.
///
/// Serialized as a bare string so save files stay readable and hand-editable.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Create a new event ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check for the empty ID, which is never valid for a registered event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for EventId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    #[test]
    fn test_entity_id() {
        let id = EntityId::new(7);
        assert_eq!(id.raw(), 7);
        assert_eq!(EntityId::from(7), id);
        assert_eq!(format!("{}", id), "Entity(7)");
    }

    #[test]
    fn test_event_id_lookup_by_str() {
        let mut map = FxHashMap::default();
        map.insert(EventId::new("door_a"), 1);

        assert_eq!(map.get("door_a"), Some(&1));
        assert_eq!(map.get("door_b"), None);
    }

    #[test]
    fn test_event_id_empty() {
        assert!(EventId::default().is_empty());
        assert!(!EventId::from("x").is_empty());
    }

    #[test]
    fn test_event_id_serializes_as_string() {
        let id = EventId::new("boss_gate");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"boss_gate\"");

        let deserialized: EventId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
