//! The versioned save document and its validation rules.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ActiveMode, EventId, GameMode, SaveFormat};
use crate::events::{EventRecord, LifecycleState};

use super::error::{Result, ValidationError};

/// Current save format version.
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// The mutable subset of an event record, as persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStateSnapshot {
    pub state: LifecycleState,
    pub trigger_count: u32,
    pub max_triggers: u32,
    pub cooldown: Duration,
    pub prerequisites: SmallVec<[EventId; 4]>,
    pub can_repeat: bool,
    pub active_in: ActiveMode,
    pub last_triggered_at: Option<DateTime<Utc>>,
}

impl EventStateSnapshot {
    /// Overwrite the record's mutable fields from this snapshot.
    ///
    /// Identity, trigger kind, event type, condition data and payload are
    /// content, not progress, and stay as loaded from the game data.
    pub fn apply_to(&self, record: &mut EventRecord) {
        record.state = self.state;
        record.trigger_count = self.trigger_count;
        record.max_triggers = self.max_triggers;
        record.cooldown = self.cooldown;
        record.prerequisites.clone_from(&self.prerequisites);
        record.can_repeat = self.can_repeat;
        record.active_in = self.active_in;
        record.last_triggered_at = self.last_triggered_at;
    }
}

impl From<&EventRecord> for EventStateSnapshot {
    fn from(record: &EventRecord) -> Self {
        Self {
            state: record.state,
            trigger_count: record.trigger_count,
            max_triggers: record.max_triggers,
            cooldown: record.cooldown,
            prerequisites: record.prerequisites.clone(),
            can_repeat: record.can_repeat,
            active_in: record.active_in,
            last_triggered_at: record.last_triggered_at,
        }
    }
}

/// Versioned aggregate of all event progress.
///
/// ## JSON shape
///
/// ```json
/// {
///   "version": 1,
///   "savedAt": "2026-10-19T12:00:00Z",
///   "eventStates": { "forest_chest": { "state": "Completed", ... } },
///   "completedEvents": { "forest_chest": true },
///   "gameMode": "Exploration"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub event_states: BTreeMap<EventId, EventStateSnapshot>,
    pub completed_events: BTreeMap<EventId, bool>,
    pub game_mode: GameMode,
}

impl SaveDocument {
    /// Create an empty document at the current format version.
    #[must_use]
    pub fn new(saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            saved_at,
            event_states: BTreeMap::new(),
            completed_events: BTreeMap::new(),
            game_mode: GameMode::default(),
        }
    }

    /// True if the document carries no progress at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_states.is_empty() && self.completed_events.is_empty()
    }

    /// Check the document against the save rules.
    ///
    /// 1. `version` is positive and not newer than this build understands.
    /// 2. Every id marked completed whose snapshot exists has state `Completed`.
    ///
    /// Presence of the two maps is guaranteed by the type once decoded;
    /// [`SaveDocument::from_bytes`] reports missing maps in the raw input.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.version == 0 {
            return Err(ValidationError::InvalidVersion(0));
        }
        if self.version > SAVE_FORMAT_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.version,
                supported: SAVE_FORMAT_VERSION,
            });
        }

        for (event_id, _) in self.completed_events.iter().filter(|(_, done)| **done) {
            if let Some(snapshot) = self.event_states.get(event_id) {
                if snapshot.state != LifecycleState::Completed {
                    return Err(ValidationError::CompletionMismatch {
                        event_id: event_id.clone(),
                        state: snapshot.state,
                    });
                }
            }
        }

        Ok(())
    }

    /// Encode the document.
    pub fn to_bytes(&self, format: SaveFormat) -> Result<Vec<u8>> {
        Ok(match format {
            SaveFormat::Json => serde_json::to_vec_pretty(self)?,
            SaveFormat::Bincode => bincode::serialize(self)?,
        })
    }

    /// Decode a document. Does not run [`SaveDocument::validate`].
    ///
    /// JSON input is checked for a positive `version` and for present,
    /// non-null `eventStates` and `completedEvents` before decoding, so a
    /// hand-edited file gets a validation error instead of a parse error.
    pub fn from_bytes(format: SaveFormat, bytes: &[u8]) -> Result<Self> {
        match format {
            SaveFormat::Json => {
                let value: serde_json::Value = serde_json::from_slice(bytes)?;
                check_raw_json(&value)?;
                Ok(serde_json::from_value(value)?)
            }
            SaveFormat::Bincode => Ok(bincode::deserialize(bytes)?),
        }
    }
}

fn check_raw_json(value: &serde_json::Value) -> std::result::Result<(), ValidationError> {
    match value.get("version").map(serde_json::Value::as_i64) {
        None => return Err(ValidationError::MissingField("version")),
        Some(Some(version)) if version <= 0 => {
            return Err(ValidationError::InvalidVersion(version));
        }
        Some(None) => return Err(ValidationError::InvalidVersion(-1)),
        Some(Some(_)) => {}
    }

    for field in ["eventStates", "completedEvents"] {
        match value.get(field) {
            None | Some(serde_json::Value::Null) => {
                return Err(ValidationError::MissingField(field));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventType, TriggerKind};
    use crate::persistence::PersistenceError;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn completed_doc() -> SaveDocument {
        let mut record = EventRecord::new("chest", TriggerKind::OnTouch, EventType::Chest);
        record.trigger(at(0));

        let mut doc = SaveDocument::new(at(10));
        doc.event_states
            .insert(record.id.clone(), EventStateSnapshot::from(&record));
        doc.completed_events.insert(record.id.clone(), true);
        doc
    }

    #[test]
    fn test_empty_document_is_valid() {
        let doc = SaveDocument::new(at(0));
        assert!(doc.is_empty());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_consistent_document_is_valid() {
        assert!(completed_doc().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_version() {
        let mut doc = SaveDocument::new(at(0));
        doc.version = 0;
        assert_eq!(doc.validate(), Err(ValidationError::InvalidVersion(0)));
    }

    #[test]
    fn test_rejects_future_version() {
        let mut doc = SaveDocument::new(at(0));
        doc.version = SAVE_FORMAT_VERSION + 1;
        assert!(matches!(
            doc.validate(),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_rejects_completed_but_active() {
        let mut doc = completed_doc();
        if let Some(snapshot) = doc.event_states.get_mut("chest") {
            snapshot.state = LifecycleState::Active;
        }

        assert_eq!(
            doc.validate(),
            Err(ValidationError::CompletionMismatch {
                event_id: EventId::new("chest"),
                state: LifecycleState::Active,
            })
        );
    }

    #[test]
    fn test_completion_without_snapshot_is_valid() {
        let mut doc = SaveDocument::new(at(0));
        doc.completed_events.insert(EventId::new("removed_event"), true);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_false_completion_is_not_checked() {
        let mut doc = completed_doc();
        doc.completed_events.insert(EventId::new("chest"), false);
        if let Some(snapshot) = doc.event_states.get_mut("chest") {
            snapshot.state = LifecycleState::Active;
        }
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_snapshot_apply_keeps_content_fields() {
        let mut source = EventRecord::new("gate", TriggerKind::OnTouch, EventType::Door)
            .repeatable()
            .requires("lever");
        source.trigger(at(5));
        let snapshot = EventStateSnapshot::from(&source);

        let mut live = EventRecord::new("gate", TriggerKind::OnProximity, EventType::Door)
            .with_radius(20.0);
        snapshot.apply_to(&mut live);

        assert_eq!(live.state, LifecycleState::Triggered);
        assert_eq!(live.trigger_count, 1);
        assert_eq!(live.last_triggered_at, Some(at(5)));
        assert!(live.can_repeat);
        assert_eq!(live.prerequisites.as_slice(), &[EventId::new("lever")]);
        assert_eq!(live.trigger, TriggerKind::OnProximity);
        assert_eq!(live.condition.proximity_radius, Some(20.0));
    }

    #[test]
    fn test_json_field_names() {
        let bytes = completed_doc().to_bytes(SaveFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["version"], 1);
        assert!(value["savedAt"].is_string());
        assert_eq!(value["completedEvents"]["chest"], true);
        assert_eq!(value["eventStates"]["chest"]["state"], "Completed");
        assert_eq!(value["eventStates"]["chest"]["triggerCount"], 1);
        assert_eq!(value["gameMode"], "Exploration");
    }

    #[test]
    fn test_json_missing_map_is_validation_error() {
        let raw = br#"{"version":1,"savedAt":"2026-01-01T00:00:00Z","eventStates":{},"gameMode":"Exploration"}"#;
        let err = SaveDocument::from_bytes(SaveFormat::Json, raw).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Validation(ValidationError::MissingField("completedEvents"))
        ));

        let raw = br#"{"version":1,"savedAt":"2026-01-01T00:00:00Z","eventStates":null,"completedEvents":{},"gameMode":"Exploration"}"#;
        let err = SaveDocument::from_bytes(SaveFormat::Json, raw).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Validation(ValidationError::MissingField("eventStates"))
        ));
    }

    #[test]
    fn test_json_negative_version_is_validation_error() {
        let raw = br#"{"version":-3,"savedAt":"2026-01-01T00:00:00Z","eventStates":{},"completedEvents":{},"gameMode":"Exploration"}"#;
        let err = SaveDocument::from_bytes(SaveFormat::Json, raw).unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::Validation(ValidationError::InvalidVersion(-3))
        ));
    }

    #[test]
    fn test_garbage_is_json_error() {
        let err = SaveDocument::from_bytes(SaveFormat::Json, b"{not json").unwrap_err();
        assert!(matches!(err, PersistenceError::Json(_)));
    }

    #[test]
    fn test_bincode_encoding() {
        let doc = completed_doc();
        let bytes = doc.to_bytes(SaveFormat::Bincode).unwrap();
        let decoded = SaveDocument::from_bytes(SaveFormat::Bincode, &bytes).unwrap();
        assert_eq!(doc, decoded);
    }
}
