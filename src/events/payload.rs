//! Event-type-specific data forwarded to handlers.
//!
//! The engine never looks inside a payload. It exists so content authors
//! can attach typed data (enemy lists, loot, door targets) to an event and
//! have the matching handler receive it without string-keyed lookups.

use serde::{Deserialize, Serialize};

use crate::core::Vec2;

use super::record::EventType;

/// A single loot line in a chest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item: String,
    pub quantity: u32,
}

impl LootEntry {
    pub fn new(item: impl Into<String>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// Typed payload, one variant per event type.
///
/// `Custom` carries arbitrary JSON for content the typed variants do not
/// cover yet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    #[default]
    None,
    Battle {
        enemies: Vec<String>,
        #[serde(default)]
        escapable: bool,
    },
    Dialog {
        dialog_id: String,
        #[serde(default)]
        speaker: Option<String>,
    },
    Chest {
        #[serde(default)]
        loot: Vec<LootEntry>,
        #[serde(default)]
        gold: u32,
    },
    Door {
        #[serde(default)]
        target_map: Option<String>,
        target: Vec2,
        #[serde(default)]
        key_item: Option<String>,
    },
    Trap {
        damage: i32,
        #[serde(default)]
        status_effect: Option<String>,
    },
    Info {
        message: String,
    },
    Quest {
        quest_id: String,
        #[serde(default)]
        stage: Option<String>,
    },
    Cutscene {
        cutscene_id: String,
    },
    Shop {
        shop_id: String,
    },
    Rest {
        #[serde(default)]
        cost: u32,
    },
    Custom {
        data: serde_json::Value,
    },
}

impl EventPayload {
    /// Battle payload.
    pub fn battle<I, S>(enemies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Battle {
            enemies: enemies.into_iter().map(Into::into).collect(),
            escapable: false,
        }
    }

    /// Info payload with a message.
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    /// Door payload leading to `target` on the current map.
    pub fn door(target: Vec2) -> Self {
        Self::Door {
            target_map: None,
            target,
            key_item: None,
        }
    }

    /// The event type this payload is meant for.
    ///
    /// `None` for `None` and `Custom`, which fit any type.
    #[must_use]
    pub fn event_type(&self) -> Option<EventType> {
        match self {
            Self::None | Self::Custom { .. } => None,
            Self::Battle { .. } => Some(EventType::Battle),
            Self::Dialog { .. } => Some(EventType::Dialog),
            Self::Chest { .. } => Some(EventType::Chest),
            Self::Door { .. } => Some(EventType::Door),
            Self::Trap { .. } => Some(EventType::Trap),
            Self::Info { .. } => Some(EventType::Info),
            Self::Quest { .. } => Some(EventType::Quest),
            Self::Cutscene { .. } => Some(EventType::Cutscene),
            Self::Shop { .. } => Some(EventType::Shop),
            Self::Rest { .. } => Some(EventType::Rest),
        }
    }

    /// Check the payload is usable by a handler for `event_type`.
    #[must_use]
    pub fn fits(&self, event_type: EventType) -> bool {
        self.event_type().map_or(true, |t| t == event_type)
    }
}
