//! Engine configuration types.
//!
//! Games configure the engine at startup by providing:
//! - `GameMode`: Which play mode the world is currently in
//! - `ActiveMode`: Which modes an individual event is relevant in
//! - `EngineConfig`: Radii, history and save settings
//!
//! Nothing here is read from a global. The host game builds an
//! `EngineConfig` and hands it to `EventManager::new`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default radius for proximity triggers without their own radius.
pub const DEFAULT_PROXIMITY_RADIUS: f32 = 32.0;

/// Fixed radius used for room-entry triggers.
pub const DEFAULT_ROOM_ENTRY_RADIUS: f32 = 64.0;

/// The play mode the world is currently in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Free movement on the map.
    #[default]
    Exploration,
    /// Turn-based tactical combat.
    Tactical,
}

/// The modes an event is relevant in.
///
/// Checked before any trigger evaluation, as a coarse filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveMode {
    Exploration,
    Tactical,
    #[default]
    Both,
}

impl ActiveMode {
    /// Check whether this filter admits the given game mode.
    #[must_use]
    pub const fn includes(self, mode: GameMode) -> bool {
        matches!(
            (self, mode),
            (ActiveMode::Both, _)
                | (ActiveMode::Exploration, GameMode::Exploration)
                | (ActiveMode::Tactical, GameMode::Tactical)
        )
    }
}

/// On-disk encoding for save documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveFormat {
    /// Human-readable, hand-editable JSON.
    #[default]
    Json,
    /// Compact bincode.
    Bincode,
}

impl SaveFormat {
    /// File extension used for documents in this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Bincode => "bin",
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Radius for `OnProximity` events without a per-event radius.
    pub proximity_radius: f32,

    /// Radius for `OnRoomEntry` events.
    pub room_entry_radius: f32,

    /// Maximum history entries kept in memory (`None` = unlimited).
    /// The oldest entries are dropped first.
    pub history_limit: Option<usize>,

    /// Directory for save documents.
    pub save_dir: PathBuf,

    /// Encoding for save documents.
    pub save_format: SaveFormat,

    /// Timestamped archives kept after each save (`None` = keep all).
    pub archive_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            room_entry_radius: DEFAULT_ROOM_ENTRY_RADIUS,
            history_limit: None,
            save_dir: PathBuf::from("saves/events"),
            save_format: SaveFormat::default(),
            archive_limit: None,
        }
    }
}

impl EngineConfig {
    /// Set the default proximity radius.
    #[must_use]
    pub fn with_proximity_radius(mut self, radius: f32) -> Self {
        self.proximity_radius = radius;
        self
    }

    /// Set the room-entry radius.
    #[must_use]
    pub fn with_room_entry_radius(mut self, radius: f32) -> Self {
        self.room_entry_radius = radius;
        self
    }

    /// Cap the in-memory execution history.
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Set the save directory.
    #[must_use]
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Set the save encoding.
    #[must_use]
    pub fn with_save_format(mut self, format: SaveFormat) -> Self {
        self.save_format = format;
        self
    }

    /// Keep at most `limit` timestamped archives.
    #[must_use]
    pub fn with_archive_limit(mut self, limit: usize) -> Self {
        self.archive_limit = Some(limit);
        self
    }
}
