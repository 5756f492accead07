//! File-based storage for save documents.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::SaveFormat;

use super::document::SaveDocument;
use super::error::{PersistenceError, Result};

const FILE_PREFIX: &str = "events_";
const LATEST_STEM: &str = "events_latest";

/// File-based store for save documents.
///
/// Every save writes two files into the store directory:
/// - `events_<timestamp>.<ext>`: an archive copy, never rewritten
/// - `events_latest.<ext>`: the canonical copy read by a normal load
///
/// Both are written to a temporary file first and renamed into place, so a
/// crash mid-save leaves the previous latest copy intact.
#[derive(Clone, Debug)]
pub struct SaveStore {
    dir: PathBuf,
    format: SaveFormat,
}

impl SaveStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>, format: SaveFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Store directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Encoding used for documents.
    #[must_use]
    pub fn format(&self) -> SaveFormat {
        self.format
    }

    /// Path of the canonical latest document.
    #[must_use]
    pub fn latest_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}.{}", LATEST_STEM, self.format.extension()))
    }

    /// Path of the archive copy for a document saved at `saved_at`.
    #[must_use]
    pub fn archive_path(&self, saved_at: DateTime<Utc>) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            FILE_PREFIX,
            saved_at.format("%Y%m%dT%H%M%S%3fZ"),
            self.format.extension()
        ))
    }

    /// Write a document as both archive and latest copy.
    ///
    /// Returns the archive path.
    pub fn write(&self, document: &SaveDocument) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(PersistenceError::io(&self.dir))?;

        let bytes = document.to_bytes(self.format)?;
        let archive = self.archive_path(document.saved_at);

        write_atomic(&archive, &bytes)?;
        write_atomic(&self.latest_path(), &bytes)?;

        tracing::debug!(
            "Saved event state to {} ({} bytes)",
            archive.display(),
            bytes.len()
        );

        Ok(archive)
    }

    /// Read the canonical latest document.
    ///
    /// Returns `None` if nothing has been saved yet.
    pub fn read_latest(&self) -> Result<Option<SaveDocument>> {
        let path = self.latest_path();
        if !path.exists() {
            return Ok(None);
        }
        self.read(&path).map(Some)
    }

    /// Read a specific document, e.g. one returned by [`SaveStore::list_archives`].
    pub fn read(&self, path: &Path) -> Result<SaveDocument> {
        let bytes = fs::read(path).map_err(PersistenceError::io(path))?;
        let document = SaveDocument::from_bytes(self.format, &bytes)?;

        tracing::debug!("Loaded event state from {}", path.display());

        Ok(document)
    }

    /// List archive copies, oldest first.
    pub fn list_archives(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let latest = self.latest_path();
        let extension = self.format.extension();
        let mut archives = Vec::new();

        let entries = fs::read_dir(&self.dir).map_err(PersistenceError::io(&self.dir))?;
        for entry in entries {
            let path = entry.map_err(PersistenceError::io(&self.dir))?.path();
            if path == latest {
                continue;
            }

            let is_archive = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| {
                    name.starts_with(FILE_PREFIX)
                        && path.extension().and_then(|e| e.to_str()) == Some(extension)
                });
            if is_archive {
                archives.push(path);
            }
        }

        // Timestamps sort lexicographically.
        archives.sort();
        Ok(archives)
    }

    /// Delete all but the newest `keep` archives. Returns how many were removed.
    pub fn prune_archives(&self, keep: usize) -> Result<usize> {
        let archives = self.list_archives()?;
        let excess = archives.len().saturating_sub(keep);

        for path in &archives[..excess] {
            fs::remove_file(path).map_err(PersistenceError::io(path))?;
            tracing::debug!("Pruned event archive {}", path.display());
        }

        Ok(excess)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let written = fs::File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .map_err(PersistenceError::io(&temp_path))
        .and_then(|()| fs::rename(&temp_path, path).map_err(PersistenceError::io(path)));

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}
