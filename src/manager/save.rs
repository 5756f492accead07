//! Save, load, apply and clear of event progress.

use crate::events::LifecycleState;
use crate::persistence::{EventStateSnapshot, Result, SaveDocument, SaveStore};

use super::entity::EventEntity;
use super::event_manager::EventManager;

impl<E: EventEntity> EventManager<E> {
    /// Build a save document from the current state without touching disk.
    ///
    /// Completion index entries contradicted by a live record that is no
    /// longer `Completed` (a designer reset) are written as `false`, so the
    /// document always passes validation.
    #[must_use]
    pub fn snapshot_event_state(&self) -> SaveDocument {
        let mut document = SaveDocument::new(self.now());
        document.game_mode = self.game_mode;

        for record in self.records() {
            document
                .event_states
                .insert(record.id.clone(), EventStateSnapshot::from(record));
            if record.is_completed() {
                document.completed_events.insert(record.id.clone(), true);
            }
        }

        for (event_id, &done) in &self.completed {
            let contradicted = done
                && document
                    .event_states
                    .get(event_id)
                    .is_some_and(|snapshot| snapshot.state != LifecycleState::Completed);
            if contradicted {
                tracing::warn!(
                    "Event {} is completed in the index but its record is not, saving as incomplete",
                    event_id
                );
            }
            document
                .completed_events
                .entry(event_id.clone())
                .or_insert(done && !contradicted);
        }

        document
    }

    /// Snapshot, write archive and latest copy, and keep the document as
    /// the current save.
    pub fn save_event_state(&mut self) -> Result<SaveDocument> {
        let newly_completed: Vec<_> = self
            .records()
            .filter(|record| record.is_completed())
            .map(|record| record.id.clone())
            .collect();
        for event_id in newly_completed {
            self.completed.insert(event_id, true);
        }

        let document = self.snapshot_event_state();
        document.validate()?;
        let archive = self.store.write(&document)?;

        if let Some(keep) = self.config.archive_limit {
            let pruned = self.store.prune_archives(keep)?;
            if pruned > 0 {
                tracing::debug!("Pruned {} old save archives", pruned);
            }
        }

        tracing::info!(
            "Saved {} event states ({} completed) to {}",
            document.event_states.len(),
            document.completed_events.values().filter(|done| **done).count(),
            archive.display()
        );

        self.current_save = Some(document.clone());
        Ok(document)
    }

    /// Read and validate the latest save.
    ///
    /// Returns an empty document if nothing has been saved yet. Does not
    /// apply anything; pass the result to
    /// [`apply_event_state`](Self::apply_event_state).
    pub fn load_event_state(&mut self) -> Result<SaveDocument> {
        let document = match self.store.read_latest()? {
            Some(document) => {
                document.validate()?;
                document
            }
            None => {
                tracing::info!(
                    "No saved event state in {}, starting fresh",
                    self.store.dir().display()
                );
                SaveDocument::new(self.now())
            }
        };

        self.current_save = Some(document.clone());
        Ok(document)
    }

    /// Overwrite registered records from a document.
    ///
    /// Validates first and applies nothing if validation fails. Ids in the
    /// document without a registered record are skipped. Returns the number
    /// of records updated.
    pub fn apply_event_state(&mut self, document: &SaveDocument) -> Result<usize> {
        document.validate()?;

        let mut applied = 0;
        for entity in self.entities.values_mut() {
            let Some(record) = entity.event_mut() else {
                continue;
            };
            if let Some(snapshot) = document.event_states.get(&record.id) {
                snapshot.apply_to(record);
                applied += 1;
            }
        }

        let skipped = document
            .event_states
            .keys()
            .filter(|id| !self.event_owners.contains_key(*id))
            .count();
        if skipped > 0 {
            tracing::debug!("Skipped {} saved event states with no registered event", skipped);
        }

        self.completed = document
            .completed_events
            .iter()
            .map(|(id, done)| (id.clone(), *done))
            .collect();
        self.game_mode = document.game_mode;
        self.rebuild_active();
        self.colliding.clear();
        self.timeout_armed.clear();
        self.current_save = Some(document.clone());

        tracing::info!("Applied {} saved event states", applied);
        Ok(applied)
    }

    /// Forget all progress: reset every record and clear the completion
    /// index, history and current save.
    pub fn clear_event_state(&mut self) {
        for entity in self.entities.values_mut() {
            if let Some(record) = entity.event_mut() {
                record.reset();
            }
        }

        self.completed.clear();
        self.history.clear();
        self.colliding.clear();
        self.timeout_armed.clear();
        self.current_save = None;
        self.rebuild_active();

        tracing::info!("Cleared event state");
    }

    /// The document last saved, loaded or applied.
    #[must_use]
    pub fn current_save(&self) -> Option<&SaveDocument> {
        self.current_save.as_ref()
    }

    #[must_use]
    pub fn save_store(&self) -> &SaveStore {
        &self.store
    }

    fn rebuild_active(&mut self) {
        self.active.clear();
        for (event_id, entity_id) in &self.event_owners {
            let completed = self
                .entities
                .get(entity_id)
                .and_then(|entity| entity.event())
                .map_or(true, |record| record.is_completed());
            if !completed {
                self.active.insert(event_id.clone(), *entity_id);
            }
        }
    }
}
