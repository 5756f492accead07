//! The event manager: per-tick scan, edge detection, gating and dispatch.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use im::Vector;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{Clock, EngineConfig, EntityId, EventId, GameMode, SystemClock, Vec2};
use crate::events::{EventRecord, EventType, LifecycleState, TriggerKind};
use crate::handlers::{EventHandler, HandlerRegistry, HandlerResult};
use crate::persistence::{SaveDocument, SaveStore};
use crate::triggers::{ConditionContext, QuestStateProvider, TriggerEvaluator};

use super::entity::{EventEntity, SpatialEntity};
use super::error::TriggerError;
use super::history::{FiredEvent, HistoryEntry};
use super::stats::EventStats;

/// Outcome of [`EventManager::register_entity`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Registration {
    /// A new entity.
    Added,
    /// An entity with the same id was already registered and was replaced.
    Replaced,
    /// The entity's event id was already owned by another entity.
    /// The new registration wins.
    DuplicateEventId {
        event_id: EventId,
        previous_owner: EntityId,
    },
}

/// Orchestrates event triggering for a set of world entities.
///
/// The manager owns the entities, the player, the handler registry and all
/// derived indexes (event id to owner, active events, completion index).
/// Time comes from an injected [`Clock`]; quest state from an optional
/// [`QuestStateProvider`].
///
/// ## Tick
///
/// [`update`](Self::update) scans entities in registration order. An event
/// is a candidate when it is live, out of cooldown, active in the current
/// game mode, has all prerequisites completed in the completion index, and
/// its trigger condition holds. Candidates fire only on the tick their
/// condition starts holding (Battle events fire on every tick it holds). A
/// condition held through a cooldown keeps its baseline, so the cooldown
/// ending is not an entry. Prerequisites are read before any fire of the
/// tick, so an event unlocked by a fire becomes eligible on the next tick.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use world_events::core::{EngineConfig, EntityId};
/// use world_events::events::{EventRecord, EventType, TriggerKind};
/// use world_events::handlers::HandlerResult;
/// use world_events::manager::{EventManager, SpatialEntity};
///
/// let mut manager: EventManager = EventManager::new(EngineConfig::default());
/// manager.register_handler(
///     EventType::Chest,
///     |_: &SpatialEntity, _: &EventRecord, _: &SpatialEntity| HandlerResult::ok("opened"),
/// );
/// manager.register_entity(
///     SpatialEntity::new(EntityId(1))
///         .with_bounds(64.0, 64.0, 32.0, 32.0)
///         .with_event(EventRecord::new("chest", TriggerKind::OnTouch, EventType::Chest)),
/// );
/// manager.set_player(SpatialEntity::new(EntityId(0)).with_bounds(64.0, 64.0, 32.0, 32.0));
///
/// let fired = manager.update(Duration::from_millis(16));
/// assert_eq!(fired.len(), 1);
/// assert!(manager.is_completed("chest"));
/// ```
pub struct EventManager<E = SpatialEntity> {
    pub(super) config: EngineConfig,
    pub(super) clock: Arc<dyn Clock>,
    quests: Option<Box<dyn QuestStateProvider>>,

    pub(super) entities: FxHashMap<EntityId, E>,
    /// Registration order. Drives deterministic scans.
    pub(super) order: Vec<EntityId>,
    pub(super) event_owners: FxHashMap<EventId, EntityId>,
    /// Events not yet `Completed`, by id.
    pub(super) active: FxHashMap<EventId, EntityId>,
    /// Completion index. Survives record resets.
    pub(super) completed: FxHashMap<EventId, bool>,
    duplicates: FxHashSet<EventId>,

    handlers: HandlerRegistry<E>,
    player: Option<E>,
    pub(super) game_mode: GameMode,

    /// Events whose condition held on the previous tick.
    pub(super) colliding: FxHashSet<EventId>,
    pub(super) timeout_armed: FxHashMap<EventId, DateTime<Utc>>,

    pub(super) history: Vector<HistoryEntry>,
    pub(super) store: SaveStore,
    pub(super) current_save: Option<SaveDocument>,
    elapsed: Duration,
}

impl<E> std::fmt::Debug for EventManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("entities", &self.entities.len())
            .field("active", &self.active.len())
            .field("game_mode", &self.game_mode)
            .field("handlers", &self.handlers)
            .field("history", &self.history.len())
            .field("elapsed", &self.elapsed)
            .finish_non_exhaustive()
    }
}

impl<E: EventEntity> EventManager<E> {
    /// Create a manager reading time from the system clock.
    pub fn new(config: EngineConfig) -> Self {
        let store = SaveStore::new(config.save_dir.clone(), config.save_format);
        Self {
            config,
            clock: Arc::new(SystemClock),
            quests: None,
            entities: FxHashMap::default(),
            order: Vec::new(),
            event_owners: FxHashMap::default(),
            active: FxHashMap::default(),
            completed: FxHashMap::default(),
            duplicates: FxHashSet::default(),
            handlers: HandlerRegistry::new(),
            player: None,
            game_mode: GameMode::default(),
            colliding: FxHashSet::default(),
            timeout_armed: FxHashMap::default(),
            history: Vector::new(),
            store,
            current_save: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Replace the time source (builder pattern).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Inject the quest state oracle (builder pattern).
    #[must_use]
    pub fn with_quest_states(mut self, quests: impl QuestStateProvider + 'static) -> Self {
        self.quests = Some(Box::new(quests));
        self
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register an entity, replacing any entity with the same id.
    pub fn register_entity(&mut self, entity: E) -> Registration {
        let entity_id = entity.id();
        let replaced = self.entities.contains_key(&entity_id);
        if replaced {
            self.detach_event(entity_id);
        }

        let mut registration = if replaced {
            Registration::Replaced
        } else {
            Registration::Added
        };

        if let Some(record) = entity.event() {
            let event_id = record.id.clone();
            if let Some(&previous_owner) = self.event_owners.get(&event_id) {
                tracing::warn!(
                    "Duplicate event id {} on {} (previously {})",
                    event_id,
                    entity_id,
                    previous_owner
                );
                self.duplicates.insert(event_id.clone());
                self.colliding.remove(&event_id);
                self.timeout_armed.remove(&event_id);
                registration = Registration::DuplicateEventId {
                    event_id: event_id.clone(),
                    previous_owner,
                };
            }

            self.event_owners.insert(event_id.clone(), entity_id);
            if record.is_completed() {
                self.completed.insert(event_id.clone(), true);
                self.active.remove(&event_id);
            } else {
                self.active.insert(event_id, entity_id);
            }
        }

        if !replaced {
            self.order.push(entity_id);
        }
        self.entities.insert(entity_id, entity);

        registration
    }

    /// Remove an entity and everything indexed under its event.
    pub fn unregister_entity(&mut self, entity_id: EntityId) -> Option<E> {
        if !self.entities.contains_key(&entity_id) {
            return None;
        }
        self.detach_event(entity_id);
        self.order.retain(|id| *id != entity_id);
        self.entities.remove(&entity_id)
    }

    /// Drop the index entries owned by an entity's current event.
    fn detach_event(&mut self, entity_id: EntityId) {
        let Some(event_id) = self
            .entities
            .get(&entity_id)
            .and_then(|entity| entity.event())
            .map(|record| record.id.clone())
        else {
            return;
        };

        if self.event_owners.get(&event_id) == Some(&entity_id) {
            self.event_owners.remove(&event_id);
            self.active.remove(&event_id);
            self.colliding.remove(&event_id);
            self.timeout_armed.remove(&event_id);
        }

        if !self.duplicates.contains(&event_id) {
            return;
        }

        let remaining: Vec<EntityId> = self
            .order
            .iter()
            .copied()
            .filter(|id| *id != entity_id)
            .filter(|id| {
                self.entities
                    .get(id)
                    .and_then(|entity| entity.event())
                    .is_some_and(|record| record.id == event_id)
            })
            .collect();

        if remaining.len() <= 1 {
            self.duplicates.remove(&event_id);
        }

        // The newest remaining copy takes over an orphaned id.
        if !self.event_owners.contains_key(&event_id) {
            if let Some(&owner) = remaining.last() {
                self.adopt_event(event_id, owner);
            }
        }
    }

    fn adopt_event(&mut self, event_id: EventId, owner: EntityId) {
        let completed = self
            .entities
            .get(&owner)
            .and_then(|entity| entity.event())
            .is_some_and(|record| record.is_completed());

        tracing::debug!("Event {} now owned by {}", event_id, owner);
        if !completed {
            self.active.insert(event_id.clone(), owner);
        }
        self.event_owners.insert(event_id, owner);
    }

    /// Register the handler for an event type, replacing any existing one.
    pub fn register_handler(
        &mut self,
        event_type: EventType,
        handler: impl EventHandler<E> + 'static,
    ) {
        if self.handlers.register(event_type, handler) {
            tracing::debug!("Replaced handler for {:?}", event_type);
        } else {
            tracing::debug!("Registered handler for {:?}", event_type);
        }
    }

    /// Remove the handler for an event type. Returns true if one was registered.
    pub fn unregister_handler(&mut self, event_type: EventType) -> bool {
        self.handlers.unregister(event_type)
    }

    #[must_use]
    pub fn has_handler(&self, event_type: EventType) -> bool {
        self.handlers.contains(event_type)
    }

    // =========================================================================
    // Player and mode
    // =========================================================================

    pub fn set_player(&mut self, player: E) {
        self.player = Some(player);
    }

    #[must_use]
    pub fn player(&self) -> Option<&E> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut E> {
        self.player.as_mut()
    }

    pub fn clear_player(&mut self) -> Option<E> {
        self.player.take()
    }

    pub fn set_game_mode(&mut self, mode: GameMode) {
        if self.game_mode != mode {
            tracing::debug!("Game mode {:?} -> {:?}", self.game_mode, mode);
        }
        self.game_mode = mode;
    }

    #[must_use]
    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    // =========================================================================
    // Entity access
    // =========================================================================

    #[must_use]
    pub fn entity(&self, entity_id: EntityId) -> Option<&E> {
        self.entities.get(&entity_id)
    }

    /// Mutable access for moving an entity.
    ///
    /// Swapping the attached event for one with a different id bypasses the
    /// indexes; re-register the entity instead.
    pub fn entity_mut(&mut self, entity_id: EntityId) -> Option<&mut E> {
        self.entities.get_mut(&entity_id)
    }

    /// All entities, in registration order.
    pub fn entities(&self) -> impl Iterator<Item = &E> + '_ {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// The entity owning an event.
    #[must_use]
    pub fn entity_for_event(&self, event_id: &str) -> Option<&E> {
        self.event_owners
            .get(event_id)
            .and_then(|id| self.entities.get(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Total time passed to [`update`](Self::update).
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Run one scan. Returns the events fired, in registration order.
    ///
    /// Does nothing (and leaves the edge baseline untouched) without a player.
    pub fn update(&mut self, delta: Duration) -> Vec<FiredEvent> {
        self.elapsed = self.elapsed.saturating_add(delta);

        let Some(player_bounds) = self.player.as_ref().map(|player| player.bounds()) else {
            return Vec::new();
        };
        let now = self.clock.now();

        let mut colliding = FxHashSet::default();
        let mut candidates = Vec::new();

        for &entity_id in &self.order {
            let Some(entity) = self.entities.get(&entity_id) else {
                continue;
            };
            let Some(record) = entity.event() else {
                continue;
            };
            // Stale copy of a duplicated id.
            if self.event_owners.get(&record.id) != Some(&entity_id) {
                continue;
            }

            if !record.is_live() || !record.is_active_in(self.game_mode) {
                continue;
            }
            if !record
                .prerequisites
                .iter()
                .all(|id| self.completed.get(id).copied().unwrap_or(false))
            {
                continue;
            }

            let armed_at = if record.trigger == TriggerKind::OnTimeout {
                Some(*self.timeout_armed.entry(record.id.clone()).or_insert(now))
            } else {
                None
            };

            let mut ctx = ConditionContext::new(entity.bounds(), player_bounds, now)
                .with_config(&self.config)
                .with_armed_at(armed_at);
            if let Some(quests) = self.quests.as_deref() {
                ctx = ctx.with_quests(quests);
            }

            if !TriggerEvaluator::evaluate(record, &ctx) {
                continue;
            }

            // Held while cooling down too, so the cooldown ending is not an entry.
            colliding.insert(record.id.clone());
            if !record.cooldown_remaining(now).is_zero() {
                continue;
            }
            // Battles re-fire while the overlap is held.
            if record.event_type == EventType::Battle || !self.colliding.contains(&record.id) {
                candidates.push(entity_id);
            }
        }

        let mut fired = Vec::with_capacity(candidates.len());
        for entity_id in candidates {
            match self.fire(entity_id, now, false) {
                Some(event) => fired.push(event),
                None => {
                    if let Some(record) = self.entities.get(&entity_id).and_then(|e| e.event()) {
                        tracing::warn!(
                            "No handler for {:?}, event {} not fired",
                            record.event_type,
                            record.id
                        );
                    }
                }
            }
        }

        self.colliding = colliding;
        fired
    }

    /// Fire an event by id, bypassing the trigger condition.
    ///
    /// For `OnInteract` and `Manual` events, and for scripted fires of any
    /// other kind. Lifecycle, cooldown and budget still apply; mode and
    /// prerequisites do not.
    pub fn trigger_manual_event(&mut self, event_id: &str) -> Result<HandlerResult, TriggerError> {
        let entity_id = *self
            .event_owners
            .get(event_id)
            .ok_or_else(|| TriggerError::UnknownEvent(EventId::new(event_id)))?;
        if self.player.is_none() {
            return Err(TriggerError::NoPlayer);
        }

        let now = self.clock.now();
        let record = self
            .entities
            .get(&entity_id)
            .and_then(|entity| entity.event())
            .ok_or_else(|| TriggerError::UnknownEvent(EventId::new(event_id)))?;

        if !record.can_trigger(now) {
            return Err(TriggerError::CannotTrigger {
                event_id: record.id.clone(),
                state: record.state,
                cooldown_remaining: record.cooldown_remaining(now),
            });
        }
        if !self.handlers.contains(record.event_type) {
            return Err(TriggerError::NoHandler {
                event_id: record.id.clone(),
                event_type: record.event_type,
            });
        }

        let fired = self
            .fire(entity_id, now, true)
            .ok_or_else(|| TriggerError::UnknownEvent(EventId::new(event_id)))?;
        Ok(fired.result)
    }

    /// Run the handler and advance the record. `None` if there is no
    /// player, record or handler.
    fn fire(&mut self, entity_id: EntityId, now: DateTime<Utc>, manual: bool) -> Option<FiredEvent> {
        let player = self.player.as_ref()?;
        let entity = self.entities.get(&entity_id)?;
        let record = entity.event()?;
        let result = self.handlers.dispatch(entity, record, player)?;

        let record = self.entities.get_mut(&entity_id)?.event_mut()?;
        record.trigger(now);

        let event_id = record.id.clone();
        let event_type = record.event_type;
        let trigger = record.trigger;
        let completed = record.is_completed();

        tracing::debug!(
            "Fired {} ({:?}, count {}, state {:?}{})",
            event_id,
            event_type,
            record.trigger_count,
            record.state,
            if manual { ", manual" } else { "" }
        );

        self.timeout_armed.remove(&event_id);
        if completed {
            self.completed.insert(event_id.clone(), true);
            self.active.remove(&event_id);
        }

        self.push_history(HistoryEntry {
            event_id: event_id.clone(),
            entity_id,
            timestamp: now,
            trigger,
            event_type,
            manual,
            result: result.clone(),
        });

        Some(FiredEvent {
            event_id,
            entity_id,
            event_type,
            completed,
            result,
        })
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        if let Some(limit) = self.config.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    // =========================================================================
    // External control
    // =========================================================================

    /// Start (or restart) a timeout event's countdown now.
    pub fn arm_timeout(&mut self, event_id: &str) -> Result<(), TriggerError> {
        let record = self
            .event(event_id)
            .ok_or_else(|| TriggerError::UnknownEvent(EventId::new(event_id)))?;
        let event_id = record.id.clone();
        let now = self.clock.now();
        self.timeout_armed.insert(event_id, now);
        Ok(())
    }

    /// Return one event to `Active` with no fire history.
    ///
    /// The completion index is not touched.
    pub fn reset_event(&mut self, event_id: &str) -> Result<(), TriggerError> {
        let (entity_id, record) = self.owned_record_mut(event_id)?;
        record.reset();
        let event_id = record.id.clone();

        self.active.insert(event_id.clone(), entity_id);
        self.colliding.remove(&event_id);
        self.timeout_armed.remove(&event_id);
        tracing::debug!("Reset event {}", event_id);
        Ok(())
    }

    /// Take an event out of play, or put it back.
    pub fn set_event_disabled(&mut self, event_id: &str, disabled: bool) -> Result<(), TriggerError> {
        let (entity_id, record) = self.owned_record_mut(event_id)?;
        if disabled {
            record.disable();
        } else {
            record.enable();
        }
        let completed = record.state == LifecycleState::Completed;
        let event_id = record.id.clone();

        if completed {
            self.active.remove(&event_id);
        } else {
            self.active.insert(event_id.clone(), entity_id);
        }
        self.colliding.remove(&event_id);
        Ok(())
    }

    /// Record an event as completed in the completion index.
    ///
    /// Does not touch the record itself. Used for ids completed outside the
    /// trigger loop (quest bookkeeping, content that no longer exists).
    pub fn mark_completed(&mut self, event_id: impl Into<EventId>) {
        self.completed.insert(event_id.into(), true);
    }

    fn owned_record_mut(
        &mut self,
        event_id: &str,
    ) -> Result<(EntityId, &mut EventRecord), TriggerError> {
        let unknown = || TriggerError::UnknownEvent(EventId::new(event_id));
        let entity_id = *self.event_owners.get(event_id).ok_or_else(unknown)?;
        let record = self
            .entities
            .get_mut(&entity_id)
            .and_then(|entity| entity.event_mut())
            .ok_or_else(unknown)?;
        Ok((entity_id, record))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Look up an event record by id.
    #[must_use]
    pub fn event(&self, event_id: &str) -> Option<&EventRecord> {
        self.entity_for_event(event_id)
            .and_then(|entity| entity.event())
    }

    /// Events that have not completed, in registration order.
    pub fn active_events(&self) -> Vec<&EventRecord> {
        self.records()
            .filter(|record| self.active.contains_key(&record.id))
            .collect()
    }

    /// Check the completion index.
    #[must_use]
    pub fn is_completed(&self, event_id: &str) -> bool {
        self.completed.get(event_id).copied().unwrap_or(false)
    }

    /// Ids marked completed in the completion index, sorted.
    pub fn completed_events(&self) -> Vec<&EventId> {
        let mut ids: Vec<_> = self
            .completed
            .iter()
            .filter(|(_, done)| **done)
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    pub fn events_of_type(&self, event_type: EventType) -> Vec<&EventRecord> {
        self.records()
            .filter(|record| record.event_type == event_type)
            .collect()
    }

    /// Events whose entity center lies within `radius` of `center`.
    pub fn events_within(&self, center: Vec2, radius: f32) -> Vec<&EventRecord> {
        self.entities()
            .filter(|entity| {
                entity
                    .bounds()
                    .is_some_and(|bounds| bounds.center().distance(center) <= radius)
            })
            .filter_map(|entity| {
                let record = entity.event()?;
                (self.event_owners.get(&record.id) == Some(&entity.id())).then_some(record)
            })
            .collect()
    }

    /// The execution history, oldest first.
    #[must_use]
    pub fn history(&self) -> &Vector<HistoryEntry> {
        &self.history
    }

    pub fn history_for<'a>(&'a self, event_id: &'a str) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
        self.history
            .iter()
            .filter(move |entry| entry.event_id.as_str() == event_id)
    }

    /// Event ids registered on more than one entity, sorted.
    pub fn duplicate_event_ids(&self) -> Vec<&EventId> {
        let mut ids: Vec<_> = self.duplicates.iter().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn stats(&self) -> EventStats {
        let mut stats = EventStats {
            active: self.active.len(),
            completed: self.completed.values().filter(|done| **done).count(),
            history_len: self.history.len(),
            handlers: self.handlers.len(),
            ..EventStats::default()
        };

        for record in self.records() {
            stats.total += 1;
            *stats.by_type.entry(record.event_type).or_insert(0) += 1;
            *stats.by_state.entry(record.state).or_insert(0) += 1;
        }

        stats
    }

    /// Records in registration order, skipping stale copies of duplicated ids.
    pub(super) fn records(&self) -> impl Iterator<Item = &EventRecord> + '_ {
        self.order.iter().filter_map(|id| {
            let record = self.entities.get(id)?.event()?;
            (self.event_owners.get(&record.id) == Some(id)).then_some(record)
        })
    }

    pub(super) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
