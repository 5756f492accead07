//! The event record: persistent state of one triggerable world event.
//!
//! ## Lifecycle
//!
//! ```text
//!            fire                 fire (can_repeat)
//! Active ─────────────▶ Triggered ◀──────────────┐
//!    │                      │ └──────────────────┘
//!    │                      │ fire with budget spent / !can_repeat
//!    └──────────────────────┴────────────▶ Completed
//!
//! Disabled: reachable from any state through external control only.
//! ```
//!
//! `Completed` is terminal for the trigger loop. Only [`EventRecord::reset`]
//! leaves it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{elapsed_between, ActiveMode, EventId, GameMode};

use super::payload::EventPayload;

/// What makes an event eligible to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Player box overlaps the entity box.
    OnTouch,
    /// Player center within a radius of the entity center.
    OnProximity,
    /// A duration has elapsed since the event was armed.
    OnTimeout,
    /// Player enters the room the entity marks (large fixed radius).
    OnRoomEntry,
    /// Player explicitly interacts. Fired through the manual entry point.
    OnInteract,
    /// A quest reaches a required state.
    OnQuestState,
    /// Scripted. Fired through the manual entry point.
    Manual,
}

impl TriggerKind {
    /// Whether the per-tick scan can ever satisfy this condition.
    #[must_use]
    pub const fn is_scanned(self) -> bool {
        !matches!(self, TriggerKind::OnInteract | TriggerKind::Manual)
    }
}

/// Selects the handler for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    Battle,
    Dialog,
    Chest,
    Door,
    Trap,
    Info,
    Quest,
    Cutscene,
    Shop,
    Rest,
}

impl EventType {
    /// Every event type, in declaration order.
    pub const ALL: [EventType; 10] = [
        EventType::Battle,
        EventType::Dialog,
        EventType::Chest,
        EventType::Door,
        EventType::Trap,
        EventType::Info,
        EventType::Quest,
        EventType::Cutscene,
        EventType::Shop,
        EventType::Rest,
    ];
}

/// Coarse state-machine position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Active,
    Triggered,
    Completed,
    Disabled,
}

/// A quest state an `OnQuestState` event waits for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRequirement {
    pub quest_id: String,
    pub state: String,
}

impl QuestRequirement {
    pub fn new(quest_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            quest_id: quest_id.into(),
            state: state.into(),
        }
    }
}

/// Trigger-specific parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionData {
    /// Radius for `OnProximity`. Falls back to the engine default.
    #[serde(default)]
    pub proximity_radius: Option<f32>,

    /// Delay for `OnTimeout`, measured from the moment the event is armed.
    #[serde(default)]
    pub timeout: Option<Duration>,

    /// Required quest state for `OnQuestState`.
    #[serde(default)]
    pub quest: Option<QuestRequirement>,
}

/// Rendering hints. Ignored by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub visible: bool,
    #[serde(default)]
    pub sprite: Option<String>,
    /// RGBA fallback when the sprite is missing.
    #[serde(default)]
    pub color: Option<[u8; 4]>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            visible: true,
            sprite: None,
            color: None,
        }
    }
}

/// Persistent state of one triggerable event.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use chrono::Utc;
/// use world_events::events::{EventRecord, EventType, LifecycleState, TriggerKind};
///
/// let mut trap = EventRecord::new("spike_trap", TriggerKind::OnTouch, EventType::Trap)
///     .repeatable()
///     .with_max_triggers(2)
///     .with_cooldown(Duration::from_secs(3));
///
/// let now = Utc::now();
/// assert!(trap.can_trigger(now));
///
/// trap.trigger(now);
/// assert_eq!(trap.state, LifecycleState::Triggered);
/// assert!(!trap.can_trigger(now)); // cooling down
///
/// trap.trigger(now + chrono::Duration::seconds(3));
/// assert_eq!(trap.state, LifecycleState::Completed);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Stable unique identifier.
    pub id: EventId,

    /// Trigger condition. Only tooling changes this after creation.
    pub trigger: TriggerKind,

    /// Handler selector.
    pub event_type: EventType,

    /// Lifecycle state.
    #[serde(default)]
    pub state: LifecycleState,

    /// If false, the first fire completes the event.
    #[serde(default)]
    pub can_repeat: bool,

    /// Successful fires so far.
    #[serde(default)]
    pub trigger_count: u32,

    /// Fire budget (0 = unlimited).
    #[serde(default)]
    pub max_triggers: u32,

    /// Time of the last fire. `None` if never fired.
    #[serde(default)]
    pub last_triggered_at: Option<DateTime<Utc>>,

    /// Minimum spacing between fires.
    #[serde(default)]
    pub cooldown: Duration,

    /// Events that must be completed before this one may fire.
    #[serde(default)]
    pub prerequisites: SmallVec<[EventId; 4]>,

    /// Modes in which the event is considered at all.
    #[serde(default)]
    pub active_in: ActiveMode,

    /// Trigger-specific parameters.
    #[serde(default)]
    pub condition: ConditionData,

    /// Handler data.
    #[serde(default)]
    pub payload: EventPayload,

    /// Rendering hints.
    #[serde(default)]
    pub presentation: Presentation,
}

impl EventRecord {
    /// Create a new non-repeatable event in the `Active` state.
    pub fn new(id: impl Into<EventId>, trigger: TriggerKind, event_type: EventType) -> Self {
        Self {
            id: id.into(),
            trigger,
            event_type,
            state: LifecycleState::Active,
            can_repeat: false,
            trigger_count: 0,
            max_triggers: 0,
            last_triggered_at: None,
            cooldown: Duration::ZERO,
            prerequisites: SmallVec::new(),
            active_in: ActiveMode::Both,
            condition: ConditionData::default(),
            payload: EventPayload::None,
            presentation: Presentation::default(),
        }
    }

    /// Allow the event to fire more than once (builder pattern).
    #[must_use]
    pub fn repeatable(mut self) -> Self {
        self.can_repeat = true;
        self
    }

    /// Set the fire budget (builder pattern).
    #[must_use]
    pub fn with_max_triggers(mut self, max: u32) -> Self {
        self.max_triggers = max;
        self
    }

    /// Set the cooldown (builder pattern).
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Add a prerequisite event (builder pattern).
    #[must_use]
    pub fn requires(mut self, event: impl Into<EventId>) -> Self {
        let event = event.into();
        if !self.prerequisites.contains(&event) {
            self.prerequisites.push(event);
        }
        self
    }

    /// Restrict the modes the event is active in (builder pattern).
    #[must_use]
    pub fn active_in(mut self, mode: ActiveMode) -> Self {
        self.active_in = mode;
        self
    }

    /// Set the proximity radius (builder pattern).
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.condition.proximity_radius = Some(radius);
        self
    }

    /// Set the timeout delay (builder pattern).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.condition.timeout = Some(timeout);
        self
    }

    /// Set the required quest state (builder pattern).
    #[must_use]
    pub fn with_quest(mut self, requirement: QuestRequirement) -> Self {
        self.condition.quest = Some(requirement);
        self
    }

    /// Set the payload (builder pattern).
    #[must_use]
    pub fn with_payload(mut self, payload: EventPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Set presentation hints (builder pattern).
    #[must_use]
    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    /// True once a limited budget has been used up.
    #[must_use]
    pub fn budget_spent(&self) -> bool {
        self.max_triggers > 0 && self.trigger_count >= self.max_triggers
    }

    /// True if the event is in its terminal state.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == LifecycleState::Completed
    }

    /// Check whether the event is considered in the given game mode.
    #[must_use]
    pub fn is_active_in(&self, mode: GameMode) -> bool {
        self.active_in.includes(mode)
    }

    /// Time left before the cooldown allows another fire.
    #[must_use]
    pub fn cooldown_remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.cooldown.is_zero() {
            return Duration::ZERO;
        }
        match self.last_triggered_at {
            Some(last) => self.cooldown.saturating_sub(elapsed_between(last, now)),
            None => Duration::ZERO,
        }
    }

    /// Whether lifecycle and budget still allow fires, ignoring cooldown.
    ///
    /// The tick scan evaluates conditions for these records even while they
    /// cool down, so a held overlap stays held.
    #[must_use]
    pub fn is_live(&self) -> bool {
        match self.state {
            LifecycleState::Disabled | LifecycleState::Completed => false,
            LifecycleState::Triggered if !self.can_repeat => false,
            _ => !self.budget_spent(),
        }
    }

    /// Gate checked before an event may fire.
    #[must_use]
    pub fn can_trigger(&self, now: DateTime<Utc>) -> bool {
        self.is_live() && self.cooldown_remaining(now).is_zero()
    }

    /// Record a fire at `now` and advance the state machine.
    pub fn trigger(&mut self, now: DateTime<Utc>) {
        self.trigger_count = self.trigger_count.saturating_add(1);
        self.last_triggered_at = Some(now);
        self.state = if self.is_exhausted() {
            LifecycleState::Completed
        } else {
            LifecycleState::Triggered
        };
    }

    /// Return to `Active` with no fire history.
    pub fn reset(&mut self) {
        self.state = LifecycleState::Active;
        self.trigger_count = 0;
        self.last_triggered_at = None;
    }

    /// Take the event out of play.
    pub fn disable(&mut self) {
        self.state = LifecycleState::Disabled;
    }

    /// Put a disabled event back into play.
    ///
    /// The state is derived from the fire history, so enabling never revives
    /// an event that already used its budget.
    pub fn enable(&mut self) {
        if self.state != LifecycleState::Disabled {
            return;
        }
        self.state = if self.trigger_count == 0 {
            LifecycleState::Active
        } else if self.is_exhausted() {
            LifecycleState::Completed
        } else {
            LifecycleState::Triggered
        };
    }

    fn is_exhausted(&self) -> bool {
        !self.can_repeat || self.budget_spent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_new_record_defaults() {
        let record = EventRecord::new("a", TriggerKind::OnTouch, EventType::Chest);
        assert_eq!(record.state, LifecycleState::Active);
        assert!(!record.can_repeat);
        assert_eq!(record.trigger_count, 0);
        assert!(record.last_triggered_at.is_none());
        assert!(record.can_trigger(at(0)));
    }

    #[test]
    fn test_non_repeatable_completes_after_one_fire() {
        let mut record = EventRecord::new("chest", TriggerKind::OnTouch, EventType::Chest);
        record.trigger(at(0));

        assert_eq!(record.state, LifecycleState::Completed);
        assert_eq!(record.trigger_count, 1);
        assert_eq!(record.last_triggered_at, Some(at(0)));
        assert!(!record.can_trigger(at(1000)));
    }

    #[test]
    fn test_repeatable_with_budget() {
        let mut record = EventRecord::new("spring", TriggerKind::OnTouch, EventType::Rest)
            .repeatable()
            .with_max_triggers(3);

        for i in 0..2 {
            assert!(record.can_trigger(at(i)));
            record.trigger(at(i));
            assert_eq!(record.state, LifecycleState::Triggered);
        }
        record.trigger(at(2));
        assert_eq!(record.state, LifecycleState::Completed);
        assert_eq!(record.trigger_count, 3);
        assert!(!record.can_trigger(at(3)));
    }

    #[test]
    fn test_repeatable_unlimited_never_completes() {
        let mut record =
            EventRecord::new("sign", TriggerKind::OnInteract, EventType::Info).repeatable();
        for i in 0..50 {
            record.trigger(at(i));
        }
        assert_eq!(record.state, LifecycleState::Triggered);
        assert!(record.can_trigger(at(51)));
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut record = EventRecord::new("trap", TriggerKind::OnTouch, EventType::Trap)
            .repeatable()
            .with_cooldown(Duration::from_secs(5));

        record.trigger(at(0));
        assert!(!record.can_trigger(at(0)));
        assert!(!record.can_trigger(at(4)));
        assert_eq!(record.cooldown_remaining(at(4)), Duration::from_secs(1));
        assert!(record.can_trigger(at(5)));
        assert!(record.can_trigger(at(6)));
    }

    #[test]
    fn test_cooldown_without_prior_fire() {
        let record = EventRecord::new("trap", TriggerKind::OnTouch, EventType::Trap)
            .with_cooldown(Duration::from_secs(60));
        assert!(record.can_trigger(at(0)));
    }

    #[test]
    fn test_live_while_cooling_down() {
        let mut record = EventRecord::new("trap", TriggerKind::OnTouch, EventType::Trap)
            .repeatable()
            .with_max_triggers(2)
            .with_cooldown(Duration::from_secs(5));

        record.trigger(at(0));
        assert!(record.is_live());
        assert!(!record.can_trigger(at(1)));

        record.trigger(at(5));
        assert!(!record.is_live());
    }

    #[test]
    fn test_disabled_blocks_everything() {
        let mut record =
            EventRecord::new("door", TriggerKind::OnTouch, EventType::Door).repeatable();
        record.disable();
        assert!(!record.can_trigger(at(0)));
    }

    #[test]
    fn test_enable_restores_state_from_history() {
        let mut fresh = EventRecord::new("a", TriggerKind::OnTouch, EventType::Info);
        fresh.disable();
        fresh.enable();
        assert_eq!(fresh.state, LifecycleState::Active);

        let mut fired = EventRecord::new("b", TriggerKind::OnTouch, EventType::Info).repeatable();
        fired.trigger(at(0));
        fired.disable();
        fired.enable();
        assert_eq!(fired.state, LifecycleState::Triggered);

        let mut spent = EventRecord::new("c", TriggerKind::OnTouch, EventType::Info);
        spent.trigger(at(0));
        spent.disable();
        spent.enable();
        assert_eq!(spent.state, LifecycleState::Completed);
    }

    #[test]
    fn test_enable_ignores_non_disabled() {
        let mut record = EventRecord::new("a", TriggerKind::OnTouch, EventType::Info);
        record.trigger(at(0));
        record.enable();
        assert_eq!(record.state, LifecycleState::Completed);
    }

    #[test]
    fn test_reset() {
        let mut record = EventRecord::new("boss", TriggerKind::OnTouch, EventType::Battle);
        record.trigger(at(0));
        record.reset();

        assert_eq!(record.state, LifecycleState::Active);
        assert_eq!(record.trigger_count, 0);
        assert!(record.last_triggered_at.is_none());
        assert!(record.can_trigger(at(0)));
    }

    #[test]
    fn test_requires_deduplicates() {
        let record = EventRecord::new("b", TriggerKind::OnTouch, EventType::Door)
            .requires("a")
            .requires("a")
            .requires("key");
        assert_eq!(record.prerequisites.len(), 2);
        assert_eq!(record.prerequisites[0], EventId::new("a"));
    }

    #[test]
    fn test_mode_filter() {
        let record = EventRecord::new("ambush", TriggerKind::OnTouch, EventType::Battle)
            .active_in(ActiveMode::Exploration);
        assert!(record.is_active_in(GameMode::Exploration));
        assert!(!record.is_active_in(GameMode::Tactical));
    }

    #[test]
    fn test_trigger_kind_scanned() {
        assert!(TriggerKind::OnTouch.is_scanned());
        assert!(TriggerKind::OnTimeout.is_scanned());
        assert!(!TriggerKind::OnInteract.is_scanned());
        assert!(!TriggerKind::Manual.is_scanned());
    }

    #[test]
    fn test_record_deserializes_with_defaults() {
        let json = r#"{"id":"hint","trigger":"OnProximity","event_type":"Info"}"#;
        let record: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.state, LifecycleState::Active);
        assert_eq!(record.active_in, ActiveMode::Both);
        assert!(record.presentation.visible);
        assert_eq!(record.payload, EventPayload::None);
    }

    #[test]
    fn test_record_serialization() {
        let record = EventRecord::new("gate", TriggerKind::OnProximity, EventType::Door)
            .with_radius(48.0)
            .requires("lever")
            .with_cooldown(Duration::from_millis(250));
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }
}
