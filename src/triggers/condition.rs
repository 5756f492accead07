//! Trigger condition evaluation.
//!
//! Decides whether an event's trigger condition holds right now, given the
//! spatial relationship between its entity and the player. Evaluation is
//! pure: it reads the record and the context and mutates nothing. Gating
//! (lifecycle, cooldown, prerequisites, edge detection) is the manager's job.

use chrono::{DateTime, Utc};

use crate::core::{
    elapsed_between, Bounds, EngineConfig, DEFAULT_PROXIMITY_RADIUS, DEFAULT_ROOM_ENTRY_RADIUS,
};
use crate::events::{EventRecord, QuestRequirement, TriggerKind};

/// Answers quest-state questions for `OnQuestState` events.
///
/// Implemented by the host game's quest system and injected into the
/// manager. Any `Fn(&QuestRequirement) -> bool` closure also works.
pub trait QuestStateProvider {
    /// Check whether the quest is currently in the required state.
    fn satisfies(&self, requirement: &QuestRequirement) -> bool;
}

impl<F> QuestStateProvider for F
where
    F: Fn(&QuestRequirement) -> bool,
{
    fn satisfies(&self, requirement: &QuestRequirement) -> bool {
        self(requirement)
    }
}

/// Context for evaluating a trigger condition.
pub struct ConditionContext<'a> {
    /// Bounding box of the entity owning the event.
    pub entity: Option<Bounds>,
    /// Bounding box of the player.
    pub player: Option<Bounds>,
    /// Current time.
    pub now: DateTime<Utc>,
    /// When the event's timeout started counting, if armed.
    pub armed_at: Option<DateTime<Utc>>,
    /// Radius for proximity events without their own.
    pub proximity_radius: f32,
    /// Radius for room-entry events.
    pub room_entry_radius: f32,
    /// Quest state oracle (provided by game).
    pub quests: Option<&'a dyn QuestStateProvider>,
}

impl<'a> ConditionContext<'a> {
    /// Create a new context with default radii.
    pub fn new(entity: Option<Bounds>, player: Option<Bounds>, now: DateTime<Utc>) -> Self {
        Self {
            entity,
            player,
            now,
            armed_at: None,
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            room_entry_radius: DEFAULT_ROOM_ENTRY_RADIUS,
            quests: None,
        }
    }

    /// Take radii from the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.proximity_radius = config.proximity_radius;
        self.room_entry_radius = config.room_entry_radius;
        self
    }

    /// Set the timeout arm time.
    #[must_use]
    pub fn with_armed_at(mut self, armed_at: Option<DateTime<Utc>>) -> Self {
        self.armed_at = armed_at;
        self
    }

    /// Add a quest state oracle.
    #[must_use]
    pub fn with_quests(mut self, quests: &'a dyn QuestStateProvider) -> Self {
        self.quests = Some(quests);
        self
    }
}

/// Evaluator for trigger conditions.
pub struct TriggerEvaluator;

impl TriggerEvaluator {
    /// Check if the record's trigger condition currently holds.
    pub fn evaluate(record: &EventRecord, ctx: &ConditionContext) -> bool {
        match record.trigger {
            TriggerKind::OnTouch => Self::both(ctx).is_some_and(|(e, p)| e.overlaps(&p)),

            TriggerKind::OnProximity => {
                let radius = record
                    .condition
                    .proximity_radius
                    .unwrap_or(ctx.proximity_radius);
                Self::within(ctx, radius)
            }

            // Simplified to a wide proximity check, not a room graph.
            TriggerKind::OnRoomEntry => Self::within(ctx, ctx.room_entry_radius),

            TriggerKind::OnTimeout => match (ctx.armed_at, record.condition.timeout) {
                (Some(armed_at), Some(timeout)) => elapsed_between(armed_at, ctx.now) >= timeout,
                // Never fires before it is armed.
                _ => false,
            },

            TriggerKind::OnQuestState => match (ctx.quests, &record.condition.quest) {
                (Some(quests), Some(requirement)) => quests.satisfies(requirement),
                _ => false,
            },

            TriggerKind::OnInteract | TriggerKind::Manual => false,
        }
    }

    fn both(ctx: &ConditionContext) -> Option<(Bounds, Bounds)> {
        Some((ctx.entity?, ctx.player?))
    }

    fn within(ctx: &ConditionContext, radius: f32) -> bool {
        Self::both(ctx).is_some_and(|(e, p)| e.center_distance(&p) <= radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventType;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn tile(x: f32, y: f32) -> Option<Bounds> {
        Some(Bounds::new(x, y, 32.0, 32.0))
    }

    fn record(trigger: TriggerKind) -> EventRecord {
        EventRecord::new("e", trigger, EventType::Info)
    }

    #[test]
    fn test_touch() {
        let touch = record(TriggerKind::OnTouch);

        let ctx = ConditionContext::new(tile(150.0, 100.0), tile(150.0, 100.0), now());
        assert!(TriggerEvaluator::evaluate(&touch, &ctx));

        let ctx = ConditionContext::new(tile(150.0, 100.0), tile(0.0, 0.0), now());
        assert!(!TriggerEvaluator::evaluate(&touch, &ctx));

        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(32.0, 0.0), now());
        assert!(!TriggerEvaluator::evaluate(&touch, &ctx));
    }

    #[test]
    fn test_missing_bounds_never_fault() {
        for trigger in [
            TriggerKind::OnTouch,
            TriggerKind::OnProximity,
            TriggerKind::OnRoomEntry,
        ] {
            let r = record(trigger);
            let no_entity = ConditionContext::new(None, tile(0.0, 0.0), now());
            let no_player = ConditionContext::new(tile(0.0, 0.0), None, now());
            let neither = ConditionContext::new(None, None, now());
            assert!(!TriggerEvaluator::evaluate(&r, &no_entity));
            assert!(!TriggerEvaluator::evaluate(&r, &no_player));
            assert!(!TriggerEvaluator::evaluate(&r, &neither));
        }
    }

    #[test]
    fn test_proximity_default_radius() {
        let near = record(TriggerKind::OnProximity);

        // Centers 30 apart.
        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(30.0, 0.0), now());
        assert!(TriggerEvaluator::evaluate(&near, &ctx));

        // Exactly on the radius counts.
        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(32.0, 0.0), now());
        assert!(TriggerEvaluator::evaluate(&near, &ctx));

        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(33.0, 0.0), now());
        assert!(!TriggerEvaluator::evaluate(&near, &ctx));
    }

    #[test]
    fn test_proximity_own_radius() {
        let wide = record(TriggerKind::OnProximity).with_radius(100.0);
        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(80.0, 0.0), now());
        assert!(TriggerEvaluator::evaluate(&wide, &ctx));
    }

    #[test]
    fn test_proximity_config_radius() {
        let near = record(TriggerKind::OnProximity);
        let config = EngineConfig::default().with_proximity_radius(10.0);
        let ctx =
            ConditionContext::new(tile(0.0, 0.0), tile(20.0, 0.0), now()).with_config(&config);
        assert!(!TriggerEvaluator::evaluate(&near, &ctx));
    }

    #[test]
    fn test_room_entry() {
        let room = record(TriggerKind::OnRoomEntry);

        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(60.0, 0.0), now());
        assert!(TriggerEvaluator::evaluate(&room, &ctx));

        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(65.0, 0.0), now());
        assert!(!TriggerEvaluator::evaluate(&room, &ctx));
    }

    #[test]
    fn test_timeout_requires_arming() {
        let timer = record(TriggerKind::OnTimeout).with_timeout(Duration::from_secs(10));

        let unarmed = ConditionContext::new(None, None, now());
        assert!(!TriggerEvaluator::evaluate(&timer, &unarmed));

        let armed_at = now() - chrono::Duration::seconds(9);
        let early = ConditionContext::new(None, None, now()).with_armed_at(Some(armed_at));
        assert!(!TriggerEvaluator::evaluate(&timer, &early));

        let armed_at = now() - chrono::Duration::seconds(10);
        let due = ConditionContext::new(None, None, now()).with_armed_at(Some(armed_at));
        assert!(TriggerEvaluator::evaluate(&timer, &due));
    }

    #[test]
    fn test_timeout_without_duration() {
        let timer = record(TriggerKind::OnTimeout);
        let ctx = ConditionContext::new(None, None, now()).with_armed_at(Some(now()));
        assert!(!TriggerEvaluator::evaluate(&timer, &ctx));
    }

    #[test]
    fn test_interact_and_manual_never_scan() {
        let ctx = ConditionContext::new(tile(0.0, 0.0), tile(0.0, 0.0), now());
        assert!(!TriggerEvaluator::evaluate(&record(TriggerKind::OnInteract), &ctx));
        assert!(!TriggerEvaluator::evaluate(&record(TriggerKind::Manual), &ctx));
    }

    #[test]
    fn test_quest_state() {
        let gate = record(TriggerKind::OnQuestState)
            .with_quest(QuestRequirement::new("rescue", "done"));

        // Without provider
        let ctx = ConditionContext::new(None, None, now());
        assert!(!TriggerEvaluator::evaluate(&gate, &ctx));

        // With provider
        let quests = |req: &QuestRequirement| req.quest_id == "rescue" && req.state == "done";
        let ctx = ConditionContext::new(None, None, now()).with_quests(&quests);
        assert!(TriggerEvaluator::evaluate(&gate, &ctx));

        let other = record(TriggerKind::OnQuestState)
            .with_quest(QuestRequirement::new("rescue", "started"));
        assert!(!TriggerEvaluator::evaluate(&other, &ctx));

        // Provider but no requirement
        let bare = record(TriggerKind::OnQuestState);
        assert!(!TriggerEvaluator::evaluate(&bare, &ctx));
    }
}
