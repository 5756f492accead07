//! Property tests for the event lifecycle.

use std::time::Duration;

use chrono::{DateTime, Utc};
use proptest::prelude::*;

use world_events::events::{EventRecord, EventType, LifecycleState, TriggerKind};
use world_events::persistence::{EventStateSnapshot, SaveDocument};

fn at(secs: u32) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + i64::from(secs), 0).unwrap()
}

fn record(can_repeat: bool, max_triggers: u32, cooldown_secs: u64) -> EventRecord {
    let record = EventRecord::new("e", TriggerKind::OnTouch, EventType::Trap)
        .with_max_triggers(max_triggers)
        .with_cooldown(Duration::from_secs(cooldown_secs));
    if can_repeat {
        record.repeatable()
    } else {
        record
    }
}

/// Fire whenever the gate allows, over a sequence of increasing times.
fn fire_greedily(record: &mut EventRecord, times: &[u32]) -> u32 {
    let mut fired = 0;
    for &t in times {
        if record.can_trigger(at(t)) {
            record.trigger(at(t));
            fired += 1;
        }
    }
    fired
}

fn sorted_times() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..10_000, 0..64).prop_map(|mut times| {
        times.sort_unstable();
        times
    })
}

proptest! {
    /// Completed and Disabled never pass the gate.
    #[test]
    fn terminal_states_never_trigger(
        can_repeat in any::<bool>(),
        max_triggers in 0u32..5,
        cooldown in 0u64..10,
        t in 0u32..100_000,
    ) {
        let mut completed = record(can_repeat, max_triggers, cooldown);
        completed.state = LifecycleState::Completed;
        prop_assert!(!completed.can_trigger(at(t)));

        let mut disabled = record(can_repeat, max_triggers, cooldown);
        disabled.disable();
        prop_assert!(!disabled.can_trigger(at(t)));
    }

    /// A repeatable event with budget N fires at most N times, and exactly N
    /// when given enough well-spaced opportunities.
    #[test]
    fn budget_bounds_fires(max_triggers in 1u32..8, times in sorted_times()) {
        let mut event = record(true, max_triggers, 0);
        let fired = fire_greedily(&mut event, &times);

        prop_assert!(fired <= max_triggers);
        prop_assert_eq!(event.trigger_count, fired);
        if times.len() as u32 >= max_triggers {
            prop_assert_eq!(fired, max_triggers);
            prop_assert_eq!(event.state, LifecycleState::Completed);
        }
    }

    /// A non-repeatable event fires at most once.
    #[test]
    fn non_repeatable_fires_once(times in sorted_times()) {
        let mut event = record(false, 0, 0);
        let fired = fire_greedily(&mut event, &times);
        prop_assert_eq!(fired, u32::from(!times.is_empty()));
    }

    /// Consecutive fires are never closer than the cooldown.
    #[test]
    fn cooldown_spacing(cooldown in 1u64..30, times in sorted_times()) {
        let mut event = record(true, 0, cooldown);
        let mut last: Option<DateTime<Utc>> = None;
        for &t in &times {
            if event.can_trigger(at(t)) {
                if let Some(previous) = last {
                    let gap = (at(t) - previous).num_seconds();
                    prop_assert!(gap >= cooldown as i64);
                }
                event.trigger(at(t));
                last = Some(at(t));
            }
        }
    }

    /// A document built from live records always validates.
    #[test]
    fn snapshot_of_live_records_validates(
        budgets in prop::collection::vec((any::<bool>(), 0u32..4, 0usize..6), 1..12),
    ) {
        let mut document = SaveDocument::new(at(0));
        for (i, (can_repeat, max_triggers, fires)) in budgets.into_iter().enumerate() {
            let mut event = EventRecord::new(format!("e{}", i), TriggerKind::OnTouch, EventType::Info)
                .with_max_triggers(max_triggers);
            if can_repeat {
                event = event.repeatable();
            }
            let times: Vec<u32> = (0..fires as u32).collect();
            fire_greedily(&mut event, &times);

            document.completed_events.insert(event.id.clone(), event.is_completed());
            document.event_states.insert(event.id.clone(), EventStateSnapshot::from(&event));
        }
        prop_assert!(document.validate().is_ok());
    }
}
