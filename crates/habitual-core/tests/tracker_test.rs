//! Service-level tests for habits, the weekly plan, executions, the
//! initial-load aggregate and goals, run against the in-memory store.

use std::collections::BTreeSet;
use std::sync::Arc;

use habitual_core::plan::ToggleAction;
use habitual_core::store::MemoryStore;
use habitual_core::{CalendarDay, Tracker, TrackerError, Weekday};

fn day(s: &str) -> CalendarDay {
    s.parse().expect("test date should parse")
}

fn setup() -> (Tracker, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Tracker::with_memory_store(store.clone()), store)
}

// ---------------------------------------------------------------------------
// Habit registry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_list_habits_in_creation_order() {
    let (tracker, _) = setup();

    let read = tracker.habits.create("Read", "mind").await.unwrap();
    let run = tracker.habits.create("  Run  ", "").await.unwrap();

    assert_eq!(run.name, "Run");
    assert_eq!(run.category, "general");

    let listed = tracker.habits.list().await.unwrap();
    let ids: Vec<_> = listed.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![read.id, run.id]);
}

#[tokio::test]
async fn create_habit_rejects_blank_name() {
    let (tracker, _) = setup();

    let err = tracker.habits.create("   ", "mind").await.unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)), "got {err:?}");
    assert!(tracker.habits.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_missing_habit_is_not_found() {
    let (tracker, _) = setup();

    let err = tracker.habits.delete(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound { entity: "habit", .. }));
}

#[tokio::test]
async fn delete_habit_cascades_to_plan_and_executions() {
    let (tracker, store) = setup();
    let keep = tracker.habits.create("Keep", "x").await.unwrap();
    let gone = tracker.habits.create("Gone", "x").await.unwrap();

    tracker.plan.toggle(Weekday::Mon, gone.id).await.unwrap();
    tracker.plan.toggle(Weekday::Fri, gone.id).await.unwrap();
    tracker.plan.toggle(Weekday::Mon, keep.id).await.unwrap();
    tracker.executions.toggle(gone.id, day("2026-01-19")).await.unwrap();
    tracker.executions.toggle(keep.id, day("2026-01-19")).await.unwrap();

    let deletion = tracker.habits.delete(gone.id).await.unwrap();
    assert_eq!(deletion.plan_entries, 2);
    assert_eq!(deletion.executions, 1);

    assert!(store.plan_rows().await.iter().all(|e| e.habit_id != gone.id));
    assert!(store.execution_rows().await.iter().all(|r| r.habit_id != gone.id));

    let snapshot = tracker.plan.snapshot().await.unwrap();
    assert_eq!(snapshot.day(Weekday::Mon), &[keep.id]);
    assert!(snapshot.day(Weekday::Fri).is_empty());
}

// ---------------------------------------------------------------------------
// Weekly plan
// ---------------------------------------------------------------------------

#[tokio::test]
async fn plan_toggle_twice_restores_original_state() {
    let (tracker, _) = setup();
    let habit = tracker.habits.create("Stretch", "body").await.unwrap();

    let before = tracker.plan.snapshot().await.unwrap();

    let first = tracker.plan.toggle(Weekday::Wed, habit.id).await.unwrap();
    assert_eq!(first.action, ToggleAction::Added);
    assert!(tracker.plan.snapshot().await.unwrap().contains(Weekday::Wed, habit.id));

    let second = tracker.plan.toggle(Weekday::Wed, habit.id).await.unwrap();
    assert_eq!(second.action, ToggleAction::Removed);

    assert_eq!(tracker.plan.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn plan_toggle_unknown_habit_is_validation_error() {
    let (tracker, store) = setup();

    let err = tracker
        .plan
        .toggle(Weekday::Mon, uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)), "got {err:?}");
    assert!(store.plan_rows().await.is_empty());
}

#[tokio::test]
async fn snapshot_lists_every_weekday_in_insertion_order() {
    let (tracker, _) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    let b = tracker.habits.create("B", "x").await.unwrap();

    tracker.plan.toggle(Weekday::Sat, b.id).await.unwrap();
    tracker.plan.toggle(Weekday::Sat, a.id).await.unwrap();

    let snapshot = tracker.plan.snapshot().await.unwrap();
    assert_eq!(snapshot.iter().count(), 7);
    assert_eq!(snapshot.day(Weekday::Sat), &[b.id, a.id]);
}

#[tokio::test]
async fn replicate_overwrites_other_days() {
    let (tracker, _) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    let b = tracker.habits.create("B", "x").await.unwrap();
    let c = tracker.habits.create("C", "x").await.unwrap();

    tracker.plan.toggle(Weekday::Mon, a.id).await.unwrap();
    tracker.plan.toggle(Weekday::Mon, b.id).await.unwrap();
    tracker.plan.toggle(Weekday::Thu, c.id).await.unwrap();

    let created = tracker.plan.replicate_from(Weekday::Mon).await.unwrap();
    assert_eq!(created, 12);

    let snapshot = tracker.plan.snapshot().await.unwrap();
    for weekday in Weekday::ALL {
        assert_eq!(snapshot.day(weekday), &[a.id, b.id], "weekday {weekday}");
    }
}

#[tokio::test]
async fn replicate_from_empty_day_clears_the_week() {
    let (tracker, store) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    tracker.plan.toggle(Weekday::Tue, a.id).await.unwrap();
    tracker.plan.toggle(Weekday::Sun, a.id).await.unwrap();

    let created = tracker.plan.replicate_from(Weekday::Mon).await.unwrap();

    assert_eq!(created, 0);
    assert!(store.plan_rows().await.is_empty());
}

#[tokio::test]
async fn replicate_from_non_monday_source() {
    let (tracker, _) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    tracker.plan.toggle(Weekday::Fri, a.id).await.unwrap();

    tracker.plan.replicate_from(Weekday::Fri).await.unwrap();

    let snapshot = tracker.plan.snapshot().await.unwrap();
    assert_eq!(snapshot.day(Weekday::Mon), &[a.id]);
    assert_eq!(snapshot.day(Weekday::Fri), &[a.id]);
}

// ---------------------------------------------------------------------------
// Execution log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn execution_toggle_twice_restores_original_state() {
    let (tracker, store) = setup();
    let habit = tracker.habits.create("Meditate", "mind").await.unwrap();
    let today = day("2026-01-20");

    assert!(tracker.executions.toggle(habit.id, today).await.unwrap().done);
    assert_eq!(
        tracker.executions.completed_on(today).await.unwrap(),
        BTreeSet::from([habit.id])
    );

    assert!(!tracker.executions.toggle(habit.id, today).await.unwrap().done);
    assert!(tracker.executions.completed_on(today).await.unwrap().is_empty());
    assert!(store.execution_rows().await.is_empty());
}

#[tokio::test]
async fn execution_toggle_ignores_time_of_day() {
    let (tracker, store) = setup();
    let habit = tracker.habits.create("Journal", "mind").await.unwrap();

    let late = tracker
        .executions
        .toggle(habit.id, day("2026-01-20T23:59:00"))
        .await
        .unwrap();
    assert!(late.done);

    let early = tracker
        .executions
        .toggle(habit.id, day("2026-01-20T00:00:00"))
        .await
        .unwrap();
    assert!(!early.done, "both timestamps must address the same record");
    assert!(store.execution_rows().await.is_empty());
}

#[tokio::test]
async fn executions_are_per_day() {
    let (tracker, _) = setup();
    let habit = tracker.habits.create("Walk", "body").await.unwrap();

    tracker.executions.toggle(habit.id, day("2026-01-20")).await.unwrap();

    assert!(tracker.executions.completed_on(day("2026-01-21")).await.unwrap().is_empty());
    assert_eq!(tracker.executions.completed_on(day("2026-01-20")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn execution_toggle_unknown_habit_is_validation_error() {
    let (tracker, _) = setup();

    let err = tracker
        .executions
        .toggle(uuid::Uuid::new_v4(), day("2026-01-20"))
        .await
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
}

#[tokio::test]
async fn toggle_sequences_never_duplicate_rows() {
    let (tracker, store) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    let b = tracker.habits.create("B", "x").await.unwrap();

    let keys = [(Weekday::Mon, a.id), (Weekday::Mon, b.id), (Weekday::Tue, a.id)];
    for round in 0..5 {
        for (i, (weekday, habit_id)) in keys.iter().enumerate() {
            if (round + i) % 2 == 0 {
                tracker.plan.toggle(*weekday, *habit_id).await.unwrap();
            }
            tracker
                .executions
                .toggle(*habit_id, day("2026-01-19"))
                .await
                .unwrap();
        }
    }

    let plan_rows = store.plan_rows().await;
    let unique_plan: BTreeSet<_> = plan_rows.iter().map(|e| (e.weekday, e.habit_id)).collect();
    assert_eq!(unique_plan.len(), plan_rows.len());

    let exec_rows = store.execution_rows().await;
    let unique_exec: BTreeSet<_> = exec_rows.iter().map(|r| (r.day, r.habit_id)).collect();
    assert_eq!(unique_exec.len(), exec_rows.len());
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_state_combines_all_three_stores() {
    let (tracker, _) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    let b = tracker.habits.create("B", "x").await.unwrap();
    tracker.plan.toggle(Weekday::Mon, a.id).await.unwrap();
    tracker.executions.toggle(a.id, day("2026-01-19")).await.unwrap();

    let state = tracker
        .reconciler
        .load_initial_state(Some(day("2026-01-19")))
        .await
        .unwrap();

    let ids: Vec<_> = state.habits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
    assert_eq!(state.weekly_plan.day(Weekday::Mon), &[a.id]);
    assert_eq!(state.completed_today, BTreeSet::from([a.id]));
    assert_eq!(state.date, day("2026-01-19"));
}

#[tokio::test]
async fn initial_state_defaults_to_today() {
    let (tracker, _) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    tracker.executions.toggle(a.id, CalendarDay::today()).await.unwrap();

    let state = tracker.reconciler.load_initial_state(None).await.unwrap();
    assert_eq!(state.date, CalendarDay::today());
    assert!(state.completed_today.contains(&a.id));
}

#[tokio::test]
async fn initial_state_serializes_expected_shape() {
    let (tracker, _) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    tracker.plan.toggle(Weekday::Sun, a.id).await.unwrap();

    let state = tracker
        .reconciler
        .load_initial_state(Some(day("2026-01-25")))
        .await
        .unwrap();
    let json = serde_json::to_value(&state).unwrap();

    assert_eq!(json["date"], "2026-01-25");
    assert_eq!(json["habits"][0]["name"], "A");
    assert_eq!(json["weekly_plan"]["sun"][0], a.id.to_string());
    assert_eq!(json["weekly_plan"]["mon"], serde_json::json!([]));
    assert_eq!(json["completed_today"], serde_json::json!([]));
}

#[tokio::test]
async fn agenda_lists_scheduled_habits_with_done_flags() {
    let (tracker, _) = setup();
    let a = tracker.habits.create("A", "x").await.unwrap();
    let b = tracker.habits.create("B", "x").await.unwrap();
    let c = tracker.habits.create("C", "x").await.unwrap();
    tracker.plan.toggle(Weekday::Mon, a.id).await.unwrap();
    tracker.plan.toggle(Weekday::Mon, b.id).await.unwrap();
    tracker.plan.toggle(Weekday::Tue, c.id).await.unwrap();
    tracker.executions.toggle(b.id, day("2026-01-19")).await.unwrap();

    let agenda = tracker.reconciler.agenda(Some(day("2026-01-19"))).await.unwrap();

    assert_eq!(agenda.weekday, Weekday::Mon);
    let items: Vec<_> = agenda.items.iter().map(|i| (i.habit.id, i.done)).collect();
    assert_eq!(items, vec![(a.id, false), (b.id, true)]);
    assert_eq!(agenda.remaining(), 1);
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn goals_are_filtered_by_day() {
    let (tracker, _) = setup();
    let mon = tracker
        .goals
        .create("Call the bank", "admin", Some(day("2026-01-19")))
        .await
        .unwrap();
    tracker
        .goals
        .create("Buy paint", "home", Some(day("2026-01-20T09:30:00")))
        .await
        .unwrap();

    let listed = tracker.goals.list_by_day(Some(day("2026-01-19"))).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mon.id);
    assert!(!listed[0].completed);

    let next = tracker.goals.list_by_day(Some(day("2026-01-20"))).await.unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].title, "Buy paint");
}

#[tokio::test]
async fn goal_without_date_lands_today() {
    let (tracker, _) = setup();
    let goal = tracker.goals.create("Water plants", "home", None).await.unwrap();

    let today = tracker.goals.list_by_day(None).await.unwrap();
    assert!(today.iter().any(|g| g.id == goal.id));
}

#[tokio::test]
async fn goal_completion_takes_the_explicit_value() {
    let (tracker, _) = setup();
    let goal = tracker.goals.create("Ship it", "", None).await.unwrap();
    assert_eq!(goal.category, "general");

    assert!(tracker.goals.set_completed(goal.id, true).await.unwrap().completed);
    // Setting the same value again is not a toggle.
    assert!(tracker.goals.set_completed(goal.id, true).await.unwrap().completed);
    assert!(!tracker.goals.set_completed(goal.id, false).await.unwrap().completed);
}

#[tokio::test]
async fn goal_errors() {
    let (tracker, _) = setup();
    let missing = uuid::Uuid::new_v4();

    assert!(matches!(
        tracker.goals.create(" ", "x", None).await.unwrap_err(),
        TrackerError::Validation(_)
    ));
    assert!(matches!(
        tracker.goals.set_completed(missing, true).await.unwrap_err(),
        TrackerError::NotFound { entity: "goal", .. }
    ));
    assert!(matches!(
        tracker.goals.delete(missing).await.unwrap_err(),
        TrackerError::NotFound { entity: "goal", .. }
    ));
}

#[tokio::test]
async fn delete_goal_removes_it() {
    let (tracker, _) = setup();
    let goal = tracker
        .goals
        .create("Temp", "x", Some(day("2026-03-01")))
        .await
        .unwrap();

    tracker.goals.delete(goal.id).await.unwrap();
    assert!(tracker.goals.list_by_day(Some(day("2026-03-01"))).await.unwrap().is_empty());
}
