//! Concurrent identical toggles must collapse into one net state flip.
//!
//! `GatedStore` wraps the in-memory store and holds every existence check at
//! a barrier until both callers have made theirs, forcing the worst-case
//! interleaving: both callers see the same state, then both write.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Barrier;
use uuid::Uuid;

use habitual_core::plan::ToggleAction;
use habitual_core::store::{HabitStore, MemoryStore};
use habitual_core::{CalendarDay, Result, Tracker};
use habitual_db::models::{Habit, Weekday, WeeklyPlanEntry};
use habitual_db::queries::habits::HabitDeletion;

struct GatedStore {
    inner: Arc<MemoryStore>,
    gate: Barrier,
    armed: AtomicBool,
}

impl GatedStore {
    fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            gate: Barrier::new(2),
            armed: AtomicBool::new(false),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    async fn hold(&self) {
        if self.armed.load(Ordering::SeqCst) {
            self.gate.wait().await;
        }
    }
}

#[async_trait]
impl HabitStore for GatedStore {
    async fn insert_habit(&self, name: &str, category: &str) -> Result<Habit> {
        self.inner.insert_habit(name, category).await
    }

    async fn habit_exists(&self, id: Uuid) -> Result<bool> {
        self.inner.habit_exists(id).await
    }

    async fn list_habits(&self) -> Result<Vec<Habit>> {
        self.inner.list_habits().await
    }

    async fn delete_habit_cascade(&self, id: Uuid) -> Result<Option<HabitDeletion>> {
        self.inner.delete_habit_cascade(id).await
    }

    async fn plan_entry_exists(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        let exists = self.inner.plan_entry_exists(weekday, habit_id).await?;
        self.hold().await;
        Ok(exists)
    }

    async fn insert_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        self.inner.insert_plan_entry(weekday, habit_id).await
    }

    async fn delete_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        self.inner.delete_plan_entry(weekday, habit_id).await
    }

    async fn list_plan_entries(&self) -> Result<Vec<WeeklyPlanEntry>> {
        self.inner.list_plan_entries().await
    }

    async fn replicate_plan(&self, source: Weekday) -> Result<u64> {
        self.inner.replicate_plan(source).await
    }

    async fn execution_exists(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        let exists = self.inner.execution_exists(day, habit_id).await?;
        self.hold().await;
        Ok(exists)
    }

    async fn insert_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        self.inner.insert_execution(day, habit_id).await
    }

    async fn delete_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        self.inner.delete_execution(day, habit_id).await
    }

    async fn completed_on(&self, day: CalendarDay) -> Result<Vec<Uuid>> {
        self.inner.completed_on(day).await
    }
}

fn setup() -> (Tracker, Arc<GatedStore>, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let gated = Arc::new(GatedStore::new(memory.clone()));
    let tracker = Tracker::new(gated.clone(), memory.clone());
    (tracker, gated, memory)
}

#[tokio::test]
async fn concurrent_plan_adds_create_one_entry() {
    let (tracker, gated, memory) = setup();
    let habit = tracker.habits.create("Read", "mind").await.unwrap();
    gated.arm();

    let (a, b) = tokio::join!(
        tracker.plan.toggle(Weekday::Mon, habit.id),
        tracker.plan.toggle(Weekday::Mon, habit.id),
    );

    assert_eq!(a.unwrap().action, ToggleAction::Added);
    assert_eq!(b.unwrap().action, ToggleAction::Added);
    assert_eq!(memory.plan_rows().await.len(), 1);
}

#[tokio::test]
async fn concurrent_plan_removes_delete_once() {
    let (tracker, gated, memory) = setup();
    let habit = tracker.habits.create("Read", "mind").await.unwrap();
    tracker.plan.toggle(Weekday::Mon, habit.id).await.unwrap();
    gated.arm();

    let (a, b) = tokio::join!(
        tracker.plan.toggle(Weekday::Mon, habit.id),
        tracker.plan.toggle(Weekday::Mon, habit.id),
    );

    assert_eq!(a.unwrap().action, ToggleAction::Removed);
    assert_eq!(b.unwrap().action, ToggleAction::Removed);
    assert!(memory.plan_rows().await.is_empty());
}

#[tokio::test]
async fn concurrent_execution_toggles_flip_once() {
    let (tracker, gated, memory) = setup();
    let habit = tracker.habits.create("Run", "body").await.unwrap();
    let day: CalendarDay = "2026-01-20".parse().unwrap();
    gated.arm();

    let (a, b) = tokio::join!(
        tracker.executions.toggle(habit.id, day),
        tracker.executions.toggle(habit.id, day),
    );
    assert!(a.unwrap().done);
    assert!(b.unwrap().done);
    assert_eq!(memory.execution_rows().await.len(), 1);

    let (a, b) = tokio::join!(
        tracker.executions.toggle(habit.id, day),
        tracker.executions.toggle(habit.id, day),
    );
    assert!(!a.unwrap().done);
    assert!(!b.unwrap().done);
    assert!(memory.execution_rows().await.is_empty());
}

#[tokio::test]
async fn parallel_tasks_on_distinct_keys_do_not_interfere() {
    let memory = Arc::new(MemoryStore::new());
    let tracker = Tracker::with_memory_store(memory.clone());
    let habit = tracker.habits.create("Read", "mind").await.unwrap();

    let handles: Vec<_> = Weekday::ALL
        .into_iter()
        .map(|weekday| {
            let plan = tracker.plan.clone();
            tokio::spawn(async move { plan.toggle(weekday, habit.id).await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert_eq!(result.unwrap().unwrap().action, ToggleAction::Added);
    }
    assert_eq!(memory.plan_rows().await.len(), 7);
}
