//! Wiring for the full set of services over shared stores.

use std::sync::Arc;

use sqlx::PgPool;

use crate::execution::ExecutionLog;
use crate::goals::GoalList;
use crate::plan::WeeklyPlan;
use crate::reconcile::Reconciler;
use crate::registry::HabitRegistry;
use crate::store::{GoalStore, HabitStore, MemoryStore, PgStore};

/// Every service, constructed over the same store handles.
#[derive(Clone)]
pub struct Tracker {
    pub habits: HabitRegistry,
    pub plan: WeeklyPlan,
    pub executions: ExecutionLog,
    pub reconciler: Reconciler,
    pub goals: GoalList,
}

impl Tracker {
    pub fn new(habit_store: Arc<dyn HabitStore>, goal_store: Arc<dyn GoalStore>) -> Self {
        Self {
            habits: HabitRegistry::new(habit_store.clone()),
            plan: WeeklyPlan::new(habit_store.clone()),
            executions: ExecutionLog::new(habit_store.clone()),
            reconciler: Reconciler::new(habit_store),
            goals: GoalList::new(goal_store),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store)
    }

    pub fn in_memory() -> Self {
        Self::with_memory_store(Arc::new(MemoryStore::new()))
    }

    /// Like [`Tracker::in_memory`] but keeps a handle on the store.
    pub fn with_memory_store(store: Arc<MemoryStore>) -> Self {
        Self::new(store.clone(), store)
    }
}
