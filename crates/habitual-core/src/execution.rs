//! Daily completion records.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::day::CalendarDay;
use crate::error::Result;
use crate::registry::HabitRegistry;
use crate::store::HabitStore;

/// Outcome of [`ExecutionLog::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionToggle {
    pub done: bool,
}

#[derive(Clone)]
pub struct ExecutionLog {
    store: Arc<dyn HabitStore>,
}

impl ExecutionLog {
    pub fn new(store: Arc<dyn HabitStore>) -> Self {
        Self { store }
    }

    /// Mark `habit_id` done on `day`, or undo it if it already was.
    ///
    /// Races between the existence check and the write resolve the same way
    /// as [`crate::plan::WeeklyPlan::toggle`].
    pub async fn toggle(&self, habit_id: Uuid, day: CalendarDay) -> Result<ExecutionToggle> {
        HabitRegistry::ensure_exists(self.store.as_ref(), habit_id).await?;

        let done = if self.store.execution_exists(day, habit_id).await? {
            if !self.store.delete_execution(day, habit_id).await? {
                warn!(%day, habit = %habit_id, "execution already removed concurrently");
            }
            false
        } else {
            if !self.store.insert_execution(day, habit_id).await? {
                warn!(%day, habit = %habit_id, "execution already recorded concurrently");
            }
            true
        };

        info!(%day, habit = %habit_id, done, "execution toggled");
        Ok(ExecutionToggle { done })
    }

    pub async fn completed_on(&self, day: CalendarDay) -> Result<BTreeSet<Uuid>> {
        let ids: BTreeSet<Uuid> = self.store.completed_on(day).await?.into_iter().collect();
        debug!(%day, count = ids.len(), "loaded completions");
        Ok(ids)
    }
}
