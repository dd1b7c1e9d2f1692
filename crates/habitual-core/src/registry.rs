//! Habit definitions.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use habitual_db::models::Habit;
use habitual_db::queries::habits::HabitDeletion;

use crate::error::{Result, TrackerError};
use crate::store::HabitStore;

/// Category assigned when the caller leaves it blank.
pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Clone)]
pub struct HabitRegistry {
    store: Arc<dyn HabitStore>,
}

impl HabitRegistry {
    pub fn new(store: Arc<dyn HabitStore>) -> Self {
        Self { store }
    }

    /// Register a habit. The name is trimmed and must not be empty.
    pub async fn create(&self, name: &str, category: &str) -> Result<Habit> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::validation("habit name must not be empty"));
        }
        let category = normalize_category(category);

        let habit = self.store.insert_habit(name, category).await?;
        info!(habit = %habit.id, name = %habit.name, "habit created");
        Ok(habit)
    }

    /// Delete a habit and everything that references it.
    pub async fn delete(&self, id: Uuid) -> Result<HabitDeletion> {
        let deletion = self
            .store
            .delete_habit_cascade(id)
            .await?
            .ok_or_else(|| TrackerError::habit_not_found(id))?;
        info!(
            habit = %id,
            plan_entries = deletion.plan_entries,
            executions = deletion.executions,
            "habit deleted"
        );
        Ok(deletion)
    }

    /// All habits, oldest first.
    pub async fn list(&self) -> Result<Vec<Habit>> {
        let habits = self.store.list_habits().await?;
        debug!(count = habits.len(), "listed habits");
        Ok(habits)
    }

    /// Fail with a validation error unless `id` names an existing habit.
    pub(crate) async fn ensure_exists(store: &dyn HabitStore, id: Uuid) -> Result<()> {
        if store.habit_exists(id).await? {
            Ok(())
        } else {
            Err(TrackerError::unknown_habit(id))
        }
    }
}

pub(crate) fn normalize_category(category: &str) -> &str {
    let category = category.trim();
    if category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        category
    }
}
