use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use habitual_db::models::{Goal, Habit, Weekday, WeeklyPlanEntry};
use habitual_db::queries::habits::HabitDeletion;
use habitual_db::queries::{executions, goals, habits, weekly_plan};

use super::{GoalStore, HabitStore};
use crate::day::CalendarDay;
use crate::error::{Result, TrackerError};

/// [`HabitStore`] and [`GoalStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Whether any cause in the chain is a foreign-key violation, which on the
/// plan and execution tables means the habit was deleted underneath us.
fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| db.is_foreign_key_violation())
    })
}

fn map_habit_ref_error(err: anyhow::Error, habit_id: Uuid) -> TrackerError {
    if is_foreign_key_violation(&err) {
        TrackerError::unknown_habit(habit_id)
    } else {
        TrackerError::Store(err)
    }
}

#[async_trait]
impl HabitStore for PgStore {
    async fn insert_habit(&self, name: &str, category: &str) -> Result<Habit> {
        Ok(habits::insert_habit(&self.pool, name, category).await?)
    }

    async fn habit_exists(&self, id: Uuid) -> Result<bool> {
        Ok(habits::habit_exists(&self.pool, id).await?)
    }

    async fn list_habits(&self) -> Result<Vec<Habit>> {
        Ok(habits::list_habits(&self.pool).await?)
    }

    async fn delete_habit_cascade(&self, id: Uuid) -> Result<Option<HabitDeletion>> {
        Ok(habits::delete_habit_cascade(&self.pool, id).await?)
    }

    async fn plan_entry_exists(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        Ok(weekly_plan::plan_entry_exists(&self.pool, weekday, habit_id).await?)
    }

    async fn insert_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        weekly_plan::insert_plan_entry(&self.pool, weekday, habit_id)
            .await
            .map_err(|e| map_habit_ref_error(e, habit_id))
    }

    async fn delete_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        Ok(weekly_plan::delete_plan_entry(&self.pool, weekday, habit_id).await?)
    }

    async fn list_plan_entries(&self) -> Result<Vec<WeeklyPlanEntry>> {
        Ok(weekly_plan::list_plan_entries(&self.pool).await?)
    }

    async fn replicate_plan(&self, source: Weekday) -> Result<u64> {
        Ok(weekly_plan::replicate_plan(&self.pool, source).await?)
    }

    async fn execution_exists(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        Ok(executions::execution_exists(&self.pool, day.date(), habit_id).await?)
    }

    async fn insert_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        executions::insert_execution(&self.pool, day.date(), habit_id)
            .await
            .map_err(|e| map_habit_ref_error(e, habit_id))
    }

    async fn delete_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        Ok(executions::delete_execution(&self.pool, day.date(), habit_id).await?)
    }

    async fn completed_on(&self, day: CalendarDay) -> Result<Vec<Uuid>> {
        Ok(executions::habit_ids_completed_on(&self.pool, day.date()).await?)
    }
}

#[async_trait]
impl GoalStore for PgStore {
    async fn insert_goal(
        &self,
        title: &str,
        category: &str,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Goal> {
        Ok(goals::insert_goal(&self.pool, title, category, Some(scheduled_for)).await?)
    }

    async fn goals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Goal>> {
        Ok(goals::list_goals_between(&self.pool, start, end).await?)
    }

    async fn set_goal_completed(&self, id: Uuid, completed: bool) -> Result<Option<Goal>> {
        Ok(goals::set_goal_completed(&self.pool, id, completed).await?)
    }

    async fn delete_goal(&self, id: Uuid) -> Result<bool> {
        Ok(goals::delete_goal(&self.pool, id).await?)
    }
}
