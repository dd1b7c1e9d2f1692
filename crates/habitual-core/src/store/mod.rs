//! Storage seam for the services.
//!
//! Services hold an `Arc<dyn HabitStore>` / `Arc<dyn GoalStore>` handed in at
//! construction. [`PgStore`] is the production backend; [`MemoryStore`]
//! serves tests and ephemeral servers.
//!
//! Every method is atomic on its own. Multi-row writes
//! ([`HabitStore::delete_habit_cascade`], [`HabitStore::replicate_plan`])
//! are all-or-nothing. Conditional inserts and deletes report whether they
//! changed anything instead of failing on a duplicate key, which is what
//! lets the toggles resolve concurrent callers.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use habitual_db::models::{Goal, Habit, Weekday, WeeklyPlanEntry};
use habitual_db::queries::habits::HabitDeletion;

use crate::day::CalendarDay;
use crate::error::Result;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Habits, their weekly plan, and their execution log.
#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn insert_habit(&self, name: &str, category: &str) -> Result<Habit>;

    async fn habit_exists(&self, id: Uuid) -> Result<bool>;

    /// All habits, oldest first.
    async fn list_habits(&self) -> Result<Vec<Habit>>;

    /// Remove a habit with its plan entries and execution records.
    /// `None` when the habit does not exist.
    async fn delete_habit_cascade(&self, id: Uuid) -> Result<Option<HabitDeletion>>;

    async fn plan_entry_exists(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool>;

    /// `false` when the entry already existed. Unknown habits are a
    /// validation error.
    async fn insert_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool>;

    /// `false` when there was no entry.
    async fn delete_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool>;

    /// Every plan entry, in insertion order.
    async fn list_plan_entries(&self) -> Result<Vec<WeeklyPlanEntry>>;

    /// Replace every other weekday with a copy of `source`. Returns the
    /// number of entries created.
    async fn replicate_plan(&self, source: Weekday) -> Result<u64>;

    async fn execution_exists(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool>;

    /// `false` when the record already existed. Unknown habits are a
    /// validation error.
    async fn insert_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool>;

    /// `false` when there was no record.
    async fn delete_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool>;

    /// IDs of habits with a record on `day`.
    async fn completed_on(&self, day: CalendarDay) -> Result<Vec<Uuid>>;
}

/// One-off goals. Shares nothing with [`HabitStore`].
#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn insert_goal(
        &self,
        title: &str,
        category: &str,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Goal>;

    /// Goals scheduled in `[start, end)`, earliest first.
    async fn goals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Goal>>;

    /// `None` when the goal does not exist.
    async fn set_goal_completed(&self, id: Uuid, completed: bool) -> Result<Option<Goal>>;

    /// `false` when the goal did not exist.
    async fn delete_goal(&self, id: Uuid) -> Result<bool>;
}
