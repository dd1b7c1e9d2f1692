//! One-off goals scoped by calendar day.
//!
//! Lives beside the habit services but shares no state or invariants with
//! them.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use habitual_db::models::Goal;

use crate::day::CalendarDay;
use crate::error::{Result, TrackerError};
use crate::registry::normalize_category;
use crate::store::GoalStore;

#[derive(Clone)]
pub struct GoalList {
    store: Arc<dyn GoalStore>,
}

impl GoalList {
    pub fn new(store: Arc<dyn GoalStore>) -> Self {
        Self { store }
    }

    /// Goals scheduled on `date` (today when omitted).
    pub async fn list_by_day(&self, date: Option<CalendarDay>) -> Result<Vec<Goal>> {
        let day = date.unwrap_or_else(CalendarDay::today);
        self.store.goals_between(day.start_utc(), day.end_utc()).await
    }

    /// Create a goal on `date`, or at the current instant when omitted.
    pub async fn create(
        &self,
        title: &str,
        category: &str,
        date: Option<CalendarDay>,
    ) -> Result<Goal> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TrackerError::validation("goal title must not be empty"));
        }
        let scheduled_for = date.map_or_else(Utc::now, CalendarDay::start_utc);

        let goal = self
            .store
            .insert_goal(title, normalize_category(category), scheduled_for)
            .await?;
        info!(goal = %goal.id, title = %goal.title, "goal created");
        Ok(goal)
    }

    /// Set the completed flag to the caller's value.
    pub async fn set_completed(&self, id: Uuid, completed: bool) -> Result<Goal> {
        let goal = self
            .store
            .set_goal_completed(id, completed)
            .await?
            .ok_or_else(|| TrackerError::goal_not_found(id))?;
        info!(goal = %id, completed, "goal updated");
        Ok(goal)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_goal(id).await? {
            return Err(TrackerError::goal_not_found(id));
        }
        info!(goal = %id, "goal deleted");
        Ok(())
    }
}
