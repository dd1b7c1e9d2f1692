use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use habitual_db::models::{ExecutionRecord, Goal, Habit, Weekday, WeeklyPlanEntry};
use habitual_db::queries::habits::HabitDeletion;

use super::{GoalStore, HabitStore};
use crate::day::CalendarDay;
use crate::error::{Result, TrackerError};

#[derive(Debug, Default)]
struct Tables {
    habits: Vec<Habit>,
    plan: Vec<WeeklyPlanEntry>,
    executions: Vec<ExecutionRecord>,
    goals: Vec<Goal>,
    next_row_id: i64,
}

impl Tables {
    fn row_id(&mut self) -> i64 {
        self.next_row_id += 1;
        self.next_row_id
    }

    fn has_habit(&self, id: Uuid) -> bool {
        self.habits.iter().any(|h| h.id == id)
    }
}

/// In-process store. Each method takes the lock exactly once, so every
/// operation is atomic with respect to the others.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw plan rows, for invariant checks in tests.
    pub async fn plan_rows(&self) -> Vec<WeeklyPlanEntry> {
        self.tables.read().await.plan.clone()
    }

    /// Raw execution rows, for invariant checks in tests.
    pub async fn execution_rows(&self) -> Vec<ExecutionRecord> {
        self.tables.read().await.executions.clone()
    }
}

#[async_trait]
impl HabitStore for MemoryStore {
    async fn insert_habit(&self, name: &str, category: &str) -> Result<Habit> {
        let habit = Habit {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            category: category.to_owned(),
            created_at: Utc::now(),
        };
        self.tables.write().await.habits.push(habit.clone());
        Ok(habit)
    }

    async fn habit_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.read().await.has_habit(id))
    }

    async fn list_habits(&self) -> Result<Vec<Habit>> {
        let mut habits = self.tables.read().await.habits.clone();
        // Stable: ties keep insertion order.
        habits.sort_by_key(|h| h.created_at);
        Ok(habits)
    }

    async fn delete_habit_cascade(&self, id: Uuid) -> Result<Option<HabitDeletion>> {
        let mut tables = self.tables.write().await;
        if !tables.has_habit(id) {
            return Ok(None);
        }

        let plan_before = tables.plan.len();
        tables.plan.retain(|e| e.habit_id != id);
        let exec_before = tables.executions.len();
        tables.executions.retain(|r| r.habit_id != id);
        tables.habits.retain(|h| h.id != id);

        Ok(Some(HabitDeletion {
            plan_entries: (plan_before - tables.plan.len()) as u64,
            executions: (exec_before - tables.executions.len()) as u64,
        }))
    }

    async fn plan_entry_exists(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .plan
            .iter()
            .any(|e| e.weekday == weekday && e.habit_id == habit_id))
    }

    async fn insert_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.has_habit(habit_id) {
            return Err(TrackerError::unknown_habit(habit_id));
        }
        if tables
            .plan
            .iter()
            .any(|e| e.weekday == weekday && e.habit_id == habit_id)
        {
            return Ok(false);
        }
        let id = tables.row_id();
        tables.plan.push(WeeklyPlanEntry {
            id,
            weekday,
            habit_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn delete_plan_entry(&self, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.plan.len();
        tables
            .plan
            .retain(|e| !(e.weekday == weekday && e.habit_id == habit_id));
        Ok(tables.plan.len() < before)
    }

    async fn list_plan_entries(&self) -> Result<Vec<WeeklyPlanEntry>> {
        Ok(self.tables.read().await.plan.clone())
    }

    async fn replicate_plan(&self, source: Weekday) -> Result<u64> {
        let mut tables = self.tables.write().await;
        tables.plan.retain(|e| e.weekday == source);

        let template: Vec<Uuid> = tables.plan.iter().map(|e| e.habit_id).collect();
        let mut created = 0;
        for weekday in Weekday::ALL.into_iter().filter(|d| *d != source) {
            for habit_id in &template {
                let id = tables.row_id();
                tables.plan.push(WeeklyPlanEntry {
                    id,
                    weekday,
                    habit_id: *habit_id,
                    created_at: Utc::now(),
                });
                created += 1;
            }
        }
        Ok(created)
    }

    async fn execution_exists(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .executions
            .iter()
            .any(|r| r.day == day.date() && r.habit_id == habit_id))
    }

    async fn insert_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.has_habit(habit_id) {
            return Err(TrackerError::unknown_habit(habit_id));
        }
        if tables
            .executions
            .iter()
            .any(|r| r.day == day.date() && r.habit_id == habit_id)
        {
            return Ok(false);
        }
        let id = tables.row_id();
        tables.executions.push(ExecutionRecord {
            id,
            day: day.date(),
            habit_id,
            recorded_at: Utc::now(),
        });
        Ok(true)
    }

    async fn delete_execution(&self, day: CalendarDay, habit_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.executions.len();
        tables
            .executions
            .retain(|r| !(r.day == day.date() && r.habit_id == habit_id));
        Ok(tables.executions.len() < before)
    }

    async fn completed_on(&self, day: CalendarDay) -> Result<Vec<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .executions
            .iter()
            .filter(|r| r.day == day.date())
            .map(|r| r.habit_id)
            .collect())
    }
}

#[async_trait]
impl GoalStore for MemoryStore {
    async fn insert_goal(
        &self,
        title: &str,
        category: &str,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Goal> {
        let goal = Goal {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            category: category.to_owned(),
            scheduled_for,
            completed: false,
            created_at: Utc::now(),
        };
        self.tables.write().await.goals.push(goal.clone());
        Ok(goal)
    }

    async fn goals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Goal>> {
        let mut goals: Vec<Goal> = self
            .tables
            .read()
            .await
            .goals
            .iter()
            .filter(|g| g.scheduled_for >= start && g.scheduled_for < end)
            .cloned()
            .collect();
        goals.sort_by_key(|g| (g.scheduled_for, g.created_at));
        Ok(goals)
    }

    async fn set_goal_completed(&self, id: Uuid, completed: bool) -> Result<Option<Goal>> {
        let mut tables = self.tables.write().await;
        Ok(tables.goals.iter_mut().find(|g| g.id == id).map(|g| {
            g.completed = completed;
            g.clone()
        }))
    }

    async fn delete_goal(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.goals.len();
        tables.goals.retain(|g| g.id != id);
        Ok(tables.goals.len() < before)
    }
}
