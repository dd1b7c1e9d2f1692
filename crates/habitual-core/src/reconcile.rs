//! Read-only views combining habits, the weekly plan and the execution log.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use habitual_db::models::{Habit, Weekday};

use crate::day::CalendarDay;
use crate::error::Result;
use crate::execution::ExecutionLog;
use crate::plan::{PlanSnapshot, WeeklyPlan};
use crate::registry::HabitRegistry;
use crate::store::HabitStore;

/// Everything a client needs on start-up.
#[derive(Debug, Clone, Serialize)]
pub struct InitialState {
    pub date: CalendarDay,
    pub habits: Vec<Habit>,
    pub weekly_plan: PlanSnapshot,
    pub completed_today: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaItem {
    pub habit: Habit,
    pub done: bool,
}

/// Habits scheduled on one day with their completion state.
#[derive(Debug, Clone, Serialize)]
pub struct Agenda {
    pub date: CalendarDay,
    pub weekday: Weekday,
    pub items: Vec<AgendaItem>,
}

impl Agenda {
    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|i| !i.done).count()
    }
}

#[derive(Clone)]
pub struct Reconciler {
    registry: HabitRegistry,
    plan: WeeklyPlan,
    log: ExecutionLog,
}

impl Reconciler {
    pub fn new(store: Arc<dyn HabitStore>) -> Self {
        Self {
            registry: HabitRegistry::new(store.clone()),
            plan: WeeklyPlan::new(store.clone()),
            log: ExecutionLog::new(store),
        }
    }

    /// Habits, the full weekly plan, and what was done on `date` (today when
    /// omitted). The three reads are independent; each is consistent on its
    /// own.
    pub async fn load_initial_state(&self, date: Option<CalendarDay>) -> Result<InitialState> {
        let date = date.unwrap_or_else(CalendarDay::today);
        let (habits, weekly_plan, completed_today) = tokio::try_join!(
            self.registry.list(),
            self.plan.snapshot(),
            self.log.completed_on(date),
        )?;

        debug!(%date, habits = habits.len(), done = completed_today.len(), "initial state loaded");
        Ok(InitialState {
            date,
            habits,
            weekly_plan,
            completed_today,
        })
    }

    /// What is scheduled for `date`'s weekday, in plan order, and whether
    /// each item is done.
    pub async fn agenda(&self, date: Option<CalendarDay>) -> Result<Agenda> {
        let state = self.load_initial_state(date).await?;
        Ok(agenda_from_state(state))
    }
}

fn agenda_from_state(state: InitialState) -> Agenda {
    let weekday = state.date.weekday();
    let items = state
        .weekly_plan
        .day(weekday)
        .iter()
        .filter_map(|id| state.habits.iter().find(|h| h.id == *id))
        .map(|habit| AgendaItem {
            done: state.completed_today.contains(&habit.id),
            habit: habit.clone(),
        })
        .collect();

    Agenda {
        date: state.date,
        weekday,
        items,
    }
}
