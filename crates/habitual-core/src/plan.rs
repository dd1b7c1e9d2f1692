//! The weekly plan: which habits are scheduled on which weekday.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use habitual_db::models::Weekday;

use crate::error::Result;
use crate::registry::HabitRegistry;
use crate::store::HabitStore;

/// Outcome of [`WeeklyPlan::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Removed,
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "added",
            Self::Removed => "removed",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanToggle {
    pub action: ToggleAction,
}

/// Weekday -> scheduled habit IDs. Always carries all seven weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlanSnapshot(BTreeMap<Weekday, Vec<Uuid>>);

impl PlanSnapshot {
    pub fn empty() -> Self {
        Self(Weekday::ALL.into_iter().map(|d| (d, Vec::new())).collect())
    }

    /// Build from entries given in insertion order.
    pub fn from_entries(entries: impl IntoIterator<Item = (Weekday, Uuid)>) -> Self {
        let mut snapshot = Self::empty();
        for (weekday, habit_id) in entries {
            snapshot.0.entry(weekday).or_default().push(habit_id);
        }
        snapshot
    }

    pub fn day(&self, weekday: Weekday) -> &[Uuid] {
        self.0.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, weekday: Weekday, habit_id: Uuid) -> bool {
        self.day(weekday).contains(&habit_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[Uuid])> {
        self.0.iter().map(|(d, ids)| (*d, ids.as_slice()))
    }
}

#[derive(Clone)]
pub struct WeeklyPlan {
    store: Arc<dyn HabitStore>,
}

impl WeeklyPlan {
    pub fn new(store: Arc<dyn HabitStore>) -> Self {
        Self { store }
    }

    pub async fn snapshot(&self) -> Result<PlanSnapshot> {
        let entries = self.store.list_plan_entries().await?;
        Ok(PlanSnapshot::from_entries(
            entries.into_iter().map(|e| (e.weekday, e.habit_id)),
        ))
    }

    /// Add `habit_id` to `weekday` if absent, remove it if present.
    ///
    /// A concurrent identical toggle can win the race between the existence
    /// check and the write. The store then reports that nothing changed, and
    /// the other caller's effect is the one we report.
    pub async fn toggle(&self, weekday: Weekday, habit_id: Uuid) -> Result<PlanToggle> {
        HabitRegistry::ensure_exists(self.store.as_ref(), habit_id).await?;

        let action = if self.store.plan_entry_exists(weekday, habit_id).await? {
            if !self.store.delete_plan_entry(weekday, habit_id).await? {
                warn!(%weekday, habit = %habit_id, "plan entry already removed concurrently");
            }
            ToggleAction::Removed
        } else {
            if !self.store.insert_plan_entry(weekday, habit_id).await? {
                warn!(%weekday, habit = %habit_id, "plan entry already added concurrently");
            }
            ToggleAction::Added
        };

        info!(%weekday, habit = %habit_id, %action, "plan entry toggled");
        Ok(PlanToggle { action })
    }

    /// Overwrite the other six weekdays with `source`'s habits. Habits
    /// scheduled only on other days are dropped.
    pub async fn replicate_from(&self, source: Weekday) -> Result<u64> {
        let created = self.store.replicate_plan(source).await?;
        info!(%source, created, "weekly plan replicated");
        Ok(created)
    }
}
