//! Database query functions for the `habits` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::Habit;

/// Rows removed alongside a habit by [`delete_habit_cascade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HabitDeletion {
    pub plan_entries: u64,
    pub executions: u64,
}

/// Insert a new habit. Returns the row with server-generated defaults
/// (id, created_at).
pub async fn insert_habit(pool: &PgPool, name: &str, category: &str) -> Result<Habit> {
    let habit = sqlx::query_as::<_, Habit>(
        "INSERT INTO habits (name, category) \
         VALUES ($1, $2) \
         RETURNING *",
    )
    .bind(name)
    .bind(category)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert habit {name:?}"))?;

    Ok(habit)
}

/// Fetch a habit by its ID.
pub async fn get_habit(pool: &PgPool, id: Uuid) -> Result<Option<Habit>> {
    let habit = sqlx::query_as::<_, Habit>("SELECT * FROM habits WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch habit")?;

    Ok(habit)
}

/// Whether a habit with this ID exists.
pub async fn habit_exists(pool: &PgPool, id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM habits WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
        .context("failed to check habit existence")?;

    Ok(exists)
}

/// List all habits, oldest first.
pub async fn list_habits(pool: &PgPool) -> Result<Vec<Habit>> {
    let habits = sqlx::query_as::<_, Habit>("SELECT * FROM habits ORDER BY created_at ASC, id")
        .fetch_all(pool)
        .await
        .context("failed to list habits")?;

    Ok(habits)
}

/// Delete a habit together with its weekly plan entries and execution
/// records, in one transaction.
///
/// Returns `None` (and writes nothing) when the habit does not exist.
pub async fn delete_habit_cascade(pool: &PgPool, id: Uuid) -> Result<Option<HabitDeletion>> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    // Table lock before row lock, the same order replicate_plan takes them.
    sqlx::query("LOCK TABLE weekly_plan_entries IN ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await
        .context("failed to lock weekly_plan_entries")?;

    // Lock the habit row so concurrent plan/execution inserts wait on the FK.
    let locked: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM habits WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("failed to lock habit")?;

    if locked.is_none() {
        // Transaction rolls back on drop.
        return Ok(None);
    }

    let plan_entries = sqlx::query("DELETE FROM weekly_plan_entries WHERE habit_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete weekly plan entries for habit")?
        .rows_affected();

    let executions = sqlx::query("DELETE FROM executions WHERE habit_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete executions for habit")?
        .rows_affected();

    sqlx::query("DELETE FROM habits WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("failed to delete habit")?;

    tx.commit().await.context("failed to commit transaction")?;

    info!(habit = %id, plan_entries, executions, "habit deleted");
    Ok(Some(HabitDeletion {
        plan_entries,
        executions,
    }))
}
