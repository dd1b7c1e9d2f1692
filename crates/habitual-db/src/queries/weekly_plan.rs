//! Database query functions for the `weekly_plan_entries` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{Weekday, WeeklyPlanEntry};

/// Whether `habit_id` is scheduled on `weekday`.
pub async fn plan_entry_exists(pool: &PgPool, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS( \
             SELECT 1 FROM weekly_plan_entries WHERE weekday = $1 AND habit_id = $2 \
         )",
    )
    .bind(weekday)
    .bind(habit_id)
    .fetch_one(pool)
    .await
    .context("failed to check weekly plan entry")?;

    Ok(exists)
}

/// Schedule `habit_id` on `weekday`.
///
/// Returns `false` when the entry already existed (ON CONFLICT DO NOTHING).
pub async fn insert_plan_entry(pool: &PgPool, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO weekly_plan_entries (weekday, habit_id) \
         VALUES ($1, $2) \
         ON CONFLICT (weekday, habit_id) DO NOTHING",
    )
    .bind(weekday)
    .bind(habit_id)
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert weekly plan entry ({weekday}, {habit_id})"))?;

    Ok(result.rows_affected() == 1)
}

/// Unschedule `habit_id` from `weekday`.
///
/// Returns `false` when there was nothing to delete.
pub async fn delete_plan_entry(pool: &PgPool, weekday: Weekday, habit_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM weekly_plan_entries WHERE weekday = $1 AND habit_id = $2")
        .bind(weekday)
        .bind(habit_id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete weekly plan entry ({weekday}, {habit_id})"))?;

    Ok(result.rows_affected() == 1)
}

/// List every plan entry in insertion order.
pub async fn list_plan_entries(pool: &PgPool) -> Result<Vec<WeeklyPlanEntry>> {
    let entries = sqlx::query_as::<_, WeeklyPlanEntry>(
        "SELECT * FROM weekly_plan_entries ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await
    .context("failed to list weekly plan entries")?;

    Ok(entries)
}

/// Overwrite every weekday except `source` with a copy of `source`'s entries.
///
/// Runs in one transaction holding a SHARE ROW EXCLUSIVE lock on the table,
/// so concurrent replications and toggles serialize behind it and readers
/// see either the old plan or the new one. Returns the number of rows
/// created.
pub async fn replicate_plan(pool: &PgPool, source: Weekday) -> Result<u64> {
    let targets: Vec<String> = Weekday::ALL
        .iter()
        .filter(|d| **d != source)
        .map(|d| d.code().to_owned())
        .collect();

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    sqlx::query("LOCK TABLE weekly_plan_entries IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await
        .context("failed to lock weekly_plan_entries")?;

    let cleared = sqlx::query("DELETE FROM weekly_plan_entries WHERE weekday <> $1")
        .bind(source)
        .execute(&mut *tx)
        .await
        .context("failed to clear target weekdays")?
        .rows_affected();

    let created = sqlx::query(
        "INSERT INTO weekly_plan_entries (weekday, habit_id) \
         SELECT t.weekday, e.habit_id \
         FROM unnest($2::text[]) WITH ORDINALITY AS t(weekday, ord) \
         CROSS JOIN weekly_plan_entries e \
         WHERE e.weekday = $1 \
         ORDER BY t.ord, e.created_at, e.id \
         ON CONFLICT (weekday, habit_id) DO NOTHING",
    )
    .bind(source)
    .bind(&targets)
    .execute(&mut *tx)
    .await
    .context("failed to copy source weekday entries")?
    .rows_affected();

    tx.commit().await.context("failed to commit transaction")?;

    info!(source = %source, cleared, created, "weekly plan replicated");
    Ok(created)
}
