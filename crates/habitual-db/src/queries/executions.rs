//! Database query functions for the `executions` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

/// Whether `habit_id` has a completion record on `day`.
pub async fn execution_exists(pool: &PgPool, day: NaiveDate, habit_id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM executions WHERE day = $1 AND habit_id = $2)",
    )
    .bind(day)
    .bind(habit_id)
    .fetch_one(pool)
    .await
    .context("failed to check execution record")?;

    Ok(exists)
}

/// Record `habit_id` as done on `day`.
///
/// Returns `false` when the record already existed.
pub async fn insert_execution(pool: &PgPool, day: NaiveDate, habit_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO executions (day, habit_id) \
         VALUES ($1, $2) \
         ON CONFLICT (day, habit_id) DO NOTHING",
    )
    .bind(day)
    .bind(habit_id)
    .execute(pool)
    .await
    .with_context(|| format!("failed to insert execution ({day}, {habit_id})"))?;

    Ok(result.rows_affected() == 1)
}

/// Remove the completion record for `habit_id` on `day`.
///
/// Returns `false` when there was nothing to delete.
pub async fn delete_execution(pool: &PgPool, day: NaiveDate, habit_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM executions WHERE day = $1 AND habit_id = $2")
        .bind(day)
        .bind(habit_id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete execution ({day}, {habit_id})"))?;

    Ok(result.rows_affected() == 1)
}

/// IDs of all habits completed on `day`, in the order they were recorded.
pub async fn habit_ids_completed_on(pool: &PgPool, day: NaiveDate) -> Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT habit_id FROM executions WHERE day = $1 ORDER BY recorded_at, id",
    )
    .bind(day)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to list executions on {day}"))?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
