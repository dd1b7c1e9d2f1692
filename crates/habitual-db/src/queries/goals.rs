//! Database query functions for the `goals` table.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Goal;

/// Insert a new goal. A `None` schedule defaults to the current time.
pub async fn insert_goal(
    pool: &PgPool,
    title: &str,
    category: &str,
    scheduled_for: Option<DateTime<Utc>>,
) -> Result<Goal> {
    let goal = sqlx::query_as::<_, Goal>(
        "INSERT INTO goals (title, category, scheduled_for) \
         VALUES ($1, $2, COALESCE($3, now())) \
         RETURNING *",
    )
    .bind(title)
    .bind(category)
    .bind(scheduled_for)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert goal {title:?}"))?;

    Ok(goal)
}

/// List goals scheduled in the half-open range `[start, end)`.
pub async fn list_goals_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals \
         WHERE scheduled_for >= $1 AND scheduled_for < $2 \
         ORDER BY scheduled_for, created_at, id",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
    .context("failed to list goals")?;

    Ok(goals)
}

/// Set the completed flag. Returns `None` when the goal does not exist.
pub async fn set_goal_completed(pool: &PgPool, id: Uuid, completed: bool) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(
        "UPDATE goals SET completed = $1 WHERE id = $2 RETURNING *",
    )
    .bind(completed)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update goal {id}"))?;

    Ok(goal)
}

/// Delete a goal. Returns `false` when it did not exist.
pub async fn delete_goal(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM goals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("failed to delete goal {id}"))?;

    Ok(result.rows_affected() == 1)
}
