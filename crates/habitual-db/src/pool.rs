use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::{debug, info};

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/habitual-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Tables owned by habitual, in dependency order.
pub const TABLES: [&str; 4] = ["habits", "weekly_plan_entries", "executions", "goals"];

fn pool_options(config: &DbConfig, max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}

/// Open the application pool. Acquiring a connection past the configured
/// timeout fails instead of waiting forever.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    let pool = pool_options(config, config.max_connections)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.database_url))?;
    debug!(max_connections = config.max_connections, "pool ready");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to apply habitual migrations")?;
    info!("schema up to date");
    Ok(())
}

/// Create the target database through the `postgres` maintenance database
/// when it does not exist yet.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let name = config
        .database_name()
        .context("database URL does not name a database")?;
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        anyhow::bail!("refusing to create database {name:?}: only [A-Za-z0-9_] allowed");
    }

    let url = config.maintenance_url();
    let admin = pool_options(config, 1)
        .connect(&url)
        .await
        .with_context(|| format!("failed to connect to maintenance database at {url}"))?;

    let found: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&admin)
            .await
            .context("failed to look up database in pg_database")?;

    if found {
        info!(db = name, "database already exists");
    } else {
        // CREATE DATABASE takes no bind parameters; the name was checked above.
        admin
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .with_context(|| format!("failed to create database {name}"))?;
        info!(db = name, "database created");
    }

    admin.close().await;
    Ok(())
}

/// Row counts for each table in [`TABLES`], for the `db-init` report.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        counts.push((table, count));
    }
    Ok(counts)
}
