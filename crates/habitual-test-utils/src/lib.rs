//! PostgreSQL fixtures for habitual integration tests.
//!
//! One server is shared per test binary and every test gets a fresh
//! database on it. Set `HABITUAL_TEST_PG_URL` (server root, no database
//! name) to reuse an existing server; otherwise a `postgres:17` container is
//! started through testcontainers.

use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use habitual_db::config::DbConfig;
use habitual_db::pool;

pub const TEST_PG_URL_ENV: &str = "HABITUAL_TEST_PG_URL";

struct TestServer {
    root_url: String,
    // Dropping the handle stops the container.
    _container: Option<ContainerAsync<Postgres>>,
}

static SERVER: OnceCell<TestServer> = OnceCell::const_new();

async fn start_server() -> TestServer {
    if let Ok(url) = std::env::var(TEST_PG_URL_ENV) {
        return TestServer {
            root_url: url.trim_end_matches('/').to_owned(),
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("17")
        .start()
        .await
        .expect("postgres container should start");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("mapped postgres port");

    TestServer {
        root_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server root URL of the shared test instance.
pub async fn pg_url() -> &'static str {
    &SERVER.get_or_init(start_server).await.root_url
}

async fn test_config(db_name: &str) -> DbConfig {
    let mut config = DbConfig::new(format!("{}/{db_name}", pg_url().await));
    config.acquire_timeout_secs = 30;
    config
}

/// Create a uniquely named, fully migrated database.
///
/// Returns `(pool, db_name)`; pass `db_name` to [`drop_test_db`] afterwards.
pub async fn create_test_db() -> (PgPool, String) {
    let db_name = format!("habitual_test_{}", Uuid::new_v4().simple());
    let mut config = test_config(&db_name).await;
    config.max_connections = 8;

    pool::ensure_database_exists(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to create {db_name}: {e:#}"));
    let db = pool::create_pool(&config)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {db_name}: {e:#}"));
    pool::run_migrations(&db)
        .await
        .expect("migrations should apply to a fresh database");

    (db, db_name)
}

/// Drop a database created by [`create_test_db`], kicking out stragglers.
pub async fn drop_test_db(db_name: &str) {
    let config = test_config(db_name).await;
    let Ok(admin) = PgPool::connect(&config.maintenance_url()).await else {
        return;
    };

    let _ = admin
        .execute(
            format!(
                "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
                 WHERE datname = '{db_name}' AND pid <> pg_backend_pid()"
            )
            .as_str(),
        )
        .await;
    let _ = admin
        .execute(format!("DROP DATABASE IF EXISTS {db_name}").as_str())
        .await;
    admin.close().await;
}
