use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, PgPool, SqlitePool};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::services::scheduling_service::SchedulingService;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_exception_repo::PostgresExceptionRepo, postgres_schedule_repo::PostgresScheduleRepo,
    postgres_slot_repo::PostgresSlotRepo, sqlite_exception_repo::SqliteExceptionRepo,
    sqlite_schedule_repo::SqliteScheduleRepo, sqlite_slot_repo::SqliteSlotRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let schedule_repo = Arc::new(PostgresScheduleRepo::new(pool.clone()));
        let exception_repo = Arc::new(PostgresExceptionRepo::new(pool.clone()));
        let slot_repo = Arc::new(PostgresSlotRepo::new(pool.clone()));
        let scheduling = Arc::new(SchedulingService::new(
            schedule_repo.clone(),
            exception_repo.clone(),
            slot_repo.clone(),
            config.store_timeout,
        ));

        AppState {
            config: config.clone(),
            schedule_repo,
            exception_repo,
            slot_repo,
            scheduling,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
        let exception_repo = Arc::new(SqliteExceptionRepo::new(pool.clone()));
        let slot_repo = Arc::new(SqliteSlotRepo::new(pool.clone()));
        let scheduling = Arc::new(SchedulingService::new(
            schedule_repo.clone(),
            exception_repo.clone(),
            slot_repo.clone(),
            config.store_timeout,
        ));

        AppState {
            config: config.clone(),
            schedule_repo,
            exception_repo,
            slot_repo,
            scheduling,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
