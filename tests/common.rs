use chrono::{Datelike, Duration, NaiveDate, Utc};
use scheduling_backend::{
    config::Config,
    domain::models::schedule::DayHours,
    domain::services::scheduling_service::{SchedulingService, WeeklyScheduleInput},
    infra::repositories::{
        sqlite_exception_repo::SqliteExceptionRepo, sqlite_schedule_repo::SqliteScheduleRepo,
        sqlite_slot_repo::SqliteSlotRepo,
    },
    state::AppState,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestApp {
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(StdDuration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            store_timeout: StdDuration::from_millis(5000),
        };

        let schedule_repo = Arc::new(SqliteScheduleRepo::new(pool.clone()));
        let exception_repo = Arc::new(SqliteExceptionRepo::new(pool.clone()));
        let slot_repo = Arc::new(SqliteSlotRepo::new(pool.clone()));
        let scheduling = Arc::new(SchedulingService::new(
            schedule_repo.clone(),
            exception_repo.clone(),
            slot_repo.clone(),
            config.store_timeout,
        ));

        let state = Arc::new(AppState {
            config,
            schedule_repo,
            exception_repo,
            slot_repo,
            scheduling,
        });

        Self {
            pool,
            db_filename,
            state,
        }
    }

    pub fn scheduling(&self) -> &SchedulingService {
        &self.state.scheduling
    }

    pub async fn seed_weekday(
        &self,
        day_of_week: i32,
        open: &str,
        close: &str,
        slot_duration: i32,
        orders_per_slot: i32,
    ) {
        self.state
            .scheduling
            .upsert_weekly_schedule(
                day_of_week,
                WeeklyScheduleInput {
                    is_open: true,
                    hours: Some(DayHours {
                        open: open.to_string(),
                        close: close.to_string(),
                    }),
                    slot_duration: Some(slot_duration),
                    orders_per_slot: Some(orders_per_slot),
                },
            )
            .await
            .expect("Failed to seed weekday");
    }

    pub async fn seed_closed_weekday(&self, day_of_week: i32) {
        self.state
            .scheduling
            .upsert_weekly_schedule(
                day_of_week,
                WeeklyScheduleInput {
                    is_open: false,
                    ..Default::default()
                },
            )
            .await
            .expect("Failed to seed closed weekday");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

/// Next calendar date (strictly in the future) falling on the given weekday,
/// 0 = Sunday.
#[allow(dead_code)]
pub fn next_date_for_day(day_of_week: i32) -> NaiveDate {
    let mut date = Utc::now().date_naive() + Duration::days(1);
    while date.weekday().num_days_from_sunday() as i32 != day_of_week {
        date += Duration::days(1);
    }
    date
}
