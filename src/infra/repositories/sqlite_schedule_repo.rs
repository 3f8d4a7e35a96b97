use crate::domain::{models::schedule::WeeklySchedule, ports::WeeklyScheduleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WeeklyScheduleRepository for SqliteScheduleRepo {
    async fn upsert(&self, entry: &WeeklySchedule) -> Result<WeeklySchedule, AppError> {
        sqlx::query_as::<_, WeeklySchedule>(
            r#"INSERT INTO weekly_schedules (id, day_of_week, is_open, open_time, close_time, slot_duration, orders_per_slot, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(day_of_week) DO UPDATE SET
               is_open=excluded.is_open,
               open_time=excluded.open_time,
               close_time=excluded.close_time,
               slot_duration=excluded.slot_duration,
               orders_per_slot=excluded.orders_per_slot
               RETURNING *"#,
        )
        .bind(&entry.id)
        .bind(entry.day_of_week)
        .bind(entry.is_open)
        .bind(&entry.open_time)
        .bind(&entry.close_time)
        .bind(entry.slot_duration)
        .bind(entry.orders_per_slot)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_day(&self, day_of_week: i32) -> Result<Option<WeeklySchedule>, AppError> {
        sqlx::query_as::<_, WeeklySchedule>("SELECT * FROM weekly_schedules WHERE day_of_week = ?")
            .bind(day_of_week)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<WeeklySchedule>, AppError> {
        sqlx::query_as::<_, WeeklySchedule>(
            "SELECT * FROM weekly_schedules ORDER BY day_of_week ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn delete(&self, day_of_week: i32) -> Result<(), AppError> {
        let res = sqlx::query("DELETE FROM weekly_schedules WHERE day_of_week = ?")
            .bind(day_of_week)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::ScheduleNotConfigured(day_of_week as u32));
        }
        Ok(())
    }
}
