use crate::domain::{models::schedule::ScheduleException, ports::ScheduleExceptionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub struct PostgresExceptionRepo {
    pool: PgPool,
}

impl PostgresExceptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleExceptionRepository for PostgresExceptionRepo {
    async fn upsert(&self, entity: &ScheduleException) -> Result<ScheduleException, AppError> {
        sqlx::query_as::<_, ScheduleException>(
            r#"INSERT INTO schedule_exceptions (id, day_of_week, date, is_closed, reason, custom_open, custom_close, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               ON CONFLICT(date) DO UPDATE SET
               is_closed=excluded.is_closed,
               reason=excluded.reason,
               custom_open=excluded.custom_open,
               custom_close=excluded.custom_close
               RETURNING *"#,
        )
        .bind(&entity.id)
        .bind(entity.day_of_week)
        .bind(entity.date)
        .bind(entity.is_closed)
        .bind(&entity.reason)
        .bind(&entity.custom_open)
        .bind(&entity.custom_close)
        .bind(entity.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<ScheduleException>, AppError> {
        sqlx::query_as::<_, ScheduleException>("SELECT * FROM schedule_exceptions WHERE date = $1")
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleException>, AppError> {
        sqlx::query_as::<_, ScheduleException>(
            "SELECT * FROM schedule_exceptions WHERE date >= $1 AND date <= $2 ORDER BY date ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn delete_by_date(&self, date: NaiveDate) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM schedule_exceptions WHERE date = $1")
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(res.rows_affected())
    }
}
