use crate::domain::{models::slot::TimeSlot, ports::TimeSlotRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

pub struct PostgresSlotRepo {
    pool: PgPool,
}

impl PostgresSlotRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimeSlotRepository for PostgresSlotRepo {
    async fn insert_batch(&self, slots: &[TimeSlot]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        for slot in slots {
            sqlx::query(
                "INSERT INTO time_slots (id, date, start_time, end_time, capacity, current_orders, orders_json, status, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(&slot.id)
            .bind(slot.date)
            .bind(&slot.start_time)
            .bind(&slot.end_time)
            .bind(slot.capacity)
            .bind(slot.current_orders)
            .bind(&slot.orders_json)
            .bind(&slot.status)
            .bind(slot.created_at)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>("SELECT * FROM time_slots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_window(
        &self,
        date: NaiveDate,
        start_time: &str,
    ) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>(
            "SELECT * FROM time_slots WHERE date = $1 AND start_time = $2",
        )
        .bind(date)
        .bind(start_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>(
            "SELECT * FROM time_slots WHERE date = $1 ORDER BY start_time ASC",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        only_available: bool,
    ) -> Result<Vec<TimeSlot>, AppError> {
        let sql = if only_available {
            "SELECT * FROM time_slots WHERE date >= $1 AND date <= $2 AND status = 'ACTIVE' AND current_orders < capacity ORDER BY date ASC, start_time ASC"
        } else {
            "SELECT * FROM time_slots WHERE date >= $1 AND date <= $2 ORDER BY date ASC, start_time ASC"
        };
        sqlx::query_as::<_, TimeSlot>(sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_by_date(&self, date: NaiveDate) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM time_slots WHERE date = $1")
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(row.get::<i64, _>("count"))
    }

    async fn first_available_from(&self, from: NaiveDate) -> Result<Option<TimeSlot>, AppError> {
        sqlx::query_as::<_, TimeSlot>(
            "SELECT * FROM time_slots
             WHERE date >= $1 AND status = 'ACTIVE' AND current_orders < capacity
             ORDER BY date ASC, start_time ASC
             LIMIT 1",
        )
        .bind(from)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn append_order_guarded(
        &self,
        id: &str,
        expected_orders: i32,
        new_orders_json: &str,
    ) -> Result<bool, AppError> {
        // The occupancy equality is the optimistic version check; the
        // capacity comparison keeps over-fill impossible even under races.
        let res = sqlx::query(
            "UPDATE time_slots
             SET orders_json = $1,
                 current_orders = current_orders + 1,
                 status = CASE WHEN current_orders + 1 >= capacity AND status = 'ACTIVE' THEN 'FULL' ELSE status END
             WHERE id = $2 AND current_orders = $3 AND current_orders < capacity",
        )
        .bind(new_orders_json)
        .bind(id)
        .bind(expected_orders)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }

    async fn remove_order_guarded(
        &self,
        id: &str,
        expected_orders: i32,
        new_orders_json: &str,
    ) -> Result<bool, AppError> {
        let res = sqlx::query(
            "UPDATE time_slots
             SET orders_json = $1,
                 current_orders = current_orders - 1,
                 status = CASE WHEN status = 'FULL' THEN 'ACTIVE' ELSE status END
             WHERE id = $2 AND current_orders = $3 AND current_orders > 0",
        )
        .bind(new_orders_json)
        .bind(id)
        .bind(expected_orders)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<bool, AppError> {
        let res = sqlx::query("UPDATE time_slots SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }

    async fn activate_if_not_full(&self, id: &str) -> Result<bool, AppError> {
        let res = sqlx::query(
            "UPDATE time_slots SET status = 'ACTIVE' WHERE id = $1 AND current_orders < capacity",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_if_empty(&self, id: &str) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM time_slots WHERE id = $1 AND current_orders = 0")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }
}
