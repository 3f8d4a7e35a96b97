use crate::domain::models::{
    schedule::{ScheduleException, WeeklySchedule},
    slot::TimeSlot,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait WeeklyScheduleRepository: Send + Sync {
    /// Insert or overwrite the row for `entry.day_of_week`. Exceptions for
    /// that weekday are left untouched.
    async fn upsert(&self, entry: &WeeklySchedule) -> Result<WeeklySchedule, AppError>;
    async fn find_by_day(&self, day_of_week: i32) -> Result<Option<WeeklySchedule>, AppError>;
    async fn list(&self) -> Result<Vec<WeeklySchedule>, AppError>;
    /// Removes the weekday row; its exceptions go with it (cascade).
    async fn delete(&self, day_of_week: i32) -> Result<(), AppError>;
}

#[async_trait]
pub trait ScheduleExceptionRepository: Send + Sync {
    /// Upsert keyed by calendar date: re-adding an exception for a date
    /// replaces the previous one wholesale.
    async fn upsert(&self, entity: &ScheduleException) -> Result<ScheduleException, AppError>;
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<ScheduleException>, AppError>;
    async fn list_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleException>, AppError>;
    /// Returns the number of rows removed (0 when no exception existed).
    async fn delete_by_date(&self, date: NaiveDate) -> Result<u64, AppError>;
}

#[async_trait]
pub trait TimeSlotRepository: Send + Sync {
    /// Persist a generated batch for one date in a single transaction.
    async fn insert_batch(&self, slots: &[TimeSlot]) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<TimeSlot>, AppError>;
    async fn find_by_window(
        &self,
        date: NaiveDate,
        start_time: &str,
    ) -> Result<Option<TimeSlot>, AppError>;
    async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, AppError>;
    async fn list_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        only_available: bool,
    ) -> Result<Vec<TimeSlot>, AppError>;
    async fn count_by_date(&self, date: NaiveDate) -> Result<i64, AppError>;
    /// First slot with `date >= from`, ascending `(date, start_time)`, that
    /// is ACTIVE with spare capacity.
    async fn first_available_from(&self, from: NaiveDate) -> Result<Option<TimeSlot>, AppError>;

    /// Conditional append: the write only lands if `current_orders` still
    /// equals `expected_orders` AND is below capacity. Flips ACTIVE -> FULL
    /// when the increment reaches capacity. Returns whether a row was written.
    async fn append_order_guarded(
        &self,
        id: &str,
        expected_orders: i32,
        new_orders_json: &str,
    ) -> Result<bool, AppError>;

    /// Conditional removal counterpart: lands only if `current_orders` still
    /// equals `expected_orders`. Reverts FULL -> ACTIVE once below capacity.
    async fn remove_order_guarded(
        &self,
        id: &str,
        expected_orders: i32,
        new_orders_json: &str,
    ) -> Result<bool, AppError>;

    async fn set_status(&self, id: &str, status: &str) -> Result<bool, AppError>;
    /// Forcing a slot back into rotation; refuses (returns false) when the
    /// slot is at capacity.
    async fn activate_if_not_full(&self, id: &str) -> Result<bool, AppError>;
    /// Delete guarded by `current_orders = 0` so a concurrent assignment
    /// cannot race the emptiness check. Returns whether a row was removed.
    async fn delete_if_empty(&self, id: &str) -> Result<bool, AppError>;
}
