use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Store operation timed out")]
    StoreTimeout,
    #[error("No weekly schedule configured for day {0}")]
    ScheduleNotConfigured(u32),
    #[error("Time slot not found: {0}")]
    SlotNotFound(String),
    #[error("Time slot {0} is at capacity")]
    SlotFull(String),
    #[error("Time slot {0} has assigned orders")]
    SlotHasOrders(String),
    #[error("Order {order_id} is already assigned to slot {slot_id}")]
    OrderAlreadyAssigned { slot_id: String, order_id: String },
    #[error("No available slot within {0} days of {1}")]
    NoAvailableSlot(u32, NaiveDate),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Transient failures a caller may retry. Guarded writes re-evaluate the
    /// capacity predicate on retry, so they are safe as well.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::StoreTimeout | AppError::Conflict(_))
    }
}
