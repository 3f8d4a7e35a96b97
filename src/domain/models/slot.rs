use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_FULL: &str = "FULL";
pub const STATUS_CLOSED: &str = "CLOSED";

pub const SLOT_STATUSES: [&str; 3] = [STATUS_ACTIVE, STATUS_FULL, STATUS_CLOSED];

/// A bookable window on a single date. Assigned order ids live in
/// `orders_json` (JSON array); `current_orders` mirrors its length and is the
/// column guarded by conditional updates.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TimeSlot {
    pub id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i32,
    pub current_orders: i32,
    pub orders_json: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, start_time: String, end_time: String, capacity: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            start_time,
            end_time,
            capacity,
            current_orders: 0,
            orders_json: "[]".to_string(),
            status: STATUS_ACTIVE.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn orders(&self) -> Vec<String> {
        serde_json::from_str(&self.orders_json).unwrap_or_default()
    }

    pub fn is_available(&self) -> bool {
        self.status == STATUS_ACTIVE && self.current_orders < self.capacity
    }
}
