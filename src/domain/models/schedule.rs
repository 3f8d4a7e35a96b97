use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Opening hours as `HH:MM` strings, half-open on interpretation but stored
/// verbatim as entered.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DayHours {
    pub open: String,
    pub close: String,
}

/// One row per weekday (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WeeklySchedule {
    pub id: String,
    pub day_of_week: i32,
    pub is_open: bool,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub slot_duration: i32,
    pub orders_per_slot: i32,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_SLOT_DURATION: i32 = 10;
pub const DEFAULT_ORDERS_PER_SLOT: i32 = 2;

impl WeeklySchedule {
    pub fn new(day_of_week: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            day_of_week,
            is_open: false,
            open_time: None,
            close_time: None,
            slot_duration: DEFAULT_SLOT_DURATION,
            orders_per_slot: DEFAULT_ORDERS_PER_SLOT,
            created_at: Utc::now(),
        }
    }

    pub fn hours(&self) -> Option<DayHours> {
        match (&self.open_time, &self.close_time) {
            (Some(open), Some(close)) => Some(DayHours {
                open: open.clone(),
                close: close.clone(),
            }),
            _ => None,
        }
    }
}

/// Date-specific override of the weekly template. At most one per calendar
/// date; replaced wholesale on re-add (upsert by date).
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleException {
    pub id: String,
    pub day_of_week: i32,
    pub date: NaiveDate,
    pub is_closed: bool,
    pub reason: Option<String>,
    pub custom_open: Option<String>,
    pub custom_close: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScheduleException {
    pub fn new(day_of_week: i32, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            day_of_week,
            date,
            is_closed: false,
            reason: None,
            custom_open: None,
            custom_close: None,
            created_at: Utc::now(),
        }
    }

    pub fn custom_hours(&self) -> Option<DayHours> {
        match (&self.custom_open, &self.custom_close) {
            (Some(open), Some(close)) => Some(DayHours {
                open: open.clone(),
                close: close.clone(),
            }),
            _ => None,
        }
    }
}
