use crate::domain::models::schedule::{DayHours, ScheduleException, WeeklySchedule};
use crate::error::AppError;
use chrono::{NaiveTime, Timelike};

/// Open/closed state and hours for one calendar date after merging the weekly
/// template with any exception for that exact date. Duration and capacity are
/// never overridden by exceptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveHours {
    pub is_open: bool,
    pub hours: Option<DayHours>,
    pub slot_duration: i32,
    pub orders_per_slot: i32,
}

/// Parses an `HH:MM` string into minutes since midnight.
pub fn parse_hhmm(value: &str) -> Result<u32, AppError> {
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time '{}', expected HH:MM", value)))?;
    Ok(time.hour() * 60 + time.minute())
}

pub fn format_hhmm(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Validates an open/close pair: both parse and open is strictly before close.
pub fn validate_hours(hours: &DayHours) -> Result<(u32, u32), AppError> {
    let open = parse_hhmm(&hours.open)?;
    let close = parse_hhmm(&hours.close)?;
    if open >= close {
        return Err(AppError::Validation(format!(
            "Opening time {} must be before closing time {}",
            hours.open, hours.close
        )));
    }
    Ok((open, close))
}

/// Most specific rule wins: an exception for the exact date overrides the
/// weekly default's open state and hours; a non-closing exception without
/// custom hours keeps the weekly hours.
pub fn resolve(entry: &WeeklySchedule, exception: Option<&ScheduleException>) -> EffectiveHours {
    let (is_open, hours) = match exception {
        Some(ex) if ex.is_closed => (false, None),
        Some(ex) => (true, ex.custom_hours().or_else(|| entry.hours())),
        None => (entry.is_open, entry.hours()),
    };

    EffectiveHours {
        is_open,
        hours,
        slot_duration: entry.slot_duration,
        orders_per_slot: entry.orders_per_slot,
    }
}
