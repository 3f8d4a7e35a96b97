use crate::domain::models::slot::TimeSlot;
use crate::domain::services::hours::format_hhmm;
use chrono::NaiveDate;

/// Tiles the open interval `[open_min, close_min)` with fixed-duration slots.
/// A trailing remainder shorter than `slot_duration` is dropped rather than
/// emitted as a partial slot.
pub fn build_slots(
    date: NaiveDate,
    open_min: u32,
    close_min: u32,
    slot_duration: u32,
    capacity: i32,
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    if slot_duration == 0 {
        return slots;
    }

    let mut cursor = open_min;
    while cursor + slot_duration <= close_min {
        slots.push(TimeSlot::new(
            date,
            format_hhmm(cursor),
            format_hhmm(cursor + slot_duration),
            capacity,
        ));
        cursor += slot_duration;
    }
    slots
}
