use crate::domain::models::schedule::{
    DEFAULT_ORDERS_PER_SLOT, DEFAULT_SLOT_DURATION, DayHours, ScheduleException, WeeklySchedule,
};
use crate::domain::models::slot::{SLOT_STATUSES, STATUS_ACTIVE, TimeSlot};
use crate::domain::ports::{
    ScheduleExceptionRepository, TimeSlotRepository, WeeklyScheduleRepository,
};
use crate::domain::services::hours::{self, EffectiveHours, parse_hhmm, validate_hours};
use crate::domain::services::slots::build_slots;
use crate::error::AppError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_REASON_LEN: usize = 200;

/// Attempts per optimistic write before giving up with a conflict.
const MAX_WRITE_ATTEMPTS: usize = 5;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WeeklyScheduleInput {
    pub is_open: bool,
    pub hours: Option<DayHours>,
    pub slot_duration: Option<i32>,
    pub orders_per_slot: Option<i32>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExceptionInput {
    pub is_closed: bool,
    pub reason: Option<String>,
    pub custom_hours: Option<DayHours>,
}

#[derive(Debug, Serialize, Clone)]
pub struct BulkGenerationDetail {
    pub date: NaiveDate,
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct BulkGenerationReport {
    pub success: u32,
    pub failed: u32,
    pub details: Vec<BulkGenerationDetail>,
}

pub struct SchedulingService {
    schedule_repo: Arc<dyn WeeklyScheduleRepository>,
    exception_repo: Arc<dyn ScheduleExceptionRepository>,
    slot_repo: Arc<dyn TimeSlotRepository>,
    store_timeout: std::time::Duration,
}

impl SchedulingService {
    pub fn new(
        schedule_repo: Arc<dyn WeeklyScheduleRepository>,
        exception_repo: Arc<dyn ScheduleExceptionRepository>,
        slot_repo: Arc<dyn TimeSlotRepository>,
        store_timeout: std::time::Duration,
    ) -> Self {
        Self {
            schedule_repo,
            exception_repo,
            slot_repo,
            store_timeout,
        }
    }

    /// Store calls are the only suspension points; each one is bounded.
    async fn store<T>(
        &self,
        fut: impl Future<Output = Result<T, AppError>> + Send,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(AppError::StoreTimeout),
        }
    }

    // ------------------------------------------------------------------
    // Weekly schedule table
    // ------------------------------------------------------------------

    pub async fn get_weekly_schedule(
        &self,
        day_of_week: i32,
    ) -> Result<Option<WeeklySchedule>, AppError> {
        validate_day_of_week(day_of_week)?;
        self.store(self.schedule_repo.find_by_day(day_of_week)).await
    }

    pub async fn list_weekly_schedules(&self) -> Result<Vec<WeeklySchedule>, AppError> {
        self.store(self.schedule_repo.list()).await
    }

    pub async fn upsert_weekly_schedule(
        &self,
        day_of_week: i32,
        input: WeeklyScheduleInput,
    ) -> Result<WeeklySchedule, AppError> {
        validate_day_of_week(day_of_week)?;

        let slot_duration = input.slot_duration.unwrap_or(DEFAULT_SLOT_DURATION);
        if !(5..=60).contains(&slot_duration) {
            return Err(AppError::Validation(format!(
                "slot_duration must be between 5 and 60 minutes, got {}",
                slot_duration
            )));
        }
        let orders_per_slot = input.orders_per_slot.unwrap_or(DEFAULT_ORDERS_PER_SLOT);
        if !(1..=10).contains(&orders_per_slot) {
            return Err(AppError::Validation(format!(
                "orders_per_slot must be between 1 and 10, got {}",
                orders_per_slot
            )));
        }

        let hours = match (input.is_open, input.hours) {
            (true, Some(h)) => {
                validate_hours(&h)?;
                Some(h)
            }
            (true, None) => {
                return Err(AppError::Validation(
                    "An open day requires opening hours".to_string(),
                ));
            }
            (false, Some(_)) => {
                return Err(AppError::Validation(
                    "A closed day must not carry opening hours".to_string(),
                ));
            }
            (false, None) => None,
        };

        // Create-or-overwrite; existing exceptions for the weekday are untouched.
        let mut entry = self
            .store(self.schedule_repo.find_by_day(day_of_week))
            .await?
            .unwrap_or_else(|| WeeklySchedule::new(day_of_week));
        entry.is_open = input.is_open;
        entry.open_time = hours.as_ref().map(|h| h.open.clone());
        entry.close_time = hours.as_ref().map(|h| h.close.clone());
        entry.slot_duration = slot_duration;
        entry.orders_per_slot = orders_per_slot;

        let saved = self.store(self.schedule_repo.upsert(&entry)).await?;
        info!("Upserted weekly schedule for day {}", day_of_week);
        Ok(saved)
    }

    /// Removes a weekday row together with all of its exceptions.
    pub async fn delete_weekly_schedule(&self, day_of_week: i32) -> Result<(), AppError> {
        validate_day_of_week(day_of_week)?;
        self.store(self.schedule_repo.delete(day_of_week)).await?;
        info!("Deleted weekly schedule for day {}", day_of_week);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Exceptions & effective hours
    // ------------------------------------------------------------------

    pub async fn add_exception(
        &self,
        date: NaiveDate,
        input: ExceptionInput,
    ) -> Result<ScheduleException, AppError> {
        let day_of_week = day_of_week_of(date);
        self.store(self.schedule_repo.find_by_day(day_of_week))
            .await?
            .ok_or(AppError::ScheduleNotConfigured(day_of_week as u32))?;

        if let Some(reason) = &input.reason
            && reason.chars().count() > MAX_REASON_LEN
        {
            return Err(AppError::Validation(format!(
                "Exception reason exceeds {} characters",
                MAX_REASON_LEN
            )));
        }

        let custom_hours = match (input.is_closed, input.custom_hours) {
            (true, Some(_)) => {
                return Err(AppError::Validation(
                    "A closing exception must not carry custom hours".to_string(),
                ));
            }
            (false, Some(h)) => {
                validate_hours(&h)?;
                Some(h)
            }
            (_, None) => None,
        };

        let mut entity = ScheduleException::new(day_of_week, date);
        entity.is_closed = input.is_closed;
        entity.reason = input.reason;
        entity.custom_open = custom_hours.as_ref().map(|h| h.open.clone());
        entity.custom_close = custom_hours.as_ref().map(|h| h.close.clone());

        let saved = self.store(self.exception_repo.upsert(&entity)).await?;
        info!("Upserted schedule exception for {}", date);
        Ok(saved)
    }

    /// No-op success when no exception exists for the date.
    pub async fn remove_exception(&self, date: NaiveDate) -> Result<(), AppError> {
        let removed = self.store(self.exception_repo.delete_by_date(date)).await?;
        if removed == 0 {
            debug!("No schedule exception to remove for {}", date);
        } else {
            info!("Removed schedule exception for {}", date);
        }
        Ok(())
    }

    pub async fn list_exceptions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ScheduleException>, AppError> {
        validate_range(start, end)?;
        self.store(self.exception_repo.list_by_range(start, end)).await
    }

    pub async fn resolve_effective_hours(
        &self,
        date: NaiveDate,
    ) -> Result<EffectiveHours, AppError> {
        let day_of_week = day_of_week_of(date);
        let entry = self
            .store(self.schedule_repo.find_by_day(day_of_week))
            .await?
            .ok_or(AppError::ScheduleNotConfigured(day_of_week as u32))?;
        let exception = self.store(self.exception_repo.find_by_date(date)).await?;
        Ok(hours::resolve(&entry, exception.as_ref()))
    }

    // ------------------------------------------------------------------
    // Slot generation
    // ------------------------------------------------------------------

    /// Idempotent per date: when slots already exist they are returned as-is,
    /// never regenerated or duplicated. A closed date yields an empty list.
    pub async fn generate_slots_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, AppError> {
        let effective = self.resolve_effective_hours(date).await?;
        if !effective.is_open {
            debug!("{} is closed, no slots generated", date);
            return Ok(Vec::new());
        }
        let hours = effective
            .hours
            .ok_or_else(|| AppError::Internal(format!("Open day {} without hours", date)))?;
        let (open_min, close_min) = validate_hours(&hours)?;

        if self.store(self.slot_repo.count_by_date(date)).await? > 0 {
            debug!("Slots for {} already exist, skipping generation", date);
            return self.store(self.slot_repo.list_by_date(date)).await;
        }

        let slots = build_slots(
            date,
            open_min,
            close_min,
            effective.slot_duration as u32,
            effective.orders_per_slot,
        );
        self.store(self.slot_repo.insert_batch(&slots)).await?;
        info!(
            "Generated {} slots for {} ({} - {})",
            slots.len(),
            date,
            hours.open,
            hours.close
        );
        Ok(slots)
    }

    /// Generates each date independently; one date failing (missing weekday
    /// configuration, store error) is recorded in the report and never aborts
    /// the remaining dates.
    pub async fn bulk_generate_time_slots(
        &self,
        start_date: NaiveDate,
        number_of_days: u32,
    ) -> Result<BulkGenerationReport, AppError> {
        let mut report = BulkGenerationReport::default();

        for offset in 0..number_of_days {
            let date = start_date + Duration::days(offset as i64);
            match self.generate_one(date).await {
                Ok(status) => {
                    report.success += 1;
                    report.details.push(BulkGenerationDetail {
                        date,
                        status: status.to_string(),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("Slot generation for {} failed: {}", date, e);
                    report.failed += 1;
                    report.details.push(BulkGenerationDetail {
                        date,
                        status: "FAILED".to_string(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            "Bulk slot generation from {} over {} days: {} ok, {} failed",
            start_date, number_of_days, report.success, report.failed
        );
        Ok(report)
    }

    async fn generate_one(&self, date: NaiveDate) -> Result<&'static str, AppError> {
        if self.store(self.slot_repo.count_by_date(date)).await? > 0 {
            return Ok("SKIPPED");
        }
        let slots = self.generate_slots_for_date(date).await?;
        Ok(if slots.is_empty() { "CLOSED" } else { "GENERATED" })
    }

    // ------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------

    /// Optimistic check-and-increment: the guarded write only lands if the
    /// occupancy we validated against is still current, so two racing calls
    /// can never both pass the capacity check.
    pub async fn add_order(&self, slot_id: &str, order_id: &str) -> Result<TimeSlot, AppError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let slot = self
                .store(self.slot_repo.find_by_id(slot_id))
                .await?
                .ok_or_else(|| AppError::SlotNotFound(slot_id.to_string()))?;

            let mut orders = slot.orders();
            if orders.iter().any(|o| o == order_id) {
                return Err(AppError::OrderAlreadyAssigned {
                    slot_id: slot_id.to_string(),
                    order_id: order_id.to_string(),
                });
            }
            if slot.current_orders >= slot.capacity {
                return Err(AppError::SlotFull(slot_id.to_string()));
            }

            orders.push(order_id.to_string());
            let orders_json = serde_json::to_string(&orders)
                .map_err(|e| AppError::Internal(format!("Failed to encode orders: {}", e)))?;

            if self
                .store(self.slot_repo.append_order_guarded(
                    slot_id,
                    slot.current_orders,
                    &orders_json,
                ))
                .await?
            {
                info!(
                    "Assigned order {} to slot {} ({} {})",
                    order_id, slot_id, slot.date, slot.start_time
                );
                return self.reload_slot(slot_id).await;
            }
            // Lost the optimistic race; reload and re-validate.
        }
        Err(AppError::Conflict(format!(
            "Could not assign order {} to slot {} after {} attempts",
            order_id, slot_id, MAX_WRITE_ATTEMPTS
        )))
    }

    /// Removing an order that is not assigned is a no-op success.
    pub async fn remove_order(&self, slot_id: &str, order_id: &str) -> Result<TimeSlot, AppError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let slot = self
                .store(self.slot_repo.find_by_id(slot_id))
                .await?
                .ok_or_else(|| AppError::SlotNotFound(slot_id.to_string()))?;

            let mut orders = slot.orders();
            let before = orders.len();
            orders.retain(|o| o != order_id);
            if orders.len() == before {
                debug!("Order {} not assigned to slot {}, nothing to remove", order_id, slot_id);
                return Ok(slot);
            }

            let orders_json = serde_json::to_string(&orders)
                .map_err(|e| AppError::Internal(format!("Failed to encode orders: {}", e)))?;

            if self
                .store(self.slot_repo.remove_order_guarded(
                    slot_id,
                    slot.current_orders,
                    &orders_json,
                ))
                .await?
            {
                info!("Removed order {} from slot {}", order_id, slot_id);
                return self.reload_slot(slot_id).await;
            }
        }
        Err(AppError::Conflict(format!(
            "Could not remove order {} from slot {} after {} attempts",
            order_id, slot_id, MAX_WRITE_ATTEMPTS
        )))
    }

    /// Exact-window assignment: the slot must already exist for that date and
    /// start time.
    pub async fn assign_order_to_slot(
        &self,
        order_id: &str,
        date: NaiveDate,
        start_time: &str,
    ) -> Result<TimeSlot, AppError> {
        parse_hhmm(start_time)?;
        let slot = self
            .store(self.slot_repo.find_by_window(date, start_time))
            .await?
            .ok_or_else(|| AppError::SlotNotFound(format!("{} {}", date, start_time)))?;
        self.add_order(&slot.id, order_id).await
    }

    /// Scans ascending (date, start_time) from `from_date`; when nothing is
    /// available yet, generates the bounded horizon on demand and rescans.
    /// Dates whose weekday is unconfigured are tolerated, matching the bulk
    /// generation policy.
    pub async fn find_next_available_slot(
        &self,
        from_date: NaiveDate,
        max_days_ahead: u32,
    ) -> Result<TimeSlot, AppError> {
        if let Some(slot) = self.store(self.slot_repo.first_available_from(from_date)).await? {
            return Ok(slot);
        }

        for offset in 0..max_days_ahead {
            let date = from_date + Duration::days(offset as i64);
            if self.store(self.slot_repo.count_by_date(date)).await? > 0 {
                continue;
            }
            match self.generate_slots_for_date(date).await {
                Ok(_) => {}
                Err(AppError::ScheduleNotConfigured(day)) => {
                    debug!("No weekly schedule for day {} ({}), skipping", day, date);
                }
                Err(e) => return Err(e),
            }
        }

        self.store(self.slot_repo.first_available_from(from_date))
            .await?
            .ok_or(AppError::NoAvailableSlot(max_days_ahead, from_date))
    }

    /// Forcing CLOSED is always allowed; forcing ACTIVE on a slot at capacity
    /// is rejected.
    pub async fn set_slot_status(&self, slot_id: &str, status: &str) -> Result<TimeSlot, AppError> {
        if !SLOT_STATUSES.contains(&status) {
            return Err(AppError::Validation(format!(
                "Unknown slot status '{}'",
                status
            )));
        }

        let updated = if status == STATUS_ACTIVE {
            self.store(self.slot_repo.activate_if_not_full(slot_id)).await?
        } else {
            self.store(self.slot_repo.set_status(slot_id, status)).await?
        };

        if !updated {
            // Either the slot is gone or (for ACTIVE) it is at capacity.
            self.store(self.slot_repo.find_by_id(slot_id))
                .await?
                .ok_or_else(|| AppError::SlotNotFound(slot_id.to_string()))?;
            return Err(AppError::SlotFull(slot_id.to_string()));
        }

        info!("Set slot {} status to {}", slot_id, status);
        self.reload_slot(slot_id).await
    }

    // ------------------------------------------------------------------
    // Slot store queries
    // ------------------------------------------------------------------

    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<TimeSlot>, AppError> {
        self.store(self.slot_repo.list_by_date(date)).await
    }

    pub async fn find_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        only_available: bool,
    ) -> Result<Vec<TimeSlot>, AppError> {
        validate_range(start, end)?;
        self.store(self.slot_repo.list_by_range(start, end, only_available))
            .await
    }

    pub async fn delete_slot(&self, slot_id: &str) -> Result<(), AppError> {
        if self.store(self.slot_repo.delete_if_empty(slot_id)).await? {
            info!("Deleted slot {}", slot_id);
            return Ok(());
        }
        match self.store(self.slot_repo.find_by_id(slot_id)).await? {
            Some(_) => Err(AppError::SlotHasOrders(slot_id.to_string())),
            None => Err(AppError::SlotNotFound(slot_id.to_string())),
        }
    }

    async fn reload_slot(&self, slot_id: &str) -> Result<TimeSlot, AppError> {
        self.store(self.slot_repo.find_by_id(slot_id))
            .await?
            .ok_or_else(|| AppError::SlotNotFound(slot_id.to_string()))
    }
}

fn validate_day_of_week(day_of_week: i32) -> Result<(), AppError> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AppError::Validation(format!(
            "day_of_week must be between 0 (Sunday) and 6 (Saturday), got {}",
            day_of_week
        )));
    }
    Ok(())
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::Validation(format!(
            "Range start {} is after end {}",
            start, end
        )));
    }
    Ok(())
}

/// 0 = Sunday .. 6 = Saturday.
pub fn day_of_week_of(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}
