use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::{
    ScheduleExceptionRepository, TimeSlotRepository, WeeklyScheduleRepository,
};
use crate::domain::services::scheduling_service::SchedulingService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub schedule_repo: Arc<dyn WeeklyScheduleRepository>,
    pub exception_repo: Arc<dyn ScheduleExceptionRepository>,
    pub slot_repo: Arc<dyn TimeSlotRepository>,
    pub scheduling: Arc<SchedulingService>,
}
