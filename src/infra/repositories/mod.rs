pub mod sqlite_schedule_repo;
pub mod sqlite_exception_repo;
pub mod sqlite_slot_repo;

pub mod postgres_schedule_repo;
pub mod postgres_exception_repo;
pub mod postgres_slot_repo;
