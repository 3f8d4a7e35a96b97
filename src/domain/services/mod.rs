pub mod hours;
pub mod scheduling_service;
pub mod slots;
