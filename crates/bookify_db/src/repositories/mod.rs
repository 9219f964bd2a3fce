//! Repository modules for database access
//!
//! This module contains repository traits and implementations for the
//! scheduling entities. Instants are stored as Unix epoch seconds so the
//! same SQL works across the `sqlx::Any` backends; the conversion to and
//! from `chrono::DateTime<Utc>` happens at the repository boundary and
//! nowhere else.

use crate::error::DbError;
use chrono::{DateTime, Utc};

pub mod appointment;
pub mod appointment_sql;
pub mod customer;
pub mod customer_sql;
pub mod schedule;
pub mod schedule_sql;
pub mod slot_lock;
pub mod slot_lock_sql;

// Re-export the repositories for ease of use
pub use appointment::{
    Appointment, AppointmentInsert, AppointmentRepository, AppointmentStatus, BookedIntervals,
    NewAppointment,
};
pub use appointment_sql::SqlAppointmentRepository;
pub use customer::{Customer, CustomerRepository, NewCustomer};
pub use customer_sql::SqlCustomerRepository;
pub use schedule::{
    ScheduleRepository, ServiceRecord, StaffMember, TimeOffBlock, WorkingHoursRow,
};
pub use schedule_sql::SqlScheduleRepository;
pub use slot_lock::{NewSlotLock, SlotLock, SlotLockInsert, SlotLockRepository};
pub use slot_lock_sql::SqlSlotLockRepository;

/// Convert an instant to its stored representation (epoch seconds).
pub(crate) fn to_epoch(instant: DateTime<Utc>) -> i64 {
    instant.timestamp()
}

/// Convert a stored epoch-seconds value back to an instant.
pub(crate) fn from_epoch(seconds: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| DbError::DecodeError(format!("timestamp out of range: {}", seconds)))
}
