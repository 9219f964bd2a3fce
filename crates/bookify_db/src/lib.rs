//! Database integration for Bookify
//!
//! This crate provides a database client that is designed to be database
//! agnostic, using SQLx as the underlying library (SQLite by default,
//! PostgreSQL and MySQL behind feature flags), plus the repositories the
//! booking core reads and writes through.
//!
//! Instants are stored as Unix epoch seconds; local wall-clock times
//! (working hours) are stored as "HH:MM" strings. The conversion to
//! `chrono` types happens at the repository boundary.

pub mod client;
pub mod error;
pub mod factory;
pub mod repositories;

// Re-export the client and factory for ease of use
pub use client::DbClient;
pub use error::DbError;
pub use factory::DbClientFactory;

// Re-export the repository traits and implementations for ease of use
pub use repositories::{
    Appointment, AppointmentInsert, AppointmentRepository, AppointmentStatus, BookedIntervals,
    Customer, CustomerRepository, NewAppointment, NewCustomer, NewSlotLock, ScheduleRepository,
    ServiceRecord, SlotLock, SlotLockInsert, SlotLockRepository, SqlAppointmentRepository,
    SqlCustomerRepository, SqlScheduleRepository, SqlSlotLockRepository, StaffMember,
    TimeOffBlock, WorkingHoursRow,
};
