//! Repository for appointments
//!
//! Appointments are owned exclusively by the booking flow; no other
//! subsystem writes this table. The repository therefore carries the one
//! write path that matters for correctness: `insert_if_available`, which
//! re-checks the interval for conflicts inside the same transaction as the
//! insert so that two concurrent bookings cannot both succeed.

use crate::error::DbError;
use crate::repositories::slot_lock::SlotLock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Appointment lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    PendingPayment,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::PendingPayment => "pending_payment",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::NoShow => "no_show",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DbError> {
        match value {
            "pending_payment" => Ok(AppointmentStatus::PendingPayment),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            "no_show" => Ok(AppointmentStatus::NoShow),
            other => Err(DbError::DecodeError(format!(
                "unknown appointment status: {}",
                other
            ))),
        }
    }
}

/// A stored appointment.
#[derive(Debug, Clone)]
pub struct Appointment {
    pub id: String,
    pub tenant_id: String,
    pub staff_id: String,
    pub service_id: String,
    pub customer_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub deposit_paid: bool,
    pub payment_reference: Option<String>,
}

/// Fields of an appointment about to be created; the repository assigns
/// the id.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub tenant_id: String,
    pub staff_id: String,
    pub service_id: String,
    pub customer_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
}

/// Outcome of a conflict-guarded insert.
#[derive(Debug, Clone)]
pub enum AppointmentInsert {
    Created(Appointment),
    /// Another appointment or an active foreign lock overlapped the check
    /// window at commit time; nothing was written.
    Conflict,
}

/// One consistent snapshot of everything that blocks a staff member's time:
/// non-cancelled appointments and non-expired slot locks. Fetched together
/// so the conflict predicate never sees the two tables at different points
/// in time.
#[derive(Debug, Clone, Default)]
pub struct BookedIntervals {
    pub appointments: Vec<Appointment>,
    pub locks: Vec<SlotLock>,
}

/// Repository for appointments.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Create the appointments table if it does not exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Look up one appointment by id within a tenant.
    async fn find_by_id(
        &self,
        tenant_id: &str,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, DbError>;

    /// Non-cancelled appointments and non-expired locks for a staff member
    /// intersecting `[from, until)`, read in one transaction.
    async fn booked_intervals(
        &self,
        staff_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BookedIntervals, DbError>;

    /// Insert the appointment if `[check_start, check_end)` is still free of
    /// non-cancelled appointments and active locks held by other sessions.
    /// The overlap re-check and the insert run in one transaction.
    async fn insert_if_available(
        &self,
        appointment: NewAppointment,
        check_start: DateTime<Utc>,
        check_end: DateTime<Utc>,
        exempt_session: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AppointmentInsert, DbError>;

    /// Transition an appointment to a new status. Returns false when the
    /// appointment does not exist in the tenant.
    async fn update_status(
        &self,
        tenant_id: &str,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<bool, DbError>;

    /// Persist the gateway reference handed back by payment initialization.
    async fn set_payment_reference(
        &self,
        tenant_id: &str,
        appointment_id: &str,
        reference: &str,
    ) -> Result<bool, DbError>;

    /// Mark an appointment as confirmed with its deposit paid, recording the
    /// gateway reference that settled it.
    async fn confirm_paid(
        &self,
        tenant_id: &str,
        appointment_id: &str,
        reference: &str,
    ) -> Result<bool, DbError>;
}
