//! Repository for tenant scheduling configuration
//!
//! Read-only access to the records the availability engine consumes:
//! services, staff members, the staff-to-service assignment, weekly
//! working hours and time-off blocks. These rows are written by the
//! tenant-administration layer, never by the booking flow.

use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A bookable service offered by a tenant.
#[derive(Debug, Clone)]
pub struct ServiceRecord {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub duration_minutes: i64,
    pub buffer_before_minutes: i64,
    pub buffer_after_minutes: i64,
    /// Price in minor units (cents/rappen).
    pub price_minor_units: i64,
    pub currency: String,
    /// Per-service override for the slot step; `None` falls back to the
    /// configured default.
    pub slot_granularity_minutes: Option<i64>,
}

/// A staff member of a tenant. Only active staff are schedulable.
#[derive(Debug, Clone)]
pub struct StaffMember {
    pub id: String,
    pub tenant_id: String,
    pub display_name: String,
    pub is_active: bool,
}

/// One weekly working-hours row. A staff member may have several rows per
/// weekday (split shifts); a weekday with no rows is closed.
#[derive(Debug, Clone)]
pub struct WorkingHoursRow {
    pub staff_id: String,
    /// 0 = Monday … 6 = Sunday.
    pub day_of_week: i64,
    /// Local wall-clock time, "HH:MM".
    pub start_time: String,
    pub end_time: String,
}

/// A time-off block, either staff-specific (`staff_id = Some`) or
/// tenant-wide (`staff_id = None`).
#[derive(Debug, Clone)]
pub struct TimeOffBlock {
    pub id: String,
    pub tenant_id: String,
    pub staff_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Read-side repository for scheduling configuration.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Create the schema for the scheduling tables if it does not exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Look up a service by id within a tenant.
    async fn find_service(
        &self,
        tenant_id: &str,
        service_id: &str,
    ) -> Result<Option<ServiceRecord>, DbError>;

    /// Look up a staff member by id within a tenant.
    async fn find_staff(
        &self,
        tenant_id: &str,
        staff_id: &str,
    ) -> Result<Option<StaffMember>, DbError>;

    /// All *active* staff members assigned to a service.
    async fn staff_for_service(
        &self,
        tenant_id: &str,
        service_id: &str,
    ) -> Result<Vec<StaffMember>, DbError>;

    /// Working-hours rows for one staff member on one weekday
    /// (0 = Monday … 6 = Sunday), ordered by start time.
    async fn working_hours(
        &self,
        staff_id: &str,
        day_of_week: i64,
    ) -> Result<Vec<WorkingHoursRow>, DbError>;

    /// Staff-level and tenant-wide time-off blocks intersecting
    /// `[from, until)` for the given staff member.
    async fn time_off_between(
        &self,
        tenant_id: &str,
        staff_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<TimeOffBlock>, DbError>;
}
