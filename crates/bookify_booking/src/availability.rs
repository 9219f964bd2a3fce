// --- File: crates/bookify_booking/src/availability.rs ---
//! The slot-listing service.
//!
//! Joins the working-hours, blackout and booked-interval resolvers with
//! the pure generator in [`crate::logic`]. Everything returned here is
//! advisory; the only authoritative availability checks are the ones
//! performed atomically with a write (lock acquisition, booking commit).

use crate::error::BookingError;
use crate::logic::{
    day_bounds, generate_day_slots, parse_wall_time, LockWindow, Slot, SlotParams,
};
use bookify_config::AppConfig;
use bookify_db::{AppointmentRepository, ScheduleRepository, ServiceRecord, StaffMember};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, warn};

impl SlotParams {
    /// Resolve the slot arithmetic for a service, falling back to the
    /// configured default granularity when the service carries none.
    pub fn for_service(service: &ServiceRecord, default_granularity_minutes: i64) -> Self {
        SlotParams {
            duration: Duration::minutes(service.duration_minutes),
            buffer_before: Duration::minutes(service.buffer_before_minutes),
            buffer_after: Duration::minutes(service.buffer_after_minutes),
            granularity: Duration::minutes(
                service
                    .slot_granularity_minutes
                    .unwrap_or(default_granularity_minutes)
                    .max(1),
            ),
        }
    }
}

/// Read-only service computing a day's candidate slots for a tenant.
pub struct AvailabilityService {
    config: Arc<AppConfig>,
    schedule_repo: Arc<dyn ScheduleRepository>,
    appointment_repo: Arc<dyn AppointmentRepository>,
}

impl AvailabilityService {
    pub fn new(
        config: Arc<AppConfig>,
        schedule_repo: Arc<dyn ScheduleRepository>,
        appointment_repo: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self {
            config,
            schedule_repo,
            appointment_repo,
        }
    }

    /// List the candidate slots of one calendar day for a service.
    ///
    /// When `staff_id` is given, only that staff member is considered (an
    /// inactive staff member yields zero slots, not an error). Otherwise
    /// every active staff member assigned to the service contributes
    /// slots, each tagged with the staff member that backs it.
    pub async fn list_slots(
        &self,
        tenant_id: &str,
        service_id: &str,
        date: NaiveDate,
        tz: Tz,
        staff_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>, BookingError> {
        let service = self
            .schedule_repo
            .find_service(tenant_id, service_id)
            .await?
            .ok_or(BookingError::ServiceNotFound)?;

        let params = SlotParams::for_service(
            &service,
            self.config.default_slot_granularity_minutes(),
        );

        let staff = self.resolve_staff(tenant_id, service_id, staff_id).await?;
        if staff.is_empty() {
            debug!(
                "No eligible staff for service {} in tenant {} on {}",
                service_id, tenant_id, date
            );
            return Ok(Vec::new());
        }

        let mut slots = Vec::new();
        for member in staff {
            slots.extend(
                self.slots_for_staff(tenant_id, &member, date, tz, &params, now)
                    .await?,
            );
        }

        // Stable presentation order: by start time, then staff.
        slots.sort_by(|a, b| (a.start, &a.staff_id).cmp(&(b.start, &b.staff_id)));
        Ok(slots)
    }

    async fn resolve_staff(
        &self,
        tenant_id: &str,
        service_id: &str,
        staff_id: Option<&str>,
    ) -> Result<Vec<StaffMember>, BookingError> {
        match staff_id {
            Some(id) => {
                let member = self
                    .schedule_repo
                    .find_staff(tenant_id, id)
                    .await?
                    .ok_or(BookingError::StaffNotFound)?;
                // Inactive staff are entirely absent from slot generation.
                if member.is_active {
                    Ok(vec![member])
                } else {
                    Ok(Vec::new())
                }
            }
            None => Ok(self
                .schedule_repo
                .staff_for_service(tenant_id, service_id)
                .await?),
        }
    }

    async fn slots_for_staff(
        &self,
        tenant_id: &str,
        member: &StaffMember,
        date: NaiveDate,
        tz: Tz,
        params: &SlotParams,
        now: DateTime<Utc>,
    ) -> Result<Vec<Slot>, BookingError> {
        let weekday = date.weekday().num_days_from_monday() as i64;
        let rows = self.schedule_repo.working_hours(&member.id, weekday).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let open_intervals: Vec<(NaiveTime, NaiveTime)> = rows
            .iter()
            .filter_map(|row| {
                match (
                    parse_wall_time(&row.start_time),
                    parse_wall_time(&row.end_time),
                ) {
                    (Some(start), Some(end)) if start < end => Some((start, end)),
                    _ => {
                        warn!(
                            "Skipping malformed working-hours row for staff {}: {}-{}",
                            member.id, row.start_time, row.end_time
                        );
                        None
                    }
                }
            })
            .collect();

        // Fetch range: the day itself, widened by the buffers so a window
        // poking past midnight still sees its neighbours.
        let (day_start, day_end) = day_bounds(date, tz);
        let range_start = day_start - params.buffer_before;
        let range_end = day_end + params.buffer_after;

        let time_off = self
            .schedule_repo
            .time_off_between(tenant_id, &member.id, range_start, range_end)
            .await?;
        let booked = self
            .appointment_repo
            .booked_intervals(&member.id, range_start, range_end, now)
            .await?;

        let blocked: Vec<(DateTime<Utc>, DateTime<Utc>)> =
            time_off.iter().map(|block| (block.start, block.end)).collect();
        let appointments: Vec<(DateTime<Utc>, DateTime<Utc>)> = booked
            .appointments
            .iter()
            .map(|appointment| (appointment.start, appointment.end))
            .collect();
        let locks: Vec<LockWindow> = booked
            .locks
            .iter()
            .map(|lock| LockWindow {
                start: lock.start,
                end: lock.end,
                session_id: lock.session_id.clone(),
                expires_at: lock.expires_at,
            })
            .collect();

        Ok(generate_day_slots(
            date,
            tz,
            params,
            &member.id,
            &open_intervals,
            &blocked,
            &appointments,
            &locks,
            now,
        ))
    }
}
