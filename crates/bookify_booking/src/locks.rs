// --- File: crates/bookify_booking/src/locks.rs ---
//! The slot-lock manager.
//!
//! A lock reserves a buffer-expanded interval for one client session while
//! that customer completes checkout. Lifecycle: none → locked →
//! (expired | superseded by the real appointment). There is no explicit
//! release; abandonment self-heals when the TTL lapses.

use crate::error::BookingError;
use crate::logic::{expanded_window, intervals_overlap, SlotParams};
use bookify_config::AppConfig;
use bookify_db::{
    NewSlotLock, ScheduleRepository, SlotLock, SlotLockInsert, SlotLockRepository,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Manages slot-lock acquisition and the periodic cleanup sweep.
pub struct SlotLockManager {
    config: Arc<AppConfig>,
    schedule_repo: Arc<dyn ScheduleRepository>,
    lock_repo: Arc<dyn SlotLockRepository>,
}

impl SlotLockManager {
    pub fn new(
        config: Arc<AppConfig>,
        schedule_repo: Arc<dyn ScheduleRepository>,
        lock_repo: Arc<dyn SlotLockRepository>,
    ) -> Self {
        Self {
            config,
            schedule_repo,
            lock_repo,
        }
    }

    /// Reserve the buffer-expanded window around `start` for `session_id`.
    ///
    /// Availability is re-derived from a fresh read; whatever slot list the
    /// client saw earlier is stale by definition. The conflict re-check and
    /// the insert run as one transaction in the repository, so two
    /// concurrent acquisitions for overlapping windows cannot both
    /// succeed. The session's own overlapping locks are superseded rather
    /// than treated as conflicts.
    pub async fn acquire(
        &self,
        tenant_id: &str,
        staff_id: &str,
        service_id: &str,
        start: DateTime<Utc>,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SlotLock, BookingError> {
        let service = self
            .schedule_repo
            .find_service(tenant_id, service_id)
            .await?
            .ok_or(BookingError::ServiceNotFound)?;
        let staff = self
            .schedule_repo
            .find_staff(tenant_id, staff_id)
            .await?
            .ok_or(BookingError::StaffNotFound)?;
        if !staff.is_active {
            return Err(BookingError::SlotUnavailable);
        }

        let params = SlotParams::for_service(
            &service,
            self.config.default_slot_granularity_minutes(),
        );
        let (window_start, window_end) = expanded_window(start, &params);

        // Time off is configuration data, not raced by the booking flow,
        // so it is checked here; the transactional insert below guards the
        // two mutable tables.
        let time_off = self
            .schedule_repo
            .time_off_between(tenant_id, staff_id, window_start, window_end)
            .await?;
        if time_off
            .iter()
            .any(|block| intervals_overlap(window_start, window_end, block.start, block.end))
        {
            debug!(
                "Lock acquisition for staff {} rejected by time off",
                staff_id
            );
            return Err(BookingError::SlotUnavailable);
        }

        let expires_at = now + Duration::minutes(self.config.lock_ttl_minutes());
        let lock = NewSlotLock {
            tenant_id: tenant_id.to_string(),
            staff_id: staff_id.to_string(),
            service_id: service_id.to_string(),
            start: window_start,
            end: window_end,
            session_id: session_id.to_string(),
            expires_at,
        };

        match self.lock_repo.insert_if_available(lock, now).await? {
            SlotLockInsert::Created(created) => {
                info!(
                    "Session {} locked [{}, {}) for staff {} until {}",
                    session_id, window_start, window_end, staff_id, expires_at
                );
                Ok(created)
            }
            SlotLockInsert::Conflict => Err(BookingError::SlotUnavailable),
        }
    }

    /// Delete every expired lock, across all tenants.
    ///
    /// Idempotent housekeeping; it runs under the housekeeping capability,
    /// never through the tenant-scoped request path. A late sweep is never
    /// a correctness hazard because the conflict predicate already ignores
    /// expired locks; this only bounds storage growth.
    pub async fn run_cleanup(&self, now: DateTime<Utc>) -> Result<u64, BookingError> {
        let removed = self.lock_repo.delete_expired(now).await?;
        Ok(removed)
    }
}
