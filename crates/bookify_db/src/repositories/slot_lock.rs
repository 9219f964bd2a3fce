//! Repository for slot locks
//!
//! A slot lock is a short-lived reservation of a buffer-expanded interval,
//! keyed by staff member and held by an opaque client session. Locks are
//! never renewed and never explicitly released; they lapse when
//! `expires_at` passes and are physically removed by the cleanup sweep.

use crate::error::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A stored slot lock. `start`/`end` are already buffer-expanded.
#[derive(Debug, Clone)]
pub struct SlotLock {
    pub id: String,
    pub tenant_id: String,
    pub staff_id: String,
    pub service_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Fields of a lock about to be created; the repository assigns the id.
#[derive(Debug, Clone)]
pub struct NewSlotLock {
    pub tenant_id: String,
    pub staff_id: String,
    pub service_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a conflict-guarded lock insert.
#[derive(Debug, Clone)]
pub enum SlotLockInsert {
    Created(SlotLock),
    /// The interval was already blocked by an appointment or another
    /// session's active lock; nothing was written.
    Conflict,
}

/// Repository for slot locks.
#[async_trait]
pub trait SlotLockRepository: Send + Sync {
    /// Create the slot_locks table if it does not exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Insert the lock if its interval is still free of non-cancelled
    /// appointments and active locks held by *other* sessions. The
    /// requesting session's own overlapping locks are superseded (deleted)
    /// in the same transaction, so re-acquiring never self-conflicts.
    async fn insert_if_available(
        &self,
        lock: NewSlotLock,
        now: DateTime<Utc>,
    ) -> Result<SlotLockInsert, DbError>;

    /// Delete every lock whose `expires_at` has passed, across all tenants.
    /// Idempotent; returns the number of rows removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DbError>;
}
