//! SQL implementation of the slot lock repository

use crate::error::DbError;
use crate::repositories::slot_lock::{NewSlotLock, SlotLock, SlotLockInsert, SlotLockRepository};
use crate::repositories::{from_epoch, to_epoch};
use crate::DbClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{any::AnyRow, Row};
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of the slot lock repository
#[derive(Debug, Clone)]
pub struct SqlSlotLockRepository {
    db_client: DbClient,
}

impl SqlSlotLockRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

pub(crate) fn map_slot_lock(row: &AnyRow) -> Result<SlotLock, DbError> {
    let start: i64 = row.try_get("start_instant").unwrap_or_default();
    let end: i64 = row.try_get("end_instant").unwrap_or_default();
    let expires_at: i64 = row.try_get("expires_at").unwrap_or_default();
    Ok(SlotLock {
        id: row.try_get("id").unwrap_or_default(),
        tenant_id: row.try_get("tenant_id").unwrap_or_default(),
        staff_id: row.try_get("staff_id").unwrap_or_default(),
        service_id: row.try_get("service_id").unwrap_or_default(),
        start: from_epoch(start)?,
        end: from_epoch(end)?,
        session_id: row.try_get("session_id").unwrap_or_default(),
        expires_at: from_epoch(expires_at)?,
    })
}

#[async_trait]
impl SlotLockRepository for SqlSlotLockRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing slot lock schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS slot_locks (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                staff_id TEXT NOT NULL,
                service_id TEXT NOT NULL,
                start_instant INTEGER NOT NULL,
                end_instant INTEGER NOT NULL,
                session_id TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_slot_locks_staff_time ON slot_locks (staff_id, start_instant, end_instant)",
            )
            .await?;
        self.db_client
            .execute("CREATE INDEX IF NOT EXISTS idx_slot_locks_expiry ON slot_locks (expires_at)")
            .await?;

        info!("Slot lock schema initialized successfully");
        Ok(())
    }

    async fn insert_if_available(
        &self,
        lock: NewSlotLock,
        now: DateTime<Utc>,
    ) -> Result<SlotLockInsert, DbError> {
        debug!(
            "Conflict-guarded lock insert for staff {} in [{}, {}) by session {}",
            lock.staff_id, lock.start, lock.end, lock.session_id
        );

        let mut tx = self.db_client.begin().await?;

        // The session's own earlier locks for an overlapping window are
        // superseded, not a self-conflict.
        sqlx::query(
            r#"
            DELETE FROM slot_locks
            WHERE staff_id = $1 AND session_id = $2
              AND start_instant < $4 AND end_instant > $3
            "#,
        )
        .bind(&lock.staff_id)
        .bind(&lock.session_id)
        .bind(to_epoch(lock.start))
        .bind(to_epoch(lock.end))
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?;

        let appointment_conflicts: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt FROM appointments
            WHERE staff_id = $1 AND status <> 'cancelled'
              AND start_instant < $3 AND end_instant > $2
            "#,
        )
        .bind(&lock.staff_id)
        .bind(to_epoch(lock.start))
        .bind(to_epoch(lock.end))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?
        .try_get("cnt")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;

        let lock_conflicts: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt FROM slot_locks
            WHERE staff_id = $1 AND expires_at > $2 AND session_id <> $3
              AND start_instant < $5 AND end_instant > $4
            "#,
        )
        .bind(&lock.staff_id)
        .bind(to_epoch(now))
        .bind(&lock.session_id)
        .bind(to_epoch(lock.start))
        .bind(to_epoch(lock.end))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?
        .try_get("cnt")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;

        if appointment_conflicts > 0 || lock_conflicts > 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionError(e.to_string()))?;
            info!(
                "Lock insert rejected: {} appointment / {} lock conflicts",
                appointment_conflicts, lock_conflicts
            );
            return Ok(SlotLockInsert::Conflict);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO slot_locks
                (id, tenant_id, staff_id, service_id, start_instant, end_instant,
                 session_id, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&id)
        .bind(&lock.tenant_id)
        .bind(&lock.staff_id)
        .bind(&lock.service_id)
        .bind(to_epoch(lock.start))
        .bind(to_epoch(lock.end))
        .bind(&lock.session_id)
        .bind(to_epoch(lock.expires_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert slot lock: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!("Slot lock {} created for staff {}", id, lock.staff_id);
        Ok(SlotLockInsert::Created(SlotLock {
            id,
            tenant_id: lock.tenant_id,
            staff_id: lock.staff_id,
            service_id: lock.service_id,
            start: lock.start,
            end: lock.end,
            session_id: lock.session_id,
            expires_at: lock.expires_at,
        }))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM slot_locks WHERE expires_at < $1")
            .bind(to_epoch(now))
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete expired slot locks: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let removed = result.rows_affected();
        if removed > 0 {
            info!("Cleanup sweep removed {} expired slot locks", removed);
        }
        Ok(removed)
    }
}
