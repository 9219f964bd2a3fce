//! SQL implementation of the appointment repository

use crate::error::DbError;
use crate::repositories::appointment::{
    Appointment, AppointmentInsert, AppointmentRepository, AppointmentStatus, BookedIntervals,
    NewAppointment,
};
use crate::repositories::slot_lock_sql::map_slot_lock;
use crate::repositories::{from_epoch, to_epoch};
use crate::DbClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{any::AnyRow, Row};
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of the appointment repository
#[derive(Debug, Clone)]
pub struct SqlAppointmentRepository {
    db_client: DbClient,
}

impl SqlAppointmentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

pub(crate) fn map_appointment(row: &AnyRow) -> Result<Appointment, DbError> {
    let status: String = row.try_get("status").unwrap_or_default();
    let start: i64 = row.try_get("start_instant").unwrap_or_default();
    let end: i64 = row.try_get("end_instant").unwrap_or_default();
    let deposit_paid: i64 = row.try_get("deposit_paid").unwrap_or_default();
    Ok(Appointment {
        id: row.try_get("id").unwrap_or_default(),
        tenant_id: row.try_get("tenant_id").unwrap_or_default(),
        staff_id: row.try_get("staff_id").unwrap_or_default(),
        service_id: row.try_get("service_id").unwrap_or_default(),
        customer_id: row.try_get("customer_id").unwrap_or_default(),
        start: from_epoch(start)?,
        end: from_epoch(end)?,
        status: AppointmentStatus::parse(&status)?,
        deposit_paid: deposit_paid != 0,
        payment_reference: row
            .try_get::<Option<String>, _>("payment_reference")
            .ok()
            .flatten(),
    })
}

const APPOINTMENT_COLUMNS: &str =
    "id, tenant_id, staff_id, service_id, customer_id, start_instant, end_instant, status, deposit_paid, payment_reference";

#[async_trait]
impl AppointmentRepository for SqlAppointmentRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                staff_id TEXT NOT NULL,
                service_id TEXT NOT NULL,
                customer_id TEXT NOT NULL,
                start_instant INTEGER NOT NULL,
                end_instant INTEGER NOT NULL,
                status TEXT NOT NULL,
                deposit_paid INTEGER NOT NULL DEFAULT 0,
                payment_reference TEXT
            )
        "#;

        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_appointments_staff_time ON appointments (staff_id, start_instant, end_instant)",
            )
            .await?;

        info!("Appointment schema initialized successfully");
        Ok(())
    }

    async fn find_by_id(
        &self,
        tenant_id: &str,
        appointment_id: &str,
    ) -> Result<Option<Appointment>, DbError> {
        let query = format!(
            "SELECT {} FROM appointments WHERE tenant_id = $1 AND id = $2",
            APPOINTMENT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(tenant_id)
            .bind(appointment_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load appointment: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(map_appointment).transpose()
    }

    async fn booked_intervals(
        &self,
        staff_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BookedIntervals, DbError> {
        debug!(
            "Fetching booked intervals for staff {} in [{}, {})",
            staff_id, from, until
        );

        // Both tables are read inside one transaction so the predicate gets a
        // single snapshot instead of two reads racing against writers.
        let mut tx = self.db_client.begin().await?;

        let appointment_query = format!(
            "SELECT {} FROM appointments
             WHERE staff_id = $1 AND status <> 'cancelled'
               AND start_instant < $3 AND end_instant > $2",
            APPOINTMENT_COLUMNS
        );

        let appointment_rows = sqlx::query(&appointment_query)
            .bind(staff_id)
            .bind(to_epoch(from))
            .bind(to_epoch(until))
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to load appointments: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        let lock_query = r#"
            SELECT id, tenant_id, staff_id, service_id, start_instant, end_instant,
                   session_id, expires_at
            FROM slot_locks
            WHERE staff_id = $1 AND expires_at > $2
              AND start_instant < $4 AND end_instant > $3
        "#;

        let lock_rows = sqlx::query(lock_query)
            .bind(staff_id)
            .bind(to_epoch(now))
            .bind(to_epoch(from))
            .bind(to_epoch(until))
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                error!("Failed to load slot locks: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        let appointments = appointment_rows
            .iter()
            .map(map_appointment)
            .collect::<Result<Vec<_>, _>>()?;
        let locks = lock_rows
            .iter()
            .map(map_slot_lock)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BookedIntervals {
            appointments,
            locks,
        })
    }

    async fn insert_if_available(
        &self,
        appointment: NewAppointment,
        check_start: DateTime<Utc>,
        check_end: DateTime<Utc>,
        exempt_session: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AppointmentInsert, DbError> {
        debug!(
            "Conflict-guarded appointment insert for staff {} in [{}, {})",
            appointment.staff_id, check_start, check_end
        );

        let mut tx = self.db_client.begin().await?;

        let appointment_conflicts: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS cnt FROM appointments
            WHERE staff_id = $1 AND status <> 'cancelled'
              AND start_instant < $3 AND end_instant > $2
            "#,
        )
        .bind(&appointment.staff_id)
        .bind(to_epoch(check_start))
        .bind(to_epoch(check_end))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::QueryError(e.to_string()))?
        .try_get("cnt")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;

        let lock_conflicts: i64 = if let Some(session) = exempt_session {
            sqlx::query(
                r#"
                SELECT COUNT(*) AS cnt FROM slot_locks
                WHERE staff_id = $1 AND expires_at > $2 AND session_id <> $3
                  AND start_instant < $5 AND end_instant > $4
                "#,
            )
            .bind(&appointment.staff_id)
            .bind(to_epoch(now))
            .bind(session)
            .bind(to_epoch(check_start))
            .bind(to_epoch(check_end))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?
            .try_get("cnt")
            .map_err(|e| DbError::DecodeError(e.to_string()))?
        } else {
            sqlx::query(
                r#"
                SELECT COUNT(*) AS cnt FROM slot_locks
                WHERE staff_id = $1 AND expires_at > $2
                  AND start_instant < $4 AND end_instant > $3
                "#,
            )
            .bind(&appointment.staff_id)
            .bind(to_epoch(now))
            .bind(to_epoch(check_start))
            .bind(to_epoch(check_end))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?
            .try_get("cnt")
            .map_err(|e| DbError::DecodeError(e.to_string()))?
        };

        if appointment_conflicts > 0 || lock_conflicts > 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionError(e.to_string()))?;
            info!(
                "Appointment insert rejected: {} appointment / {} lock conflicts",
                appointment_conflicts, lock_conflicts
            );
            return Ok(AppointmentInsert::Conflict);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO appointments
                (id, tenant_id, staff_id, service_id, customer_id,
                 start_instant, end_instant, status, deposit_paid, payment_reference)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, NULL)
            "#,
        )
        .bind(&id)
        .bind(&appointment.tenant_id)
        .bind(&appointment.staff_id)
        .bind(&appointment.service_id)
        .bind(&appointment.customer_id)
        .bind(to_epoch(appointment.start))
        .bind(to_epoch(appointment.end))
        .bind(appointment.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert appointment: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionError(e.to_string()))?;

        info!("Appointment {} created", id);
        Ok(AppointmentInsert::Created(Appointment {
            id,
            tenant_id: appointment.tenant_id,
            staff_id: appointment.staff_id,
            service_id: appointment.service_id,
            customer_id: appointment.customer_id,
            start: appointment.start,
            end: appointment.end,
            status: appointment.status,
            deposit_paid: false,
            payment_reference: None,
        }))
    }

    async fn update_status(
        &self,
        tenant_id: &str,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE appointments SET status = $1 WHERE tenant_id = $2 AND id = $3",
        )
        .bind(status.as_str())
        .bind(tenant_id)
        .bind(appointment_id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to update appointment status: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_payment_reference(
        &self,
        tenant_id: &str,
        appointment_id: &str,
        reference: &str,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE appointments SET payment_reference = $1 WHERE tenant_id = $2 AND id = $3",
        )
        .bind(reference)
        .bind(tenant_id)
        .bind(appointment_id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to store payment reference: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn confirm_paid(
        &self,
        tenant_id: &str,
        appointment_id: &str,
        reference: &str,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET status = 'confirmed', deposit_paid = 1, payment_reference = $1
            WHERE tenant_id = $2 AND id = $3
            "#,
        )
        .bind(reference)
        .bind(tenant_id)
        .bind(appointment_id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to confirm appointment payment: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(result.rows_affected() > 0)
    }
}
