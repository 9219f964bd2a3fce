//! SQL implementation of the schedule repository

use crate::error::DbError;
use crate::repositories::schedule::{
    ScheduleRepository, ServiceRecord, StaffMember, TimeOffBlock, WorkingHoursRow,
};
use crate::repositories::{from_epoch, to_epoch};
use crate::DbClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{any::AnyRow, Row};
use tracing::{debug, error, info};

/// SQL implementation of the schedule repository
#[derive(Debug, Clone)]
pub struct SqlScheduleRepository {
    db_client: DbClient,
}

impl SqlScheduleRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn map_service(row: &AnyRow) -> Result<ServiceRecord, DbError> {
    let granularity: Option<i64> = row
        .try_get("slot_granularity_minutes")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    Ok(ServiceRecord {
        id: row.try_get("id").unwrap_or_default(),
        tenant_id: row.try_get("tenant_id").unwrap_or_default(),
        name: row.try_get("name").unwrap_or_default(),
        duration_minutes: row.try_get("duration_minutes").unwrap_or_default(),
        buffer_before_minutes: row.try_get("buffer_before_minutes").unwrap_or_default(),
        buffer_after_minutes: row.try_get("buffer_after_minutes").unwrap_or_default(),
        price_minor_units: row.try_get("price_minor_units").unwrap_or_default(),
        currency: row.try_get("currency").unwrap_or_default(),
        slot_granularity_minutes: granularity,
    })
}

fn map_staff(row: &AnyRow) -> StaffMember {
    let active: i64 = row.try_get("is_active").unwrap_or_default();
    StaffMember {
        id: row.try_get("id").unwrap_or_default(),
        tenant_id: row.try_get("tenant_id").unwrap_or_default(),
        display_name: row.try_get("display_name").unwrap_or_default(),
        is_active: active != 0,
    }
}

fn map_time_off(row: &AnyRow) -> Result<TimeOffBlock, DbError> {
    let staff_id: Option<String> = row
        .try_get("staff_id")
        .map_err(|e| DbError::DecodeError(e.to_string()))?;
    let start: i64 = row.try_get("start_instant").unwrap_or_default();
    let end: i64 = row.try_get("end_instant").unwrap_or_default();
    Ok(TimeOffBlock {
        id: row.try_get("id").unwrap_or_default(),
        tenant_id: row.try_get("tenant_id").unwrap_or_default(),
        staff_id,
        start: from_epoch(start)?,
        end: from_epoch(end)?,
        reason: row.try_get::<Option<String>, _>("reason").ok().flatten(),
    })
}

#[async_trait]
impl ScheduleRepository for SqlScheduleRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing scheduling schema");

        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                name TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                buffer_before_minutes INTEGER NOT NULL DEFAULT 0,
                buffer_after_minutes INTEGER NOT NULL DEFAULT 0,
                price_minor_units INTEGER NOT NULL DEFAULT 0,
                currency TEXT NOT NULL DEFAULT 'CHF',
                slot_granularity_minutes INTEGER
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS staff_members (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                display_name TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS staff_services (
                staff_id TEXT NOT NULL,
                service_id TEXT NOT NULL,
                PRIMARY KEY (staff_id, service_id)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS working_hours (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                staff_id TEXT NOT NULL,
                day_of_week INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS time_off (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                staff_id TEXT,
                start_instant INTEGER NOT NULL,
                end_instant INTEGER NOT NULL,
                reason TEXT
            )
            "#,
        ];

        for query in statements {
            self.db_client.execute(query).await?;
        }

        info!("Scheduling schema initialized successfully");
        Ok(())
    }

    async fn find_service(
        &self,
        tenant_id: &str,
        service_id: &str,
    ) -> Result<Option<ServiceRecord>, DbError> {
        debug!("Loading service {} for tenant {}", service_id, tenant_id);

        let query = r#"
            SELECT id, tenant_id, name, duration_minutes, buffer_before_minutes,
                   buffer_after_minutes, price_minor_units, currency, slot_granularity_minutes
            FROM services
            WHERE tenant_id = $1 AND id = $2
        "#;

        let row = sqlx::query(query)
            .bind(tenant_id)
            .bind(service_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load service: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        row.as_ref().map(map_service).transpose()
    }

    async fn find_staff(
        &self,
        tenant_id: &str,
        staff_id: &str,
    ) -> Result<Option<StaffMember>, DbError> {
        let query = r#"
            SELECT id, tenant_id, display_name, is_active
            FROM staff_members
            WHERE tenant_id = $1 AND id = $2
        "#;

        let row = sqlx::query(query)
            .bind(tenant_id)
            .bind(staff_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load staff member: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(row.as_ref().map(map_staff))
    }

    async fn staff_for_service(
        &self,
        tenant_id: &str,
        service_id: &str,
    ) -> Result<Vec<StaffMember>, DbError> {
        debug!(
            "Resolving eligible staff for service {} in tenant {}",
            service_id, tenant_id
        );

        let query = r#"
            SELECT s.id, s.tenant_id, s.display_name, s.is_active
            FROM staff_members s
            INNER JOIN staff_services m ON m.staff_id = s.id
            WHERE s.tenant_id = $1 AND m.service_id = $2 AND s.is_active = 1
            ORDER BY s.display_name
        "#;

        let rows = sqlx::query(query)
            .bind(tenant_id)
            .bind(service_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to resolve staff for service: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(rows.iter().map(map_staff).collect())
    }

    async fn working_hours(
        &self,
        staff_id: &str,
        day_of_week: i64,
    ) -> Result<Vec<WorkingHoursRow>, DbError> {
        let query = r#"
            SELECT staff_id, day_of_week, start_time, end_time
            FROM working_hours
            WHERE staff_id = $1 AND day_of_week = $2
            ORDER BY start_time
        "#;

        let rows = sqlx::query(query)
            .bind(staff_id)
            .bind(day_of_week)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load working hours: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(rows
            .into_iter()
            .map(|row| WorkingHoursRow {
                staff_id: row.try_get("staff_id").unwrap_or_default(),
                day_of_week: row.try_get("day_of_week").unwrap_or_default(),
                start_time: row.try_get("start_time").unwrap_or_default(),
                end_time: row.try_get("end_time").unwrap_or_default(),
            })
            .collect())
    }

    async fn time_off_between(
        &self,
        tenant_id: &str,
        staff_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<TimeOffBlock>, DbError> {
        // Half-open intersection with [from, until): staff-level rows for
        // this staff member plus tenant-wide rows (staff_id IS NULL).
        let query = r#"
            SELECT id, tenant_id, staff_id, start_instant, end_instant, reason
            FROM time_off
            WHERE tenant_id = $1
              AND (staff_id = $2 OR staff_id IS NULL)
              AND start_instant < $4
              AND end_instant > $3
        "#;

        let rows = sqlx::query(query)
            .bind(tenant_id)
            .bind(staff_id)
            .bind(to_epoch(from))
            .bind(to_epoch(until))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to load time off: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(map_time_off).collect()
    }
}
