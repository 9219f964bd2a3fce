//! SQL implementation of the customer repository

use crate::error::DbError;
use crate::repositories::customer::{Customer, CustomerRepository, NewCustomer};
use crate::DbClient;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};
use tracing::{debug, error, info};
use uuid::Uuid;

/// SQL implementation of the customer repository
#[derive(Debug, Clone)]
pub struct SqlCustomerRepository {
    db_client: DbClient,
}

impl SqlCustomerRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn map_customer(row: &AnyRow) -> Customer {
    Customer {
        id: row.try_get("id").unwrap_or_default(),
        tenant_id: row.try_get("tenant_id").unwrap_or_default(),
        name: row.try_get("name").unwrap_or_default(),
        email: row.try_get("email").unwrap_or_default(),
        phone: row.try_get::<Option<String>, _>("phone").ok().flatten(),
    }
}

#[async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing customer schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS customers (
                id TEXT PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Customer schema initialized successfully");
        Ok(())
    }

    async fn find_or_create(&self, customer: NewCustomer) -> Result<Customer, DbError> {
        debug!(
            "Resolving customer {} in tenant {}",
            customer.email, customer.tenant_id
        );

        // Email-or-phone match inside the tenant. Phone only participates
        // when the caller supplied one.
        let existing = if let Some(phone) = customer.phone.as_deref() {
            sqlx::query(
                r#"
                SELECT id, tenant_id, name, email, phone FROM customers
                WHERE tenant_id = $1 AND (email = $2 OR phone = $3)
                "#,
            )
            .bind(&customer.tenant_id)
            .bind(&customer.email)
            .bind(phone)
            .fetch_optional(self.db_client.pool())
            .await
        } else {
            sqlx::query(
                r#"
                SELECT id, tenant_id, name, email, phone FROM customers
                WHERE tenant_id = $1 AND email = $2
                "#,
            )
            .bind(&customer.tenant_id)
            .bind(&customer.email)
            .fetch_optional(self.db_client.pool())
            .await
        }
        .map_err(|e| {
            error!("Failed to look up customer: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        if let Some(row) = existing {
            debug!("Customer already exists, reusing record");
            return Ok(map_customer(&row));
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO customers (id, tenant_id, name, email, phone)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(&customer.tenant_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(customer.phone.as_deref())
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to create customer: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        info!("Customer {} created", id);
        Ok(Customer {
            id,
            tenant_id: customer.tenant_id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
        })
    }

    async fn find_by_id(
        &self,
        tenant_id: &str,
        customer_id: &str,
    ) -> Result<Option<Customer>, DbError> {
        let row = sqlx::query(
            "SELECT id, tenant_id, name, email, phone FROM customers WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_optional(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to load customer: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(row.as_ref().map(map_customer))
    }
}
