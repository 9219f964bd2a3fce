//! Repository for customers
//!
//! The booking flow only ever needs find-or-create: match an existing
//! customer in the tenant by email or phone, create one when nothing
//! matches. Full customer management lives in the CRUD layer outside this
//! core.

use crate::error::DbError;
use async_trait::async_trait;

/// A stored customer.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Customer details collected at checkout.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Repository for customers.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Create the customers table if it does not exist.
    async fn init_schema(&self) -> Result<(), DbError>;

    /// Find a customer in the tenant matching by email or phone; create one
    /// when no match exists. Duplicate submissions resolve to the same row.
    async fn find_or_create(&self, customer: NewCustomer) -> Result<Customer, DbError>;

    /// Look up a customer by id within a tenant.
    async fn find_by_id(
        &self,
        tenant_id: &str,
        customer_id: &str,
    ) -> Result<Option<Customer>, DbError>;
}
