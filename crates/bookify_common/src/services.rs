// --- File: crates/bookify_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! This module provides trait definitions for the external services the
//! booking core talks to. The traits allow for dependency injection and
//! easier testing by decoupling the booking flow from specific
//! implementations (the live payment gateway in particular is a slow,
//! fallible network collaborator that tests replace with a double).

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A trait for payment-gateway operations.
///
/// The booking orchestrator only ever needs two calls: start a hosted
/// checkout for a booking deposit, and verify what happened to a
/// previously started transaction. Everything else the gateway offers is
/// out of scope.
pub trait PaymentService: Send + Sync {
    /// Error type returned by payment service operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Initialize a transaction and obtain a redirect URL for checkout.
    fn initialize_transaction(
        &self,
        email: &str,
        amount_minor_units: i64,
        metadata: serde_json::Value,
        callback_url: &str,
    ) -> BoxFuture<'_, PaymentInitResult, Self::Error>;

    /// Verify the outcome of a previously initialized transaction.
    fn verify_transaction(
        &self,
        provider_reference: &str,
    ) -> BoxFuture<'_, PaymentVerification, Self::Error>;
}

/// A factory for creating service instances.
///
/// Used by the backend binary to hand collaborators to the request path
/// without the request path knowing which concrete gateway is configured.
pub trait ServiceFactory: Send + Sync {
    /// Get a payment service instance, if one is configured.
    fn payment_service(&self) -> Option<Arc<dyn PaymentService<Error = BoxedError>>>;
}

/// Result of initializing a payment transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInitResult {
    /// Gateway-reported status of the initialization.
    pub status: String,
    /// Hosted checkout URL the customer is redirected to.
    pub redirect_url: String,
    /// The gateway's reference for this transaction.
    pub provider_reference: String,
}

/// Terminal outcome of a transaction as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Success,
    Failed,
}

/// Result of verifying a payment transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub status: VerificationStatus,
    /// Amount actually charged, in minor units.
    pub amount_minor_units: i64,
}
