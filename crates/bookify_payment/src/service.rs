// --- File: crates/bookify_payment/src/service.rs ---
//! PaymentService implementation backed by the hosted gateway.
//!
//! The booking orchestrator talks to the [`PaymentService`] trait; this is
//! the live implementation that forwards to the gateway REST API.

use crate::error::PaymentError;
use crate::logic::{initialize_transaction, verify_transaction};
use bookify_common::services::{
    BoxFuture, BoxedError, PaymentInitResult, PaymentService, PaymentVerification,
    VerificationStatus,
};
use bookify_config::PaymentConfig;
use serde_json::Value;

/// Live payment service talking to the configured gateway.
pub struct GatewayPaymentService {
    config: PaymentConfig,
}

impl GatewayPaymentService {
    pub fn new(config: PaymentConfig) -> Self {
        Self { config }
    }
}

fn boxed(err: PaymentError) -> BoxedError {
    BoxedError(Box::new(err))
}

impl PaymentService for GatewayPaymentService {
    type Error = BoxedError;

    fn initialize_transaction(
        &self,
        email: &str,
        amount_minor_units: i64,
        metadata: Value,
        callback_url: &str,
    ) -> BoxFuture<'_, PaymentInitResult, Self::Error> {
        let email = email.to_string();
        let callback_url = callback_url.to_string();

        Box::pin(async move {
            let callback = if callback_url.is_empty() {
                self.config.callback_url.clone()
            } else {
                callback_url
            };
            let initialized = initialize_transaction(
                &self.config,
                &email,
                amount_minor_units,
                metadata,
                &callback,
            )
            .await
            .map_err(boxed)?;

            Ok(PaymentInitResult {
                status: "pending".to_string(),
                redirect_url: initialized.redirect_url,
                provider_reference: initialized.reference,
            })
        })
    }

    fn verify_transaction(
        &self,
        provider_reference: &str,
    ) -> BoxFuture<'_, PaymentVerification, Self::Error> {
        let reference = provider_reference.to_string();

        Box::pin(async move {
            let verified = verify_transaction(&self.config, &reference)
                .await
                .map_err(boxed)?;

            let status = if verified.status == "success" {
                VerificationStatus::Success
            } else {
                VerificationStatus::Failed
            };

            Ok(PaymentVerification {
                status,
                amount_minor_units: verified.amount_minor_units,
            })
        })
    }
}
