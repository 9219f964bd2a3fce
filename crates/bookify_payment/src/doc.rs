// File: crates/bookify_payment/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::WebhookAck;
use crate::logic::{WebhookChargeData, WebhookPayload};

/// OpenAPI documentation for the payment feature.
#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::gateway_webhook_handler),
    components(schemas(WebhookAck, WebhookPayload, WebhookChargeData)),
    tags((name = "Payment", description = "Payment gateway webhook"))
)]
pub struct PaymentApiDoc;
