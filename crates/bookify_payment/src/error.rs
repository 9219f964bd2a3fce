// --- File: crates/bookify_payment/src/error.rs ---

use thiserror::Error;

/// Errors raised by the payment-gateway integration.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Gateway API request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Gateway API returned an error: Status={status}, Message='{message}'")]
    ApiError { status: String, message: String },
    #[error("Failed to parse gateway API response: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Payment gateway configuration missing or incomplete")]
    ConfigError,
    #[error("Webhook signature verification failed")]
    WebhookSignatureError,
    #[error("Webhook processing error: {0}")]
    WebhookProcessingError(String),
    #[error("Internal processing error: {0}")]
    InternalError(String),
}
