// --- File: crates/bookify_payment/src/logic.rs ---
//! REST client for the hosted payment gateway.
//!
//! The gateway is an opaque, possibly-slow, possibly-failing network
//! collaborator: one call starts a hosted checkout and returns a redirect
//! URL, one call verifies what happened to a transaction, and a webhook
//! reports settled charges back to us. The secret key never lives in
//! config files; it is read from the `PAYMENT_GATEWAY_SECRET_KEY`
//! environment variable.

use bookify_config::PaymentConfig;
use bookify_common::HTTP_CLIENT;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

// Signature verification imports
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::error::PaymentError;

/// Name of the header carrying the webhook HMAC signature.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-gateway-signature";

const SECRET_KEY_ENV: &str = "PAYMENT_GATEWAY_SECRET_KEY";

// --- Data Structures ---

/// Body sent to the gateway's transaction-initialize endpoint.
#[derive(Serialize, Debug)]
struct InitializeTransactionBody<'a> {
    email: &'a str,
    /// Amount in minor units (cents/rappen).
    amount: i64,
    currency: &'a str,
    callback_url: &'a str,
    metadata: Value,
}

#[derive(Deserialize, Debug)]
struct InitializeTransactionData {
    authorization_url: String,
    reference: String,
}

#[derive(Deserialize, Debug)]
struct GatewayEnvelope<T> {
    status: bool,
    message: Option<String>,
    data: Option<T>,
}

/// Outcome of a transaction initialization as this crate reports it.
#[derive(Debug, Clone)]
pub struct InitializedTransaction {
    pub redirect_url: String,
    pub reference: String,
}

#[derive(Deserialize, Debug)]
struct VerifyTransactionData {
    status: String,
    amount: i64,
}

/// Outcome of a transaction verification.
#[derive(Debug, Clone)]
pub struct VerifiedTransaction {
    /// Gateway-reported terminal status, e.g. "success" or "failed".
    pub status: String,
    pub amount_minor_units: i64,
}

// --- Webhook Payload Structures ---

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WebhookChargeData {
    pub reference: Option<String>,
    pub amount: Option<i64>,
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WebhookPayload {
    /// Event name, e.g. "charge.success"
    pub event: Option<String>,
    pub data: Option<WebhookChargeData>,
}

impl WebhookPayload {
    /// The appointment id this charge settles, carried through the
    /// transaction metadata since initialization.
    pub fn appointment_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.metadata.as_ref())
            .and_then(|m| m.get("appointment_id"))
            .and_then(|v| v.as_str())
    }

    /// The tenant the appointment belongs to.
    pub fn tenant_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.metadata.as_ref())
            .and_then(|m| m.get("tenant_id"))
            .and_then(|v| v.as_str())
    }
}

// --- Core Logic Functions ---

fn secret_key() -> Result<String, PaymentError> {
    std::env::var(SECRET_KEY_ENV).map_err(|_| PaymentError::ConfigError)
}

/// Starts a hosted checkout for `amount_minor_units` and returns the
/// redirect URL plus the gateway's transaction reference.
pub async fn initialize_transaction(
    config: &PaymentConfig,
    email: &str,
    amount_minor_units: i64,
    metadata: Value,
    callback_url: &str,
) -> Result<InitializedTransaction, PaymentError> {
    let currency = config.currency.as_deref().unwrap_or("CHF");
    let api_url = format!("{}/transaction/initialize", config.base_url.trim_end_matches('/'));
    debug!("Initializing gateway transaction at {}", api_url);

    let body = InitializeTransactionBody {
        email,
        amount: amount_minor_units,
        currency,
        callback_url,
        metadata,
    };

    let response = HTTP_CLIENT
        .post(&api_url)
        .bearer_auth(secret_key()?)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;

    if !status.is_success() {
        error!(
            "Gateway initialize call failed with HTTP status {}: {}",
            status, body_text
        );
        let message = match serde_json::from_str::<GatewayEnvelope<Value>>(&body_text) {
            Ok(envelope) => envelope.message.unwrap_or(body_text),
            Err(_) => body_text,
        };
        return Err(PaymentError::ApiError {
            status: status.to_string(),
            message,
        });
    }

    let envelope: GatewayEnvelope<InitializeTransactionData> = serde_json::from_str(&body_text)?;
    if !envelope.status {
        return Err(PaymentError::ApiError {
            status: "error".to_string(),
            message: envelope
                .message
                .unwrap_or_else(|| "Unknown gateway error".to_string()),
        });
    }

    let data = envelope.data.ok_or_else(|| {
        PaymentError::InternalError("Gateway response missing transaction data".to_string())
    })?;

    info!(
        "Gateway transaction initialized (reference {})",
        data.reference
    );
    Ok(InitializedTransaction {
        redirect_url: data.authorization_url,
        reference: data.reference,
    })
}

/// Verifies the outcome of a previously initialized transaction.
pub async fn verify_transaction(
    config: &PaymentConfig,
    reference: &str,
) -> Result<VerifiedTransaction, PaymentError> {
    let api_url = format!(
        "{}/transaction/verify/{}",
        config.base_url.trim_end_matches('/'),
        reference
    );
    debug!("Verifying gateway transaction at {}", api_url);

    let response = HTTP_CLIENT
        .get(&api_url)
        .bearer_auth(secret_key()?)
        .send()
        .await?;

    let status = response.status();
    let body_text = response.text().await?;

    if !status.is_success() {
        error!(
            "Gateway verify call failed with HTTP status {}: {}",
            status, body_text
        );
        return Err(PaymentError::ApiError {
            status: status.to_string(),
            message: body_text,
        });
    }

    let envelope: GatewayEnvelope<VerifyTransactionData> = serde_json::from_str(&body_text)?;
    let data = envelope.data.ok_or_else(|| {
        PaymentError::InternalError("Gateway response missing verification data".to_string())
    })?;

    Ok(VerifiedTransaction {
        status: data.status,
        amount_minor_units: data.amount,
    })
}

// --- Webhook Processing Logic ---

/// Computes the HMAC-SHA512 hex signature the gateway attaches to webhook
/// bodies.
fn webhook_signature(secret: &str, body: &[u8]) -> String {
    type HmacSha512 = Hmac<Sha512>;
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies the signature of an incoming webhook request against the raw
/// request body. Comparison happens on the decoded bytes, so casing of the
/// hex digest does not matter.
pub fn verify_webhook_signature(
    secret: &str,
    request_body: &[u8],
    signature_header: Option<&str>,
) -> Result<(), PaymentError> {
    let provided = signature_header.ok_or(PaymentError::WebhookSignatureError)?;
    let expected = webhook_signature(secret, request_body);

    let provided_bytes = hex::decode(provided).map_err(|_| PaymentError::WebhookSignatureError)?;
    let expected_bytes = hex::decode(&expected).expect("locally computed digest is valid hex");

    if provided_bytes == expected_bytes {
        Ok(())
    } else {
        Err(PaymentError::WebhookSignatureError)
    }
}

/// Verifies a webhook body and signature, returning the parsed payload.
pub fn parse_verified_webhook(
    request_body: &[u8],
    signature_header: Option<&str>,
) -> Result<WebhookPayload, PaymentError> {
    let secret = secret_key()?;
    verify_webhook_signature(&secret, request_body, signature_header)?;
    let payload: WebhookPayload = serde_json::from_slice(request_body)?;
    Ok(payload)
}

#[cfg(test)]
pub(crate) fn test_webhook_signature(secret: &str, body: &[u8]) -> String {
    webhook_signature(secret, body)
}
