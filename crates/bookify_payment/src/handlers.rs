// File: crates/bookify_payment/src/handlers.rs
use crate::error::PaymentError;
use crate::logic::{parse_verified_webhook, WebhookPayload, WEBHOOK_SIGNATURE_HEADER};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{Json, Response},
};
use bookify_common::error::{external_service_error, validation_error, BookifyError};
use bookify_common::handle_json_result;
use bookify_common::services::{BoxedError, PaymentService, VerificationStatus};
use bookify_config::AppConfig;
use bookify_db::AppointmentRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

// Shared state for the payment routes
pub struct PaymentState {
    pub config: Arc<AppConfig>,
    pub appointment_repo: Arc<dyn AppointmentRepository>,
    pub gateway: Arc<dyn PaymentService<Error = BoxedError>>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WebhookAck {
    pub received: bool,
}

/// Handler for gateway webhook callbacks.
///
/// A settled charge confirms the matching `pending_payment` appointment.
/// The webhook body is trusted only after its HMAC signature checks out
/// *and* the transaction re-verifies against the gateway itself.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/payment/webhook",
    responses(
        (status = 200, description = "Webhook accepted", body = WebhookAck),
        (status = 401, description = "Signature verification failed"),
        (status = 400, description = "Malformed payload")
    ),
    tag = "Payment"
))]
pub async fn gateway_webhook_handler(
    State(state): State<Arc<PaymentState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, Response> {
    handle_json_result(process_webhook(&state, &headers, &body).await)
}

async fn process_webhook(
    state: &PaymentState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<WebhookAck, BookifyError> {
    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let payload = parse_verified_webhook(body, signature).map_err(|e| match e {
        PaymentError::WebhookSignatureError => {
            warn!("Rejected webhook with missing or invalid signature");
            BookifyError::AuthError("Webhook signature verification failed".to_string())
        }
        other => {
            warn!("Rejected malformed webhook: {}", other);
            validation_error(format!("Malformed webhook payload: {}", other))
        }
    })?;

    match payload.event.as_deref() {
        Some("charge.success") => handle_successful_charge(state, &payload).await?,
        Some("charge.failed") => {
            // The appointment stays in pending_payment; the customer can
            // retry initialization against the same appointment id.
            info!(
                "Payment failed for reference {:?}",
                payload.data.as_ref().and_then(|d| d.reference.as_deref())
            );
        }
        other => {
            debug!("Ignoring unhandled webhook event: {:?}", other);
        }
    }

    Ok(WebhookAck { received: true })
}

async fn handle_successful_charge(
    state: &PaymentState,
    payload: &WebhookPayload,
) -> Result<(), BookifyError> {
    let Some(reference) = payload.data.as_ref().and_then(|d| d.reference.as_deref()) else {
        warn!("charge.success webhook without a transaction reference");
        return Ok(());
    };
    let (Some(tenant_id), Some(appointment_id)) = (payload.tenant_id(), payload.appointment_id())
    else {
        warn!(
            "charge.success webhook for reference {} without appointment metadata",
            reference
        );
        return Ok(());
    };

    // Never trust the webhook body alone: re-verify with the gateway.
    let verification = state
        .gateway
        .verify_transaction(reference)
        .await
        .map_err(|e| external_service_error("payment-gateway", e))?;

    if verification.status != VerificationStatus::Success {
        warn!(
            "charge.success webhook but gateway reports non-success for reference {}",
            reference
        );
        return Ok(());
    }

    let updated = state
        .appointment_repo
        .confirm_paid(tenant_id, appointment_id, reference)
        .await
        .map_err(|e| BookifyError::DatabaseError(e.to_string()))?;

    if updated {
        info!(
            "Appointment {} confirmed by payment reference {}",
            appointment_id, reference
        );
    } else {
        warn!(
            "Payment reference {} names unknown appointment {} in tenant {}",
            reference, appointment_id, tenant_id
        );
    }

    Ok(())
}
