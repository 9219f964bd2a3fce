// --- File: crates/bookify_booking/src/auth.rs ---
//! Shared-secret guard for the housekeeping entry point.
//!
//! The cleanup sweep is the one operation that legitimately crosses tenant
//! boundaries, so it runs under its own capability: an internal route that
//! is never reachable through the tenant-scoped paths and requires a
//! shared secret presented in the `X-Internal-Auth-Secret` header.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bookify_config::AppConfig;
use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use tracing::{error, warn};

/// State for the housekeeping auth middleware.
#[derive(Clone)]
pub struct HousekeepingAuthState {
    pub config: Arc<AppConfig>,
}

const INTERNAL_AUTH_HEADER: &str = "X-Internal-Auth-Secret";

/// Axum middleware authenticating internal housekeeping requests.
pub async fn housekeeping_auth_middleware(
    State(auth_state): State<Arc<HousekeepingAuthState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected_secret = match auth_state
        .config
        .housekeeping
        .as_ref()
        .and_then(|h| h.shared_secret.clone())
    {
        Some(secret) => secret,
        None => {
            error!("Housekeeping shared secret not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error for housekeeping auth.".to_string(),
            )
                .into_response();
        }
    };

    let provided_secret = req
        .headers()
        .get(INTERNAL_AUTH_HEADER)
        .and_then(|value| value.to_str().ok());

    match provided_secret {
        Some(value) if constant_time_eq(value.as_bytes(), expected_secret.as_bytes()) => {
            next.run(req).await
        }
        _ => {
            warn!("Rejected housekeeping request with missing or invalid secret");
            (
                StatusCode::UNAUTHORIZED,
                "Invalid or missing internal auth secret.".to_string(),
            )
                .into_response()
        }
    }
}
