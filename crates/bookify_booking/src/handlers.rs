// File: crates/bookify_booking/src/handlers.rs
use crate::availability::AvailabilityService;
use crate::booking::{BookingOrchestrator, BookingOutcome, BookingRequest, CustomerInfo, PaymentMethod};
use crate::error::BookingError;
use crate::locks::SlotLockManager;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bookify_config::AppConfig;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};

// Shared state for the booking routes
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub availability: AvailabilityService,
    pub locks: SlotLockManager,
    pub orchestrator: BookingOrchestrator,
}

// --- Wire types ---

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct SlotsQuery {
    pub tenant_id: String,
    pub service_id: String,
    /// Calendar day in YYYY-MM-DD format, interpreted in the tenant timezone
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-06-02"))]
    pub date: String,
    /// IANA timezone override; defaults to the configured tenant timezone
    pub time_zone: Option<String>,
    /// Restrict to one staff member; omitted means every eligible staff member
    pub staff_id: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotView {
    #[cfg_attr(feature = "openapi", schema(example = "2025-06-02T09:00:00+00:00"))]
    pub start_time: String, // ISO 8601 format
    #[cfg_attr(feature = "openapi", schema(example = "2025-06-02T09:30:00+00:00"))]
    pub end_time: String, // ISO 8601 format
    pub available: bool,
    pub staff_id: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotsResponse {
    pub slots: Vec<SlotView>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AcquireLockRequest {
    pub tenant_id: String,
    pub staff_id: String,
    pub service_id: String,
    /// RFC 3339 start instant of the raw slot (before buffer expansion)
    pub start_time: String,
    /// Opaque checkout-session identity holding the lock
    pub session_id: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LockResponse {
    pub lock_id: String,
    pub staff_id: String,
    pub start_time: String,
    pub end_time: String,
    pub expires_at: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateBookingRequest {
    pub tenant_id: String,
    pub service_id: String,
    pub staff_id: String,
    pub start_time: String,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub session_id: Option<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingResponse {
    /// "confirmed", "payment_pending" or "payment_failed"
    pub status: String,
    pub appointment_id: Option<String>,
    pub redirect_url: Option<String>,
    pub message: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RetryPaymentRequest {
    pub tenant_id: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancelBookingRequest {
    pub tenant_id: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CleanupResponse {
    pub removed: u64,
}

fn error_response(error: &BookingError) -> (StatusCode, String) {
    (
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        error.user_message(),
    )
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, (StatusCode, String)> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("'{}' is not a valid RFC 3339 instant", value),
            )
        })
}

/// Handler to list a day's candidate slots.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/booking/slots",
    params(SlotsQuery),
    responses(
        (status = 200, description = "Candidate slots with availability flags", body = SlotsResponse),
        (status = 400, description = "Bad request (invalid date or timezone)"),
        (status = 404, description = "Service or staff member not found")
    ),
    tag = "Booking"
))]
pub async fn list_slots_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, (StatusCode, String)> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            "Invalid date format (YYYY-MM-DD)".to_string(),
        )
    })?;

    let tz = match &query.time_zone {
        Some(name) => Tz::from_str(name)
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("Unknown timezone: {}", name)))?,
        None => Tz::from_str(state.config.time_zone()).unwrap_or(Tz::Europe__Zurich),
    };

    let result = state
        .availability
        .list_slots(
            &query.tenant_id,
            &query.service_id,
            date,
            tz,
            query.staff_id.as_deref(),
            Utc::now(),
        )
        .await;

    match result {
        Ok(slots) => Ok(Json(SlotsResponse {
            slots: slots
                .into_iter()
                .map(|slot| SlotView {
                    start_time: slot.start.with_timezone(&tz).to_rfc3339(),
                    end_time: slot.end.with_timezone(&tz).to_rfc3339(),
                    available: slot.available,
                    staff_id: slot.staff_id,
                })
                .collect(),
        })),
        // A broken store degrades to "no slots available" rather than an
        // error page; missing entities are still real errors.
        Err(BookingError::Storage(e)) => {
            error!(
                "Slot listing degraded to empty for tenant {} service {} on {}: {}",
                query.tenant_id, query.service_id, query.date, e
            );
            Ok(Json(SlotsResponse { slots: Vec::new() }))
        }
        Err(e) => Err(error_response(&e)),
    }
}

/// Handler to acquire a slot lock for a checkout session.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/locks",
    request_body = AcquireLockRequest,
    responses(
        (status = 200, description = "Lock acquired", body = LockResponse),
        (status = 409, description = "Slot already taken or locked by another session"),
        (status = 404, description = "Service or staff member not found")
    ),
    tag = "Booking"
))]
pub async fn acquire_lock_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<AcquireLockRequest>,
) -> Result<Json<LockResponse>, (StatusCode, String)> {
    let start = parse_instant(&request.start_time)?;

    let lock = state
        .locks
        .acquire(
            &request.tenant_id,
            &request.staff_id,
            &request.service_id,
            start,
            &request.session_id,
            Utc::now(),
        )
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(LockResponse {
        lock_id: lock.id,
        staff_id: lock.staff_id,
        start_time: lock.start.to_rfc3339(),
        end_time: lock.end.to_rfc3339(),
        expires_at: lock.expires_at.to_rfc3339(),
    }))
}

fn booking_outcome_response(outcome: BookingOutcome) -> BookingResponse {
    match outcome {
        BookingOutcome::Confirmed { appointment } => BookingResponse {
            status: "confirmed".to_string(),
            appointment_id: Some(appointment.id),
            redirect_url: None,
            message: "Appointment booked successfully.".to_string(),
        },
        BookingOutcome::PaymentPending {
            appointment,
            redirect_url,
            ..
        } => BookingResponse {
            status: "payment_pending".to_string(),
            appointment_id: Some(appointment.id),
            redirect_url: Some(redirect_url),
            message: "Appointment reserved. Complete payment to confirm.".to_string(),
        },
    }
}

fn booking_error_body(error: BookingError) -> (StatusCode, Json<BookingResponse>) {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let appointment_id = match &error {
        BookingError::PaymentInitializationFailed { appointment_id, .. } => {
            Some(appointment_id.clone())
        }
        _ => None,
    };
    let wire_status = match &error {
        BookingError::PaymentInitializationFailed { .. } => "payment_failed",
        _ => "error",
    };
    (
        status,
        Json(BookingResponse {
            status: wire_status.to_string(),
            appointment_id,
            redirect_url: None,
            message: error.user_message(),
        }),
    )
}

/// Handler to create a booking.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking result", body = BookingResponse),
        (status = 409, description = "Slot was taken in the meantime", body = BookingResponse),
        (status = 502, description = "Payment could not start; the appointment is kept for retry", body = BookingResponse)
    ),
    tag = "Booking"
))]
pub async fn create_booking_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, Json<BookingResponse>)> {
    let outcome = state
        .orchestrator
        .create_booking(
            BookingRequest {
                tenant_id: request.tenant_id,
                service_id: request.service_id,
                staff_id: request.staff_id,
                start_time: request.start_time,
                customer: request.customer,
                payment_method: request.payment_method,
                session_id: request.session_id,
            },
            Utc::now(),
        )
        .await
        .map_err(booking_error_body)?;

    Ok(Json(booking_outcome_response(outcome)))
}

/// Handler to retry payment initialization for a pending appointment.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/booking/bookings/{appointment_id}/payment",
    params(("appointment_id" = String, Path, description = "The appointment awaiting payment")),
    request_body = RetryPaymentRequest,
    responses(
        (status = 200, description = "Payment re-initialized", body = BookingResponse),
        (status = 404, description = "Appointment not found", body = BookingResponse)
    ),
    tag = "Booking"
))]
pub async fn retry_payment_handler(
    State(state): State<Arc<BookingState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RetryPaymentRequest>,
) -> Result<Json<BookingResponse>, (StatusCode, Json<BookingResponse>)> {
    let outcome = state
        .orchestrator
        .initialize_payment(&request.tenant_id, &appointment_id)
        .await
        .map_err(booking_error_body)?;

    Ok(Json(booking_outcome_response(outcome)))
}

/// Handler to cancel a booking. Cancelled appointments free their interval
/// immediately.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/admin/bookings/{appointment_id}/cancel",
    params(("appointment_id" = String, Path, description = "The appointment to cancel")),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Cancellation result", body = CancellationResponse),
        (status = 404, description = "Appointment not found")
    ),
    tag = "Booking"
))]
pub async fn cancel_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<CancellationResponse>, (StatusCode, String)> {
    state
        .orchestrator
        .cancel_booking(&request.tenant_id, &appointment_id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(CancellationResponse {
        success: true,
        message: "Appointment cancelled.".to_string(),
    }))
}

/// Housekeeping handler: delete expired slot locks across all tenants.
/// Reached only through the internal, shared-secret-guarded route.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/internal/locks/cleanup",
    responses(
        (status = 200, description = "Number of locks removed", body = CleanupResponse),
        (status = 401, description = "Missing or invalid internal auth secret")
    ),
    tag = "Housekeeping"
))]
pub async fn run_lock_cleanup_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<CleanupResponse>, (StatusCode, String)> {
    let removed = state
        .locks
        .run_cleanup(Utc::now())
        .await
        .map_err(|e| error_response(&e))?;

    info!("Lock cleanup sweep removed {} rows", removed);
    Ok(Json(CleanupResponse { removed }))
}
