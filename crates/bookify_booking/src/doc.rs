// File: crates/bookify_booking/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::booking::{CustomerInfo, PaymentMethod};
use crate::handlers::{
    AcquireLockRequest, BookingResponse, CancelBookingRequest, CancellationResponse,
    CleanupResponse, CreateBookingRequest, LockResponse, RetryPaymentRequest, SlotView,
    SlotsResponse,
};

/// Merged OpenAPI documentation for the booking feature.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::list_slots_handler,
        crate::handlers::acquire_lock_handler,
        crate::handlers::create_booking_handler,
        crate::handlers::retry_payment_handler,
        crate::handlers::cancel_booking_handler,
        crate::handlers::run_lock_cleanup_handler,
    ),
    components(schemas(
        SlotView,
        SlotsResponse,
        AcquireLockRequest,
        LockResponse,
        CreateBookingRequest,
        BookingResponse,
        RetryPaymentRequest,
        CancelBookingRequest,
        CancellationResponse,
        CleanupResponse,
        CustomerInfo,
        PaymentMethod,
    )),
    tags(
        (name = "Booking", description = "Slot listing, slot locks and booking creation"),
        (name = "Housekeeping", description = "Internal cross-tenant maintenance")
    )
)]
pub struct BookingApiDoc;
