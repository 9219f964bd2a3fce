// --- File: crates/bookify_booking/src/routes.rs ---

use crate::auth::{housekeeping_auth_middleware, HousekeepingAuthState};
use crate::availability::AvailabilityService;
use crate::booking::BookingOrchestrator;
use crate::handlers::{
    acquire_lock_handler, cancel_booking_handler, create_booking_handler, list_slots_handler,
    retry_payment_handler, run_lock_cleanup_handler, BookingState,
};
use crate::locks::SlotLockManager;
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use bookify_common::services::{BoxedError, PaymentService};
use bookify_config::AppConfig;
use bookify_db::{
    AppointmentRepository, CustomerRepository, DbClient, ScheduleRepository, SlotLockRepository,
    SqlAppointmentRepository, SqlCustomerRepository, SqlScheduleRepository, SqlSlotLockRepository,
};
use std::sync::Arc;

/// Creates a router containing all routes for the booking feature.
///
/// The tenant-facing routes and the internal housekeeping route share one
/// state, but the housekeeping route sits behind its own shared-secret
/// middleware and is never reachable through the tenant-scoped paths.
pub fn routes(
    config: Arc<AppConfig>,
    db_client: DbClient,
    payment_service: Option<Arc<dyn PaymentService<Error = BoxedError>>>,
) -> Router {
    let schedule_repo: Arc<dyn ScheduleRepository> =
        Arc::new(SqlScheduleRepository::new(db_client.clone()));
    let appointment_repo: Arc<dyn AppointmentRepository> =
        Arc::new(SqlAppointmentRepository::new(db_client.clone()));
    let lock_repo: Arc<dyn SlotLockRepository> =
        Arc::new(SqlSlotLockRepository::new(db_client.clone()));
    let customer_repo: Arc<dyn CustomerRepository> =
        Arc::new(SqlCustomerRepository::new(db_client));

    let state = Arc::new(BookingState {
        config: config.clone(),
        availability: AvailabilityService::new(
            config.clone(),
            schedule_repo.clone(),
            appointment_repo.clone(),
        ),
        locks: SlotLockManager::new(config.clone(), schedule_repo.clone(), lock_repo),
        orchestrator: BookingOrchestrator::new(
            config.clone(),
            schedule_repo,
            appointment_repo,
            customer_repo,
            payment_service,
        ),
    });

    let auth_state = Arc::new(HousekeepingAuthState {
        config: config.clone(),
    });
    let internal_routes = Router::new()
        .route("/internal/locks/cleanup", post(run_lock_cleanup_handler))
        .layer(middleware::from_fn_with_state(
            auth_state,
            housekeeping_auth_middleware,
        ))
        .with_state(state.clone());

    Router::new()
        .route("/booking/slots", get(list_slots_handler))
        .route("/booking/locks", post(acquire_lock_handler))
        .route("/booking/bookings", post(create_booking_handler))
        .route(
            "/booking/bookings/{appointment_id}/payment",
            post(retry_payment_handler),
        )
        .route(
            "/admin/bookings/{appointment_id}/cancel",
            patch(cancel_booking_handler),
        )
        .with_state(state)
        .merge(internal_routes)
}
