// --- File: crates/bookify_payment/src/routes.rs ---

use crate::handlers::{gateway_webhook_handler, PaymentState};
use crate::service::GatewayPaymentService;
use axum::{routing::post, Router};
use bookify_common::services::{BoxedError, PaymentService};
use bookify_config::AppConfig;
use bookify_db::{AppointmentRepository, DbClient, SqlAppointmentRepository};
use std::sync::Arc;

/// Creates a router containing all routes for the payment feature.
pub fn routes(config: Arc<AppConfig>, db_client: DbClient) -> Router {
    let payment_config = config
        .payment
        .clone()
        .expect("Payment config missing");
    let gateway: Arc<dyn PaymentService<Error = BoxedError>> =
        Arc::new(GatewayPaymentService::new(payment_config));
    let appointment_repo: Arc<dyn AppointmentRepository> =
        Arc::new(SqlAppointmentRepository::new(db_client));

    let state = Arc::new(PaymentState {
        config,
        appointment_repo,
        gateway,
    });

    Router::new()
        .route("/payment/webhook", post(gateway_webhook_handler))
        .with_state(state)
}
