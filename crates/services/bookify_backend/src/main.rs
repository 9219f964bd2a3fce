// File: crates/services/bookify_backend/src/main.rs
use axum::{routing::get, Router};
use bookify_booking::routes as booking_routes;
use bookify_common::services::ServiceFactory;
use bookify_config::load_config;
use bookify_db::SlotLockRepository;
use bookify_db::SqlSlotLockRepository;
#[cfg(feature = "payment")]
use bookify_payment::routes as payment_routes;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

mod app_state;
mod service_factory;

use app_state::AppState;

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    bookify_common::logging::init();

    let state = AppState::new(config.clone())
        .await
        .expect("Failed to initialize application state");

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Bookify API!" }))
        .with_state(config.clone());

    let booking_router = booking_routes::routes(
        config.clone(),
        state.db_client.clone(),
        state.service_factory.payment_service(),
    );

    #[cfg(feature = "payment")]
    let payment_router = if config.use_payment && config.payment.is_some() {
        Some(payment_routes::routes(config.clone(), state.db_client.clone()))
    } else {
        None
    };

    let api_router = Router::new().nest("/api", {
        #[allow(unused_mut)]
        let mut router = api_router.merge(booking_router);
        #[cfg(feature = "payment")]
        {
            if let Some(payment_router) = payment_router {
                router = router.merge(payment_router);
            }
        }
        router
    });

    #[allow(unused_mut)]
    let mut app = api_router.layer(tower_http::trace::TraceLayer::new_for_http());

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use bookify_booking::doc::BookingApiDoc;
        #[cfg(feature = "payment")]
        use bookify_payment::doc::PaymentApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        // Define the Merged OpenAPI Documentation struct
        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Bookify API",
                version = "0.1.0",
                description = "Bookify appointment-booking API Docs",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            components(),
            tags( (name = "Bookify", description = "Core booking endpoints")),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        #[allow(unused_mut)]
        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        #[cfg(feature = "payment")]
        openapi_doc.merge(PaymentApiDoc::openapi());
        info!("📖 Adding Swagger UI at /api/docs");

        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc.clone());
        app = app.merge(swagger_ui);
    }

    // The only background actor in the system: the fixed-interval cleanup
    // sweep deleting expired slot locks across all tenants. The predicate
    // already ignores expired locks, so sweep cadence is a storage concern,
    // not a correctness one.
    let sweep_interval = state
        .config
        .housekeeping
        .as_ref()
        .and_then(|h| h.sweep_interval_seconds)
        .unwrap_or(120);
    let sweep_repo = SqlSlotLockRepository::new(state.db_client.clone());
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_interval));
        loop {
            interval.tick().await;
            match sweep_repo.delete_expired(Utc::now()).await {
                Ok(removed) if removed > 0 => {
                    info!("Cleanup sweep removed {} expired slot locks", removed)
                }
                Ok(_) => {}
                Err(e) => error!("Cleanup sweep failed: {}", e),
            }
        }
    });

    // Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
