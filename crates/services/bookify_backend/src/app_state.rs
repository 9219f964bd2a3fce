// --- File: crates/services/bookify_backend/src/app_state.rs ---
use crate::service_factory::BookifyServiceFactory;
use bookify_common::services::ServiceFactory;
use bookify_config::AppConfig;
use bookify_db::{
    AppointmentRepository, CustomerRepository, DbClient, DbClientFactory, ScheduleRepository,
    SlotLockRepository, SqlAppointmentRepository, SqlCustomerRepository, SqlScheduleRepository,
    SqlSlotLockRepository,
};
use std::sync::Arc;
use tracing::info;

/// Application state shared across all routes.
///
/// Holds the configuration, the database client the routers build their
/// repositories from, and the service factory for external collaborators.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_client: DbClient,
    pub service_factory: Arc<BookifyServiceFactory>,
}

impl AppState {
    /// Create the application state: connect to the database, make sure the
    /// schema exists, and initialize the configured collaborators.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, Box<dyn std::error::Error>> {
        let db_client = DbClientFactory::new().from_app_config(&config).await?;

        // Schema bootstrap is idempotent; every repository creates its own
        // tables when they are missing.
        SqlScheduleRepository::new(db_client.clone()).init_schema().await?;
        SqlAppointmentRepository::new(db_client.clone()).init_schema().await?;
        SqlSlotLockRepository::new(db_client.clone()).init_schema().await?;
        SqlCustomerRepository::new(db_client.clone()).init_schema().await?;
        info!("Database schema ready");

        let service_factory = Arc::new(BookifyServiceFactory::new(config.clone()));
        if service_factory.payment_service().is_none() {
            info!("No payment gateway configured; online payment bookings are disabled");
        }

        Ok(Self {
            config,
            db_client,
            service_factory,
        })
    }
}
