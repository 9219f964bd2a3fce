// --- File: crates/services/bookify_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Hands external collaborators to the request path behind the
//! `ServiceFactory` trait, so handlers never know which concrete gateway
//! is configured (or whether one is configured at all).

use bookify_common::services::{BoxedError, PaymentService, ServiceFactory};
use bookify_config::AppConfig;
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(feature = "payment")]
use bookify_payment::GatewayPaymentService;

/// Service factory for the backend binary.
pub struct BookifyServiceFactory {
    #[allow(dead_code)] // kept so later collaborators can be built lazily
    config: Arc<AppConfig>,
    payment_service: Option<Arc<dyn PaymentService<Error = BoxedError>>>,
}

impl BookifyServiceFactory {
    /// Create a new service factory, initializing collaborators according
    /// to the runtime flags in the configuration.
    pub fn new(config: Arc<AppConfig>) -> Self {
        #[allow(unused_mut)]
        let mut payment_service: Option<Arc<dyn PaymentService<Error = BoxedError>>> = None;

        #[cfg(feature = "payment")]
        {
            if config.use_payment {
                match config.payment.as_ref() {
                    Some(payment_config) => {
                        info!("ℹ️ Initializing payment gateway service...");
                        payment_service = Some(Arc::new(GatewayPaymentService::new(
                            payment_config.clone(),
                        )));
                    }
                    None => {
                        warn!("use_payment is set but the payment config section is missing");
                    }
                }
            }
        }

        #[cfg(not(feature = "payment"))]
        {
            if config.use_payment {
                warn!("use_payment is set but the binary was built without the payment feature");
            }
        }

        Self {
            config,
            payment_service,
        }
    }
}

impl ServiceFactory for BookifyServiceFactory {
    fn payment_service(&self) -> Option<Arc<dyn PaymentService<Error = BoxedError>>> {
        self.payment_service.clone()
    }
}
