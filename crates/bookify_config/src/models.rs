// --- File: crates/bookify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. DATABASE_URL loaded via APP_DATABASE__URL or DATABASE_URL
}

// --- Scheduling Config ---
// Tenant-independent scheduling knobs. Per-service values override these.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// IANA timezone used for slot-boundary alignment, e.g. "Europe/Zurich".
    pub time_zone: Option<String>,
    /// Step between candidate slot starts, in minutes. Must not exceed the
    /// shortest service duration offered.
    pub slot_granularity_minutes: Option<i64>,
    /// Lifetime of a slot lock, in minutes.
    pub lock_ttl_minutes: Option<i64>,
}

// --- Payment Gateway Config ---
// Holds non-secret gateway config. Secret key loaded directly from env var:
// PAYMENT_GATEWAY_SECRET_KEY
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PaymentConfig {
    pub base_url: String,     // Mandatory
    pub callback_url: String, // Mandatory
    pub currency: Option<String>,
}

// --- Housekeeping Config ---
// The cleanup sweep runs outside any tenant scope; its HTTP trigger is
// guarded by a shared secret. Secret loaded from env var:
// HOUSEKEEPING_SHARED_SECRET (or the "secret_from_env" marker).
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HousekeepingConfig {
    pub sweep_interval_seconds: Option<u64>,
    pub shared_secret: Option<String>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_payment: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub scheduling: Option<SchedulingConfig>,
    #[serde(default)]
    pub payment: Option<PaymentConfig>,
    #[serde(default)]
    pub housekeeping: Option<HousekeepingConfig>,
}

impl AppConfig {
    /// Slot granularity fallback used when a service does not carry its own.
    pub fn default_slot_granularity_minutes(&self) -> i64 {
        self.scheduling
            .as_ref()
            .and_then(|s| s.slot_granularity_minutes)
            .unwrap_or(15)
    }

    /// Slot-lock lifetime in minutes.
    pub fn lock_ttl_minutes(&self) -> i64 {
        self.scheduling
            .as_ref()
            .and_then(|s| s.lock_ttl_minutes)
            .unwrap_or(10)
    }

    /// Display timezone name; storage is always UTC.
    pub fn time_zone(&self) -> &str {
        self.scheduling
            .as_ref()
            .and_then(|s| s.time_zone.as_deref())
            .unwrap_or("Europe/Zurich")
    }
}
