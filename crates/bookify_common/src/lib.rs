// --- File: crates/bookify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error;    // Error handling
pub mod http;     // HTTP utilities
pub mod logging;  // Logging utilities
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    conflict, external_service_error, internal_error, not_found, validation_error, BookifyError,
    Context, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{client::HTTP_CLIENT, handle_json_result, IntoHttpResponse};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error};
