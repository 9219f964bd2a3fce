// --- File: crates/bookify_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Bookify errors.
///
/// This enum provides a common set of error variants that can be used across
/// all crates. Each crate can extend this by implementing
/// From<SpecificError> for BookifyError.
#[derive(Error, Debug)]
pub enum BookifyError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a conflict (e.g., an interval already taken)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BookifyError {
    fn status_code(&self) -> u16 {
        match self {
            BookifyError::HttpError(_) => 500,
            BookifyError::ParseError(_) => 400,
            BookifyError::ConfigError(_) => 500,
            BookifyError::AuthError(_) => 401,
            BookifyError::ValidationError(_) => 400,
            BookifyError::DatabaseError(_) => 500,
            BookifyError::ExternalServiceError { .. } => 502,
            BookifyError::ConflictError(_) => 409,
            BookifyError::NotFoundError(_) => 404,
            BookifyError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, BookifyError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, BookifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, BookifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| BookifyError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, BookifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| BookifyError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Common error conversions
impl From<reqwest::Error> for BookifyError {
    fn from(err: reqwest::Error) -> Self {
        BookifyError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for BookifyError {
    fn from(err: serde_json::Error) -> Self {
        BookifyError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> BookifyError {
    BookifyError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> BookifyError {
    BookifyError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> BookifyError {
    BookifyError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> BookifyError {
    BookifyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> BookifyError {
    BookifyError::InternalError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(conflict("slot taken").status_code(), 409);
        assert_eq!(not_found("service").status_code(), 404);
        assert_eq!(validation_error("bad time").status_code(), 400);
        assert_eq!(
            external_service_error("payment-gateway", "timeout").status_code(),
            502
        );
        assert_eq!(internal_error("boom").status_code(), 500);
    }

    #[test]
    fn context_wraps_foreign_errors() {
        let io: Result<(), std::io::Error> = Err(std::io::Error::other("disk gone"));
        let err = io.context("reading schedule").unwrap_err();
        assert!(err.to_string().contains("reading schedule"));
    }
}
