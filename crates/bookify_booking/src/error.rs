// --- File: crates/bookify_booking/src/error.rs ---

use bookify_db::DbError;
use thiserror::Error;

/// Errors produced by the availability engine, the slot-lock manager and
/// the booking orchestrator.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Service not found")]
    ServiceNotFound,
    #[error("Staff member not found")]
    StaffNotFound,
    #[error("Appointment not found")]
    AppointmentNotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Slot is no longer available")]
    SlotUnavailable,
    #[error("Failed to create customer record: {0}")]
    CustomerCreationFailed(String),
    #[error("Payment initialization failed for appointment {appointment_id}: {reason}")]
    PaymentInitializationFailed {
        appointment_id: String,
        reason: String,
    },
    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),
}

impl BookingError {
    /// HTTP status the error maps to at the API boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            BookingError::ServiceNotFound
            | BookingError::StaffNotFound
            | BookingError::AppointmentNotFound => 404,
            BookingError::InvalidInput(_) => 400,
            BookingError::SlotUnavailable => 409,
            BookingError::PaymentInitializationFailed { .. } => 502,
            BookingError::CustomerCreationFailed(_) | BookingError::Storage(_) => 500,
        }
    }

    /// The user-facing reason string. The corrective action differs per
    /// case, so the wording must distinguish a lost slot from a payment
    /// problem from bad details.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::ServiceNotFound => "The requested service does not exist.".to_string(),
            BookingError::StaffNotFound => "The requested staff member does not exist.".to_string(),
            BookingError::AppointmentNotFound => "The appointment does not exist.".to_string(),
            BookingError::InvalidInput(reason) => {
                format!("Some booking details are invalid: {}. Please check and resubmit.", reason)
            }
            BookingError::SlotUnavailable => {
                "Someone else just took this slot. Please pick another time.".to_string()
            }
            BookingError::CustomerCreationFailed(_) => {
                "We could not save your details. Please try again.".to_string()
            }
            BookingError::PaymentInitializationFailed { .. } => {
                "Your appointment is reserved but payment could not start. Please retry the payment."
                    .to_string()
            }
            BookingError::Storage(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}
