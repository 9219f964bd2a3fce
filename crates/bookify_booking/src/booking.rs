// --- File: crates/bookify_booking/src/booking.rs ---
//! The booking orchestrator.
//!
//! Runs the transactional sequence that turns a selected slot into an
//! appointment: load the service, validate the requested instant,
//! re-derive availability from a fresh read, resolve the customer, insert
//! the appointment under the conflict guard, and hand off to the payment
//! collaborator when the booking is paid online.
//!
//! A failed payment-gateway call never rolls the appointment back: a
//! `pending_payment` row a human can reconcile beats a silently lost
//! booking, and the client can retry initialization against the same
//! appointment id.

use crate::error::BookingError;
use crate::logic::{expanded_window, has_conflict, LockWindow, SlotParams};
use bookify_common::services::{BoxedError, PaymentService};
use bookify_config::AppConfig;
use bookify_db::{
    Appointment, AppointmentInsert, AppointmentRepository, AppointmentStatus, Customer,
    CustomerRepository, NewAppointment, NewCustomer, ScheduleRepository, ServiceRecord,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// How the customer pays for the booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PaymentMethod {
    /// Online deposit through the payment gateway; the appointment starts
    /// out as `pending_payment`.
    Online,
    /// Payment at the venue; the appointment is confirmed immediately.
    AtVenue,
}

/// Customer details collected at checkout.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A booking request as handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub tenant_id: String,
    pub service_id: String,
    pub staff_id: String,
    /// RFC 3339 start instant; validated here, not upstream.
    pub start_time: String,
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    /// The checkout session that may hold a slot lock for this window.
    /// That session's own lock never blocks its booking.
    pub session_id: Option<String>,
}

/// Successful outcome of a booking call.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    /// Pay-at-venue: confirmed immediately.
    Confirmed { appointment: Appointment },
    /// Online payment: the appointment awaits the gateway redirect flow.
    PaymentPending {
        appointment: Appointment,
        redirect_url: String,
        provider_reference: String,
    },
}

/// Orchestrates booking creation and the payment handoff.
pub struct BookingOrchestrator {
    config: Arc<AppConfig>,
    schedule_repo: Arc<dyn ScheduleRepository>,
    appointment_repo: Arc<dyn AppointmentRepository>,
    customer_repo: Arc<dyn CustomerRepository>,
    payment_service: Option<Arc<dyn PaymentService<Error = BoxedError>>>,
}

impl BookingOrchestrator {
    pub fn new(
        config: Arc<AppConfig>,
        schedule_repo: Arc<dyn ScheduleRepository>,
        appointment_repo: Arc<dyn AppointmentRepository>,
        customer_repo: Arc<dyn CustomerRepository>,
        payment_service: Option<Arc<dyn PaymentService<Error = BoxedError>>>,
    ) -> Self {
        Self {
            config,
            schedule_repo,
            appointment_repo,
            customer_repo,
            payment_service,
        }
    }

    /// Create a booking.
    ///
    /// Exactly one appointment row is created per successful call, zero or
    /// one customer row, and zero or one outbound payment-initialization
    /// call. Every earlier availability signal (slot list, slot lock) is a
    /// hint; the conflict re-check performed atomically with the insert is
    /// the authoritative one.
    pub async fn create_booking(
        &self,
        request: BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<BookingOutcome, BookingError> {
        // 1. Service must exist in the tenant.
        let service = self
            .schedule_repo
            .find_service(&request.tenant_id, &request.service_id)
            .await?
            .ok_or(BookingError::ServiceNotFound)?;

        // 2. The requested start must be a real instant.
        let start = DateTime::parse_from_rfc3339(&request.start_time)
            .map_err(|_| {
                BookingError::InvalidInput(format!(
                    "start_time '{}' is not a valid RFC 3339 instant",
                    request.start_time
                ))
            })?
            .with_timezone(&Utc);

        let staff = self
            .schedule_repo
            .find_staff(&request.tenant_id, &request.staff_id)
            .await?
            .ok_or(BookingError::StaffNotFound)?;
        if !staff.is_active {
            return Err(BookingError::SlotUnavailable);
        }

        // 3. Fresh conflict check over appointments, time off and locks.
        let params = SlotParams::for_service(
            &service,
            self.config.default_slot_granularity_minutes(),
        );
        let end = start + params.duration;
        let (window_start, window_end) = expanded_window(start, &params);

        let time_off = self
            .schedule_repo
            .time_off_between(&request.tenant_id, &request.staff_id, window_start, window_end)
            .await?;
        let booked = self
            .appointment_repo
            .booked_intervals(&request.staff_id, window_start, window_end, now)
            .await?;

        let appointments: Vec<(DateTime<Utc>, DateTime<Utc>)> = booked
            .appointments
            .iter()
            .map(|a| (a.start, a.end))
            .collect();
        let blocked: Vec<(DateTime<Utc>, DateTime<Utc>)> =
            time_off.iter().map(|t| (t.start, t.end)).collect();
        let locks: Vec<LockWindow> = booked
            .locks
            .iter()
            .map(|l| LockWindow {
                start: l.start,
                end: l.end,
                session_id: l.session_id.clone(),
                expires_at: l.expires_at,
            })
            .collect();

        if has_conflict(
            window_start,
            window_end,
            &appointments,
            &blocked,
            &locks,
            now,
            request.session_id.as_deref(),
        ) {
            info!(
                "Booking rejected for tenant {} staff {} window [{}, {}): conflict",
                request.tenant_id, request.staff_id, window_start, window_end
            );
            return Err(BookingError::SlotUnavailable);
        }

        // 4. Find-or-create the customer record.
        let customer = self
            .customer_repo
            .find_or_create(NewCustomer {
                tenant_id: request.tenant_id.clone(),
                name: request.customer.name.clone(),
                email: request.customer.email.clone(),
                phone: request.customer.phone.clone(),
            })
            .await
            .map_err(|e| {
                error!(
                    "Customer creation failed for tenant {}: {}",
                    request.tenant_id, e
                );
                BookingError::CustomerCreationFailed(e.to_string())
            })?;

        // 5. Insert under the storage-level conflict guard. A constraint
        //    hit here is the same user outcome as the predicate saying no.
        let status = match request.payment_method {
            PaymentMethod::Online => AppointmentStatus::PendingPayment,
            PaymentMethod::AtVenue => AppointmentStatus::Confirmed,
        };
        let inserted = self
            .appointment_repo
            .insert_if_available(
                NewAppointment {
                    tenant_id: request.tenant_id.clone(),
                    staff_id: request.staff_id.clone(),
                    service_id: request.service_id.clone(),
                    customer_id: customer.id.clone(),
                    start,
                    end,
                    status,
                },
                window_start,
                window_end,
                request.session_id.as_deref(),
                now,
            )
            .await
            .map_err(|e| {
                error!(
                    "Appointment insert failed for tenant {} staff {} window [{}, {}): {}",
                    request.tenant_id, request.staff_id, window_start, window_end, e
                );
                e
            })?;
        let appointment = match inserted {
            AppointmentInsert::Created(appointment) => appointment,
            AppointmentInsert::Conflict => return Err(BookingError::SlotUnavailable),
        };

        // 6./7. Payment handoff or immediate confirmation.
        match request.payment_method {
            PaymentMethod::AtVenue => Ok(BookingOutcome::Confirmed { appointment }),
            PaymentMethod::Online => {
                self.start_payment(&service, &customer, appointment).await
            }
        }
    }

    /// Re-initialize payment for an existing `pending_payment` appointment.
    ///
    /// Used after a failed gateway call; it never creates a second
    /// appointment.
    pub async fn initialize_payment(
        &self,
        tenant_id: &str,
        appointment_id: &str,
    ) -> Result<BookingOutcome, BookingError> {
        let appointment = self
            .appointment_repo
            .find_by_id(tenant_id, appointment_id)
            .await?
            .ok_or(BookingError::AppointmentNotFound)?;
        if appointment.status != AppointmentStatus::PendingPayment {
            return Err(BookingError::InvalidInput(
                "appointment is not awaiting payment".to_string(),
            ));
        }

        let service = self
            .schedule_repo
            .find_service(tenant_id, &appointment.service_id)
            .await?
            .ok_or(BookingError::ServiceNotFound)?;
        let customer = self
            .customer_repo
            .find_by_id(tenant_id, &appointment.customer_id)
            .await?
            .ok_or_else(|| {
                BookingError::InvalidInput("appointment has no customer record".to_string())
            })?;

        self.start_payment(&service, &customer, appointment).await
    }

    /// Explicit cancel transition. Cancelled appointments stop blocking
    /// conflict checks immediately.
    pub async fn cancel_booking(
        &self,
        tenant_id: &str,
        appointment_id: &str,
    ) -> Result<(), BookingError> {
        let updated = self
            .appointment_repo
            .update_status(tenant_id, appointment_id, AppointmentStatus::Cancelled)
            .await?;
        if !updated {
            return Err(BookingError::AppointmentNotFound);
        }
        info!("Appointment {} cancelled", appointment_id);
        Ok(())
    }

    async fn start_payment(
        &self,
        service: &ServiceRecord,
        customer: &Customer,
        appointment: Appointment,
    ) -> Result<BookingOutcome, BookingError> {
        let Some(payment_service) = self.payment_service.as_ref() else {
            warn!("Online booking requested but no payment gateway is configured");
            return Err(BookingError::PaymentInitializationFailed {
                appointment_id: appointment.id,
                reason: "payment gateway is not configured".to_string(),
            });
        };
        let callback_url = self
            .config
            .payment
            .as_ref()
            .map(|p| p.callback_url.clone())
            .unwrap_or_default();

        let metadata = json!({
            "appointment_id": appointment.id,
            "tenant_id": appointment.tenant_id,
            "service_id": appointment.service_id,
        });

        match payment_service
            .initialize_transaction(
                &customer.email,
                service.price_minor_units,
                metadata,
                &callback_url,
            )
            .await
        {
            Ok(init) => {
                self.appointment_repo
                    .set_payment_reference(
                        &appointment.tenant_id,
                        &appointment.id,
                        &init.provider_reference,
                    )
                    .await?;
                info!(
                    "Payment initialized for appointment {} (reference {})",
                    appointment.id, init.provider_reference
                );
                Ok(BookingOutcome::PaymentPending {
                    appointment,
                    redirect_url: init.redirect_url,
                    provider_reference: init.provider_reference,
                })
            }
            Err(e) => {
                // The appointment stays in pending_payment on purpose; the
                // client retries initialization against the same id.
                error!(
                    "Payment initialization failed for appointment {}: {}",
                    appointment.id, e
                );
                Err(BookingError::PaymentInitializationFailed {
                    appointment_id: appointment.id,
                    reason: e.to_string(),
                })
            }
        }
    }
}
