//! Shared doubles and fixtures for the booking tests.

use async_trait::async_trait;
use bookify_common::services::{
    BoxFuture, BoxedError, PaymentInitResult, PaymentService, PaymentVerification,
    VerificationStatus,
};
use bookify_config::{AppConfig, ServerConfig};
use bookify_db::{
    Appointment, AppointmentInsert, AppointmentRepository, AppointmentStatus, BookedIntervals,
    Customer, CustomerRepository, DbError, NewAppointment, NewCustomer, NewSlotLock,
    ScheduleRepository, ServiceRecord, SlotLockInsert, SlotLockRepository, StaffMember,
    TimeOffBlock, WorkingHoursRow,
};
use chrono::{DateTime, TimeZone, Utc};
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mock! {
    pub ScheduleRepo {}

    #[async_trait]
    impl ScheduleRepository for ScheduleRepo {
        async fn init_schema(&self) -> Result<(), DbError>;
        async fn find_service(
            &self,
            tenant_id: &str,
            service_id: &str,
        ) -> Result<Option<ServiceRecord>, DbError>;
        async fn find_staff(
            &self,
            tenant_id: &str,
            staff_id: &str,
        ) -> Result<Option<StaffMember>, DbError>;
        async fn staff_for_service(
            &self,
            tenant_id: &str,
            service_id: &str,
        ) -> Result<Vec<StaffMember>, DbError>;
        async fn working_hours(
            &self,
            staff_id: &str,
            day_of_week: i64,
        ) -> Result<Vec<WorkingHoursRow>, DbError>;
        async fn time_off_between(
            &self,
            tenant_id: &str,
            staff_id: &str,
            from: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> Result<Vec<TimeOffBlock>, DbError>;
    }
}

mock! {
    pub AppointmentRepo {}

    #[async_trait]
    impl AppointmentRepository for AppointmentRepo {
        async fn init_schema(&self) -> Result<(), DbError>;
        async fn find_by_id(
            &self,
            tenant_id: &str,
            appointment_id: &str,
        ) -> Result<Option<Appointment>, DbError>;
        async fn booked_intervals(
            &self,
            staff_id: &str,
            from: DateTime<Utc>,
            until: DateTime<Utc>,
            now: DateTime<Utc>,
        ) -> Result<BookedIntervals, DbError>;
        #[mockall::concretize]
        async fn insert_if_available(
            &self,
            appointment: NewAppointment,
            check_start: DateTime<Utc>,
            check_end: DateTime<Utc>,
            exempt_session: Option<&str>,
            now: DateTime<Utc>,
        ) -> Result<AppointmentInsert, DbError>;
        async fn update_status(
            &self,
            tenant_id: &str,
            appointment_id: &str,
            status: AppointmentStatus,
        ) -> Result<bool, DbError>;
        async fn set_payment_reference(
            &self,
            tenant_id: &str,
            appointment_id: &str,
            reference: &str,
        ) -> Result<bool, DbError>;
        async fn confirm_paid(
            &self,
            tenant_id: &str,
            appointment_id: &str,
            reference: &str,
        ) -> Result<bool, DbError>;
    }
}

mock! {
    pub SlotLockRepo {}

    #[async_trait]
    impl SlotLockRepository for SlotLockRepo {
        async fn init_schema(&self) -> Result<(), DbError>;
        async fn insert_if_available(
            &self,
            lock: NewSlotLock,
            now: DateTime<Utc>,
        ) -> Result<SlotLockInsert, DbError>;
        async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, DbError>;
    }
}

mock! {
    pub CustomerRepo {}

    #[async_trait]
    impl CustomerRepository for CustomerRepo {
        async fn init_schema(&self) -> Result<(), DbError>;
        async fn find_or_create(&self, customer: NewCustomer) -> Result<Customer, DbError>;
        async fn find_by_id(
            &self,
            tenant_id: &str,
            customer_id: &str,
        ) -> Result<Option<Customer>, DbError>;
    }
}

/// Configurable in-memory payment gateway double that counts its calls.
pub struct FakePaymentService {
    pub fail_initialize: bool,
    pub initialize_calls: AtomicUsize,
}

impl FakePaymentService {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            fail_initialize: false,
            initialize_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_initialize: true,
            initialize_calls: AtomicUsize::new(0),
        })
    }

    pub fn initialize_call_count(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }
}

impl PaymentService for FakePaymentService {
    type Error = BoxedError;

    fn initialize_transaction(
        &self,
        _email: &str,
        amount_minor_units: i64,
        _metadata: serde_json::Value,
        _callback_url: &str,
    ) -> BoxFuture<'_, PaymentInitResult, Self::Error> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.fail_initialize;
        Box::pin(async move {
            if fail {
                Err(BoxedError(Box::new(std::io::Error::other(
                    "gateway unreachable",
                ))))
            } else {
                Ok(PaymentInitResult {
                    status: "pending".to_string(),
                    redirect_url: "https://gateway.example/checkout/tx-1".to_string(),
                    provider_reference: "tx-1".to_string(),
                })
            }
        })
    }

    fn verify_transaction(
        &self,
        _provider_reference: &str,
    ) -> BoxFuture<'_, PaymentVerification, Self::Error> {
        Box::pin(async move {
            Ok(PaymentVerification {
                status: VerificationStatus::Success,
                amount_minor_units: 5000,
            })
        })
    }
}

// --- Fixtures ---

pub fn test_config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        use_payment: true,
        database: None,
        scheduling: None,
        payment: None,
        housekeeping: None,
    })
}

pub fn service_record(
    duration_minutes: i64,
    buffer_before_minutes: i64,
    buffer_after_minutes: i64,
) -> ServiceRecord {
    ServiceRecord {
        id: "svc-1".to_string(),
        tenant_id: "tenant-1".to_string(),
        name: "Consultation".to_string(),
        duration_minutes,
        buffer_before_minutes,
        buffer_after_minutes,
        price_minor_units: 5000,
        currency: "CHF".to_string(),
        slot_granularity_minutes: Some(30),
    }
}

pub fn staff_member(id: &str, is_active: bool) -> StaffMember {
    StaffMember {
        id: id.to_string(),
        tenant_id: "tenant-1".to_string(),
        display_name: format!("Staff {}", id),
        is_active,
    }
}

pub fn working_hours_row(staff_id: &str, day_of_week: i64, start: &str, end: &str) -> WorkingHoursRow {
    WorkingHoursRow {
        staff_id: staff_id.to_string(),
        day_of_week,
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

pub fn appointment_at(start: DateTime<Utc>, end: DateTime<Utc>) -> Appointment {
    Appointment {
        id: "appt-existing".to_string(),
        tenant_id: "tenant-1".to_string(),
        staff_id: "staff-1".to_string(),
        service_id: "svc-1".to_string(),
        customer_id: "cust-1".to_string(),
        start,
        end,
        status: AppointmentStatus::Confirmed,
        deposit_paid: false,
        payment_reference: None,
    }
}

pub fn customer() -> Customer {
    Customer {
        id: "cust-1".to_string(),
        tenant_id: "tenant-1".to_string(),
        name: "Ada Example".to_string(),
        email: "ada@example.com".to_string(),
        phone: Some("+41790000000".to_string()),
    }
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}
