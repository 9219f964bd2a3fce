#[cfg(test)]
mod tests {
    use crate::availability::AvailabilityService;
    use crate::error::BookingError;
    use crate::test_support::{
        appointment_at, service_record, staff_member, test_config, utc, working_hours_row,
        MockAppointmentRepo, MockScheduleRepo,
    };
    use bookify_db::BookedIntervals;
    use chrono::NaiveDate;
    use chrono_tz::Tz;
    use std::sync::Arc;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[tokio::test]
    async fn unknown_service_is_an_error() {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(None));
        let appointments = MockAppointmentRepo::new();

        let service = AvailabilityService::new(
            test_config(),
            Arc::new(schedule),
            Arc::new(appointments),
        );

        let result = service
            .list_slots(
                "tenant-1",
                "missing",
                monday(),
                Tz::UTC,
                None,
                utc(2025, 6, 1, 12, 0),
            )
            .await;

        assert!(matches!(result, Err(BookingError::ServiceNotFound)));
    }

    #[tokio::test]
    async fn named_inactive_staff_yields_zero_slots_not_an_error() {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(Some(service_record(30, 0, 0))));
        schedule
            .expect_find_staff()
            .returning(|_, id| Ok(Some(staff_member(id, false))));
        let appointments = MockAppointmentRepo::new();

        let service = AvailabilityService::new(
            test_config(),
            Arc::new(schedule),
            Arc::new(appointments),
        );

        let slots = service
            .list_slots(
                "tenant-1",
                "svc-1",
                monday(),
                Tz::UTC,
                Some("staff-1"),
                utc(2025, 6, 1, 12, 0),
            )
            .await
            .unwrap();

        assert!(slots.is_empty());
    }

    #[tokio::test]
    async fn unnamed_staff_fans_out_and_tags_every_slot() {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(Some(service_record(30, 0, 0))));
        schedule.expect_staff_for_service().returning(|_, _| {
            Ok(vec![staff_member("staff-1", true), staff_member("staff-2", true)])
        });
        schedule
            .expect_working_hours()
            .returning(|staff_id, day| Ok(vec![working_hours_row(staff_id, day, "09:00", "10:00")]));
        schedule
            .expect_time_off_between()
            .returning(|_, _, _, _| Ok(Vec::new()));

        let mut appointments = MockAppointmentRepo::new();
        appointments
            .expect_booked_intervals()
            .returning(|_, _, _, _| Ok(BookedIntervals::default()));

        let service = AvailabilityService::new(
            test_config(),
            Arc::new(schedule),
            Arc::new(appointments),
        );

        let slots = service
            .list_slots(
                "tenant-1",
                "svc-1",
                monday(),
                Tz::UTC,
                None,
                utc(2025, 6, 1, 12, 0),
            )
            .await
            .unwrap();

        // 09:00 and 09:30 per staff member, sorted by start then staff, and
        // every slot names the staff member that backs it.
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].staff_id, "staff-1");
        assert_eq!(slots[1].staff_id, "staff-2");
        assert_eq!(slots[0].start, slots[1].start);
        assert!(slots.iter().all(|s| s.available));
    }

    #[tokio::test]
    async fn existing_appointment_blocks_only_its_window() {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(Some(service_record(30, 0, 0))));
        schedule
            .expect_find_staff()
            .returning(|_, id| Ok(Some(staff_member(id, true))));
        schedule
            .expect_working_hours()
            .returning(|staff_id, day| Ok(vec![working_hours_row(staff_id, day, "09:00", "12:00")]));
        schedule
            .expect_time_off_between()
            .returning(|_, _, _, _| Ok(Vec::new()));

        let mut appointments = MockAppointmentRepo::new();
        appointments.expect_booked_intervals().returning(|_, _, _, _| {
            Ok(BookedIntervals {
                appointments: vec![appointment_at(
                    utc(2025, 6, 2, 10, 0),
                    utc(2025, 6, 2, 10, 30),
                )],
                locks: Vec::new(),
            })
        });

        let service = AvailabilityService::new(
            test_config(),
            Arc::new(schedule),
            Arc::new(appointments),
        );

        let slots = service
            .list_slots(
                "tenant-1",
                "svc-1",
                monday(),
                Tz::UTC,
                Some("staff-1"),
                utc(2025, 6, 1, 12, 0),
            )
            .await
            .unwrap();

        let blocked: Vec<_> = slots.iter().filter(|s| !s.available).collect();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].start, utc(2025, 6, 2, 10, 0));
    }

    #[tokio::test]
    async fn no_working_hours_means_closed_all_day() {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(Some(service_record(30, 0, 0))));
        schedule
            .expect_find_staff()
            .returning(|_, id| Ok(Some(staff_member(id, true))));
        schedule
            .expect_working_hours()
            .returning(|_, _| Ok(Vec::new()));
        let appointments = MockAppointmentRepo::new();

        let service = AvailabilityService::new(
            test_config(),
            Arc::new(schedule),
            Arc::new(appointments),
        );

        let slots = service
            .list_slots(
                "tenant-1",
                "svc-1",
                monday(),
                Tz::UTC,
                Some("staff-1"),
                utc(2025, 6, 1, 12, 0),
            )
            .await
            .unwrap();

        assert!(slots.is_empty());
    }
}
