#[cfg(test)]
mod tests {
    use crate::error::BookingError;
    use crate::locks::SlotLockManager;
    use crate::test_support::{
        service_record, staff_member, test_config, utc, MockScheduleRepo, MockSlotLockRepo,
    };
    use bookify_db::{SlotLock, SlotLockInsert, TimeOffBlock};
    use chrono::Duration;
    use std::sync::Arc;

    fn schedule_with_service_and_staff() -> MockScheduleRepo {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(Some(service_record(30, 10, 5))));
        schedule
            .expect_find_staff()
            .returning(|_, id| Ok(Some(staff_member(id, true))));
        schedule
            .expect_time_off_between()
            .returning(|_, _, _, _| Ok(Vec::new()));
        schedule
    }

    #[tokio::test]
    async fn acquire_inserts_the_buffer_expanded_window_with_ttl() {
        let schedule = schedule_with_service_and_staff();
        let now = utc(2025, 6, 2, 13, 0);

        let mut locks = MockSlotLockRepo::new();
        locks
            .expect_insert_if_available()
            .withf(move |lock, insert_now| {
                // 14:00 start, 30min duration, 10/5 buffers -> [13:50, 14:35)
                lock.start == utc(2025, 6, 2, 13, 50)
                    && lock.end == utc(2025, 6, 2, 14, 35)
                    && lock.session_id == "session-a"
                    && lock.expires_at == utc(2025, 6, 2, 13, 10)
                    && *insert_now == utc(2025, 6, 2, 13, 0)
            })
            .returning(|lock, _| {
                Ok(SlotLockInsert::Created(SlotLock {
                    id: "lock-1".to_string(),
                    tenant_id: lock.tenant_id,
                    staff_id: lock.staff_id,
                    service_id: lock.service_id,
                    start: lock.start,
                    end: lock.end,
                    session_id: lock.session_id,
                    expires_at: lock.expires_at,
                }))
            });

        let manager = SlotLockManager::new(test_config(), Arc::new(schedule), Arc::new(locks));

        let lock = manager
            .acquire(
                "tenant-1",
                "staff-1",
                "svc-1",
                utc(2025, 6, 2, 14, 0),
                "session-a",
                now,
            )
            .await
            .unwrap();

        assert_eq!(lock.id, "lock-1");
        assert_eq!(lock.expires_at - now, Duration::minutes(10));
    }

    #[tokio::test]
    async fn conflicting_insert_surfaces_as_slot_unavailable() {
        let schedule = schedule_with_service_and_staff();
        let mut locks = MockSlotLockRepo::new();
        locks
            .expect_insert_if_available()
            .returning(|_, _| Ok(SlotLockInsert::Conflict));

        let manager = SlotLockManager::new(test_config(), Arc::new(schedule), Arc::new(locks));

        let result = manager
            .acquire(
                "tenant-1",
                "staff-1",
                "svc-1",
                utc(2025, 6, 2, 14, 15),
                "session-b",
                utc(2025, 6, 2, 13, 0),
            )
            .await;

        assert!(matches!(result, Err(BookingError::SlotUnavailable)));
    }

    #[tokio::test]
    async fn time_off_rejects_before_touching_the_lock_table() {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(Some(service_record(30, 0, 0))));
        schedule
            .expect_find_staff()
            .returning(|_, id| Ok(Some(staff_member(id, true))));
        schedule.expect_time_off_between().returning(|_, _, _, _| {
            Ok(vec![TimeOffBlock {
                id: "off-1".to_string(),
                tenant_id: "tenant-1".to_string(),
                staff_id: None,
                start: utc(2025, 6, 2, 14, 0),
                end: utc(2025, 6, 2, 18, 0),
                reason: Some("public holiday".to_string()),
            }])
        });

        // No expectation on the lock repo: a call would panic the test.
        let locks = MockSlotLockRepo::new();
        let manager = SlotLockManager::new(test_config(), Arc::new(schedule), Arc::new(locks));

        let result = manager
            .acquire(
                "tenant-1",
                "staff-1",
                "svc-1",
                utc(2025, 6, 2, 14, 0),
                "session-a",
                utc(2025, 6, 2, 13, 0),
            )
            .await;

        assert!(matches!(result, Err(BookingError::SlotUnavailable)));
    }

    #[tokio::test]
    async fn inactive_staff_cannot_be_locked() {
        let mut schedule = MockScheduleRepo::new();
        schedule
            .expect_find_service()
            .returning(|_, _| Ok(Some(service_record(30, 0, 0))));
        schedule
            .expect_find_staff()
            .returning(|_, id| Ok(Some(staff_member(id, false))));

        let locks = MockSlotLockRepo::new();
        let manager = SlotLockManager::new(test_config(), Arc::new(schedule), Arc::new(locks));

        let result = manager
            .acquire(
                "tenant-1",
                "staff-1",
                "svc-1",
                utc(2025, 6, 2, 14, 0),
                "session-a",
                utc(2025, 6, 2, 13, 0),
            )
            .await;

        assert!(matches!(result, Err(BookingError::SlotUnavailable)));
    }

    #[tokio::test]
    async fn cleanup_is_idempotent() {
        let schedule = MockScheduleRepo::new();
        let mut locks = MockSlotLockRepo::new();
        let mut removed = vec![0u64, 3u64]; // first sweep removes 3, second 0
        locks
            .expect_delete_expired()
            .times(2)
            .returning(move |_| Ok(removed.pop().unwrap()));

        let manager = SlotLockManager::new(test_config(), Arc::new(schedule), Arc::new(locks));

        let now = utc(2025, 6, 2, 13, 0);
        assert_eq!(manager.run_cleanup(now).await.unwrap(), 3);
        assert_eq!(manager.run_cleanup(now).await.unwrap(), 0);
    }
}
