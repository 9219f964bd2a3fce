#[cfg(test)]
mod tests {
    use crate::logic::{
        expanded_window, generate_day_slots, has_conflict, intervals_overlap, parse_wall_time,
        subtract_blocked, LockWindow, SlotParams,
    };
    use crate::test_support::utc;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use chrono_tz::Tz;

    fn params(duration: i64, before: i64, after: i64, granularity: i64) -> SlotParams {
        SlotParams {
            duration: Duration::minutes(duration),
            buffer_before: Duration::minutes(before),
            buffer_after: Duration::minutes(after),
            granularity: Duration::minutes(granularity),
        }
    }

    fn wall(value: &str) -> NaiveTime {
        parse_wall_time(value).unwrap()
    }

    // 2025-06-02 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        let a_start = utc(2025, 6, 2, 9, 0);
        let a_end = utc(2025, 6, 2, 10, 0);
        let b_end = utc(2025, 6, 2, 11, 0);

        // [09:00, 10:00) and [10:00, 11:00) are back-to-back, not a conflict
        assert!(!intervals_overlap(a_start, a_end, a_end, b_end));
        assert!(!intervals_overlap(a_end, b_end, a_start, a_end));
        // One minute of overlap flips it
        assert!(intervals_overlap(
            a_start,
            a_end,
            a_end - Duration::minutes(1),
            b_end
        ));
    }

    #[test]
    fn conflict_predicate_checks_all_three_sources() {
        let start = utc(2025, 6, 2, 10, 0);
        let end = utc(2025, 6, 2, 10, 30);
        let now = utc(2025, 6, 2, 8, 0);

        let appointment = vec![(utc(2025, 6, 2, 10, 15), utc(2025, 6, 2, 11, 0))];
        let time_off = vec![(utc(2025, 6, 2, 9, 0), utc(2025, 6, 2, 10, 15))];
        let lock = vec![LockWindow {
            start: utc(2025, 6, 2, 10, 0),
            end: utc(2025, 6, 2, 10, 30),
            session_id: "other-session".to_string(),
            expires_at: now + Duration::minutes(10),
        }];

        assert!(has_conflict(start, end, &appointment, &[], &[], now, None));
        assert!(has_conflict(start, end, &[], &time_off, &[], now, None));
        assert!(has_conflict(start, end, &[], &[], &lock, now, None));
        assert!(!has_conflict(start, end, &[], &[], &[], now, None));
    }

    #[test]
    fn expired_locks_never_count_even_before_the_sweep_runs() {
        let start = utc(2025, 6, 2, 14, 0);
        let end = utc(2025, 6, 2, 14, 30);
        let now = utc(2025, 6, 2, 13, 0);

        let expired = vec![LockWindow {
            start,
            end,
            session_id: "other-session".to_string(),
            expires_at: now - Duration::seconds(1),
        }];

        assert!(!has_conflict(start, end, &[], &[], &expired, now, None));
    }

    #[test]
    fn own_session_locks_never_self_conflict() {
        let start = utc(2025, 6, 2, 14, 0);
        let end = utc(2025, 6, 2, 14, 30);
        let now = utc(2025, 6, 2, 13, 0);

        let lock = vec![LockWindow {
            start,
            end,
            session_id: "session-a".to_string(),
            expires_at: now + Duration::minutes(10),
        }];

        assert!(!has_conflict(start, end, &[], &[], &lock, now, Some("session-a")));
        assert!(has_conflict(start, end, &[], &[], &lock, now, Some("session-b")));
    }

    #[test]
    fn buffers_expand_the_check_window() {
        // duration 30, buffer before 10, buffer after 5: booking at 10:00
        // must collide with anything in [09:50, 10:35)
        let p = params(30, 10, 5, 15);
        let (window_start, window_end) = expanded_window(utc(2025, 6, 2, 10, 0), &p);
        assert_eq!(window_start, utc(2025, 6, 2, 9, 50));
        assert_eq!(window_end, utc(2025, 6, 2, 10, 35));

        // An appointment ending 09:55 pokes into the buffer zone
        let neighbour = vec![(utc(2025, 6, 2, 9, 30), utc(2025, 6, 2, 9, 55))];
        let now = utc(2025, 6, 2, 8, 0);
        assert!(has_conflict(
            window_start,
            window_end,
            &neighbour,
            &[],
            &[],
            now,
            None
        ));

        // The same appointment ending exactly at 09:50 does not
        let flush = vec![(utc(2025, 6, 2, 9, 30), utc(2025, 6, 2, 9, 50))];
        assert!(!has_conflict(window_start, window_end, &flush, &[], &[], now, None));
    }

    #[test]
    fn subtract_blocked_splits_and_merges() {
        let open_start = utc(2025, 6, 2, 9, 0);
        let open_end = utc(2025, 6, 2, 17, 0);

        // Unordered, partially overlapping blocks
        let blocked = vec![
            (utc(2025, 6, 2, 13, 0), utc(2025, 6, 2, 14, 0)),
            (utc(2025, 6, 2, 10, 0), utc(2025, 6, 2, 11, 0)),
            (utc(2025, 6, 2, 13, 30), utc(2025, 6, 2, 15, 0)),
        ];

        let free = subtract_blocked(open_start, open_end, &blocked);
        assert_eq!(
            free,
            vec![
                (open_start, utc(2025, 6, 2, 10, 0)),
                (utc(2025, 6, 2, 11, 0), utc(2025, 6, 2, 13, 0)),
                (utc(2025, 6, 2, 15, 0), open_end),
            ]
        );
    }

    #[test]
    fn subtract_blocked_handles_full_cover_and_no_blocks() {
        let start = utc(2025, 6, 2, 9, 0);
        let end = utc(2025, 6, 2, 12, 0);

        assert_eq!(subtract_blocked(start, end, &[]), vec![(start, end)]);
        let cover = vec![(utc(2025, 6, 2, 8, 0), utc(2025, 6, 2, 13, 0))];
        assert!(subtract_blocked(start, end, &cover).is_empty());
    }

    // 30-minute service, no buffers, staff open 09:00-12:00 on Monday,
    // one confirmed appointment 10:00-10:30, 30-minute granularity.
    #[test]
    fn day_grid_with_one_existing_appointment() {
        let p = params(30, 0, 0, 30);
        let open = vec![(wall("09:00"), wall("12:00"))];
        let appointments = vec![(utc(2025, 6, 2, 10, 0), utc(2025, 6, 2, 10, 30))];
        let now = utc(2025, 6, 1, 12, 0); // the day before: nothing is "past"

        let slots = generate_day_slots(
            monday(),
            Tz::UTC,
            &p,
            "staff-1",
            &open,
            &[],
            &appointments,
            &[],
            now,
        );

        let rendered: Vec<(String, bool)> = slots
            .iter()
            .map(|s| (s.start.format("%H:%M").to_string(), s.available))
            .collect();

        assert_eq!(
            rendered,
            vec![
                ("09:00".to_string(), true),
                ("09:30".to_string(), true),
                ("10:00".to_string(), false),
                ("10:30".to_string(), true), // back-to-back with the appointment
                ("11:00".to_string(), true),
                ("11:30".to_string(), true), // 11:30 + 30 = 12:00 still fits
            ]
        );
        assert!(slots.iter().all(|s| s.staff_id == "staff-1"));
    }

    #[test]
    fn past_candidates_are_emitted_but_never_available() {
        let p = params(30, 0, 0, 30);
        let open = vec![(wall("09:00"), wall("11:00"))];
        let now = utc(2025, 6, 2, 10, 0); // same-day query at 10:00

        let slots =
            generate_day_slots(monday(), Tz::UTC, &p, "staff-1", &open, &[], &[], &[], now);

        let availability: Vec<bool> = slots.iter().map(|s| s.available).collect();
        // 09:00 and 09:30 are gone; 10:00 and 10:30 remain bookable
        assert_eq!(availability, vec![false, false, true, true]);
    }

    #[test]
    fn service_longer_than_every_open_interval_yields_zero_slots() {
        let p = params(240, 0, 0, 30);
        let open = vec![(wall("09:00"), wall("12:00"))];
        let now = utc(2025, 6, 1, 12, 0);

        let slots =
            generate_day_slots(monday(), Tz::UTC, &p, "staff-1", &open, &[], &[], &[], now);
        assert!(slots.is_empty());
    }

    #[test]
    fn split_shifts_step_independently() {
        let p = params(60, 0, 0, 60);
        let open = vec![(wall("09:00"), wall("11:00")), (wall("14:00"), wall("16:00"))];
        let now = utc(2025, 6, 1, 12, 0);

        let slots =
            generate_day_slots(monday(), Tz::UTC, &p, "staff-1", &open, &[], &[], &[], now);

        let starts: Vec<String> = slots
            .iter()
            .map(|s| s.start.format("%H:%M").to_string())
            .collect();
        assert_eq!(starts, vec!["09:00", "10:00", "14:00", "15:00"]);
    }

    #[test]
    fn time_off_removes_candidates_and_buffered_edges_stay_blocked() {
        // Blackout 10:00-11:00 inside a 09:00-12:00 shift. With a
        // 15-minute after-buffer, the 09:45 candidate's window reaches
        // 10:30 and collides with the blackout.
        let p = params(30, 0, 15, 15);
        let open = vec![(wall("09:00"), wall("12:00"))];
        let blocked = vec![(utc(2025, 6, 2, 10, 0), utc(2025, 6, 2, 11, 0))];
        let now = utc(2025, 6, 1, 12, 0);

        let slots = generate_day_slots(
            monday(),
            Tz::UTC,
            &p,
            "staff-1",
            &open,
            &blocked,
            &[],
            &[],
            now,
        );

        // No candidate starts inside the blackout
        assert!(slots
            .iter()
            .all(|s| s.end <= utc(2025, 6, 2, 10, 0) || s.start >= utc(2025, 6, 2, 11, 0)));

        let at_0930 = slots
            .iter()
            .find(|s| s.start == utc(2025, 6, 2, 9, 30))
            .unwrap();
        // 09:30 + 30min + 15min buffer = 10:15 > 10:00, so flagged busy
        assert!(!at_0930.available);
    }

    #[test]
    fn slot_grid_honors_local_timezone() {
        // Zurich is UTC+2 in June: a 09:00 local shift starts at 07:00 UTC.
        let p = params(60, 0, 0, 60);
        let open = vec![(wall("09:00"), wall("11:00"))];
        let now = utc(2025, 6, 1, 12, 0);

        let slots = generate_day_slots(
            monday(),
            Tz::Europe__Zurich,
            &p,
            "staff-1",
            &open,
            &[],
            &[],
            &[],
            now,
        );

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start, utc(2025, 6, 2, 7, 0));
        assert_eq!(slots[1].start, utc(2025, 6, 2, 8, 0));
    }
}
