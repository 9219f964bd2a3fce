#[cfg(test)]
mod tests {
    use crate::logic::{
        generate_day_slots, has_conflict, intervals_overlap, subtract_blocked, SlotParams,
    };
    use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    fn instant(minutes_from_base: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap() + Duration::minutes(minutes_from_base)
    }

    proptest! {
        // The overlap test is exactly the half-open formula, and symmetric.
        #[test]
        fn overlap_matches_half_open_formula(
            a_start in 0i64..5000,
            a_len in 1i64..500,
            b_start in 0i64..5000,
            b_len in 1i64..500,
        ) {
            let (a0, a1) = (instant(a_start), instant(a_start + a_len));
            let (b0, b1) = (instant(b_start), instant(b_start + b_len));

            let expected = a0 < b1 && a1 > b0;
            prop_assert_eq!(intervals_overlap(a0, a1, b0, b1), expected);
            prop_assert_eq!(intervals_overlap(b0, b1, a0, a1), expected);
        }

        // Adjacent intervals sharing one boundary never conflict.
        #[test]
        fn adjacent_intervals_never_conflict(
            start in 0i64..5000,
            first_len in 1i64..500,
            second_len in 1i64..500,
        ) {
            let boundary = start + first_len;
            prop_assert!(!intervals_overlap(
                instant(start),
                instant(boundary),
                instant(boundary),
                instant(boundary + second_len),
            ));
        }

        // Whatever subtract_blocked returns lies inside the original
        // interval and intersects no block.
        #[test]
        fn subtraction_leaves_only_truly_free_time(
            blocks in prop::collection::vec((0i64..720, 1i64..240), 0..6),
        ) {
            let open_start = instant(0);
            let open_end = instant(720);
            let blocked: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocks
                .iter()
                .map(|(offset, len)| (instant(*offset), instant(offset + len)))
                .collect();

            let free = subtract_blocked(open_start, open_end, &blocked);

            for (free_start, free_end) in &free {
                prop_assert!(*free_start < *free_end);
                prop_assert!(*free_start >= open_start && *free_end <= open_end);
                for (block_start, block_end) in &blocked {
                    prop_assert!(!intervals_overlap(*free_start, *free_end, *block_start, *block_end));
                }
            }
        }

        // Generated slots always fit inside an open interval, never touch a
        // blackout with their raw interval, and an available slot's
        // buffer-expanded window clears every appointment.
        #[test]
        fn generated_slots_respect_their_inputs(
            duration in 15i64..120,
            buffer_before in 0i64..30,
            buffer_after in 0i64..30,
            granularity in 5i64..60,
            open_start_hour in 6u32..10,
            open_end_hour in 11u32..20,
            blocks in prop::collection::vec((360i64..1200, 15i64..180), 0..4),
            appointments in prop::collection::vec((360i64..1200, 15i64..180), 0..4),
        ) {
            let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
            let params = SlotParams {
                duration: Duration::minutes(duration),
                buffer_before: Duration::minutes(buffer_before),
                buffer_after: Duration::minutes(buffer_after),
                granularity: Duration::minutes(granularity),
            };
            let open = vec![(
                NaiveTime::from_hms_opt(open_start_hour, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(open_end_hour, 0, 0).unwrap(),
            )];
            let time_off: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocks
                .iter()
                .map(|(offset, len)| (instant(*offset), instant(offset + len)))
                .collect();
            let booked: Vec<(DateTime<Utc>, DateTime<Utc>)> = appointments
                .iter()
                .map(|(offset, len)| (instant(*offset), instant(offset + len)))
                .collect();
            let now = instant(0);

            let slots = generate_day_slots(
                date,
                Tz::UTC,
                &params,
                "staff-1",
                &open,
                &time_off,
                &booked,
                &[],
                now,
            );

            let interval_start = instant(open_start_hour as i64 * 60);
            let interval_end = instant(open_end_hour as i64 * 60);

            for slot in &slots {
                prop_assert_eq!(slot.end - slot.start, params.duration);
                prop_assert!(slot.start >= interval_start && slot.end <= interval_end);
                for (block_start, block_end) in &time_off {
                    prop_assert!(!intervals_overlap(slot.start, slot.end, *block_start, *block_end));
                }
                if slot.available {
                    let window_start = slot.start - params.buffer_before;
                    let window_end = slot.end + params.buffer_after;
                    prop_assert!(!has_conflict(
                        window_start,
                        window_end,
                        &booked,
                        &time_off,
                        &[],
                        now,
                        None,
                    ));
                }
            }
        }
    }
}
