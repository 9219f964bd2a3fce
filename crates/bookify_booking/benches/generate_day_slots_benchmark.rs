use bookify_booking::logic::{generate_day_slots, LockWindow, SlotParams};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
}

fn params(granularity_minutes: i64) -> SlotParams {
    SlotParams {
        duration: Duration::minutes(30),
        buffer_before: Duration::minutes(10),
        buffer_after: Duration::minutes(5),
        granularity: Duration::minutes(granularity_minutes),
    }
}

// Helper to fill a day with evenly spaced appointments
fn busy_appointments(count: usize) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    (0..count)
        .map(|i| {
            let start = at(8, 0) + Duration::minutes(i as i64 * 45);
            (start, start + Duration::minutes(30))
        })
        .collect()
}

fn benchmark_generate_day_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_day_slots");

    let open = vec![(
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
    )];
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    group.bench_function("empty_day_15min_steps", |b| {
        b.iter(|| {
            generate_day_slots(
                black_box(day()),
                black_box(Tz::Europe__Zurich),
                black_box(&params(15)),
                black_box("staff-1"),
                black_box(&open),
                black_box(&[]),
                black_box(&[]),
                black_box(&[]),
                black_box(now),
            )
        })
    });

    let appointments = busy_appointments(10);
    let time_off = vec![(at(12, 0), at(13, 0))];
    let locks: Vec<LockWindow> = (0..5)
        .map(|i| LockWindow {
            start: at(14, 0) + Duration::minutes(i * 40),
            end: at(14, 30) + Duration::minutes(i * 40),
            session_id: format!("session-{}", i),
            expires_at: now + Duration::minutes(10),
        })
        .collect();

    group.bench_function("busy_day_5min_steps", |b| {
        b.iter(|| {
            generate_day_slots(
                black_box(day()),
                black_box(Tz::Europe__Zurich),
                black_box(&params(5)),
                black_box("staff-1"),
                black_box(&open),
                black_box(&time_off),
                black_box(&appointments),
                black_box(&locks),
                black_box(now),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_generate_day_slots);
criterion_main!(benches);
