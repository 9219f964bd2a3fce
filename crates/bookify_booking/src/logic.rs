// --- File: crates/bookify_booking/src/logic.rs ---
//! Pure availability arithmetic.
//!
//! Everything in this module is CPU-bound work over already-fetched data:
//! the half-open overlap test, the conflict predicate, blackout
//! subtraction and the slot generator. All comparisons happen on UTC
//! instants; local wall-clock time only appears at the edges, when a
//! calendar day and a working-hours row are resolved into instants for
//! the tenant's timezone.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// A candidate appointment start surfaced to a booking client.
///
/// Transient presentation value, never persisted. Every slot carries the
/// concrete staff member that backs it, even when the caller did not name
/// one, so a later reservation can always target a real staff member.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
    pub staff_id: String,
}

/// An active or expired slot lock as seen by the conflict predicate.
#[derive(Debug, Clone)]
pub struct LockWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Per-request slot arithmetic parameters, resolved from the service and
/// the application defaults.
#[derive(Debug, Clone)]
pub struct SlotParams {
    pub duration: Duration,
    pub buffer_before: Duration,
    pub buffer_after: Duration,
    pub granularity: Duration,
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// conflict iff `a_start < b_end && a_end > b_start`. Touching endpoints
/// do not overlap, which is what permits back-to-back bookings.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// The buffer-expanded check window for a candidate start.
pub fn expanded_window(
    start: DateTime<Utc>,
    params: &SlotParams,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        start - params.buffer_before,
        start + params.duration + params.buffer_after,
    )
}

/// Decides whether a candidate window collides with anything that blocks
/// a staff member's time: an appointment, a time-off block, or an active
/// slot lock.
///
/// Locks whose `expires_at` has passed are ignored even when the cleanup
/// sweep has not physically removed them yet, and a lock held by
/// `requesting_session` never blocks that same session.
pub fn has_conflict(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    appointments: &[(DateTime<Utc>, DateTime<Utc>)],
    time_off: &[(DateTime<Utc>, DateTime<Utc>)],
    locks: &[LockWindow],
    now: DateTime<Utc>,
    requesting_session: Option<&str>,
) -> bool {
    let busy = appointments
        .iter()
        .chain(time_off.iter())
        .any(|(start, end)| intervals_overlap(candidate_start, candidate_end, *start, *end));
    if busy {
        return true;
    }

    locks.iter().any(|lock| {
        lock.expires_at > now
            && requesting_session != Some(lock.session_id.as_str())
            && intervals_overlap(candidate_start, candidate_end, lock.start, lock.end)
    })
}

/// Resolve a local wall-clock time on a calendar day to a UTC instant.
///
/// Ambiguous local times (the fall-back DST hour) resolve to the earlier
/// instant; non-existent local times (the spring-forward gap) resolve to
/// `None` and the caller skips them.
pub fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

/// UTC bounds of a calendar day in the given timezone.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_instant(date, NaiveTime::MIN, tz)
        .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    let next_day = date.succ_opt().unwrap_or(date);
    let end = local_instant(next_day, NaiveTime::MIN, tz)
        .unwrap_or_else(|| Utc.from_utc_datetime(&next_day.and_time(NaiveTime::MIN)));
    (start, end)
}

/// Parse a stored "HH:MM" working-hours value.
pub fn parse_wall_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Remove blocked intervals from `[start, end)`, returning the remaining
/// free sub-intervals in order. Overlapping or unordered blocks are
/// tolerated; they simply merge during the sweep.
pub fn subtract_blocked(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    blocked: &[(DateTime<Utc>, DateTime<Utc>)],
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut relevant: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocked
        .iter()
        .copied()
        .filter(|(block_start, block_end)| *block_start < end && *block_end > start)
        .collect();
    relevant.sort_by_key(|(block_start, _)| *block_start);

    let mut free = Vec::new();
    let mut cursor = start;
    for (block_start, block_end) in relevant {
        if block_start > cursor {
            free.push((cursor, block_start.min(end)));
        }
        cursor = cursor.max(block_end);
        if cursor >= end {
            return free;
        }
    }
    if cursor < end {
        free.push((cursor, end));
    }
    free
}

/// Produce the candidate slots of one staff member for one calendar day.
///
/// Open intervals are the staff member's working hours for that weekday
/// in local time. Blackouts are subtracted first; within each remaining
/// sub-interval, candidate starts advance in `granularity` steps as long
/// as the raw slot still fits. Each candidate's buffer-expanded window is
/// then checked against appointments, time off and foreign locks.
///
/// Candidates in the past are still emitted, flagged unavailable, so the
/// booking UI can render a complete day grid for same-day queries.
#[allow(clippy::too_many_arguments)]
pub fn generate_day_slots(
    date: NaiveDate,
    tz: Tz,
    params: &SlotParams,
    staff_id: &str,
    open_intervals: &[(NaiveTime, NaiveTime)],
    time_off: &[(DateTime<Utc>, DateTime<Utc>)],
    appointments: &[(DateTime<Utc>, DateTime<Utc>)],
    locks: &[LockWindow],
    now: DateTime<Utc>,
) -> Vec<Slot> {
    let mut slots = Vec::new();

    for (open_start, open_end) in open_intervals {
        let Some(interval_start) = local_instant(date, *open_start, tz) else {
            continue;
        };
        let Some(interval_end) = local_instant(date, *open_end, tz) else {
            continue;
        };
        if interval_end <= interval_start {
            continue;
        }

        for (free_start, free_end) in subtract_blocked(interval_start, interval_end, time_off) {
            let mut candidate = free_start;
            while candidate + params.duration <= free_end {
                let (check_start, check_end) = expanded_window(candidate, params);
                let conflict = has_conflict(
                    check_start,
                    check_end,
                    appointments,
                    time_off,
                    locks,
                    now,
                    None,
                );
                slots.push(Slot {
                    start: candidate,
                    end: candidate + params.duration,
                    available: !conflict && candidate >= now,
                    staff_id: staff_id.to_string(),
                });
                candidate += params.granularity;
            }
        }
    }

    slots
}
