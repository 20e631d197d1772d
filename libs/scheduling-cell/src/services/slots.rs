// libs/scheduling-cell/src/services/slots.rs
//
// Pure slot-availability calculator. Everything time-dependent takes `now`
// as a parameter so the whole module is deterministic under test.
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

use crate::models::{AvailabilityRule, AvailableSlot, BookedInterval};

/// How late a slot may still be booked. Applied per time-of-day bucket: this
/// is a clinic business rule, not a generic lead time.
#[derive(Debug, Clone, Copy)]
pub enum BookingDeadline {
    /// Bookable until the given clock time on the previous calendar day.
    PreviousDayAt { hour: u32, minute: u32 },
    /// Bookable until this many minutes before the slot starts.
    LeadTimeMinutes(i64),
}

/// One row of the notice-window policy: applies to slots starting before
/// `until_minute` (minutes since midnight). First matching row wins.
#[derive(Debug, Clone, Copy)]
pub struct NoticeWindow {
    pub until_minute: i32,
    pub deadline: BookingDeadline,
}

/// Ordered notice-window table. Morning slots (before 14:30) close at 21:00
/// the day before; the 14:30 slot itself needs two hours of notice; the rest
/// of the afternoon needs thirty minutes.
pub const NOTICE_POLICY: &[NoticeWindow] = &[
    NoticeWindow {
        until_minute: 870, // 14:30
        deadline: BookingDeadline::PreviousDayAt { hour: 21, minute: 0 },
    },
    NoticeWindow {
        until_minute: 900, // 15:00
        deadline: BookingDeadline::LeadTimeMinutes(120),
    },
    NoticeWindow {
        until_minute: 1440,
        deadline: BookingDeadline::LeadTimeMinutes(30),
    },
];

fn time_from_minute(minute: i32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(minute.max(0) as u32 * 60, 0)
        .unwrap_or(NaiveTime::MIN)
}

fn slot_start(date: NaiveDate, minute: i32) -> DateTime<Utc> {
    date.and_time(time_from_minute(minute)).and_utc()
}

/// Latest instant at which a slot starting at `minute` on `date` may still
/// be booked.
pub fn booking_deadline(date: NaiveDate, minute: i32) -> DateTime<Utc> {
    let window = NOTICE_POLICY
        .iter()
        .find(|w| minute < w.until_minute)
        .unwrap_or(&NOTICE_POLICY[NOTICE_POLICY.len() - 1]);

    match window.deadline {
        BookingDeadline::PreviousDayAt { hour, minute: m } => {
            let cutoff = NaiveTime::from_hms_opt(hour, m, 0).unwrap_or(NaiveTime::MIN);
            (date - Duration::days(1)).and_time(cutoff).and_utc()
        }
        BookingDeadline::LeadTimeMinutes(lead) => slot_start(date, minute) - Duration::minutes(lead),
    }
}

pub fn day_of_week_index(date: NaiveDate) -> i32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Half-open interval overlap against every booking that still occupies its
/// interval. Back-to-back bookings with no gap do not conflict.
fn has_conflict(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    booked: &[BookedInterval],
) -> bool {
    booked
        .iter()
        .filter(|b| b.blocks_slot())
        .any(|b| start < b.end_time && b.start_time < end)
}

/// Compute every bookable session start for `date`.
///
/// Rules not matching the date's weekday are ignored, so callers may pass a
/// clinician's full rule set. An empty result is a normal outcome: a
/// non-working day, a fully booked day, or a day past its notice deadlines.
pub fn open_slots(
    date: NaiveDate,
    rules: &[AvailabilityRule],
    booked: &[BookedInterval],
    now: DateTime<Utc>,
    session_minutes: i32,
) -> Vec<AvailableSlot> {
    let mut slots = Vec::new();
    if session_minutes <= 0 {
        return slots;
    }

    let day_of_week = day_of_week_index(date);

    for rule in rules.iter().filter(|r| r.day_of_week == day_of_week) {
        let mut minute = rule.start_minute;
        while minute + session_minutes <= rule.end_minute {
            let start = slot_start(date, minute);
            let end = start + Duration::minutes(session_minutes as i64);

            if now <= booking_deadline(date, minute) && !has_conflict(start, end, booked) {
                slots.push(AvailableSlot {
                    label: start.format("%H:%M").to_string(),
                    start_time: start,
                    end_time: end,
                });
            }

            minute += session_minutes;
        }
    }

    slots.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    slots
}

/// True when `start` is still a bookable, unoccupied slot as of `now`. Used
/// by the booking flow to re-validate at commit time.
pub fn is_open_slot(
    start: DateTime<Utc>,
    rules: &[AvailabilityRule],
    booked: &[BookedInterval],
    now: DateTime<Utc>,
    session_minutes: i32,
) -> bool {
    open_slots(start.date_naive(), rules, booked, now, session_minutes)
        .iter()
        .any(|slot| slot.start_time == start)
}
