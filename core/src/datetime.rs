// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar-day policy for events.
//!
//! Everything here is judged on the calendar of the timezone carried by `now`:
//! an event is "today" when it falls on the same local day as `now`, no matter
//! the time of day, and day differences count midnights crossed rather than
//! elapsed 24 hour periods.

mod util;

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};

pub(crate) use util::at_time;
pub use util::{end_of_day, start_of_day};

/// An inclusive range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first instant in the range.
    pub start: DateTime<Utc>,

    /// The last instant in the range.
    pub end: DateTime<Utc>,
}

impl DateRange {
    fn of_days<Tz: TimeZone>(tz: &Tz, first: NaiveDate, last: NaiveDate) -> Self {
        DateRange {
            start: at_time(tz, first, util::start_of_day_naive()).with_timezone(&Utc),
            end: at_time(tz, last, util::end_of_day_naive()).with_timezone(&Utc),
        }
    }

    /// Whether the instant lies within the range, both ends included.
    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        self.start <= *dt && *dt <= self.end
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Whole calendar days from today until the day of `date`.
///
/// Positive in the future, zero today and negative once the day has passed.
pub fn days_left<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    let day = date.with_timezone(&now.timezone()).date_naive();
    day.signed_duration_since(now.date_naive()).num_days()
}

/// Where an event's day lies relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayClass {
    /// The day has passed.
    Past,

    /// The event is today.
    Today,

    /// The day is still ahead.
    Upcoming,
}

impl DayClass {
    /// Classifies a day difference as returned by [`days_left`].
    pub fn from_days_left(days: i64) -> Self {
        match days {
            0 => DayClass::Today,
            d if d < 0 => DayClass::Past,
            _ => DayClass::Upcoming,
        }
    }
}

/// Classifies the event date against the calendar day of `now`.
pub fn classify<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> DayClass {
    DayClass::from_days_left(days_left(date, now))
}

pub fn is_today_event<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    classify(date, now) == DayClass::Today
}

pub fn is_past_event<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    classify(date, now) == DayClass::Past
}

/// Strictly after today.
pub fn is_upcoming_event<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    classify(date, now) == DayClass::Upcoming
}

/// Same as [`is_upcoming_event`].
pub fn is_upcoming_but_not_today<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    is_upcoming_event(date, now)
}

/// A human phrase for a day difference, see [`relative_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    DaysAgo(u64),
    Yesterday,
    Today,
    Tomorrow,
    DaysLeft(u64),
}

impl RelativeDay {
    pub fn from_days_left(days: i64) -> Self {
        match days {
            0 => RelativeDay::Today,
            1 => RelativeDay::Tomorrow,
            -1 => RelativeDay::Yesterday,
            d if d > 0 => RelativeDay::DaysLeft(d.unsigned_abs()),
            d => RelativeDay::DaysAgo(d.unsigned_abs()),
        }
    }
}

impl fmt::Display for RelativeDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeDay::DaysAgo(n) => write!(f, "{n} days ago"),
            RelativeDay::Yesterday => f.write_str("YESTERDAY"),
            RelativeDay::Today => f.write_str("TODAY"),
            RelativeDay::Tomorrow => f.write_str("TOMORROW"),
            RelativeDay::DaysLeft(n) => write!(f, "{n} days left"),
        }
    }
}

/// "TODAY", "TOMORROW", "YESTERDAY", "N days left" or "N days ago".
pub fn relative_label<Tz: TimeZone>(date: &DateTime<Utc>, now: &DateTime<Tz>) -> String {
    RelativeDay::from_days_left(days_left(date, now)).to_string()
}

/// Midnight at the start of the current day.
pub fn start_of_today<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    start_of_day(now)
}

/// The last millisecond of the current day.
pub fn end_of_today<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    end_of_day(now)
}

/// From the start of today to the end of the 7th calendar day after today.
pub fn next_7_days_range<Tz: TimeZone>(now: &DateTime<Tz>) -> DateRange {
    let today = now.date_naive();
    let last = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
    DateRange::of_days(&now.timezone(), today, last)
}

/// From the first day of the current month to the end of its last day.
pub fn this_month_range<Tz: TimeZone>(now: &DateTime<Tz>) -> DateRange {
    let today = now.date_naive();
    DateRange::of_days(
        &now.timezone(),
        util::first_day_of_month(today),
        util::last_day_of_month(today),
    )
}

/// The next time the wall clock shows `time`, today if still ahead, otherwise tomorrow.
pub fn next_time_of_day<Tz: TimeZone>(now: &DateTime<Tz>, time: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = at_time(&tz, now.date_naive(), time);
    if today > *now {
        return today;
    }

    match now.date_naive().succ_opt() {
        Some(tomorrow) => at_time(&tz, tomorrow, time),
        None => today,
    }
}

/// Same wall-clock time `days` calendar days before `now`.
pub fn days_before<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> DateTime<Tz> {
    now.clone()
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or_else(|| now.clone())
}
