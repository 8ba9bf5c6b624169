// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, offset::LocalResult,
};

pub const fn start_of_day_naive() -> NaiveTime {
    NaiveTime::MIN
}

/// The last representable millisecond of a day, the precision events are stored with.
pub const fn end_of_day_naive() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("23:59:59.999 must exist in NaiveTime")
}

/// The start of the day (00:00:00) for the given `DateTime` in the same timezone.
pub fn start_of_day<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<Tz> {
    at_time(&dt.timezone(), dt.date_naive(), start_of_day_naive())
}

/// The end of the day (23:59:59.999) for the given `DateTime` in the same timezone.
pub fn end_of_day<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<Tz> {
    at_time(&dt.timezone(), dt.date_naive(), end_of_day_naive())
}

/// The given wall-clock time on the given calendar day in `tz`.
pub fn at_time<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    from_local_datetime(tz, NaiveDateTime::new(date, time))
}

/// Convert the `NaiveDateTime` to the local timezone, handles local time ambiguities:
/// - `Single(dt)` returns directly;
/// - `Ambiguous(a, b)` takes the earlier one;
/// - `None` (local time does not exist, e.g., due to DST transition): falls back to UTC
///   combination and then converts.
pub fn from_local_datetime<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(x) => x,
        LocalResult::Ambiguous(a, b) => {
            // Choose the earlier one
            if a <= b { a } else { b }
        }
        LocalResult::None => Utc.from_utc_datetime(&naive).with_timezone(tz),
    }
}

/// The first day of the month containing `date`.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The last day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = match date.month() {
        12 => (date.year() + 1, 1),
        m => (date.year(), m + 1),
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}
