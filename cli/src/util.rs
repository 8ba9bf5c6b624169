// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use chrono::offset::LocalResult;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use daysleft_core::ReminderOffset;

/// The output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

const DATE_FORMAT_HINT: &str = "Invalid date format. Expected format: YYYY-MM-DD or YYYY-MM-DD HH:MM";

/// Parses "YYYY-MM-DD" (midnight) or "YYYY-MM-DD HH:MM" as a local date and time.
pub fn parse_date(s: &str) -> Result<DateTime<Local>, String> {
    let s = s.trim();
    let dt = if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        dt
    } else if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        date.and_time(NaiveTime::MIN)
    } else {
        return Err(DATE_FORMAT_HINT.to_string());
    };
    local_from_datetime(dt)
}

/// Parses a reminder offset, either a number of days or a preset such as "1w".
pub fn parse_offset(s: &str) -> Result<i64, String> {
    match s.trim().parse::<i64>() {
        Ok(days) => Ok(days),
        Err(_) => s.parse::<ReminderOffset>().map(|a| i64::from(a.days())),
    }
}

/// Formats a date, leaving out the time when it is midnight.
pub fn format_date(dt: &DateTime<Local>) -> String {
    if dt.num_seconds_from_midnight() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M").to_string()
    }
}

fn local_from_datetime(dt: NaiveDateTime) -> Result<DateTime<Local>, String> {
    match Local.from_local_datetime(&dt) {
        LocalResult::Single(a) => Ok(a),
        // Repeated hour when the clocks go back, take the earlier one
        LocalResult::Ambiguous(a, _) => Ok(a),
        LocalResult::None => Err(format!("{dt} does not exist in the local timezone")),
    }
}
