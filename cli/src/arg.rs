// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use chrono::{DateTime, Local};
use clap::{Arg, ArgAction, ArgMatches, arg, value_parser};
use daysleft_core::{EventFilter, EventId, EventSort};

use crate::util::{OutputFormat, parse_date, parse_offset};

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn verbose() -> Arg {
        arg!(-v --verbose "Show debug logs on stderr").global(true)
    }

    pub fn get_verbose(matches: &ArgMatches) -> bool {
        matches.get_flag("verbose")
    }

    pub fn output_format() -> Arg {
        arg!(--"output-format" <FORMAT> "Output format")
            .value_parser(value_parser!(OutputFormat))
            .default_value("table")
    }

    pub fn get_output_format(matches: &ArgMatches) -> OutputFormat {
        matches
            .get_one("output-format")
            .copied()
            .unwrap_or(OutputFormat::Table)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventArgs;

impl EventArgs {
    pub fn id() -> Arg {
        arg!(id: <ID> "The id of the event").value_parser(parse_id)
    }

    pub fn get_id(matches: &ArgMatches) -> Result<EventId, Box<dyn Error>> {
        matches
            .get_one::<EventId>("id")
            .copied()
            .ok_or_else(|| "Event id is required".into())
    }

    pub fn ids() -> Arg {
        arg!(id: <ID> "The ids of the events")
            .value_parser(parse_id)
            .num_args(1..)
    }

    pub fn get_ids(matches: &ArgMatches) -> Vec<EventId> {
        matches
            .get_many::<EventId>("id")
            .map(|ids| ids.copied().collect())
            .unwrap_or_default()
    }

    pub fn title(positional: bool) -> Arg {
        if positional {
            arg!(title: <TITLE> "Title of the event")
        } else {
            arg!(title: -t --title <TITLE> "New title of the event")
        }
    }

    pub fn get_title(matches: &ArgMatches) -> Option<String> {
        matches.get_one("title").cloned()
    }

    pub fn date(required: bool) -> Arg {
        arg!(-d --date <DATE> "Date of the event, YYYY-MM-DD or YYYY-MM-DD HH:MM")
            .value_parser(parse_date)
            .required(required)
    }

    pub fn get_date(matches: &ArgMatches) -> Option<DateTime<Local>> {
        matches.get_one("date").copied()
    }

    pub fn notify() -> Arg {
        arg!(-n --notify "Remind me before the event")
    }

    pub fn no_notify() -> Arg {
        arg!(--"no-notify" "Stop reminding me about the event").conflicts_with("notify")
    }

    /// `Some(true)` for `--notify`, `Some(false)` for `--no-notify`.
    pub fn get_notify(matches: &ArgMatches) -> Option<bool> {
        get_toggle(matches, "notify", "no-notify")
    }

    pub fn offset() -> Arg {
        arg!(-o --offset <DAYS> "Days before the event for the reminder, or 1d, 3d, 1w")
            .value_parser(parse_offset)
    }

    pub fn get_offset(matches: &ArgMatches) -> Option<i64> {
        matches.get_one("offset").copied()
    }

    pub fn important() -> Arg {
        arg!(-i --important "Mark the event as important, with daily reminders")
    }

    pub fn not_important() -> Arg {
        arg!(--"not-important" "Unmark the event as important").conflicts_with("important")
    }

    /// `Some(true)` for `--important`, `Some(false)` for `--not-important`.
    pub fn get_important(matches: &ArgMatches) -> Option<bool> {
        get_toggle(matches, "important", "not-important")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ListArgs;

impl ListArgs {
    pub fn filter() -> Arg {
        arg!(-f --filter <FILTER> "Which events to list")
            .value_parser(value_parser!(EventFilter))
            .default_value("all")
    }

    pub fn get_filter(matches: &ArgMatches) -> EventFilter {
        matches.get_one("filter").copied().unwrap_or_default()
    }

    pub fn sort() -> Arg {
        arg!(-s --sort <SORT> "Order of the events")
            .value_parser(value_parser!(EventSort))
            .default_value("date")
    }

    pub fn get_sort(matches: &ArgMatches) -> EventSort {
        matches.get_one("sort").copied().unwrap_or_default()
    }

    pub fn sections() -> Arg {
        arg!(--sections "Group the events into today, upcoming and past")
            .action(ArgAction::SetTrue)
    }

    pub fn get_sections(matches: &ArgMatches) -> bool {
        matches.get_flag("sections")
    }

    pub fn limit() -> Arg {
        arg!(-l --limit <N> "Maximum number of events to show")
            .value_parser(value_parser!(i64).range(1..))
            .default_value("100")
    }

    pub fn get_limit(matches: &ArgMatches) -> i64 {
        matches.get_one("limit").copied().unwrap_or(100)
    }
}

fn parse_id(s: &str) -> Result<EventId, String> {
    s.trim_start_matches('#')
        .parse()
        .map_err(|_| format!("Invalid event id '{s}'"))
}

fn get_toggle(matches: &ArgMatches, on: &str, off: &str) -> Option<bool> {
    if matches.get_flag(on) {
        Some(true)
    } else if matches.get_flag(off) {
        Some(false)
    } else {
        None
    }
}
