// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use chrono::{DateTime, Days, TimeZone};

use crate::datetime::{
    DayClass, classify, days_left, end_of_today, next_7_days_range, start_of_day,
    start_of_today, this_month_range,
};
use crate::Event;

/// The views events can be listed in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum EventFilter {
    /// Every event that is not archived.
    #[default]
    All,

    /// Events on the current calendar day.
    Today,

    /// Events from tomorrow on.
    Upcoming,

    /// Events before today.
    Past,

    /// Events from today to the end of the 7th day from now.
    #[cfg_attr(feature = "clap", clap(name = "week"))]
    Next7Days,

    /// Events in the current calendar month.
    #[cfg_attr(feature = "clap", clap(name = "month"))]
    ThisMonth,

    /// Archived events only.
    Archived,
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventFilter::All => "All",
            EventFilter::Today => "Today",
            EventFilter::Upcoming => "Upcoming",
            EventFilter::Past => "Past",
            EventFilter::Next7Days => "Next 7 days",
            EventFilter::ThisMonth => "This month",
            EventFilter::Archived => "Archived",
        })
    }
}

/// Conditions a stored event must meet, with all bounds in epoch milliseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEventConditions {
    /// Only archived, or only unarchived, events.
    pub archived: Option<bool>,

    /// Earliest event date, inclusive.
    pub date_from: Option<i64>,

    /// Latest event date, inclusive.
    pub date_to: Option<i64>,

    /// Only events with notifications on, or off.
    pub notify_me: Option<bool>,

    /// Only important, or only ordinary, events.
    pub important: Option<bool>,
}

impl ResolvedEventConditions {
    /// Turns a filter into concrete bounds for the calendar day of `now`.
    pub fn resolve<Tz: TimeZone>(filter: EventFilter, now: &DateTime<Tz>) -> Self {
        let active = Self {
            archived: Some(false),
            ..Default::default()
        };

        match filter {
            EventFilter::All => active,
            EventFilter::Today => Self {
                date_from: Some(start_of_today(now).timestamp_millis()),
                date_to: Some(end_of_today(now).timestamp_millis()),
                ..active
            },
            EventFilter::Upcoming => Self {
                date_from: Some(start_of_tomorrow(now)),
                ..active
            },
            EventFilter::Past => Self {
                date_to: Some(start_of_today(now).timestamp_millis() - 1),
                ..active
            },
            EventFilter::Next7Days => {
                let range = next_7_days_range(now);
                Self {
                    date_from: Some(range.start_millis()),
                    date_to: Some(range.end_millis()),
                    ..active
                }
            }
            EventFilter::ThisMonth => {
                let range = this_month_range(now);
                Self {
                    date_from: Some(range.start_millis()),
                    date_to: Some(range.end_millis()),
                    ..active
                }
            }
            EventFilter::Archived => Self {
                archived: Some(true),
                ..Default::default()
            },
        }
    }

    /// Unarchived events with notifications on and a date after `after`.
    pub fn with_reminders<Tz: TimeZone>(after: &DateTime<Tz>) -> Self {
        Self {
            archived: Some(false),
            date_from: Some(after.timestamp_millis().saturating_add(1)),
            date_to: None,
            notify_me: Some(true),
            important: None,
        }
    }

    /// Checks an event against the conditions.
    pub fn matches(&self, event: &Event) -> bool {
        let date = event.date_millis();
        self.archived.is_none_or(|a| a == event.is_archived())
            && self.notify_me.is_none_or(|n| n == event.notify_me())
            && self.important.is_none_or(|i| i == event.is_important())
            && self.date_from.is_none_or(|from| date >= from)
            && self.date_to.is_none_or(|to| date <= to)
    }
}

fn start_of_tomorrow<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let today = start_of_today(now);
    match today.clone().checked_add_days(Days::new(1)) {
        Some(tomorrow) => start_of_day(&tomorrow).timestamp_millis(),
        None => end_of_today(now).timestamp_millis().saturating_add(1),
    }
}

/// Orderings for event lists.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum EventSort {
    /// Earliest date first.
    #[default]
    Date,

    /// Closest to today first, in either direction.
    #[cfg_attr(feature = "clap", clap(name = "days-left"))]
    DaysLeft,

    /// By title, ignoring case.
    #[cfg_attr(feature = "clap", clap(name = "title"))]
    Alphabetical,
}

impl EventSort {
    /// Sorts events in place relative to the calendar day of `now`.
    pub fn sort<Tz: TimeZone>(self, events: &mut [Event], now: &DateTime<Tz>) {
        match self {
            EventSort::Date => events.sort_by_key(|e| (e.date(), e.id())),
            EventSort::DaysLeft => {
                events.sort_by_key(|e| (days_left(&e.date(), now).unsigned_abs(), e.date(), e.id()))
            }
            EventSort::Alphabetical => {
                events.sort_by_cached_key(|e| (e.title().to_lowercase(), e.date(), e.id()))
            }
        }
    }
}

/// Groups of a sectioned event list, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSection {
    Today,
    Upcoming,
    Past,
}

impl EventSection {
    pub const fn title(self) -> &'static str {
        match self {
            EventSection::Today => "Today",
            EventSection::Upcoming => "Upcoming",
            EventSection::Past => "Past",
        }
    }

    fn of(class: DayClass) -> Self {
        match class {
            DayClass::Today => EventSection::Today,
            DayClass::Upcoming => EventSection::Upcoming,
            DayClass::Past => EventSection::Past,
        }
    }
}

impl fmt::Display for EventSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A row of a sectioned list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventListItem {
    SectionHeader(EventSection),
    Event(Event),
}

/// Splits events into Today, Upcoming and Past sections, keeping their order
/// within a section. Empty sections get no header.
pub fn sectioned<Tz: TimeZone>(events: Vec<Event>, now: &DateTime<Tz>) -> Vec<EventListItem> {
    let sections = [EventSection::Today, EventSection::Upcoming, EventSection::Past];
    let mut groups: [Vec<Event>; 3] = Default::default();
    for event in events {
        let section = EventSection::of(classify(&event.date(), now));
        if let Some(idx) = sections.iter().position(|s| *s == section) {
            groups[idx].push(event);
        }
    }

    let mut items = Vec::new();
    for (section, group) in sections.into_iter().zip(groups) {
        if group.is_empty() {
            continue;
        }
        items.push(EventListItem::SectionHeader(section));
        items.extend(group.into_iter().map(EventListItem::Event));
    }
    items
}
