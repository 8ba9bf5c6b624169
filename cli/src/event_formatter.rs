// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use chrono::{DateTime, Local};
use colored::{Color, Colorize};
use daysleft_core::datetime::{days_left, relative_label};
use daysleft_core::{Event, EventListItem, EventSection};

use crate::table::{
    PaddingDirection, Table, TableColumn, TableStyleBasic, TableStyleJson, write_json,
};
use crate::util::{OutputFormat, format_date};

#[derive(Debug)]
pub struct EventFormatter {
    columns: Vec<EventColumn>,
    format: OutputFormat,
}

impl EventFormatter {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            columns: vec![
                EventColumn::Id,
                EventColumn::Date,
                EventColumn::DaysLeft(now),
                EventColumn::Title,
                EventColumn::Flags,
            ],
            format: OutputFormat::Table,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format<'a>(&'a self, events: &'a [Event]) -> Display<'a> {
        Display {
            events,
            formatter: self,
        }
    }

    pub fn format_sections<'a>(&'a self, items: &'a [EventListItem]) -> SectionsDisplay<'a> {
        let mut sections: Vec<(EventSection, Vec<Event>)> = Vec::new();
        for item in items {
            match item {
                EventListItem::SectionHeader(section) => sections.push((*section, Vec::new())),
                EventListItem::Event(event) => match sections.last_mut() {
                    Some((_, events)) => events.push(event.clone()),
                    None => tracing::warn!(id = %event.id(), "event listed before any section"),
                },
            }
        }

        SectionsDisplay {
            sections,
            formatter: self,
        }
    }
}

#[derive(Debug)]
pub struct Display<'a> {
    events: &'a [Event],
    formatter: &'a EventFormatter,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = &self.formatter.columns;
        match self.formatter.format {
            OutputFormat::Json => write!(
                f,
                "{}",
                Table::new(TableStyleJson::new(), columns, self.events)
            ),
            OutputFormat::Table => write!(
                f,
                "{}",
                Table::new(TableStyleBasic::new(), columns, self.events)
            ),
        }
    }
}

#[derive(Debug)]
pub struct SectionsDisplay<'a> {
    sections: Vec<(EventSection, Vec<Event>)>,
    formatter: &'a EventFormatter,
}

impl fmt::Display for SectionsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = &self.formatter.columns;
        match self.formatter.format {
            OutputFormat::Json => {
                let sections = self
                    .sections
                    .iter()
                    .map(|(section, events)| {
                        serde_json::json!({
                            "section": section.title(),
                            "events": TableStyleJson::rows(columns, events),
                        })
                    })
                    .collect();
                write_json(f, &serde_json::Value::Array(sections))
            }
            OutputFormat::Table => {
                for (i, (section, events)) in self.sections.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{}", section.title().bold())?;
                    write!(f, "{}", Table::new(TableStyleBasic::new(), columns, events))?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum EventColumn {
    Id,
    Date,
    DaysLeft(DateTime<Local>),
    Title,
    Flags,
}

impl TableColumn<Event> for EventColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            EventColumn::Id => "ID",
            EventColumn::Date => "Date",
            EventColumn::DaysLeft(_) => "Days Left",
            EventColumn::Title => "Title",
            EventColumn::Flags => "Flags",
        }
        .into()
    }

    fn format<'a>(&self, event: &'a Event) -> Cow<'a, str> {
        match self {
            EventColumn::Id => format!("#{}", event.id()).into(),
            EventColumn::Date => format_date(&event.date().with_timezone(&Local)).into(),
            EventColumn::DaysLeft(now) => relative_label(&event.date(), now).into(),
            EventColumn::Title => event.title().into(),
            EventColumn::Flags => format_flags(event).into(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            EventColumn::Id | EventColumn::DaysLeft(_) => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }

    fn color(&self, event: &Event) -> Option<Color> {
        match self {
            EventColumn::DaysLeft(now) => match days_left(&event.date(), now) {
                ..=-1 => Some(Color::BrightBlack),
                0 => Some(Color::Red),
                1..=7 => Some(Color::Yellow),
                _ => None,
            },
            EventColumn::Title if event.is_archived() => Some(Color::BrightBlack),
            EventColumn::Title if event.is_important() => Some(Color::Red),
            _ => None,
        }
    }
}

fn format_flags(event: &Event) -> String {
    let mut flags = Vec::new();
    if event.is_important() {
        flags.push("important".to_string());
    }
    if event.notify_me() {
        flags.push(format!("remind {}d before", event.reminder_offset_days()));
    }
    if event.is_archived() {
        flags.push("archived".to_string());
    }
    flags.join(", ")
}
