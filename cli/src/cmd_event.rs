// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use chrono::{DateTime, Local};
use clap::{ArgMatches, Command};
use colored::Colorize;
use daysleft_core::{
    DaysLeft, Event, EventDraft, EventFilter, EventId, EventPatch, EventSort, Pager,
    ReminderOffset,
};

use crate::arg::{CommonArgs, EventArgs, ListArgs};
use crate::event_formatter::EventFormatter;
use crate::reminder_formatter::ReminderFormatter;
use crate::util::OutputFormat;

#[derive(Debug, Clone)]
pub struct CmdEventList {
    pub filter: EventFilter,
    pub sort: EventSort,
    pub sections: bool,
    pub limit: i64,
    pub output_format: OutputFormat,
}

impl Default for CmdEventList {
    fn default() -> Self {
        Self {
            filter: EventFilter::All,
            sort: EventSort::Date,
            sections: false,
            limit: 100,
            output_format: OutputFormat::Table,
        }
    }
}

impl CmdEventList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List events with the days left until them")
            .arg(ListArgs::filter())
            .arg(ListArgs::sort())
            .arg(ListArgs::sections())
            .arg(ListArgs::limit())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            filter: ListArgs::get_filter(matches),
            sort: ListArgs::get_sort(matches),
            sections: ListArgs::get_sections(matches),
            limit: ListArgs::get_limit(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing events...");
        let formatter = EventFormatter::new(app.now()).with_output_format(self.output_format);
        if self.sections {
            let items = app.list_sections(self.filter, self.sort).await?;
            print!("{}", formatter.format_sections(&items));
            return Ok(());
        }

        let pager: Pager = (self.limit, 0).into();
        let events = app.list_events(self.filter, self.sort, Some(&pager)).await?;
        if events.len() as i64 == self.limit && app.count_events(self.filter).await? > self.limit {
            eprintln!("Displaying only the first {} events", self.limit);
        }
        print!("{}", formatter.format(&events));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventAdd {
    pub title: String,
    pub date: DateTime<Local>,
    pub notify: bool,
    pub offset: Option<i64>,
    pub important: bool,
    pub output_format: OutputFormat,
}

impl CmdEventAdd {
    pub const NAME: &str = "add";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("new")
            .about("Add a new event")
            .arg(EventArgs::title(true))
            .arg(EventArgs::date(true))
            .arg(EventArgs::notify())
            .arg(EventArgs::offset())
            .arg(EventArgs::important())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            title: EventArgs::get_title(matches).ok_or("Title is required for new event")?,
            date: EventArgs::get_date(matches).ok_or("Date is required for new event")?,
            notify: matches.get_flag("notify"),
            offset: EventArgs::get_offset(matches),
            important: matches.get_flag("important"),
            output_format: CommonArgs::get_output_format(matches),
        })
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "adding new event...");
        let draft = EventDraft {
            title: self.title,
            date_millis: self.date.timestamp_millis(),
            notify_me: self.notify,
            reminder_offset_days: self
                .offset
                .unwrap_or_else(|| i64::from(ReminderOffset::default().days())),
            is_important: self.important,
        };
        let event = app.add_event(draft).await?;
        print_events(app, &[event], self.output_format);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventEdit {
    pub id: EventId,
    pub title: Option<String>,
    pub date: Option<DateTime<Local>>,
    pub notify: Option<bool>,
    pub offset: Option<i64>,
    pub important: Option<bool>,
    pub output_format: OutputFormat,
}

impl CmdEventEdit {
    pub const NAME: &str = "edit";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Edit an event")
            .arg(EventArgs::id())
            .arg(EventArgs::title(false))
            .arg(EventArgs::date(false))
            .arg(EventArgs::notify())
            .arg(EventArgs::no_notify())
            .arg(EventArgs::offset())
            .arg(EventArgs::important())
            .arg(EventArgs::not_important())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            id: EventArgs::get_id(matches)?,
            title: EventArgs::get_title(matches),
            date: EventArgs::get_date(matches),
            notify: EventArgs::get_notify(matches),
            offset: EventArgs::get_offset(matches),
            important: EventArgs::get_important(matches),
            output_format: CommonArgs::get_output_format(matches),
        })
    }

    pub fn patch(&self) -> EventPatch {
        EventPatch {
            title: self.title.clone(),
            date_millis: self.date.map(|a| a.timestamp_millis()),
            notify_me: self.notify,
            reminder_offset_days: self.offset,
            is_archived: None,
            is_important: self.important,
        }
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "editing event...");
        let patch = self.patch();
        if patch.is_empty() {
            return Err("Nothing to change, see `daysleft edit --help`".into());
        }

        let event = app.update_event(self.id, &patch).await?;
        print_events(app, &[event], self.output_format);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventDelete {
    pub ids: Vec<EventId>,
}

impl CmdEventDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete events and their reminders")
            .arg(EventArgs::ids())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: EventArgs::get_ids(matches),
        }
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting events...");
        for id in self.ids {
            let event = app.delete_event(id).await?;
            println!("{} #{} {}", "Deleted".red(), event.id(), event.title());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventArchive {
    pub ids: Vec<EventId>,
    pub output_format: OutputFormat,
}

impl CmdEventArchive {
    pub const NAME: &str = "archive";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Archive events, hiding them from lists and muting their reminders")
            .arg(EventArgs::ids())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: EventArgs::get_ids(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "archiving events...");
        let mut events = Vec::with_capacity(self.ids.len());
        for id in self.ids {
            events.push(app.archive_event(id).await?);
        }
        print_events(app, &events, self.output_format);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventRestore {
    pub ids: Vec<EventId>,
    pub output_format: OutputFormat,
}

impl CmdEventRestore {
    pub const NAME: &str = "restore";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("unarchive")
            .about("Restore archived events")
            .arg(EventArgs::ids())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            ids: EventArgs::get_ids(matches),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "restoring events...");
        let mut events = Vec::with_capacity(self.ids.len());
        for id in self.ids {
            events.push(app.restore_event(id).await?);
        }
        print_events(app, &events, self.output_format);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdEventReminders {
    pub id: EventId,
    pub output_format: OutputFormat,
}

impl CmdEventReminders {
    pub const NAME: &str = "reminders";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Show the reminders an event gets, without scheduling them")
            .arg(EventArgs::id())
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            id: EventArgs::get_id(matches)?,
            output_format: CommonArgs::get_output_format(matches),
        })
    }

    pub async fn run(self, app: &DaysLeft) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "planning reminders...");
        let event = app.get_event(self.id).await?;
        let reminders = app.plan_reminders(self.id).await?;
        if self.output_format == OutputFormat::Table {
            match reminders.is_empty() {
                true => println!("No reminders for #{} {}", event.id(), event.title()),
                false => println!("Reminders for #{} {}", event.id(), event.title().bold()),
            }
        }

        let formatter = ReminderFormatter::new(app.now()).with_output_format(self.output_format);
        print!("{}", formatter.format(&reminders));
        Ok(())
    }
}

fn print_events(app: &DaysLeft, events: &[Event], output_format: OutputFormat) {
    let formatter = EventFormatter::new(app.now()).with_output_format(output_format);
    print!("{}", formatter.format(events));
}
