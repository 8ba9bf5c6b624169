// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{borrow::Cow, fmt};

use chrono::{DateTime, Local};
use daysleft_core::datetime::relative_label;
use daysleft_core::reminder::PlannedReminder;

use crate::table::{PaddingDirection, Table, TableColumn, TableStyleBasic, TableStyleJson};
use crate::util::OutputFormat;

#[derive(Debug)]
pub struct ReminderFormatter {
    columns: Vec<ReminderColumn>,
    format: OutputFormat,
}

impl ReminderFormatter {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            columns: vec![
                ReminderColumn::FiresAt,
                ReminderColumn::When(now),
                ReminderColumn::Repeat,
                ReminderColumn::Kind,
            ],
            format: OutputFormat::Table,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn format<'a>(&'a self, reminders: &'a [PlannedReminder]) -> Display<'a> {
        Display {
            reminders,
            formatter: self,
        }
    }
}

#[derive(Debug)]
pub struct Display<'a> {
    reminders: &'a [PlannedReminder],
    formatter: &'a ReminderFormatter,
}

impl fmt::Display for Display<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = &self.formatter.columns;
        match self.formatter.format {
            OutputFormat::Json => write!(
                f,
                "{}",
                Table::new(TableStyleJson::new(), columns, self.reminders)
            ),
            OutputFormat::Table => write!(
                f,
                "{}",
                Table::new(TableStyleBasic::new().with_header(true), columns, self.reminders)
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ReminderColumn {
    FiresAt,
    When(DateTime<Local>),
    Repeat,
    Kind,
}

impl TableColumn<PlannedReminder> for ReminderColumn {
    fn name(&self) -> Cow<'_, str> {
        match self {
            ReminderColumn::FiresAt => "Fires At",
            ReminderColumn::When(_) => "When",
            ReminderColumn::Repeat => "Repeat",
            ReminderColumn::Kind => "Kind",
        }
        .into()
    }

    fn format<'a>(&self, reminder: &'a PlannedReminder) -> Cow<'a, str> {
        let at = reminder.schedule.first_at();
        match self {
            ReminderColumn::FiresAt => at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .into(),
            ReminderColumn::When(now) => relative_label(&at, now).into(),
            ReminderColumn::Repeat if reminder.schedule.is_recurring() => "daily".into(),
            ReminderColumn::Repeat => "once".into(),
            ReminderColumn::Kind => reminder.kind.to_string().into(),
        }
    }

    fn padding_direction(&self) -> PaddingDirection {
        match self {
            ReminderColumn::When(_) => PaddingDirection::Right,
            _ => PaddingDirection::Left,
        }
    }
}
