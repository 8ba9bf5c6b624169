// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, num::NonZeroU32, str::FromStr};

use chrono::{DateTime, Utc};

use crate::error::ValidationError;

/// Identity of a stored event, assigned by the store on creation.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl EventId {
    /// The id of an event that has not been persisted yet.
    pub const UNSAVED: EventId = EventId(0);

    /// Whether the event has been persisted.
    pub fn is_saved(self) -> bool {
        self != Self::UNSAVED
    }

    /// The raw row id.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EventId)
    }
}

/// A named date the user is counting towards or away from.
///
/// An `Event` can only be obtained through validation, so the title is never
/// blank and the reminder offset is always at least one day.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Event {
    id: EventId,
    title: String,
    #[serde(rename = "date_millis", with = "chrono::serde::ts_milliseconds")]
    date: DateTime<Utc>,
    notify_me: bool,
    reminder_offset_days: NonZeroU32,
    is_archived: bool,
    is_important: bool,
}

impl Event {
    /// Creates an unsaved event with default notification settings.
    pub fn new(title: impl Into<String>, date_millis: i64) -> Result<Self, ValidationError> {
        EventDraft::new(title, date_millis).validate()
    }

    /// Rebuilds an event from its stored columns, validating them again.
    pub(crate) fn from_parts(
        id: EventId,
        draft: EventDraft,
        is_archived: bool,
    ) -> Result<Self, ValidationError> {
        let mut event = draft.validate()?;
        event.id = id;
        event.is_archived = is_archived;
        Ok(event)
    }

    pub(crate) fn with_id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }

    /// The store-assigned id, [`EventId::UNSAVED`] before persistence.
    pub fn id(&self) -> EventId {
        self.id
    }

    /// The display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The instant the event refers to.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The instant the event refers to, in epoch milliseconds.
    pub fn date_millis(&self) -> i64 {
        self.date.timestamp_millis()
    }

    /// Whether reminder notifications are desired.
    pub fn notify_me(&self) -> bool {
        self.notify_me
    }

    /// Days before the event at which the preferred reminder fires.
    pub fn reminder_offset_days(&self) -> u32 {
        self.reminder_offset_days.get()
    }

    /// Archived events are hidden from the default views.
    pub fn is_archived(&self) -> bool {
        self.is_archived
    }

    /// Important events get extra, more urgent reminders.
    pub fn is_important(&self) -> bool {
        self.is_important
    }

    fn to_draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            date_millis: self.date_millis(),
            notify_me: self.notify_me,
            reminder_offset_days: i64::from(self.reminder_offset_days.get()),
            is_important: self.is_important,
        }
    }
}

/// Draft for an event, used for creating new events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// The title of the event, must not be blank.
    pub title: String,

    /// The event date in epoch milliseconds.
    pub date_millis: i64,

    /// Whether reminders should be scheduled.
    pub notify_me: bool,

    /// Days before the event for the preferred reminder, must be positive.
    pub reminder_offset_days: i64,

    /// Whether the event is important.
    pub is_important: bool,
}

impl EventDraft {
    /// Creates a draft with notifications off and the default offset.
    pub fn new(title: impl Into<String>, date_millis: i64) -> Self {
        Self {
            title: title.into(),
            date_millis,
            notify_me: false,
            reminder_offset_days: i64::from(ReminderOffset::default().days()),
            is_important: false,
        }
    }

    /// Checks the draft and turns it into an unsaved, unarchived event.
    pub fn validate(self) -> Result<Event, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::BlankTitle);
        }

        let reminder_offset_days = u32::try_from(self.reminder_offset_days)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(ValidationError::NonPositiveOffset(self.reminder_offset_days))?;

        let date = DateTime::from_timestamp_millis(self.date_millis)
            .ok_or(ValidationError::DateOutOfRange(self.date_millis))?;

        Ok(Event {
            id: EventId::UNSAVED,
            title: title.to_string(),
            date,
            notify_me: self.notify_me,
            reminder_offset_days,
            is_archived: false,
            is_important: self.is_important,
        })
    }
}

/// Patch for an event, allowing partial updates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventPatch {
    /// The new title, if set.
    pub title: Option<String>,

    /// The new date in epoch milliseconds, if set.
    pub date_millis: Option<i64>,

    /// Turn reminders on or off, if set.
    pub notify_me: Option<bool>,

    /// The new reminder offset in days, if set.
    pub reminder_offset_days: Option<i64>,

    /// Archive or restore, if set.
    pub is_archived: Option<bool>,

    /// Mark or unmark as important, if set.
    pub is_important: Option<bool>,
}

impl EventPatch {
    /// Is this patch empty, meaning no fields are set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date_millis.is_none()
            && self.notify_me.is_none()
            && self.reminder_offset_days.is_none()
            && self.is_archived.is_none()
            && self.is_important.is_none()
    }

    /// Applies the patch to a copy of the event, validating the result.
    pub fn apply_to(&self, event: &Event) -> Result<Event, ValidationError> {
        let mut draft = event.to_draft();
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(date_millis) = self.date_millis {
            draft.date_millis = date_millis;
        }
        if let Some(notify_me) = self.notify_me {
            draft.notify_me = notify_me;
        }
        if let Some(offset) = self.reminder_offset_days {
            draft.reminder_offset_days = offset;
        }
        if let Some(is_important) = self.is_important {
            draft.is_important = is_important;
        }

        let is_archived = self.is_archived.unwrap_or(event.is_archived);
        Event::from_parts(event.id, draft, is_archived)
    }
}

/// The reminder lead times offered when creating an event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOffset {
    /// One day before.
    #[default]
    OneDay,

    /// Three days before.
    ThreeDays,

    /// One week before.
    OneWeek,
}

impl ReminderOffset {
    /// All presets, shortest first.
    pub const ALL: [ReminderOffset; 3] = [Self::OneDay, Self::ThreeDays, Self::OneWeek];

    /// The lead time in days.
    pub const fn days(self) -> u32 {
        match self {
            Self::OneDay => 1,
            Self::ThreeDays => 3,
            Self::OneWeek => 7,
        }
    }

    /// Human readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OneDay => "1 day before",
            Self::ThreeDays => "3 days before",
            Self::OneWeek => "1 week before",
        }
    }
}

impl fmt::Display for ReminderOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ReminderOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "day" => Ok(Self::OneDay),
            "3d" => Ok(Self::ThreeDays),
            "7d" | "1w" | "week" => Ok(Self::OneWeek),
            _ => Err(format!("Invalid reminder offset: {s}")),
        }
    }
}
