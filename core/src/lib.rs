// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Core of Days Left, a tracker that counts the days to personal events and
//! reminds about them ahead of time.

mod app;
mod clock;
mod config;
mod error;
mod event;
mod filter;
mod localdb;
mod settings;
mod types;
mod worker;

pub mod datetime;
pub mod jobs;
pub mod notify;
pub mod reminder;

pub use crate::app::{DaysLeft, EventWatch};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::{APP_NAME, Config, ConfigTime};
pub use crate::error::{Error, ValidationError};
pub use crate::event::{Event, EventDraft, EventId, EventPatch, ReminderOffset};
pub use crate::filter::{
    EventFilter, EventListItem, EventSection, EventSort, ResolvedEventConditions, sectioned,
};
pub use crate::localdb::{Events, LocalDb};
pub use crate::settings::{Settings, SettingsStore};
pub use crate::types::{Pager, Priority};
pub use crate::worker::{JobDispatcher, digest_notification, reminder_notification};
