// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::Priority;

/// Fixed notification id of the daily digest, events use their own id.
pub const DIGEST_NOTIFICATION_ID: i64 = -2;

/// Notification channels, each with its own default priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Reminders for upcoming events.
    UpcomingEvents,

    /// The daily summary of the coming week.
    DailyDigest,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::UpcomingEvents, Channel::DailyDigest];

    pub const fn id(self) -> &'static str {
        match self {
            Channel::UpcomingEvents => "upcoming_events",
            Channel::DailyDigest => "daily_digest",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Channel::UpcomingEvents => "Upcoming Events",
            Channel::DailyDigest => "Daily Digest",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Channel::UpcomingEvents => "Notifications for upcoming events",
            Channel::DailyDigest => "Daily summary of upcoming events",
        }
    }

    pub const fn default_priority(self) -> Priority {
        match self {
            Channel::UpcomingEvents => Priority::Default,
            Channel::DailyDigest => Priority::Low,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A user-visible notification.
///
/// Posting a notification with an id that is already shown replaces it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub id: i64,
    pub channel: Channel,
    pub title: String,
    pub body: String,
    pub priority: Priority,
}

impl Notification {
    /// High priority notifications also vibrate and flash the lights.
    pub fn is_alerting(&self) -> bool {
        self.priority == Priority::High
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The user turned the channel off; nothing will be shown.
    #[error("notifications are disabled for channel {0}")]
    ChannelDisabled(Channel),

    /// The notification service failed.
    #[error("failed to post notification: {0}")]
    Post(String),
}

/// Posts notifications to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: &Notification) -> Result<(), NotifyError> {
        match n.priority {
            Priority::High => tracing::warn!(
                id = n.id, channel = %n.channel, title = %n.title, "{}", n.body
            ),
            _ => tracing::info!(
                id = n.id, channel = %n.channel, title = %n.title, "{}", n.body
            ),
        }
        Ok(())
    }
}

/// Keeps posted notifications in memory, replacing those with the same id.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    posted: Mutex<Vec<Notification>>,
    disabled: Mutex<Vec<Channel>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications currently shown, in posting order.
    pub fn posted(&self) -> Vec<Notification> {
        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Turns a channel off, as a user could in the system settings.
    pub fn disable(&self, channel: Channel) {
        self.disabled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(channel);
    }

    pub fn clear(&self) {
        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let disabled = self
            .disabled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&notification.channel);
        if disabled {
            return Err(NotifyError::ChannelDisabled(notification.channel));
        }

        let mut posted = self.posted.lock().unwrap_or_else(PoisonError::into_inner);
        posted.retain(|n| n.id != notification.id);
        posted.push(notification.clone());
        Ok(())
    }
}
