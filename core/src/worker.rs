// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone};

use crate::clock::Clock;
use crate::datetime::{days_before, days_left, next_7_days_range};
use crate::filter::ResolvedEventConditions;
use crate::jobs::{Job, JobEngine, JobKind, JobOutcome, JobRunner, event_reminder_tag};
use crate::localdb::LocalDb;
use crate::notify::{Channel, DIGEST_NOTIFICATION_ID, Notification, Notifier, NotifyError};
use crate::reminder::{ReminderKind, ReminderPayload, reminder_priority};
use crate::{Config, Event, EventId, Priority};

/// Date format used in notification texts, e.g. "Jun 15, 2025".
const NOTIFICATION_DATE_FORMAT: &str = "%b %d, %Y";

/// Runs the background jobs of the application.
///
/// Reminders are checked against the stored event when they fire: a reminder
/// for an event that is gone, archived or muted does nothing.
#[derive(Clone)]
pub struct JobDispatcher {
    db: LocalDb,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    archive_after_days: u32,
}

impl fmt::Debug for JobDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobDispatcher")
            .field("db", &self.db)
            .field("clock", &self.clock)
            .field("archive_after_days", &self.archive_after_days)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl JobRunner for JobDispatcher {
    async fn run(&self, job: &Job, engine: &dyn JobEngine) -> JobOutcome {
        match job.kind {
            JobKind::EventReminder => self.remind(job, engine).await,
            JobKind::DailyDigest => self.digest().await,
            JobKind::AutoArchive => self.auto_archive(engine).await,
        }
    }
}

impl JobDispatcher {
    pub fn new(
        db: LocalDb,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        Self {
            db,
            notifier,
            clock,
            archive_after_days: config.auto_archive_after_days,
        }
    }

    #[tracing::instrument(skip_all, fields(tag = %job.tag))]
    async fn remind(&self, job: &Job, engine: &dyn JobEngine) -> JobOutcome {
        let payload: ReminderPayload = match job.payload() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%err, "dropping reminder with invalid payload");
                return JobOutcome::Success;
            }
        };

        let event = match self.db.events.get(payload.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => return self.stale(job, engine, payload.event_id, "event no longer exists"),
            Err(err) => {
                tracing::warn!(%err, "failed to load event for reminder");
                return JobOutcome::Retry;
            }
        };

        if event.is_archived() {
            return self.stale(job, engine, event.id(), "event is archived");
        }
        if !event.notify_me() {
            return self.stale(job, engine, event.id(), "notifications are off");
        }

        let now = self.clock.now();
        if payload.kind == ReminderKind::DailyImportant && days_left(&event.date(), &now) < 0 {
            return self.stale(job, engine, event.id(), "event has passed");
        }

        let notification = reminder_notification(&event, &now);
        self.post(&notification)
    }

    fn stale(&self, job: &Job, engine: &dyn JobEngine, id: EventId, reason: &str) -> JobOutcome {
        tracing::debug!(event_id = %id, reason, "skipping stale reminder");
        if job.schedule.is_recurring() {
            if let Err(err) = engine.cancel_by_tag(&event_reminder_tag(id)) {
                tracing::warn!(%err, "failed to cancel stale reminders");
            }
        }
        JobOutcome::Success
    }

    async fn digest(&self) -> JobOutcome {
        let now = self.clock.now();
        let range = next_7_days_range(&now);
        let conds = ResolvedEventConditions {
            archived: Some(false),
            date_from: Some(range.start_millis()),
            date_to: Some(range.end_millis()),
            ..Default::default()
        };

        match self.db.events.count(&conds).await {
            Ok(0) => {
                tracing::debug!("no events this week, digest skipped");
                JobOutcome::Success
            }
            Ok(count) => self.post(&digest_notification(count)),
            Err(err) => {
                tracing::warn!(%err, "failed to count events for digest");
                JobOutcome::Retry
            }
        }
    }

    async fn auto_archive(&self, engine: &dyn JobEngine) -> JobOutcome {
        match archive_old_events(&self.db, engine, &self.clock.now(), self.archive_after_days).await
        {
            Ok(_) => JobOutcome::Success,
            Err(err) => {
                tracing::warn!(%err, "auto-archive failed");
                JobOutcome::Retry
            }
        }
    }

    fn post(&self, notification: &Notification) -> JobOutcome {
        match self.notifier.notify(notification) {
            Ok(()) => JobOutcome::Success,
            Err(err @ NotifyError::ChannelDisabled(_)) => {
                tracing::debug!(%err, "notification not shown");
                JobOutcome::Success
            }
            Err(err) => {
                tracing::warn!(%err, "failed to post notification");
                JobOutcome::Retry
            }
        }
    }
}

/// Archives events older than `after_days` days and drops their reminders.
pub(crate) async fn archive_old_events<Tz: TimeZone>(
    db: &LocalDb,
    engine: &dyn JobEngine,
    now: &DateTime<Tz>,
    after_days: u32,
) -> Result<Vec<EventId>, sqlx::Error>
where
    Tz::Offset: fmt::Display,
{
    let cutoff = days_before(now, after_days);
    let ids = db.events.archive_before(cutoff.timestamp_millis()).await?;
    for id in &ids {
        if let Err(err) = engine.cancel_by_tag(&event_reminder_tag(*id)) {
            tracing::warn!(%err, event_id = %id, "failed to cancel reminders of archived event");
        }
    }
    tracing::info!(count = ids.len(), %cutoff, "archived old events");
    Ok(ids)
}

/// The reminder shown for an event, judged by the days left at `now`.
pub fn reminder_notification<Tz: TimeZone>(event: &Event, now: &DateTime<Tz>) -> Notification
where
    Tz::Offset: fmt::Display,
{
    let days = days_left(&event.date(), now);
    let important = event.is_important();
    let title = match (days, important) {
        (0, true) => "Important Event Today!".to_string(),
        (0, false) => "Event Today!".to_string(),
        (1, true) => "Important Event Tomorrow!".to_string(),
        (1, false) => "Event Tomorrow!".to_string(),
        (d, _) if d < 0 => "Event Passed".to_string(),
        (d, true) => format!("Important Event in {d} days"),
        (d, false) => format!("Event in {d} days"),
    };

    let date = event
        .date()
        .with_timezone(&now.timezone())
        .format(NOTIFICATION_DATE_FORMAT);
    let body = match days {
        0 => format!("{} is TODAY! ({date})", event.title()),
        1 => format!("{} is TOMORROW ({date})", event.title()),
        d if d < 0 => format!("{} was {} days ago ({date})", event.title(), d.unsigned_abs()),
        d => format!("{} is in {d} days ({date})", event.title()),
    };

    Notification {
        id: event.id().get(),
        channel: Channel::UpcomingEvents,
        title,
        body,
        priority: reminder_priority(important, days),
    }
}

/// The digest announcing how many events fall in the next 7 days.
pub fn digest_notification(count: i64) -> Notification {
    let body = match count {
        1 => "1 event this week".to_string(),
        n => format!("{n} events this week"),
    };
    Notification {
        id: DIGEST_NOTIFICATION_ID,
        channel: Channel::DailyDigest,
        title: "Daily Digest".to_string(),
        body,
        priority: Priority::Low,
    }
}
