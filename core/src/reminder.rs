// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Deciding which reminders an event gets and keeping the job engine in sync.
//!
//! Every event with notifications on gets a reminder at its preferred offset,
//! plus automatic reminders one and three days before unless one of them is
//! the preferred offset already. Reminders at the same instant are merged and
//! reminders in the past are skipped. Important events additionally get a
//! daily reminder at a fixed time of day until the event has passed.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::clock::Clock;
use crate::datetime::next_time_of_day;
use crate::jobs::{
    AUTO_ARCHIVE_TAG, DAILY_DIGEST_TAG, Job, JobEngine, JobError, JobKind, Schedule,
    event_reminder_tag,
};
use crate::settings::Settings;
use crate::{Event, EventId, Priority};

/// Automatic reminders added next to the preferred one.
const AUTO_REMINDERS: [(ReminderKind, u32); 2] = [
    (ReminderKind::OneDayBefore, 1),
    (ReminderKind::ThreeDaysBefore, 3),
];

/// Why a reminder exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// At the offset the user picked.
    UserPreference,

    /// Automatic, one day before.
    OneDayBefore,

    /// Automatic, three days before.
    ThreeDaysBefore,

    /// Daily, for important events.
    DailyImportant,
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReminderKind::UserPreference => "preferred",
            ReminderKind::OneDayBefore => "1 day before",
            ReminderKind::ThreeDaysBefore => "3 days before",
            ReminderKind::DailyImportant => "daily",
        })
    }
}

/// What a reminder job carries, a snapshot of the event when it was scheduled.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReminderPayload {
    pub event_id: EventId,
    pub title: String,
    pub date_millis: i64,
    pub offset_days: u32,
    pub is_important: bool,
    pub kind: ReminderKind,
}

/// A reminder to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PlannedReminder {
    pub kind: ReminderKind,
    pub schedule: Schedule,
}

/// The reminders an event should have at `now`.
pub fn plan_reminders<Tz: TimeZone>(
    event: &Event,
    now: &DateTime<Tz>,
    important_time: NaiveTime,
) -> Vec<PlannedReminder> {
    if !event.notify_me() || event.is_archived() {
        return Vec::new();
    }

    let now_utc = now.with_timezone(&Utc);
    let preferred = event.reminder_offset_days();
    let candidates = std::iter::once((ReminderKind::UserPreference, preferred)).chain(
        AUTO_REMINDERS
            .into_iter()
            .filter(|(_, days)| *days != preferred),
    );

    let mut planned: Vec<PlannedReminder> = Vec::new();
    for (kind, days) in candidates {
        let Some(at) = event
            .date()
            .checked_sub_signed(TimeDelta::days(i64::from(days)))
        else {
            continue;
        };

        if at <= now_utc {
            tracing::debug!(event_id = %event.id(), %kind, %at, "reminder time has passed, skipping");
            continue;
        }
        if planned.iter().any(|p| p.schedule.first_at() == at) {
            continue;
        }
        planned.push(PlannedReminder {
            kind,
            schedule: Schedule::Once { at },
        });
    }

    if event.is_important() && event.date() > now_utc {
        let first_at = next_time_of_day(now, important_time).with_timezone(&Utc);
        planned.push(PlannedReminder {
            kind: ReminderKind::DailyImportant,
            schedule: Schedule::Daily { first_at },
        });
    }

    planned
}

/// How urgent a reminder is, given the days left when it fires.
pub fn reminder_priority(is_important: bool, days_left: i64) -> Priority {
    if is_important || days_left <= 1 {
        Priority::High
    } else {
        Priority::Default
    }
}

/// Keeps the reminder, digest and archive jobs of the engine in line with the data.
///
/// Scheduling is best effort: failures are logged and never reach the caller,
/// since an event change must not fail because a reminder could not be set.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    engine: Arc<dyn JobEngine>,
    clock: Arc<dyn Clock>,
    important_time: NaiveTime,
}

impl ReminderScheduler {
    pub fn new(engine: Arc<dyn JobEngine>, clock: Arc<dyn Clock>, important_time: NaiveTime) -> Self {
        Self {
            engine,
            clock,
            important_time,
        }
    }

    /// Replaces the reminders of an event, returns how many were scheduled.
    #[tracing::instrument(skip_all, fields(event_id = %event.id()))]
    pub fn sync(&self, event: &Event) -> usize {
        self.cancel(event.id());

        let planned = plan_reminders(event, &self.clock.now(), self.important_time);
        let mut scheduled = 0;
        for plan in planned {
            match reminder_job(event, &plan).and_then(|job| self.engine.enqueue(job)) {
                Ok(()) => scheduled += 1,
                Err(err) => tracing::warn!(%err, kind = %plan.kind, "failed to schedule reminder"),
            }
        }
        tracing::debug!(scheduled, "reminders synced");
        scheduled
    }

    /// Drops every pending reminder of the event.
    pub fn cancel(&self, id: EventId) {
        if let Err(err) = self.engine.cancel_by_tag(&event_reminder_tag(id)) {
            tracing::warn!(%err, event_id = %id, "failed to cancel reminders");
        }
    }

    /// Syncs each event in turn, returns the total number of reminders scheduled.
    pub fn reschedule_all<'a>(&self, events: impl IntoIterator<Item = &'a Event>) -> usize {
        events.into_iter().map(|event| self.sync(event)).sum()
    }

    /// Replaces the digest job according to the settings.
    pub fn sync_daily_digest(&self, settings: &Settings) {
        self.cancel_tag(DAILY_DIGEST_TAG);
        if !settings.digest_enabled {
            tracing::debug!("daily digest disabled");
            return;
        }

        let Some(time) = settings.digest_time() else {
            tracing::warn!(
                hour = settings.digest_hour,
                minute = settings.digest_minute,
                "invalid digest time, digest not scheduled"
            );
            return;
        };

        let first_at = next_time_of_day(&self.clock.now(), time).with_timezone(&Utc);
        let job = Job::new(DAILY_DIGEST_TAG, JobKind::DailyDigest, Schedule::Daily { first_at });
        self.enqueue(job);
    }

    /// Replaces the auto-archive job, which runs right away and then daily.
    pub fn sync_auto_archive(&self) {
        self.cancel_tag(AUTO_ARCHIVE_TAG);
        let first_at = self.clock.now().with_timezone(&Utc);
        let job = Job::new(AUTO_ARCHIVE_TAG, JobKind::AutoArchive, Schedule::Daily { first_at });
        self.enqueue(job);
    }

    fn cancel_tag(&self, tag: &str) {
        if let Err(err) = self.engine.cancel_by_tag(tag) {
            tracing::warn!(%err, tag, "failed to cancel jobs");
        }
    }

    fn enqueue(&self, job: Job) {
        let tag = job.tag.clone();
        if let Err(err) = self.engine.enqueue(job) {
            tracing::warn!(%err, %tag, "failed to schedule job");
        }
    }
}

fn reminder_job(event: &Event, plan: &PlannedReminder) -> Result<Job, JobError> {
    let payload = ReminderPayload {
        event_id: event.id(),
        title: event.title().to_string(),
        date_millis: event.date_millis(),
        offset_days: event.reminder_offset_days(),
        is_important: event.is_important(),
        kind: plan.kind,
    };
    Job::new(event_reminder_tag(event.id()), JobKind::EventReminder, plan.schedule)
        .with_payload(&payload)
}
