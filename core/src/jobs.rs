// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Deferred background work.
//!
//! A [`Job`] is a tagged unit of work with a schedule. Engines own the timing
//! and hand due jobs to a [`JobRunner`]; all jobs sharing a tag can be
//! cancelled at once, which is how an event's reminders are replaced.

mod memory;
mod tokio_engine;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::EventId;

pub use memory::MemoryJobEngine;
pub use tokio_engine::{RetryPolicy, TokioJobEngine};

/// Tag of the daily digest job.
pub const DAILY_DIGEST_TAG: &str = "daily_digest";

/// Tag of the daily auto-archive sweep.
pub const AUTO_ARCHIVE_TAG: &str = "auto_archive";

/// Tag shared by all reminder jobs of one event.
pub fn event_reminder_tag(id: EventId) -> String {
    format!("event_reminder_{id}")
}

/// Interval between runs of a [`Schedule::Daily`] job.
pub fn daily_period() -> TimeDelta {
    TimeDelta::days(1)
}

/// When a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Schedule {
    /// Exactly once.
    Once { at: DateTime<Utc> },

    /// Every day, starting at `first_at`.
    Daily { first_at: DateTime<Utc> },
}

impl Schedule {
    /// The first time the job is due.
    pub fn first_at(&self) -> DateTime<Utc> {
        match self {
            Schedule::Once { at } => *at,
            Schedule::Daily { first_at } => *first_at,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self, Schedule::Daily { .. })
    }

    /// The schedule after one run, `None` once there is nothing left to run.
    pub(crate) fn advance(&self) -> Option<Schedule> {
        match self {
            Schedule::Once { .. } => None,
            Schedule::Daily { first_at } => first_at
                .checked_add_signed(daily_period())
                .map(|first_at| Schedule::Daily { first_at }),
        }
    }
}

/// What a job does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    EventReminder,
    DailyDigest,
    AutoArchive,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobKind::EventReminder => "event_reminder",
            JobKind::DailyDigest => "daily_digest",
            JobKind::AutoArchive => "auto_archive",
        })
    }
}

/// A scheduled unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub tag: String,
    pub kind: JobKind,
    pub schedule: Schedule,
    pub payload: serde_json::Value,
}

impl Job {
    pub fn new(tag: impl Into<String>, kind: JobKind, schedule: Schedule) -> Self {
        Self {
            tag: tag.into(),
            kind,
            schedule,
            payload: serde_json::Value::Null,
        }
    }

    /// Attaches a serialized payload.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Result<Self, JobError> {
        self.payload = serde_json::to_value(payload)?;
        Ok(self)
    }

    /// Decodes the payload.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, JobError> {
        Ok(T::deserialize(&self.payload)?)
    }
}

/// Result of a single run of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Done, or nothing to do.
    Success,

    /// Failed for a reason that may go away, run again later.
    Retry,

    /// Failed for good.
    Failure,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("no async runtime available to run jobs")]
    NoRuntime,

    #[error("job registry lock poisoned")]
    Poisoned,

    #[error("invalid job payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Accepts and cancels jobs.
pub trait JobEngine: Send + Sync + fmt::Debug {
    /// Schedules a job, keeping any other job with the same tag.
    fn enqueue(&self, job: Job) -> Result<(), JobError>;

    /// Cancels every pending job with the tag. Unknown tags are not an error.
    fn cancel_by_tag(&self, tag: &str) -> Result<(), JobError>;
}

/// Executes due jobs.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Runs the job once. The engine is passed in so that a job can cancel other jobs.
    async fn run(&self, job: &Job, engine: &dyn JobEngine) -> JobOutcome;
}
