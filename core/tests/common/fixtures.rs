// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.
//!
//! This module provides an application harness whose clock only moves when a
//! test says so and whose jobs run only when a test asks, plus helpers to
//! create drafts relative to the fixed "now".

use std::sync::Arc;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use daysleft_core::jobs::{Job, JobEngine, JobOutcome, MemoryJobEngine, event_reminder_tag};
use daysleft_core::notify::MemoryNotifier;
use daysleft_core::{
    Clock, Config, DaysLeft, EventDraft, EventId, FixedClock, JobDispatcher, LocalDb, SettingsStore,
};

/// The instant every test starts at: 2025-06-15 10:00 local time.
#[must_use]
pub fn fixed_now() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, 6, 15, 10, 0, 0)
        .single()
        .expect("fixed test time should be unambiguous")
}

/// The fixed "now" moved by a number of whole days.
#[must_use]
pub fn days_from_now(days: i64) -> DateTime<Local> {
    fixed_now() + TimeDelta::days(days)
}

/// Creates a draft with notifications off.
#[must_use]
pub fn test_draft(title: &str, date: DateTime<Local>) -> EventDraft {
    EventDraft::new(title, date.timestamp_millis())
}

/// Creates a draft with notifications on and the given reminder offset.
#[must_use]
pub fn test_reminding_draft(title: &str, date: DateTime<Local>, offset_days: i64) -> EventDraft {
    EventDraft {
        notify_me: true,
        reminder_offset_days: offset_days,
        ..test_draft(title, date)
    }
}

/// The application wired to test doubles.
///
/// # Example
///
/// ```ignore
/// let t = TestApp::in_memory().await;
/// t.app.add_event(test_draft("Trip", days_from_now(3))).await?;
/// t.clock.set(days_from_now(2));
/// t.run_due().await;
/// ```
pub struct TestApp {
    pub app: DaysLeft,
    pub clock: Arc<FixedClock>,
    pub engine: Arc<MemoryJobEngine>,
    pub notifier: Arc<MemoryNotifier>,
    pub dispatcher: JobDispatcher,
}

impl TestApp {
    /// An application on an in-memory database with default configuration.
    pub async fn in_memory() -> Self {
        Self::in_memory_with(Config::default()).await
    }

    /// An application on an in-memory database with the given configuration.
    pub async fn in_memory_with(config: Config) -> Self {
        let clock = Arc::new(FixedClock::new(fixed_now()));
        let engine = Arc::new(MemoryJobEngine::new());
        let db = LocalDb::open(None)
            .await
            .expect("Failed to open in-memory database");
        let app = DaysLeft::new(
            config,
            db,
            clock.clone(),
            engine.clone(),
            SettingsStore::in_memory(),
        );
        Self::assemble(app, clock, engine)
    }

    /// An application opened through [`DaysLeft::open`], e.g. on a temporary state directory.
    pub async fn open(config: Config) -> Self {
        let clock = Arc::new(FixedClock::new(fixed_now()));
        let engine = Arc::new(MemoryJobEngine::new());
        let shared: Arc<dyn JobEngine> = engine.clone();
        let app = DaysLeft::open(config, clock.clone(), move |_, _| shared)
            .await
            .expect("Failed to open application");
        Self::assemble(app, clock, engine)
    }

    fn assemble(app: DaysLeft, clock: Arc<FixedClock>, engine: Arc<MemoryJobEngine>) -> Self {
        let notifier = Arc::new(MemoryNotifier::new());
        let dispatcher = JobDispatcher::new(
            app.db().clone(),
            notifier.clone(),
            clock.clone(),
            app.config(),
        );
        Self {
            app,
            clock,
            engine,
            notifier,
            dispatcher,
        }
    }

    /// Runs every job that is due at the current test time.
    pub async fn run_due(&self) -> Vec<(Job, JobOutcome)> {
        self.engine.run_due(&self.clock.now(), &self.dispatcher).await
    }

    /// Moves the clock and runs what became due.
    pub async fn run_at(&self, at: DateTime<Local>) -> Vec<(Job, JobOutcome)> {
        self.clock.set(at);
        self.run_due().await
    }

    /// The next fire times of the reminders of an event, earliest first.
    #[must_use]
    pub fn reminder_times(&self, id: EventId) -> Vec<DateTime<Utc>> {
        let mut times: Vec<_> = self
            .engine
            .jobs_for(&event_reminder_tag(id))
            .iter()
            .map(|job| job.schedule.first_at())
            .collect();
        times.sort();
        times
    }
}
