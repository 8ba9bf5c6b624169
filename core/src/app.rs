// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::watch;

use crate::clock::Clock;
use crate::filter::{EventFilter, EventListItem, EventSort, ResolvedEventConditions, sectioned};
use crate::jobs::JobEngine;
use crate::localdb::{Events, LocalDb};
use crate::reminder::{PlannedReminder, ReminderScheduler, plan_reminders};
use crate::settings::{Settings, SettingsStore};
use crate::worker::archive_old_events;
use crate::{Config, Error, Event, EventDraft, EventId, EventPatch, Pager};

/// Days Left application.
///
/// Owns the event store and keeps reminder jobs in step with every change.
#[derive(Debug, Clone)]
pub struct DaysLeft {
    config: Config,
    db: LocalDb,
    clock: Arc<dyn Clock>,
    engine: Arc<dyn JobEngine>,
    scheduler: ReminderScheduler,
    settings: Arc<SettingsStore>,
}

impl DaysLeft {
    /// Creates the application from its parts; see [`DaysLeft::open`] for the usual setup.
    pub fn new(
        config: Config,
        db: LocalDb,
        clock: Arc<dyn Clock>,
        engine: Arc<dyn JobEngine>,
        settings: SettingsStore,
    ) -> Self {
        let scheduler = ReminderScheduler::new(
            engine.clone(),
            clock.clone(),
            config.important_reminder_time.time(),
        );
        Self {
            config,
            db,
            clock,
            engine,
            scheduler,
            settings: Arc::new(settings),
        }
    }

    /// Normalizes the configuration, then opens the database and settings in the state directory.
    ///
    /// The job engine is built last, so that it can run jobs against the opened database.
    pub async fn open(
        mut config: Config,
        clock: Arc<dyn Clock>,
        engine: impl FnOnce(&Config, &LocalDb) -> Arc<dyn JobEngine>,
    ) -> Result<Self, Error> {
        config.normalize()?;
        config.prepare().await?;

        let db = LocalDb::open(config.db_path().as_deref()).await?;
        let settings = match config.settings_path() {
            Some(path) => SettingsStore::open(path)?,
            None => SettingsStore::in_memory(),
        };
        let engine = engine(&config, &db);
        Ok(Self::new(config, db, clock, engine, settings))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current time of the application clock.
    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// The database, e.g. for wiring a job dispatcher.
    pub fn db(&self) -> &LocalDb {
        &self.db
    }

    /// Validates and stores a new event, then schedules its reminders.
    #[tracing::instrument(skip_all)]
    pub async fn add_event(&self, draft: EventDraft) -> Result<Event, Error> {
        let event = draft.validate()?;
        let id = self.db.events.insert(&event).await?;
        let event = event.with_id(id);
        tracing::info!(%id, title = event.title(), "event added");
        self.scheduler.sync(&event);
        Ok(event)
    }

    /// Applies a patch to an event and reschedules its reminders.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_event(&self, id: EventId, patch: &EventPatch) -> Result<Event, Error> {
        let event = self.get_event(id).await?;
        let updated = patch.apply_to(&event)?;
        if !self.db.events.update(&updated).await? {
            return Err(Error::NotFound(id));
        }
        self.scheduler.sync(&updated);
        Ok(updated)
    }

    /// Deletes an event and cancels its reminders, returns the deleted event.
    #[tracing::instrument(skip(self))]
    pub async fn delete_event(&self, id: EventId) -> Result<Event, Error> {
        let event = self.get_event(id).await?;
        if !self.db.events.delete(id).await? {
            return Err(Error::NotFound(id));
        }
        self.scheduler.cancel(id);
        Ok(event)
    }

    pub async fn get_event(&self, id: EventId) -> Result<Event, Error> {
        self.db.events.get(id).await?.ok_or(Error::NotFound(id))
    }

    /// Archives an event, which also drops its reminders.
    pub async fn archive_event(&self, id: EventId) -> Result<Event, Error> {
        let found = self.db.events.set_archived(id, true).await?;
        self.resync_event(id, found).await
    }

    /// Brings an archived event back and reschedules its reminders.
    pub async fn restore_event(&self, id: EventId) -> Result<Event, Error> {
        let found = self.db.events.set_archived(id, false).await?;
        self.resync_event(id, found).await
    }

    pub async fn set_important(&self, id: EventId, important: bool) -> Result<Event, Error> {
        let found = self.db.events.set_important(id, important).await?;
        self.resync_event(id, found).await
    }

    async fn resync_event(&self, id: EventId, found: bool) -> Result<Event, Error> {
        if !found {
            return Err(Error::NotFound(id));
        }
        let event = self.get_event(id).await?;
        tracing::debug!(%id, archived = event.is_archived(), important = event.is_important(), "event flags changed");
        self.scheduler.sync(&event);
        Ok(event)
    }

    /// Lists events in a view, relative to the current day.
    pub async fn list_events(
        &self,
        filter: EventFilter,
        sort: EventSort,
        pager: Option<&Pager>,
    ) -> Result<Vec<Event>, Error> {
        let now = self.now();
        let conds = ResolvedEventConditions::resolve(filter, &now);
        self.db.events.list(&conds, sort, pager, &now).await
    }

    /// Lists events grouped into Today, Upcoming and Past sections.
    pub async fn list_sections(
        &self,
        filter: EventFilter,
        sort: EventSort,
    ) -> Result<Vec<EventListItem>, Error> {
        let events = self.list_events(filter, sort, None).await?;
        Ok(sectioned(events, &self.now()))
    }

    pub async fn count_events(&self, filter: EventFilter) -> Result<i64, Error> {
        let conds = ResolvedEventConditions::resolve(filter, &self.now());
        Ok(self.db.events.count(&conds).await?)
    }

    /// Observes a view; see [`EventWatch`].
    pub fn watch_events(&self, filter: EventFilter, sort: EventSort) -> EventWatch {
        EventWatch {
            events: self.db.events.clone(),
            clock: self.clock.clone(),
            filter,
            sort,
            revision: self.db.events.subscribe(),
            primed: false,
        }
    }

    /// The reminders an event would get if it were synced now.
    pub async fn plan_reminders(&self, id: EventId) -> Result<Vec<PlannedReminder>, Error> {
        let event = self.get_event(id).await?;
        Ok(plan_reminders(
            &event,
            &self.now(),
            self.config.important_reminder_time.time(),
        ))
    }

    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    /// Turns the daily digest on or off.
    pub fn set_digest_enabled(&self, enabled: bool) -> Result<Settings, Error> {
        let settings = self.settings.set_digest_enabled(enabled)?;
        self.scheduler.sync_daily_digest(&settings);
        Ok(settings)
    }

    /// Moves the daily digest to another time of day.
    pub fn set_digest_time(&self, hour: u32, minute: u32) -> Result<Settings, Error> {
        let settings = self.settings.set_digest_time(hour, minute)?;
        self.scheduler.sync_daily_digest(&settings);
        Ok(settings)
    }

    /// Reloads settings changed by another process and reschedules the digest if needed.
    pub fn refresh_settings(&self) -> Result<Settings, Error> {
        let (settings, changed) = self.settings.reload()?;
        if changed {
            tracing::info!(?settings, "settings changed on disk");
            self.scheduler.sync_daily_digest(&settings);
        }
        Ok(settings)
    }

    /// Restores all background jobs, to be called whenever the process starts.
    ///
    /// Returns the number of event reminders scheduled.
    #[tracing::instrument(skip_all)]
    pub async fn on_launch(&self) -> Result<usize, Error> {
        self.scheduler.sync_daily_digest(&self.settings());
        self.scheduler.sync_auto_archive();
        self.reschedule_reminders().await
    }

    /// Replaces the reminders of every event that can still get one.
    pub async fn reschedule_reminders(&self) -> Result<usize, Error> {
        let events = self.db.events.list_with_reminders(&self.now()).await?;
        let scheduled = self.scheduler.reschedule_all(&events);
        tracing::info!(events = events.len(), scheduled, "reminders rescheduled");
        Ok(scheduled)
    }

    /// Archives events older than the configured number of days, returns their ids.
    pub async fn archive_old_events(&self) -> Result<Vec<EventId>, Error> {
        let ids = archive_old_events(
            &self.db,
            self.engine.as_ref(),
            &self.now(),
            self.config.auto_archive_after_days,
        )
        .await?;
        Ok(ids)
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}

/// A live view of a filtered, sorted event list.
///
/// The first call to [`EventWatch::next`] yields the current list; later calls
/// wait for the next write to the store and yield the list again.
#[derive(Debug)]
pub struct EventWatch {
    events: Events,
    clock: Arc<dyn Clock>,
    filter: EventFilter,
    sort: EventSort,
    revision: watch::Receiver<u64>,
    primed: bool,
}

impl EventWatch {
    /// The next snapshot, `None` if the change feed closes.
    pub async fn next(&mut self) -> Option<Result<Vec<Event>, Error>> {
        if self.primed {
            self.revision.changed().await.ok()?;
        } else {
            self.primed = true;
        }
        self.revision.borrow_and_update();

        let now = self.clock.now();
        let conds = ResolvedEventConditions::resolve(self.filter, &now);
        Some(self.events.list(&conds, self.sort, None, &now).await)
    }
}
