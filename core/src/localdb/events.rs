// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use sqlx::{Sqlite, SqlitePool, query::QueryAs, sqlite::SqliteArguments};
use tokio::sync::watch;

use crate::error::ValidationError;
use crate::filter::{EventSort, ResolvedEventConditions};
use crate::{Error, Event, EventDraft, EventId, Pager};

const COLUMNS: &str =
    "id, title, date_millis, notify_me, reminder_offset_days, is_archived, is_important";

/// The events table.
///
/// Every write bumps a revision counter that observers can [`subscribe`](Events::subscribe) to.
#[derive(Debug, Clone)]
pub struct Events {
    pool: SqlitePool,
    revision: Arc<watch::Sender<u64>>,
}

impl Events {
    pub fn new(pool: SqlitePool, revision: Arc<watch::Sender<u64>>) -> Self {
        Self { pool, revision }
    }

    /// Stores a new event and returns its id. The id of `event` is ignored.
    pub async fn insert(&self, event: &Event) -> Result<EventId, sqlx::Error> {
        const SQL: &str = "\
INSERT INTO events (title, date_millis, notify_me, reminder_offset_days, is_archived, is_important)
VALUES (?, ?, ?, ?, ?, ?);
";

        let result = sqlx::query(SQL)
            .bind(event.title())
            .bind(event.date_millis())
            .bind(event.notify_me())
            .bind(i64::from(event.reminder_offset_days()))
            .bind(event.is_archived())
            .bind(event.is_important())
            .execute(&self.pool)
            .await?;

        let id = EventId(result.last_insert_rowid());
        tracing::debug!(%id, "event inserted");
        self.bump();
        Ok(id)
    }

    /// Overwrites a stored event, returns false if there is no event with its id.
    pub async fn update(&self, event: &Event) -> Result<bool, sqlx::Error> {
        const SQL: &str = "\
UPDATE events SET
    title                = ?,
    date_millis          = ?,
    notify_me            = ?,
    reminder_offset_days = ?,
    is_archived          = ?,
    is_important         = ?
WHERE id = ?;
";

        let result = sqlx::query(SQL)
            .bind(event.title())
            .bind(event.date_millis())
            .bind(event.notify_me())
            .bind(i64::from(event.reminder_offset_days()))
            .bind(event.is_archived())
            .bind(event.is_important())
            .bind(event.id().get())
            .execute(&self.pool)
            .await?;

        Ok(self.changed(result.rows_affected()))
    }

    /// Deletes an event, returns false if there was nothing to delete.
    pub async fn delete(&self, id: EventId) -> Result<bool, sqlx::Error> {
        const SQL: &str = "DELETE FROM events WHERE id = ?;";

        let result = sqlx::query(SQL)
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(self.changed(result.rows_affected()))
    }

    pub async fn get(&self, id: EventId) -> Result<Option<Event>, Error> {
        let sql = format!("SELECT {COLUMNS} FROM events WHERE id = ?;");

        let record: Option<EventRecord> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record.map(Event::try_from).transpose()?)
    }

    /// Lists events matching the conditions, in the given order.
    ///
    /// Dates, titles and ids are ordered by the database; [`EventSort::DaysLeft`]
    /// depends on the calendar of the caller and is done after fetching.
    pub async fn list<Tz: chrono::TimeZone>(
        &self,
        conds: &ResolvedEventConditions,
        sort: EventSort,
        pager: Option<&Pager>,
        now: &chrono::DateTime<Tz>,
    ) -> Result<Vec<Event>, Error> {
        let order_by = match sort {
            EventSort::Date | EventSort::DaysLeft => "date_millis ASC, id ASC",
            EventSort::Alphabetical => "title COLLATE NOCASE ASC, date_millis ASC, id ASC",
        };
        let paged_in_sql = sort != EventSort::DaysLeft && pager.is_some();

        let mut sql = format!("SELECT {COLUMNS} FROM events");
        sql += &Self::build_where(conds);
        sql += &format!("ORDER BY {order_by}");
        if paged_in_sql {
            sql += " LIMIT ? OFFSET ?";
        }
        sql += ";";

        let mut executable = sqlx::query_as(&sql);
        executable = Self::bind_conditions(conds, executable);
        if let (true, Some(pager)) = (paged_in_sql, pager) {
            executable = executable.bind(pager.limit).bind(pager.offset);
        }

        let records: Vec<EventRecord> = executable.fetch_all(&self.pool).await?;
        let mut events = records
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if sort == EventSort::DaysLeft {
            sort.sort(&mut events, now);
            if let Some(pager) = pager {
                events = pager.slice(events);
            }
        }
        Ok(events)
    }

    pub async fn count(&self, conds: &ResolvedEventConditions) -> Result<i64, sqlx::Error> {
        let mut sql = "SELECT COUNT(*) FROM events".to_string();
        sql += &Self::build_where(conds);
        sql += ";";

        let mut executable = sqlx::query_as(&sql);
        executable = Self::bind_conditions(conds, executable);

        let row: (i64,) = executable.fetch_one(&self.pool).await?;
        Ok(row.0)
    }

    pub async fn set_archived(&self, id: EventId, archived: bool) -> Result<bool, sqlx::Error> {
        const SQL: &str = "UPDATE events SET is_archived = ? WHERE id = ?;";

        let result = sqlx::query(SQL)
            .bind(archived)
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(self.changed(result.rows_affected()))
    }

    pub async fn set_important(&self, id: EventId, important: bool) -> Result<bool, sqlx::Error> {
        const SQL: &str = "UPDATE events SET is_important = ? WHERE id = ?;";

        let result = sqlx::query(SQL)
            .bind(important)
            .bind(id.get())
            .execute(&self.pool)
            .await?;

        Ok(self.changed(result.rows_affected()))
    }

    /// Archives every unarchived event dated before the cutoff, returns their ids.
    pub async fn archive_before(&self, cutoff_millis: i64) -> Result<Vec<EventId>, sqlx::Error> {
        const SELECT: &str =
            "SELECT id FROM events WHERE is_archived = 0 AND date_millis < ? ORDER BY id;";
        const UPDATE: &str = "UPDATE events SET is_archived = 1 WHERE is_archived = 0 AND date_millis < ?;";

        let mut tx = self.pool.begin().await?;
        let ids: Vec<i64> = sqlx::query_scalar(SELECT)
            .bind(cutoff_millis)
            .fetch_all(&mut *tx)
            .await?;
        let result = sqlx::query(UPDATE)
            .bind(cutoff_millis)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.changed(result.rows_affected());
        Ok(ids.into_iter().map(EventId).collect())
    }

    /// Unarchived events with notifications on that are still ahead of `after`.
    pub async fn list_with_reminders<Tz: chrono::TimeZone>(
        &self,
        after: &chrono::DateTime<Tz>,
    ) -> Result<Vec<Event>, Error> {
        let conds = ResolvedEventConditions::with_reminders(after);
        self.list(&conds, EventSort::Date, None, after).await
    }

    /// A receiver that is marked changed after every write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn changed(&self, rows_affected: u64) -> bool {
        if rows_affected > 0 {
            self.bump();
        }
        rows_affected > 0
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    fn build_where(conds: &ResolvedEventConditions) -> String {
        let mut where_clauses = Vec::new();
        if conds.archived.is_some() {
            where_clauses.push("is_archived = ?");
        }
        if conds.notify_me.is_some() {
            where_clauses.push("notify_me = ?");
        }
        if conds.important.is_some() {
            where_clauses.push("is_important = ?");
        }
        if conds.date_from.is_some() {
            where_clauses.push("date_millis >= ?");
        }
        if conds.date_to.is_some() {
            where_clauses.push("date_millis <= ?");
        }

        if where_clauses.is_empty() {
            " ".to_string()
        } else {
            format!(" WHERE {} ", where_clauses.join(" AND "))
        }
    }

    fn bind_conditions<'a, O>(
        conds: &'a ResolvedEventConditions,
        mut query: QueryAs<'a, Sqlite, O, SqliteArguments<'a>>,
    ) -> QueryAs<'a, Sqlite, O, SqliteArguments<'a>> {
        if let Some(archived) = conds.archived {
            query = query.bind(archived);
        }
        if let Some(notify_me) = conds.notify_me {
            query = query.bind(notify_me);
        }
        if let Some(important) = conds.important {
            query = query.bind(important);
        }
        if let Some(date_from) = conds.date_from {
            query = query.bind(date_from);
        }
        if let Some(date_to) = conds.date_to {
            query = query.bind(date_to);
        }
        query
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRecord {
    id: i64,
    title: String,
    date_millis: i64,
    notify_me: bool,
    reminder_offset_days: i64,
    is_archived: bool,
    is_important: bool,
}

impl TryFrom<EventRecord> for Event {
    type Error = ValidationError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        let draft = EventDraft {
            title: record.title,
            date_millis: record.date_millis,
            notify_me: record.notify_me,
            reminder_offset_days: record.reminder_offset_days,
            is_important: record.is_important,
        };
        Event::from_parts(EventId(record.id), draft, record.is_archived)
    }
}
