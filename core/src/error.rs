// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::event::EventId;

/// Errors produced by the Days Left core.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input was rejected before reaching the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The local database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Running the schema migrations failed.
    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// No event with the given id exists.
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// The configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The local settings could not be read or written.
    #[error("settings error: {0}")]
    Settings(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons an event or setting fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The title is empty or only whitespace.
    #[error("title must not be blank")]
    BlankTitle,

    /// The reminder offset must be at least one day.
    #[error("reminder offset must be a positive number of days, got {0}")]
    NonPositiveOffset(i64),

    /// The timestamp cannot be represented as a date.
    #[error("event date is out of range: {0} ms")]
    DateOutOfRange(i64),

    /// The digest time is not a valid time of day.
    #[error("invalid digest time {hour:02}:{minute:02}")]
    InvalidDigestTime {
        /// Hour of day.
        hour: u32,
        /// Minute of hour.
        minute: u32,
    },
}
