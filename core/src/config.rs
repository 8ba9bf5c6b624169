// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;
use serde::de;

use crate::Error;

/// The name of the Days Left application.
pub const APP_NAME: &str = "daysleft";

const DB_FILENAME: &str = "daysleft.db";
const SETTINGS_FILENAME: &str = "settings.toml";

/// Configuration for the Days Left application.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory for storing application state, the database and settings.
    pub state_dir: Option<PathBuf>,

    /// Events whose date is older than this many days are archived automatically.
    pub auto_archive_after_days: u32,

    /// Wall-clock time of the daily reminder for important events.
    pub important_reminder_time: ConfigTime,

    /// Attempts a failing background job gets before it is given up.
    pub job_retry_limit: u32,

    /// Delay before the first retry, doubled on each further attempt.
    pub job_retry_backoff_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: None,
            auto_archive_after_days: 30,
            important_reminder_time: ConfigTime::default(),
            job_retry_limit: 3,
            job_retry_backoff_secs: 30,
        }
    }
}

impl Config {
    /// Normalize the configuration.
    pub fn normalize(&mut self) -> Result<(), Error> {
        match &self.state_dir {
            Some(a) => {
                self.state_dir = Some(expand_path(a).map_err(|e| {
                    Error::Config(format!("Failed to expand state directory path: {e}"))
                })?)
            }

            None => match get_state_dir() {
                Ok(a) => self.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        };

        if self.job_retry_limit == 0 {
            return Err(Error::Config(
                "job_retry_limit must allow at least one attempt".to_string(),
            ));
        }

        Ok(())
    }

    /// Create the state directory if needed.
    pub async fn prepare(&self) -> Result<(), Error> {
        if let Some(state_dir) = &self.state_dir {
            tracing::info!(path = %state_dir.display(), "ensuring state directory exists");
            tokio::fs::create_dir_all(state_dir).await?;
        }
        Ok(())
    }

    /// The database file, or `None` to keep everything in memory.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.state_dir.as_ref().map(|a| a.join(DB_FILENAME))
    }

    /// The settings file, or `None` to keep settings in memory.
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.state_dir.as_ref().map(|a| a.join(SETTINGS_FILENAME))
    }

    /// Backoff before the first retry of a failed job.
    pub fn job_retry_backoff(&self) -> Duration {
        Duration::from_secs(self.job_retry_backoff_secs)
    }
}

/// A wall-clock time of day, written as "HH:MM" in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigTime(NaiveTime);

impl ConfigTime {
    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for ConfigTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s).map(ConfigTime)
    }
}

impl Default for ConfigTime {
    fn default() -> Self {
        Self(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN))
    }
}

impl<'de> serde::Deserialize<'de> for ConfigTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeVisitor;

        impl<'de> de::Visitor<'de> for TimeVisitor {
            type Value = ConfigTime;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(r#"a time of day like "HH:MM""#)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                parse_time_of_day(value)
                    .map(ConfigTime)
                    .map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(TimeVisitor)
    }
}

/// Handle tilde (~) and environment variables in the path
fn expand_path(path: &Path) -> Result<PathBuf, String> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle state directories
    let state_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_STATE_HOME/", "${XDG_STATE_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in state_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_state_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, String> {
    dirs::home_dir().ok_or("User-specific home directory not found".into())
}

fn get_state_dir() -> Result<PathBuf, String> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_local_dir();
    state_dir.ok_or("User-specific state directory not found".into())
}

/// Parse a time of day in the format "HH:MM".
fn parse_time_of_day(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| format!("Invalid time '{s}', expected HH:MM: {e}"))
}
