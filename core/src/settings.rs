// SPDX-FileCopyrightText: 2025 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveTime;

use crate::error::{Error, ValidationError};

/// User preferences changed from within the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether the daily digest is sent.
    pub digest_enabled: bool,

    /// Hour of day (0-23) of the daily digest.
    pub digest_hour: u32,

    /// Minute (0-59) of the daily digest.
    pub digest_minute: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            digest_enabled: true,
            digest_hour: 8,
            digest_minute: 0,
        }
    }
}

impl Settings {
    /// The digest time, `None` if the stored hour or minute is out of range.
    pub fn digest_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.digest_hour, self.digest_minute, 0)
    }
}

/// Settings persisted as a TOML file, or kept in memory.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: Mutex<Settings>,
}

impl SettingsStore {
    /// Settings that are lost when the process exits.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: Mutex::new(Settings::default()),
        }
    }

    /// Loads the settings file, falling back to defaults if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let settings = read_settings(&path)?;
        Ok(Self {
            path: Some(path),
            current: Mutex::new(settings),
        })
    }

    /// Reads the settings file again, picking up changes made by another process.
    ///
    /// Returns the settings and whether they differ from the ones held before.
    pub fn reload(&self) -> Result<(Settings, bool), Error> {
        let Some(path) = &self.path else {
            return Ok((self.get(), false));
        };

        let settings = read_settings(path)?;
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let changed = *current != settings;
        *current = settings;
        Ok((settings, changed))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self) -> Settings {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_digest_enabled(&self, enabled: bool) -> Result<Settings, Error> {
        self.update(|s| s.digest_enabled = enabled)
    }

    /// Sets the digest time after checking it is a valid time of day.
    pub fn set_digest_time(&self, hour: u32, minute: u32) -> Result<Settings, Error> {
        if NaiveTime::from_hms_opt(hour, minute, 0).is_none() {
            return Err(ValidationError::InvalidDigestTime { hour, minute }.into());
        }
        self.update(|s| {
            s.digest_hour = hour;
            s.digest_minute = minute;
        })
    }

    fn update(&self, f: impl FnOnce(&mut Settings)) -> Result<Settings, Error> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = *current;
        f(&mut next);
        self.persist(&next)?;
        *current = next;
        Ok(next)
    }

    fn persist(&self, settings: &Settings) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let content = toml::to_string(settings)
            .map_err(|e| Error::Settings(format!("Failed to serialize settings: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "settings saved");
        Ok(())
    }
}

fn read_settings(path: &Path) -> Result<Settings, Error> {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content)
            .map_err(|e| Error::Settings(format!("Failed to parse {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Settings::default())
        }
        Err(e) => Err(e.into()),
    }
}
