// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration-driven behavior workflow tests.
//!
//! These tests validate how configuration and the persisted settings affect
//! the application, including what survives a restart.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use daysleft_core::jobs::{
    DAILY_DIGEST_TAG, JobEngine, MemoryJobEngine, Schedule, event_reminder_tag,
};
use daysleft_core::{Config, DaysLeft, Error, EventDraft, EventFilter, FixedClock};

use crate::common::{
    TestApp, days_from_now, fixed_now, setup_temp_dirs, test_draft, test_reminding_draft,
};

#[tokio::test]
async fn config_state_dir_holds_database_and_settings() {
    // Arrange
    let dirs = setup_temp_dirs().await.unwrap();
    let t = TestApp::open(dirs.config()).await;

    // Act
    t.app.set_digest_time(7, 15).unwrap();

    // Assert
    assert!(dirs.state_dir.join("daysleft.db").is_file());
    assert!(dirs.state_dir.join("settings.toml").is_file());
}

#[tokio::test]
async fn config_settings_survive_restart() {
    // Arrange
    let dirs = setup_temp_dirs().await.unwrap();
    let first = TestApp::open(dirs.config()).await;
    first.app.set_digest_time(7, 15).unwrap();
    first.app.set_digest_enabled(false).unwrap();
    first
        .app
        .add_event(test_draft("Kept", days_from_now(4)))
        .await
        .unwrap();
    first.app.clone().close().await;

    // Act
    let second = TestApp::open(dirs.config()).await;
    second.app.on_launch().await.unwrap();

    // Assert
    let settings = second.app.settings();
    assert!(!settings.digest_enabled);
    assert_eq!((settings.digest_hour, settings.digest_minute), (7, 15));
    assert!(second.engine.jobs_for(DAILY_DIGEST_TAG).is_empty());
    assert_eq!(second.app.count_events(EventFilter::All).await.unwrap(), 1);
}

#[tokio::test]
async fn config_auto_archive_after_days_applied() {
    // Arrange
    let config = Config {
        auto_archive_after_days: 7,
        ..Config::default()
    };
    let t = TestApp::in_memory_with(config).await;
    let week_old = t
        .app
        .add_event(test_draft("Last week", days_from_now(-8)))
        .await
        .unwrap();
    t.app
        .add_event(test_draft("Few days ago", days_from_now(-6)))
        .await
        .unwrap();

    // Act
    let ids = t.app.archive_old_events().await.unwrap();

    // Assert
    assert_eq!(ids, vec![week_old.id()]);
    assert_eq!(t.app.count_events(EventFilter::All).await.unwrap(), 1);
}

#[tokio::test]
async fn config_important_reminder_time_applied() {
    // Arrange
    let config: Config = toml::from_str(r#"important_reminder_time = "18:30""#).unwrap();
    let t = TestApp::in_memory_with(config).await;
    let draft = EventDraft {
        is_important: true,
        ..test_reminding_draft("Recital", days_from_now(3), 1)
    };

    // Act
    let event = t.app.add_event(draft).await.unwrap();

    // Assert - first daily reminder later today
    let daily: Vec<_> = t
        .engine
        .jobs_for(&event_reminder_tag(event.id()))
        .into_iter()
        .filter(|job| job.schedule.is_recurring())
        .collect();
    assert_eq!(daily.len(), 1);
    assert_eq!(
        daily[0].schedule,
        Schedule::Daily {
            first_at: (fixed_now() + TimeDelta::minutes(8 * 60 + 30)).with_timezone(&Utc)
        }
    );
}

#[tokio::test]
async fn config_zero_retry_limit_rejected() {
    // Arrange
    let dirs = setup_temp_dirs().await.unwrap();
    let config = Config {
        job_retry_limit: 0,
        ..dirs.config()
    };

    // Act
    let clock = Arc::new(FixedClock::new(fixed_now()));
    let result = DaysLeft::open(config, clock, |_, _| -> Arc<dyn JobEngine> {
        Arc::new(MemoryJobEngine::new())
    })
    .await;

    // Assert
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn config_settings_refreshed_from_another_process() {
    // Arrange
    let dirs = setup_temp_dirs().await.unwrap();
    let daemon = TestApp::open(dirs.config()).await;
    daemon.app.on_launch().await.unwrap();
    let one_shot = TestApp::open(dirs.config()).await;

    // Act
    one_shot.app.set_digest_time(18, 30).unwrap();
    let settings = daemon.app.refresh_settings().unwrap();

    // Assert
    assert_eq!((settings.digest_hour, settings.digest_minute), (18, 30));
    let pending = daemon.engine.jobs_for(DAILY_DIGEST_TAG);
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].schedule.first_at(),
        (fixed_now() + TimeDelta::minutes(8 * 60 + 30)).with_timezone(&Utc)
    );
}
