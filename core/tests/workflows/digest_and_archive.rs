// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Daily digest and auto-archive workflow tests.

use chrono::{TimeDelta, Utc};
use daysleft_core::jobs::{AUTO_ARCHIVE_TAG, DAILY_DIGEST_TAG, JobKind, JobOutcome};
use daysleft_core::notify::{Channel, DIGEST_NOTIFICATION_ID};
use daysleft_core::{Error, EventFilter, EventSort, Priority, ValidationError};

use crate::common::{TestApp, days_from_now, fixed_now, test_draft, test_reminding_draft};

#[tokio::test]
async fn digest_counts_active_events_of_the_coming_week() {
    // Arrange
    let t = TestApp::in_memory().await;
    t.app.on_launch().await.unwrap();
    for days in [1, 6, 9] {
        t.app
            .add_event(test_draft(&format!("In {days} days"), days_from_now(days)))
            .await
            .unwrap();
    }
    let archived = t
        .app
        .add_event(test_draft("Archived", days_from_now(2)))
        .await
        .unwrap();
    t.app.archive_event(archived.id()).await.unwrap();

    // Act - 08:00 tomorrow
    let outcomes = t.run_at(days_from_now(1) - TimeDelta::hours(2)).await;

    // Assert
    let digest = outcomes
        .iter()
        .find(|(job, _)| job.kind == JobKind::DailyDigest)
        .expect("digest should have run");
    assert_eq!(digest.1, JobOutcome::Success);
    let posted = t.notifier.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].id, DIGEST_NOTIFICATION_ID);
    assert_eq!(posted[0].channel, Channel::DailyDigest);
    assert_eq!(posted[0].title, "Daily Digest");
    assert_eq!(posted[0].body, "2 events this week");
    assert_eq!(posted[0].priority, Priority::Low);

    // Assert - still scheduled for the day after
    let pending = t.engine.jobs_for(DAILY_DIGEST_TAG);
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].schedule.first_at(),
        (days_from_now(2) - TimeDelta::hours(2)).with_timezone(&Utc)
    );
}

#[tokio::test]
async fn digest_with_single_event_and_without_events() {
    // Arrange
    let t = TestApp::in_memory().await;
    t.app.on_launch().await.unwrap();
    let eight_tomorrow = days_from_now(1) - TimeDelta::hours(2);

    // Act & Assert - nothing to announce
    t.run_at(eight_tomorrow).await;
    assert!(t.notifier.posted().is_empty());

    // Act & Assert - one event
    t.app
        .add_event(test_draft("Only one", days_from_now(3)))
        .await
        .unwrap();
    t.run_at(eight_tomorrow + TimeDelta::days(1)).await;
    assert_eq!(t.notifier.posted()[0].body, "1 event this week");
}

#[tokio::test]
async fn digest_settings_reschedule_the_job() {
    // Arrange
    let t = TestApp::in_memory().await;
    t.app.on_launch().await.unwrap();
    assert_eq!(t.engine.jobs_for(DAILY_DIGEST_TAG).len(), 1);

    // Act & Assert - disable
    let settings = t.app.set_digest_enabled(false).unwrap();
    assert!(!settings.digest_enabled);
    assert!(t.engine.jobs_for(DAILY_DIGEST_TAG).is_empty());

    // Act & Assert - enable at a later time today
    t.app.set_digest_enabled(true).unwrap();
    let settings = t.app.set_digest_time(18, 30).unwrap();
    assert_eq!((settings.digest_hour, settings.digest_minute), (18, 30));
    let pending = t.engine.jobs_for(DAILY_DIGEST_TAG);
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].schedule.first_at(),
        (fixed_now() + TimeDelta::minutes(8 * 60 + 30)).with_timezone(&Utc)
    );
}

#[tokio::test]
async fn digest_rejects_invalid_time() {
    let t = TestApp::in_memory().await;

    let result = t.app.set_digest_time(24, 0);

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::InvalidDigestTime {
            hour: 24,
            minute: 0
        }))
    ));
    assert_eq!(t.app.settings().digest_hour, 8);
}

#[tokio::test]
async fn auto_archive_runs_on_launch() {
    // Arrange
    let t = TestApp::in_memory().await;
    let old = t
        .app
        .add_event(test_draft("Old", days_from_now(-31)))
        .await
        .unwrap();
    let recent = t
        .app
        .add_event(test_reminding_draft("Recent", days_from_now(-29), 1))
        .await
        .unwrap();
    let ahead = t
        .app
        .add_event(test_draft("Ahead", days_from_now(3)))
        .await
        .unwrap();

    // Act
    t.app.on_launch().await.unwrap();
    let outcomes = t.run_due().await;

    // Assert
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].0.kind, JobKind::AutoArchive);
    assert_eq!(outcomes[0].1, JobOutcome::Success);
    let archived = t
        .app
        .list_events(EventFilter::Archived, EventSort::Date, None)
        .await
        .unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id(), old.id());
    let active = t
        .app
        .list_events(EventFilter::All, EventSort::Date, None)
        .await
        .unwrap();
    assert_eq!(
        active.iter().map(|e| e.id()).collect::<Vec<_>>(),
        vec![recent.id(), ahead.id()]
    );

    // Assert - runs again tomorrow
    let pending = t.engine.jobs_for(AUTO_ARCHIVE_TAG);
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].schedule.first_at(),
        days_from_now(1).with_timezone(&Utc)
    );
}

#[tokio::test]
async fn auto_archive_on_demand_returns_archived_ids() {
    // Arrange
    let t = TestApp::in_memory().await;
    let old = t
        .app
        .add_event(test_draft("Old", days_from_now(-45)))
        .await
        .unwrap();
    let archived_before = t
        .app
        .add_event(test_draft("Already archived", days_from_now(-60)))
        .await
        .unwrap();
    t.app.archive_event(archived_before.id()).await.unwrap();

    // Act
    let ids = t.app.archive_old_events().await.unwrap();
    let again = t.app.archive_old_events().await.unwrap();

    // Assert
    assert_eq!(ids, vec![old.id()]);
    assert!(again.is_empty());
    assert_eq!(t.app.count_events(EventFilter::Archived).await.unwrap(), 2);
}
