// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Reminder scheduling and firing workflow tests.
//!
//! Events are created through the application, then the clock is moved to
//! the reminder times and the due jobs are run by hand.

use chrono::TimeDelta;
use daysleft_core::jobs::{JobOutcome, Schedule, event_reminder_tag};
use daysleft_core::notify::Channel;
use daysleft_core::{EventDraft, Priority};

use crate::common::{
    TestApp, assert_no_reminders, assert_reminders_at, days_from_now, fixed_now, setup_temp_dirs,
    test_reminding_draft,
};

#[tokio::test]
async fn reminders_fire_with_days_left_at_fire_time() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Conference", days_from_now(10), 7))
        .await
        .unwrap();

    // Act - the preferred reminder, a week ahead
    let outcomes = t.run_at(days_from_now(3)).await;

    // Assert
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].1, JobOutcome::Success);
    let posted = t.notifier.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].id, event.id().get());
    assert_eq!(posted[0].channel, Channel::UpcomingEvents);
    assert_eq!(posted[0].title, "Event in 7 days");
    let date = days_from_now(10).format("%b %d, %Y");
    assert_eq!(posted[0].body, format!("Conference is in 7 days ({date})"));
    assert_eq!(posted[0].priority, Priority::Default);

    // Act - the automatic reminders, the clock jumped past both
    let outcomes = t.run_at(days_from_now(9)).await;

    // Assert - the later one replaces the earlier notification
    assert_eq!(outcomes.len(), 2);
    let posted = t.notifier.posted();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].title, "Event Tomorrow!");
    assert_eq!(posted[0].body, format!("Conference is TOMORROW ({date})"));
    assert!(posted[0].is_alerting());
    assert_no_reminders(&t, event.id());
}

#[tokio::test]
async fn reminders_one_day_offset_is_not_duplicated() {
    // Arrange
    let t = TestApp::in_memory().await;
    let date = days_from_now(1) + TimeDelta::hours(8);

    // Act
    let event = t
        .app
        .add_event(test_reminding_draft("Flight", date, 1))
        .await
        .unwrap();

    // Assert - only the preferred reminder, the 3-day one is already past
    assert_reminders_at(&t, event.id(), &[fixed_now() + TimeDelta::hours(8)]);
    let jobs = t.engine.jobs_for(&event_reminder_tag(event.id()));
    assert!(
        jobs.iter()
            .all(|job| matches!(job.schedule, Schedule::Once { .. }))
    );
}

#[tokio::test]
async fn reminders_in_the_past_are_never_backfired() {
    // Arrange
    let t = TestApp::in_memory().await;

    // Act
    let soon = t
        .app
        .add_event(test_reminding_draft("Soon", days_from_now(2), 7))
        .await
        .unwrap();
    let gone = t
        .app
        .add_event(test_reminding_draft("Gone", days_from_now(-1), 1))
        .await
        .unwrap();
    let outcomes = t.run_due().await;

    // Assert
    assert_reminders_at(&t, soon.id(), &[days_from_now(1)]);
    assert_no_reminders(&t, gone.id());
    assert!(outcomes.is_empty());
    assert!(t.notifier.posted().is_empty());
}

#[tokio::test]
async fn reminders_for_deleted_event_are_silent() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Ghost", days_from_now(10), 7))
        .await
        .unwrap();
    // Bypass the scheduler so the jobs outlive the event
    assert!(t.app.db().events.delete(event.id()).await.unwrap());

    // Act
    let outcomes = t.run_at(days_from_now(9)).await;

    // Assert
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|(_, o)| *o == JobOutcome::Success));
    assert!(t.notifier.posted().is_empty());
}

#[tokio::test]
async fn reminders_for_archived_or_muted_event_are_silent() {
    // Arrange
    let t = TestApp::in_memory().await;
    let archived = t
        .app
        .add_event(test_reminding_draft("Archived", days_from_now(10), 7))
        .await
        .unwrap();
    let muted = t
        .app
        .add_event(test_reminding_draft("Muted", days_from_now(10), 7))
        .await
        .unwrap();
    let events = &t.app.db().events;
    assert!(events.set_archived(archived.id(), true).await.unwrap());
    let muted = daysleft_core::EventPatch {
        notify_me: Some(false),
        ..Default::default()
    }
    .apply_to(&muted)
    .unwrap();
    assert!(events.update(&muted).await.unwrap());

    // Act
    let outcomes = t.run_at(days_from_now(9)).await;

    // Assert
    assert_eq!(outcomes.len(), 6);
    assert!(outcomes.iter().all(|(_, o)| *o == JobOutcome::Success));
    assert!(t.notifier.posted().is_empty());
}

#[tokio::test]
async fn reminders_important_event_daily_until_it_passes() {
    // Arrange
    let t = TestApp::in_memory().await;
    let draft = EventDraft {
        is_important: true,
        ..test_reminding_draft("Surgery", days_from_now(2), 7)
    };
    let event = t.app.add_event(draft).await.unwrap();
    let nine_tomorrow = days_from_now(1) - TimeDelta::hours(1);
    assert_reminders_at(&t, event.id(), &[nine_tomorrow, days_from_now(1)]);

    // Act & Assert - daily reminder the day before
    let outcomes = t.run_at(nine_tomorrow).await;
    assert_eq!(outcomes.len(), 1);
    let posted = t.notifier.posted();
    assert_eq!(posted[0].title, "Important Event Tomorrow!");
    assert_eq!(posted[0].priority, Priority::High);

    // Act & Assert - daily reminder on the day
    let outcomes = t.run_at(nine_tomorrow + TimeDelta::days(1)).await;
    assert_eq!(outcomes.len(), 2, "automatic 1-day reminder and daily reminder");
    let posted = t.notifier.posted();
    assert_eq!(posted[0].title, "Important Event Today!");
    assert!(posted[0].body.starts_with("Surgery is TODAY!"));

    // Act & Assert - the day after, the daily job removes itself quietly
    let outcomes = t.run_at(nine_tomorrow + TimeDelta::days(2)).await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].1, JobOutcome::Success);
    assert_eq!(t.notifier.posted()[0].title, "Important Event Today!");
    assert_no_reminders(&t, event.id());
}

#[tokio::test]
async fn reminders_disabled_channel_is_not_retried() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Quiet", days_from_now(5), 1))
        .await
        .unwrap();
    t.notifier.disable(Channel::UpcomingEvents);

    // Act
    let outcomes = t.run_at(days_from_now(4)).await;

    // Assert
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|(_, o)| *o == JobOutcome::Success));
    assert!(t.notifier.posted().is_empty());
    assert_no_reminders(&t, event.id());
}

#[tokio::test]
async fn reminders_restored_after_restart() {
    // Arrange
    let dirs = setup_temp_dirs().await.unwrap();
    let first = TestApp::open(dirs.config()).await;
    let event = first
        .app
        .add_event(test_reminding_draft("Anniversary", days_from_now(10), 7))
        .await
        .unwrap();
    first.app.clone().close().await;

    // Act - a new process starts with no pending jobs
    let second = TestApp::open(dirs.config()).await;
    assert!(second.engine.is_empty());
    let scheduled = second.app.on_launch().await.unwrap();

    // Assert
    assert_eq!(scheduled, 3);
    assert_reminders_at(
        &second,
        event.id(),
        &[days_from_now(3), days_from_now(7), days_from_now(9)],
    );
}
