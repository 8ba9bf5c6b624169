// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end event lifecycle workflow tests.
//!
//! These tests follow an event from creation through edits, archiving and
//! deletion, checking the stored event and its pending reminders together.

use chrono::TimeDelta;
use daysleft_core::{
    Error, EventFilter, EventId, EventListItem, EventPatch, EventSection, EventSort, Pager,
    ValidationError,
};

use crate::common::{
    TestApp, assert_no_reminders, assert_reminders_at, days_from_now, test_draft,
    test_reminding_draft,
};

#[tokio::test]
async fn event_lifecycle_create_flow() {
    // Arrange
    let t = TestApp::in_memory().await;
    let date = days_from_now(10);

    // Act
    let event = t
        .app
        .add_event(test_reminding_draft("  Conference  ", date, 7))
        .await
        .unwrap();

    // Assert - stored as validated
    assert!(event.id().is_saved());
    assert_eq!(event.title(), "Conference");
    assert_eq!(event.date_millis(), date.timestamp_millis());
    assert!(event.notify_me());
    assert!(!event.is_archived());
    assert_eq!(t.app.get_event(event.id()).await.unwrap(), event);

    // Assert - listed
    let all = t
        .app
        .list_events(EventFilter::All, EventSort::Date, None)
        .await
        .unwrap();
    assert_eq!(all, vec![event.clone()]);

    // Assert - reminders scheduled
    assert_reminders_at(
        &t,
        event.id(),
        &[days_from_now(3), days_from_now(7), days_from_now(9)],
    );
}

#[tokio::test]
async fn event_lifecycle_update_moves_reminders() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Dentist", days_from_now(10), 1))
        .await
        .unwrap();

    // Act
    let patch = EventPatch {
        title: Some("Dentist, moved".to_string()),
        date_millis: Some(days_from_now(20).timestamp_millis()),
        reminder_offset_days: Some(7),
        ..Default::default()
    };
    let updated = t.app.update_event(event.id(), &patch).await.unwrap();

    // Assert
    assert_eq!(updated.id(), event.id());
    assert_eq!(updated.title(), "Dentist, moved");
    assert_eq!(updated.reminder_offset_days(), 7);
    assert_eq!(t.app.get_event(event.id()).await.unwrap(), updated);
    assert_reminders_at(
        &t,
        event.id(),
        &[days_from_now(13), days_from_now(17), days_from_now(19)],
    );
}

#[tokio::test]
async fn event_lifecycle_notify_off_cancels_all_reminders() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Exam", days_from_now(10), 7))
        .await
        .unwrap();
    assert_eq!(t.reminder_times(event.id()).len(), 3);

    // Act
    let patch = EventPatch {
        notify_me: Some(false),
        ..Default::default()
    };
    t.app.update_event(event.id(), &patch).await.unwrap();

    // Assert
    assert_no_reminders(&t, event.id());

    // Act - turning it back on schedules them again
    let patch = EventPatch {
        notify_me: Some(true),
        ..Default::default()
    };
    t.app.update_event(event.id(), &patch).await.unwrap();

    // Assert
    assert_eq!(t.reminder_times(event.id()).len(), 3);
}

#[tokio::test]
async fn event_lifecycle_resync_is_idempotent() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Wedding", days_from_now(10), 3))
        .await
        .unwrap();
    let before = t.reminder_times(event.id());

    // Act
    t.app
        .update_event(event.id(), &EventPatch::default())
        .await
        .unwrap();
    t.app.reschedule_reminders().await.unwrap();

    // Assert
    assert_eq!(t.reminder_times(event.id()), before);
    assert_eq!(before.len(), 2);
}

#[tokio::test]
async fn event_lifecycle_delete_flow() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Party", days_from_now(5), 1))
        .await
        .unwrap();

    // Act
    let deleted = t.app.delete_event(event.id()).await.unwrap();

    // Assert
    assert_eq!(deleted, event);
    assert_no_reminders(&t, event.id());
    assert!(matches!(
        t.app.get_event(event.id()).await,
        Err(Error::NotFound(id)) if id == event.id()
    ));
    assert!(matches!(
        t.app.delete_event(event.id()).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn event_lifecycle_archive_and_restore_flow() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Trip", days_from_now(10), 7))
        .await
        .unwrap();

    // Act - archive
    let archived = t.app.archive_event(event.id()).await.unwrap();

    // Assert - hidden from active views, reminders dropped
    assert!(archived.is_archived());
    assert_no_reminders(&t, event.id());
    let active = t
        .app
        .list_events(EventFilter::All, EventSort::Date, None)
        .await
        .unwrap();
    assert!(active.is_empty());
    let in_archive = t
        .app
        .list_events(EventFilter::Archived, EventSort::Date, None)
        .await
        .unwrap();
    assert_eq!(in_archive, vec![archived]);

    // Act - restore
    let restored = t.app.restore_event(event.id()).await.unwrap();

    // Assert
    assert!(!restored.is_archived());
    assert_eq!(t.reminder_times(event.id()).len(), 3);
    assert_eq!(t.app.count_events(EventFilter::Archived).await.unwrap(), 0);
}

#[tokio::test]
async fn event_lifecycle_importance_toggles_daily_reminder() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_reminding_draft("Exam", days_from_now(10), 7))
        .await
        .unwrap();
    let plain = t.reminder_times(event.id()).len();

    // Act
    let important = t.app.set_important(event.id(), true).await.unwrap();

    // Assert - only the flag changed, a daily reminder joined
    assert!(important.is_important());
    assert_eq!(important.title(), "Exam");
    assert_eq!(important.date_millis(), event.date_millis());
    assert_eq!(t.reminder_times(event.id()).len(), plain + 1);

    // Act
    let back = t.app.set_important(event.id(), false).await.unwrap();

    // Assert
    assert!(!back.is_important());
    assert_eq!(t.reminder_times(event.id()).len(), plain);
}

#[tokio::test]
async fn event_lifecycle_flags_of_unknown_event() {
    let t = TestApp::in_memory().await;

    assert!(matches!(
        t.app.archive_event(EventId(42)).await,
        Err(Error::NotFound(EventId(42)))
    ));
    assert!(matches!(
        t.app.restore_event(EventId(42)).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        t.app.set_important(EventId(42), true).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn event_lifecycle_rejects_invalid_input() {
    // Arrange
    let t = TestApp::in_memory().await;

    // Act
    let blank = t.app.add_event(test_draft("   ", days_from_now(1))).await;
    let zero = t
        .app
        .add_event(test_reminding_draft("Zero", days_from_now(1), 0))
        .await;
    let negative = t
        .app
        .add_event(test_reminding_draft("Negative", days_from_now(1), -3))
        .await;

    // Assert
    assert!(matches!(
        blank,
        Err(Error::Validation(ValidationError::BlankTitle))
    ));
    assert!(matches!(
        zero,
        Err(Error::Validation(ValidationError::NonPositiveOffset(0)))
    ));
    assert!(matches!(
        negative,
        Err(Error::Validation(ValidationError::NonPositiveOffset(-3)))
    ));
    assert_eq!(t.app.count_events(EventFilter::All).await.unwrap(), 0);
    assert!(t.engine.is_empty());
}

#[tokio::test]
async fn event_lifecycle_rejects_invalid_patch_without_changes() {
    // Arrange
    let t = TestApp::in_memory().await;
    let event = t
        .app
        .add_event(test_draft("Keep me", days_from_now(2)))
        .await
        .unwrap();

    // Act
    let patch = EventPatch {
        title: Some(String::new()),
        ..Default::default()
    };
    let result = t.app.update_event(event.id(), &patch).await;

    // Assert
    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::BlankTitle))
    ));
    assert_eq!(t.app.get_event(event.id()).await.unwrap().title(), "Keep me");
}

#[tokio::test]
async fn event_lifecycle_update_unknown_event() {
    let t = TestApp::in_memory().await;

    let result = t
        .app
        .update_event(EventId(404), &EventPatch::default())
        .await;

    assert!(matches!(result, Err(Error::NotFound(EventId(404)))));
}

#[tokio::test]
async fn event_lifecycle_views_follow_the_calendar_day() {
    // Arrange
    let t = TestApp::in_memory().await;
    let earlier_today = days_from_now(0) - TimeDelta::hours(2);
    let past = t
        .app
        .add_event(test_draft("Past", days_from_now(-2)))
        .await
        .unwrap();
    let today = t
        .app
        .add_event(test_draft("Earlier today", earlier_today))
        .await
        .unwrap();
    let soon = t
        .app
        .add_event(test_draft("Soon", days_from_now(3)))
        .await
        .unwrap();
    let later = t
        .app
        .add_event(test_draft("Later", days_from_now(40)))
        .await
        .unwrap();

    // Act & Assert - today, upcoming and past partition the active events
    assert_eq!(ids_in(&t, EventFilter::Today).await, vec![today.id()]);
    assert_eq!(
        ids_in(&t, EventFilter::Upcoming).await,
        vec![soon.id(), later.id()]
    );
    assert_eq!(ids_in(&t, EventFilter::Past).await, vec![past.id()]);
    assert_eq!(
        ids_in(&t, EventFilter::Next7Days).await,
        vec![today.id(), soon.id()]
    );
    assert_eq!(
        ids_in(&t, EventFilter::All).await,
        vec![past.id(), today.id(), soon.id(), later.id()]
    );
}

async fn ids_in(t: &TestApp, filter: EventFilter) -> Vec<EventId> {
    t.app
        .list_events(filter, EventSort::Date, None)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id())
        .collect()
}

#[tokio::test]
async fn event_lifecycle_sorting_and_paging() {
    // Arrange
    let t = TestApp::in_memory().await;
    for (title, days) in [("banana", 5), ("Apple", -1), ("cherry", 2)] {
        t.app
            .add_event(test_draft(title, days_from_now(days)))
            .await
            .unwrap();
    }
    let titles = |events: Vec<daysleft_core::Event>| {
        events
            .iter()
            .map(|e| e.title().to_string())
            .collect::<Vec<_>>()
    };

    // Act & Assert
    let by_title = t
        .app
        .list_events(EventFilter::All, EventSort::Alphabetical, None)
        .await
        .unwrap();
    assert_eq!(titles(by_title), ["Apple", "banana", "cherry"]);

    let by_days_left = t
        .app
        .list_events(EventFilter::All, EventSort::DaysLeft, None)
        .await
        .unwrap();
    assert_eq!(titles(by_days_left), ["Apple", "cherry", "banana"]);

    let pager: Pager = (1, 1).into();
    let second = t
        .app
        .list_events(EventFilter::All, EventSort::Date, Some(&pager))
        .await
        .unwrap();
    assert_eq!(titles(second), ["cherry"]);
}

#[tokio::test]
async fn event_lifecycle_sections() {
    // Arrange
    let t = TestApp::in_memory().await;
    let past = t
        .app
        .add_event(test_draft("Gone", days_from_now(-3)))
        .await
        .unwrap();
    let ahead = t
        .app
        .add_event(test_draft("Ahead", days_from_now(4)))
        .await
        .unwrap();

    // Act
    let items = t
        .app
        .list_sections(EventFilter::All, EventSort::Date)
        .await
        .unwrap();

    // Assert - empty sections get no header
    assert_eq!(
        items,
        vec![
            EventListItem::SectionHeader(EventSection::Upcoming),
            EventListItem::Event(ahead),
            EventListItem::SectionHeader(EventSection::Past),
            EventListItem::Event(past),
        ]
    );
}

#[tokio::test]
async fn event_lifecycle_watch_yields_snapshots_after_changes() {
    // Arrange
    let t = TestApp::in_memory().await;
    let mut watch = t.app.watch_events(EventFilter::All, EventSort::Date);

    // Act & Assert - initial snapshot
    let first = watch.next().await.unwrap().unwrap();
    assert!(first.is_empty());

    // Act & Assert - snapshot after a write
    let event = t
        .app
        .add_event(test_draft("Concert", days_from_now(6)))
        .await
        .unwrap();
    let second = watch.next().await.unwrap().unwrap();
    assert_eq!(second, vec![event.clone()]);

    // Act & Assert - archiving leaves the view
    t.app.archive_event(event.id()).await.unwrap();
    let third = watch.next().await.unwrap().unwrap();
    assert!(third.is_empty());
}
