//! Example scenarios for the notification engine

use std::time::Duration;

use super::{record, sticky_engine};
use crate::notifications::api::{Kind, NotificationId, NotificationPatch, NotificationSpec};

#[test]
fn test_fourth_enqueue_evicts_first() {
    let (engine, _clock) = sticky_engine(3);
    let a = engine.enqueue(NotificationSpec::info("A"));
    let b = engine.enqueue(NotificationSpec::info("B"));
    let c = engine.enqueue(NotificationSpec::info("C"));
    let d = engine.enqueue(NotificationSpec::info("D"));

    assert_eq!(engine.snapshot().ids(), vec![b, c, d]);
    assert!(!engine.snapshot().contains(a));
}

#[test]
fn test_timed_notification_removed_at_duration() {
    let (engine, clock) = sticky_engine(3);
    let e = engine.enqueue(NotificationSpec::info("E").with_duration(Duration::from_millis(1000)));

    clock.advance(Duration::from_millis(999));
    assert!(engine.snapshot().contains(e));

    clock.advance(Duration::from_millis(1));
    assert!(!engine.snapshot().contains(e));
    assert_eq!(engine.active_timers(), 0);
}

#[test]
fn test_sticky_notification_waits_for_dismiss() {
    let (engine, clock) = sticky_engine(3);
    let f = engine.enqueue(NotificationSpec::warning("F").sticky());

    clock.advance(Duration::from_secs(24 * 60 * 60));
    assert!(engine.snapshot().contains(f));

    engine.dismiss(f);
    assert!(!engine.snapshot().contains(f));
}

#[test]
fn test_two_subscribers_see_identical_snapshot_once() {
    let (engine, _clock) = sticky_engine(3);
    let first = record(&engine);
    let second = record(&engine);

    let id = engine.enqueue(NotificationSpec::success("hello"));

    let first = first.lock().unwrap();
    let second = second.lock().unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert!(first[0].same_as(&second[0]));
    assert_eq!(first[0].ids(), vec![id]);
}

#[test]
fn test_update_unknown_id_leaves_snapshot_unchanged() {
    let (engine, _clock) = sticky_engine(3);
    engine.enqueue(NotificationSpec::info("present"));
    let before = engine.snapshot();

    engine.update(
        NotificationId::from_raw(4242),
        NotificationPatch::default().title("x"),
    );

    assert!(engine.snapshot().same_as(&before));
}

#[test]
fn test_double_dismiss_is_noop() {
    let (engine, _clock) = sticky_engine(3);
    let keep = engine.enqueue(NotificationSpec::info("keep"));
    let gone = engine.enqueue(NotificationSpec::info("gone"));

    engine.dismiss(gone);
    let after_first = engine.snapshot();
    engine.dismiss(gone);

    assert_eq!(engine.snapshot(), after_first);
    assert_eq!(after_first.ids(), vec![keep]);
}

#[test]
fn test_update_changes_content_in_place() {
    let (engine, _clock) = sticky_engine(3);
    let first = engine.enqueue(NotificationSpec::info("Uploading…"));
    let second = engine.enqueue(NotificationSpec::info("other"));

    engine.update(
        first,
        NotificationPatch::default()
            .body("Upload complete")
            .kind(Kind::Success),
    );

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.ids(), vec![first, second]);
    let updated = snapshot.get(first).unwrap();
    assert_eq!(updated.body(), "Upload complete");
    assert_eq!(updated.kind(), Kind::Success);
}

#[test]
fn test_clear_empties_snapshot_and_stops_timers() {
    let (engine, clock) = sticky_engine(5);
    for i in 0..4 {
        engine.enqueue(NotificationSpec::info(format!("n{i}")).with_duration(Duration::from_secs(2)));
    }
    assert_eq!(engine.active_timers(), 4);

    engine.clear();
    assert!(engine.snapshot().is_empty());
    assert_eq!(engine.active_timers(), 0);
    clock.advance(Duration::from_secs(5));
    assert_eq!(clock.pending(), 0);
}

#[test]
fn test_unsubscribed_renderer_stops_receiving() {
    let (engine, _clock) = sticky_engine(3);
    let seen = std::sync::Arc::new(std::sync::Mutex::new(0));
    let counter = seen.clone();
    let subscription = engine.subscribe(move |_| *counter.lock().unwrap() += 1);

    engine.enqueue(NotificationSpec::info("one"));
    assert!(engine.unsubscribe(subscription));
    engine.enqueue(NotificationSpec::info("two"));

    assert_eq!(*seen.lock().unwrap(), 1);
    assert_eq!(engine.subscriber_count(), 0);
}
