//! Engine behaviour through the public API on a virtual clock

use std::time::Duration;

use crate::common::{manual_engine, recorder};
use toastline::notifications::api::{
    Engine, EngineConfig, IdGenerator, Kind, ManualScheduler, NotificationId, NotificationPatch,
    NotificationSpec, NotificationState,
};

#[test]
fn test_capacity_evicts_oldest_first() {
    let (engine, _clock) = manual_engine(3, 0);
    let ids: Vec<_> = ["A", "B", "C", "D"]
        .into_iter()
        .map(|body| engine.enqueue(NotificationSpec::info(body)))
        .collect();

    assert_eq!(engine.snapshot().ids(), ids[1..].to_vec());
}

#[test]
fn test_default_duration_applies_when_none_given() {
    let (engine, clock) = manual_engine(3, 1000);
    let id = engine.enqueue(NotificationSpec::info("E"));

    clock.advance(Duration::from_millis(999));
    assert!(engine.snapshot().contains(id));
    clock.advance(Duration::from_millis(1));
    assert!(engine.snapshot().is_empty());
}

#[test]
fn test_sticky_survives_until_dismissed() {
    let (engine, clock) = manual_engine(3, 1000);
    let id = engine.enqueue(NotificationSpec::warning("F").sticky());

    clock.advance(Duration::from_secs(3600));
    assert!(engine.snapshot().contains(id));
    assert_eq!(engine.active_timers(), 0);

    engine.dismiss(id);
    assert!(engine.snapshot().is_empty());
}

#[test]
fn test_unknown_ids_are_ignored() {
    let (engine, _clock) = manual_engine(3, 0);
    engine.enqueue(NotificationSpec::info("present"));
    let before = engine.snapshot();

    let ghost = NotificationId::from_raw(9000);
    engine.update(ghost, NotificationPatch::default().body("x"));
    engine.dismiss(ghost);
    engine.dismiss(ghost);

    assert_eq!(engine.snapshot(), before);
}

#[test]
fn test_patch_can_clear_title() {
    let (engine, _clock) = manual_engine(3, 0);
    let id = engine.enqueue(NotificationSpec::info("body").with_title("Heading"));

    let patch: NotificationPatch = serde_json::from_str(r#"{"title": null}"#).unwrap();
    engine.update(id, patch);

    let snapshot = engine.snapshot();
    let notification = snapshot.get(id).unwrap();
    assert_eq!(notification.title(), None);
    assert_eq!(notification.body(), "body");
}

#[test]
fn test_kind_durations_override_default() {
    let clock = std::sync::Arc::new(ManualScheduler::new());
    let config = EngineConfig::default()
        .with_default_duration(Duration::from_millis(500))
        .with_kind_duration(Kind::Error, Duration::ZERO);
    let engine = Engine::new(config, clock.clone()).unwrap();

    let error = engine.enqueue(NotificationSpec::error("stays"));
    let info = engine.enqueue(NotificationSpec::info("goes"));
    clock.advance(Duration::from_secs(1));

    assert!(engine.snapshot().contains(error));
    assert!(!engine.snapshot().contains(info));
}

#[test]
fn test_exit_grace_shows_dismissing_state() {
    let clock = std::sync::Arc::new(ManualScheduler::new());
    let config = EngineConfig::default()
        .with_default_duration(Duration::ZERO)
        .with_exit_grace(Duration::from_millis(300));
    let engine = Engine::new(config, clock.clone()).unwrap();
    let seen = recorder(&engine);

    let id = engine.enqueue(NotificationSpec::info("leaving"));
    engine.dismiss(id);
    assert_eq!(
        engine.snapshot().get(id).map(|n| n.state()),
        Some(NotificationState::Dismissing)
    );

    // Dismissing again keeps the original deadline
    clock.advance(Duration::from_millis(200));
    engine.dismiss(id);
    clock.advance(Duration::from_millis(100));
    assert!(!engine.snapshot().contains(id));

    let states: Vec<Option<NotificationState>> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|s| s.get(id).map(|n| n.state()))
        .collect();
    assert_eq!(states.first(), Some(&Some(NotificationState::Visible)));
    assert_eq!(states.last(), Some(&None));
}

#[test]
fn test_dismiss_where_matches_kind() {
    let (engine, _clock) = manual_engine(5, 0);
    engine.enqueue(NotificationSpec::error("a"));
    let keep = engine.enqueue(NotificationSpec::success("b"));
    engine.enqueue(NotificationSpec::error("c"));

    assert_eq!(engine.dismiss_where(|n| n.kind() == Kind::Error), 2);
    assert_eq!(engine.snapshot().ids(), vec![keep]);
}

#[test]
fn test_id_wraparound_skips_live_ids() {
    let clock = std::sync::Arc::new(ManualScheduler::new());
    let config = EngineConfig::default()
        .with_capacity(3)
        .with_default_duration(Duration::ZERO);
    let engine = Engine::with_id_generator(config, clock, IdGenerator::with_ceiling(3)).unwrap();

    let first = engine.enqueue(NotificationSpec::info("0"));
    for n in 1..=3 {
        engine.enqueue(NotificationSpec::info(n.to_string()));
    }
    // ids 1..=3 are live; the counter wrapped to 0 which is free again
    let wrapped = engine.enqueue(NotificationSpec::info("wrapped"));
    assert_eq!(wrapped, first);

    let ids = engine.snapshot().ids();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}
