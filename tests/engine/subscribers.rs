//! Subscriber fan-out through the public API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::common::{manual_engine, recorder};
use toastline::notifications::api::{
    Kind, NotificationSpec, Snapshot, Subscriber, SubscriberError,
};

struct Failing;

impl Subscriber for Failing {
    fn on_snapshot(&self, _: &Snapshot) -> Result<(), SubscriberError> {
        Err("surface detached".into())
    }
}

#[test]
fn test_delivery_follows_registration_order() {
    let (engine, _clock) = manual_engine(3, 0);
    let order = Arc::new(Mutex::new(Vec::new()));
    for name in ["toolbar", "sidebar", "log"] {
        let order = order.clone();
        engine.subscribe(move |_: &Snapshot| order.lock().unwrap().push(name));
    }

    engine.enqueue(NotificationSpec::info("x"));

    assert_eq!(*order.lock().unwrap(), vec!["toolbar", "sidebar", "log"]);
}

#[test]
fn test_failing_and_panicking_subscribers_are_isolated() {
    let (engine, _clock) = manual_engine(3, 0);
    let failing = engine.subscribe_with(Arc::new(Failing));
    let panicking = engine.subscribe(|_: &Snapshot| panic!("renderer crashed"));
    let seen = recorder(&engine);

    engine.enqueue(NotificationSpec::info("one"));
    engine.enqueue(NotificationSpec::info("two"));

    assert_eq!(seen.lock().unwrap().len(), 2);
    assert_eq!(engine.subscriber_statistics(failing).unwrap().failures(), 2);
    assert_eq!(engine.subscriber_statistics(panicking).unwrap().failures(), 2);
    assert_eq!(engine.subscriber_count(), 3);
}

#[test]
fn test_subscriber_may_dismiss_from_callback() {
    let (engine, _clock) = manual_engine(3, 0);
    let handle = engine.clone();
    engine.subscribe(move |snapshot: &Snapshot| {
        let errors: Vec<_> = snapshot
            .iter()
            .filter(|n| n.kind() == Kind::Error && n.state().is_live())
            .map(|n| n.id())
            .collect();
        for id in errors {
            handle.dismiss(id);
        }
    });
    let seen = recorder(&engine);

    let kept = engine.enqueue(NotificationSpec::success("fine"));
    engine.enqueue(NotificationSpec::error("auto-dismissed"));

    assert_eq!(engine.snapshot().ids(), vec![kept]);
    let last = seen.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.ids(), vec![kept]);
}

#[test]
fn test_unsubscribe_inside_callback_takes_effect_next_dispatch() {
    let (engine, _clock) = manual_engine(3, 0);
    let calls = Arc::new(AtomicUsize::new(0));
    let slot = Arc::new(Mutex::new(None));

    let handle = engine.clone();
    let counter = calls.clone();
    let own = slot.clone();
    let subscription = engine.subscribe(move |_: &Snapshot| {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(subscription) = own.lock().unwrap().take() {
            handle.unsubscribe(subscription);
        }
    });
    *slot.lock().unwrap() = Some(subscription);

    engine.enqueue(NotificationSpec::info("first"));
    engine.enqueue(NotificationSpec::info("second"));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!engine.unsubscribe(subscription));
}

#[test]
fn test_handle_from_another_engine_leaves_subscribers_alone() {
    let (first, _clock_a) = manual_engine(3, 0);
    let (second, _clock_b) = manual_engine(3, 0);
    let foreign = first.subscribe(|_: &Snapshot| {});
    let seen = recorder(&second);

    assert!(!second.unsubscribe(foreign));
    assert_eq!(second.subscriber_count(), 1);

    second.enqueue(NotificationSpec::info("still delivered"));
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert!(first.unsubscribe(foreign));
}
