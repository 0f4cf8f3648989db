//! Timers driven by a paused tokio runtime

use std::time::Duration;

use toastline::notifications::api::{Engine, EngineConfig, NotificationError, NotificationSpec};

#[test]
fn test_tokio_engine_needs_runtime() {
    let result = Engine::with_tokio(EngineConfig::default());
    assert!(matches!(result, Err(NotificationError::NoRuntime)));
}

#[tokio::test(start_paused = true)]
async fn test_notification_expires_on_runtime_clock() {
    let engine = Engine::with_tokio(EngineConfig::default()).unwrap();
    let id = engine.enqueue(NotificationSpec::info("tick").with_duration(Duration::from_millis(1000)));

    tokio::time::sleep(Duration::from_millis(500)).await;
    let halfway = engine.countdown(id).unwrap();
    assert!(halfway.progress <= 0.55 && halfway.progress >= 0.45);
    assert!(engine.snapshot().contains(id));

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(!engine.snapshot().contains(id));
    assert_eq!(engine.active_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_cancels_runtime_timer() {
    let engine = Engine::with_tokio(EngineConfig::default()).unwrap();
    let fired = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = fired.clone();
    engine.subscribe(move |_: &toastline::notifications::api::Snapshot| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });

    let id = engine.enqueue(NotificationSpec::warning("bye").with_duration(Duration::from_millis(300)));
    engine.dismiss(id);
    let after_dismiss = fired.load(std::sync::atomic::Ordering::SeqCst);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), after_dismiss);
    assert!(engine.snapshot().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_producers_respect_capacity() {
    let engine = Engine::with_tokio(EngineConfig::default().with_capacity(4)).unwrap();

    let producers: Vec<_> = (0..8)
        .map(|p| {
            let engine = engine.clone();
            tokio::spawn(async move {
                for i in 0..25 {
                    engine.enqueue(NotificationSpec::info(format!("{p}-{i}")).sticky());
                    assert!(engine.snapshot().len() <= 4);
                }
            })
        })
        .collect();
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(engine.snapshot().len(), 4);
}
