//! Shared helpers for integration tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use toastline::notifications::api::{Engine, EngineConfig, ManualScheduler, Snapshot};

/// Engine on a virtual clock; notifications default to `default_ms`
pub fn manual_engine(capacity: usize, default_ms: u64) -> (Engine, Arc<ManualScheduler>) {
    let clock = Arc::new(ManualScheduler::new());
    let config = EngineConfig::default()
        .with_capacity(capacity)
        .with_default_duration(Duration::from_millis(default_ms));
    let engine = Engine::new(config, clock.clone()).unwrap();
    (engine, clock)
}

/// Collect every snapshot delivered to a fresh subscriber
pub fn recorder(engine: &Engine) -> Arc<Mutex<Vec<Snapshot>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    engine.subscribe(move |snapshot: &Snapshot| sink.lock().unwrap().push(snapshot.clone()));
    seen
}
