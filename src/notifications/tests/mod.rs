//! Cross-module tests for the notification engine

mod scenarios;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::notifications::api::{Engine, EngineConfig, ManualScheduler, Snapshot};

/// Engine on a virtual clock with no default auto-dismiss
fn sticky_engine(capacity: usize) -> (Engine, Arc<ManualScheduler>) {
    let clock = Arc::new(ManualScheduler::new());
    let config = EngineConfig::default()
        .with_capacity(capacity)
        .with_default_duration(Duration::ZERO);
    let engine = Engine::new(config, clock.clone()).expect("valid config");
    (engine, clock)
}

/// Subscribe a recorder that keeps every snapshot it receives
fn record(engine: &Engine) -> Arc<Mutex<Vec<Snapshot>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    engine.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.clone()));
    seen
}
