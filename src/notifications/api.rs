//! Public API for the notification engine
//!
//! This module provides the complete public API for the notification engine.
//! External modules should import from here rather than directly from internal modules.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use toastline::notifications::api::{Engine, EngineConfig, ManualScheduler, NotificationSpec};
//!
//! let clock = Arc::new(ManualScheduler::new());
//! let engine = Engine::new(EngineConfig::default(), clock.clone()).unwrap();
//!
//! let renderer = engine.subscribe(|snapshot| {
//!     for toast in snapshot.iter() {
//!         println!("[{}] {}", toast.kind(), toast.body());
//!     }
//! });
//!
//! let id = engine.enqueue(NotificationSpec::success("Saved").with_duration(Duration::from_secs(2)));
//! clock.advance(Duration::from_secs(2));
//! assert!(!engine.snapshot().contains(id));
//! engine.unsubscribe(renderer);
//! ```

// Façade and configuration
pub use crate::notifications::config::{
    EngineConfig, DEFAULT_CAPACITY, DEFAULT_DURATION, DEFAULT_TICK_INTERVAL,
};
pub use crate::notifications::engine::Engine;

// Data model
pub use crate::notifications::id::{IdGenerator, NotificationId};
pub use crate::notifications::notification::{
    Countdown, Kind, Notification, NotificationPatch, NotificationSpec, NotificationState,
};

// Store, subscriptions and timers
pub use crate::notifications::registry::{
    Registry, Subscriber, SubscriberStatistics, Subscription,
};
pub use crate::notifications::scheduler::{
    ManualScheduler, Scheduler, Task, TaskHandle, TokioScheduler,
};
pub use crate::notifications::store::{Action, Dispatch, Snapshot, Store};
pub use crate::notifications::timer::TimerController;

// Error handling
pub use crate::notifications::error::{
    ConfigError, NotificationError, NotificationResult, SubscriberError,
};
