//! Ephemeral notification engine
//!
//! Queues, times and retires short-lived user-facing notifications (toasts).
//! Any part of an application may enqueue; every mounted rendering surface
//! subscribes and sees the same ordered snapshot after each change.
//!
//! # Architecture
//!
//! ```text
//!  enqueue / update / dismiss / clear
//!               │
//!               ▼
//!  ┌─────────────────────────┐   ADD evicts oldest    ┌──────────────┐
//!  │ Engine (façade)         │──────────────────────▶│ Store        │
//!  │  ├─ IdGenerator         │   snapshot             │ (capacity N) │
//!  │  └─ TimerController/id  │◀──────────────────────└──────────────┘
//!  └───────────┬─────────────┘
//!              │ fan-out after every dispatch
//!              ▼
//!  ┌─────────────────────────┐
//!  │ Registry → subscribers  │  (renderers, loggers, bridges)
//!  └─────────────────────────┘
//! ```
//!
//! Timers run on a [`Scheduler`](api::Scheduler): `TokioScheduler` in
//! applications, `ManualScheduler` for deterministic tests.

// Internal modules - all access should go through api module
pub(crate) mod config;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod id;
pub(crate) mod notification;
pub(crate) mod registry;
pub(crate) mod scheduler;
pub(crate) mod store;
pub(crate) mod timer;

// Public API module - the only public interface for the notification engine
pub mod api;

#[cfg(test)]
mod tests;
