//! Subscription registry
//!
//! Ordered list of snapshot observers. Registration order is delivery order,
//! and removal goes by the [`Subscription`] handle returned at subscribe time,
//! never by comparing callbacks.
//!
//! A subscriber that returns an error or panics is logged and skipped; the
//! remaining subscribers still receive the snapshot.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::notifications::error::SubscriberError;
use crate::notifications::store::Snapshot;

/// Observer of store snapshots
pub trait Subscriber: Send + Sync {
    /// Called synchronously after every dispatch with the latest snapshot
    fn on_snapshot(&self, snapshot: &Snapshot) -> Result<(), SubscriberError>;
}

impl<F> Subscriber for F
where
    F: Fn(&Snapshot) + Send + Sync,
{
    fn on_snapshot(&self, snapshot: &Snapshot) -> Result<(), SubscriberError> {
        self(snapshot);
        Ok(())
    }
}

static NEXT_REGISTRY: AtomicU64 = AtomicU64::new(0);

/// Handle identifying one registration in one registry
///
/// Handles from another engine never match, even if their counters line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    registry: u64,
    handle: u64,
}

/// Delivery counters for a subscriber
#[derive(Debug, Default)]
pub struct SubscriberStatistics {
    delivered: AtomicUsize,
    failures: AtomicUsize,
}

impl SubscriberStatistics {
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    fn record_delivery(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// A registration cloned out of the registry for delivery
#[derive(Clone)]
pub(crate) struct Target {
    subscription: Subscription,
    subscriber: Arc<dyn Subscriber>,
    statistics: Arc<SubscriberStatistics>,
}

impl Target {
    /// Invoke the subscriber, isolating errors and panics; returns success
    pub(crate) fn deliver(&self, snapshot: &Snapshot) -> bool {
        let result = catch_unwind(AssertUnwindSafe(|| self.subscriber.on_snapshot(snapshot)));
        match result {
            Ok(Ok(())) => {
                self.statistics.record_delivery();
                true
            }
            Ok(Err(e)) => {
                self.statistics.record_failure();
                log::warn!("Subscriber {:?} failed to handle snapshot: {}", self.subscription, e);
                false
            }
            Err(payload) => {
                self.statistics.record_failure();
                log::error!(
                    "Subscriber {:?} panicked while handling snapshot: {}",
                    self.subscription,
                    panic_message(payload)
                );
                false
            }
        }
    }
}

pub struct Registry {
    identity: u64,
    next_handle: u64,
    entries: Vec<Target>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            identity: NEXT_REGISTRY.fetch_add(1, Ordering::Relaxed),
            next_handle: 0,
            entries: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>) -> Subscription {
        let subscription = Subscription {
            registry: self.identity,
            handle: self.next_handle,
        };
        self.next_handle = self.next_handle.wrapping_add(1);
        self.entries.push(Target {
            subscription,
            subscriber,
            statistics: Arc::new(SubscriberStatistics::default()),
        });
        log::debug!(
            "Registered subscriber {:?} ({} active)",
            subscription,
            self.entries.len()
        );
        subscription
    }

    /// Remove exactly this registration; `false` if it was already gone
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        match self
            .entries
            .iter()
            .position(|t| t.subscription == subscription)
        {
            Some(pos) => {
                self.entries.remove(pos);
                log::debug!(
                    "Removed subscriber {:?} ({} active)",
                    subscription,
                    self.entries.len()
                );
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn statistics(&self, subscription: Subscription) -> Option<Arc<SubscriberStatistics>> {
        self.entries
            .iter()
            .find(|t| t.subscription == subscription)
            .map(|t| t.statistics.clone())
    }

    /// Registrations in delivery order, cloned so delivery can run unlocked
    pub(crate) fn targets(&self) -> Vec<Target> {
        self.entries.clone()
    }
}

/// Deliver to `targets` in order, fetching the snapshot afresh for each one
///
/// Returns how many subscribers failed.
pub(crate) fn fan_out<F>(targets: &[Target], latest: F) -> usize
where
    F: Fn() -> Snapshot,
{
    targets
        .iter()
        .filter(|target| !target.deliver(&latest()))
        .count()
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic payload".to_string()
}
