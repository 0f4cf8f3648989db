//! Notification engine: the public façade
//!
//! `Engine` ties the store, the subscription registry and the per-notification
//! timers together behind `enqueue` / `update` / `dismiss` / `clear` /
//! `subscribe`. It is a cheap `Clone` handle; every clone drives the same
//! store. Timers hold only a weak reference back, so dropping every handle
//! shuts the engine and its timers down.
//!
//! Each dispatch is applied under the state lock and committed before any
//! subscriber runs. Fan-out happens after the lock is released, synchronously,
//! before the calling operation returns. Subscribers may call back into the
//! engine; each one is handed the latest snapshot at the moment it is invoked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use crate::core::sync::lock_recovering;
use crate::notifications::config::EngineConfig;
use crate::notifications::error::NotificationResult;
use crate::notifications::id::{IdGenerator, NotificationId};
use crate::notifications::notification::{
    Countdown, Notification, NotificationPatch, NotificationSpec,
};
use crate::notifications::registry::{
    fan_out, Registry, Subscriber, SubscriberStatistics, Subscription,
};
use crate::notifications::scheduler::{Scheduler, TaskHandle, TokioScheduler};
use crate::notifications::store::{Action, Snapshot, Store};
use crate::notifications::timer::TimerController;

/// Deferred work owned by one notification
enum TimerSlot {
    /// Auto-dismiss countdown
    Countdown(TimerController),
    /// Pending REMOVE at the end of the exit grace window
    Exit(TaskHandle),
}

impl TimerSlot {
    fn cancel(&self) {
        match self {
            TimerSlot::Countdown(timer) => timer.cancel(),
            TimerSlot::Exit(handle) => handle.cancel(),
        }
    }
}

/// A slot is only honoured while its generation is the one registered
struct Armed {
    generation: u64,
    slot: TimerSlot,
}

struct EngineState {
    store: Store,
    ids: IdGenerator,
    timers: HashMap<NotificationId, Armed>,
    next_generation: u64,
}

impl EngineState {
    /// Next id not held by a live notification (matters after wraparound)
    fn mint_id(&mut self) -> NotificationId {
        let mut id = self.ids.next();
        for _ in 0..self.store.len() {
            if !self.store.contains(id) {
                break;
            }
            log::debug!("Skipping id {} still in use after wraparound", id);
            id = self.ids.next();
        }
        id
    }

    fn next_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        generation
    }

    fn cancel_timer(&mut self, id: NotificationId) {
        if let Some(armed) = self.timers.remove(&id) {
            armed.slot.cancel();
        }
    }

    fn retire(&mut self, retired: &[Notification]) {
        for notification in retired {
            self.cancel_timer(notification.id());
        }
    }

    fn is_current(&self, id: NotificationId, generation: u64) -> bool {
        self.timers
            .get(&id)
            .is_some_and(|armed| armed.generation == generation)
    }
}

struct EngineInner {
    config: EngineConfig,
    scheduler: Arc<dyn Scheduler>,
    state: Mutex<EngineState>,
    registry: Mutex<Registry>,
}

/// Handle to a notification engine
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Build an engine over `scheduler`, failing fast on invalid config
    pub fn new(config: EngineConfig, scheduler: Arc<dyn Scheduler>) -> NotificationResult<Self> {
        Self::with_id_generator(config, scheduler, IdGenerator::new())
    }

    /// Build an engine whose timers run on the current tokio runtime
    pub fn with_tokio(config: EngineConfig) -> NotificationResult<Self> {
        let scheduler = TokioScheduler::current()?;
        Self::new(config, Arc::new(scheduler))
    }

    pub fn with_id_generator(
        config: EngineConfig,
        scheduler: Arc<dyn Scheduler>,
        ids: IdGenerator,
    ) -> NotificationResult<Self> {
        config.validate()?;
        let store = Store::new(config.capacity)?;
        log::debug!(
            "Notification engine ready (capacity {}, default duration {:?})",
            config.capacity,
            config.default_duration
        );
        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                scheduler,
                state: Mutex::new(EngineState {
                    store,
                    ids,
                    timers: HashMap::new(),
                    next_generation: 0,
                }),
                registry: Mutex::new(Registry::new()),
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        lock_recovering(&self.inner.state)
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        lock_recovering(&self.inner.registry)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn capacity(&self) -> usize {
        self.inner.config.capacity
    }

    /// Add a notification and start its countdown; returns its id
    pub fn enqueue(&self, spec: NotificationSpec) -> NotificationId {
        let duration = spec
            .duration
            .unwrap_or_else(|| self.inner.config.duration_for(spec.kind));

        let id = {
            let mut state = self.state();
            let id = state.mint_id();
            let notification = Notification::new(id, spec, duration, self.inner.scheduler.now());
            let timer_source = notification.clone();

            let outcome = state.store.dispatch(Action::Add(notification));
            state.retire(&outcome.retired);

            let generation = state.next_generation();
            let weak = Arc::downgrade(&self.inner);
            if let Some(timer) = TimerController::start(
                &timer_source,
                self.inner.config.tick_interval,
                self.inner.scheduler.clone(),
                move || Self::on_countdown_expired(&weak, id, generation),
            ) {
                state.timers.insert(
                    id,
                    Armed {
                        generation,
                        slot: TimerSlot::Countdown(timer),
                    },
                );
            }
            log::debug!(
                "Enqueued notification {} ({} of {} slots used)",
                id,
                outcome.snapshot.len(),
                state.store.capacity()
            );
            id
        };

        self.publish();
        id
    }

    /// Merge `patch` into a tracked notification; no-op if it is gone
    pub fn update(&self, id: NotificationId, patch: NotificationPatch) {
        {
            let mut state = self.state();
            if !state.store.dispatch(Action::Update(id, patch)).changed {
                log::trace!("Update for notification {} had no effect", id);
            }
        }
        self.publish();
    }

    /// Stop the countdown, mark the notification dismissing, then remove it
    ///
    /// Removal follows immediately when the configured exit grace is zero,
    /// otherwise after the grace window. Repeated calls and unknown ids are
    /// no-ops.
    pub fn dismiss(&self, id: NotificationId) {
        {
            let mut state = self.state();
            let counting = matches!(
                state.timers.get(&id),
                Some(Armed {
                    slot: TimerSlot::Countdown(_),
                    ..
                })
            );
            // An exit already in progress keeps its original deadline
            if counting {
                state.cancel_timer(id);
            }
        }
        self.begin_exit(id);
    }

    /// Dismiss every tracked notification matching `predicate`
    pub fn dismiss_where<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Notification) -> bool,
    {
        let matching: Vec<NotificationId> = self
            .snapshot()
            .iter()
            .filter(|n| n.state().is_live() && predicate(n))
            .map(Notification::id)
            .collect();
        for id in &matching {
            self.dismiss(*id);
        }
        matching.len()
    }

    /// Cancel every timer and remove every notification
    pub fn clear(&self) {
        {
            let mut state = self.state();
            for (_, armed) in state.timers.drain() {
                armed.slot.cancel();
            }
            let outcome = state.store.dispatch(Action::RemoveAll);
            log::debug!("Cleared {} notifications", outcome.retired.len());
        }
        self.publish();
    }

    /// Register a snapshot callback
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.subscribe_with(Arc::new(callback))
    }

    /// Register a subscriber that may report failures
    pub fn subscribe_with(&self, subscriber: Arc<dyn Subscriber>) -> Subscription {
        self.registry().subscribe(subscriber)
    }

    /// Remove exactly this registration; `false` if already removed
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.registry().unsubscribe(subscription)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().len()
    }

    pub fn subscriber_statistics(
        &self,
        subscription: Subscription,
    ) -> Option<Arc<SubscriberStatistics>> {
        self.registry().statistics(subscription)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state().store.snapshot()
    }

    /// Remaining lifetime of a tracked notification
    pub fn countdown(&self, id: NotificationId) -> Option<Countdown> {
        let state = self.state();
        if let Some(Armed {
            slot: TimerSlot::Countdown(timer),
            ..
        }) = state.timers.get(&id)
        {
            return Some(timer.countdown());
        }
        state
            .store
            .get(id)
            .map(|n| n.countdown(self.inner.scheduler.now()))
    }

    /// Number of running countdowns
    pub fn active_timers(&self) -> usize {
        self.state()
            .timers
            .values()
            .filter(|armed| matches!(armed.slot, TimerSlot::Countdown(_)))
            .count()
    }

    fn on_countdown_expired(weak: &Weak<EngineInner>, id: NotificationId, generation: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let engine = Engine { inner };
        {
            let mut state = engine.state();
            if !state.is_current(id, generation) {
                log::trace!("Ignoring stale expiry for notification {}", id);
                return;
            }
            state.timers.remove(&id);
        }
        log::trace!("Notification {} expired", id);
        engine.begin_exit(id);
    }

    fn begin_exit(&self, id: NotificationId) {
        let grace = self.inner.config.exit_grace;
        let remove_now = {
            let mut state = self.state();
            let was_live = state.store.get(id).is_some_and(|n| n.state().is_live());
            state.store.dispatch(Action::Dismiss(id));

            if grace.is_zero() {
                true
            } else {
                // A notification already leaving keeps its original deadline
                if was_live {
                    self.arm_exit(&mut state, id, grace);
                }
                false
            }
        };
        self.publish();

        if remove_now {
            self.remove(id);
        }
    }

    fn arm_exit(&self, state: &mut EngineState, id: NotificationId, grace: Duration) {
        state.cancel_timer(id);
        let generation = state.next_generation();
        let weak = Arc::downgrade(&self.inner);
        let handle = self.inner.scheduler.schedule(
            grace,
            Box::new(move || Self::on_exit_elapsed(&weak, id, generation)),
        );
        state.timers.insert(
            id,
            Armed {
                generation,
                slot: TimerSlot::Exit(handle),
            },
        );
    }

    fn on_exit_elapsed(weak: &Weak<EngineInner>, id: NotificationId, generation: u64) {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let engine = Engine { inner };
        if !engine.state().is_current(id, generation) {
            return;
        }
        engine.remove(id);
    }

    fn remove(&self, id: NotificationId) {
        {
            let mut state = self.state();
            let outcome = state.store.dispatch(Action::Remove(id));
            state.retire(&outcome.retired);
        }
        self.publish();
    }

    /// Fan out to every subscriber in registration order
    fn publish(&self) {
        let targets = self.registry().targets();
        let failures = fan_out(&targets, || self.snapshot());
        if failures > 0 {
            log::debug!("{} of {} subscribers failed", failures, targets.len());
        }
    }
}
