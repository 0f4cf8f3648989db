//! Deferred execution for notification timers
//!
//! The engine's only source of deferred work is "run this after a delay,
//! unless cancelled first". [`Scheduler`] abstracts that primitive together
//! with the clock it runs on, so timers can be driven by tokio in production
//! and by a virtual clock ([`ManualScheduler`]) in tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::core::sync::lock_recovering;
use crate::notifications::error::NotificationError;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Source of time and delayed execution
pub trait Scheduler: Send + Sync {
    /// Current monotonic time on this scheduler's clock
    fn now(&self) -> Instant;

    /// Run `task` once after `delay` unless the returned handle is cancelled
    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle;
}

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort: Option<tokio::task::AbortHandle>,
}

impl TaskHandle {
    fn new(abort: Option<tokio::task::AbortHandle>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            abort,
        }
    }

    /// Stop the task from running; calling this more than once is harmless
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            if let Some(abort) = &self.abort {
                abort.abort();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Scheduler backed by the tokio runtime it was created on
///
/// Uses `tokio::time`, so a paused test runtime (`start_paused`) drives it
/// with virtual time.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    /// Bind to the runtime of the calling context
    pub fn current() -> Result<Self, NotificationError> {
        tokio::runtime::Handle::try_current()
            .map(|runtime| Self { runtime })
            .map_err(|_| NotificationError::NoRuntime)
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if !flag.load(Ordering::Acquire) {
                task();
            }
        });
        TaskHandle {
            cancelled,
            abort: Some(join.abort_handle()),
        }
    }
}

/// Roughly 30 years; longer delays and advances are clamped to this
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline(from: Instant, delay: Duration) -> Instant {
    from.checked_add(delay.min(FAR_FUTURE)).unwrap_or(from)
}

struct Pending {
    task: Task,
    handle: TaskHandle,
}

type Queue = BTreeMap<(Instant, u64), Pending>;

struct ManualState {
    now: Instant,
    sequence: u64,
    queue: Queue,
}

impl ManualState {
    /// Take cancelled entries out of the queue so their tasks can be dropped
    fn prune(&mut self) -> Queue {
        let (live, cancelled): (Queue, Queue) = std::mem::take(&mut self.queue)
            .into_iter()
            .partition(|(_, p)| !p.handle.is_cancelled());
        self.queue = live;
        cancelled
    }
}

/// Virtual clock for deterministic tests
///
/// Time only moves through [`ManualScheduler::advance`], which runs every task
/// that falls due within the window in due-time order (ties run in scheduling
/// order), including tasks scheduled by other tasks along the way.
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: Instant::now(),
                sequence: 0,
                queue: BTreeMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ManualState> {
        lock_recovering(&self.state)
    }

    /// Move the clock forward, running due tasks as their time arrives
    ///
    /// Advances longer than about 30 years are clamped.
    pub fn advance(&self, by: Duration) {
        let target = {
            let state = self.state();
            deadline(state.now, by)
        };
        loop {
            let pending = {
                let mut state = self.state();
                let Some(entry) = state.queue.first_entry() else {
                    break;
                };
                let due = entry.key().0;
                if due > target {
                    break;
                }
                let pending = entry.remove();
                state.now = state.now.max(due);
                pending
            };
            // Tasks may schedule more work, so the lock is released first
            if !pending.handle.is_cancelled() {
                (pending.task)();
            }
        }
        let mut state = self.state();
        state.now = state.now.max(target);
    }

    /// Number of scheduled tasks that have neither run nor been cancelled
    pub fn pending(&self) -> usize {
        let mut state = self.state();
        let cancelled = state.prune();
        let count = state.queue.len();
        drop(state);
        drop(cancelled);
        count
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.state().now
    }

    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new(None);
        let mut state = self.state();
        // Tasks release their captures outside the lock
        let cancelled = state.prune();
        let key = (deadline(state.now, delay), state.sequence);
        state.sequence += 1;
        state.queue.insert(
            key,
            Pending {
                task,
                handle: handle.clone(),
            },
        );
        drop(state);
        drop(cancelled);
        handle
    }
}
