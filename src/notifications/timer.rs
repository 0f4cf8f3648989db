//! Per-notification timer controller
//!
//! One controller owns the countdown for exactly one notification. It ticks
//! on the scheduler, records the remaining time and progress fraction, and
//! fires its expiry callback exactly once when the countdown reaches zero.
//! Ticks never overshoot expiry: each delay is the shorter of the tick
//! interval and the time remaining, so expiry lands at `created_at + duration`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::core::sync::lock_recovering;
use crate::notifications::id::NotificationId;
use crate::notifications::notification::{Countdown, Notification};
use crate::notifications::scheduler::{Scheduler, TaskHandle};

type ExpiryCallback = Box<dyn FnOnce() + Send + 'static>;

struct TimerShared {
    id: NotificationId,
    created_at: Instant,
    duration: Duration,
    tick: Duration,
    scheduler: Arc<dyn Scheduler>,
    cancelled: AtomicBool,
    expired: AtomicBool,
    pending: Mutex<Option<TaskHandle>>,
    last: Mutex<Countdown>,
    on_expire: Mutex<Option<ExpiryCallback>>,
}

impl TimerShared {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Record the countdown at `now`, never letting progress go back up
    fn observe(&self, now: Instant) -> Countdown {
        let elapsed = now.saturating_duration_since(self.created_at);
        let remaining = self.duration.saturating_sub(elapsed);
        let progress = remaining.as_secs_f64() / self.duration.as_secs_f64();

        let mut last = lock_recovering(&self.last);
        if progress < last.progress || remaining.is_zero() {
            *last = Countdown {
                remaining,
                progress: if remaining.is_zero() { 0.0 } else { progress },
            };
        }
        *last
    }
}

/// Countdown driver for one auto-dismissing notification
pub struct TimerController {
    shared: Arc<TimerShared>,
}

impl TimerController {
    /// Start counting down `notification`; `None` for sticky notifications
    pub fn start<F>(
        notification: &Notification,
        tick: Duration,
        scheduler: Arc<dyn Scheduler>,
        on_expire: F,
    ) -> Option<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        if notification.is_sticky() {
            return None;
        }

        let shared = Arc::new(TimerShared {
            id: notification.id(),
            created_at: notification.created_at(),
            duration: notification.duration(),
            tick,
            scheduler,
            cancelled: AtomicBool::new(false),
            expired: AtomicBool::new(false),
            pending: Mutex::new(None),
            last: Mutex::new(Countdown {
                remaining: notification.duration(),
                progress: 1.0,
            }),
            on_expire: Mutex::new(Some(Box::new(on_expire))),
        });

        let first = shared.observe(shared.scheduler.now());
        log::trace!(
            "Timer started for notification {} ({:?} remaining)",
            shared.id,
            first.remaining
        );
        arm(&shared, tick.min(first.remaining));
        Some(Self { shared })
    }

    pub fn id(&self) -> NotificationId {
        self.shared.id
    }

    /// Latest recorded countdown; progress never increases between reads
    pub fn countdown(&self) -> Countdown {
        *lock_recovering(&self.shared.last)
    }

    pub fn is_expired(&self) -> bool {
        self.shared.expired.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Stop ticking immediately; the expiry callback will not run afterwards
    pub fn cancel(&self) {
        if self.shared.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(handle) = lock_recovering(&self.shared.pending).take() {
            handle.cancel();
        }
        lock_recovering(&self.shared.on_expire).take();
        log::trace!("Timer cancelled for notification {}", self.shared.id);
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn arm(shared: &Arc<TimerShared>, delay: Duration) {
    let next = shared.clone();
    let handle = shared
        .scheduler
        .schedule(delay, Box::new(move || tick(next)));

    let mut pending = lock_recovering(&shared.pending);
    if shared.is_cancelled() {
        handle.cancel();
    } else {
        *pending = Some(handle);
    }
}

fn tick(shared: Arc<TimerShared>) {
    if shared.is_cancelled() {
        return;
    }
    let countdown = shared.observe(shared.scheduler.now());
    if !countdown.is_expired() {
        arm(&shared, shared.tick.min(countdown.remaining));
        return;
    }

    shared.expired.store(true, Ordering::Release);
    lock_recovering(&shared.pending).take();
    log::trace!("Timer expired for notification {}", shared.id);
    let on_expire = lock_recovering(&shared.on_expire).take();
    if let Some(on_expire) = on_expire {
        on_expire();
    }
}
