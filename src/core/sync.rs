//! Synchronization utilities for robust mutex handling
//!
//! Notification operations are defined to never fail, so a poisoned lock is
//! recovered rather than surfaced. Every mutation the engine performs under a
//! lock completes before any user code runs, which keeps the guarded state
//! consistent even when some other holder panicked.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the guard if a previous holder panicked
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use toastline::core::sync::lock_recovering;
///
/// let mutex = Mutex::new(42);
/// assert_eq!(*lock_recovering(&mutex), 42);
/// ```
pub fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned: PoisonError<MutexGuard<'_, T>>| {
        log::warn!("Recovering poisoned lock; a previous holder panicked");
        poisoned.into_inner()
    })
}
