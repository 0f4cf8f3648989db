//! Notification identifier generation

use std::fmt;

use serde::Serialize;

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NotificationId(u64);

impl NotificationId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id counter with wraparound to zero at a fixed ceiling
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
    ceiling: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Largest integer a double represents exactly, so ids survive JSON
    /// round-trips through renderers that parse numbers as `f64`.
    pub const DEFAULT_CEILING: u64 = (1 << 53) - 1;

    pub fn new() -> Self {
        Self::with_ceiling(Self::DEFAULT_CEILING)
    }

    /// Counter that yields `0..=ceiling` before wrapping back to zero
    pub fn with_ceiling(ceiling: u64) -> Self {
        Self { next: 0, ceiling }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> NotificationId {
        let id = NotificationId(self.next);
        self.next = if self.next >= self.ceiling {
            log::trace!("Notification id counter wrapped at {}", self.ceiling);
            0
        } else {
            self.next + 1
        };
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_increase_monotonically() {
        let mut ids = IdGenerator::new();
        let first = ids.next();
        let second = ids.next();
        let third = ids.next();

        assert!(first < second);
        assert!(second < third);
        assert_eq!(first.as_u64(), 0);
    }

    #[test]
    fn test_ids_unique_within_wrap_period() {
        let mut ids = IdGenerator::with_ceiling(999);
        let seen: HashSet<_> = (0..1000).map(|_| ids.next()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_wraparound_resets_to_zero() {
        let mut ids = IdGenerator::with_ceiling(2);
        let raw: Vec<u64> = (0..5).map(|_| ids.next().as_u64()).collect();
        assert_eq!(raw, vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(NotificationId::from_raw(42).to_string(), "#42");
    }
}
