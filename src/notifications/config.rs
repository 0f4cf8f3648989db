//! Engine configuration
//!
//! Parsed from the `[engine]` table of a TOML file. Durations are written in
//! milliseconds:
//!
//! ```toml
//! [engine]
//! capacity = 3
//! default-duration-ms = 4000
//! tick-interval-ms = 16
//! exit-grace-ms = 0
//!
//! [engine.kind-duration-ms]
//! error = 0      # errors stay until dismissed
//! warning = 6000
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::notifications::error::{ConfigError, NotificationError};
use crate::notifications::notification::Kind;

pub const DEFAULT_CAPACITY: usize = 3;
pub const DEFAULT_DURATION: Duration = Duration::from_millis(4000);
/// Roughly one display refresh, for smooth progress indicators
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Maximum notifications held at once; the oldest is evicted beyond this
    pub capacity: usize,
    /// Lifetime applied when a caller gives none; zero means sticky
    pub default_duration: Duration,
    /// Per-kind overrides of `default_duration`
    pub kind_durations: BTreeMap<Kind, Duration>,
    pub tick_interval: Duration,
    /// Time a dismissed notification stays in `Dismissing` before removal
    pub exit_grace: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_duration: DEFAULT_DURATION,
            kind_durations: BTreeMap::new(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            exit_grace: Duration::ZERO,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[must_use]
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    #[must_use]
    pub fn with_kind_duration(mut self, kind: Kind, duration: Duration) -> Self {
        self.kind_durations.insert(kind, duration);
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, tick: Duration) -> Self {
        self.tick_interval = tick;
        self
    }

    #[must_use]
    pub fn with_exit_grace(mut self, grace: Duration) -> Self {
        self.exit_grace = grace;
        self
    }

    /// Lifetime for a notification of `kind` that did not specify one
    pub fn duration_for(&self, kind: Kind) -> Duration {
        self.kind_durations
            .get(&kind)
            .copied()
            .unwrap_or(self.default_duration)
    }

    /// Reject misconfiguration up front
    pub fn validate(&self) -> Result<(), NotificationError> {
        if self.capacity == 0 {
            return Err(NotificationError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if self.tick_interval.is_zero() {
            return Err(NotificationError::InvalidTickInterval);
        }
        Ok(())
    }

    /// Overlay values from an already parsed `[engine]` table
    pub fn apply_toml(&mut self, engine: &toml::Table) -> Result<(), ConfigError> {
        let section: EngineSection = toml::Value::Table(engine.clone())
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Invalid {
                key: "engine".to_string(),
                message: e.to_string(),
            })?;
        section.overlay(self);
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct EngineSection {
    capacity: Option<usize>,
    default_duration_ms: Option<u64>,
    tick_interval_ms: Option<u64>,
    exit_grace_ms: Option<u64>,
    #[serde(default)]
    kind_duration_ms: BTreeMap<Kind, u64>,
}

impl EngineSection {
    fn overlay(self, config: &mut EngineConfig) {
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(ms) = self.default_duration_ms {
            config.default_duration = Duration::from_millis(ms);
        }
        if let Some(ms) = self.tick_interval_ms {
            config.tick_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.exit_grace_ms {
            config.exit_grace = Duration::from_millis(ms);
        }
        for (kind, ms) in self.kind_duration_ms {
            config.kind_durations.insert(kind, Duration::from_millis(ms));
        }
    }
}
