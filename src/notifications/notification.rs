//! Notification data model
//!
//! A `Notification` is the unit held by the store and handed to renderers.
//! Content fields (`title`, `body`, `action`) are opaque to the engine and
//! only ever passed through; `kind` is forwarded to renderers for styling.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::notifications::id::NotificationId;

/// Visual category of a notification; affects nothing in the engine
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Kind {
    Success,
    Error,
    Warning,
    Info,
    #[default]
    Neutral,
}

/// Lifecycle state of a notification
///
/// Transitions only move forward: `Pending -> Visible -> Dismissing -> Removed`.
/// `Pending` and `Dismissing` are optional stops; `Removed` is terminal and
/// only ever observed on notifications reported as retired by a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationState {
    Pending,
    Visible,
    Dismissing,
    Removed,
}

impl NotificationState {
    pub fn can_advance_to(self, next: NotificationState) -> bool {
        next > self
    }

    /// Still counting toward display, i.e. neither leaving nor gone
    pub fn is_live(self) -> bool {
        matches!(self, NotificationState::Pending | NotificationState::Visible)
    }
}

/// Remaining lifetime of an auto-dismissing notification at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    pub remaining: Duration,
    /// `remaining / duration`, from 1.0 at creation down to exactly 0.0
    pub progress: f64,
}

impl Countdown {
    pub const STICKY: Countdown = Countdown {
        remaining: Duration::MAX,
        progress: 1.0,
    };

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// A notification tracked by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    id: NotificationId,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    body: String,
    kind: Kind,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
    #[serde(skip)]
    created_at: Instant,
    state: NotificationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<serde_json::Value>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis().min(u64::MAX as u128) as u64)
}

impl Notification {
    /// Build a notification from a caller spec once its id and lifetime are known
    pub fn new(
        id: NotificationId,
        spec: NotificationSpec,
        duration: Duration,
        created_at: Instant,
    ) -> Self {
        Self {
            id,
            title: spec.title,
            body: spec.body,
            kind: spec.kind,
            duration,
            created_at,
            state: NotificationState::Visible,
            action: spec.action,
        }
    }

    pub fn id(&self) -> NotificationId {
        self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn state(&self) -> NotificationState {
        self.state
    }

    pub fn action(&self) -> Option<&serde_json::Value> {
        self.action.as_ref()
    }

    /// Sticky notifications never auto-dismiss
    pub fn is_sticky(&self) -> bool {
        self.duration.is_zero()
    }

    /// Remaining lifetime as seen at `now`
    pub fn countdown(&self, now: Instant) -> Countdown {
        if self.is_sticky() {
            return Countdown::STICKY;
        }
        let elapsed = now.saturating_duration_since(self.created_at);
        let remaining = self.duration.saturating_sub(elapsed);
        Countdown {
            remaining,
            progress: remaining.as_secs_f64() / self.duration.as_secs_f64(),
        }
    }

    /// Move to `next` if that is a forward transition; returns whether it moved
    pub(crate) fn advance(&mut self, next: NotificationState) -> bool {
        if self.state.can_advance_to(next) {
            self.state = next;
            true
        } else {
            false
        }
    }

    pub(crate) fn apply(&mut self, patch: &NotificationPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(body) = &patch.body {
            self.body = body.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(action) = &patch.action {
            self.action = action.clone();
        }
    }
}

/// Caller-supplied description of a notification to enqueue
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationSpec {
    pub title: Option<String>,
    pub body: String,
    pub kind: Kind,
    /// `None` takes the configured default; `Some(Duration::ZERO)` is sticky
    #[serde(rename = "duration_ms", deserialize_with = "deserialize_opt_millis")]
    pub duration: Option<Duration>,
    pub action: Option<serde_json::Value>,
}

fn deserialize_opt_millis<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
}

impl NotificationSpec {
    pub fn new(kind: Kind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn success(body: impl Into<String>) -> Self {
        Self::new(Kind::Success, body)
    }

    pub fn error(body: impl Into<String>) -> Self {
        Self::new(Kind::Error, body)
    }

    pub fn warning(body: impl Into<String>) -> Self {
        Self::new(Kind::Warning, body)
    }

    pub fn info(body: impl Into<String>) -> Self {
        Self::new(Kind::Info, body)
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn sticky(self) -> Self {
        self.with_duration(Duration::ZERO)
    }

    #[must_use]
    pub fn with_action(mut self, action: serde_json::Value) -> Self {
        self.action = Some(action);
        self
    }
}

/// Partial update merged into an existing notification
///
/// Only content fields can change. Unknown fields in a deserialized patch are
/// ignored. For `title` and `action`, `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationPatch {
    #[serde(deserialize_with = "deserialize_some")]
    pub title: Option<Option<String>>,
    pub body: Option<String>,
    pub kind: Option<Kind>,
    #[serde(deserialize_with = "deserialize_some")]
    pub action: Option<Option<serde_json::Value>>,
}

// Distinguishes an explicit `null` (clear) from an absent key (keep)
fn deserialize_some<'de, T, D>(d: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(d).map(Some)
}

impl NotificationPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Some(title.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Option<serde_json::Value>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.kind.is_none() && self.action.is_none()
    }
}
