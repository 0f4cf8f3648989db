//! Terminal rendering surface
//!
//! Prints every snapshot the engine publishes, either as a small colored
//! block for people or as one JSON array per line for other programs.

use std::io::Write;
use std::sync::Mutex;

use colored::{ColoredString, Colorize};

use crate::core::sync::lock_recovering;
use crate::notifications::api::{Kind, Notification, Snapshot, Subscriber, SubscriberError};

/// Output style for snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Text { color: bool },
    Json,
}

/// Subscriber writing each snapshot to `W`
pub struct SnapshotPrinter<W> {
    mode: RenderMode,
    out: Mutex<W>,
}

impl SnapshotPrinter<std::io::Stdout> {
    pub fn stdout(mode: RenderMode) -> Self {
        Self::new(mode, std::io::stdout())
    }
}

impl<W: Write + Send> SnapshotPrinter<W> {
    pub fn new(mode: RenderMode, out: W) -> Self {
        Self {
            mode,
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Subscriber for SnapshotPrinter<W> {
    fn on_snapshot(&self, snapshot: &Snapshot) -> Result<(), SubscriberError> {
        let rendered = match self.mode {
            RenderMode::Json => serde_json::to_string(snapshot)?,
            RenderMode::Text { color } => render_text(snapshot, color),
        };
        let mut out = lock_recovering(&self.out);
        writeln!(out, "{}", rendered)?;
        out.flush()?;
        Ok(())
    }
}

/// Human readable block for one snapshot
pub fn render_text(snapshot: &Snapshot, color: bool) -> String {
    let header = format!("── {} active ──", snapshot.len());
    let mut lines = vec![if color {
        header.dimmed().to_string()
    } else {
        header
    }];
    lines.extend(snapshot.iter().map(|n| render_line(n, color)));
    lines.join("\n")
}

fn render_line(notification: &Notification, color: bool) -> String {
    let kind = format!("{:<7}", notification.kind().to_string());
    let kind = if color {
        paint(notification.kind(), &kind).to_string()
    } else {
        kind
    };
    let text = match notification.title() {
        Some(title) => format!("{}: {}", title, notification.body()),
        None => notification.body().to_string(),
    };
    let lifetime = if notification.is_sticky() {
        "sticky".to_string()
    } else {
        format!("{}ms", notification.duration().as_millis())
    };
    format!(
        "{:>5} {} {} ({}, {})",
        notification.id().to_string(),
        kind,
        text,
        notification.state(),
        lifetime
    )
}

fn paint(kind: Kind, text: &str) -> ColoredString {
    match kind {
        Kind::Success => text.green(),
        Kind::Error => text.red().bold(),
        Kind::Warning => text.yellow(),
        Kind::Info => text.blue(),
        Kind::Neutral => text.normal(),
    }
}
