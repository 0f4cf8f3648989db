//! Line-oriented command scripts
//!
//! Each non-empty line is one command; `#` starts a comment line.
//!
//! ```text
//! enqueue <kind> <duration-ms|default|sticky> <body...>
//! update <id> <body...>
//! dismiss <id>
//! dismiss-kind <kind>
//! clear
//! sleep <ms>
//! quit
//! ```
//!
//! Ids may be written with or without the leading `#`. A bad line is
//! reported and skipped; the rest of the script still runs.

use std::str::FromStr;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::core::error_handling::ContextualError;
use crate::notifications::api::{Engine, Kind, NotificationId, NotificationPatch, NotificationSpec};

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: '{command}' needs {argument}")]
    MissingArgument {
        line: usize,
        command: &'static str,
        argument: &'static str,
    },

    #[error("line {line}: '{value}' is not a notification kind")]
    InvalidKind { line: usize, value: String },

    #[error("line {line}: '{value}' is not a valid {expected}")]
    InvalidNumber {
        line: usize,
        value: String,
        expected: &'static str,
    },

    #[error("Error reading script: {0}")]
    Io(#[from] std::io::Error),
}

impl ContextualError for ScriptError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ScriptError::Io(_))
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ScriptError::UnknownCommand { .. } => Some("Unknown script command"),
            ScriptError::MissingArgument { .. } => Some("Script command is missing an argument"),
            ScriptError::InvalidKind { .. } => {
                Some("Kind must be one of success, error, warning, info, neutral")
            }
            ScriptError::InvalidNumber { .. } => Some("Script argument must be a whole number"),
            ScriptError::Io(_) => None,
        }
    }
}

/// One parsed script line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Enqueue {
        kind: Kind,
        /// `None` defers to the engine's configured duration
        duration: Option<Duration>,
        body: String,
    },
    Update {
        id: NotificationId,
        body: String,
    },
    Dismiss(NotificationId),
    DismissKind(Kind),
    Clear,
    Sleep(Duration),
    Quit,
}

/// Parse `text` (line number `line`); blank and comment lines yield `None`
pub fn parse_line(line: usize, text: &str) -> Result<Option<Command>, ScriptError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = split_word(text);
    let command = match command.to_ascii_lowercase().as_str() {
        "enqueue" => {
            let (kind, rest) = split_word(rest);
            let kind = parse_kind(line, required(line, "enqueue", "a kind", kind)?)?;
            let (duration, body) = split_word(rest);
            let duration = parse_duration(line, required(line, "enqueue", "a duration", duration)?)?;
            Command::Enqueue {
                kind,
                duration,
                body: required(line, "enqueue", "a message body", body)?.to_string(),
            }
        }
        "update" => {
            let (id, body) = split_word(rest);
            Command::Update {
                id: parse_id(line, required(line, "update", "an id", id)?)?,
                body: required(line, "update", "a message body", body)?.to_string(),
            }
        }
        "dismiss" => Command::Dismiss(parse_id(line, required(line, "dismiss", "an id", rest)?)?),
        "dismiss-kind" => {
            Command::DismissKind(parse_kind(line, required(line, "dismiss-kind", "a kind", rest)?)?)
        }
        "clear" => Command::Clear,
        "sleep" => {
            let ms = required(line, "sleep", "a duration in milliseconds", rest)?;
            Command::Sleep(Duration::from_millis(parse_number(line, ms, "millisecond count")?))
        }
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(ScriptError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
    };
    Ok(Some(command))
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (text, ""),
    }
}

fn required<'a>(
    line: usize,
    command: &'static str,
    argument: &'static str,
    value: &'a str,
) -> Result<&'a str, ScriptError> {
    if value.is_empty() {
        Err(ScriptError::MissingArgument {
            line,
            command,
            argument,
        })
    } else {
        Ok(value)
    }
}

fn parse_kind(line: usize, value: &str) -> Result<Kind, ScriptError> {
    Kind::from_str(value).map_err(|_| ScriptError::InvalidKind {
        line,
        value: value.to_string(),
    })
}

fn parse_number(line: usize, value: &str, expected: &'static str) -> Result<u64, ScriptError> {
    value.parse().map_err(|_| ScriptError::InvalidNumber {
        line,
        value: value.to_string(),
        expected,
    })
}

fn parse_id(line: usize, value: &str) -> Result<NotificationId, ScriptError> {
    let raw = value.strip_prefix('#').unwrap_or(value);
    parse_number(line, raw, "notification id").map(NotificationId::from_raw)
}

fn parse_duration(line: usize, value: &str) -> Result<Option<Duration>, ScriptError> {
    match value.to_ascii_lowercase().as_str() {
        "default" => Ok(None),
        "sticky" => Ok(Some(Duration::ZERO)),
        _ => parse_number(line, value, "duration in milliseconds")
            .map(|ms| Some(Duration::from_millis(ms))),
    }
}

/// What a script run did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScriptSummary {
    pub executed: usize,
    pub rejected: usize,
    pub enqueued: Vec<NotificationId>,
}

/// Apply one command to `engine`; `false` once the script asked to stop
pub async fn execute(engine: &Engine, command: Command, summary: &mut ScriptSummary) -> bool {
    match command {
        Command::Enqueue {
            kind,
            duration,
            body,
        } => {
            let mut spec = NotificationSpec::new(kind, body);
            if let Some(duration) = duration {
                spec = spec.with_duration(duration);
            }
            let id = engine.enqueue(spec);
            log::info!("Enqueued {} notification {}", kind, id);
            summary.enqueued.push(id);
        }
        Command::Update { id, body } => engine.update(id, NotificationPatch::default().body(body)),
        Command::Dismiss(id) => engine.dismiss(id),
        Command::DismissKind(kind) => {
            let count = engine.dismiss_where(|n| n.kind() == kind);
            log::info!("Dismissed {} {} notification(s)", count, kind);
        }
        Command::Clear => engine.clear(),
        Command::Sleep(duration) => tokio::time::sleep(duration).await,
        Command::Quit => return false,
    }
    summary.executed += 1;
    true
}

/// Run every command read from `reader` against `engine`
pub async fn run_script<R>(engine: &Engine, reader: R) -> Result<ScriptSummary, ScriptError>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = ScriptSummary::default();
    let mut lines = reader.lines();
    let mut line_number = 0;

    while let Some(text) = lines.next_line().await? {
        line_number += 1;
        let command = match parse_line(line_number, &text) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Skipping script {}", e);
                summary.rejected += 1;
                continue;
            }
        };
        log::debug!("Script line {}: {:?}", line_number, command);
        if !execute(engine, command, &mut summary).await {
            log::debug!("Script requested quit at line {}", line_number);
            break;
        }
    }
    Ok(summary)
}
