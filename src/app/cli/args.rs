//! Command line arguments
//!
//! Values given on the command line win over the same keys in the
//! configuration file; `merge_file_defaults` only fills what is still unset.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;

use crate::core::logging::LogFormat;
use crate::notifications::api::ConfigError;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "toastline")]
#[command(about = "Drive an ephemeral notification engine from a command script")]
#[command(version)]
#[command(after_help = "Script commands: enqueue, update, dismiss, dismiss-kind, clear, sleep, quit")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Read commands from FILE instead of standard input
    #[arg(short = 's', long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Print snapshots as JSON lines
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Maximum notifications shown at once
    #[arg(short = 'n', long = "capacity", value_name = "COUNT")]
    pub capacity: Option<usize>,

    /// Lifetime for notifications that give none (0 = sticky)
    #[arg(short = 'd', long = "default-duration-ms", value_name = "MS")]
    pub default_duration_ms: Option<u64>,

    /// Time a dismissed notification lingers before removal
    #[arg(long = "exit-grace-ms", value_name = "MS")]
    pub exit_grace_ms: Option<u64>,

    /// Force colored output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,
}

/// Settings the logger is started with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    pub level: Option<String>,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
    pub color: bool,
}

impl LoggingOptions {
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

impl Args {
    /// Colored output unless disabled, or stdout is not a terminal, or NO_COLOR is set
    pub fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        if self.color {
            return true;
        }
        std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
            .as_deref()
            .and_then(|f| LogFormat::from_str(f).ok())
            .unwrap_or_default()
    }

    /// Logger settings; call after `merge_file_defaults` so file keys apply
    pub fn logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            level: self.log_level.clone(),
            format: self.log_format(),
            file: self.log_file.clone(),
            color: self.use_color(),
        }
    }

    /// Fill unset options from top-level keys of the configuration file
    pub fn merge_file_defaults(&mut self, config: &toml::Table) -> Result<(), ConfigError> {
        if self.log_level.is_none() {
            self.log_level = string_value(config, "log-level")?;
        }
        if self.log_format.is_none() {
            if let Some(format) = string_value(config, "log-format")? {
                LogFormat::from_str(&format).map_err(|_| ConfigError::Invalid {
                    key: "log-format".to_string(),
                    message: format!("unknown log format '{}'", format),
                })?;
                self.log_format = Some(format);
            }
        }
        if self.log_file.is_none() {
            self.log_file = string_value(config, "log-file")?
                .filter(|f| !f.eq_ignore_ascii_case("none") && f != "-")
                .map(PathBuf::from);
        }
        if !self.color && !self.no_color {
            match bool_value(config, "color")? {
                Some(true) => self.color = true,
                Some(false) => self.no_color = true,
                None => {}
            }
        }
        if !self.json {
            self.json = bool_value(config, "json")?.unwrap_or(false);
        }
        Ok(())
    }
}

fn string_value(config: &toml::Table, key: &str) -> Result<Option<String>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("'{}' must be a string", key),
        }),
    }
}

fn bool_value(config: &toml::Table, key: &str) -> Result<Option<bool>, ConfigError> {
    match config.get(key) {
        None => Ok(None),
        Some(toml::Value::Boolean(b)) => Ok(Some(*b)),
        Some(_) => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("'{}' must be true or false", key),
        }),
    }
}
