//! TOML configuration file loading
//!
//! The file is optional. An explicitly named file must exist; otherwise the
//! default location is used only when present. Loading happens before the
//! logger starts, so outcomes are logged by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::args::Args;
use crate::notifications::api::{ConfigError, EngineConfig};

/// Per-user default: `<config dir>/toastline/toastline.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("toastline").join("toastline.toml"))
}

/// Load and parse the configuration file, if there is one
pub async fn load_config_file(explicit: Option<&Path>) -> Result<Option<toml::Table>, ConfigError> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            })
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
    let table = toml::from_str::<toml::Table>(&contents).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    Ok(Some(table))
}

/// Engine settings: defaults, then the `[engine]` table, then command line
pub fn engine_config(args: &Args, file: Option<&toml::Table>) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::default();

    if let Some(engine) = file.and_then(|f| f.get("engine")) {
        let table = engine.as_table().ok_or_else(|| ConfigError::Invalid {
            key: "engine".to_string(),
            message: "'engine' must be a table".to_string(),
        })?;
        config.apply_toml(table)?;
    }

    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if let Some(ms) = args.default_duration_ms {
        config.default_duration = Duration::from_millis(ms);
    }
    if let Some(ms) = args.exit_grace_ms {
        config.exit_grace = Duration::from_millis(ms);
    }
    Ok(config)
}
