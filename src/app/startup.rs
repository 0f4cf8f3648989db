//! Application startup: arguments, configuration, logging, then the script

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::{AsyncBufRead, BufReader};

use super::cli::args::Args;
use super::cli::config::{default_config_path, engine_config, load_config_file};
use super::render::{RenderMode, SnapshotPrinter};
use super::script::{run_script, ScriptError, ScriptSummary};
use crate::core::error_handling::{log_error_with_context, ContextualError};
use crate::core::logging::init_logging;
use crate::notifications::api::{ConfigError, Engine, NotificationError};

/// Anything that stops the binary before or while running a script
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] NotificationError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("Error opening script {}: {source}", path.display())]
    OpenScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContextualError for StartupError {
    fn is_user_actionable(&self) -> bool {
        match self {
            StartupError::Config(e) => e.is_user_actionable(),
            StartupError::Engine(e) => e.is_user_actionable(),
            StartupError::Script(e) => e.is_user_actionable(),
            StartupError::OpenScript { .. } => true,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StartupError::Config(e) => e.user_message(),
            StartupError::Engine(e) => e.user_message(),
            StartupError::Script(e) => e.user_message(),
            StartupError::OpenScript { .. } => Some("The script file could not be opened"),
        }
    }
}

/// Parse the command line and run the session
pub async fn startup() -> ExitCode {
    // The logger needs the file's logging keys, so it starts after the merge
    let (args, file) = load_settings(Args::parse()).await;

    let logging = args.logging_options();
    if let Err(e) = init_logging(logging.level(), logging.format, logging.file(), logging.color) {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    let file = match file {
        Ok(file) => file,
        Err(e) => {
            log_error_with_context(&StartupError::from(e), "Loading configuration");
            return ExitCode::FAILURE;
        }
    };
    match args.config_file.clone().or_else(default_config_path) {
        Some(path) if file.is_some() => {
            log::info!("Loaded configuration from {}", path.display())
        }
        _ => log::debug!("No configuration file found, using defaults"),
    }

    match run(args, file).await {
        Ok(summary) => {
            log::info!(
                "Session finished: {} commands run, {} rejected, {} notifications enqueued",
                summary.executed,
                summary.rejected,
                summary.enqueued.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error_with_context(&e, "Running notification session");
            ExitCode::FAILURE
        }
    }
}

/// Read the configuration file and fill unset options from it
async fn load_settings(mut args: Args) -> (Args, Result<Option<toml::Table>, ConfigError>) {
    let file = match load_config_file(args.config_file.as_deref()).await {
        Ok(Some(table)) => args.merge_file_defaults(&table).map(|()| Some(table)),
        other => other,
    };
    (args, file)
}

async fn run(args: Args, file: Option<toml::Table>) -> Result<ScriptSummary, StartupError> {
    let config = engine_config(&args, file.as_ref())?;
    let engine = Engine::with_tokio(config)?;

    let mode = if args.json {
        RenderMode::Json
    } else {
        RenderMode::Text {
            color: args.use_color(),
        }
    };
    let renderer = engine.subscribe_with(std::sync::Arc::new(SnapshotPrinter::stdout(mode)));

    let reader = open_script(args.script.as_deref()).await?;
    let summary = tokio::select! {
        result = run_script(&engine, reader) => result?,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Interrupted, stopping session");
            ScriptSummary::default()
        }
    };

    engine.unsubscribe(renderer);
    engine.clear();
    Ok(summary)
}

async fn open_script(
    path: Option<&std::path::Path>,
) -> Result<Box<dyn AsyncBufRead + Unpin + Send>, StartupError> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| StartupError::OpenScript {
                    path: path.to_path_buf(),
                    source,
                })?;
            log::debug!("Reading commands from {}", path.display());
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            log::debug!("Reading commands from standard input");
            Ok(Box::new(BufReader::new(tokio::io::stdin())))
        }
    }
}
