//! Logging configuration for DocQA

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::AppConfig;
use crate::Result;

const LOG_FILE_PREFIX: &str = "docqa.log";

/// Build the filter directive for a level, scoped so our crate follows it too
#[must_use]
pub fn filter_directive(level: &str) -> String {
    format!("{level},docqa={level}")
}

/// Initialize logging with configuration
///
/// `level_override` wins over the config file (used by `--verbose`); with
/// neither, `RUST_LOG` is honoured before falling back to `info`.
pub fn init_logging_with_config(
    config: Option<&AppConfig>,
    level_override: Option<&str>,
) -> Result<()> {
    let directory = config.map_or("logs", |c| c.logging.directory.as_str());

    let env_filter = match (level_override, config) {
        (Some(level), _) => EnvFilter::new(filter_directive(level)),
        (None, Some(config)) => EnvFilter::new(filter_directive(&config.logging.level)),
        (None, None) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(filter_directive("info"))),
    };

    if config.is_some_and(|c| c.logging.backtrace) {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    let guard = init_registry(env_filter, Path::new(directory))?;

    tracing::info!("Logging initialized - console and file output enabled");
    tracing::info!(
        "Log files will be saved to: {}/{}.YYYY-MM-DD",
        directory,
        LOG_FILE_PREFIX
    );

    // The writer must outlive every span, so the guard lives for the process
    std::mem::forget(guard);

    Ok(())
}

fn init_registry(env_filter: EnvFilter, logs_dir: &Path) -> Result<WorkerGuard> {
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::DocQaError::Custom(format!("Logging already initialized: {e}")))?;

    Ok(guard)
}

/// Initialize simple console logging for tests and tools
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init()
        .map_err(|e| crate::DocQaError::Custom(format!("Logging already initialized: {e}")))?;

    tracing::info!("Simple logging initialized");
    Ok(())
}
