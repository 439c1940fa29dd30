//! Log output setup.
//!
//! Events go to stderr through a `tracing-subscriber` fmt layer. The level
//! comes from the resolved configuration; `RUST_LOG` directives, when set,
//! are layered on top of it.

use libgcrclean::config::LogFormat;
use libgcrclean::{CleanError, Result};
use std::env;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Builds the event filter for `level`, extended by `rust_log` directives.
pub fn filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter> {
    let level = Level::from_str(level.trim()).map_err(|_| {
        CleanError::config(
            format!(
                "Invalid log level '{}', expected one of: trace, debug, info, warn, error",
                level
            ),
            None,
        )
    })?;
    let default = LevelFilter::from_level(level);

    match rust_log.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::builder()
            .with_default_directive(default.into())
            .parse(directives)
            .map_err(|e| CleanError::config_with_source("Invalid RUST_LOG directives", None, e)),
        None => Ok(EnvFilter::default().add_directive(default.into())),
    }
}

/// Installs the global subscriber.
pub fn init(level: &str, format: LogFormat) -> Result<()> {
    let rust_log = env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter(level, rust_log.as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };

    installed.map_err(|e| CleanError::config(format!("Unable to install logger: {}", e), None))
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
