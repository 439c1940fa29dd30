//! Application context that holds resolved configuration
//!
//! The context is built following the precedence order:
//! 1. Default values
//! 2. Config file values
//! 3. Environment variables
//! 4. CLI flags
//!
//! clap already merges the `GCR_CLEAN_*` variables with their flags, so
//! steps 3 and 4 arrive together as the `Option` fields of [`Cli`].
//! Once built, the context is passed as read-only throughout the application.

use crate::cli::Cli;
use libgcrclean::config::{Config, LogFormat};
use libgcrclean::{CleanOptions, ProjectScope, Result};
use std::env;
use std::path::PathBuf;

/// Standard variable of Google tooling pointing at a service account key.
const GOOGLE_CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Application context with resolved configuration and run arguments
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Resolved configuration
    pub config: Config,
    /// Repository name prefixes to clean
    pub projects: Vec<String>,
    /// Exit non-zero when the run reports failures
    pub strict: bool,
}

impl AppContext {
    /// Build context with precedence: defaults > config file > env vars > CLI flags
    pub fn build(cli: &Cli) -> Result<Self> {
        let google_account = env::var_os(GOOGLE_CREDENTIALS_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::build_with(cli, google_account)
    }

    /// Same as [`AppContext::build`] with the Google credentials variable
    /// passed in.
    ///
    /// `google_account` only applies when neither the flags nor the config
    /// file name an account.
    pub fn build_with(cli: &Cli, google_account: Option<PathBuf>) -> Result<Self> {
        // 1 + 2. Defaults, merged with the config file when one is given
        let mut config = Config::load(cli.config.as_deref())?;

        // 3 + 4. Environment variables and CLI flags
        if let Some(account) = &cli.account {
            config.account = Some(account.clone());
        }
        if config.account.is_none() {
            config.account = google_account;
        }
        if let Some(registry) = &cli.registry {
            config.registry = registry.clone();
        }
        if let Some(parallel) = cli.parallel {
            config.parallel = parallel;
        }
        if let Some(noop) = cli.noop {
            config.noop = noop;
        }
        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }
        if let Some(level) = &cli.log_level {
            config.log.level = level.clone();
        }
        if let Some(format) = &cli.log_format {
            config.log.format = LogFormat::from(format.as_str());
        }

        config.validate()?;

        Ok(Self {
            config,
            projects: cli.projects.clone(),
            strict: cli.strict,
        })
    }

    /// Options of the cleanup run.
    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions::new()
            .with_parallel(self.config.parallel)
            .with_noop(self.config.noop)
    }

    /// Repositories the run may touch.
    pub fn scope(&self) -> ProjectScope {
        ProjectScope::new(self.projects.iter().map(String::as_str))
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
