use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// gcr-clean - Untagged manifest cleanup for Google Container Registry
///
/// Deletes every manifest without tags from the repositories whose name
/// starts with one of the given project ids. Runs in dry-run mode unless
/// `--noop=false` is passed.
#[derive(Parser, Debug)]
#[command(name = "gcr-clean")]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Project ids to clean; a repository is in scope when its name starts with one of them
    #[arg(value_name = "PROJECT_ID", required_unless_present = "version")]
    pub projects: Vec<String>,

    /// Service account JSON key used as registry password
    #[arg(long, value_name = "PATH", env = "GCR_CLEAN_ACCOUNT")]
    pub account: Option<PathBuf>,

    /// Listen address (accepted for compatibility, unused)
    #[arg(long, value_name = "ADDR", env = "GCR_CLEAN_LISTEN")]
    pub listen: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, value_name = "LEVEL", env = "GCR_CLEAN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output: pretty, json
    #[arg(long, value_name = "FORMAT", value_parser = ["pretty", "json"])]
    pub log_format: Option<String>,

    /// Only log the manifests that would be deleted; `--noop=false` deletes them
    #[arg(
        short = 'n',
        long,
        value_name = "BOOL",
        env = "GCR_CLEAN_NOOP",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub noop: Option<bool>,

    /// Maximum number of deletions in flight
    #[arg(short, long, value_name = "N", env = "GCR_CLEAN_PARALLEL")]
    pub parallel: Option<usize>,

    /// Registry host, e.g. gcr.io or eu.gcr.io
    #[arg(long, value_name = "HOST", env = "GCR_CLEAN_REGISTRY")]
    pub registry: Option<String>,

    /// YAML configuration file
    #[arg(long, value_name = "PATH", env = "GCR_CLEAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Exit with status 2 when any registry call failed
    #[arg(long)]
    pub strict: bool,

    /// Print version information and exit
    #[arg(short = 'V', long)]
    pub version: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
