//! Credential resolution for the registry.
//!
//! The cleanup run needs exactly one credential, resolved before any request
//! is made. Sources are consulted in order and the first one that yields a
//! non-empty secret wins:
//!
//! 1. An account file given on the command line (its full contents are the
//!    secret, typically a service-account JSON key).
//! 2. The docker client configuration (`config.json`): a credential helper
//!    configured for the registry, or an inline `auths` entry.
//!
//! The secret is sent as HTTP Basic authentication with the username
//! [`JSON_KEY_USERNAME`].

use crate::error::{CleanError, Result};
use std::path::{Path, PathBuf};

mod sources;
pub use sources::{AccountFile, DockerConfig};


/// Username paired with the resolved secret.
pub const JSON_KEY_USERNAME: &str = "_json_key";

/// Credentials for registry authentication.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication (only useful against test registries)
    Anonymous,

    /// HTTP Basic authentication with username and password
    Basic {
        /// Username for authentication
        username: String,
        /// Password for authentication
        password: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl Credentials {
    /// Creates anonymous credentials.
    pub fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Creates Basic authentication credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgcrclean::auth::Credentials;
    ///
    /// let creds = Credentials::basic("_json_key", "{}");
    /// assert!(creds.to_header_value().unwrap().starts_with("Basic "));
    /// ```
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Wraps a resolved secret the way the registry expects it.
    pub fn from_secret(secret: impl Into<String>) -> Self {
        Self::basic(JSON_KEY_USERNAME, secret)
    }

    /// Returns the Authorization header value for these credentials.
    pub fn to_header_value(&self) -> Option<String> {
        match self {
            Self::Anonymous => None,
            Self::Basic { username, password } => {
                use base64::{Engine as _, engine::general_purpose};
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials);
                Some(format!("Basic {}", encoded))
            }
        }
    }
}

/// A place a registry secret may be found.
pub trait CredentialSource {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Looks up the secret for `registry`.
    ///
    /// Returns `Ok(None)` when this source has nothing for the registry, and
    /// an error only when the source exists but cannot be used.
    fn lookup(&self, registry: &str) -> Result<Option<String>>;
}

/// Resolves the credential for `registry` from the given sources.
///
/// # Errors
///
/// Returns [`CleanError::Credential`] when a source fails or when no source
/// yields a non-empty secret.
pub fn resolve_with(registry: &str, sources: &[&dyn CredentialSource]) -> Result<Credentials> {
    for source in sources {
        match source.lookup(registry)? {
            Some(secret) if !secret.trim().is_empty() => {
                tracing::debug!(registry, source = source.name(), "Resolved registry credential");
                return Ok(Credentials::from_secret(secret));
            }
            _ => {
                tracing::debug!(registry, source = source.name(), "No credential in source");
            }
        }
    }

    Err(CleanError::credential(
        registry,
        "no account file and no docker credentials for this registry",
    ))
}

/// Resolves the credential for `registry` from the default source chain.
///
/// `account` is the optional path of an account file. The docker client
/// configuration is read from `$DOCKER_CONFIG/config.json` or
/// `~/.docker/config.json`.
pub fn resolve(registry: &str, account: Option<&Path>) -> Result<Credentials> {
    let account = AccountFile::new(account.map(Path::to_path_buf));
    let docker = DockerConfig::new(default_docker_config_path());
    resolve_with(registry, &[&account, &docker])
}

/// Runs [`resolve`] on the blocking thread pool.
///
/// Credential helpers are child processes, so async callers go through
/// here instead of blocking a runtime worker.
pub async fn resolve_async(registry: &str, account: Option<&Path>) -> Result<Credentials> {
    let host = registry.to_string();
    let account = account.map(Path::to_path_buf);

    tokio::task::spawn_blocking(move || resolve(&host, account.as_deref()))
        .await
        .map_err(|e| {
            CleanError::credential_with_source(
                registry.to_string(),
                "Credential lookup task failed".to_string(),
                e,
            )
        })?
}

/// Location of the docker client configuration file.
pub fn default_docker_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("DOCKER_CONFIG") {
        return Some(PathBuf::from(dir).join("config.json"));
    }
    dirs::home_dir().map(|home| home.join(".docker").join("config.json"))
}
