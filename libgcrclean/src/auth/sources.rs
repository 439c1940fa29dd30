//! Concrete credential sources.

use super::CredentialSource;
use crate::error::{CleanError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// An account file whose full contents are the registry secret.
///
/// A path that does not exist is treated as "no credential here" so the
/// chain can fall through to the docker configuration. A file that exists
/// but cannot be read is a credential error.
#[derive(Debug, Clone)]
pub struct AccountFile {
    path: Option<PathBuf>,
}

impl AccountFile {
    /// Creates a source for the given (optional) account file path.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl CredentialSource for AccountFile {
    fn name(&self) -> &'static str {
        "account-file"
    }

    fn lookup(&self, registry: &str) -> Result<Option<String>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Account file does not exist");
            return Ok(None);
        }

        fs::read_to_string(path).map(Some).map_err(|e| {
            CleanError::credential_with_source(
                registry.to_string(),
                format!("Unable to read account file {}", path.display()),
                e,
            )
        })
    }
}

/// Docker client configuration file (`config.json`).
#[derive(Debug, Clone)]
pub struct DockerConfig {
    path: Option<PathBuf>,
    helper_prefix: String,
}

#[derive(Debug, Default, Deserialize)]
struct DockerConfigFile {
    #[serde(default)]
    auths: HashMap<String, DockerAuthEntry>,
    #[serde(default, rename = "credHelpers")]
    cred_helpers: HashMap<String, String>,
    #[serde(default, rename = "credsStore")]
    creds_store: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DockerAuthEntry {
    #[serde(default)]
    auth: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HelperResponse {
    #[serde(rename = "Secret")]
    secret: String,
}

impl DockerConfig {
    /// Creates a source reading the docker configuration at `path`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            helper_prefix: "docker-credential-".to_string(),
        }
    }

    /// Overrides the executable prefix used to run credential helpers.
    pub fn with_helper_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.helper_prefix = prefix.into();
        self
    }

    fn load(&self, registry: &str) -> Result<Option<DockerConfigFile>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CleanError::credential_with_source(
                registry.to_string(),
                format!("Unable to read docker config {}", path.display()),
                e,
            )
        })?;

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            CleanError::credential_with_source(
                registry.to_string(),
                format!("Unable to parse docker config {}", path.display()),
                e,
            )
        })
    }

    /// Runs `<prefix><helper> get` and returns the secret it prints.
    fn run_helper(&self, helper: &str, registry: &str) -> Option<String> {
        let program = format!("{}{}", self.helper_prefix, helper);
        let child = Command::new(&program)
            .arg("get")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(helper = %program, error = %e, "Unable to run credential helper");
                return None;
            }
        };

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(registry.as_bytes())
        {
            tracing::debug!(helper = %program, error = %e, "Unable to write to credential helper");
        }

        let output = match child.wait_with_output() {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                tracing::debug!(
                    helper = %program,
                    status = %output.status,
                    "Credential helper has no entry"
                );
                return None;
            }
            Err(e) => {
                tracing::debug!(helper = %program, error = %e, "Credential helper failed");
                return None;
            }
        };

        match serde_json::from_slice::<HelperResponse>(&output.stdout) {
            Ok(response) => Some(response.secret),
            Err(e) => {
                tracing::debug!(
                    helper = %program,
                    error = %e,
                    "Credential helper output unreadable"
                );
                None
            }
        }
    }
}

/// Strips scheme and trailing slashes so `https://gcr.io/` matches `gcr.io`.
pub(crate) fn normalize_host(key: &str) -> &str {
    let key = key
        .strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(key);
    key.trim_end_matches('/')
}

/// Extracts the password from an `auths` entry.
fn entry_secret(entry: &DockerAuthEntry) -> Option<String> {
    if let Some(password) = entry.password.as_ref().filter(|p| !p.is_empty()) {
        return Some(password.clone());
    }

    use base64::{Engine as _, engine::general_purpose};
    let decoded = general_purpose::STANDARD
        .decode(entry.auth.as_ref()?.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    decoded
        .split_once(':')
        .map(|(_, password)| password.to_string())
}

impl CredentialSource for DockerConfig {
    fn name(&self) -> &'static str {
        "docker-config"
    }

    fn lookup(&self, registry: &str) -> Result<Option<String>> {
        let Some(config) = self.load(registry)? else {
            return Ok(None);
        };
        let host = normalize_host(registry);

        let helper = config
            .cred_helpers
            .iter()
            .find(|(key, _)| normalize_host(key) == host)
            .map(|(_, helper)| helper.as_str())
            .or(config.creds_store.as_deref());
        if let Some(helper) = helper
            && let Some(secret) = self.run_helper(helper, host)
        {
            return Ok(Some(secret));
        }

        Ok(config
            .auths
            .iter()
            .find(|(key, _)| normalize_host(key) == host)
            .and_then(|(_, entry)| entry_secret(entry)))
    }
}
