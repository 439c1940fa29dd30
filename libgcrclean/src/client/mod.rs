//! HTTP client for registry communication.
//!
//! This module provides the three registry calls the cleanup needs (catalog,
//! tag listing and manifest deletion) behind the [`RegistryApi`] trait, and a
//! thin reqwest-based implementation of it.

use crate::auth::Credentials;
use crate::error::{RegistryError, RegistryResult};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};


/// Manifest digest to the tags pointing at it (possibly none).
pub type TagListing = HashMap<String, Vec<String>>;

/// Response from the catalog API endpoint.
#[derive(Debug, Deserialize)]
pub struct CatalogResponse {
    /// List of repository names
    pub repositories: Vec<String>,
}

/// Response from the tags list API endpoint.
///
/// Only the per-manifest section is read; the plain `tags` array of the
/// distribution API does not say which manifests are untagged.
#[derive(Debug, Deserialize)]
pub struct TagListResponse {
    #[serde(default)]
    pub manifest: HashMap<String, ManifestEntry>,
}

/// One manifest of a [`TagListResponse`].
#[derive(Debug, Deserialize)]
pub struct ManifestEntry {
    #[serde(default)]
    pub tag: Vec<String>,
}

impl From<TagListResponse> for TagListing {
    fn from(response: TagListResponse) -> Self {
        response
            .manifest
            .into_iter()
            .map(|(digest, entry)| (digest, entry.tag))
            .collect()
    }
}

/// The registry calls the cleanup pipeline depends on.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Lists every repository in the registry.
    async fn list_catalog(&self) -> RegistryResult<Vec<String>>;

    /// Lists the manifests of `repository` with their tags.
    async fn list_tags(&self, repository: &str) -> RegistryResult<TagListing>;

    /// Deletes the manifest `digest` from `repository`.
    async fn delete_manifest(&self, repository: &str, digest: &str) -> RegistryResult<()>;
}

impl std::fmt::Debug for dyn RegistryApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn RegistryApi")
    }
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libgcrclean::client::ClientConfig;
///
/// let config = ClientConfig::new().with_timeout(60);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// Maximum idle connections per host (default: 10)
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_idle_per_host: 10,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the maximum idle connections per host.
    ///
    /// The pipeline sizes this to the deletion ceiling so parallel deletes
    /// can reuse connections.
    pub fn with_max_idle_per_host(mut self, max: usize) -> Self {
        self.max_idle_per_host = max;
        self
    }
}

/// HTTP client for one registry.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Base registry URL (e.g., "https://gcr.io")
    registry_url: String,
    /// Credentials sent with every request
    credentials: Credentials,
    /// Request timeout, for error messages
    timeout_seconds: u64,
}

impl Client {
    /// Creates a new client for `registry` with default configuration.
    ///
    /// `registry` is a host (`gcr.io`, `eu.gcr.io`) or a full base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgcrclean::auth::Credentials;
    /// use libgcrclean::client::Client;
    ///
    /// let client = Client::new("gcr.io", Credentials::from_secret("{}")).unwrap();
    /// assert_eq!(client.registry_url(), "https://gcr.io");
    /// ```
    pub fn new(registry: &str, credentials: Credentials) -> RegistryResult<Self> {
        Self::with_config(registry, credentials, ClientConfig::default())
    }

    /// Creates a new client with custom configuration.
    pub fn with_config(
        registry: &str,
        credentials: Credentials,
        config: ClientConfig,
    ) -> RegistryResult<Self> {
        let registry_url = Self::normalize_url(registry)?;

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(config.max_idle_per_host)
            .build()
            .map_err(|e| RegistryError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url,
            credentials,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Normalizes a registry URL: defaults the scheme to https and removes
    /// trailing slashes.
    fn normalize_url(url: &str) -> RegistryResult<String> {
        let url = url.trim();

        if url.is_empty() {
            return Err(RegistryError::network("Registry URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Builds an authenticated request for a path below `/v2/`.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v2/{}", self.registry_url, path);
        let mut request = self.http_client.request(method, url);

        if let Some(auth_header) = self.credentials.to_header_value() {
            request = request.header(reqwest::header::AUTHORIZATION, auth_header);
        }

        request
    }

    /// Sends a request and checks its status.
    async fn send(&self, method: Method, path: &str) -> RegistryResult<Response> {
        let response = self
            .request(method.clone(), path)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(%method, path, error = %e, "HTTP request failed");
                self.translate_reqwest_error(e)
            })?;

        let status = response.status();
        match Self::check_response_status(response).await {
            Ok(response) => {
                tracing::debug!(%method, path, status = status.as_u16(), "Request success");
                Ok(response)
            }
            Err(e) => {
                tracing::debug!(
                    %method,
                    path,
                    status = status.as_u16(),
                    "Status code indicated error"
                );
                Err(e)
            }
        }
    }

    /// Translates a reqwest error into a RegistryError.
    fn translate_reqwest_error(&self, error: reqwest::Error) -> RegistryError {
        if error.is_timeout() {
            RegistryError::network(format!(
                "Request to {} timed out after {} seconds",
                self.registry_url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            RegistryError::network_with_source(
                format!("Failed to connect to registry at {}", self.registry_url),
                error,
            )
        } else {
            RegistryError::network_with_source(
                format!("Network error communicating with {}", self.registry_url),
                error,
            )
        }
    }

    /// Parses a Retry-After header given in seconds or as an HTTP date.
    fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
        let value = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;

        if let Ok(seconds) = value.trim().parse::<u64>() {
            return Some(seconds);
        }

        let at = httpdate::parse_http_date(value).ok()?;
        at.duration_since(SystemTime::now())
            .ok()
            .map(|d| d.as_secs().max(1))
    }

    /// Checks the HTTP response status and translates errors to RegistryError.
    async fn check_response_status(response: Response) -> RegistryResult<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let retry_after = Self::parse_retry_after(response.headers());
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(RegistryError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(RegistryError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(RegistryError::not_found("endpoint", url.as_str())),
            StatusCode::TOO_MANY_REQUESTS => Err(RegistryError::rate_limit(
                format!("Rate limit exceeded for {}", url),
                retry_after,
            )),
            s if s.is_server_error() => Err(RegistryError::server(
                format!("Server error from {}: {}", url, error_body),
                s.as_u16(),
            )),
            s => Err(RegistryError::status(
                format!("{}: {}", url, error_body),
                s.as_u16(),
            )),
        }
    }
}

#[async_trait]
impl RegistryApi for Client {
    async fn list_catalog(&self) -> RegistryResult<Vec<String>> {
        let response = self.send(Method::GET, "_catalog").await?;

        let catalog: CatalogResponse = response.json().await.map_err(|e| {
            RegistryError::decode_with_source("Unable to decode catalog response", e)
        })?;

        Ok(catalog.repositories)
    }

    async fn list_tags(&self, repository: &str) -> RegistryResult<TagListing> {
        let path = format!("{}/tags/list", repository);
        let response = self.send(Method::GET, &path).await?;

        let tags: TagListResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::decode_with_source("Unable to decode tags response", e))?;

        Ok(tags.into())
    }

    async fn delete_manifest(&self, repository: &str, digest: &str) -> RegistryResult<()> {
        let path = format!("{}/manifests/{}", repository, digest);
        self.send(Method::DELETE, &path).await?;
        Ok(())
    }
}
