//! Error types for gcr-clean
//!
//! Two layers of errors live here. [`RegistryError`] classifies what went
//! wrong talking to the registry (transport, status, decoding). [`CleanError`]
//! names the failure from the point of view of the cleanup run: which phase
//! failed and for which repository or manifest.

use thiserror::Error;


/// Failure of a single registry call.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Network-related errors (connection, timeout, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Resource not found errors (404)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Rate limiting errors (429)
    #[error("Rate limit: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Server errors (5xx)
    #[error("Server error (status: {status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// Any other status above 299
    #[error("HTTP request failed with status HTTP {status_code}: {message}")]
    Status { message: String, status_code: u16 },

    /// Response body did not match the expected schema
    #[error("Unable to decode response: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for registry calls
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

impl RegistryError {
    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgcrclean::error::RegistryError;
    ///
    /// let err = RegistryError::network("connection refused");
    /// assert!(matches!(err, RegistryError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new not found error.
    pub fn not_found<S: Into<String>>(resource_type: S, name: S) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new server error.
    pub fn server<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates an error for an unexpected status code.
    pub fn status<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Status {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new decode error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgcrclean::error::RegistryError;
    ///
    /// let err = RegistryError::decode("missing field `repositories`");
    /// assert!(matches!(err, RegistryError::Decode { .. }));
    /// ```
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new decode error with a source error.
    pub fn decode_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Decode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Failure of a phase of the cleanup run.
///
/// Only [`CleanError::Credential`] and [`CleanError::Config`] stop the
/// process. The other kinds are logged with their context and the affected
/// unit of work is dropped.
#[derive(Error, Debug)]
pub enum CleanError {
    /// No usable credential for the registry
    #[error("No valid credentials found for registry {registry}: {message}")]
    Credential {
        registry: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The repository catalog could not be fetched or decoded
    #[error("Could not fetch catalog")]
    CatalogFetch {
        #[source]
        source: RegistryError,
    },

    /// The tag listing of one repository could not be fetched or decoded
    #[error("Unable to list tags of {repository}")]
    TagListFetch {
        repository: String,
        #[source]
        source: RegistryError,
    },

    /// Deleting one manifest failed
    #[error("Failed to delete manifest {repository}@{digest}")]
    Delete {
        repository: String,
        digest: String,
        #[source]
        source: RegistryError,
    },

    /// Configuration errors (invalid config file, invalid values)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for cleanup operations
pub type Result<T> = std::result::Result<T, CleanError>;

impl CleanError {
    /// Creates a new credential error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgcrclean::error::CleanError;
    ///
    /// let err = CleanError::credential("gcr.io", "no account file");
    /// assert!(matches!(err, CleanError::Credential { .. }));
    /// ```
    pub fn credential<S: Into<String>>(registry: S, message: S) -> Self {
        Self::Credential {
            registry: registry.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new credential error with a source error.
    pub fn credential_with_source<S, E>(registry: S, message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Credential {
            registry: registry.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps a registry failure of the catalog request.
    pub fn catalog_fetch(source: RegistryError) -> Self {
        Self::CatalogFetch { source }
    }

    /// Wraps a registry failure of a tag-list request.
    pub fn tag_list_fetch<S: Into<String>>(repository: S, source: RegistryError) -> Self {
        Self::TagListFetch {
            repository: repository.into(),
            source,
        }
    }

    /// Wraps a registry failure of a manifest delete.
    pub fn delete<S: Into<String>>(repository: S, digest: S, source: RegistryError) -> Self {
        Self::Delete {
            repository: repository.into(),
            digest: digest.into(),
            source,
        }
    }

    /// Creates a new configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libgcrclean::error::CleanError;
    ///
    /// let err = CleanError::config("parallel must be at least 1", None);
    /// assert!(matches!(err, CleanError::Config { .. }));
    /// ```
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }
}

/// Renders the source of an error for log lines, or an empty string.
pub(crate) fn source_of(error: &dyn std::error::Error) -> String {
    error.source().map(ToString::to_string).unwrap_or_default()
}
