//! gcr-clean - Untagged Manifest Cleanup Library
//!
//! Removes manifests that no tag points at from a Google Container Registry,
//! restricted to the repositories of a set of projects.
//!
//! # Quick Start
//!
//! ```no_run
//! use libgcrclean::{Cleaner, CleanOptions, Client, Credentials, ProjectScope};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = libgcrclean::auth::resolve("gcr.io", None)?;
//!     let client = Client::new("gcr.io", credentials)?;
//!
//!     let report = Cleaner::new(
//!         Arc::new(client),
//!         ProjectScope::new(["my-project"]),
//!         CleanOptions::new().with_noop(false).with_parallel(5),
//!     )
//!     .run()
//!     .await;
//!
//!     println!("deleted {} manifests", report.deleted);
//!     Ok(())
//! }
//! ```
//!
//! # How a run works
//!
//! - The [`enumerator`] fetches the catalog once and launches one scan per
//!   repository matching the [`scope`].
//! - Each [`scanner`] lists the repository's manifests and pushes the
//!   untagged ones into the deletion [`queue`].
//! - The [`dispatcher`] drains the queue with at most `parallel` deletes in
//!   flight, or only logs them in dry-run mode.
//! - The [`coordinator`] counts outstanding work so the [`pipeline`] returns
//!   only when every discovered manifest has been handled.

#![warn(clippy::all)]

/// Returns the libgcrclean crate version.
///
/// # Examples
///
/// ```
/// let version = libgcrclean::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// Re-export commonly used types for convenience
pub use auth::Credentials;
pub use client::{Client, ClientConfig, RegistryApi};
pub use config::Config;
pub use error::{CleanError, RegistryError, Result};
pub use pipeline::{CleanOptions, Cleaner, RunReport};
pub use scope::ProjectScope;

pub mod auth;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod enumerator;
pub mod error;
pub mod pipeline;
pub mod queue;
pub mod scanner;
pub mod scope;

#[cfg(test)]
mod testing;
