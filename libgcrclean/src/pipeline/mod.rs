//! End-to-end cleanup run.
//!
//! [`Cleaner`] wires the pieces together: one enumeration fetches the
//! catalog and launches a scan per in-scope repository, every scan pushes
//! its untagged manifests into the deletion queue, and the dispatcher
//! drains that queue under the parallelism ceiling. [`Cleaner::run`]
//! returns only once the coordinator reports no outstanding work and every
//! task it spawned has been joined.
//!
//! # Examples
//!
//! ```no_run
//! use libgcrclean::auth::Credentials;
//! use libgcrclean::client::Client;
//! use libgcrclean::pipeline::{CleanOptions, Cleaner};
//! use libgcrclean::scope::ProjectScope;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("gcr.io", Credentials::from_secret("{...}"))?;
//!     let cleaner = Cleaner::new(
//!         Arc::new(client),
//!         ProjectScope::new(["my-project"]),
//!         CleanOptions::default(),
//!     );
//!
//!     let report = cleaner.run().await;
//!     println!("{} manifests would be deleted", report.simulated);
//!     Ok(())
//! }
//! ```

use crate::client::RegistryApi;
use crate::coordinator::Coordinator;
use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::enumerator::{Enumerator, ScanSet};
use crate::error::source_of;
use crate::queue;
use crate::scope::ProjectScope;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;


/// Knobs of a cleanup run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanOptions {
    /// Maximum number of deletions in flight (default: 10)
    pub parallel: usize,
    /// Log candidates instead of deleting them (default: true)
    pub noop: bool,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            parallel: 10,
            noop: true,
        }
    }
}

impl CleanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_noop(mut self, noop: bool) -> Self {
        self.noop = noop;
        self
    }
}

/// Failure tally of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// In-scope repositories whose scan was launched
    pub repositories_scanned: usize,
    /// Catalog entries outside the project scope
    pub out_of_scope: usize,
    /// Untagged manifests enqueued for deletion
    pub candidates: usize,
    /// Manifests the registry deleted
    pub deleted: usize,
    /// Manifests logged but kept because of dry-run
    pub simulated: usize,
    /// Delete calls that failed
    pub failed: usize,
    /// Candidates not deleted because the run was cancelled
    pub skipped: usize,
    /// Repositories whose tag listing could not be fetched
    pub tag_list_failures: usize,
    /// Whether the catalog fetch failed
    pub catalog_failed: bool,
}

impl RunReport {
    /// Returns true if any registry call of the run failed.
    pub fn has_failures(&self) -> bool {
        self.catalog_failed || self.tag_list_failures > 0 || self.failed > 0
    }

    fn absorb(&mut self, dispatch: DispatchReport) {
        self.deleted = dispatch.deleted;
        self.simulated = dispatch.simulated;
        self.failed = dispatch.failed;
        self.skipped = dispatch.skipped;
    }
}

/// One cleanup run over a registry.
#[derive(Debug, Clone)]
pub struct Cleaner {
    client: Arc<dyn RegistryApi>,
    scope: Arc<ProjectScope>,
    options: CleanOptions,
    coordinator: Coordinator,
    cancel: CancellationToken,
}

impl Cleaner {
    pub fn new(client: Arc<dyn RegistryApi>, scope: ProjectScope, options: CleanOptions) -> Self {
        Self {
            client,
            scope: Arc::new(scope),
            options,
            coordinator: Coordinator::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to stop the run early.
    ///
    /// Once cancelled, no new scan starts and no further delete is issued;
    /// work already queued is still accounted before [`Cleaner::run`]
    /// returns.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The coordinator accounting this cleaner's work.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Runs the whole pipeline and reports what happened.
    ///
    /// Failures of individual registry calls are logged and tallied in the
    /// report; they never abort the rest of the run.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::default();

        tracing::info!(
            prefixes = ?self.scope.prefixes(),
            parallel = self.options.parallel,
            noop = self.options.noop,
            "Starting cleanup"
        );

        let (deletions, receiver) = queue::channel(self.coordinator.clone());
        let dispatcher = tokio::spawn(
            Dispatcher::new(
                Arc::clone(&self.client),
                self.options.parallel,
                self.options.noop,
                self.cancel.clone(),
            )
            .run(receiver),
        );

        let enumeration = self.coordinator.begin();
        let mut scans = ScanSet::new();
        let enumerator = Enumerator::new(
            Arc::clone(&self.client),
            Arc::clone(&self.scope),
            self.coordinator.clone(),
            self.cancel.clone(),
        );
        match enumerator.launch(deletions, &mut scans).await {
            Ok(summary) => {
                report.repositories_scanned = summary.launched;
                report.out_of_scope = summary.out_of_scope;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    cause = %source_of(&e),
                    "An error occurred while fetching repos"
                );
                report.catalog_failed = true;
            }
        }
        enumeration.end();

        while let Some(joined) = scans.join_next().await {
            match joined {
                Ok(Ok(enqueued)) => report.candidates += enqueued,
                // Already logged by the scan task
                Ok(Err(_)) => report.tag_list_failures += 1,
                Err(e) => {
                    tracing::error!(error = %e, "Scan task failed");
                    report.tag_list_failures += 1;
                }
            }
        }

        self.coordinator.await_all().await;

        match dispatcher.await {
            Ok(dispatch) => report.absorb(dispatch),
            Err(e) => {
                tracing::error!(error = %e, "Dispatcher task failed");
                report.failed = report.candidates;
            }
        }

        tracing::info!(
            repositories = report.repositories_scanned,
            candidates = report.candidates,
            deleted = report.deleted,
            simulated = report.simulated,
            failed = report.failed,
            skipped = report.skipped,
            tag_list_failures = report.tag_list_failures,
            catalog_failed = report.catalog_failed,
            "Cleanup finished"
        );
        report
    }
}
