//! Repository enumeration and scan fan-out.

use crate::client::RegistryApi;
use crate::coordinator::Coordinator;
use crate::error::{CleanError, Result, source_of};
use crate::queue::DeletionQueue;
use crate::scanner;
use crate::scope::ProjectScope;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;


/// Scan tasks launched by the enumerator, joined by the caller.
///
/// Each task yields the number of candidates it enqueued, or the
/// [`CleanError::TagListFetch`] it already logged.
pub type ScanSet = JoinSet<Result<usize>>;

/// What the enumeration did with the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumerationSummary {
    /// Repositories in the catalog
    pub catalog_size: usize,
    /// In-scope repositories whose scan was launched
    pub launched: usize,
    /// Repositories outside the project scope
    pub out_of_scope: usize,
    /// In-scope repositories not launched because the run was cancelled
    pub cancelled: usize,
}

/// Fetches the catalog and launches one scanner per in-scope repository.
#[derive(Debug, Clone)]
pub struct Enumerator {
    client: Arc<dyn RegistryApi>,
    scope: Arc<ProjectScope>,
    coordinator: Coordinator,
    cancel: CancellationToken,
}

impl Enumerator {
    pub fn new(
        client: Arc<dyn RegistryApi>,
        scope: Arc<ProjectScope>,
        coordinator: Coordinator,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            scope,
            coordinator,
            cancel,
        }
    }

    /// Fetches the catalog once and spawns a scan into `scans` for every
    /// repository in scope.
    ///
    /// Returns as soon as every scan is launched; it does not wait for them.
    /// Each scan holds a unit of work of the coordinator and a clone of
    /// `queue`, so the queue closes once this call and every scan are done.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError::CatalogFetch`] if the catalog cannot be fetched
    /// or decoded. Scans launched so far keep running.
    pub async fn launch(
        &self,
        queue: DeletionQueue,
        scans: &mut ScanSet,
    ) -> Result<EnumerationSummary> {
        tracing::info!("Fetching repositories...");

        let catalog = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::info!("Run cancelled before the catalog was fetched");
                return Ok(EnumerationSummary::default());
            }
            catalog = self.client.list_catalog() => catalog.map_err(CleanError::catalog_fetch)?,
        };

        let mut summary = EnumerationSummary {
            catalog_size: catalog.len(),
            ..EnumerationSummary::default()
        };

        for repository in catalog {
            if !self.scope.contains(&repository) {
                tracing::debug!(repository = %repository, "Not in project scope, ignoring");
                summary.out_of_scope += 1;
                continue;
            }

            if self.cancel.is_cancelled() {
                summary.cancelled += 1;
                continue;
            }

            let unit = self.coordinator.begin();
            let client = Arc::clone(&self.client);
            let queue = queue.clone();
            let cancel = self.cancel.clone();

            scans.spawn(async move {
                let _unit = unit;
                if cancel.is_cancelled() {
                    tracing::debug!(repository = %repository, "Run cancelled, scan not started");
                    return Ok(0);
                }

                scanner::scan_repository(client.as_ref(), &repository, &queue)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(
                            repository = %repository,
                            error = %e,
                            cause = %source_of(e),
                            "Unable to fetch manifests"
                        );
                    })
            });
            summary.launched += 1;
        }

        if summary.cancelled > 0 {
            tracing::info!(
                skipped = summary.cancelled,
                "Run cancelled, remaining repositories not scanned"
            );
        }
        tracing::debug!(
            catalog = summary.catalog_size,
            launched = summary.launched,
            out_of_scope = summary.out_of_scope,
            "Enumeration finished"
        );
        Ok(summary)
    }
}
