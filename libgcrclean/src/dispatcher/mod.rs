//! Bounded-concurrency deletion of queued candidates.

use crate::client::RegistryApi;
use crate::error::{CleanError, source_of};
use crate::queue::{DeletionCandidate, QueueReceiver};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;


/// Terminal outcome of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The registry accepted the delete
    Deleted,
    /// Dry-run: logged, registry not contacted
    Simulated,
    /// The delete call failed; the candidate is dropped
    Failed,
    /// The run was cancelled before the delete was issued
    Skipped,
}

/// Tally of outcomes produced by one dispatcher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub deleted: usize,
    pub simulated: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl DispatchReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Deleted => self.deleted += 1,
            Outcome::Simulated => self.simulated += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    fn record_joined(&mut self, joined: std::result::Result<Outcome, JoinError>) {
        match joined {
            Ok(outcome) => self.record(outcome),
            Err(e) => {
                tracing::error!(error = %e, "Deletion task failed");
                self.failed += 1;
            }
        }
    }

    /// Number of candidates that reached a terminal outcome.
    pub fn total(&self) -> usize {
        self.deleted + self.simulated + self.failed + self.skipped
    }
}

/// Worker pool draining the deletion queue.
///
/// At most `parallel` deletions are in flight at any instant; acquiring a
/// slot is the only backpressure in the pipeline.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Arc<dyn RegistryApi>,
    parallel: usize,
    noop: bool,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Creates a dispatcher. A `parallel` of zero is raised to one.
    pub fn new(
        client: Arc<dyn RegistryApi>,
        parallel: usize,
        noop: bool,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            parallel: parallel.max(1),
            noop,
            cancel,
        }
    }

    /// Consumes `receiver` until every producer is gone and the queue is
    /// empty, then waits for the deletions still in flight.
    ///
    /// Each candidate's unit of work is ended after its slot is released,
    /// whatever the outcome.
    pub async fn run(self, mut receiver: QueueReceiver) -> DispatchReport {
        let limiter = Arc::new(Semaphore::new(self.parallel));
        let mut in_flight = JoinSet::new();
        let mut report = DispatchReport::default();

        while let Some(queued) = receiver.recv().await {
            while let Some(joined) = in_flight.try_join_next() {
                report.record_joined(joined);
            }

            let permit = match Arc::clone(&limiter).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Deletion limiter closed");
                    break;
                }
            };

            let client = Arc::clone(&self.client);
            let cancel = self.cancel.clone();
            let noop = self.noop;

            in_flight.spawn(async move {
                let outcome = dispose(client.as_ref(), &queued.candidate, noop, &cancel).await;
                drop(permit);
                queued.unit.end();
                outcome
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            report.record_joined(joined);
        }

        report
    }
}

/// Brings one candidate to its terminal outcome.
async fn dispose(
    client: &dyn RegistryApi,
    candidate: &DeletionCandidate,
    noop: bool,
    cancel: &CancellationToken,
) -> Outcome {
    let repository = candidate.repository.as_str();
    let digest = candidate.digest.as_str();

    if cancel.is_cancelled() {
        tracing::info!(repository, digest, "Run cancelled, manifest not deleted");
        return Outcome::Skipped;
    }

    if noop {
        tracing::info!(repository, digest, noop, "Manifest would be deleted");
        return Outcome::Simulated;
    }

    match client.delete_manifest(repository, digest).await {
        Ok(()) => {
            tracing::info!(repository, digest, noop, "Manifest deleted");
            Outcome::Deleted
        }
        Err(e) => {
            let err = CleanError::delete(repository, digest, e);
            tracing::error!(
                repository,
                digest,
                error = %err,
                cause = %source_of(&err),
                "Failed to delete manifest"
            );
            Outcome::Failed
        }
    }
}
