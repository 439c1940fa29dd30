//! The shared deletion queue between scanners and the dispatcher.
//!
//! Each pushed candidate carries its own [`WorkUnit`], registered before the
//! candidate enters the channel. The channel closes when the last
//! [`DeletionQueue`] handle is dropped, which is how the dispatcher learns
//! that the producer side has finished.

use crate::coordinator::{Coordinator, WorkUnit};
use tokio::sync::mpsc;


/// A manifest eligible for removal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletionCandidate {
    pub repository: String,
    pub digest: String,
}

impl DeletionCandidate {
    pub fn new(repository: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            digest: digest.into(),
        }
    }
}

impl std::fmt::Display for DeletionCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.repository, self.digest)
    }
}

/// A candidate in transit together with its accounting unit.
#[derive(Debug)]
pub struct QueuedCandidate {
    pub candidate: DeletionCandidate,
    pub unit: WorkUnit,
}

/// Producer handle of the deletion queue.
#[derive(Debug, Clone)]
pub struct DeletionQueue {
    sender: mpsc::UnboundedSender<QueuedCandidate>,
    coordinator: Coordinator,
}

/// Consumer side of the deletion queue.
#[derive(Debug)]
pub struct QueueReceiver {
    receiver: mpsc::UnboundedReceiver<QueuedCandidate>,
}

/// Creates a deletion queue whose items are accounted in `coordinator`.
pub fn channel(coordinator: Coordinator) -> (DeletionQueue, QueueReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        DeletionQueue {
            sender,
            coordinator,
        },
        QueueReceiver { receiver },
    )
}

impl DeletionQueue {
    /// Enqueues a candidate.
    ///
    /// Returns false if the consumer is gone; the candidate's unit of work
    /// is ended immediately in that case.
    pub fn push(&self, candidate: DeletionCandidate) -> bool {
        let unit = self.coordinator.begin();
        match self.sender.send(QueuedCandidate { candidate, unit }) {
            Ok(()) => true,
            Err(mpsc::error::SendError(rejected)) => {
                tracing::error!(
                    repository = %rejected.candidate.repository,
                    digest = %rejected.candidate.digest,
                    "Deletion queue closed, candidate dropped"
                );
                false
            }
        }
    }
}

impl QueueReceiver {
    /// Receives the next candidate, or `None` once every producer is gone
    /// and the queue is drained.
    pub async fn recv(&mut self) -> Option<QueuedCandidate> {
        self.receiver.recv().await
    }
}
