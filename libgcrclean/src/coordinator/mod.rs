//! Completion accounting for asynchronous work.
//!
//! Every unit of outstanding work (the enumeration, each repository scan,
//! each queued deletion candidate) holds a [`WorkUnit`]. The unit is
//! registered when it is created and released exactly once when it is
//! dropped, so a candidate sitting in the deletion queue keeps the count
//! above zero until the dispatcher has recorded its outcome.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

#[cfg(test)]
mod tests;

/// Counts begun-but-not-ended units of work and lets callers wait for zero.
///
/// Cloning is cheap and every clone shares the same counter, so one
/// coordinator can be handed to every task of a run while tests create an
/// independent one per scenario.
///
/// # Examples
///
/// ```
/// use libgcrclean::coordinator::Coordinator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let coordinator = Coordinator::new();
/// let unit = coordinator.begin();
/// assert_eq!(coordinator.outstanding(), 1);
///
/// unit.end();
/// coordinator.await_all().await;
/// assert_eq!(coordinator.outstanding(), 0);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    outstanding: AtomicUsize,
    drained: Notify,
}

impl Coordinator {
    /// Creates a coordinator with no outstanding work.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of outstanding work.
    ///
    /// The returned guard ends the unit when dropped.
    pub fn begin(&self) -> WorkUnit {
        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        WorkUnit {
            coordinator: self.clone(),
        }
    }

    fn end(&self) {
        let previous = self.inner.outstanding.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "work unit ended twice");
        if previous == 1 {
            self.inner.drained.notify_waiters();
        }
    }

    /// Number of units begun but not yet ended.
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Waits until no unit of work is outstanding.
    ///
    /// Returns immediately when the count is already zero.
    pub async fn await_all(&self) {
        loop {
            let drained = self.inner.drained.notified();
            tokio::pin!(drained);
            // Register interest before reading the counter so a concurrent
            // final `end` cannot slip between the check and the wait.
            drained.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            drained.await;
        }
    }
}

/// One registered unit of outstanding work.
///
/// Ending is tied to ownership: the unit ends when [`WorkUnit::end`] is
/// called or when the guard is dropped, whichever comes first, and never
/// twice.
#[derive(Debug)]
#[must_use = "a work unit ends as soon as it is dropped"]
pub struct WorkUnit {
    coordinator: Coordinator,
}

impl WorkUnit {
    /// Marks this unit of work as finished.
    pub fn end(self) {
        drop(self);
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.coordinator.end();
    }
}
