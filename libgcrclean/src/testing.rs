//! In-memory registry used by unit tests.

use crate::client::{RegistryApi, TagListing};
use crate::error::{RegistryError, RegistryResult};
use crate::queue::DeletionCandidate;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Fake registry recording every call it receives.
#[derive(Debug, Default)]
pub struct FakeRegistry {
    catalog: Vec<String>,
    catalog_fails: bool,
    tags: HashMap<String, TagListing>,
    failing_tags: HashSet<String>,
    failing_deletes: HashSet<DeletionCandidate>,
    delete_delay: Duration,

    listed: Mutex<Vec<String>>,
    deleted: Mutex<Vec<DeletionCandidate>>,
    delete_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a repository with `untagged` zero-tag manifests and `tagged`
    /// manifests carrying one tag each.
    pub fn with_repository(mut self, name: &str, untagged: usize, tagged: usize) -> Self {
        let mut listing = TagListing::new();
        for i in 0..untagged {
            listing.insert(format!("sha256:{}-untagged-{}", name, i), Vec::new());
        }
        for i in 0..tagged {
            listing.insert(
                format!("sha256:{}-tagged-{}", name, i),
                vec![format!("v{}", i)],
            );
        }
        self.catalog.push(name.to_string());
        self.tags.insert(name.to_string(), listing);
        self
    }

    /// Adds a repository with an explicit listing.
    pub fn with_listing(mut self, name: &str, listing: TagListing) -> Self {
        self.catalog.push(name.to_string());
        self.tags.insert(name.to_string(), listing);
        self
    }

    pub fn with_failing_catalog(mut self) -> Self {
        self.catalog_fails = true;
        self
    }

    pub fn with_failing_tags(mut self, name: &str) -> Self {
        self.failing_tags.insert(name.to_string());
        self
    }

    pub fn with_failing_delete(mut self, repository: &str, digest: &str) -> Self {
        self.failing_deletes
            .insert(DeletionCandidate::new(repository, digest));
        self
    }

    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = delay;
        self
    }

    /// Repositories whose tags were requested, in call order.
    pub fn listed(&self) -> Vec<String> {
        self.listed.lock().unwrap().clone()
    }

    /// Candidates successfully deleted, in completion order.
    pub fn deleted(&self) -> Vec<DeletionCandidate> {
        self.deleted.lock().unwrap().clone()
    }

    /// Number of delete calls received, failed ones included.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Highest number of delete calls observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    async fn list_catalog(&self) -> RegistryResult<Vec<String>> {
        if self.catalog_fails {
            return Err(RegistryError::server("catalog unavailable", 503));
        }
        Ok(self.catalog.clone())
    }

    async fn list_tags(&self, repository: &str) -> RegistryResult<TagListing> {
        self.listed.lock().unwrap().push(repository.to_string());
        tokio::task::yield_now().await;

        if self.failing_tags.contains(repository) {
            return Err(RegistryError::decode("unexpected tag listing shape"));
        }
        self.tags
            .get(repository)
            .cloned()
            .ok_or_else(|| RegistryError::not_found("repository", repository))
    }

    async fn delete_manifest(&self, repository: &str, digest: &str) -> RegistryResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.delete_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delete_delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let candidate = DeletionCandidate::new(repository, digest);
        if self.failing_deletes.contains(&candidate) {
            return Err(RegistryError::status("manifest is referenced", 409));
        }
        self.deleted.lock().unwrap().push(candidate);
        Ok(())
    }
}
