//! Eligibility scanning of one repository.
//!
//! A manifest is eligible for deletion iff it has zero tags. Nothing else is
//! considered, in particular not whether a multi-arch index still refers to
//! the manifest.

use crate::client::{RegistryApi, TagListing};
use crate::error::{CleanError, Result};
use crate::queue::{DeletionCandidate, DeletionQueue};


/// Lazily yields the untagged manifests of `listing` as deletion candidates.
///
/// Tagged manifests are skipped with a debug log line carrying the tag
/// count. Order follows the listing's iteration order, which is unspecified.
pub fn untagged<'a>(
    repository: &'a str,
    listing: TagListing,
) -> impl Iterator<Item = DeletionCandidate> + 'a {
    listing.into_iter().filter_map(move |(digest, tags)| {
        if tags.is_empty() {
            return Some(DeletionCandidate::new(repository, digest));
        }

        tracing::debug!(
            repository,
            digest = %digest,
            tags = tags.len(),
            "Manifest has tags, ignoring"
        );
        None
    })
}

/// Fetches the tag listing of `repository` and enqueues every untagged
/// manifest.
///
/// Returns the number of candidates handed to the queue.
///
/// # Errors
///
/// Returns [`CleanError::TagListFetch`] if the listing cannot be fetched or
/// decoded. Nothing is enqueued in that case.
pub async fn scan_repository(
    client: &dyn RegistryApi,
    repository: &str,
    queue: &DeletionQueue,
) -> Result<usize> {
    let listing = client
        .list_tags(repository)
        .await
        .map_err(|e| CleanError::tag_list_fetch(repository, e))?;

    let mut enqueued = 0;
    for candidate in untagged(repository, listing) {
        if queue.push(candidate) {
            enqueued += 1;
        }
    }

    tracing::debug!(repository, candidates = enqueued, "Repository scanned");
    Ok(enqueued)
}
