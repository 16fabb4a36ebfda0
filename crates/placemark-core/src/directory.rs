//! The listing directory - owner of the versioned upsert protocol.
//!
//! `save` deduplicates writes by identity hash, detects content changes by
//! structural comparison, and advances live records through a conditional
//! update guarded on the current version number. The guard turns the
//! check-then-act race between concurrent writers into a bounded retry:
//! whoever wins the `n -> n+1` transition is the unique writer entitled to
//! archive `Version(n)`.

use std::sync::Arc;

use chrono::Utc;

use crate::error::{ErrorCode, PlacemarkError, PlacemarkResult};
use crate::identity::identity_hash;
use crate::traits::{RecordStore, VersionStore};
use crate::types::{Listing, ListingRecord, ListingVersion};

/// Attempts before `save` gives up on a contended identity.
const MAX_SAVE_ATTEMPTS: u32 = 3;

/// Versioned listing store over injected persistence backends.
pub struct Directory {
    records: Arc<dyn RecordStore>,
    versions: Arc<dyn VersionStore>,
}

impl Directory {
    /// Create a directory over the given backends.
    pub fn new(records: Arc<dyn RecordStore>, versions: Arc<dyn VersionStore>) -> Self {
        Self { records, versions }
    }

    /// Create or advance the live record for this listing's identity.
    ///
    /// - No live record for the identity hash: insert one at version 1.
    /// - Live record with identical content: return it unchanged. Nothing
    ///   is written, so idempotent callers may retry freely.
    /// - Live record with different content: archive its pre-update state
    ///   as a version, then apply the new payload with the version counter
    ///   advanced by one.
    ///
    /// Fails with `InvalidPayload` when the listing has no website, with
    /// `NotFoundOnUpdate` when the record vanishes mid-update, and with
    /// `Conflict` when concurrent writers exhaust the retry budget.
    pub async fn save(&self, listing: Listing) -> PlacemarkResult<ListingRecord> {
        let url = match listing.natural_key() {
            Some(url) => url,
            None => return Err(PlacemarkError::missing_natural_key()),
        };
        let url_hash = identity_hash(url);

        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            match self.records.find_by_hash(&url_hash).await? {
                None => match self.records.insert(&listing, &url_hash).await {
                    Ok(record) => {
                        tracing::debug!(id = %record.id, "created listing");
                        return Ok(record);
                    }
                    // Another writer created this identity first. Re-read
                    // and go through the update path instead.
                    Err(e) if e.code() == ErrorCode::StoreDuplicateIdentity => {
                        tracing::debug!(attempt, "lost create race, re-reading");
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                Some(existing) => {
                    if existing.listing == listing {
                        tracing::debug!(
                            id = %existing.id,
                            version = existing.meta.current_version,
                            "unchanged content, no-op save"
                        );
                        return Ok(existing);
                    }

                    let updated = self
                        .records
                        .update_if_version(&existing.id, existing.meta.current_version, &listing)
                        .await?;
                    match updated {
                        Some(updated) => {
                            // The guard matched, so `existing` is exactly the
                            // state this update replaced. Archive it once.
                            let snapshot =
                                ListingVersion::snapshot_of(&existing, updated.meta.updated_at);
                            self.versions.append(&snapshot).await?;
                            tracing::debug!(
                                id = %updated.id,
                                version = updated.meta.current_version,
                                "advanced listing"
                            );
                            return Ok(updated);
                        }
                        None => {
                            if self.records.find_by_id(&existing.id).await?.is_none() {
                                return Err(PlacemarkError::not_found_on_update(&existing.id));
                            }
                            tracing::debug!(
                                attempt,
                                id = %existing.id,
                                "version guard failed, re-reading"
                            );
                        }
                    }
                }
            }
        }

        Err(PlacemarkError::conflict(format!(
            "save for identity hash '{}' still contended after {} attempts",
            url_hash, MAX_SAVE_ATTEMPTS
        )))
    }

    /// Live record by surrogate id.
    ///
    /// When no live record matches, falls back to the most recent archived
    /// version reshaped as a record view. The fallback is defensive only:
    /// the protocol never deletes live records, so it triggers just for
    /// records removed administratively.
    pub async fn get_by_id(&self, id: &str) -> PlacemarkResult<Option<ListingRecord>> {
        if let Some(record) = self.records.find_by_id(id).await? {
            return Ok(Some(record));
        }
        Ok(self
            .versions
            .latest(id)
            .await?
            .map(ListingVersion::into_record_view))
    }

    /// Live record whose identity hash matches this URL.
    pub async fn get_by_url(&self, url: &str) -> PlacemarkResult<Option<ListingRecord>> {
        self.records.find_by_hash(&identity_hash(url)).await
    }

    /// All archived versions for a listing, most recent first. Empty for a
    /// never-updated record.
    pub async fn get_versions(&self, listing_id: &str) -> PlacemarkResult<Vec<ListingVersion>> {
        self.versions.for_listing(listing_id).await
    }
}
