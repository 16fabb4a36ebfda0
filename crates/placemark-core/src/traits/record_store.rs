//! Record store trait.

use async_trait::async_trait;

use crate::error::PlacemarkResult;
use crate::types::{Listing, ListingRecord};

/// Persistence operations for live listing records.
///
/// Implementations must provide single-document atomicity per operation;
/// nothing here spans documents. `update_if_version` is the
/// conditional-write primitive the versioning protocol relies on to stay
/// correct under concurrent writers, and `insert` must refuse a second
/// live record for an identity hash that already has one.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new live record at version 1 with fresh timestamps,
    /// returning it with its assigned surrogate id.
    ///
    /// Fails with a duplicate-identity error (code
    /// `StoreDuplicateIdentity`) when a live record with the same
    /// `url_hash` already exists.
    async fn insert(&self, listing: &Listing, url_hash: &str) -> PlacemarkResult<ListingRecord>;

    /// Look up a live record by surrogate id.
    async fn find_by_id(&self, id: &str) -> PlacemarkResult<Option<ListingRecord>>;

    /// Look up a live record by identity hash.
    async fn find_by_hash(&self, url_hash: &str) -> PlacemarkResult<Option<ListingRecord>>;

    /// Replace the payload of record `id` only if its current version
    /// still equals `expected_version`, advancing the version counter and
    /// refreshing `updated_at` in the same atomic write.
    ///
    /// Returns the updated record, or `None` when the guard did not match
    /// (a concurrent writer advanced the record, or it was deleted).
    async fn update_if_version(
        &self,
        id: &str,
        expected_version: u32,
        listing: &Listing,
    ) -> PlacemarkResult<Option<ListingRecord>>;
}
