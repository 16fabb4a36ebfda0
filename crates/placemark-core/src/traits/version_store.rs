//! Version store trait.

use async_trait::async_trait;

use crate::error::PlacemarkResult;
use crate::types::ListingVersion;

/// Append-only storage for archived listing versions.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Append a snapshot. Snapshots are immutable once written.
    async fn append(&self, version: &ListingVersion) -> PlacemarkResult<()>;

    /// All snapshots for a listing, most recent version first. Empty when
    /// the listing has never been updated.
    async fn for_listing(&self, listing_id: &str) -> PlacemarkResult<Vec<ListingVersion>>;

    /// The most recent snapshot for a listing, if any.
    async fn latest(&self, listing_id: &str) -> PlacemarkResult<Option<ListingVersion>>;
}
