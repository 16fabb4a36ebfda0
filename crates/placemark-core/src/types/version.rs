//! Archived listing versions.
//!
//! A version is an immutable copy of what a live record looked like
//! before an update overwrote it. It carries the version number the
//! record held at that point, not the new one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::identity_hash;
use crate::types::{Listing, ListingRecord, RecordMeta};

/// An immutable snapshot of a live record's prior state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingVersion {
    /// Back-reference to the live record's surrogate id.
    pub listing_id: String,
    /// The version number the live record held before the update that
    /// archived this snapshot.
    pub version: u32,
    #[serde(flatten)]
    pub listing: Listing,
    /// Preserved from the live record's creation time.
    pub created_at: DateTime<Utc>,
    /// When the snapshot was taken.
    pub updated_at: DateTime<Utc>,
}

impl ListingVersion {
    /// Archive the pre-update state of a live record.
    pub fn snapshot_of(record: &ListingRecord, taken_at: DateTime<Utc>) -> Self {
        Self {
            listing_id: record.id.clone(),
            version: record.meta.current_version,
            listing: record.listing.clone(),
            created_at: record.meta.created_at,
            updated_at: taken_at,
        }
    }

    /// Reshape the snapshot as a record-like view, with the surrogate id
    /// set to the original `listing_id`. Used by the defensive fallback in
    /// `get_by_id` when no live record matches.
    pub fn into_record_view(self) -> ListingRecord {
        let url_hash = identity_hash(self.listing.website.as_deref().unwrap_or(""));
        ListingRecord {
            id: self.listing_id,
            listing: self.listing,
            url_hash,
            meta: RecordMeta {
                current_version: self.version,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}
