//! In-memory store backend.
//!
//! Implements both store traits over a mutex-guarded map. Backs the
//! protocol tests and works as a lightweight single-process store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{PlacemarkError, PlacemarkResult};
use crate::traits::{RecordStore, VersionStore};
use crate::types::{Listing, ListingRecord, ListingVersion, RecordMeta};

#[derive(Default)]
struct Inner {
    records: HashMap<String, ListingRecord>,
    ids_by_hash: HashMap<String, String>,
    versions: Vec<ListingVersion>,
}

/// In-memory implementation of [`RecordStore`] and [`VersionStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Administrative deletion of a live record. The versioning protocol
    /// itself never deletes; this exists for operators and for exercising
    /// the version-history fallback in `get_by_id`.
    pub fn delete_record(&self, id: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.records.remove(id) {
            Some(record) => {
                inner.ids_by_hash.remove(&record.url_hash);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, listing: &Listing, url_hash: &str) -> PlacemarkResult<ListingRecord> {
        let mut inner = self.inner.lock().unwrap();
        if inner.ids_by_hash.contains_key(url_hash) {
            return Err(PlacemarkError::duplicate_identity(url_hash));
        }

        let record = ListingRecord {
            id: Uuid::new_v4().to_string(),
            listing: listing.clone(),
            url_hash: url_hash.to_string(),
            meta: RecordMeta::initial(Utc::now()),
        };
        inner
            .ids_by_hash
            .insert(url_hash.to_string(), record.id.clone());
        inner.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> PlacemarkResult<Option<ListingRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.records.get(id).cloned())
    }

    async fn find_by_hash(&self, url_hash: &str) -> PlacemarkResult<Option<ListingRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ids_by_hash
            .get(url_hash)
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn update_if_version(
        &self,
        id: &str,
        expected_version: u32,
        listing: &Listing,
    ) -> PlacemarkResult<Option<ListingRecord>> {
        let mut inner = self.inner.lock().unwrap();
        match inner.records.get_mut(id) {
            Some(record) if record.meta.current_version == expected_version => {
                record.listing = listing.clone();
                record.meta = record.meta.advanced(Utc::now());
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn append(&self, version: &ListingVersion) -> PlacemarkResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.versions.push(version.clone());
        Ok(())
    }

    async fn for_listing(&self, listing_id: &str) -> PlacemarkResult<Vec<ListingVersion>> {
        let inner = self.inner.lock().unwrap();
        let mut versions: Vec<ListingVersion> = inner
            .versions
            .iter()
            .filter(|v| v.listing_id == listing_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn latest(&self, listing_id: &str) -> PlacemarkResult<Option<ListingVersion>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .versions
            .iter()
            .filter(|v| v.listing_id == listing_id)
            .max_by_key(|v| v.version)
            .cloned())
    }
}
