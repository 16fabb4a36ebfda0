//! placemark-stores - document-store backends for placemark.
//!
//! Provides the MongoDB implementation of the `RecordStore` and
//! `VersionStore` traits, persisting live records in a `listings`
//! collection and archived snapshots in `listingVersions`, in the same
//! document layout the collections have always had: payload fields flat on
//! the document, plus `url_hash` and a `meta` subdocument.

mod mongodb;

pub use crate::mongodb::{connect_client, MongoConfig, MongoRecordStore, MongoVersionStore};
