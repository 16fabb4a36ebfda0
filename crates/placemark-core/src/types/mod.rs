//! Core types for placemark.

mod listing;
mod version;

pub use listing::{Listing, ListingRecord, RecordMeta};
pub use version::ListingVersion;
