//! placemark-core - versioned listing records over a document store.
//!
//! Each write either creates a new live record or, when a record with the
//! same identity (hash of the website URL) already exists and its content
//! changed, archives the prior state as an immutable version and advances
//! the live record in place. Identical content is a no-op.
//!
//! Persistence backends implement the [`RecordStore`] and [`VersionStore`]
//! traits and are injected into the [`Directory`] orchestrator; the
//! MongoDB backend lives in the `placemark-stores` crate and an in-memory
//! backend ships here for tests and single-process use.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use placemark_core::{Directory, Listing, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let directory = Directory::new(store.clone(), store);
//!
//! let saved = directory
//!     .save(Listing::new("Cafe Good Vibes").with_website("http://cafegoodvibes.com"))
//!     .await?;
//! assert_eq!(saved.meta.current_version, 1);
//! ```

pub mod directory;
pub mod error;
pub mod identity;
pub mod stores;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use directory::Directory;
pub use error::{ErrorCode, PlacemarkError, PlacemarkResult};
pub use identity::identity_hash;
pub use stores::MemoryStore;
pub use traits::{RecordStore, VersionStore};
pub use types::{Listing, ListingRecord, ListingVersion, RecordMeta};
