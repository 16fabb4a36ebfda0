//! Store traits implemented by persistence backends.

mod record_store;
mod version_store;

pub use record_store::RecordStore;
pub use version_store::VersionStore;
