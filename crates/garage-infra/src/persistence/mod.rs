//! Persistence implementations
//!
//! File-based implementations of the blob storage and detail lookup traits.

mod file_blob_storage;
mod file_detail_lookup;

pub use file_blob_storage::{FileBlobStorage, DEFAULT_QUOTA_BYTES};
pub use file_detail_lookup::FileDetailLookup;
