//! Persistent vehicle store
//!
//! The whole fleet lives in one JSON blob behind a [`BlobStorage`]. Every
//! mutation is staged in memory, written, then committed or reverted.

pub mod blob;
mod defaults;
mod record;
pub mod vehicles;

pub use blob::{BlobStorage, MemoryBlobStorage};
pub use defaults::default_fleet;
pub use record::SkippedRecord;
pub use vehicles::{LoadReport, LoadSource, UpdateOutcome, VehicleStore, VehicleUpdate, STORAGE_KEY};
