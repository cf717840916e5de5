//! Infrastructure layer
//!
//! File-backed implementations of the store and lookup traits, the
//! OpenWeatherMap client and image file input.

pub mod image_input;
pub mod persistence;
pub mod weather;

pub use image_input::{image_data_uri, resolve_image};
pub use persistence::{FileBlobStorage, FileDetailLookup, DEFAULT_QUOTA_BYTES};
pub use weather::{parse_forecast, OpenWeatherClient};
