//! Error types for the garage manager

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),
}

/// Persistence errors raised by the blob storage
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Storage is full; the write did not happen
    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The blob exists but is not valid garage data
    #[error("Stored data corrupted: {0}")]
    Corrupt(String),

    #[error("Storage read failed: {0}")]
    Read(String),

    #[error("Storage write failed: {0}")]
    Write(String),
}

impl StoreError {
    pub fn is_quota(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

/// User-supplied data failed basic shape checks
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// A vehicle action was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("'{action}' is only available for {required}")]
    Unsupported {
        action: &'static str,
        required: &'static str,
    },

    #[error("Vehicle must be running to {0}")]
    NotRunning(&'static str),

    #[error("Vehicle must be stopped before turning off (speed {0:.0} km/h)")]
    StillMoving(f64),

    #[error("Invalid cargo amount: {0}")]
    InvalidAmount(f64),

    #[error("Cargo over capacity: {load} + {amount} exceeds {capacity}")]
    OverCapacity { load: f64, amount: f64, capacity: f64 },

    #[error("Cannot unload {amount}: only {load} on board")]
    NotEnoughCargo { load: f64, amount: f64 },
}

/// External lookup (details, forecast) failures
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup source unavailable: {0}")]
    Unavailable(String),

    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Action rejected: {0}")]
    Action(#[from] ActionError),

    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),
}

impl Error {
    /// True when the error means the last mutation was not persisted because storage is full
    pub fn is_quota(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_quota())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
