//! Adapters from config to the persistence and lookup implementations

use garage_infra::{FileBlobStorage, FileDetailLookup, OpenWeatherClient};
use garage_store::LoadReport;
use garage_types::{ConfigError, Result};

use crate::app::Garage;
use crate::config::{Config, API_KEY_ENV};

/// Open file-based blob storage in the configured data directory
pub fn open_blob_storage(config: &Config) -> Result<FileBlobStorage> {
    let data_dir = config.data_dir()?;
    FileBlobStorage::open(data_dir, config.storage_quota_bytes)
}

/// Open the garage over the configured data directory
pub fn open_garage(config: &Config) -> Result<(Garage<FileBlobStorage>, LoadReport)> {
    Ok(Garage::open(open_blob_storage(config)?))
}

/// Open the vehicle details file
pub fn open_detail_lookup(config: &Config) -> Result<FileDetailLookup> {
    Ok(FileDetailLookup::new(config.details_path()?))
}

/// Build the forecast client from the configured credential and language
pub fn open_forecast_client(config: &Config) -> Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        ConfigError::MissingCredential(format!(
            "OpenWeatherMap API key (set {} or run: garage config --set-api-key <KEY>)",
            API_KEY_ENV
        ))
    })?;
    OpenWeatherClient::new(api_key, config.forecast_lang.clone())
}
