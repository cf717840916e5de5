//! Trait definitions for external collaborators

use garage_types::{Error, ForecastSeries, LookupError, VehicleDetails};

/// Read-only source of extended vehicle attributes
pub trait DetailLookup {
    /// Find details for a vehicle. `Ok(None)` means no match, which is not an error.
    fn find_details(&self, vehicle_id: &str) -> Result<Option<VehicleDetails>, LookupError>;
}

/// Source of multi-day forecast series for a named location
#[allow(async_fn_in_trait)]
pub trait ForecastProvider {
    /// Fetch the raw sample series for a city
    async fn fetch_forecast(&self, city: &str) -> Result<ForecastSeries, Error>;
}
