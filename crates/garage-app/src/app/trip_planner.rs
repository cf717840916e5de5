//! Forecast cache for trip planning
//!
//! Each fetch takes a ticket. Only the latest ticket may fill the cache; a
//! result arriving for an older ticket is dropped.

use garage_domain::service::{aggregate_by_day, windowed_view};
use garage_types::{DailySummary, Error, ForecastSeries, LookupError, Result, ValidationError};
use serde::Serialize;
use tracing::{debug, info};

/// Handle for one forecast request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What happened to a completed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Stored,
    /// A newer request was started; the result was discarded
    Superseded,
}

/// A windowed forecast ready to show
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripForecast {
    pub city: String,
    pub days: Vec<DailySummary>,
}

#[derive(Debug, Clone)]
struct CachedForecast {
    city: String,
    days: Vec<DailySummary>,
}

#[derive(Debug, Default)]
pub struct TripPlanner {
    latest: u64,
    cache: Option<CachedForecast>,
}

impl TripPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `city`, superseding any request in flight.
    /// An empty city clears the cache and is rejected.
    pub fn begin(&mut self, city: &str) -> Result<Ticket> {
        if city.trim().is_empty() {
            self.clear();
            return Err(ValidationError::MissingField("city").into());
        }
        self.latest += 1;
        debug!("Forecast request #{} for {}", self.latest, city.trim());
        Ok(Ticket(self.latest))
    }

    /// Record the outcome of the request behind `ticket`
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<ForecastSeries, Error>,
    ) -> Result<Completion> {
        if ticket.0 != self.latest {
            debug!(
                "Discarding forecast #{} (latest is #{})",
                ticket.0, self.latest
            );
            return Ok(Completion::Superseded);
        }

        let series = match result {
            Ok(series) => series,
            Err(e) => {
                self.clear();
                return Err(e);
            }
        };

        match aggregate_by_day(&series.samples) {
            Ok(days) => {
                info!("Forecast for {}: {} days", series.city, days.len());
                self.cache = Some(CachedForecast {
                    city: series.city,
                    days,
                });
                Ok(Completion::Stored)
            }
            Err(no_data) => {
                self.clear();
                Err(LookupError::InvalidResponse(format!(
                    "no forecast for {}: {}",
                    series.city, no_data
                ))
                .into())
            }
        }
    }

    /// The cached forecast limited to `days` days (all when `days <= 0`)
    pub fn view(&self, days: i64) -> Option<TripForecast> {
        self.cache.as_ref().map(|c| TripForecast {
            city: c.city.clone(),
            days: windowed_view(&c.days, days).to_vec(),
        })
    }

    /// Drop the cached forecast
    pub fn clear(&mut self) {
        self.cache = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}
