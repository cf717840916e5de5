//! Weather forecast types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weather condition attached to a sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    /// Provider icon code (e.g., "10d")
    pub icon: String,
    pub description: String,
}

/// One sample of a forecast time series.
///
/// Fields are optional so incomplete upstream rows can be detected by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Local wall-clock time at the forecast location
    pub timestamp: Option<NaiveDateTime>,
    /// Temperature in °C
    pub temperature: Option<f64>,
    pub condition: Option<WeatherCondition>,
}

impl ForecastSample {
    pub fn new(timestamp: NaiveDateTime, temperature: f64, condition: WeatherCondition) -> Self {
        Self {
            timestamp: Some(timestamp),
            temperature: Some(temperature),
            condition: Some(condition),
        }
    }
}

/// Per-day summary derived from that day's samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    pub icon: String,
    pub description: String,
}

impl DailySummary {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// Raw series returned by a forecast provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    /// City name as resolved by the provider
    pub city: String,
    pub samples: Vec<ForecastSample>,
}
