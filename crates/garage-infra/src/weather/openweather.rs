//! OpenWeatherMap 5-day / 3-hour forecast client.
//!
//! Fetches the raw forecast list and converts it to a `ForecastSeries` whose
//! sample timestamps are local wall-clock times of the city.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use garage_domain::repository::ForecastProvider;
use garage_types::{ConfigError, Error, ForecastSample, ForecastSeries, LookupError, WeatherCondition};
use serde::Deserialize;
use tracing::debug;

const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// OpenWeatherMap API client
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: String,
    lang: String,
    base_url: String,
}

/// Response from `data/2.5/forecast`
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastItem>,
    #[serde(default)]
    city: Option<CityInfo>,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    #[serde(default)]
    dt: Option<i64>,
    #[serde(default)]
    dt_txt: Option<String>,
    #[serde(default)]
    main: Option<MainInfo>,
    #[serde(default)]
    weather: Vec<WeatherInfo>,
}

#[derive(Debug, Deserialize)]
struct MainInfo {
    #[serde(default)]
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WeatherInfo {
    #[serde(default)]
    icon: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct CityInfo {
    #[serde(default)]
    name: Option<String>,
    /// Offset from UTC in seconds
    #[serde(default)]
    timezone: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl OpenWeatherClient {
    /// Create a client. An empty API key is rejected before any request is made.
    pub fn new(api_key: impl Into<String>, lang: impl Into<String>) -> Result<Self, Error> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential(
                "OpenWeatherMap API key (set openweather_api_key or OPENWEATHER_API_KEY)".to_string(),
            )
            .into());
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("garage/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LookupError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            lang: lang.into(),
            base_url: FORECAST_URL.to_string(),
        })
    }

    /// Point the client at another endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ForecastProvider for OpenWeatherClient {
    async fn fetch_forecast(&self, city: &str) -> Result<ForecastSeries, Error> {
        debug!("Fetching forecast: {} q={} lang={}", self.base_url, city, self.lang);

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(format!("forecast request for {}: {}", city, e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LookupError::Unavailable(format!("forecast body for {}: {}", city, e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(LookupError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        Ok(parse_forecast(&body, city)?)
    }
}

/// Convert a forecast response body into a sample series.
///
/// Sample times are `dt` shifted by the city's UTC offset when both are
/// present, else `dt_txt`. Missing fields stay `None` for the aggregator to
/// report. The city name falls back to `requested_city`.
pub fn parse_forecast(body: &str, requested_city: &str) -> Result<ForecastSeries, LookupError> {
    let response: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::InvalidResponse(format!("forecast JSON: {}", e)))?;

    let offset = response.city.as_ref().and_then(|c| c.timezone);
    let city = response
        .city
        .and_then(|c| c.name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| requested_city.to_string());

    let samples = response
        .list
        .into_iter()
        .map(|item| {
            let local_from_unix = match (item.dt, offset) {
                (Some(dt), Some(offset)) => {
                    DateTime::from_timestamp(dt + offset, 0).map(|t| t.naive_utc())
                }
                _ => None,
            };
            let timestamp = local_from_unix.or_else(|| {
                item.dt_txt
                    .as_deref()
                    .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S").ok())
            });

            ForecastSample {
                timestamp,
                temperature: item.main.and_then(|m| m.temp),
                condition: item.weather.into_iter().next().map(|w| WeatherCondition {
                    icon: w.icon,
                    description: w.description,
                }),
            }
        })
        .collect();

    Ok(ForecastSeries { city, samples })
}
