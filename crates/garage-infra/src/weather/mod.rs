//! Weather forecast providers

mod openweather;

pub use openweather::{parse_forecast, OpenWeatherClient};
