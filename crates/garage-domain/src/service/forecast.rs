//! Forecast aggregation: hourly samples into daily summaries, and N-day windows

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Timelike};
use garage_types::{DailySummary, ForecastSample, WeatherCondition};
use thiserror::Error;
use tracing::debug;

/// Why no summary could be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoData {
    #[error("forecast contains no samples")]
    Empty,

    #[error("forecast sample {index} is missing its {field}")]
    Malformed { index: usize, field: &'static str },
}

struct Day<'a> {
    temps: Vec<f64>,
    entries: Vec<(NaiveTime, Option<&'a WeatherCondition>)>,
}

/// Group samples by calendar day and summarise each day.
///
/// Per day: min/max temperature rounded to one decimal, and the condition of the
/// 12:00:00 sample, or of the middle sample (in arrival order) when there is none.
/// Days come out in ascending date order.
pub fn aggregate_by_day(samples: &[ForecastSample]) -> Result<Vec<DailySummary>, NoData> {
    if samples.is_empty() {
        return Err(NoData::Empty);
    }

    let mut days: BTreeMap<NaiveDate, Day<'_>> = BTreeMap::new();
    for (index, sample) in samples.iter().enumerate() {
        let timestamp = sample.timestamp.ok_or(NoData::Malformed {
            index,
            field: "timestamp",
        })?;
        let temp = sample.temperature.ok_or(NoData::Malformed {
            index,
            field: "temperature",
        })?;

        let day = days.entry(timestamp.date()).or_insert_with(|| Day {
            temps: Vec::new(),
            entries: Vec::new(),
        });
        day.temps.push(temp);
        day.entries.push((timestamp.time(), sample.condition.as_ref()));
    }

    let summaries = days
        .into_iter()
        .map(|(date, day)| {
            let temp_min = day.temps.iter().copied().fold(f64::INFINITY, f64::min);
            let temp_max = day.temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            let noon = day
                .entries
                .iter()
                .find(|(time, _)| time.hour() == 12 && time.minute() == 0 && time.second() == 0);
            let (_, condition) = *noon.unwrap_or(&day.entries[day.entries.len() / 2]);
            if condition.is_none() {
                debug!("No weather condition for representative sample on {}", date);
            }
            let condition = condition.cloned().unwrap_or_default();

            DailySummary {
                date,
                temp_min: round1(temp_min),
                temp_max: round1(temp_max),
                icon: condition.icon,
                description: capitalize(&condition.description),
            }
        })
        .collect();

    Ok(summaries)
}

/// First `n` days of a full aggregation; all of them when `n` is not positive or too large
pub fn windowed_view(days: &[DailySummary], n: i64) -> &[DailySummary] {
    match usize::try_from(n) {
        Ok(n) if n > 0 && n <= days.len() => &days[..n],
        _ => days,
    }
}

/// Window length from user input: the leading integer, so "3d" is 3 and
/// "2.5" is 2. Input without one selects every day (0).
pub fn parse_window(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    match rest[..digits].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn sample(ts: &str, temp: f64, icon: &str, desc: &str) -> ForecastSample {
        ForecastSample::new(
            at(ts),
            temp,
            WeatherCondition {
                icon: icon.to_string(),
                description: desc.to_string(),
            },
        )
    }

    fn one_day() -> Vec<ForecastSample> {
        let temps = [10.0, 12.0, 15.0, 18.0, 20.0, 19.0, 14.0, 11.0];
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let ts = format!("2024-06-01 {:02}:00:00", i * 3);
                let icon = if i * 3 == 12 { "01d" } else { "04d" };
                sample(&ts, *t, icon, if i * 3 == 12 { "céu limpo" } else { "nublado" })
            })
            .collect()
    }

    #[test]
    fn test_single_day_min_max() {
        let days = aggregate_by_day(&one_day()).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(days[0].temp_min, 10.0);
        assert_eq!(days[0].temp_max, 20.0);
    }

    #[test]
    fn test_noon_sample_is_representative() {
        let days = aggregate_by_day(&one_day()).unwrap();
        assert_eq!(days[0].icon, "01d");
        assert_eq!(days[0].description, "Céu limpo");
    }

    #[test]
    fn test_midpoint_fallback_uses_arrival_order() {
        // No 12:00 sample; arrival order is not chronological
        let samples = vec![
            sample("2024-06-02 21:00:00", 15.0, "a", "first"),
            sample("2024-06-02 15:00:00", 17.0, "b", "second"),
            sample("2024-06-02 18:00:00", 16.0, "c", "third"),
            sample("2024-06-02 09:00:00", 12.0, "d", "fourth"),
        ];
        let days = aggregate_by_day(&samples).unwrap();
        assert_eq!(days[0].icon, "c");
        assert_eq!(days[0].description, "Third");
    }

    #[test]
    fn test_days_sorted_ascending() {
        let samples = vec![
            sample("2024-06-03 00:00:00", 5.0, "x", "x"),
            sample("2024-06-01 00:00:00", 6.0, "y", "y"),
            sample("2024-06-02 00:00:00", 7.0, "z", "z"),
        ];
        let days = aggregate_by_day(&samples).unwrap();
        let dates: Vec<_> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-06-02", "2024-06-03"]);
    }

    #[test]
    fn test_temperatures_rounded_to_one_decimal() {
        let samples = vec![
            sample("2024-06-01 00:00:00", 10.26, "x", "x"),
            sample("2024-06-01 03:00:00", 21.04, "x", "x"),
        ];
        let days = aggregate_by_day(&samples).unwrap();
        assert_eq!(days[0].temp_min, 10.3);
        assert_eq!(days[0].temp_max, 21.0);
    }

    #[test]
    fn test_empty_is_no_data() {
        assert_eq!(aggregate_by_day(&[]), Err(NoData::Empty));
    }

    #[test]
    fn test_missing_fields_are_malformed() {
        let mut samples = one_day();
        samples[3].temperature = None;
        assert_eq!(
            aggregate_by_day(&samples),
            Err(NoData::Malformed {
                index: 3,
                field: "temperature"
            })
        );

        let mut samples = one_day();
        samples[0].timestamp = None;
        assert!(matches!(
            aggregate_by_day(&samples),
            Err(NoData::Malformed { index: 0, field: "timestamp" })
        ));
    }

    #[test]
    fn test_missing_condition_degrades() {
        let mut samples = one_day();
        samples[4].condition = None;
        let days = aggregate_by_day(&samples).unwrap();
        assert_eq!(days[0].icon, "");
        assert_eq!(days[0].description, "");
    }

    fn five_days() -> Vec<DailySummary> {
        let samples: Vec<_> = (1..=5)
            .map(|d| sample(&format!("2024-06-0{} 12:00:00", d), d as f64, "x", "x"))
            .collect();
        aggregate_by_day(&samples).unwrap()
    }

    #[test]
    fn test_windowed_view() {
        let days = five_days();
        assert_eq!(windowed_view(&days, 0), &days[..]);
        assert_eq!(windowed_view(&days, 100), &days[..]);
        assert_eq!(windowed_view(&days, -3), &days[..]);
        assert_eq!(windowed_view(&days, 5), &days[..]);

        let two = windowed_view(&days, 2);
        assert_eq!(two.len(), 2);
        assert_eq!(two[0], days[0]);
        assert_eq!(two[1], days[1]);
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("3"), 3);
        assert_eq!(parse_window(" 5 "), 5);
        assert_eq!(parse_window("all"), 0);
        assert_eq!(parse_window("3d"), 3);
        assert_eq!(parse_window("2.5"), 2);
        assert_eq!(parse_window("-1"), -1);
        assert_eq!(parse_window(""), 0);
        assert_eq!(parse_window("d3"), 0);
    }
}
