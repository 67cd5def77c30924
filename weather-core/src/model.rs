//! Snapshots as returned by the weather API.
//!
//! Field names follow the API's JSON so payloads deserialize directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// The `q=` form the weather API accepts for a point.
    pub fn as_query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    pub code: u16,
}

impl Condition {
    /// Icon URLs come scheme-relative (`//cdn...`).
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") { format!("https:{}", self.icon) } else { self.icon.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    #[serde(default)]
    pub localtime_epoch: Option<i64>,
    #[serde(default)]
    pub localtime: String,
}

impl Location {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// "Name, Region, Country" with empty parts left out.
    pub fn display_name(&self) -> String {
        [self.name.as_str(), self.region.as_str(), self.country.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    #[serde(default)]
    pub last_updated_epoch: Option<i64>,
    #[serde(default)]
    pub last_updated: String,
    pub temp_c: f64,
    #[serde(default)]
    pub temp_f: f64,
    #[serde(default)]
    pub feelslike_c: f64,
    #[serde(default)]
    pub feelslike_f: f64,
    pub is_day: u8,
    pub condition: Condition,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_mph: f64,
    #[serde(default)]
    pub wind_degree: u16,
    #[serde(default)]
    pub wind_dir: String,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub precip_mm: f64,
}

impl Current {
    pub fn is_day(&self) -> bool {
        self.is_day == 1
    }
}

/// Result of a `current.json` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourEntry {
    #[serde(default)]
    pub time_epoch: i64,
    /// Location-local time, `"YYYY-MM-DD HH:MM"`.
    pub time: String,
    pub temp_c: f64,
    #[serde(default)]
    pub humidity: u8,
    #[serde(default)]
    pub wind_kph: f64,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub is_day: u8,
    pub condition: Condition,
}

impl HourEntry {
    /// The `HH:MM` part of [`HourEntry::time`].
    pub fn time_of_day(&self) -> &str {
        self.time.split(' ').nth(1).unwrap_or(self.time.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub hour: Vec<HourEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

/// Result of a `forecast.json` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub location: Location,
    pub forecast: Forecast,
}

impl ForecastSnapshot {
    /// Hourly entries of the first forecast day; the chart only uses those.
    pub fn first_day_hours(&self) -> &[HourEntry] {
        self.forecast.forecastday.first().map(|day| day.hour.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_payload() {
        let json = serde_json::json!({
            "location": {
                "name": "London", "region": "City of London, Greater London",
                "country": "United Kingdom", "lat": 51.52, "lon": -0.11,
                "tz_id": "Europe/London", "localtime_epoch": 1714567500,
                "localtime": "2024-05-01 13:45"
            },
            "current": {
                "last_updated_epoch": 1714567500, "last_updated": "2024-05-01 13:45",
                "temp_c": 14.0, "temp_f": 57.2, "is_day": 1,
                "condition": {
                    "text": "Heavy rain",
                    "icon": "//cdn.weatherapi.com/weather/64x64/day/308.png",
                    "code": 1195
                },
                "wind_mph": 9.4, "wind_kph": 15.1, "wind_degree": 230, "wind_dir": "SW",
                "humidity": 88, "feelslike_c": 12.6, "feelslike_f": 54.7, "precip_mm": 3.2,
                "uv": 3.0
            }
        });

        let snapshot: WeatherSnapshot = serde_json::from_value(json).unwrap();

        assert_eq!(
            snapshot.location.display_name(),
            "London, City of London, Greater London, United Kingdom"
        );
        assert_eq!(snapshot.current.condition.code, 1195);
        assert!(snapshot.current.is_day());
        assert_eq!(
            snapshot.current.condition.icon_url(),
            "https://cdn.weatherapi.com/weather/64x64/day/308.png"
        );
    }

    #[test]
    fn time_of_day_takes_the_clock_part() {
        let hour = HourEntry {
            time_epoch: 0,
            time: "2024-05-01 07:00".into(),
            temp_c: 10.0,
            humidity: 80,
            wind_kph: 5.0,
            precip_mm: 0.0,
            is_day: 1,
            condition: Condition { text: "Sunny".into(), icon: String::new(), code: 1000 },
        };
        assert_eq!(hour.time_of_day(), "07:00");
    }

    #[test]
    fn coordinates_query_form() {
        assert_eq!(Coordinates::new(-6.2, 106.8).as_query(), "-6.2,106.8");
    }
}
