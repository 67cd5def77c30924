use anyhow::bail;
use std::fmt::{self, Write};
use tracing::{info, warn};
use weather_core::{
    Clock, Config, ForecastSnapshot, Query, SystemClock, WeatherProvider, WeatherSnapshot,
    current::format_local_date,
    forecast::{ForecastChart, WIDE_WINDOW},
    provider::provider_from_config,
    select_background,
};

use crate::{cli::LocationArgs, ui::theme::condition_glyph};

/// Print current conditions and the forecast window without the full-screen UI.
pub async fn run(config: &Config, args: &LocationArgs) -> anyhow::Result<()> {
    let api = provider_from_config(config)?;

    let query = match &args.city {
        Some(city) => Query::City(city.clone()),
        None => match args.geolocator(config, api.clone()).locate().await {
            Ok(coords) => Query::Coords(coords),
            Err(err) => match &config.location.default_city {
                Some(city) => {
                    warn!(error = %err, %city, "location unavailable, using default city");
                    Query::City(city.clone())
                }
                None => bail!(
                    "Could not determine your location: {err}\n\
                     Hint: pass --city or set location.default_city."
                ),
            },
        },
    };

    info!(%query, "fetching weather");
    let weather = api.current(&query).await?;
    let forecast = api.forecast(weather.location.coordinates()).await?;

    print!("{}", report(&weather, &forecast, &SystemClock)?);
    Ok(())
}

fn report(
    weather: &WeatherSnapshot,
    forecast: &ForecastSnapshot,
    clock: &dyn Clock,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_current(&mut out, weather, clock)?;

    let chart = ForecastChart::build(forecast.first_day_hours(), clock.hour(), WIDE_WINDOW);
    if !chart.is_empty() {
        writeln!(out)?;
        write_window(&mut out, &chart)?;
    }

    Ok(out)
}

fn write_current(
    out: &mut impl Write,
    weather: &WeatherSnapshot,
    clock: &dyn Clock,
) -> fmt::Result {
    let now = &weather.current;

    writeln!(out, "{}", weather.location.display_name())?;
    if let Ok(date) = format_local_date(&weather.location.localtime) {
        writeln!(out, "{date}")?;
    }
    writeln!(
        out,
        "{} {:.1}°C, {} (feels like {:.1}°C)",
        condition_glyph(now.condition.code, now.is_day()),
        now.temp_c,
        now.condition.text,
        now.feelslike_c
    )?;
    writeln!(
        out,
        "Wind {:.1} km/h {} | Humidity {}%",
        now.wind_kph, now.wind_dir, now.humidity
    )?;

    let background = select_background(
        now.condition.code,
        now.is_day(),
        Some(&now.condition.text),
        clock.hour(),
    );
    writeln!(out, "Backdrop: {background}")
}

fn write_window(out: &mut impl Write, chart: &ForecastChart) -> fmt::Result {
    writeln!(out, "{:<7}{:>8}{:>10}{:>12}", "Hour", "Temp", "Humidity", "Wind")?;
    for p in &chart.points {
        writeln!(
            out,
            "{:<7}{:>8}{:>10}{:>12}  {}",
            p.label,
            format!("{:.1}°C", p.temperature),
            format!("{:.0}%", p.humidity),
            format!("{:.1} km/h", p.wind_speed),
            condition_glyph(p.condition_code, p.is_day),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::FixedClock;

    fn weather() -> WeatherSnapshot {
        serde_json::from_value(serde_json::json!({
            "location": {
                "name": "Bergen", "region": "Hordaland", "country": "Norway",
                "lat": 60.39, "lon": 5.32, "tz_id": "Europe/Oslo",
                "localtime": "2024-05-01 21:10"
            },
            "current": {
                "temp_c": 7.0, "temp_f": 44.6, "is_day": 0,
                "condition": { "text": "Moderate rain", "icon": "", "code": 1189 },
                "wind_kph": 14.4, "wind_dir": "SW", "humidity": 87, "feelslike_c": 4.9
            }
        }))
        .unwrap()
    }

    fn forecast() -> ForecastSnapshot {
        let hours: Vec<_> = (0..24)
            .map(|h| {
                serde_json::json!({
                    "time_epoch": 1714514400 + h * 3600,
                    "time": format!("2024-05-01 {h:02}:00"),
                    "temp_c": 6.0, "humidity": 80, "wind_kph": 12.0, "precip_mm": 0.4,
                    "is_day": 0,
                    "condition": { "text": "Clear", "icon": "", "code": 1000 }
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "location": {
                "name": "Bergen", "lat": 60.39, "lon": 5.32, "localtime": "2024-05-01 21:10"
            },
            "forecast": { "forecastday": [{ "date": "2024-05-01", "hour": hours }] }
        }))
        .unwrap()
    }

    #[test]
    fn report_lists_conditions_and_window() {
        let text = report(&weather(), &forecast(), &FixedClock::at(21, 10)).unwrap();

        assert!(text.starts_with("Bergen, Hordaland, Norway\n"));
        assert!(text.contains("Wednesday | 1 May 2024"));
        assert!(text.contains("7.0°C, Moderate rain"));
        assert!(text.contains("Backdrop: rain"));
        // 20:00 through 23:00: one hour back, clamped at the end of the day.
        assert!(text.contains("20:00"));
        assert!(text.contains("23:00"));
        assert!(!text.contains("19:00"));
        assert_eq!(text.lines().filter(|l| l.contains("km/h  ☾")).count(), 4);
    }

    #[test]
    fn report_without_forecast_hours_has_no_table() {
        let mut empty = forecast();
        empty.forecast.forecastday.clear();

        let text = report(&weather(), &empty, &FixedClock::at(21, 10)).unwrap();
        assert!(text.ends_with("Backdrop: rain\n"));
        assert!(!text.contains("Hour"));
    }
}
