//! Plain-text rendering of the dashboard.

use std::fmt::Write;

use chrono::Local;
use skycast_core::{Location, Units, WeatherSnapshot};
use skycast_weather::{group_by_day, Forecast, ForecastSample};

use crate::dashboard::Dashboard;

const EMPTY_STATE: &str = "No cities added yet. Use `add <city>` to get started!";

/// Temperature rounded half away from zero.
pub fn format_temperature(temp: f64, units: Units) -> String {
    format!("{}{}", temp.round() as i64, units.temperature_symbol())
}

/// One location card: name, coordinates and last sync time.
pub fn render_location(position: usize, location: &Location) -> String {
    let mut out = String::new();

    let _ = write!(out, "{}. {}", position, location.city);
    if let Some(country) = &location.country {
        let _ = write!(out, " ({})", country);
    }
    if location.is_favorite {
        out.push_str(" ★");
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "   Location: {:.2}°, {:.2}°",
        location.lat, location.lon
    );

    if let Some(synced) = location.last_synced {
        let _ = writeln!(
            out,
            "   Last synced: {}",
            synced.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    out
}

pub fn render_locations(locations: &[Location]) -> String {
    if locations.is_empty() {
        return format!("{}\n", EMPTY_STATE);
    }

    locations
        .iter()
        .enumerate()
        .map(|(index, location)| render_location(index + 1, location))
        .collect()
}

fn render_sample(sample: &ForecastSample, forecast: &Forecast, units: Units) -> String {
    let time = sample
        .time()
        .map(|t| t.with_timezone(&forecast.city.offset()).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string());

    format!(
        "     {}  {:>5}  {} {}  {}%",
        time,
        format_temperature(sample.temp(), units),
        sample.condition().emoji(),
        sample.description(),
        sample.humidity()
    )
}

/// Forecast grouped by day in the city's timezone.
pub fn render_forecast(forecast: &Forecast, units: Units) -> String {
    let mut out = String::from("   5-Day Weather Forecast\n");

    for day in group_by_day(forecast) {
        let _ = writeln!(out, "   {}", day.date.format("%a %d %b %Y"));
        for sample in &day.samples {
            out.push_str(&render_sample(sample, forecast, units));
            out.push('\n');
        }
    }

    out
}

/// Sync history, newest first.
pub fn render_snapshots(snapshots: &[WeatherSnapshot], units: Units) -> String {
    if snapshots.is_empty() {
        return "No readings recorded yet. Use `sync <n>` to take one.\n".to_string();
    }

    snapshots
        .iter()
        .map(|s| {
            format!(
                "   {}  {:>5}  {}%  {}\n",
                s.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                format_temperature(s.temperature, units),
                s.humidity,
                s.description
            )
        })
        .collect()
}

/// Full screen: header, error banner, cards and the expanded forecast.
pub fn render(dashboard: &Dashboard) -> String {
    let mut out = String::from("Skycast - track weather across multiple cities\n\n");

    if let Some(error) = &dashboard.error {
        let _ = writeln!(out, "! {}\n", error);
    }

    if dashboard.locations.is_empty() {
        let _ = writeln!(out, "{}", EMPTY_STATE);
        return out;
    }

    for (index, location) in dashboard.locations.iter().enumerate() {
        out.push_str(&render_location(index + 1, location));

        if dashboard.expanded.as_deref() == Some(location.id.as_str()) {
            if let Some(forecast) = dashboard.forecasts.get(&location.id) {
                out.push_str(&render_forecast(forecast, dashboard.units));
            }
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use skycast_weather::{ForecastCity, SampleMain, SampleWeather};

    fn sample(dt: i64, temp: f64, description: &str) -> ForecastSample {
        ForecastSample {
            dt,
            main: SampleMain {
                temp,
                humidity: 64,
                ..SampleMain::default()
            },
            weather: vec![SampleWeather {
                description: description.into(),
                ..SampleWeather::default()
            }],
            ..ForecastSample::default()
        }
    }

    fn location() -> Location {
        let created = Utc.with_ymd_and_hms(2026, 1, 30, 12, 0, 0).unwrap();
        Location {
            id: "abc".into(),
            city: "Toronto".into(),
            country: Some("CA".into()),
            lat: 43.70011,
            lon: -79.4163,
            is_favorite: false,
            last_synced: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_format_temperature_rounds() {
        assert_eq!(format_temperature(14.5, Units::Metric), "15°C");
        assert_eq!(format_temperature(-2.4, Units::Metric), "-2°C");
        assert_eq!(format_temperature(70.2, Units::Imperial), "70°F");
    }

    #[test]
    fn test_render_location_card() {
        let text = render_location(1, &location());
        assert!(text.starts_with("1. Toronto (CA)\n"));
        assert!(text.contains("Location: 43.70°, -79.42°"));
        assert!(!text.contains("Last synced"));
    }

    #[test]
    fn test_render_empty_list() {
        assert_eq!(render_locations(&[]), format!("{}\n", EMPTY_STATE));
    }

    #[test]
    fn test_render_forecast_uses_city_time() {
        // 2026-01-30 12:00 UTC is 07:00 in Toronto (UTC-5)
        let noon = Utc.with_ymd_and_hms(2026, 1, 30, 12, 0, 0).unwrap().timestamp();
        let forecast = Forecast {
            city: ForecastCity {
                name: "Toronto".into(),
                country: Some("CA".into()),
                timezone: -18_000,
                ..ForecastCity::default()
            },
            list: vec![
                sample(noon, -3.6, "light snow"),
                sample(noon + 10_800, -1.2, "overcast clouds"),
            ],
            ..Forecast::default()
        };

        let text = render_forecast(&forecast, Units::Metric);
        assert!(text.contains("Fri 30 Jan 2026"));
        assert!(text.contains("07:00"));
        assert!(text.contains("10:00"));
        assert!(text.contains("-4°C"));
        assert!(text.contains("❄️ light snow"));
        assert!(text.contains("64%"));
    }
}
