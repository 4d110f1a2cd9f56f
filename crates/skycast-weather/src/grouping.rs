//! Group forecast samples into calendar days for display.

use chrono::NaiveDate;

use crate::types::{Forecast, ForecastSample};

/// Maximum number of days shown for a forecast
pub const MAX_FORECAST_DAYS: usize = 5;

/// Forecast samples sharing one calendar date in the city's local time
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub samples: Vec<ForecastSample>,
}

/// Group samples by local calendar date, keeping the order in which dates
/// first appear and truncating to [`MAX_FORECAST_DAYS`] groups.
///
/// Samples with an unrepresentable timestamp are skipped.
pub fn group_by_day(forecast: &Forecast) -> Vec<DayGroup> {
    let offset = forecast.city.offset();
    let mut groups: Vec<DayGroup> = Vec::new();

    for sample in &forecast.list {
        let Some(time) = sample.time() else {
            tracing::debug!("Skipping forecast sample with invalid dt {}", sample.dt);
            continue;
        };
        let date = time.with_timezone(&offset).date_naive();

        match groups.iter_mut().find(|group| group.date == date) {
            Some(group) => group.samples.push(sample.clone()),
            None => groups.push(DayGroup {
                date,
                samples: vec![sample.clone()],
            }),
        }
    }

    groups.truncate(MAX_FORECAST_DAYS);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ForecastCity, SampleMain, SampleWeather};

    // 2024-03-01T00:00:00Z
    const MARCH_1: i64 = 1_709_251_200;
    const THREE_HOURS: i64 = 3 * 3600;

    fn sample(dt: i64) -> ForecastSample {
        ForecastSample {
            dt,
            main: SampleMain {
                temp: 10.0,
                humidity: 50,
                ..SampleMain::default()
            },
            weather: vec![SampleWeather {
                description: "clear sky".into(),
                ..SampleWeather::default()
            }],
            ..ForecastSample::default()
        }
    }

    fn forecast(timezone: i32, samples: Vec<ForecastSample>) -> Forecast {
        Forecast {
            city: ForecastCity {
                name: "Testville".into(),
                timezone,
                ..ForecastCity::default()
            },
            list: samples,
            ..Forecast::default()
        }
    }

    #[test]
    fn test_forty_samples_make_five_days() {
        let samples = (0..40).map(|i| sample(MARCH_1 + i * THREE_HOURS)).collect();
        let groups = group_by_day(&forecast(0, samples));

        assert_eq!(groups.len(), 5);
        for (day, group) in groups.iter().enumerate() {
            assert_eq!(group.samples.len(), 8);
            assert_eq!(
                group.date,
                NaiveDate::from_ymd_opt(2024, 3, 1 + day as u32).unwrap()
            );
            for s in &group.samples {
                assert_eq!(s.time().unwrap().date_naive(), group.date);
            }
        }

        let dates: Vec<_> = groups.iter().map(|g| g.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_truncates_to_five_days() {
        // Starting mid-day spreads 40 samples over 6 dates
        let start = MARCH_1 + 12 * 3600;
        let samples = (0..40).map(|i| sample(start + i * THREE_HOURS)).collect();
        let groups = group_by_day(&forecast(0, samples));

        assert_eq!(groups.len(), MAX_FORECAST_DAYS);
        assert_eq!(groups[0].samples.len(), 4);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_uses_city_timezone() {
        // 22:00 UTC on March 1 is already March 2 in UTC+3
        let samples = vec![sample(MARCH_1 + 21 * 3600), sample(MARCH_1 + 22 * 3600)];
        let groups = group_by_day(&forecast(3 * 3600, samples));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(groups[0].samples.len(), 2);
    }

    #[test]
    fn test_empty_forecast() {
        assert!(group_by_day(&forecast(0, Vec::new())).is_empty());
    }

    #[test]
    fn test_skips_invalid_timestamp() {
        let samples = vec![sample(i64::MAX), sample(MARCH_1)];
        let groups = group_by_day(&forecast(0, samples));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].samples.len(), 1);
    }
}
