//! Weather service for Skycast
//!
//! Provides current conditions and 5-day/3-hour forecasts from the
//! OpenWeatherMap API, plus helpers for presenting forecast data.

pub mod grouping;
pub mod provider;
pub mod types;

pub use grouping::{group_by_day, DayGroup, MAX_FORECAST_DAYS};
pub use provider::{WeatherProvider, WeatherSource};
pub use types::*;
