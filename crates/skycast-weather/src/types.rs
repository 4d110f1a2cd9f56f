use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use skycast_core::NetworkError;

pub use skycast_core::Units;

/// Weather condition categories derived from provider descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Thunderstorm,
    Drizzle,
    Fog,
    Wind,
    #[default]
    Unknown,
}

impl WeatherCondition {
    /// Classify a free-text description such as "light rain" or "overcast clouds".
    ///
    /// Keywords are checked in a fixed order, so "thunderstorm with light rain"
    /// classifies as rain.
    pub fn from_description(description: &str) -> Self {
        let desc = description.to_lowercase();
        if desc.contains("clear") {
            Self::Clear
        } else if desc.contains("cloud") {
            Self::Cloudy
        } else if desc.contains("rain") {
            Self::Rain
        } else if desc.contains("snow") {
            Self::Snow
        } else if desc.contains("thunder") {
            Self::Thunderstorm
        } else if desc.contains("drizzle") {
            Self::Drizzle
        } else if desc.contains("mist") || desc.contains("fog") {
            Self::Fog
        } else if desc.contains("wind") {
            Self::Wind
        } else {
            Self::Unknown
        }
    }

    /// Display glyph for the condition
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::Cloudy => "☁️",
            Self::Rain => "🌧️",
            Self::Snow => "❄️",
            Self::Thunderstorm => "⛈️",
            Self::Drizzle => "🌦️",
            Self::Fog => "🌫️",
            Self::Wind => "💨",
            Self::Unknown => "🌤️",
        }
    }
}

/// Current conditions for a resolved city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Canonical city name as resolved by the provider
    pub name: String,
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub temp: f64,
    pub humidity: u8,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// City metadata attached to a forecast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Offset from UTC in seconds
    #[serde(default)]
    pub timezone: i32,
    /// Provider fields passed through untouched (`id`, `coord`, `sunrise`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastCity {
    /// The city's UTC offset, falling back to UTC when out of range.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone).unwrap_or_else(|| Utc.fix())
    }
}

/// `main` block of a forecast sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleMain {
    pub temp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    pub humidity: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a sample's `weather` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleWeather {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One 3-hour forecast sample, kept in the provider's layout.
///
/// Fields Skycast does not read (`dt_txt`, `wind`, `pop`, ...) survive a
/// decode/encode cycle in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Sample time, seconds since the Unix epoch (UTC)
    pub dt: i64,
    pub main: SampleMain,
    #[serde(default)]
    pub weather: Vec<SampleWeather>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForecastSample {
    /// Sample time in UTC, or `None` for an out-of-range timestamp.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.dt, 0)
    }

    pub fn temp(&self) -> f64 {
        self.main.temp
    }

    pub fn humidity(&self) -> u8 {
        self.main.humidity
    }

    /// Description of the first weather entry, empty when there is none.
    pub fn description(&self) -> &str {
        self.weather
            .first()
            .map(|w| w.description.as_str())
            .unwrap_or_default()
    }

    pub fn condition(&self) -> WeatherCondition {
        WeatherCondition::from_description(self.description())
    }
}

/// 5-day forecast in 3-hour steps, ordered by `dt`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: ForecastCity,
    pub list: Vec<ForecastSample>,
    /// Envelope fields such as `cod` and `cnt`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Provider could not be reached (connect failure, timeout).
    #[error("Weather API unavailable")]
    Unavailable(#[source] NetworkError),
    /// Provider answered with an error; carries the provider's own message.
    #[error("{0}")]
    Upstream(String),
    #[error("Invalid weather response: {0}")]
    Parse(String),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl WeatherError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
