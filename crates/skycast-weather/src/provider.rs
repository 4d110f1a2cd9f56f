//! OpenWeatherMap client.
//!
//! Current-weather payloads are decoded into private wire structs and
//! converted into [`CurrentConditions`]. Forecasts keep the provider's
//! layout and are only validated and ordered.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use skycast_core::ReqwestErrorExt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::types::{CurrentConditions, Forecast, Units, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "Skycast/0.1.0";

/// Source of weather data for a city name.
///
/// Implemented by [`WeatherProvider`]; the location service depends on this
/// trait so it can be exercised without network access.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Resolve a city and fetch its current conditions.
    async fn current_weather(&self, city: &str) -> Result<CurrentConditions, WeatherError>;

    /// Fetch the 5-day/3-hour forecast for a city.
    async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct OwmCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    description: String,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Default, Deserialize)]
struct OwmSys {
    #[serde(default)]
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    name: String,
    coord: OwmCoord,
    #[serde(default)]
    sys: OwmSys,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
}

/// Error body returned by the provider, e.g. `{"cod":"404","message":"city not found"}`
#[derive(Debug, Deserialize)]
struct OwmErrorBody {
    message: String,
}

fn validate_coord(coord: &OwmCoord) -> Result<(), WeatherError> {
    if !(-90.0..=90.0).contains(&coord.lat) || !(-180.0..=180.0).contains(&coord.lon) {
        return Err(WeatherError::parse(format!(
            "coordinates out of range: {}, {}",
            coord.lat, coord.lon
        )));
    }
    Ok(())
}

impl TryFrom<OwmCurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(body: OwmCurrentResponse) -> Result<Self, Self::Error> {
        validate_coord(&body.coord)?;

        if body.name.trim().is_empty() {
            return Err(WeatherError::parse("missing city name"));
        }

        let weather = body
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::parse("missing weather description"))?;

        Ok(Self {
            name: body.name,
            country: body.sys.country.filter(|c| !c.is_empty()),
            lat: body.coord.lat,
            lon: body.coord.lon,
            temp: body.main.temp,
            humidity: body.main.humidity,
            description: weather.description,
            icon: weather.icon,
        })
    }
}

/// Check every sample carries a weather entry and order samples by `dt`.
fn validate_forecast(mut forecast: Forecast) -> Result<Forecast, WeatherError> {
    if let Some(sample) = forecast.list.iter().find(|s| s.weather.is_empty()) {
        return Err(WeatherError::parse(format!(
            "sample {} has no weather entry",
            sample.dt
        )));
    }

    forecast.list.sort_by_key(|sample| sample.dt);
    Ok(forecast)
}

/// OpenWeatherMap API client
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: Url,
    api_key: String,
    units: Units,
}

impl WeatherProvider {
    /// Create a client against the public OpenWeatherMap endpoint.
    pub fn new(api_key: impl Into<String>, units: Units) -> Result<Self, WeatherError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, units)
    }

    /// Create a client against a custom base URL (used for tests and proxies).
    pub fn with_base_url(
        base_url: &str,
        api_key: impl Into<String>,
        units: Units,
    ) -> Result<Self, WeatherError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WeatherError::parse(format!("invalid base URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key: api_key.into(),
            units,
        })
    }

    pub fn units(&self) -> Units {
        self.units
    }

    fn endpoint(&self, name: &str) -> Result<Url, WeatherError> {
        self.base_url
            .join(&format!("data/2.5/{}", name))
            .map_err(|e| WeatherError::parse(format!("invalid endpoint {}: {}", name, e)))
    }

    /// Issue a GET for `endpoint` and map transport and provider failures.
    async fn get(&self, endpoint: &str, city: &str) -> Result<Response, WeatherError> {
        let url = self.endpoint(endpoint)?;

        tracing::debug!("Requesting {} for {}", endpoint, city);

        let response = self
            .client
            .get(url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                let err = e.without_url().into_network_error();
                tracing::warn!("Weather API request failed: {}", err);
                WeatherError::Unavailable(err)
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OwmErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or_else(|_| format!("Weather API returned {}", status));
            tracing::info!("Weather API rejected {} for {}: {}", endpoint, city, message);
            return Err(WeatherError::Upstream(message));
        }

        Ok(response)
    }
}

#[async_trait]
impl WeatherSource for WeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        let body: OwmCurrentResponse = self
            .get("weather", city)
            .await?
            .json()
            .await
            .map_err(|e| WeatherError::parse(e.to_string()))?;

        let conditions = CurrentConditions::try_from(body)?;
        tracing::info!(
            "Resolved {} to {} ({:.2}, {:.2})",
            city,
            conditions.name,
            conditions.lat,
            conditions.lon
        );
        Ok(conditions)
    }

    async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let body: Forecast = self
            .get("forecast", city)
            .await?
            .json()
            .await
            .map_err(|e| WeatherError::parse(e.to_string()))?;

        let forecast = validate_forecast(body)?;
        tracing::debug!("Fetched {} forecast samples for {}", forecast.list.len(), city);
        Ok(forecast)
    }
}
