//! Dashboard view state.
//!
//! Holds what the screen shows and performs user actions against the API.
//! Failures never propagate out of an action; they land in `error` for the
//! view to display.

use std::collections::HashMap;

use skycast_core::{Location, Units};
use skycast_weather::Forecast;

use crate::api::{ApiClient, ApiError};

pub struct Dashboard {
    api: ApiClient,
    pub units: Units,
    pub locations: Vec<Location>,
    /// Cached forecasts keyed by location id
    pub forecasts: HashMap<String, Forecast>,
    /// Location whose forecast is shown
    pub expanded: Option<String>,
    pub error: Option<String>,
}

impl Dashboard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            units: Units::default(),
            locations: Vec::new(),
            forecasts: HashMap::new(),
            expanded: None,
            error: None,
        }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn fail(&mut self, context: &str, e: ApiError) {
        tracing::warn!("{}: {}", context, e);
        self.error = Some(e.user_message());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Reload the location list.
    pub async fn refresh(&mut self) {
        match self.api.list_locations().await {
            Ok(locations) => {
                self.error = None;
                self.locations = locations;
            }
            Err(e) => self.fail("Failed to load locations", e),
        }
    }

    /// Track a city. Blank input is ignored.
    pub async fn add_city(&mut self, input: &str) {
        let city = input.trim();
        if city.is_empty() {
            return;
        }

        self.error = None;
        match self.api.add_location(city).await {
            Ok(location) => {
                tracing::info!("Added {}", location.city);
                self.refresh().await;
            }
            Err(e) => self.fail("Failed to add location", e),
        }
    }

    /// Stop tracking a location and drop its cached forecast.
    pub async fn delete(&mut self, id: &str) {
        if let Err(e) = self.api.delete_location(id).await {
            self.fail("Failed to delete location", e);
            return;
        }

        self.forecasts.remove(id);
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
        }
        self.refresh().await;
    }

    /// Re-fetch current weather, then reload the list and the forecast.
    pub async fn sync(&mut self, id: &str) {
        if let Err(e) = self.api.sync_location(id).await {
            self.fail("Failed to sync weather", e);
            return;
        }

        self.refresh().await;
        self.load_forecast(id).await;
    }

    /// Expand a location's forecast, or collapse it if already shown.
    ///
    /// The forecast is fetched only when not cached.
    pub async fn toggle_forecast(&mut self, id: &str) {
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
            return;
        }

        self.expanded = Some(id.to_string());
        if !self.forecasts.contains_key(id) {
            self.load_forecast(id).await;
        }
    }

    async fn load_forecast(&mut self, id: &str) {
        match self.api.forecast(id).await {
            Ok(forecast) => {
                self.forecasts.insert(id.to_string(), forecast);
            }
            Err(e) => self.fail("Failed to load forecast", e),
        }
    }

    /// Location at a 1-based position in the list.
    pub fn location_at(&self, position: usize) -> Option<&Location> {
        position
            .checked_sub(1)
            .and_then(|index| self.locations.get(index))
    }
}
