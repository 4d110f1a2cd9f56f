//! Location service: tracked cities combined with live weather.

use std::sync::Arc;

use chrono::Utc;
use skycast_weather::{Forecast, WeatherError, WeatherSource};
use thiserror::Error;

use crate::client::LocationClient;
use crate::location::{
    Location, LocationPatch, NewLocation, NewSnapshot, SyncOutcome, WeatherSnapshot,
};
use crate::store::StoreError;

/// Errors surfaced by [`LocationService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Location not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Validation(message) => Self::Validation(message),
            other => Self::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Cloneable service shared by every request handler.
#[derive(Clone)]
pub struct LocationService {
    store: LocationClient,
    weather: Arc<dyn WeatherSource>,
}

impl LocationService {
    pub fn new(store: LocationClient, weather: Arc<dyn WeatherSource>) -> Self {
        Self { store, weather }
    }

    /// Resolve a city through the weather provider and start tracking it.
    ///
    /// Nothing is persisted when the lookup fails. Duplicate cities are allowed.
    pub async fn add(&self, city: &str) -> ServiceResult<Location> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ServiceError::Validation("City is required".into()));
        }

        let current = self.weather.current_weather(city).await?;

        let location = self
            .store
            .create(NewLocation {
                city: current.name,
                country: current.country,
                lat: current.lat,
                lon: current.lon,
                is_favorite: false,
                last_synced: Some(Utc::now()),
            })
            .await?;

        tracing::info!("Added location {} ({})", location.city, location.id);
        Ok(location)
    }

    pub async fn list(&self) -> ServiceResult<Vec<Location>> {
        let locations = self.store.list().await?;
        tracing::debug!("Listed {} locations", locations.len());
        Ok(locations)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Location> {
        tracing::debug!("Fetching location {}", id);
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    pub async fn patch(&self, id: &str, patch: LocationPatch) -> ServiceResult<Location> {
        let location = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        tracing::info!("Updated location {}", id);
        Ok(location)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        if !self.store.delete(id).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }

        tracing::info!("Deleted location {}", id);
        Ok(())
    }

    /// Re-fetch current weather for a tracked city and record a snapshot.
    ///
    /// The stored id and city never change. A failed lookup leaves the
    /// record untouched.
    pub async fn sync(&self, id: &str) -> ServiceResult<SyncOutcome> {
        let location = self.get(id).await?;
        let current = self.weather.current_weather(&location.city).await?;

        let outcome = self
            .store
            .record_sync(NewSnapshot {
                location_id: location.id,
                temperature: current.temp,
                humidity: current.humidity,
                description: current.description,
            })
            .await?;

        tracing::info!(
            "Synced {}: {:.1}° {}",
            outcome.location.city,
            outcome.snapshot.temperature,
            outcome.snapshot.description
        );
        Ok(outcome)
    }

    pub async fn forecast(&self, id: &str) -> ServiceResult<Forecast> {
        let location = self.get(id).await?;
        let forecast = self.weather.forecast(&location.city).await?;
        tracing::debug!(
            "Forecast for {}: {} samples",
            location.city,
            forecast.list.len()
        );
        Ok(forecast)
    }

    /// Stored readings for a location, newest first.
    pub async fn snapshots(&self, id: &str) -> ServiceResult<Vec<WeatherSnapshot>> {
        let location = self.get(id).await?;
        Ok(self.store.snapshots(&location.id).await?)
    }
}
