//! Creation and validation of location and snapshot records.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use skycast_core::location::{Location, LocationPatch, WeatherSnapshot};

use crate::store::{StoreError, StoreResult};

/// Fields supplied when creating a location.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLocation {
    pub city: String,
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub is_favorite: bool,
    pub last_synced: Option<DateTime<Utc>>,
}

impl NewLocation {
    /// Validate before persisting.
    ///
    /// # Errors
    /// Returns `StoreError::Validation` for a blank city or out-of-range coordinates.
    pub fn validate(&self) -> StoreResult<()> {
        validate_city(&self.city)?;
        validate_coordinates(Some(self.lat), Some(self.lon))
    }

    /// Build the stored record with the given id and timestamps.
    pub fn into_location(self, id: String, now: DateTime<Utc>) -> Location {
        Location {
            id,
            city: self.city,
            country: self.country,
            lat: self.lat,
            lon: self.lon,
            is_favorite: self.is_favorite,
            last_synced: self.last_synced,
            created_at: now,
            updated_at: now,
        }
    }
}

/// # Errors
/// Returns `StoreError::Validation` for a blank city or out-of-range coordinates.
pub fn validate_patch(patch: &LocationPatch) -> StoreResult<()> {
    if let Some(city) = &patch.city {
        validate_city(city)?;
    }
    validate_coordinates(patch.lat, patch.lon)
}

/// Fields supplied when recording a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSnapshot {
    pub location_id: String,
    pub temperature: f64,
    pub humidity: u8,
    pub description: String,
}

impl NewSnapshot {
    pub fn into_snapshot(self, id: String, now: DateTime<Utc>) -> WeatherSnapshot {
        WeatherSnapshot {
            id,
            location: self.location_id,
            temperature: self.temperature,
            humidity: self.humidity,
            description: self.description,
            timestamp: now,
        }
    }
}

/// Result of a sync: the refreshed record and the reading that was stored.
///
/// `location.last_synced` always equals `snapshot.timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub location: Location,
    pub snapshot: WeatherSnapshot,
}

/// Generate a new record identifier.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn validate_city(city: &str) -> StoreResult<()> {
    if city.trim().is_empty() {
        return Err(StoreError::validation("City cannot be empty"));
    }
    Ok(())
}

fn validate_coordinates(lat: Option<f64>, lon: Option<f64>) -> StoreResult<()> {
    if let Some(lat) = lat {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(StoreError::validation(format!("Latitude out of range: {}", lat)));
        }
    }
    if let Some(lon) = lon {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(StoreError::validation(format!("Longitude out of range: {}", lon)));
        }
    }
    Ok(())
}
