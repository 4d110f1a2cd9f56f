//! Location and weather snapshot records as they appear on the wire.
//!
//! Shared by the stores, the HTTP API and its clients. Creation and
//! validation live with the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub city: String,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub last_synced: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Merge a patch. Only present fields change; `updated_at` is always bumped.
    pub fn apply(&mut self, patch: LocationPatch, now: DateTime<Utc>) {
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(country) = patch.country {
            self.country = Some(country);
        }
        if let Some(lat) = patch.lat {
            self.lat = lat;
        }
        if let Some(lon) = patch.lon {
            self.lon = lon;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if let Some(last_synced) = patch.last_synced {
            self.last_synced = Some(last_synced);
        }
        self.updated_at = now;
    }
}

/// Partial update; `None` fields are left untouched.
///
/// There is no id field: identifiers are immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
}

/// A point-in-time weather reading for a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Id of the location this reading belongs to
    pub location: String,
    pub temperature: f64,
    pub humidity: u8,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}
