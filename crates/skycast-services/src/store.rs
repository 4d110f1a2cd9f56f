//! Location storage backend trait and error types.
//!
//! This module defines the `LocationStore` trait that abstracts over the
//! storage implementations (JSON file, SQLite) and resolves store URLs.

use skycast_core::{AppError, DatabaseError};
use thiserror::Error;

use crate::json_store::JsonFileStore;
use crate::location::{
    Location, LocationPatch, NewLocation, NewSnapshot, SyncOutcome, WeatherSnapshot,
};
use crate::sqlite_store::SqliteLocationStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Referenced location was not found.
    #[error("Location not found: {0}")]
    NotFound(String),

    /// Validation error (e.g., empty city, coordinates out of range).
    #[error("{0}")]
    Validation(String),

    /// Underlying database or file failure.
    #[error("Storage error: {0}")]
    Database(#[from] DatabaseError),

    /// The store URL names a backend we do not support.
    #[error("Unsupported store URL: {0}")]
    UnsupportedUrl(String),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// Create a not found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Other(e) => AppError::Other(e),
            other => AppError::service(other.to_string()),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for location storage backends.
///
/// Absent targets are reported as `None`/`false` rather than errors.
///
/// Note: Implementations don't need to be Sync - the LocationClient wrapper
/// serializes access via Mutex.
pub trait LocationStore: Send {
    /// List all locations in creation order.
    fn list(&self) -> StoreResult<Vec<Location>>;

    /// Get a location by ID.
    ///
    /// Returns `None` if the location doesn't exist.
    fn get(&self, id: &str) -> StoreResult<Option<Location>>;

    /// Create a location, assigning its id and timestamps.
    ///
    /// # Errors
    /// Returns `StoreError::Validation` if the fields are invalid.
    fn create(&self, location: NewLocation) -> StoreResult<Location>;

    /// Merge a patch into an existing location and bump `updated_at`.
    ///
    /// Returns `None` if the location doesn't exist.
    ///
    /// # Errors
    /// Returns `StoreError::Validation` if the patch is invalid.
    fn update(&self, id: &str, patch: LocationPatch) -> StoreResult<Option<Location>>;

    /// Delete a location and its snapshots.
    ///
    /// Returns `false` if the location doesn't exist.
    fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Record a weather reading and set the location's `last_synced` to its
    /// timestamp. Either both writes land or neither does.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the location doesn't exist.
    fn record_sync(&self, snapshot: NewSnapshot) -> StoreResult<SyncOutcome>;

    /// Readings for a location, newest first.
    fn snapshots(&self, location_id: &str) -> StoreResult<Vec<WeatherSnapshot>>;

    /// Number of stored locations.
    fn count(&self) -> StoreResult<usize> {
        Ok(self.list()?.len())
    }
}

/// Which backend a store URL resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Json(String),
    Sqlite(String),
    SqliteMemory,
}

impl StoreKind {
    /// Resolve a store URL.
    ///
    /// Accepts `json://<path>`, `sqlite://<path>`, `sqlite::memory:` and bare
    /// paths (`.db`, `.sqlite`, `.sqlite3` select SQLite, anything else JSON).
    ///
    /// # Errors
    /// Returns `StoreError::UnsupportedUrl` for other schemes or an empty path.
    pub fn parse(url: &str) -> StoreResult<Self> {
        let url = url.trim();

        let kind = if url == "sqlite::memory:" {
            Self::SqliteMemory
        } else if let Some(path) = url.strip_prefix("sqlite://") {
            Self::Sqlite(path.to_string())
        } else if let Some(path) = url.strip_prefix("json://") {
            Self::Json(path.to_string())
        } else if url.contains("://") {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        } else if [".db", ".sqlite", ".sqlite3"].iter().any(|ext| url.ends_with(ext)) {
            Self::Sqlite(url.to_string())
        } else {
            Self::Json(url.to_string())
        };

        match &kind {
            Self::Json(path) | Self::Sqlite(path) if path.is_empty() => {
                Err(StoreError::UnsupportedUrl(url.to_string()))
            }
            _ => Ok(kind),
        }
    }
}

/// Open the store a URL points at.
///
/// # Errors
/// Returns `StoreError::UnsupportedUrl` for unknown schemes and
/// `StoreError::Database` when the backend cannot be opened.
pub fn open_store(url: &str) -> StoreResult<Box<dyn LocationStore>> {
    let store: Box<dyn LocationStore> = match StoreKind::parse(url)? {
        StoreKind::Json(path) => {
            tracing::info!("Using JSON file store at {}", path);
            Box::new(JsonFileStore::new(path))
        }
        StoreKind::Sqlite(path) => {
            tracing::info!("Using SQLite store at {}", path);
            Box::new(SqliteLocationStore::new(path)?)
        }
        StoreKind::SqliteMemory => {
            tracing::info!("Using in-memory SQLite store");
            Box::new(SqliteLocationStore::in_memory()?)
        }
    };
    Ok(store)
}
