//! Location tracking for Skycast
//!
//! Location records, their storage backends (JSON file, SQLite) and the
//! service that combines them with live weather.

pub mod client;
pub mod json_store;
pub mod location;
pub mod service;
pub mod sqlite_store;
pub mod store;

pub use client::LocationClient;
pub use json_store::JsonFileStore;
pub use location::{
    Location, LocationPatch, NewLocation, NewSnapshot, SyncOutcome, WeatherSnapshot,
};
pub use service::{LocationService, ServiceError, ServiceResult};
pub use sqlite_store::SqliteLocationStore;
pub use store::{open_store, LocationStore, StoreError, StoreKind, StoreResult};
