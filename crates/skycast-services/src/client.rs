//! Async handle over a location store.
//!
//! This module provides `LocationClient`, which serializes access to any
//! `LocationStore` behind a mutex and runs the blocking I/O off the async
//! runtime.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::location::{
    Location, LocationPatch, NewLocation, NewSnapshot, SyncOutcome, WeatherSnapshot,
};
use crate::store::{open_store, LocationStore, StoreError, StoreResult};

/// Shared, cloneable handle to a location store.
///
/// Every operation takes the store lock for its whole duration, so a
/// read-modify-write inside one store call cannot interleave with another
/// request in this process.
#[derive(Clone)]
pub struct LocationClient {
    store: Arc<Mutex<Box<dyn LocationStore>>>,
}

impl LocationClient {
    /// Wrap an already opened store.
    pub fn new(store: Box<dyn LocationStore>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Open the store a URL points at (see [`crate::store::StoreKind::parse`]).
    pub fn open(url: &str) -> StoreResult<Self> {
        Ok(Self::new(open_store(url)?))
    }

    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&dyn LocationStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            let guard = store.lock();
            op(&**guard)
        })
        .await
        .map_err(|e| StoreError::Other(anyhow::anyhow!("Store task failed: {}", e)))?
    }

    /// List all locations.
    pub async fn list(&self) -> StoreResult<Vec<Location>> {
        self.run(|store| store.list()).await
    }

    /// Get a location by ID.
    pub async fn get(&self, id: &str) -> StoreResult<Option<Location>> {
        let id = id.to_string();
        self.run(move |store| store.get(&id)).await
    }

    /// Create a new location.
    pub async fn create(&self, location: NewLocation) -> StoreResult<Location> {
        self.run(move |store| store.create(location)).await
    }

    /// Update an existing location.
    pub async fn update(&self, id: &str, patch: LocationPatch) -> StoreResult<Option<Location>> {
        let id = id.to_string();
        self.run(move |store| store.update(&id, patch)).await
    }

    /// Delete a location.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let id = id.to_string();
        self.run(move |store| store.delete(&id)).await
    }

    /// Record a weather snapshot and the matching sync time.
    pub async fn record_sync(&self, snapshot: NewSnapshot) -> StoreResult<SyncOutcome> {
        self.run(move |store| store.record_sync(snapshot)).await
    }

    /// Snapshot history for a location, newest first.
    pub async fn snapshots(&self, location_id: &str) -> StoreResult<Vec<WeatherSnapshot>> {
        let location_id = location_id.to_string();
        self.run(move |store| store.snapshots(&location_id)).await
    }

    /// Number of stored locations.
    pub async fn count(&self) -> StoreResult<usize> {
        self.run(|store| store.count()).await
    }
}
