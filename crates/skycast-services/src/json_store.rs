//! Flat-file JSON location store.
//!
//! The whole document is read on every call and rewritten on every
//! mutation. A file that cannot be read or parsed is treated as an empty
//! store, so a corrupt file is silently replaced on the next write.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use skycast_core::DatabaseError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::location::{
    generate_id, validate_patch, Location, LocationPatch, NewLocation, NewSnapshot, SyncOutcome,
    WeatherSnapshot,
};
use crate::store::{LocationStore, StoreError, StoreResult};

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    locations: Vec<Location>,
    #[serde(default)]
    snapshots: Vec<WeatherSnapshot>,
}

/// JSON file storage.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file. The file is created on first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Document {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Store file {} does not exist yet", self.path.display());
                return Document::default();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read store file {}, treating as empty: {}",
                    self.path.display(),
                    e
                );
                return Document::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(
                "Store file {} is not valid JSON, treating as empty: {}",
                self.path.display(),
                e
            );
            Document::default()
        })
    }

    fn write(&self, document: &Document) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let contents = serde_json::to_string_pretty(document)
            .map_err(|e| DatabaseError::WriteFailed(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(write_failed)?;
        std::fs::rename(&tmp, &self.path).map_err(write_failed)?;
        Ok(())
    }
}

fn write_failed(e: std::io::Error) -> StoreError {
    StoreError::Database(DatabaseError::WriteFailed(e.to_string()))
}

impl LocationStore for JsonFileStore {
    fn list(&self) -> StoreResult<Vec<Location>> {
        Ok(self.read().locations)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Location>> {
        Ok(self.read().locations.into_iter().find(|loc| loc.id == id))
    }

    fn create(&self, location: NewLocation) -> StoreResult<Location> {
        location.validate()?;

        let mut document = self.read();
        let location = location.into_location(generate_id(), Utc::now());
        document.locations.push(location.clone());
        self.write(&document)?;

        Ok(location)
    }

    fn update(&self, id: &str, patch: LocationPatch) -> StoreResult<Option<Location>> {
        validate_patch(&patch)?;

        let mut document = self.read();
        let Some(location) = document.locations.iter_mut().find(|loc| loc.id == id) else {
            return Ok(None);
        };

        location.apply(patch, Utc::now());
        let updated = location.clone();
        self.write(&document)?;

        Ok(Some(updated))
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut document = self.read();
        let Some(index) = document.locations.iter().position(|loc| loc.id == id) else {
            return Ok(false);
        };

        document.locations.remove(index);
        document.snapshots.retain(|snapshot| snapshot.location != id);
        self.write(&document)?;

        Ok(true)
    }

    fn record_sync(&self, snapshot: NewSnapshot) -> StoreResult<SyncOutcome> {
        let mut document = self.read();
        let Some(location) = document
            .locations
            .iter_mut()
            .find(|loc| loc.id == snapshot.location_id)
        else {
            return Err(StoreError::not_found(snapshot.location_id));
        };

        let now = Utc::now();
        let snapshot = snapshot.into_snapshot(generate_id(), now);
        location.last_synced = Some(snapshot.timestamp);
        location.updated_at = now;
        let location = location.clone();

        document.snapshots.push(snapshot.clone());
        self.write(&document)?;

        Ok(SyncOutcome { location, snapshot })
    }

    fn snapshots(&self, location_id: &str) -> StoreResult<Vec<WeatherSnapshot>> {
        let mut snapshots: Vec<_> = self
            .read()
            .snapshots
            .into_iter()
            .filter(|snapshot| snapshot.location == location_id)
            .collect();
        // Stable sort keeps insertion order for equal timestamps; reverse for newest first
        snapshots.sort_by_key(|snapshot| snapshot.timestamp);
        snapshots.reverse();
        Ok(snapshots)
    }
}
