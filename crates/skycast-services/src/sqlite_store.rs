//! SQLite-based location storage implementation.
//!
//! This module provides `SqliteLocationStore`, the database-backed
//! implementation of the `LocationStore` trait. Locations and their weather
//! snapshots live in two tables linked by a cascading foreign key.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use skycast_core::DatabaseError;
use std::path::Path;

use crate::location::{
    generate_id, validate_patch, Location, LocationPatch, NewLocation, NewSnapshot, SyncOutcome,
    WeatherSnapshot,
};
use crate::store::{LocationStore, StoreError, StoreResult};

const LOCATION_COLUMNS: &str =
    "id, city, country, lat, lon, is_favorite, last_synced, created_at, updated_at";

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        let error = match &e {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(e.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(e.to_string())
            }
            _ => DatabaseError::QueryFailed(e.to_string()),
        };
        StoreError::Database(error)
    }
}

/// SQLite-based location storage.
pub struct SqliteLocationStore {
    conn: Connection,
}

impl SqliteLocationStore {
    /// Create a new store at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS locations (
                id TEXT PRIMARY KEY,
                city TEXT NOT NULL,
                country TEXT,
                lat REAL NOT NULL,
                lon REAL NOT NULL,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                last_synced TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS snapshots (
                id TEXT PRIMARY KEY,
                location_id TEXT NOT NULL REFERENCES locations(id) ON DELETE CASCADE,
                temperature REAL NOT NULL,
                humidity INTEGER NOT NULL,
                description TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_snapshots_location ON snapshots(location_id, timestamp DESC);
            "#,
        )?;
        Ok(())
    }

    /// Convert a database row to a Location.
    fn row_to_location(row: &rusqlite::Row) -> rusqlite::Result<Location> {
        let is_favorite: i32 = row.get(5)?;
        Ok(Location {
            id: row.get(0)?,
            city: row.get(1)?,
            country: row.get(2)?,
            lat: row.get(3)?,
            lon: row.get(4)?,
            is_favorite: is_favorite != 0,
            last_synced: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn row_to_snapshot(row: &rusqlite::Row) -> rusqlite::Result<WeatherSnapshot> {
        Ok(WeatherSnapshot {
            id: row.get(0)?,
            location: row.get(1)?,
            temperature: row.get(2)?,
            humidity: row.get(3)?,
            description: row.get(4)?,
            timestamp: row.get(5)?,
        })
    }
}

impl LocationStore for SqliteLocationStore {
    fn list(&self) -> StoreResult<Vec<Location>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM locations ORDER BY created_at, rowid",
            LOCATION_COLUMNS
        ))?;

        let rows = stmt.query_map([], Self::row_to_location)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get(&self, id: &str) -> StoreResult<Option<Location>> {
        let location = self
            .conn
            .query_row(
                &format!("SELECT {} FROM locations WHERE id = ?1", LOCATION_COLUMNS),
                params![id],
                Self::row_to_location,
            )
            .optional()?;
        Ok(location)
    }

    fn create(&self, location: NewLocation) -> StoreResult<Location> {
        location.validate()?;

        let location = location.into_location(generate_id(), Utc::now());

        self.conn.execute(
            r#"
            INSERT INTO locations (id, city, country, lat, lon, is_favorite, last_synced, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                location.id,
                location.city,
                location.country,
                location.lat,
                location.lon,
                location.is_favorite as i32,
                location.last_synced,
                location.created_at,
                location.updated_at,
            ],
        )?;

        tracing::debug!("Created location with ID: {}", location.id);
        Ok(location)
    }

    fn update(&self, id: &str, patch: LocationPatch) -> StoreResult<Option<Location>> {
        validate_patch(&patch)?;

        let tx = self.conn.unchecked_transaction()?;

        let Some(mut location) = self.get(id)? else {
            return Ok(None);
        };
        location.apply(patch, Utc::now());

        tx.execute(
            r#"
            UPDATE locations
            SET city = ?1, country = ?2, lat = ?3, lon = ?4, is_favorite = ?5, last_synced = ?6, updated_at = ?7
            WHERE id = ?8
            "#,
            params![
                location.city,
                location.country,
                location.lat,
                location.lon,
                location.is_favorite as i32,
                location.last_synced,
                location.updated_at,
                id,
            ],
        )?;
        tx.commit()?;

        tracing::debug!("Updated location: {}", id);
        Ok(Some(location))
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM locations WHERE id = ?1", params![id])?;

        if deleted > 0 {
            tracing::debug!("Deleted location: {}", id);
        }
        Ok(deleted > 0)
    }

    fn record_sync(&self, snapshot: NewSnapshot) -> StoreResult<SyncOutcome> {
        let tx = self.conn.unchecked_transaction()?;

        let Some(mut location) = self.get(&snapshot.location_id)? else {
            return Err(StoreError::not_found(snapshot.location_id));
        };

        let now = Utc::now();
        let snapshot = snapshot.into_snapshot(generate_id(), now);
        location.last_synced = Some(snapshot.timestamp);
        location.updated_at = now;

        tx.execute(
            "UPDATE locations SET last_synced = ?1, updated_at = ?2 WHERE id = ?3",
            params![location.last_synced, location.updated_at, location.id],
        )?;
        tx.execute(
            r#"
            INSERT INTO snapshots (id, location_id, temperature, humidity, description, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                snapshot.id,
                snapshot.location,
                snapshot.temperature,
                snapshot.humidity,
                snapshot.description,
                snapshot.timestamp,
            ],
        )?;
        tx.commit()?;

        tracing::debug!("Recorded sync for location: {}", location.id);
        Ok(SyncOutcome { location, snapshot })
    }

    fn snapshots(&self, location_id: &str) -> StoreResult<Vec<WeatherSnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, location_id, temperature, humidity, description, timestamp
             FROM snapshots
             WHERE location_id = ?1
             ORDER BY timestamp DESC, rowid DESC",
        )?;

        let rows = stmt.query_map(params![location_id], Self::row_to_snapshot)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM locations", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteLocationStore {
        SqliteLocationStore::in_memory().expect("Failed to create in-memory store")
    }

    fn tokyo() -> NewLocation {
        NewLocation {
            city: "Tokyo".into(),
            country: Some("JP".into()),
            lat: 35.6895,
            lon: 139.6917,
            is_favorite: false,
            last_synced: Some(Utc::now()),
        }
    }

    #[test]
    fn test_create_and_get_location() {
        let store = create_test_store();

        let location = store.create(tokyo()).unwrap();
        assert!(!location.id.is_empty());
        assert_eq!(location.city, "Tokyo");

        let retrieved = store.get(&location.id).unwrap().unwrap();
        assert_eq!(retrieved.id, location.id);
        assert_eq!(retrieved.country.as_deref(), Some("JP"));
        assert_eq!(retrieved.lat, 35.6895);
        assert_eq!(retrieved.last_synced, location.last_synced);
        assert_eq!(retrieved.created_at, location.created_at);
    }

    #[test]
    fn test_list_in_creation_order() {
        let store = create_test_store();

        for city in ["A", "B", "C"] {
            store
                .create(NewLocation {
                    city: city.into(),
                    ..tokyo()
                })
                .unwrap();
        }

        let cities: Vec<_> = store.list().unwrap().into_iter().map(|l| l.city).collect();
        assert_eq!(cities, vec!["A", "B", "C"]);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_update_nonexistent() {
        let store = create_test_store();
        let result = store.update("missing", LocationPatch::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_cascades_snapshots() {
        let store = create_test_store();
        let location = store.create(tokyo()).unwrap();

        store
            .record_sync(NewSnapshot {
                location_id: location.id.clone(),
                temperature: 18.5,
                humidity: 55,
                description: "scattered clouds".into(),
            })
            .unwrap();

        assert!(store.delete(&location.id).unwrap());
        assert!(!store.delete(&location.id).unwrap());
        assert!(store.snapshots(&location.id).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_for_missing_location() {
        let store = create_test_store();
        let result = store.record_sync(NewSnapshot {
            location_id: "missing".into(),
            temperature: 1.0,
            humidity: 1,
            description: "snow".into(),
        });
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_record_sync_rolls_back_on_failure() {
        let store = create_test_store();
        let location = store.create(tokyo()).unwrap();

        // Force the snapshot insert to fail inside the transaction
        store.conn.execute_batch("DROP TABLE snapshots").unwrap();

        let result = store.record_sync(NewSnapshot {
            location_id: location.id.clone(),
            temperature: 20.0,
            humidity: 50,
            description: "clear sky".into(),
        });
        assert!(matches!(result, Err(StoreError::Database(_))));

        let unchanged = store.get(&location.id).unwrap().unwrap();
        assert_eq!(unchanged.last_synced, location.last_synced);
        assert_eq!(unchanged.updated_at, location.updated_at);
    }

    #[test]
    fn test_record_sync_sets_last_synced() {
        let store = create_test_store();
        let location = store.create(tokyo()).unwrap();

        let outcome = store
            .record_sync(NewSnapshot {
                location_id: location.id.clone(),
                temperature: 20.0,
                humidity: 50,
                description: "clear sky".into(),
            })
            .unwrap();

        let stored = store.get(&location.id).unwrap().unwrap();
        assert_eq!(stored.last_synced, Some(outcome.snapshot.timestamp));
        assert_eq!(stored, outcome.location);
        assert_eq!(store.snapshots(&location.id).unwrap(), vec![outcome.snapshot]);
    }

    #[test]
    fn test_query_error_maps_to_query_failed() {
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(
            err,
            StoreError::Database(DatabaseError::QueryFailed(_))
        ));
    }

    #[test]
    fn test_reopen_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skycast.db");

        let id = {
            let store = SqliteLocationStore::new(&path).unwrap();
            store.create(tokyo()).unwrap().id
        };

        let store = SqliteLocationStore::new(&path).unwrap();
        assert!(store.get(&id).unwrap().is_some());
    }
}
