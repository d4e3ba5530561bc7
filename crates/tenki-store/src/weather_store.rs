//! SQLite-backed storage for the API key and the lookup log.
//!
//! Two tables: `settings` holds at most one row (id 1) with the provider
//! API key, and `weather` is an append-only log of successful lookups.

use rusqlite::{params, Connection, OptionalExtension};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tenki_core::{DatabaseError, RusqliteErrorExt};

use crate::record::{NewWeatherRecord, WeatherRecord};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, DatabaseError>;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        api_key TEXT
    );

    CREATE TABLE IF NOT EXISTS weather (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL,
        temperature REAL NOT NULL,
        description TEXT NOT NULL,
        fetched_at TEXT NOT NULL
    );
"#;

/// Files SQLite may keep next to the main database.
const COMPANION_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// SQLite store for settings and weather records.
pub struct WeatherStore {
    conn: Connection,
    /// `None` for in-memory stores
    path: Option<PathBuf>,
}

impl WeatherStore {
    /// Open the store at the given path.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(RusqliteErrorExt::into_database_error)?;
        let store = Self {
            conn,
            path: Some(path),
        };
        store.init_schema()?;
        tracing::debug!("Opened weather store at {:?}", store.path);
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(RusqliteErrorExt::into_database_error)?;
        let store = Self { conn, path: None };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(SCHEMA)
            .map_err(RusqliteErrorExt::into_database_error)
    }

    /// Read the stored API key.
    ///
    /// Returns `None` when no key has been saved.
    pub fn api_key(&self) -> StoreResult<Option<String>> {
        let key: Option<Option<String>> = self
            .conn
            .query_row("SELECT api_key FROM settings WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(RusqliteErrorExt::into_database_error)?;
        Ok(key.flatten())
    }

    /// Replace the stored API key.
    pub fn set_api_key(&mut self, api_key: &str) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(RusqliteErrorExt::into_database_error)?;
        tx.execute(
            "INSERT INTO settings (id, api_key) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET api_key = excluded.api_key",
            params![api_key],
        )
        .map_err(RusqliteErrorExt::into_database_error)?;
        tx.commit().map_err(RusqliteErrorExt::into_database_error)?;

        tracing::debug!("Stored API key ({} chars)", api_key.chars().count());
        Ok(())
    }

    /// Append a lookup result and return it with its assigned id.
    pub fn append_weather(&self, record: &NewWeatherRecord) -> StoreResult<WeatherRecord> {
        self.conn
            .execute(
                "INSERT INTO weather (city, temperature, description, fetched_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.city,
                    record.temperature,
                    record.description,
                    record.fetched_at
                ],
            )
            .map_err(RusqliteErrorExt::into_database_error)?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!("Appended weather record {} for {:?}", id, record.city);

        Ok(WeatherRecord {
            id,
            city: record.city.clone(),
            temperature: record.temperature,
            description: record.description.clone(),
            fetched_at: record.fetched_at.clone(),
        })
    }

    /// All weather records, newest first.
    pub fn list_weather(&self) -> StoreResult<Vec<WeatherRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, city, temperature, description, fetched_at
                 FROM weather
                 ORDER BY id DESC",
            )
            .map_err(RusqliteErrorExt::into_database_error)?;

        let rows = stmt
            .query_map([], Self::row_to_record)
            .map_err(RusqliteErrorExt::into_database_error)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(RusqliteErrorExt::into_database_error)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<WeatherRecord> {
        Ok(WeatherRecord {
            id: row.get(0)?,
            city: row.get(1)?,
            temperature: row.get(2)?,
            description: row.get(3)?,
            fetched_at: row.get(4)?,
        })
    }

    pub fn settings_count(&self) -> StoreResult<usize> {
        self.count("settings")
    }

    pub fn weather_count(&self) -> StoreResult<usize> {
        self.count("weather")
    }

    fn count(&self, table: &'static str) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(RusqliteErrorExt::into_database_error)?;
        Ok(count as usize)
    }

    /// Destroy all data and start over with an empty schema.
    ///
    /// File-backed stores close the connection, delete the database file and
    /// its journal companions, then reopen. In-memory stores drop both tables.
    ///
    /// A file-backed store is reopened even when a file could not be removed,
    /// so the handle stays usable after a failed reset.
    pub fn reset(&mut self) -> StoreResult<()> {
        match self.path.clone() {
            Some(path) => self.recreate_file(&path)?,
            None => {
                self.conn
                    .execute_batch("DROP TABLE IF EXISTS settings; DROP TABLE IF EXISTS weather;")
                    .map_err(RusqliteErrorExt::into_database_error)?;
                self.init_schema()?;
            }
        }

        tracing::info!("Weather store reset");
        Ok(())
    }

    fn recreate_file(&mut self, path: &Path) -> StoreResult<()> {
        let placeholder =
            Connection::open_in_memory().map_err(RusqliteErrorExt::into_database_error)?;
        let old = std::mem::replace(&mut self.conn, placeholder);
        if let Err((conn, e)) = old.close() {
            self.conn = conn;
            return Err(DatabaseError::ResetFailed(e.to_string()));
        }

        let removed = remove_store_files(path);

        self.conn = Connection::open(path).map_err(|e| {
            DatabaseError::ResetFailed(format!("reopen {}: {}", path.display(), e))
        })?;
        self.init_schema()?;

        if let Err(e) = &removed {
            tracing::error!("Reset left the store in place: {}", e);
        }
        removed
    }
}

/// Companions go first so a failure leaves the main file intact.
fn remove_store_files(path: &Path) -> StoreResult<()> {
    for file in companion_paths(path).chain(std::iter::once(path.to_path_buf())) {
        match std::fs::remove_file(&file) {
            Ok(()) => tracing::debug!("Removed {}", file.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(DatabaseError::ResetFailed(format!(
                    "{}: {}",
                    file.display(),
                    e
                )))
            }
        }
    }
    Ok(())
}

fn companion_paths(path: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    COMPANION_SUFFIXES.iter().map(move |suffix| {
        let mut name: OsString = path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn create_test_store() -> WeatherStore {
        WeatherStore::in_memory().expect("Failed to create in-memory store")
    }

    fn record(city: &str, temperature: f64, description: &str) -> NewWeatherRecord {
        NewWeatherRecord {
            city: city.to_string(),
            temperature,
            description: description.to_string(),
            fetched_at: "2026-01-30 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_api_key_absent_by_default() {
        let store = create_test_store();
        assert_eq!(store.api_key().unwrap(), None);
        assert_eq!(store.settings_count().unwrap(), 0);
    }

    #[test]
    fn test_set_and_get_api_key() {
        let mut store = create_test_store();
        store.set_api_key("ABC123").unwrap();
        assert_eq!(store.api_key().unwrap().as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_set_api_key_replaces_previous() {
        let mut store = create_test_store();
        store.set_api_key("first").unwrap();
        store.set_api_key("second").unwrap();

        assert_eq!(store.api_key().unwrap().as_deref(), Some("second"));
        assert_eq!(store.settings_count().unwrap(), 1);
    }

    #[test]
    fn test_repeated_identical_key_keeps_single_row() {
        let mut store = create_test_store();
        for _ in 0..5 {
            store.set_api_key("ABC123").unwrap();
        }
        assert_eq!(store.settings_count().unwrap(), 1);
        assert_eq!(store.api_key().unwrap().as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_schema_rejects_second_settings_row() {
        let store = create_test_store();
        let result = store
            .conn
            .execute("INSERT INTO settings (id, api_key) VALUES (2, 'x')", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_append_and_list_newest_first() {
        let store = create_test_store();

        let first = store.append_weather(&record("Tokyo", 21.5, "clear sky")).unwrap();
        let second = store.append_weather(&record("Osaka", 18.0, "rain")).unwrap();
        let third = store.append_weather(&record("Tokyo", 22.1, "few clouds")).unwrap();
        assert!(first.id < second.id && second.id < third.id);

        let rows = store.list_weather().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], third);
        assert_eq!(rows[1].city, "Osaka");
        assert_eq!(rows[2].temperature, 21.5);
        assert_eq!(rows[2].description, "clear sky");
        assert_eq!(rows[2].fetched_at, "2026-01-30 12:00:00");
    }

    #[test]
    fn test_weather_does_not_depend_on_key() {
        let mut store = create_test_store();
        store.set_api_key("old").unwrap();
        store.append_weather(&record("Nagoya", 10.0, "snow")).unwrap();
        store.set_api_key("new").unwrap();

        let rows = store.list_weather().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].temperature, 10.0);
    }

    #[test]
    fn test_reset_in_memory_clears_everything() {
        let mut store = create_test_store();
        store.set_api_key("ABC123").unwrap();
        store.append_weather(&record("Tokyo", 21.5, "clear sky")).unwrap();

        store.reset().unwrap();

        assert_eq!(store.api_key().unwrap(), None);
        assert!(store.list_weather().unwrap().is_empty());

        // Sequence restarts once the table is recreated.
        let rec = store.append_weather(&record("Kyoto", 15.0, "mist")).unwrap();
        assert_eq!(rec.id, 1);
    }

    #[test]
    fn test_reset_file_store_recreates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.db");

        let mut store = WeatherStore::open(&path).unwrap();
        store.set_api_key("ABC123").unwrap();
        store.append_weather(&record("Tokyo", 21.5, "clear sky")).unwrap();

        store.reset().unwrap();
        assert!(path.exists());
        assert_eq!(store.api_key().unwrap(), None);
        assert_eq!(store.weather_count().unwrap(), 0);

        // Still usable after reset, and the data survives a reopen.
        store.append_weather(&record("Sendai", 12.0, "drizzle")).unwrap();
        drop(store);
        let reopened = WeatherStore::open(&path).unwrap();
        assert_eq!(reopened.weather_count().unwrap(), 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WeatherStore::open(dir.path().join("weather.db")).unwrap();

        store.reset().unwrap();
        store.reset().unwrap();

        assert_eq!(store.api_key().unwrap(), None);
        assert!(store.list_weather().unwrap().is_empty());
    }

    #[test]
    fn test_reset_removes_stray_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.db");
        let mut store = WeatherStore::open(&path).unwrap();

        let journal = dir.path().join("weather.db-journal");
        std::fs::write(&journal, b"stale").unwrap();

        store.reset().unwrap();
        assert!(!journal.exists());
    }

    #[test]
    fn test_failed_reset_keeps_store_usable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.db");
        let mut store = WeatherStore::open(&path).unwrap();
        store.set_api_key("ABC123").unwrap();
        store.append_weather(&record("Tokyo", 21.5, "clear sky")).unwrap();

        // A directory in place of the shared-memory file cannot be removed.
        std::fs::create_dir(dir.path().join("weather.db-shm")).unwrap();

        let result = store.reset();
        assert!(matches!(result, Err(DatabaseError::ResetFailed(_))));

        assert!(path.exists());
        assert_eq!(store.api_key().unwrap().as_deref(), Some("ABC123"));
        assert_eq!(store.weather_count().unwrap(), 1);
        store.append_weather(&record("Osaka", 18.0, "rain")).unwrap();
        assert_eq!(store.list_weather().unwrap()[0].city, "Osaka");
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.db");

        {
            let mut store = WeatherStore::open(&path).unwrap();
            store.set_api_key("kept").unwrap();
        }
        let store = WeatherStore::open(&path).unwrap();
        assert_eq!(store.api_key().unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("weather.db");

        let result = WeatherStore::open(&path);
        assert!(matches!(result, Err(DatabaseError::ConnectionFailed(_))));
    }
}
