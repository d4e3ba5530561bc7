//! Shared async access to the weather store.
//!
//! `StoreHandle` owns the single SQLite connection behind a mutex and runs
//! every operation on the blocking pool, so request handlers never block
//! the async runtime.

use std::sync::Arc;

use parking_lot::Mutex;
use tenki_core::DatabaseError;

use crate::record::{NewWeatherRecord, WeatherRecord};
use crate::weather_store::{StoreResult, WeatherStore};

/// Cloneable handle to a [`WeatherStore`].
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<WeatherStore>>,
}

impl StoreHandle {
    pub fn new(store: WeatherStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `op` with exclusive access to the store on the blocking pool.
    async fn with_store<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&mut WeatherStore) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = store.lock();
            op(&mut *guard)
        })
        .await
        .map_err(|e| DatabaseError::TaskFailed(e.to_string()))?
    }

    pub async fn api_key(&self) -> StoreResult<Option<String>> {
        self.with_store(|store| store.api_key()).await
    }

    pub async fn set_api_key(&self, api_key: String) -> StoreResult<()> {
        self.with_store(move |store| store.set_api_key(&api_key)).await
    }

    pub async fn append_weather(&self, record: NewWeatherRecord) -> StoreResult<WeatherRecord> {
        self.with_store(move |store| store.append_weather(&record)).await
    }

    /// All records, newest first.
    pub async fn list_weather(&self) -> StoreResult<Vec<WeatherRecord>> {
        self.with_store(|store| store.list_weather()).await
    }

    pub async fn settings_count(&self) -> StoreResult<usize> {
        self.with_store(|store| store.settings_count()).await
    }

    pub async fn weather_count(&self) -> StoreResult<usize> {
        self.with_store(|store| store.weather_count()).await
    }

    /// Wipe and reinitialize the store. Holds the lock for the whole reset.
    pub async fn reset(&self) -> StoreResult<()> {
        self.with_store(|store| store.reset()).await
    }
}
