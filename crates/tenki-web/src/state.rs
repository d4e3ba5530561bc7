use std::sync::Arc;

use chrono_tz::Tz;
use tenki_core::{AppError, Config};
use tenki_store::StoreHandle;
use tenki_weather::{ProviderOptions, WeatherProvider};

use crate::templates::Templates;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreHandle,
    pub weather: Arc<WeatherProvider>,
    pub templates: Arc<Templates>,
    /// Zone used to stamp new records
    pub tz: Tz,
}

impl AppState {
    pub fn new(config: &Config, store: StoreHandle) -> Result<Self, AppError> {
        let tz = config.weather.tz()?;

        let weather = WeatherProvider::new(ProviderOptions {
            endpoint: config.weather.base_url.clone(),
            lang: config.weather.lang.clone(),
            timeout: config.weather.timeout(),
        })
        .map_err(|e| AppError::Service(e.to_string()))?;

        let templates = Templates::new()
            .map_err(|e| AppError::Service(format!("failed to load templates: {e:#}")))?;

        Ok(Self {
            store,
            weather: Arc::new(weather),
            templates: Arc::new(templates),
            tz,
        })
    }
}
