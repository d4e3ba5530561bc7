//! Local persistence for Tenki: the API key singleton and the lookup log.

pub mod handle;
pub mod record;
pub mod weather_store;

pub use handle::StoreHandle;
pub use record::{NewWeatherRecord, WeatherRecord, FETCHED_AT_FORMAT};
pub use weather_store::{StoreResult, WeatherStore};
