//! OpenWeatherMap client for Tenki.
//!
//! Looks up current conditions by city name and returns a typed
//! [`Observation`] or a [`WeatherError`].

pub mod provider;
pub mod types;

pub use provider::{ProviderOptions, WeatherProvider, DEFAULT_ENDPOINT};
pub use types::{parse_observation, Observation, WeatherError};
