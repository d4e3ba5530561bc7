//! Row types for the `weather` log.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Format of `fetched_at`, in the configured local zone
pub const FETCHED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One successful lookup, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub id: i64,
    pub city: String,
    /// Degrees Celsius
    pub temperature: f64,
    pub description: String,
    pub fetched_at: String,
}

/// A lookup result not yet written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWeatherRecord {
    pub city: String,
    pub temperature: f64,
    pub description: String,
    pub fetched_at: String,
}

impl NewWeatherRecord {
    /// Build a record stamped with the current time in `tz`.
    pub fn fetched_now<Tz>(
        city: impl Into<String>,
        temperature: f64,
        description: impl Into<String>,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            city: city.into(),
            temperature,
            description: description.into(),
            fetched_at: Utc::now()
                .with_timezone(tz)
                .format(FETCHED_AT_FORMAT)
                .to_string(),
        }
    }
}
