use crate::types::{parse_observation, ErrorResponse, Observation, WeatherError};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
const USER_AGENT: &str = concat!("Tenki/", env!("CARGO_PKG_VERSION"));

/// Construction options for [`WeatherProvider`]
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Full URL of the current-weather endpoint
    pub endpoint: String,
    /// Language for descriptions; empty leaves it to the provider
    pub lang: String,
    /// `None` means wait indefinitely
    pub timeout: Option<Duration>,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            lang: "ja".to_string(),
            timeout: Some(Duration::from_secs(10)),
        }
    }
}

/// Client for the OpenWeatherMap current-weather-by-city endpoint
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    endpoint: Url,
    lang: String,
}

impl WeatherProvider {
    pub fn new(options: ProviderOptions) -> Result<Self, WeatherError> {
        let endpoint = Url::parse(&options.endpoint)
            .map_err(|e| WeatherError::Endpoint(format!("{}: {}", options.endpoint, e)))?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint,
            lang: options.lang,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch current conditions for `city` in metric units.
    ///
    /// One request, no retry. Non-2xx statuses and bodies without
    /// `main.temp` or a first `weather[].description` are errors.
    #[instrument(skip(self, api_key), level = "debug")]
    pub async fn fetch(&self, city: &str, api_key: &str) -> Result<Observation, WeatherError> {
        let mut query = vec![("q", city), ("appid", api_key), ("units", "metric")];
        if !self.lang.is_empty() {
            query.push(("lang", self.lang.as_str()));
        }

        // Strip the URL from transport errors; its query carries the API key.
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&query)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.without_url()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            tracing::debug!("Weather lookup for {:?} returned status {}", city, status);
            return Err(WeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let observation = parse_observation(&body)?;
        tracing::debug!(
            "Weather for {:?}: {} / {}",
            city,
            observation.temperature,
            observation.description
        );
        Ok(observation)
    }
}
