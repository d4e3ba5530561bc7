use serde::{Deserialize, Serialize};

/// Current conditions for one city, as returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Degrees Celsius (the client always requests metric units)
    pub temperature: f64,
    /// Localized condition text, e.g. "clear sky" or "晴天"
    pub description: String,
}

/// Subset of the OpenWeatherMap current-weather payload we read
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentWeatherResponse {
    pub main: MainBlock,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MainBlock {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionBlock {
    pub description: String,
}

/// Error body the provider sends alongside non-2xx statuses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: Option<String>,
}

impl TryFrom<CurrentWeatherResponse> for Observation {
    type Error = WeatherError;

    fn try_from(resp: CurrentWeatherResponse) -> Result<Self, Self::Error> {
        let description = resp
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .ok_or_else(|| WeatherError::Parse("response has no weather conditions".into()))?;

        Ok(Self {
            temperature: resp.main.temp,
            description,
        })
    }
}

/// Parse a 2xx body into an [`Observation`], rejecting unexpected shapes.
pub fn parse_observation(body: &str) -> Result<Observation, WeatherError> {
    let resp: CurrentWeatherResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;
    resp.try_into()
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

impl WeatherError {
    /// Message shown to the user after a failed lookup
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) if e.is_timeout() => {
                "The weather service timed out. Please try again."
            }
            Self::Network(_) => "Could not reach the weather service.",
            Self::Status { status: 401, .. } => {
                "The weather service rejected the API key. Check settings."
            }
            Self::Status { status: 404, .. } => "City not found.",
            Self::Status { .. } => "Failed to fetch weather information.",
            Self::Parse(_) => "The weather service sent an unexpected response.",
            Self::Endpoint(_) => "The weather service endpoint is misconfigured.",
        }
    }
}
