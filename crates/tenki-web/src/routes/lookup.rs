use axum::extract::State;
use axum::response::Response;
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::Deserialize;
use tenki_store::NewWeatherRecord;

use super::{redirect_with, render_page};
use crate::error::WebError;
use crate::flash::Flash;
use crate::state::AppState;

pub const MISSING_KEY_MESSAGE: &str = "API key is not configured.";
pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city name.";

#[derive(Debug, Deserialize)]
pub struct LookupForm {
    pub city: String,
}

/// GET `/`: empty lookup form.
pub async fn show(State(state): State<AppState>, jar: CookieJar) -> Result<Response, WebError> {
    render_page(&state, jar, "index.html", |flash| {
        context! { flash, weather => () }
    })
}

/// POST `/`: look up `city`, log the result and show it.
///
/// Without a stored key this redirects to `/settings` before any provider
/// call. A provider failure redirects back to `/` and writes nothing.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LookupForm>,
) -> Result<Response, WebError> {
    let api_key = match state.store.api_key().await? {
        Some(key) if !key.trim().is_empty() => key,
        _ => {
            tracing::warn!("Lookup rejected: no API key configured");
            return Ok(redirect_with(jar, Flash::danger(MISSING_KEY_MESSAGE), "/settings"));
        }
    };

    let city = form.city.trim();
    if city.is_empty() {
        return Ok(redirect_with(jar, Flash::danger(EMPTY_CITY_MESSAGE), "/"));
    }

    let observation = match state.weather.fetch(city, &api_key).await {
        Ok(observation) => observation,
        Err(e) => {
            tracing::warn!("Weather lookup for {:?} failed: {}", city, e);
            return Ok(redirect_with(jar, Flash::danger(e.user_message()), "/"));
        }
    };

    let record = state
        .store
        .append_weather(NewWeatherRecord::fetched_now(
            city,
            observation.temperature,
            observation.description,
            &state.tz,
        ))
        .await?;
    tracing::info!("Recorded weather for {:?} (record {})", record.city, record.id);

    render_page(&state, jar, "index.html", |flash| {
        context! { flash, weather => record }
    })
}
