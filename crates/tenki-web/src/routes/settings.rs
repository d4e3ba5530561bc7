use axum::extract::State;
use axum::response::Response;
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;
use serde::Deserialize;

use super::{redirect_with, render_page};
use crate::error::WebError;
use crate::flash::Flash;
use crate::state::AppState;

pub const SAVED_MESSAGE: &str = "API key saved.";

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub api_key: String,
}

/// GET `/settings`: form pre-filled with the stored key.
pub async fn show(State(state): State<AppState>, jar: CookieJar) -> Result<Response, WebError> {
    let api_key = state.store.api_key().await?.unwrap_or_default();
    render_page(&state, jar, "settings.html", |flash| context! { flash, api_key })
}

/// POST `/settings`: replace the stored key.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SettingsForm>,
) -> Result<Response, WebError> {
    state.store.set_api_key(form.api_key.trim().to_string()).await?;
    tracing::info!("API key updated");
    Ok(redirect_with(jar, Flash::success(SAVED_MESSAGE), "/settings"))
}
