use axum::extract::State;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use minijinja::context;

use super::render_page;
use crate::error::WebError;
use crate::state::AppState;

/// GET `/history`: every lookup, newest first.
pub async fn show(State(state): State<AppState>, jar: CookieJar) -> Result<Response, WebError> {
    let rows = state.store.list_weather().await?;
    render_page(&state, jar, "history.html", |flash| context! { flash, rows })
}
