use axum::extract::State;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use super::redirect_with;
use crate::error::WebError;
use crate::flash::Flash;
use crate::state::AppState;

pub const RESET_MESSAGE: &str = "Database has been reset.";

/// GET `/reset`: drop every record and the stored key.
pub async fn reset(State(state): State<AppState>, jar: CookieJar) -> Result<Response, WebError> {
    state.store.reset().await?;
    tracing::warn!("Database reset requested and completed");
    Ok(redirect_with(jar, Flash::success(RESET_MESSAGE), "/"))
}
