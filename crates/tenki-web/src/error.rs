//! Maps request-aborting failures to a 500 page.
//!
//! Lookup failures the user can act on (no key, provider errors) are not
//! `WebError`s; handlers turn those into a flash and a redirect instead.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tenki_core::{AppError, DatabaseError};

#[derive(Debug)]
pub struct WebError(pub AppError);

impl From<AppError> for WebError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl From<DatabaseError> for WebError {
    fn from(e: DatabaseError) -> Self {
        Self(AppError::Database(e))
    }
}

impl From<minijinja::Error> for WebError {
    fn from(e: minijinja::Error) -> Self {
        Self(AppError::Service(format!("template rendering failed: {e:#}")))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {}", self.0);
        let body = format!(
            "<!doctype html><title>Error</title><h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Back</a></p>",
            self.0.user_message()
        );
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}
