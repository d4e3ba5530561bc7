//! Route handlers. Each one does at most one store write and at most one
//! provider call, then renders a page or redirects with a flash.

pub mod history;
pub mod lookup;
pub mod reset;
pub mod settings;

use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::error::WebError;
use crate::flash::Flash;
use crate::state::AppState;

/// Queue `flash` and send the browser to `to` with 303 See Other.
fn redirect_with(jar: CookieJar, flash: Flash, to: &str) -> Response {
    (flash.set(jar), Redirect::to(to)).into_response()
}

/// Render `template`, consuming any pending flash into its context.
fn render_page<F>(
    state: &AppState,
    jar: CookieJar,
    template: &str,
    ctx: F,
) -> Result<Response, WebError>
where
    F: FnOnce(Option<Flash>) -> minijinja::Value,
{
    let (jar, flash) = Flash::take(jar);
    let html = state.templates.render(template, ctx(flash))?;
    Ok((jar, Html(html)).into_response())
}
