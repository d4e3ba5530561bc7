//! HTTP surface for Tenki: lookup, history, settings and reset pages.

pub mod error;
pub mod flash;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::WebError;
pub use flash::{Flash, FlashLevel, FLASH_COOKIE};
pub use state::AppState;
pub use templates::Templates;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use routes::{history, lookup, reset, settings};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(lookup::show).post(lookup::submit))
        .route("/history", get(history::show))
        .route("/settings", get(settings::show).post(settings::submit))
        .route("/reset", get(reset::reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
