use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tenki_core::init()?;

    let (config, _validation) = tenki_core::Config::load_validated()?;

    let store = tenki_store::WeatherStore::open(&config.database.path)
        .with_context(|| format!("Failed to open {}", config.database.path.display()))?;
    let store = tenki_store::StoreHandle::new(store);

    let state = tenki_web::AppState::new(&config, store)?;
    tracing::info!(
        "Tenki started (database: {}, provider: {})",
        config.database.path.display(),
        state.weather.endpoint()
    );

    tenki_web::serve(&config.server.bind_addr(), state).await
}
