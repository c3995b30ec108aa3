//! AgroSense site backend: entry point.
//!
//! Serves the product catalog, testimonials, resources, lead intake, weather
//! and ROI projections over a small Axum REST API. Records live in the hosted
//! record store, or in memory for local development. A background task keeps
//! the current weather snapshot fresh for API handlers.

mod accessor;
mod api;
mod catalog;
mod config;
mod errors;
mod leads;
mod memory;
mod monitor;
mod records;
mod remote;
mod store;
mod weather;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Config, StoreBackend};
use memory::MemoryStore;
use remote::RemoteStore;
use store::RecordStore;
use weather::{RandomSource, WeatherProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    let store: Arc<dyn RecordStore> = match config.backend {
        StoreBackend::Remote => {
            let credentials = config
                .credentials
                .clone()
                .ok_or_else(|| anyhow::anyhow!("remote store credentials are missing"))?;
            let client = Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()?;
            Arc::new(RemoteStore::new(client, &config.store_url, credentials))
        }
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    info!("Using {} record store", store.backend());

    // ─── Background weather monitor ───────────────────────
    let weather = Arc::new(WeatherProvider::new(store.clone(), Arc::new(RandomSource)));
    let (publisher, latest_weather) = watch::channel(None);
    tokio::spawn(monitor::run(
        weather.clone(),
        publisher,
        Duration::from_secs(config.weather_refresh_secs.max(1)),
    ));

    // ─── REST API ─────────────────────────────────────────
    let app = api::router(Arc::new(api::ApiState {
        store,
        weather,
        latest_weather,
    }));

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
