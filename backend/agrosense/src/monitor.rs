//! Long-running background task that refreshes current weather conditions
//! and publishes them to API handlers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::weather::{WeatherProvider, WeatherSnapshot};

/// Refresh the current snapshot every `interval` until nobody is listening.
pub async fn run(
    provider: Arc<WeatherProvider>,
    publisher: watch::Sender<Option<WeatherSnapshot>>,
    interval: Duration,
) {
    info!("Weather monitor starting, refresh every {}s", interval.as_secs());

    loop {
        let snapshot = provider.get_current_snapshot().await;
        debug!(
            "Weather refreshed: {}°F, {}% humidity (simulated={})",
            snapshot.temperature, snapshot.humidity, snapshot.simulated
        );

        if publisher.send(Some(snapshot)).is_err() {
            info!("Weather monitor stopping: no subscribers left");
            return;
        }

        tokio::time::sleep(interval).await;
    }
}
