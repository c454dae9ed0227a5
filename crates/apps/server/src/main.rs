use std::time::Duration;

use server::config::ServerConfig;
use server::dataset::Dataset;
use server::{app, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env();
    let dataset = Dataset::load(&config.dataset).expect("failed to load dataset");
    info!(
        airports = dataset.airports().len(),
        cities = dataset.cities().len(),
        routes = dataset.route_count(),
        "dataset loaded from {:?}",
        config.dataset
    );

    let addr = config.addr;
    let state = AppState::new(config, dataset);

    let cache = state.cache.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            cache.purge_expired();
        }
    });

    info!("route search server listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app(state))
        .await
        .unwrap();
}
