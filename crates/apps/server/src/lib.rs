//! Backend for the flight route search page.
//!
//! Serves the page shell and its fragments, static assets, and the JSON
//! endpoints under `/ajax` that the browser controllers call, all answered
//! from an in-memory [`dataset::Dataset`].

pub mod api;
pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pages;
pub mod search;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::ResponseCache;
use crate::config::ServerConfig;
use crate::dataset::Dataset;
use crate::pages::Pages;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub dataset: Arc<Dataset>,
    pub pages: Pages,
    pub cache: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(config: ServerConfig, dataset: Dataset) -> Self {
        Self {
            pages: Pages::new(config.pages_root.clone()),
            cache: Arc::new(ResponseCache::new(config.cache_ttl, config.cache_capacity)),
            dataset: Arc::new(dataset),
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(api::healthz))
        .route("/", get(api::index))
        .route("/ajax", get(api::index_fragment))
        .route("/ajax/", get(api::index_fragment))
        .route("/ajax/autocomplete/:source", get(api::autocomplete))
        .route("/ajax/airports", get(api::airports))
        .route("/ajax/routes", get(api::routes))
        .route("/ajax/get-cities", get(api::get_cities))
        .route("/ajax/:page", get(api::page_fragment))
        .route("/:page", get(api::page))
        .nest_service("/static", ServeDir::new(&state.config.static_root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
