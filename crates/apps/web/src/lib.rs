//! Browser controllers for the flight route search page.
//!
//! The controllers are sans-IO state machines driven through [`App`]; the
//! page, the network and the map provider sit behind the traits in
//! [`ports`]. On `wasm32` the [`browser`] module supplies the real host and
//! the `#[wasm_bindgen]` entry points.

pub mod app;
pub mod config;
pub mod error;
pub mod map_widget;
pub mod navigation;
pub mod ports;
pub mod role;
pub mod routes_view;
pub mod search_form;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(test)]
mod testing;

pub use app::App;
pub use config::{AppConfig, FormConfig, MapConfig};
pub use error::{FetchError, MapError};
pub use navigation::HistoryState;
pub use role::{BoundPointSet, Role};
pub use routes_view::RoutesView;
