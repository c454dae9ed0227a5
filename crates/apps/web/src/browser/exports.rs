use std::cell::RefCell;
use std::sync::OnceLock;

use protocol::parse_form;
use tracing::{Level, info, warn};
use wasm_bindgen::prelude::*;

use super::host::BrowserHost;
use super::logging;
use crate::app::App;
use crate::config::AppConfig;
use crate::navigation::HistoryState;

static STARTED: OnceLock<()> = OnceLock::new();

thread_local! {
    static APP: RefCell<Option<App<BrowserHost>>> = const { RefCell::new(None) };
}

/// Runs `f` against the booted app. Events that arrive before `boot` or
/// while the app is already borrowed are dropped.
pub(super) fn with_app<R>(f: impl FnOnce(&mut App<BrowserHost>) -> R) -> Option<R> {
    APP.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            warn!("app busy, dropping event");
            return None;
        };
        slot.as_mut().map(f)
    })
}

#[wasm_bindgen(start)]
pub fn start() {
    if STARTED.set(()).is_err() {
        return;
    }
    console_error_panic_hook::set_once();
    logging::init(Level::DEBUG);
}

/// Creates the app for the current page. `config_json` may be empty, or a
/// partial [`AppConfig`] override.
#[wasm_bindgen]
pub fn boot(config_json: &str) -> Result<(), JsValue> {
    let config = if config_json.trim().is_empty() {
        AppConfig::default()
    } else {
        AppConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    let host = BrowserHost::new()?;
    let path = host.path();

    APP.with(|cell| {
        let mut slot = cell
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("app busy"))?;
        *slot = Some(App::new(host, config));
        Ok::<_, JsValue>(())
    })?;
    info!(path = path.as_str(), "booted");
    with_app(|app| app.on_page_loaded(&path));
    Ok(())
}

/// Returns `true` when the click was handled and default navigation must be
/// prevented.
#[wasm_bindgen]
pub fn on_link_click(href: &str) -> bool {
    with_app(|app| {
        app.on_link_click(href);
    })
    .is_some()
}

#[wasm_bindgen]
pub fn on_popstate(path: &str, state: JsValue) {
    let state = if state.is_null() || state.is_undefined() {
        None
    } else {
        js_sys::JSON::stringify(&state)
            .ok()
            .and_then(|s| s.as_string())
            .and_then(|json| serde_json::from_str::<HistoryState>(&json).ok())
    };
    with_app(|app| app.on_popstate(path, state));
}

#[wasm_bindgen]
pub fn on_input_change(input: &str, value: &str) {
    with_app(|app| app.on_input_change(input, value));
}

#[wasm_bindgen]
pub fn on_input_clear(input: &str) {
    with_app(|app| app.on_input_clear(input));
}

#[wasm_bindgen]
pub fn on_autocomplete_input(input: &str, query: &str) {
    with_app(|app| app.on_autocomplete_input(input, query));
}

#[wasm_bindgen]
pub fn on_suggestion_select(input: &str, index: usize) {
    with_app(|app| app.on_suggestion_select(input, index));
}

/// `form_query` is the form serialized as `application/x-www-form-urlencoded`.
#[wasm_bindgen]
pub fn on_search_submit(form_query: &str) -> bool {
    let fields = match parse_form(form_query) {
        Ok(fields) => fields,
        Err(err) => {
            warn!(%err, "could not read search form");
            Vec::new()
        }
    };
    with_app(|app| app.on_search_submit(fields)).unwrap_or(false)
}

#[wasm_bindgen]
pub fn on_routes_dismiss() {
    with_app(|app| app.on_routes_dismiss());
}

#[wasm_bindgen]
pub fn on_route_enter(index: usize) {
    with_app(|app| app.on_route_enter(index));
}

#[wasm_bindgen]
pub fn on_route_leave(index: usize) {
    with_app(|app| app.on_route_leave(index));
}

#[wasm_bindgen]
pub fn on_clean_map() {
    with_app(|app| app.on_clean_map());
}
