use std::collections::BTreeMap;

use foundation::{LatLng, LatLngBounds};
use gloo_net::http::Request;
use js_sys::Reflect;
use protocol::Endpoint;
use runtime::{Ticket, TicketSource};
use serde::Serialize;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    AbortController, AbortSignal, Document, Element, HtmlInputElement, HtmlScriptElement, Window,
};

use super::exports::with_app;
use super::maps;
use crate::config::{MapConfig, StyleRule};
use crate::error::{FetchError, MapError};
use crate::navigation::HistoryState;
use crate::ports::{
    AirportChoice, FormView, Geolocation, MapCanvas, MarkerId, MarkerSpec, MouseButton, PageView,
    ShapeId, Spinner, Timers, Transport,
};
use crate::role::Role;
use crate::routes_view::{RoutesView, escape_html};

/// Element ids and selectors of the page markup.
const CONTENT_ID: &str = "content";
const ROUTES_ID: &str = "js-routes";
const NAV_ITEM_SELECTOR: &str = ".nav li";
const BACKDROP_SELECTOR: &str = ".modal-backdrop";
const SUBMIT_SPINNER_SELECTOR: &str = "#find-tickets [type=\"submit\"] i";
const FIELD_GROUP_SELECTOR: &str = ".form-group";
const FIELD_SPINNER_SELECTOR: &str = ".glyphicon-refresh";
const EMPTY_VALUE_CLASS: &str = "has-empty-value";
const HIDDEN_CLASS: &str = "hidden";
const ACTIVE_CLASS: &str = "active";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions<'a> {
    center: JsLatLng,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    styles: &'a [StyleRule],
}

#[derive(Serialize)]
struct JsLatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for JsLatLng {
    fn from(p: LatLng) -> Self {
        Self { lat: p.lat, lng: p.lng }
    }
}

/// A live map plus the callbacks its JS listeners hold on to.
struct Canvas {
    map: JsValue,
    _on_move: Closure<dyn FnMut(f64, f64, f64)>,
    _on_out: Closure<dyn FnMut()>,
    _on_marker: Closure<dyn FnMut(f64, u32)>,
}

/// [`crate::ports::Host`] on top of the real page.
pub struct BrowserHost {
    window: Window,
    document: Document,
    tickets: TicketSource,
    inflight: BTreeMap<Ticket, AbortController>,
    timers: BTreeMap<Ticket, i32>,
    canvas: Option<Canvas>,
    overlays: BTreeMap<u64, JsValue>,
    next_overlay: u64,
}

impl BrowserHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        Ok(Self {
            window,
            document,
            tickets: TicketSource::new(),
            inflight: BTreeMap::new(),
            timers: BTreeMap::new(),
            canvas: None,
            overlays: BTreeMap::new(),
            next_overlay: 1,
        })
    }

    /// Current location path, e.g. `/technologies`.
    pub fn path(&self) -> String {
        self.window
            .location()
            .pathname()
            .unwrap_or_else(|_| "/".to_string())
    }

    pub(super) fn request_finished(&mut self, ticket: Ticket) {
        self.inflight.remove(&ticket);
    }

    pub(super) fn timer_fired(&mut self, ticket: Ticket) {
        self.timers.remove(&ticket);
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn input(&self, id: &str) -> Option<HtmlInputElement> {
        self.element(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }

    fn link_item(&self, href: &str) -> Option<Element> {
        let selector = format!("{NAV_ITEM_SELECTOR} a[href=\"{}\"]", href.replace('"', "\\\""));
        self.query(&selector).and_then(|a| a.parent_element())
    }

    fn field_group(&self, input: &str) -> Option<Element> {
        self.element(input)
            .and_then(|el| el.closest(FIELD_GROUP_SELECTOR).ok().flatten())
    }

    fn airport_select(&self, role: Role) -> Option<Element> {
        self.query(&format!("select[name=\"{}\"]", role.airport_field()))
    }

    fn next_overlay_id(&mut self) -> u64 {
        let id = self.next_overlay;
        self.next_overlay += 1;
        id
    }
}

fn set_hidden(el: &Element, hidden: bool) {
    let _ = el.class_list().toggle_with_force(HIDDEN_CLASS, hidden);
}

fn set_text(el: &Element, html: &str) {
    el.set_inner_html(html);
}

fn history_value(state: &HistoryState) -> Option<JsValue> {
    let json = serde_json::to_string(state).ok()?;
    js_sys::JSON::parse(&json).ok()
}

async fn fetch_text(url: &str, signal: Option<&AbortSignal>) -> Result<String, FetchError> {
    let resp = Request::get(url)
        .abort_signal(signal)
        .send()
        .await
        .map_err(fetch_error)?;
    if !resp.ok() {
        return Err(FetchError::Status(resp.status()));
    }
    resp.text().await.map_err(fetch_error)
}

fn fetch_error(err: gloo_net::Error) -> FetchError {
    match &err {
        gloo_net::Error::JsError(js) if js.name == "AbortError" => FetchError::Aborted,
        _ => FetchError::Network(err.to_string()),
    }
}

fn deliver(ticket: Ticket, result: Result<String, FetchError>) {
    with_app(|app| {
        app.host_mut().request_finished(ticket);
        app.on_response(ticket, result);
    });
}

fn read_position(pos: &JsValue) -> Option<LatLng> {
    let coords = Reflect::get(pos, &JsValue::from_str("coords")).ok()?;
    let lat = Reflect::get(&coords, &JsValue::from_str("latitude")).ok()?.as_f64()?;
    let lng = Reflect::get(&coords, &JsValue::from_str("longitude")).ok()?.as_f64()?;
    Some(LatLng::new(lat, lng))
}

impl Transport for BrowserHost {
    fn send(&mut self, endpoint: Endpoint) -> Ticket {
        let ticket = self.tickets.next_ticket();
        let kind = endpoint.kind();

        let url = match endpoint.url() {
            Ok(url) => url,
            Err(err) => {
                warn!(kind, %err, "could not build request url");
                let err = FetchError::from(err);
                spawn_local(async move { deliver(ticket, Err(err)) });
                return ticket;
            }
        };

        let controller = AbortController::new().ok();
        let signal = controller.as_ref().map(AbortController::signal);
        if let Some(controller) = controller {
            self.inflight.insert(ticket, controller);
        }

        debug!(kind, url = url.as_str(), "request");
        spawn_local(async move {
            let result = fetch_text(&url, signal.as_ref()).await;
            deliver(ticket, result);
        });
        ticket
    }

    fn abort(&mut self, ticket: Ticket) {
        if let Some(controller) = self.inflight.remove(&ticket) {
            controller.abort();
        }
    }
}

impl Timers for BrowserHost {
    fn set_timeout(&mut self, delay_ms: u32) -> Ticket {
        let ticket = self.tickets.next_ticket();
        let callback = Closure::once_into_js(move || {
            with_app(|app| {
                app.host_mut().timer_fired(ticket);
                app.on_timer(ticket);
            });
        });
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            Ok(handle) => {
                self.timers.insert(ticket, handle);
            }
            Err(err) => warn!(?err, "setTimeout failed"),
        }
        ticket
    }

    fn clear_timeout(&mut self, ticket: Ticket) {
        if let Some(handle) = self.timers.remove(&ticket) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl PageView for BrowserHost {
    fn is_link_active(&self, href: &str) -> bool {
        self.link_item(href)
            .is_some_and(|li| li.class_list().contains(ACTIVE_CLASS))
    }

    fn content(&self) -> String {
        self.element(CONTENT_ID)
            .map(|el| el.inner_html())
            .unwrap_or_default()
    }

    fn replace_content(&mut self, html: &str) {
        match self.element(CONTENT_ID) {
            Some(el) => set_text(&el, html),
            None => warn!(id = CONTENT_ID, "content region missing"),
        }
    }

    fn set_active_link(&mut self, href: &str) {
        for li in self.query_all(NAV_ITEM_SELECTOR) {
            let _ = li.class_list().remove_1(ACTIVE_CLASS);
        }
        if let Some(li) = self.link_item(href) {
            let _ = li.class_list().add_1(ACTIVE_CLASS);
        }
    }

    fn remove_modal_backdrops(&mut self) {
        for el in self.query_all(BACKDROP_SELECTOR) {
            el.remove();
        }
    }

    fn push_history(&mut self, state: &HistoryState, url: &str) {
        let Some(value) = history_value(state) else {
            warn!(url, "could not encode history state");
            return;
        };
        let pushed = self
            .window
            .history()
            .and_then(|h| h.push_state_with_url(&value, "", Some(url)));
        if let Err(err) = pushed {
            warn!(url, ?err, "history push failed");
        }
    }

    fn replace_history(&mut self, state: &HistoryState, url: &str) {
        let Some(value) = history_value(state) else {
            warn!(url, "could not encode history state");
            return;
        };
        let replaced = self
            .window
            .history()
            .and_then(|h| h.replace_state_with_url(&value, "", Some(url)));
        if let Err(err) = replaced {
            warn!(url, ?err, "history replace failed");
        }
    }

    fn navigate_full(&mut self, href: &str) {
        if let Err(err) = self.window.location().set_href(href) {
            warn!(href, ?err, "full navigation failed");
        }
    }
}

impl FormView for BrowserHost {
    fn set_input_value(&mut self, input: &str, value: &str) {
        if let Some(el) = self.input(input) {
            el.set_value(value);
        }
    }

    fn set_has_value(&mut self, input: &str, has_value: bool) {
        if let Some(group) = self.field_group(input) {
            let _ = group
                .class_list()
                .toggle_with_force(EMPTY_VALUE_CLASS, !has_value);
        }
    }

    fn set_spinner(&mut self, spinner: Spinner<'_>, visible: bool) {
        let el = match spinner {
            Spinner::Submit => self.query(SUBMIT_SPINNER_SELECTOR),
            Spinner::Autocomplete(input) => self
                .field_group(input)
                .and_then(|g| g.query_selector(FIELD_SPINNER_SELECTOR).ok().flatten()),
        };
        if let Some(el) = el {
            set_hidden(&el, !visible);
        }
    }

    fn show_suggestions(&mut self, input: &str, labels: &[String]) {
        let Some(list) = self.element(&format!("{input}-suggestions")) else {
            return;
        };
        let html: String = labels
            .iter()
            .enumerate()
            .map(|(i, label)| format!("<li data-index=\"{i}\">{}</li>", escape_html(label)))
            .collect();
        set_text(&list, &html);
        set_hidden(&list, labels.is_empty());
    }

    fn show_airport_options(&mut self, role: Role, options: &[AirportChoice]) {
        let Some(select) = self.airport_select(role) else {
            return;
        };
        let html: String = options
            .iter()
            .map(|o| format!("<option value=\"{}\">{}</option>", o.id, escape_html(&o.name)))
            .collect();
        set_text(&select, &html);
        set_hidden(&select, false);
    }

    fn hide_airport_options(&mut self, role: Role) {
        if let Some(select) = self.airport_select(role) {
            set_text(&select, "");
            set_hidden(&select, true);
        }
    }

    fn render_routes(&mut self, view: &RoutesView) {
        if let Some(el) = self.element(ROUTES_ID) {
            set_text(&el, &view.to_html());
            set_hidden(&el, false);
        }
    }

    fn clear_routes(&mut self) {
        if let Some(el) = self.element(ROUTES_ID) {
            set_text(&el, "");
            set_hidden(&el, true);
        }
    }
}

impl MapCanvas for BrowserHost {
    fn provider_ready(&self) -> bool {
        maps::atlas_maps_ready()
    }

    fn load_provider_script(&mut self, url: &str) {
        let script = self
            .document
            .create_element("script")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlScriptElement>().ok());
        let (Some(script), Some(head)) = (script, self.document.head()) else {
            warn!("cannot inject map provider script");
            return;
        };

        script.set_src(url);
        script.set_async(true);
        let on_load = Closure::once_into_js(|| {
            with_app(|app| app.on_provider_loaded());
        });
        script.set_onload(Some(on_load.unchecked_ref()));
        let on_error = Closure::once_into_js(|| warn!("map provider script failed to load"));
        script.set_onerror(Some(on_error.unchecked_ref()));

        if let Err(err) = head.append_child(&script) {
            warn!(?err, "map provider script injection failed");
        }
    }

    fn create_map(&mut self, config: &MapConfig) -> Result<(), MapError> {
        if !maps::atlas_maps_ready() {
            return Err(MapError::ProviderUnavailable);
        }
        let container = self
            .element(&config.container_id)
            .ok_or_else(|| MapError::ContainerMissing(config.container_id.clone()))?;

        let options = serde_json::to_string(&MapOptions {
            center: config.center().into(),
            zoom: config.clamp_zoom(config.zoom),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            styles: &config.theme,
        })
        .map_err(|e| MapError::Provider(e.to_string()))?;

        let on_move = Closure::<dyn FnMut(f64, f64, f64)>::new(|lat, lng, zoom| {
            with_app(|app| app.on_map_pointer_move(LatLng::new(lat, lng), zoom));
        });
        let on_out = Closure::<dyn FnMut()>::new(|| {
            with_app(|app| app.on_map_pointer_out());
        });
        let on_marker = Closure::<dyn FnMut(f64, u32)>::new(|id: f64, button: u32| {
            let button = if button == 2 {
                MouseButton::Secondary
            } else {
                MouseButton::Primary
            };
            with_app(|app| app.on_marker_click(MarkerId(id as u64), button));
        });

        let map = maps::atlas_maps_create(&container, &options, &on_move, &on_out, &on_marker)
            .map_err(|e| MapError::Provider(format!("{e:?}")))?;
        self.canvas = Some(Canvas {
            map,
            _on_move: on_move,
            _on_out: on_out,
            _on_marker: on_marker,
        });
        Ok(())
    }

    fn release_map(&mut self) {
        for (_, overlay) in std::mem::take(&mut self.overlays) {
            maps::atlas_maps_remove(&overlay);
        }
        if let Some(canvas) = self.canvas.take() {
            maps::atlas_maps_release(&canvas.map);
        }
    }

    fn set_center(&mut self, center: LatLng) {
        if let Some(map) = self.canvas.as_ref().map(|c| &c.map) {
            maps::atlas_maps_set_center(map, center.lat, center.lng);
        }
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) {
        if let Some(map) = self.canvas.as_ref().map(|c| &c.map) {
            maps::atlas_maps_fit_bounds(
                map,
                bounds.south_west.lat,
                bounds.south_west.lng,
                bounds.north_east.lat,
                bounds.north_east.lng,
            );
        }
    }

    fn place_marker(&mut self, spec: &MarkerSpec) -> MarkerId {
        let id = self.next_overlay_id();
        if let Some(map) = self.canvas.as_ref().map(|c| &c.map) {
            let marker = maps::atlas_maps_add_marker(
                map,
                id as f64,
                spec.position.lat,
                spec.position.lng,
                &spec.title,
                &spec.hint,
                &spec.icon,
            );
            self.overlays.insert(id, marker);
        }
        MarkerId(id)
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if let Some(overlay) = self.overlays.remove(&id.0) {
            maps::atlas_maps_remove(&overlay);
        }
    }

    fn draw_circle(&mut self, center: LatLng, radius_m: f64) -> ShapeId {
        let id = self.next_overlay_id();
        if let Some(map) = self.canvas.as_ref().map(|c| &c.map) {
            let circle = maps::atlas_maps_circle(map, center.lat, center.lng, radius_m);
            self.overlays.insert(id, circle);
        }
        ShapeId(id)
    }

    fn draw_polyline(&mut self, path: &[LatLng]) -> ShapeId {
        let id = self.next_overlay_id();
        let points: Vec<JsLatLng> = path.iter().copied().map(JsLatLng::from).collect();
        match (self.canvas.as_ref().map(|c| &c.map), serde_json::to_string(&points)) {
            (Some(map), Ok(json)) => {
                let line = maps::atlas_maps_polyline(map, &json);
                self.overlays.insert(id, line);
            }
            (_, Err(err)) => warn!(%err, "could not encode route path"),
            (None, Ok(_)) => {}
        }
        ShapeId(id)
    }

    fn remove_shape(&mut self, id: ShapeId) {
        if let Some(overlay) = self.overlays.remove(&id.0) {
            maps::atlas_maps_remove(&overlay);
        }
    }
}

impl Geolocation for BrowserHost {
    fn request_position(&mut self) -> bool {
        let Ok(geolocation) = self.window.navigator().geolocation() else {
            return false;
        };
        let on_fix = Closure::once_into_js(|pos: JsValue| {
            let Some(position) = read_position(&pos) else {
                return;
            };
            with_app(|app| app.on_geolocation(position));
        });
        let on_error = Closure::once_into_js(|err: JsValue| {
            debug!(?err, "geolocation unavailable");
        });
        geolocation
            .get_current_position_with_error_callback(
                on_fix.unchecked_ref(),
                Some(on_error.unchecked_ref()),
            )
            .is_ok()
    }
}
