//! Recording host for controller tests.

use std::collections::BTreeMap;

use foundation::{LatLng, LatLngBounds};
use protocol::Endpoint;
use runtime::{Ticket, TicketSource};

use crate::config::MapConfig;
use crate::error::MapError;
use crate::navigation::HistoryState;
use crate::ports::{
    AirportChoice, FormView, Geolocation, MapCanvas, MarkerId, MarkerSpec, PageView, ShapeId,
    Spinner, Timers, Transport,
};
use crate::role::Role;
use crate::routes_view::RoutesView;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { center: LatLng, radius_m: f64 },
    Polyline(Vec<LatLng>),
}

#[derive(Debug)]
pub struct FakeHost {
    tickets: TicketSource,
    next_handle: u64,

    pub sent: Vec<(Ticket, Endpoint)>,
    pub aborted: Vec<Ticket>,
    pub timers: Vec<(Ticket, u32)>,
    pub cleared_timers: Vec<Ticket>,

    pub active_link: Option<String>,
    pub content: String,
    pub backdrops: usize,
    pub history: Vec<(HistoryState, String)>,
    pub full_navigations: Vec<String>,

    pub inputs: BTreeMap<String, String>,
    pub has_value: BTreeMap<String, bool>,
    /// `submit` or `autocomplete:{input}`.
    pub spinners: BTreeMap<String, bool>,
    pub suggestions: BTreeMap<String, Vec<String>>,
    /// Visible airport lists only.
    pub airport_options: BTreeMap<Role, Vec<AirportChoice>>,
    pub routes: Option<RoutesView>,

    pub provider_ready: bool,
    pub map_error: Option<MapError>,
    pub scripts: Vec<String>,
    pub maps_created: usize,
    pub maps_released: usize,
    pub center: Option<LatLng>,
    pub fitted: Vec<LatLngBounds>,
    pub markers: BTreeMap<MarkerId, MarkerSpec>,
    pub shapes: BTreeMap<ShapeId, Shape>,

    pub geolocation_available: bool,
    pub position_requests: usize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            tickets: TicketSource::new(),
            next_handle: 1,
            sent: Vec::new(),
            aborted: Vec::new(),
            timers: Vec::new(),
            cleared_timers: Vec::new(),
            active_link: None,
            content: String::new(),
            backdrops: 0,
            history: Vec::new(),
            full_navigations: Vec::new(),
            inputs: BTreeMap::new(),
            has_value: BTreeMap::new(),
            spinners: BTreeMap::new(),
            suggestions: BTreeMap::new(),
            airport_options: BTreeMap::new(),
            routes: None,
            provider_ready: true,
            map_error: None,
            scripts: Vec::new(),
            maps_created: 0,
            maps_released: 0,
            center: None,
            fitted: Vec::new(),
            markers: BTreeMap::new(),
            shapes: BTreeMap::new(),
            geolocation_available: true,
            position_requests: 0,
        }
    }

    pub fn sent_endpoints(&self) -> Vec<Endpoint> {
        self.sent.iter().map(|(_, e)| e.clone()).collect()
    }

    /// Ticket of the most recent request.
    pub fn last_ticket(&self) -> Ticket {
        self.sent.last().map(|(t, _)| *t).expect("no request sent")
    }

    /// Ticket of the most recent timer.
    pub fn last_timer(&self) -> Ticket {
        self.timers.last().map(|(t, _)| *t).expect("no timer set")
    }

    fn handle(&mut self) -> u64 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }
}

impl Transport for FakeHost {
    fn send(&mut self, endpoint: Endpoint) -> Ticket {
        let ticket = self.tickets.next_ticket();
        self.sent.push((ticket, endpoint));
        ticket
    }

    fn abort(&mut self, ticket: Ticket) {
        self.aborted.push(ticket);
    }
}

impl Timers for FakeHost {
    fn set_timeout(&mut self, delay_ms: u32) -> Ticket {
        let ticket = self.tickets.next_ticket();
        self.timers.push((ticket, delay_ms));
        ticket
    }

    fn clear_timeout(&mut self, ticket: Ticket) {
        self.cleared_timers.push(ticket);
    }
}

impl PageView for FakeHost {
    fn is_link_active(&self, href: &str) -> bool {
        self.active_link.as_deref() == Some(href)
    }

    fn content(&self) -> String {
        self.content.clone()
    }

    fn replace_content(&mut self, html: &str) {
        self.content = html.to_string();
    }

    fn set_active_link(&mut self, href: &str) {
        self.active_link = Some(href.to_string());
    }

    fn remove_modal_backdrops(&mut self) {
        self.backdrops = 0;
    }

    fn push_history(&mut self, state: &HistoryState, url: &str) {
        self.history.push((state.clone(), url.to_string()));
    }

    fn replace_history(&mut self, state: &HistoryState, url: &str) {
        self.history.pop();
        self.history.push((state.clone(), url.to_string()));
    }

    fn navigate_full(&mut self, href: &str) {
        self.full_navigations.push(href.to_string());
    }
}

impl FormView for FakeHost {
    fn set_input_value(&mut self, input: &str, value: &str) {
        self.inputs.insert(input.to_string(), value.to_string());
    }

    fn set_has_value(&mut self, input: &str, has_value: bool) {
        self.has_value.insert(input.to_string(), has_value);
    }

    fn set_spinner(&mut self, spinner: Spinner<'_>, visible: bool) {
        let key = match spinner {
            Spinner::Submit => "submit".to_string(),
            Spinner::Autocomplete(input) => format!("autocomplete:{input}"),
        };
        self.spinners.insert(key, visible);
    }

    fn show_suggestions(&mut self, input: &str, labels: &[String]) {
        if labels.is_empty() {
            self.suggestions.remove(input);
        } else {
            self.suggestions.insert(input.to_string(), labels.to_vec());
        }
    }

    fn show_airport_options(&mut self, role: Role, options: &[AirportChoice]) {
        self.airport_options.insert(role, options.to_vec());
    }

    fn hide_airport_options(&mut self, role: Role) {
        self.airport_options.remove(&role);
    }

    fn render_routes(&mut self, view: &RoutesView) {
        self.routes = Some(view.clone());
    }

    fn clear_routes(&mut self) {
        self.routes = None;
    }
}

impl MapCanvas for FakeHost {
    fn provider_ready(&self) -> bool {
        self.provider_ready
    }

    fn load_provider_script(&mut self, url: &str) {
        self.scripts.push(url.to_string());
    }

    fn create_map(&mut self, config: &MapConfig) -> Result<(), MapError> {
        if let Some(err) = self.map_error.clone() {
            return Err(err);
        }
        self.maps_created += 1;
        self.center = Some(config.center());
        Ok(())
    }

    fn release_map(&mut self) {
        self.maps_released += 1;
        self.markers.clear();
        self.shapes.clear();
    }

    fn set_center(&mut self, center: LatLng) {
        self.center = Some(center);
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) {
        self.fitted.push(bounds);
    }

    fn place_marker(&mut self, spec: &MarkerSpec) -> MarkerId {
        let id = MarkerId(self.handle());
        self.markers.insert(id, spec.clone());
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.markers.remove(&id);
    }

    fn draw_circle(&mut self, center: LatLng, radius_m: f64) -> ShapeId {
        let id = ShapeId(self.handle());
        self.shapes.insert(id, Shape::Circle { center, radius_m });
        id
    }

    fn draw_polyline(&mut self, path: &[LatLng]) -> ShapeId {
        let id = ShapeId(self.handle());
        self.shapes.insert(id, Shape::Polyline(path.to_vec()));
        id
    }

    fn remove_shape(&mut self, id: ShapeId) {
        self.shapes.remove(&id);
    }
}

impl Geolocation for FakeHost {
    fn request_position(&mut self) -> bool {
        self.position_requests += 1;
        self.geolocation_available
    }
}
