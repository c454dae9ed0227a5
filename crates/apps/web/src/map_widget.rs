use std::collections::BTreeMap;

use foundation::math::{circle_bounds, discovery_radius_m};
use foundation::{LatLng, LocationPoint};
use protocol::{CitiesResponse, Endpoint, decode};
use runtime::{Debouncer, Slot, Ticket};
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::error::{FetchError, MapError};
use crate::ports::{
    FormView, Geolocation, MapCanvas, MarkerId, MarkerSpec, MouseButton, ShapeId, Timers,
    Transport,
};
use crate::role::{BoundPointSet, Role};
use crate::search_form::SearchForm;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapPhase {
    Uninitialized,
    /// Waiting for the injected provider script to load.
    AwaitingProvider,
    Initialized,
}

#[derive(Debug, Clone, PartialEq)]
struct MarkerRecord {
    point: LocationPoint,
    handle: MarkerId,
}

/// Map canvas state: city markers, bound origin/destination, pointer-driven
/// city discovery and route previews.
#[derive(Debug)]
pub struct MapWidget {
    config: MapConfig,
    phase: MapPhase,
    script_requested: bool,
    markers: Vec<MarkerRecord>,
    bound: BoundPointSet,
    discovery: Debouncer,
    lookup: Slot,
    radius_indicator: Option<ShapeId>,
    pointer: Option<(LatLng, f64)>,
    previews: BTreeMap<usize, ShapeId>,
}

impl MapWidget {
    pub fn new(config: MapConfig) -> Self {
        let discovery = Debouncer::new(config.discovery_delay_ms);
        Self {
            config,
            phase: MapPhase::Uninitialized,
            script_requested: false,
            markers: Vec::new(),
            bound: BoundPointSet::new(),
            discovery,
            lookup: Slot::new(),
            radius_indicator: None,
            pointer: None,
            previews: BTreeMap::new(),
        }
    }

    pub fn phase(&self) -> MapPhase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.phase == MapPhase::Initialized
    }

    pub fn bound(&self) -> &BoundPointSet {
        &self.bound
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = &LocationPoint> {
        self.markers.iter().map(|m| &m.point)
    }

    pub fn owns(&self, ticket: Ticket) -> bool {
        self.lookup.is_live(ticket)
    }

    pub fn owns_timer(&self, timer: Ticket) -> bool {
        self.discovery.owns(timer)
    }

    /// Creates the canvas. Calling it on a live map does nothing; when the
    /// provider is missing its script is injected once and creation resumes
    /// from [`MapWidget::on_provider_loaded`].
    pub fn initialize<H: MapCanvas + Geolocation>(&mut self, host: &mut H) {
        match self.phase {
            MapPhase::Initialized => {
                debug!("map already initialized");
                return;
            }
            MapPhase::AwaitingProvider => {
                debug!("map provider still loading");
                return;
            }
            MapPhase::Uninitialized => {}
        }

        if !host.provider_ready() {
            self.await_provider(host);
            return;
        }

        match host.create_map(&self.config) {
            Ok(()) => {
                self.phase = MapPhase::Initialized;
                info!(container = self.config.container_id.as_str(), "map initialized");
                if !host.request_position() {
                    debug!("geolocation unavailable");
                }
            }
            Err(MapError::ProviderUnavailable) => self.await_provider(host),
            Err(err) => warn!(%err, "map initialization failed"),
        }
    }

    fn await_provider<H: MapCanvas>(&mut self, host: &mut H) {
        self.phase = MapPhase::AwaitingProvider;
        if !self.script_requested {
            self.script_requested = true;
            host.load_provider_script(&self.config.script_url());
        }
    }

    pub fn on_provider_loaded<H: MapCanvas + Geolocation>(&mut self, host: &mut H) {
        if self.phase != MapPhase::AwaitingProvider {
            return;
        }
        self.phase = MapPhase::Uninitialized;
        if !host.provider_ready() {
            warn!("map provider script loaded without a usable provider");
            return;
        }
        self.initialize(host);
    }

    /// Tears the canvas down after its container left the page.
    pub fn detach<H: Transport + Timers + MapCanvas>(&mut self, host: &mut H) {
        if let Some(timer) = self.discovery.cancel() {
            host.clear_timeout(timer);
        }
        if let Some(pending) = self.lookup.take() {
            host.abort(pending);
        }
        if self.phase == MapPhase::Initialized {
            host.release_map();
        }
        self.markers.clear();
        self.bound.clear();
        self.radius_indicator = None;
        self.pointer = None;
        self.previews.clear();
        self.phase = MapPhase::Uninitialized;
    }

    /// Centers on the user and resolves the closest city as the origin.
    pub fn on_geolocation<H: Transport + MapCanvas>(
        &mut self,
        position: LatLng,
        form: &mut SearchForm,
        host: &mut H,
    ) {
        if !self.is_initialized() || !position.is_finite() {
            return;
        }
        host.set_center(position);
        form.resolve_airports(Role::From, position, true, host);
    }

    /// Places a marker unless one already sits at the same place.
    pub fn add_marker<H: MapCanvas>(&mut self, point: LocationPoint, host: &mut H) -> Option<MarkerId> {
        if !self.is_initialized() {
            return None;
        }
        if self
            .markers
            .iter()
            .any(|m| m.point.position.same_place(&point.position))
        {
            return None;
        }

        let handle = host.place_marker(&MarkerSpec {
            position: point.position,
            title: point.label.clone(),
            hint: self.config.marker_hint.clone(),
            icon: self.config.marker_icon.clone(),
        });
        self.markers.push(MarkerRecord { point, handle });
        Some(handle)
    }

    /// Primary click makes the marker the destination, secondary the origin.
    pub fn on_marker_click<H: Transport + FormView + MapCanvas>(
        &mut self,
        marker: MarkerId,
        button: MouseButton,
        form: &mut SearchForm,
        host: &mut H,
    ) {
        let Some(point) = self
            .markers
            .iter()
            .find(|m| m.handle == marker)
            .map(|m| m.point.clone())
        else {
            debug!(?marker, "click on unknown marker");
            return;
        };
        let role = match button {
            MouseButton::Primary => Role::To,
            MouseButton::Secondary => Role::From,
        };
        self.bind(role, point, form, host);
    }

    /// Makes `point` the role's location and asks for its airports.
    pub fn bind<H: Transport + FormView + MapCanvas>(
        &mut self,
        role: Role,
        point: LocationPoint,
        form: &mut SearchForm,
        host: &mut H,
    ) {
        let position = point.position;
        self.record_binding(role, point, host);
        form.resolve_airports(role, position, false, host);
    }

    /// Binding without the airport lookup, for points whose airports are
    /// already being listed.
    pub fn record_binding<H: FormView + MapCanvas>(
        &mut self,
        role: Role,
        point: LocationPoint,
        host: &mut H,
    ) {
        host.set_input_value(role.input_id(), &point.label);
        host.set_has_value(role.input_id(), true);
        self.add_marker(point.clone(), host);
        self.bound.bind(role, point);

        if !self.is_initialized() {
            return;
        }
        if let Some(bounds) = self.bound.fit_bounds() {
            host.fit_bounds(bounds);
        }
    }

    pub fn release(&mut self, role: Role) -> Option<LocationPoint> {
        self.bound.release(role)
    }

    /// Removes every marker ("clean map").
    pub fn clear_markers<H: MapCanvas>(&mut self, host: &mut H) {
        for marker in self.markers.drain(..) {
            host.remove_marker(marker.handle);
        }
    }

    pub fn on_pointer_move<H: Timers + MapCanvas>(&mut self, position: LatLng, zoom: f64, host: &mut H) {
        if !self.is_initialized() {
            return;
        }
        if let Some(shape) = self.radius_indicator.take() {
            host.remove_shape(shape);
        }
        self.pointer = Some((position, zoom));
        let timer = host.set_timeout(self.discovery.delay_ms());
        if let Some(old) = self.discovery.arm(timer) {
            host.clear_timeout(old);
        }
    }

    pub fn on_pointer_out<H: Timers>(&mut self, host: &mut H) {
        if let Some(timer) = self.discovery.cancel() {
            host.clear_timeout(timer);
        }
    }

    /// Debounce expiry: outline the discovery area and look up its cities.
    pub fn on_timer<H: Transport + MapCanvas>(&mut self, timer: Ticket, host: &mut H) {
        if !self.discovery.fire(timer) {
            return;
        }
        let Some((center, zoom)) = self.pointer else {
            return;
        };

        let radius_m = discovery_radius_m(self.config.clamp_zoom(zoom));
        if let Some(shape) = self.radius_indicator.take() {
            host.remove_shape(shape);
        }
        self.radius_indicator = Some(host.draw_circle(center, radius_m));

        if let Some(pending) = self.lookup.take() {
            debug!(?pending, "aborting previous city lookup");
            host.abort(pending);
        }
        let ticket = host.send(Endpoint::Cities {
            bounds: circle_bounds(center, radius_m),
        });
        self.lookup.replace(ticket);
    }

    pub fn on_response<H: MapCanvas>(
        &mut self,
        ticket: Ticket,
        result: Result<String, FetchError>,
        host: &mut H,
    ) {
        if !self.lookup.settle(ticket) {
            debug!(?ticket, "dropping stale city lookup");
            return;
        }
        if let Some(shape) = self.radius_indicator.take() {
            host.remove_shape(shape);
        }

        match result.and_then(|body| Ok(decode::<CitiesResponse>(&body)?)) {
            Ok(resp) => {
                let mut added = 0usize;
                for city in &resp.json_list {
                    let Some(label) = city.label() else {
                        continue;
                    };
                    let point = LocationPoint::new(label, city.position());
                    if self.add_marker(point, host).is_some() {
                        added += 1;
                    }
                }
                debug!(cities = resp.json_list.len(), added, "city lookup settled");
            }
            Err(FetchError::Aborted) => {}
            Err(err) => warn!(%err, "city lookup failed"),
        }
    }

    /// Draws the route through `waypoints` unless item `index` already has one.
    pub fn show_route_preview<H: MapCanvas>(&mut self, index: usize, waypoints: &[LatLng], host: &mut H) {
        if !self.is_initialized() || self.previews.contains_key(&index) || waypoints.len() < 2 {
            return;
        }
        let shape = host.draw_polyline(waypoints);
        self.previews.insert(index, shape);
    }

    pub fn hide_route_preview<H: MapCanvas>(&mut self, index: usize, host: &mut H) {
        if let Some(shape) = self.previews.remove(&index) {
            host.remove_shape(shape);
        }
    }

    pub fn clear_route_previews<H: MapCanvas>(&mut self, host: &mut H) {
        for (_, shape) in std::mem::take(&mut self.previews) {
            host.remove_shape(shape);
        }
    }
}
