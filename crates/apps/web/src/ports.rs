//! Seams between the controllers and the page they run in.
//!
//! Controllers are plain state machines; everything that touches the DOM, the
//! network, timers or the map provider goes through these traits. The browser
//! build implements them on top of `web_sys`, tests use a recording fake.
//!
//! Asynchronous results come back through [`crate::App`]: a request started
//! with [`Transport::send`] completes as `App::on_response`, a timer started
//! with [`Timers::set_timeout`] expires as `App::on_timer`.

use foundation::{LatLng, LatLngBounds};
use protocol::Endpoint;
use runtime::Ticket;

use crate::config::MapConfig;
use crate::error::MapError;
use crate::navigation::HistoryState;
use crate::role::Role;
use crate::routes_view::RoutesView;

/// Handle to a marker placed on the map canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Handle to a circle or polyline drawn on the map canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
}

/// What a new marker shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: String,
    /// Shown under the title while hovering.
    pub hint: String,
    pub icon: String,
}

/// One entry of an airport disambiguation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportChoice {
    pub id: i64,
    pub name: String,
}

/// Loading indicators on the search form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Spinner<'a> {
    /// Next to an autocomplete input.
    Autocomplete(&'a str),
    /// Inside the submit button.
    Submit,
}

pub trait Transport {
    /// Starts a GET for `endpoint`.
    fn send(&mut self, endpoint: Endpoint) -> Ticket;
    /// Aborts an outstanding request. Its completion may still be delivered.
    fn abort(&mut self, ticket: Ticket);
}

pub trait Timers {
    fn set_timeout(&mut self, delay_ms: u32) -> Ticket;
    fn clear_timeout(&mut self, ticket: Ticket);
}

pub trait PageView {
    /// Whether the link's list item is already marked active.
    fn is_link_active(&self, href: &str) -> bool;
    /// Markup currently in the content region.
    fn content(&self) -> String;
    fn replace_content(&mut self, html: &str);
    /// Marks the link for `href` active and every other link inactive.
    fn set_active_link(&mut self, href: &str);
    fn remove_modal_backdrops(&mut self);
    fn push_history(&mut self, state: &HistoryState, url: &str);
    /// Overwrites the state of the current history entry.
    fn replace_history(&mut self, state: &HistoryState, url: &str);
    /// Leaves the single-page flow and loads `href` as a normal page.
    fn navigate_full(&mut self, href: &str);
}

pub trait FormView {
    fn set_input_value(&mut self, input: &str, value: &str);
    /// Toggles the "has value" state that shows the clear affordance.
    fn set_has_value(&mut self, input: &str, has_value: bool);
    fn set_spinner(&mut self, spinner: Spinner<'_>, visible: bool);
    fn show_suggestions(&mut self, input: &str, labels: &[String]);
    /// Fills and reveals the role's airport list.
    fn show_airport_options(&mut self, role: Role, options: &[AirportChoice]);
    /// Empties and hides the role's airport list.
    fn hide_airport_options(&mut self, role: Role);
    fn render_routes(&mut self, view: &RoutesView);
    fn clear_routes(&mut self);
}

pub trait MapCanvas {
    /// Whether the provider script has loaded.
    fn provider_ready(&self) -> bool;
    /// Injects the provider script; the host reports the load as
    /// `App::on_provider_loaded`.
    fn load_provider_script(&mut self, url: &str);
    fn create_map(&mut self, config: &MapConfig) -> Result<(), MapError>;
    /// Drops the current canvas and everything drawn on it.
    fn release_map(&mut self);
    fn set_center(&mut self, center: LatLng);
    fn fit_bounds(&mut self, bounds: LatLngBounds);
    fn place_marker(&mut self, spec: &MarkerSpec) -> MarkerId;
    fn remove_marker(&mut self, id: MarkerId);
    fn draw_circle(&mut self, center: LatLng, radius_m: f64) -> ShapeId;
    fn draw_polyline(&mut self, path: &[LatLng]) -> ShapeId;
    fn remove_shape(&mut self, id: ShapeId);
}

pub trait Geolocation {
    /// Asks for the user's position. Returns `false` when geolocation is
    /// unavailable; a fix arrives later as `App::on_geolocation`, a denial
    /// never arrives.
    fn request_position(&mut self) -> bool;
}

/// Everything the application needs from its page.
pub trait Host: Transport + Timers + PageView + FormView + MapCanvas + Geolocation {}

impl<T> Host for T where T: Transport + Timers + PageView + FormView + MapCanvas + Geolocation {}
