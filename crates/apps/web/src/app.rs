use foundation::LatLng;
use runtime::Ticket;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::map_widget::MapWidget;
use crate::navigation::{HistoryState, NavigationController, NavigationOutcome};
use crate::ports::{FormView, Host, MarkerId, MouseButton};
use crate::role::Role;
use crate::search_form::{FormOutcome, SearchForm};

/// Root page path; the only page that hosts the map.
pub const ROOT_PATH: &str = "/";

/// Wires the page's controllers together and routes host events to them.
///
/// Completions from the host are dispatched by ticket ownership: each
/// controller only accepts tickets it issued and still considers live.
pub struct App<H: Host> {
    host: H,
    navigation: NavigationController,
    search: SearchForm,
    map: MapWidget,
}

impl<H: Host> App<H> {
    pub fn new(host: H, config: AppConfig) -> Self {
        Self {
            host,
            navigation: NavigationController::new(),
            search: SearchForm::new(&config.form),
            map: MapWidget::new(config.map),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn map(&self) -> &MapWidget {
        &self.map
    }

    pub fn search(&self) -> &SearchForm {
        &self.search
    }

    /// First load of `path`. The map is created right away on the root page.
    pub fn on_page_loaded(&mut self, path: &str) {
        info!(path, "page loaded");
        self.navigation.on_page_loaded(path, &mut self.host);
        if path == ROOT_PATH {
            self.init_map();
        }
    }

    pub fn on_link_click(&mut self, href: &str) -> bool {
        self.navigation.on_link_click(href, &mut self.host)
    }

    pub fn on_popstate(&mut self, path: &str, state: Option<HistoryState>) {
        let outcome = self.navigation.on_popstate(path, state, &mut self.host);
        self.after_navigation(&outcome);
    }

    fn after_navigation(&mut self, outcome: &NavigationOutcome) {
        if !matches!(outcome, NavigationOutcome::ContentReplaced { .. }) {
            return;
        }
        self.map.detach(&mut self.host);
        self.search.reset(&mut self.host);
        if outcome.entered_root() {
            self.init_map();
        }
    }

    pub fn on_input_change(&mut self, input: &str, value: &str) {
        self.search.on_input_change(input, value, &mut self.host);
    }

    pub fn on_input_clear(&mut self, input: &str) {
        if let Some(role) = self.search.clear_input(input, &mut self.host) {
            if let Some(point) = self.map.release(role) {
                debug!(role = role.as_str(), label = point.label.as_str(), "binding released");
            }
        }
    }

    pub fn on_autocomplete_input(&mut self, input: &str, query: &str) {
        self.search
            .on_autocomplete_input(input, query, &mut self.host);
    }

    /// The user picked suggestion `index` from the list under `input`.
    pub fn on_suggestion_select(&mut self, input: &str, index: usize) {
        let Some(suggestion) = self.search.suggestion(input, index).cloned() else {
            debug!(input, index, "unknown suggestion");
            return;
        };
        self.host.show_suggestions(input, &[]);

        let point = suggestion.to_point();
        match Role::from_input(input) {
            Some(role) => self
                .map
                .bind(role, point, &mut self.search, &mut self.host),
            None => {
                self.host.set_input_value(input, &point.label);
                self.host.set_has_value(input, true);
            }
        }
    }

    /// Route search for the serialized form; returns whether a request went out.
    pub fn on_search_submit(&mut self, fields: Vec<(String, String)>) -> bool {
        self.map.clear_route_previews(&mut self.host);
        self.search.submit(fields, &mut self.host)
    }

    pub fn on_routes_dismiss(&mut self) {
        self.search.dismiss_routes(&mut self.host);
        self.map.clear_route_previews(&mut self.host);
    }

    pub fn on_route_enter(&mut self, index: usize) {
        let Some(waypoints) = self.search.route_waypoints(index) else {
            return;
        };
        self.map
            .show_route_preview(index, waypoints, &mut self.host);
    }

    pub fn on_route_leave(&mut self, index: usize) {
        self.map.hide_route_preview(index, &mut self.host);
    }

    pub fn on_marker_click(&mut self, marker: MarkerId, button: MouseButton) {
        self.map
            .on_marker_click(marker, button, &mut self.search, &mut self.host);
    }

    pub fn on_map_pointer_move(&mut self, position: LatLng, zoom: f64) {
        self.map.on_pointer_move(position, zoom, &mut self.host);
    }

    pub fn on_map_pointer_out(&mut self) {
        self.map.on_pointer_out(&mut self.host);
    }

    pub fn on_clean_map(&mut self) {
        self.map.clear_markers(&mut self.host);
    }

    pub fn init_map(&mut self) {
        self.map.initialize(&mut self.host);
    }

    pub fn on_provider_loaded(&mut self) {
        self.map.on_provider_loaded(&mut self.host);
    }

    pub fn on_geolocation(&mut self, position: LatLng) {
        self.map
            .on_geolocation(position, &mut self.search, &mut self.host);
    }

    pub fn on_response(&mut self, ticket: Ticket, result: Result<String, FetchError>) {
        if self.navigation.owns(ticket) {
            let outcome = self.navigation.on_response(ticket, result, &mut self.host);
            self.after_navigation(&outcome);
        } else if self.search.owns(ticket) {
            match self.search.on_response(ticket, result, &mut self.host) {
                FormOutcome::None => {}
                FormOutcome::ClosestCity { role, point } => {
                    self.map.record_binding(role, point, &mut self.host);
                }
            }
        } else if self.map.owns(ticket) {
            self.map.on_response(ticket, result, &mut self.host);
        } else {
            debug!(?ticket, "response for a superseded request");
        }
    }

    pub fn on_timer(&mut self, timer: Ticket) {
        if self.search.owns_timer(timer) {
            self.search.on_timer(timer, &mut self.host);
        } else if self.map.owns_timer(timer) {
            self.map.on_timer(timer, &mut self.host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::App;
    use crate::config::AppConfig;
    use crate::navigation::HistoryState;
    use crate::ports::{AirportChoice, MouseButton};
    use crate::role::Role;
    use crate::testing::FakeHost;
    use foundation::LatLng;
    use pretty_assertions::assert_eq;
    use protocol::Endpoint;

    fn root_app() -> App<FakeHost> {
        let mut app = App::new(FakeHost::new(), AppConfig::default());
        app.on_page_loaded("/");
        assert!(app.map().is_initialized());
        app
    }

    fn respond(app: &mut App<FakeHost>, body: &str) {
        let ticket = app.host().last_ticket();
        app.on_response(ticket, Ok(body.to_string()));
    }

    #[test]
    fn typed_city_becomes_origin_with_airports_and_marker() {
        let mut app = root_app();

        app.on_autocomplete_input("from", "Lon");
        let timer = app.host().last_timer();
        app.on_timer(timer);
        respond(
            &mut app,
            r#"{"suggestions":[{"value":"London","data":{"lat":51.5,"lng":-0.12,"country_code":"GB"}}]}"#,
        );
        assert_eq!(
            app.host().suggestions.get("from"),
            Some(&vec!["London (GB)".to_string()])
        );

        app.on_suggestion_select("from", 0);
        assert_eq!(
            app.host().sent_endpoints().last(),
            Some(&Endpoint::Airports {
                position: LatLng::new(51.5, -0.12),
                limit: 5,
                find_closest_city: false
            })
        );
        respond(
            &mut app,
            r#"{"airports":[{"id":1,"name":"Heathrow"},{"id":2,"name":"Gatwick"}]}"#,
        );

        let host = app.host();
        assert_eq!(
            host.airport_options.get(&Role::From),
            Some(&vec![
                AirportChoice {
                    id: 1,
                    name: "Heathrow".into()
                },
                AirportChoice {
                    id: 2,
                    name: "Gatwick".into()
                },
            ])
        );
        assert_eq!(host.inputs.get("from").map(String::as_str), Some("London (GB)"));
        assert_eq!(
            host.markers.values().map(|m| m.position).collect::<Vec<_>>(),
            vec![LatLng::new(51.5, -0.12)]
        );
        assert!(host.fitted.is_empty());
        assert!(host.suggestions.get("from").is_none());
    }

    #[test]
    fn geolocated_closest_city_is_bound_as_origin() {
        let mut app = root_app();
        app.on_geolocation(LatLng::new(49.8, 24.0));
        respond(
            &mut app,
            r#"{"airports":[{"id":7,"name":"Lviv Intl"}],
                "closest_city":{"value":"Lviv","data":{"lat":49.84,"lng":24.03,"country_code":"UA"}}}"#,
        );

        assert_eq!(app.map().bound().get(Role::From).unwrap().label, "Lviv (UA)");
        assert_eq!(
            app.host().inputs.get("from").map(String::as_str),
            Some("Lviv (UA)")
        );
        assert_eq!(app.host().markers.len(), 1);
        assert_eq!(app.host().sent.len(), 1);
    }

    #[test]
    fn clearing_input_releases_binding() {
        let mut app = root_app();
        let marker = app
            .map
            .add_marker(
                foundation::LocationPoint::new("Rome", LatLng::new(41.9, 12.5)),
                &mut app.host,
            )
            .unwrap();
        app.on_marker_click(marker, MouseButton::Primary);
        assert_eq!(app.map().bound().len(), 1);

        app.on_input_clear("to");

        assert!(app.map().bound().is_empty());
        assert!(app.host().airport_options.get(&Role::To).is_none());
        assert_eq!(app.host().inputs.get("to").map(String::as_str), Some(""));
    }

    #[test]
    fn leaving_root_detaches_map_and_returning_recreates_it() {
        let mut app = root_app();
        app.on_link_click("/technologies");
        respond(&mut app, "<h1>Technologies</h1>");
        assert!(!app.map().is_initialized());
        assert_eq!(app.host().maps_released, 1);

        app.on_popstate(
            "/",
            Some(HistoryState {
                content: "<div id=\"map\"></div>".into(),
            }),
        );
        assert!(app.map().is_initialized());
        assert_eq!(app.host().maps_created, 2);
    }

    #[test]
    fn route_hover_previews_and_dismiss_clears_them() {
        let mut app = root_app();
        assert!(app.on_search_submit(vec![
            ("from_airport".into(), "1".into()),
            ("to_airport".into(), "2".into()),
        ]));
        respond(
            &mut app,
            r#"{"routes":{"0":[{"nodes":[
                {"airport_name":"A","latitude":1,"longitude":1},
                {"airport_name":"B","latitude":2,"longitude":2}
            ],"total_distance":157}]}}"#,
        );

        app.on_route_enter(0);
        app.on_route_enter(0);
        assert_eq!(app.host().shapes.len(), 1);
        app.on_route_leave(0);
        assert!(app.host().shapes.is_empty());

        app.on_route_enter(0);
        app.on_routes_dismiss();
        assert!(app.host().shapes.is_empty());
        assert!(app.host().routes.is_none());
    }

    #[test]
    fn unknown_ticket_is_ignored() {
        let mut app = root_app();
        app.on_response(runtime::Ticket(999), Ok("{}".into()));
        app.on_timer(runtime::Ticket(999));
        assert!(app.host().sent.is_empty());
    }

    #[test]
    fn clean_map_removes_markers() {
        let mut app = root_app();
        app.on_map_pointer_move(LatLng::new(50.0, 10.0), 5.0);
        let timer = app.host().last_timer();
        app.on_timer(timer);
        respond(
            &mut app,
            r#"{"json_list":[{"city_names":["Frankfurt"],"latitude":50.1,"longitude":8.7}]}"#,
        );
        assert_eq!(app.map().marker_count(), 1);
        app.on_clean_map();
        assert_eq!(app.map().marker_count(), 0);
        assert!(app.host().markers.is_empty());
    }
}
