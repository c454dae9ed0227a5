use foundation::{LatLng, LocationPoint};
use protocol::{
    AirportsResponse, AutocompleteResponse, Endpoint, RoutesResponse, Suggestion, decode,
    non_empty_fields,
};
use runtime::{Debouncer, Slot, Ticket};
use tracing::{debug, info, warn};

use crate::config::{AutocompleteField, FormConfig};
use crate::error::FetchError;
use crate::ports::{AirportChoice, FormView, Spinner, Timers, Transport};
use crate::role::Role;
use crate::routes_view::RoutesView;

/// Follow-up the caller has to apply after a form response.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    None,
    /// An airport lookup also resolved the city closest to its coordinate.
    ClosestCity { role: Role, point: LocationPoint },
}

#[derive(Debug)]
struct AutocompleteState {
    field: AutocompleteField,
    debounce: Debouncer,
    fetch: Slot,
    pending_query: Option<String>,
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Default)]
struct AirportLookup {
    fetch: Slot,
    find_closest_city: bool,
}

/// Search form state: autocomplete per input, airport lists per role, and
/// the route search itself.
#[derive(Debug)]
pub struct SearchForm {
    airport_limit: u32,
    fields: Vec<AutocompleteState>,
    from_airports: AirportLookup,
    to_airports: AirportLookup,
    submit: Slot,
    routes: Option<RoutesView>,
}

impl SearchForm {
    pub fn new(config: &FormConfig) -> Self {
        let fields = config
            .autocomplete
            .iter()
            .map(|field| AutocompleteState {
                field: field.clone(),
                debounce: Debouncer::new(config.autocomplete_debounce_ms),
                fetch: Slot::new(),
                pending_query: None,
                suggestions: Vec::new(),
            })
            .collect();
        Self {
            airport_limit: config.airport_limit,
            fields,
            from_airports: AirportLookup::default(),
            to_airports: AirportLookup::default(),
            submit: Slot::new(),
            routes: None,
        }
    }

    fn field_mut(&mut self, input: &str) -> Option<&mut AutocompleteState> {
        self.fields.iter_mut().find(|f| f.field.input == input)
    }

    fn airports_mut(&mut self, role: Role) -> &mut AirportLookup {
        match role {
            Role::From => &mut self.from_airports,
            Role::To => &mut self.to_airports,
        }
    }

    /// Whether `ticket` is a request this form is waiting on.
    pub fn owns(&self, ticket: Ticket) -> bool {
        self.submit.is_live(ticket)
            || self.from_airports.fetch.is_live(ticket)
            || self.to_airports.fetch.is_live(ticket)
            || self.fields.iter().any(|f| f.fetch.is_live(ticket))
    }

    pub fn owns_timer(&self, timer: Ticket) -> bool {
        self.fields.iter().any(|f| f.debounce.owns(timer))
    }

    pub fn is_searching(&self) -> bool {
        self.submit.is_pending()
    }

    pub fn routes(&self) -> Option<&RoutesView> {
        self.routes.as_ref()
    }

    pub fn on_input_change<H: FormView>(&mut self, input: &str, value: &str, host: &mut H) {
        host.set_has_value(input, !value.trim().is_empty());
    }

    /// Empties `input`. For a role input the airport list is hidden and any
    /// lookup for it dropped; the role is returned so its binding can be
    /// released.
    pub fn clear_input<H: Transport + Timers + FormView>(
        &mut self,
        input: &str,
        host: &mut H,
    ) -> Option<Role> {
        host.set_input_value(input, "");
        host.set_has_value(input, false);

        if let Some(state) = self.field_mut(input) {
            state.pending_query = None;
            state.suggestions.clear();
            if let Some(timer) = state.debounce.cancel() {
                host.clear_timeout(timer);
            }
            if let Some(pending) = state.fetch.take() {
                host.abort(pending);
                host.set_spinner(Spinner::Autocomplete(input), false);
            }
            host.show_suggestions(input, &[]);
        }

        let role = Role::from_input(input)?;
        if let Some(pending) = self.airports_mut(role).fetch.take() {
            host.abort(pending);
        }
        host.hide_airport_options(role);
        Some(role)
    }

    /// A keystroke in an autocomplete input. The query goes out once the
    /// input has been quiet for the debounce delay.
    pub fn on_autocomplete_input<H: Transport + Timers + FormView>(
        &mut self,
        input: &str,
        query: &str,
        host: &mut H,
    ) {
        let Some(state) = self.field_mut(input) else {
            debug!(input, "input has no suggestion source");
            return;
        };

        if query.trim().is_empty() {
            state.pending_query = None;
            state.suggestions.clear();
            if let Some(timer) = state.debounce.cancel() {
                host.clear_timeout(timer);
            }
            if let Some(pending) = state.fetch.take() {
                host.abort(pending);
                host.set_spinner(Spinner::Autocomplete(input), false);
            }
            host.show_suggestions(input, &[]);
            return;
        }

        let timer = host.set_timeout(state.debounce.delay_ms());
        if let Some(old) = state.debounce.arm(timer) {
            host.clear_timeout(old);
        }
        state.pending_query = Some(query.to_string());
    }

    pub fn on_timer<H: Transport + FormView>(&mut self, timer: Ticket, host: &mut H) {
        let Some(state) = self.fields.iter_mut().find(|f| f.debounce.owns(timer)) else {
            return;
        };
        if !state.debounce.fire(timer) {
            return;
        }
        let Some(query) = state.pending_query.take() else {
            return;
        };

        let ticket = host.send(Endpoint::Autocomplete {
            source: state.field.source.clone(),
            query,
        });
        if let Some(old) = state.fetch.replace(ticket) {
            host.abort(old);
        }
        host.set_spinner(Spinner::Autocomplete(&state.field.input), true);
    }

    /// Suggestion `index` of the last list shown for `input`.
    pub fn suggestion(&self, input: &str, index: usize) -> Option<&Suggestion> {
        self.fields
            .iter()
            .find(|f| f.field.input == input)
            .and_then(|f| f.suggestions.get(index))
    }

    /// Asks for the airports around `position` to fill the role's list.
    pub fn resolve_airports<H: Transport>(
        &mut self,
        role: Role,
        position: LatLng,
        find_closest_city: bool,
        host: &mut H,
    ) {
        let limit = self.airport_limit;
        let ticket = host.send(Endpoint::Airports {
            position,
            limit,
            find_closest_city,
        });
        let lookup = self.airports_mut(role);
        if let Some(old) = lookup.fetch.replace(ticket) {
            host.abort(old);
        }
        lookup.find_closest_city = find_closest_city;
    }

    /// Starts a route search for the serialized form, clearing previous
    /// results. An empty form sends nothing; returns whether a request went
    /// out.
    pub fn submit<H: Transport + FormView>(
        &mut self,
        fields: Vec<(String, String)>,
        host: &mut H,
    ) -> bool {
        self.routes = None;
        host.clear_routes();

        let fields = non_empty_fields(fields);
        if fields.is_empty() {
            debug!("empty search form, nothing to submit");
            host.set_spinner(Spinner::Submit, false);
            return false;
        }

        host.set_spinner(Spinner::Submit, true);
        let ticket = host.send(Endpoint::Routes { fields });
        if let Some(old) = self.submit.replace(ticket) {
            host.abort(old);
        }
        true
    }

    pub fn on_response<H: FormView>(
        &mut self,
        ticket: Ticket,
        result: Result<String, FetchError>,
        host: &mut H,
    ) -> FormOutcome {
        if self.submit.settle(ticket) {
            host.set_spinner(Spinner::Submit, false);
            self.apply_routes(result, host);
            return FormOutcome::None;
        }

        for role in Role::ALL {
            let lookup = self.airports_mut(role);
            if lookup.fetch.settle(ticket) {
                let find_closest_city = lookup.find_closest_city;
                return apply_airports(role, find_closest_city, result, host);
            }
        }

        if let Some(state) = self.fields.iter_mut().find(|f| f.fetch.is_live(ticket)) {
            state.fetch.settle(ticket);
            host.set_spinner(Spinner::Autocomplete(&state.field.input), false);
            match result.and_then(|body| Ok(decode::<AutocompleteResponse>(&body)?)) {
                Ok(resp) => {
                    let labels: Vec<String> =
                        resp.suggestions.iter().map(Suggestion::display_value).collect();
                    host.show_suggestions(&state.field.input, &labels);
                    state.suggestions = resp.suggestions;
                }
                Err(FetchError::Aborted) => {}
                Err(err) => warn!(input = state.field.input.as_str(), %err, "autocomplete failed"),
            }
            return FormOutcome::None;
        }

        debug!(?ticket, "dropping stale form response");
        FormOutcome::None
    }

    fn apply_routes<H: FormView>(&mut self, result: Result<String, FetchError>, host: &mut H) {
        match result.and_then(|body| Ok(decode::<RoutesResponse>(&body)?)) {
            Ok(resp) => {
                let view = RoutesView::from_groups(&resp.routes);
                info!(groups = resp.routes.len(), legs = resp.routes.leg_count(), "routes found");
                host.render_routes(&view);
                self.routes = Some(view);
            }
            Err(FetchError::Aborted) => {}
            Err(err) => warn!(%err, "route search failed"),
        }
    }

    /// Waypoints of route item `index` in the rendered results.
    pub fn route_waypoints(&self, index: usize) -> Option<&[LatLng]> {
        self.routes
            .as_ref()
            .and_then(|view| view.item(index))
            .map(|item| item.waypoints.as_slice())
    }

    /// Closes the results banner.
    pub fn dismiss_routes<H: FormView>(&mut self, host: &mut H) {
        self.routes = None;
        host.clear_routes();
    }

    /// Drops all pending work. Used when the form leaves the page.
    pub fn reset<H: Transport + Timers>(&mut self, host: &mut H) {
        for state in &mut self.fields {
            if let Some(timer) = state.debounce.cancel() {
                host.clear_timeout(timer);
            }
            if let Some(pending) = state.fetch.take() {
                host.abort(pending);
            }
            state.pending_query = None;
            state.suggestions.clear();
        }
        for pending in [
            self.from_airports.fetch.take(),
            self.to_airports.fetch.take(),
            self.submit.take(),
        ]
        .into_iter()
        .flatten()
        {
            host.abort(pending);
        }
        self.routes = None;
    }
}

fn apply_airports<H: FormView>(
    role: Role,
    find_closest_city: bool,
    result: Result<String, FetchError>,
    host: &mut H,
) -> FormOutcome {
    let resp = match result.and_then(|body| Ok(decode::<AirportsResponse>(&body)?)) {
        Ok(resp) => resp,
        Err(FetchError::Aborted) => return FormOutcome::None,
        Err(err) => {
            warn!(role = role.as_str(), %err, "airport lookup failed");
            host.hide_airport_options(role);
            return FormOutcome::None;
        }
    };

    let choices: Vec<AirportChoice> = resp
        .airports
        .iter()
        .map(|a| AirportChoice {
            id: a.id,
            name: a.display_name().to_string(),
        })
        .collect();
    host.show_airport_options(role, &choices);

    match resp.closest_city {
        Some(city) if find_closest_city => FormOutcome::ClosestCity {
            role,
            point: city.to_point(),
        },
        _ => FormOutcome::None,
    }
}

#[cfg(test)]
mod tests {
    use super::{FormOutcome, SearchForm};
    use crate::config::FormConfig;
    use crate::error::FetchError;
    use crate::ports::AirportChoice;
    use crate::role::Role;
    use crate::testing::FakeHost;
    use foundation::{LatLng, LocationPoint};
    use pretty_assertions::assert_eq;
    use protocol::Endpoint;

    fn form() -> SearchForm {
        SearchForm::new(&FormConfig::default())
    }

    const LONDON: &str =
        r#"{"suggestions":[{"value":"London","data":{"lat":51.5,"lng":-0.12,"country_code":"GB"}}]}"#;

    #[test]
    fn input_change_toggles_has_value() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.on_input_change("from", "Lo", &mut host);
        assert_eq!(host.has_value.get("from"), Some(&true));
        f.on_input_change("from", "  ", &mut host);
        assert_eq!(host.has_value.get("from"), Some(&false));
    }

    #[test]
    fn autocomplete_waits_for_debounce_then_queries() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.on_autocomplete_input("from", "L", &mut host);
        f.on_autocomplete_input("from", "Lo", &mut host);
        f.on_autocomplete_input("from", "Lon", &mut host);
        assert!(host.sent.is_empty());
        assert_eq!(host.cleared_timers.len(), 2);

        let timer = host.last_timer();
        assert!(f.owns_timer(timer));
        f.on_timer(timer, &mut host);

        assert_eq!(
            host.sent_endpoints(),
            vec![Endpoint::Autocomplete {
                source: "cities".into(),
                query: "Lon".into()
            }]
        );
        assert_eq!(host.spinners.get("autocomplete:from"), Some(&true));
    }

    #[test]
    fn suggestions_are_shown_with_country_code() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.on_autocomplete_input("from", "Lon", &mut host);
        f.on_timer(host.last_timer(), &mut host);
        let ticket = host.last_ticket();

        f.on_response(ticket, Ok(LONDON.into()), &mut host);

        assert_eq!(
            host.suggestions.get("from"),
            Some(&vec!["London (GB)".to_string()])
        );
        assert_eq!(host.spinners.get("autocomplete:from"), Some(&false));
        let s = f.suggestion("from", 0).unwrap();
        assert_eq!(s.position(), LatLng::new(51.5, -0.12));
    }

    #[test]
    fn failed_autocomplete_hides_spinner_and_keeps_list_closed() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.on_autocomplete_input("from", "Lon", &mut host);
        f.on_timer(host.last_timer(), &mut host);
        let ticket = host.last_ticket();
        assert_eq!(host.spinners.get("autocomplete:from"), Some(&true));

        f.on_response(ticket, Err(FetchError::Status(500)), &mut host);

        assert_eq!(host.spinners.get("autocomplete:from"), Some(&false));
        assert!(host.suggestions.get("from").is_none());
        assert!(f.suggestion("from", 0).is_none());
        assert!(!f.owns(ticket));
    }

    #[test]
    fn blanking_the_query_drops_the_lookup_in_flight() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.on_autocomplete_input("from", "Lon", &mut host);
        f.on_timer(host.last_timer(), &mut host);
        let ticket = host.last_ticket();

        f.on_autocomplete_input("from", "", &mut host);

        assert_eq!(host.aborted, vec![ticket]);
        assert!(!f.owns(ticket));
        assert_eq!(host.spinners.get("autocomplete:from"), Some(&false));

        f.on_response(ticket, Ok(LONDON.into()), &mut host);
        assert!(host.suggestions.get("from").is_none());
        assert!(f.suggestion("from", 0).is_none());
    }

    #[test]
    fn stale_autocomplete_response_is_discarded() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.on_autocomplete_input("to", "Pa", &mut host);
        f.on_timer(host.last_timer(), &mut host);
        let first = host.last_ticket();
        f.on_autocomplete_input("to", "Par", &mut host);
        f.on_timer(host.last_timer(), &mut host);
        let second = host.last_ticket();

        assert_eq!(host.aborted, vec![first]);
        assert!(!f.owns(first));
        f.on_response(first, Ok(LONDON.into()), &mut host);
        assert!(host.suggestions.get("to").is_none());
        assert!(f.owns(second));
    }

    #[test]
    fn empty_form_sends_nothing_and_hides_spinner() {
        let mut host = FakeHost::new();
        host.spinners.insert("submit".into(), true);
        let mut f = form();
        let sent = f.submit(
            vec![("from_airport".into(), "".into()), ("to_airport".into(), " ".into())],
            &mut host,
        );
        assert!(!sent);
        assert!(host.sent.is_empty());
        assert_eq!(host.spinners.get("submit"), Some(&false));
    }

    #[test]
    fn submit_keeps_non_empty_fields_and_hides_spinner_on_failure() {
        let mut host = FakeHost::new();
        let mut f = form();
        assert!(f.submit(
            vec![
                ("from_airport".into(), "12".into()),
                ("to_airport".into(), "34".into()),
                ("note".into(), "".into()),
            ],
            &mut host,
        ));
        assert_eq!(host.spinners.get("submit"), Some(&true));
        assert_eq!(
            host.sent_endpoints(),
            vec![Endpoint::Routes {
                fields: vec![
                    ("from_airport".into(), "12".into()),
                    ("to_airport".into(), "34".into()),
                ]
            }]
        );

        f.on_response(host.last_ticket(), Err(FetchError::Status(502)), &mut host);
        assert_eq!(host.spinners.get("submit"), Some(&false));
        assert!(host.routes.is_none());
        assert!(!f.is_searching());
    }

    #[test]
    fn routes_response_renders_and_keeps_waypoints() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.submit(vec![("from_airport".into(), "1".into())], &mut host);
        let body = r#"{"routes":{"0":[{"nodes":[
            {"airport_name":"Lviv","latitude":49.8,"longitude":23.9},
            {"airport_name":"Heathrow","latitude":51.4,"longitude":-0.4}
        ],"total_distance":1600.5}]}}"#;
        f.on_response(host.last_ticket(), Ok(body.into()), &mut host);

        assert_eq!(host.spinners.get("submit"), Some(&false));
        assert_eq!(
            host.routes.as_ref().unwrap().headings(),
            vec!["Routes with 0 transfers:"]
        );
        assert_eq!(
            f.route_waypoints(0).unwrap(),
            &[LatLng::new(49.8, 23.9), LatLng::new(51.4, -0.4)]
        );

        f.dismiss_routes(&mut host);
        assert!(host.routes.is_none());
        assert!(f.route_waypoints(0).is_none());
    }

    #[test]
    fn airport_options_render_name_or_fallback() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.resolve_airports(Role::From, LatLng::new(51.5, -0.12), false, &mut host);
        assert_eq!(
            host.sent_endpoints(),
            vec![Endpoint::Airports {
                position: LatLng::new(51.5, -0.12),
                limit: 5,
                find_closest_city: false
            }]
        );

        let body = r#"{"airports":[{"id":1,"name":"Heathrow"},{"id":2,"airport_name":"Gatwick"}],
            "closest_city":{"value":"London","data":{"lat":51.5,"lng":-0.12}}}"#;
        let outcome = f.on_response(host.last_ticket(), Ok(body.into()), &mut host);

        assert_eq!(outcome, FormOutcome::None);
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
    }

    #[test]
    fn closest_city_is_reported_when_requested() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.resolve_airports(Role::From, LatLng::new(49.8, 24.0), true, &mut host);
        let body = r#"{"json_list":[{"id":7,"name":"Lviv Intl"}],
            "closest_city":{"value":"Lviv","data":{"lat":49.84,"lng":24.03,"country_code":"UA"}}}"#;
        let outcome = f.on_response(host.last_ticket(), Ok(body.into()), &mut host);
        assert_eq!(
            outcome,
            FormOutcome::ClosestCity {
                role: Role::From,
                point: LocationPoint::new("Lviv (UA)", LatLng::new(49.84, 24.03)),
            }
        );
        assert_eq!(host.airport_options.get(&Role::From).unwrap().len(), 1);
    }

    #[test]
    fn failed_airport_lookup_hides_list() {
        let mut host = FakeHost::new();
        let mut f = form();
        host.airport_options.insert(Role::To, vec![]);
        f.resolve_airports(Role::To, LatLng::new(0.0, 0.0), false, &mut host);
        f.on_response(
            host.last_ticket(),
            Err(FetchError::Network("offline".into())),
            &mut host,
        );
        assert!(host.airport_options.get(&Role::To).is_none());
    }

    #[test]
    fn clearing_role_input_hides_list_and_drops_lookup() {
        let mut host = FakeHost::new();
        let mut f = form();
        f.on_autocomplete_input("from", "Lon", &mut host);
        f.on_timer(host.last_timer(), &mut host);
        f.on_response(host.last_ticket(), Ok(LONDON.into()), &mut host);
        assert!(host.suggestions.get("from").is_some());

        host.inputs.insert("from".into(), "London (GB)".into());
        host.airport_options.insert(Role::From, vec![]);
        f.resolve_airports(Role::From, LatLng::new(51.5, -0.12), false, &mut host);
        let lookup = host.last_ticket();

        let role = f.clear_input("from", &mut host);

        assert_eq!(role, Some(Role::From));
        assert_eq!(host.inputs.get("from").map(String::as_str), Some(""));
        assert_eq!(host.has_value.get("from"), Some(&false));
        assert!(host.airport_options.get(&Role::From).is_none());
        assert!(host.suggestions.get("from").is_none());
        assert!(f.suggestion("from", 0).is_none());
        assert_eq!(host.aborted, vec![lookup]);
        assert!(!f.owns(lookup));
    }

    #[test]
    fn clearing_plain_input_has_no_role() {
        let mut host = FakeHost::new();
        let mut f = form();
        assert_eq!(f.clear_input("passengers", &mut host), None);
    }
}
