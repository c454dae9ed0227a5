use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use foundation::{LatLng, LatLngBounds};
use http::{header, StatusCode};
use protocol::{AirportsResponse, AutocompleteResponse, CitiesResponse, RoutesResponse};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::pages::{Rendered, INDEX_PAGE};
use crate::search;
use crate::AppState;

/// The only suggestion source the dataset can answer.
pub const CITIES_SOURCE: &str = "cities";

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct AirportsQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub find_closest_city: Option<bool>,
}

/// The serialized search form; fields other than the two airports are ignored.
#[derive(Debug, Deserialize)]
pub struct RoutesQuery {
    #[serde(default)]
    pub from_airport: Option<i64>,
    #[serde(default)]
    pub to_airport: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CitiesQuery {
    pub ne_lat: f64,
    pub ne_lng: f64,
    pub sw_lat: f64,
    pub sw_lng: f64,
}

pub async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

pub async fn index(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(html(state.pages.full(INDEX_PAGE).await?))
}

pub async fn index_fragment(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(html(state.pages.fragment(INDEX_PAGE).await?))
}

pub async fn page(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    Ok(html(state.pages.full(&name).await?))
}

pub async fn page_fragment(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    Ok(html(state.pages.fragment(&name).await?))
}

pub async fn autocomplete(
    State(state): State<AppState>,
    Path(source): Path<String>,
    query: Result<Query<AutocompleteQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(bad_request)?;
    if source != CITIES_SOURCE {
        return Err(ApiError::NotFound);
    }
    let needle = params.query.trim().to_lowercase();
    let key = format!("autocomplete:{source}:{needle}");
    let body = state.cache.get_or_try_insert_with(&key, || {
        to_json(&AutocompleteResponse {
            suggestions: search::autocomplete(&state.dataset, &needle, search::AUTOCOMPLETE_LIMIT),
        })
    })?;
    Ok(json(body))
}

pub async fn airports(
    State(state): State<AppState>,
    query: Result<Query<AirportsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(bad_request)?;
    let position = LatLng::new(params.lat, params.lng);
    check_position(position)?;
    let limit = params.limit.unwrap_or(0).max(1);
    let find_closest_city = params.find_closest_city.unwrap_or(false);

    let key = format!(
        "airports:{}:{}:{limit}:{find_closest_city}",
        params.lat, params.lng
    );
    let body = state.cache.get_or_try_insert_with(&key, || {
        to_json(&AirportsResponse {
            airports: search::closest_airports(&state.dataset, position, limit as usize),
            closest_city: find_closest_city
                .then(|| search::closest_city(&state.dataset, position))
                .flatten(),
        })
    })?;
    Ok(json(body))
}

pub async fn routes(
    State(state): State<AppState>,
    query: Result<Query<RoutesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(bad_request)?;
    let (Some(from), Some(to)) = (params.from_airport, params.to_airport) else {
        return Err(ApiError::BadRequest(
            "from_airport and to_airport are required".to_string(),
        ));
    };
    for id in [from, to] {
        if state.dataset.airport(id).is_none() {
            return Err(ApiError::BadRequest(format!("unknown airport {id}")));
        }
    }

    let key = format!("routes:{from}:{to}");
    if let Some(body) = state.cache.get(&key) {
        debug!(from, to, "routes served from cache");
        return Ok(json(body));
    }

    let dataset = state.dataset.clone();
    let max_legs = state.config.max_legs();
    let limit = state.config.route_limit;
    let routes = tokio::task::spawn_blocking(move || {
        search::find_routes(&dataset, from, to, max_legs, limit)
    })
    .await
    .map_err(|err| ApiError::Internal(format!("route search failed: {err}")))?;

    debug!(from, to, itineraries = routes.leg_count(), "routes found");
    let body = to_json(&RoutesResponse { routes })?;
    state.cache.insert(key, body.clone());
    Ok(json(body))
}

pub async fn get_cities(
    State(state): State<AppState>,
    query: Result<Query<CitiesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = query.map_err(bad_request)?;
    let south_west = LatLng::new(params.sw_lat, params.sw_lng);
    let north_east = LatLng::new(params.ne_lat, params.ne_lng);
    check_position(south_west)?;
    check_position(north_east)?;

    let bounds = LatLngBounds::new(south_west, north_east);
    let body = to_json(&CitiesResponse {
        json_list: search::cities_in_bounds(&state.dataset, &bounds, search::CITIES_LIMIT),
    })?;
    Ok(json(body))
}

fn check_position(p: LatLng) -> Result<(), ApiError> {
    if p.is_finite() && (-90.0..=90.0).contains(&p.lat) && (-180.0..=180.0).contains(&p.lng) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "coordinate out of range: {}, {}",
            p.lat, p.lng
        )))
    }
}

fn bad_request(rejection: QueryRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|err| ApiError::Internal(err.to_string()))
}

fn json(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn html(page: Rendered) -> Response {
    (page.status, Html(page.html)).into_response()
}
