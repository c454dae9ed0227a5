use std::net::SocketAddr;

use pretty_assertions::assert_eq;
use protocol::{AirportsResponse, AutocompleteResponse, CitiesResponse, RoutesResponse};
use reqwest::StatusCode;
use server::config::ServerConfig;
use server::dataset::Dataset;
use server::{app, AppState};

/// Serves the bundled pages, static files and sample dataset on an ephemeral port.
async fn spawn_server() -> SocketAddr {
    let config = ServerConfig::default();
    let dataset = Dataset::load(&config.dataset).unwrap();
    let state = AppState::new(config, dataset);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    addr
}

async fn get(addr: SocketAddr, path: &str) -> reqwest::Response {
    reqwest::get(format!("http://{addr}{path}")).await.unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let addr = spawn_server().await;
    let resp = get(addr, "/healthz").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn full_pages_use_the_layout_and_fragments_do_not() {
    let addr = spawn_server().await;

    let full = get(addr, "/").await.text().await.unwrap();
    assert!(full.contains("<html"));
    assert!(full.contains("id=\"find-tickets\""));
    assert!(!full.contains("{{ content }}"));

    for path in ["/ajax", "/ajax/"] {
        let fragment = get(addr, path).await.text().await.unwrap();
        assert!(!fragment.contains("<html"), "{path}");
        assert!(fragment.contains("id=\"js-routes\""), "{path}");
    }

    let page = get(addr, "/ajax/technologies").await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("Technologies"));
}

#[tokio::test]
async fn unknown_pages_render_not_found() {
    let addr = spawn_server().await;

    let full = get(addr, "/nowhere").await;
    assert_eq!(full.status(), StatusCode::NOT_FOUND);
    let body = full.text().await.unwrap();
    assert!(body.contains("<html"));
    assert!(body.contains("Page not found"));

    let fragment = get(addr, "/ajax/layout").await;
    assert_eq!(fragment.status(), StatusCode::NOT_FOUND);
    assert!(!fragment.text().await.unwrap().contains("<html"));
}

#[tokio::test]
async fn autocomplete_cities() {
    let addr = spawn_server().await;

    let resp: AutocompleteResponse = get(addr, "/ajax/autocomplete/cities?query=L")
        .await
        .json()
        .await
        .unwrap();
    let values: Vec<_> = resp.suggestions.iter().map(|s| s.value.as_str()).collect();
    assert_eq!(values, vec!["London", "Lviv"]);
    assert_eq!(resp.suggestions[1].display_value(), "Lviv (UA)");

    let kiev: AutocompleteResponse = get(addr, "/ajax/autocomplete/cities?query=kie")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(kiev.suggestions[0].value, "Kiev");

    let unknown = get(addr, "/ajax/autocomplete/planets?query=m").await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn airports_near_a_point_with_closest_city() {
    let addr = spawn_server().await;

    let resp: AirportsResponse = get(
        addr,
        "/ajax/airports?lat=49.84&lng=24.02&limit=2&find_closest_city=true",
    )
    .await
    .json()
    .await
    .unwrap();
    let ids: Vec<_> = resp.airports.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![4357, 679]);
    assert_eq!(resp.airports[0].display_name(), "Lviv International Airport");
    assert_eq!(resp.closest_city.unwrap().value, "Lviv");

    let single: AirportsResponse = get(addr, "/ajax/airports?lat=51.5&lng=-0.2&limit=0")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(single.airports.len(), 1);
    assert!(single.closest_city.is_none());
}

#[tokio::test]
async fn bad_queries_are_rejected_with_json() {
    let addr = spawn_server().await;

    for path in [
        "/ajax/airports?lng=24.0",
        "/ajax/airports?lat=95&lng=24.0",
        "/ajax/routes?from_airport=4357",
        "/ajax/routes?from_airport=4357&to_airport=1",
        "/ajax/get-cities?ne_lat=1",
    ] {
        let resp = get(addr, path).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{path}");
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["error"].is_string(), "{path}");
    }
}

#[tokio::test]
async fn routes_are_grouped_by_transfers() {
    let addr = spawn_server().await;

    let resp: RoutesResponse = get(
        addr,
        "/ajax/routes?from=Lviv&from_airport=4357&to=London&to_airport=507",
    )
    .await
    .json()
    .await
    .unwrap();
    let keys: Vec<_> = resp.routes.iter().map(|g| g.transfers.as_str()).collect();
    assert_eq!(keys, vec!["2"]);

    let legs = &resp.routes.0[0].legs;
    assert_eq!(legs.len(), 2);
    assert!(legs[0].total_distance <= legs[1].total_distance);
    for leg in legs {
        assert_eq!(leg.nodes.len(), 4);
        assert_eq!(leg.nodes[0].airport_name, "Lviv International Airport");
        assert_eq!(leg.nodes[3].airport_name, "Heathrow");
    }

    let direct: RoutesResponse = get(addr, "/ajax/routes?from_airport=507&to_airport=1382")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(direct.routes.0[0].transfers, "0");
}

#[tokio::test]
async fn cities_inside_a_box() {
    let addr = spawn_server().await;

    let resp: CitiesResponse = get(
        addr,
        "/ajax/get-cities?ne_lat=53&ne_lng=31&sw_lat=49&sw_lng=20",
    )
    .await
    .json()
    .await
    .unwrap();
    let labels: Vec<_> = resp.json_list.iter().filter_map(|c| c.label()).collect();
    assert_eq!(labels, vec!["Kyiv", "Warsaw", "Lviv"]);
}

#[tokio::test]
async fn static_assets_are_served() {
    let addr = spawn_server().await;
    let resp = get(addr, "/static/js/atlas.js").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("on_link_click"));
}
