//! Queries over the loaded [`Dataset`], shaped as the ajax wire types.

use std::collections::BTreeMap;

use foundation::math::haversine_km;
use foundation::{LatLng, LatLngBounds};
use protocol::{
    AirportOption, CityRecord, RouteLeg, RouteNode, Suggestion, SuggestionData, TransferGroup,
    TransferGroups,
};

use crate::dataset::{City, Dataset};

/// Suggestions returned per autocomplete query.
pub const AUTOCOMPLETE_LIMIT: usize = 10;

/// Cities returned per map discovery box.
pub const CITIES_LIMIT: usize = 10;

/// City names starting with `query`, case-insensitively, most populous first.
/// Each city contributes at most one suggestion: its first matching name.
pub fn autocomplete(dataset: &Dataset, query: &str, limit: usize) -> Vec<Suggestion> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<(&City, &str)> = dataset
        .cities()
        .iter()
        .filter_map(|city| {
            city.names
                .iter()
                .find(|name| name.to_lowercase().starts_with(&needle))
                .map(|name| (city, name.as_str()))
        })
        .collect();

    hits.sort_by(|(a, a_name), (b, b_name)| {
        b.population
            .unwrap_or(0)
            .cmp(&a.population.unwrap_or(0))
            .then_with(|| a_name.cmp(b_name))
            .then_with(|| a.id.cmp(&b.id))
    });

    hits.into_iter()
        .take(limit)
        .map(|(city, name)| Suggestion {
            value: name.to_string(),
            data: SuggestionData {
                id: Some(city.id),
                lat: city.latitude,
                lng: city.longitude,
                country_code: city.country_code.clone(),
            },
        })
        .collect()
}

/// The `limit` airports nearest to `position`; a zero limit still yields one.
pub fn closest_airports(dataset: &Dataset, position: LatLng, limit: usize) -> Vec<AirportOption> {
    let mut ranked: Vec<(f64, usize)> = dataset
        .airports()
        .iter()
        .enumerate()
        .map(|(i, a)| (haversine_km(position, a.position()), i))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let airports = dataset.airports();
    ranked
        .into_iter()
        .take(limit.max(1))
        .map(|(distance, i)| {
            let airport = &airports[i];
            AirportOption {
                id: airport.id,
                name: Some(airport.airport_name.clone()),
                airport_name: None,
                iata: airport.iata.clone(),
                distance_km: Some(round2(distance)),
            }
        })
        .collect()
}

/// Nearest city that has a name.
pub fn closest_city(dataset: &Dataset, position: LatLng) -> Option<Suggestion> {
    dataset
        .cities()
        .iter()
        .filter(|c| !c.names.is_empty())
        .map(|c| (haversine_km(position, c.position()), c))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, city)| Suggestion {
            value: city.names[0].clone(),
            data: SuggestionData {
                id: Some(city.id),
                lat: city.latitude,
                lng: city.longitude,
                country_code: city.country_code.clone(),
            },
        })
}

/// Cities strictly inside `bounds`, most populous first.
pub fn cities_in_bounds(dataset: &Dataset, bounds: &LatLngBounds, limit: usize) -> Vec<CityRecord> {
    let mut inside: Vec<&City> = dataset
        .cities()
        .iter()
        .filter(|c| bounds.strictly_contains(c.position()))
        .collect();
    inside.sort_by(|a, b| {
        b.population
            .unwrap_or(0)
            .cmp(&a.population.unwrap_or(0))
            .then(a.id.cmp(&b.id))
    });

    inside
        .into_iter()
        .take(limit)
        .map(|c| CityRecord {
            id: Some(c.id),
            city_names: c.names.clone(),
            latitude: c.latitude,
            longitude: c.longitude,
            country_code: c.country_code.clone(),
            population: c.population,
        })
        .collect()
}

/// A loop-free itinerary found by [`find_itineraries`].
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub airports: Vec<i64>,
    pub distance_km: f64,
}

impl Itinerary {
    pub fn transfers(&self) -> usize {
        self.airports.len().saturating_sub(2)
    }
}

/// Every itinerary from `from` to `to` of at most `max_legs` flights that
/// visits no airport twice, shortest first, cut to `limit`.
pub fn find_itineraries(
    dataset: &Dataset,
    from: i64,
    to: i64,
    max_legs: usize,
    limit: usize,
) -> Vec<Itinerary> {
    if from == to || max_legs == 0 || limit == 0 {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut path = vec![from];
    walk(dataset, to, max_legs, &mut path, 0.0, &mut found);

    found.sort_by(|a: &Itinerary, b: &Itinerary| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then(a.airports.len().cmp(&b.airports.len()))
            .then_with(|| a.airports.cmp(&b.airports))
    });
    found.truncate(limit);
    found
}

fn walk(
    dataset: &Dataset,
    target: i64,
    max_legs: usize,
    path: &mut Vec<i64>,
    distance: f64,
    found: &mut Vec<Itinerary>,
) {
    let Some(&here) = path.last() else {
        return;
    };
    let edges = dataset.departures(here);
    let legs_so_far = path.len() - 1;

    // Last allowed flight: only a direct hop to the target can complete.
    if legs_so_far + 1 == max_legs {
        if let Ok(i) = edges.binary_search_by(|e| e.to.cmp(&target)) {
            let mut airports = path.clone();
            airports.push(target);
            found.push(Itinerary {
                airports,
                distance_km: distance + edges[i].distance_km,
            });
        }
        return;
    }

    for edge in edges {
        if edge.to == target {
            let mut airports = path.clone();
            airports.push(target);
            found.push(Itinerary {
                airports,
                distance_km: distance + edge.distance_km,
            });
            continue;
        }
        if path.contains(&edge.to) {
            continue;
        }
        path.push(edge.to);
        walk(dataset, target, max_legs, path, distance + edge.distance_km, found);
        path.pop();
    }
}

/// [`find_itineraries`] grouped by transfer count, ascending.
pub fn find_routes(
    dataset: &Dataset,
    from: i64,
    to: i64,
    max_legs: usize,
    limit: usize,
) -> TransferGroups {
    let mut by_transfers: BTreeMap<usize, Vec<RouteLeg>> = BTreeMap::new();
    for itinerary in find_itineraries(dataset, from, to, max_legs, limit) {
        let nodes = itinerary
            .airports
            .iter()
            .filter_map(|id| dataset.airport(*id))
            .map(|a| RouteNode {
                airport_name: a.airport_name.clone(),
                latitude: a.latitude,
                longitude: a.longitude,
            })
            .collect();
        by_transfers
            .entry(itinerary.transfers())
            .or_default()
            .push(RouteLeg {
                nodes,
                total_distance: round2(itinerary.distance_km),
            });
    }

    let mut groups = TransferGroups::new();
    for (transfers, legs) in by_transfers {
        groups.push(TransferGroup::new(transfers.to_string(), legs));
    }
    groups
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
