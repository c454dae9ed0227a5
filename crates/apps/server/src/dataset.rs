//! In-memory flight network: airports, cities and direct routes.
//!
//! Loaded once at startup from a JSON file:
//!
//! ```json
//! {
//!   "airports": [{"id": 1, "airport_name": "Heathrow", "city": "London", "country": "GB",
//!                 "iata": "LHR", "icao": "EGLL", "latitude": 51.47, "longitude": -0.45}],
//!   "cities":   [{"id": 1, "country_code": "GB", "latitude": 51.5, "longitude": -0.12,
//!                 "population": 8900000, "names": ["London"]}],
//!   "routes":   [{"source": 1, "destination": 2, "distance": 1387.0}]
//! }
//! ```
//!
//! Route distances may be omitted; they are filled in with the great-circle
//! distance between the two airports.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use foundation::math::haversine_km;
use foundation::LatLng;
use serde::Deserialize;

use crate::error::DatasetError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Airport {
    pub id: i64,
    pub airport_name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Airport {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct City {
    pub id: i64,
    #[serde(default)]
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub names: Vec<String>,
}

impl City {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteRecord {
    pub source: i64,
    pub destination: i64,
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDataset {
    #[serde(default)]
    airports: Vec<Airport>,
    #[serde(default)]
    cities: Vec<City>,
    #[serde(default)]
    routes: Vec<RouteRecord>,
}

/// A direct flight out of an airport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: i64,
    pub distance_km: f64,
}

#[derive(Debug, Default)]
pub struct Dataset {
    airports: Vec<Airport>,
    cities: Vec<City>,
    airport_index: HashMap<i64, usize>,
    /// Outgoing flights per airport, ordered by destination id. Duplicate
    /// records for one pair collapse into the shortest.
    adjacency: BTreeMap<i64, Vec<Edge>>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_str(text)?;
        Self::build(raw.airports, raw.cities, raw.routes)
    }

    pub fn build(
        airports: Vec<Airport>,
        cities: Vec<City>,
        routes: Vec<RouteRecord>,
    ) -> Result<Self, DatasetError> {
        let airport_index: HashMap<i64, usize> = airports
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id, i))
            .collect();

        let mut shortest: BTreeMap<(i64, i64), f64> = BTreeMap::new();
        for route in &routes {
            let (Some(&from), Some(&to)) = (
                airport_index.get(&route.source),
                airport_index.get(&route.destination),
            ) else {
                return Err(DatasetError::UnknownAirport {
                    source_id: route.source,
                    destination_id: route.destination,
                });
            };
            if route.source == route.destination {
                continue;
            }
            let distance = route
                .distance
                .filter(|d| d.is_finite() && *d >= 0.0)
                .unwrap_or_else(|| haversine_km(airports[from].position(), airports[to].position()));
            shortest
                .entry((route.source, route.destination))
                .and_modify(|d| *d = d.min(distance))
                .or_insert(distance);
        }

        let mut adjacency: BTreeMap<i64, Vec<Edge>> = BTreeMap::new();
        for ((from, to), distance_km) in shortest {
            adjacency
                .entry(from)
                .or_default()
                .push(Edge { to, distance_km });
        }

        Ok(Self {
            airports,
            cities,
            airport_index,
            adjacency,
        })
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn airport(&self, id: i64) -> Option<&Airport> {
        self.airport_index.get(&id).map(|&i| &self.airports[i])
    }

    pub fn departures(&self, id: i64) -> &[Edge] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn route_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}
