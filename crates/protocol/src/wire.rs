use foundation::{LatLng, LocationPoint};
use serde::{Deserialize, Deserializer, Serialize};

use crate::groups::TransferGroups;

/// `GET /ajax/autocomplete/{source}` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: String,
    pub data: SuggestionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl Suggestion {
    /// Name shown in the suggestion list: `London (GB)`.
    pub fn display_value(&self) -> String {
        match self.data.country_code.as_deref() {
            Some(cc) if !cc.is_empty() => format!("{} ({})", self.value, cc),
            _ => self.value.clone(),
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.data.lat, self.data.lng)
    }

    /// Location point labelled with the display value.
    pub fn to_point(&self) -> LocationPoint {
        LocationPoint::new(self.display_value(), self.position())
    }
}

/// `GET /ajax/airports` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AirportsResponse {
    /// Older backends answer with `json_list`.
    #[serde(default, alias = "json_list")]
    pub airports: Vec<AirportOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closest_city: Option<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportOption {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airport_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl AirportOption {
    /// `name` if present, otherwise `airport_name`.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.airport_name.as_deref())
            .unwrap_or_default()
    }
}

/// `GET /ajax/routes` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub routes: TransferGroups,
}

/// One itinerary: airports in flight order plus the summed distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub nodes: Vec<RouteNode>,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_distance: f64,
}

impl RouteLeg {
    /// Whole kilometers, truncated toward zero.
    pub fn distance_km(&self) -> i64 {
        self.total_distance.trunc() as i64
    }

    pub fn waypoints(&self) -> Vec<LatLng> {
        self.nodes.iter().map(RouteNode::position).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteNode {
    pub airport_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
}

impl RouteNode {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// `GET /ajax/get-cities` response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CitiesResponse {
    #[serde(default)]
    pub json_list: Vec<CityRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub city_names: Vec<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
}

impl CityRecord {
    /// First listed name, if any.
    pub fn label(&self) -> Option<&str> {
        self.city_names.first().map(String::as_str)
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Accepts a JSON number or a numeric string: some backends emit decimals as
/// strings.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(v) => Ok(v),
        NumOrStr::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
