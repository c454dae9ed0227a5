use foundation::{LatLng, LatLngBounds};

use crate::error::ProtocolError;

/// Prefix under which the backend serves partial pages and JSON.
pub const AJAX_PREFIX: &str = "/ajax";

/// Number of airports offered per disambiguation lookup.
pub const DEFAULT_AIRPORT_LIMIT: u32 = 5;

/// Every request the browser controllers issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    /// Partial page for an internal link.
    Page { href: String },
    /// City suggestions for a typed prefix.
    Autocomplete { source: String, query: String },
    /// Airports near a coordinate, optionally with the closest city.
    Airports {
        position: LatLng,
        limit: u32,
        find_closest_city: bool,
    },
    /// Routes for the serialized search form.
    Routes { fields: Vec<(String, String)> },
    /// Cities inside a bounding box.
    Cities { bounds: LatLngBounds },
}

impl Endpoint {
    pub fn page(href: impl Into<String>) -> Self {
        Endpoint::Page { href: href.into() }
    }

    /// Path and query string, relative to the page origin.
    pub fn url(&self) -> Result<String, ProtocolError> {
        match self {
            Endpoint::Page { href } => Ok(page_url(href)),
            Endpoint::Autocomplete { source, query } => {
                let qs = serde_urlencoded::to_string([("query", query.as_str())])?;
                Ok(format!("{AJAX_PREFIX}/autocomplete/{source}?{qs}"))
            }
            Endpoint::Airports {
                position,
                limit,
                find_closest_city,
            } => {
                let qs = serde_urlencoded::to_string([
                    ("lat", position.lat.to_string()),
                    ("lng", position.lng.to_string()),
                    ("limit", limit.to_string()),
                    ("find_closest_city", find_closest_city.to_string()),
                ])?;
                Ok(format!("{AJAX_PREFIX}/airports?{qs}"))
            }
            Endpoint::Routes { fields } => {
                let qs = serde_urlencoded::to_string(fields)?;
                Ok(format!("{AJAX_PREFIX}/routes?{qs}"))
            }
            Endpoint::Cities { bounds } => {
                let qs = serde_urlencoded::to_string([
                    ("ne_lng", bounds.north_east.lng.to_string()),
                    ("ne_lat", bounds.north_east.lat.to_string()),
                    ("sw_lng", bounds.south_west.lng.to_string()),
                    ("sw_lat", bounds.south_west.lat.to_string()),
                ])?;
                Ok(format!("{AJAX_PREFIX}/get-cities?{qs}"))
            }
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Endpoint::Page { .. } => "page",
            Endpoint::Autocomplete { .. } => "autocomplete",
            Endpoint::Airports { .. } => "airports",
            Endpoint::Routes { .. } => "routes",
            Endpoint::Cities { .. } => "cities",
        }
    }
}

/// Root maps to the bare prefix, everything else is appended to it.
fn page_url(href: &str) -> String {
    if href == "/" || href.is_empty() {
        AJAX_PREFIX.to_string()
    } else if href.starts_with('/') {
        format!("{AJAX_PREFIX}{href}")
    } else {
        format!("{AJAX_PREFIX}/{href}")
    }
}

/// Parses an `application/x-www-form-urlencoded` form body into pairs,
/// keeping only fields with a value.
pub fn parse_form(encoded: &str) -> Result<Vec<(String, String)>, ProtocolError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(encoded)?;
    Ok(non_empty_fields(pairs))
}

/// Drops fields whose value is empty or whitespace.
pub fn non_empty_fields(
    pairs: impl IntoIterator<Item = (String, String)>,
) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Endpoint, non_empty_fields, parse_form};
    use foundation::{LatLng, LatLngBounds};
    use pretty_assertions::assert_eq;

    #[test]
    fn page_urls_are_prefixed() {
        assert_eq!(Endpoint::page("/").url().unwrap(), "/ajax");
        assert_eq!(
            Endpoint::page("/technologies").url().unwrap(),
            "/ajax/technologies"
        );
        assert_eq!(Endpoint::page("about").url().unwrap(), "/ajax/about");
    }

    #[test]
    fn autocomplete_query_is_encoded() {
        let e = Endpoint::Autocomplete {
            source: "cities".into(),
            query: "São Paulo".into(),
        };
        assert_eq!(
            e.url().unwrap(),
            "/ajax/autocomplete/cities?query=S%C3%A3o+Paulo"
        );
    }

    #[test]
    fn airports_url_carries_all_parameters() {
        let e = Endpoint::Airports {
            position: LatLng::new(51.5, -0.12),
            limit: 5,
            find_closest_city: false,
        };
        assert_eq!(
            e.url().unwrap(),
            "/ajax/airports?lat=51.5&lng=-0.12&limit=5&find_closest_city=false"
        );
    }

    #[test]
    fn routes_url_serializes_form_in_order() {
        let e = Endpoint::Routes {
            fields: vec![
                ("from_airport".into(), "507".into()),
                ("to_airport".into(), "1382".into()),
            ],
        };
        assert_eq!(
            e.url().unwrap(),
            "/ajax/routes?from_airport=507&to_airport=1382"
        );
    }

    #[test]
    fn cities_url_uses_box_corners() {
        let e = Endpoint::Cities {
            bounds: LatLngBounds::new(LatLng::new(50.0, 24.0), LatLng::new(51.0, 25.0)),
        };
        assert_eq!(
            e.url().unwrap(),
            "/ajax/get-cities?ne_lng=25&ne_lat=51&sw_lng=24&sw_lat=50"
        );
    }

    #[test]
    fn form_parsing_drops_empty_fields() {
        let fields = parse_form("from=London&from_airport=&to=Paris&to_airport=1382").unwrap();
        assert_eq!(
            fields,
            vec![
                ("from".to_string(), "London".to_string()),
                ("to".to_string(), "Paris".to_string()),
                ("to_airport".to_string(), "1382".to_string()),
            ]
        );
        assert!(parse_form("from=&to=").unwrap().is_empty());
        assert!(non_empty_fields(vec![("a".into(), "  ".into())]).is_empty());
    }
}
