use foundation::LatLng;
use serde::{Deserialize, Serialize};

/// Client configuration. Every field has a default, so a partial JSON
/// override (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub form: FormConfig,
    pub map: MapConfig,
}

impl AppConfig {
    /// Parses a JSON override, falling back to defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// An input wired to a suggestion source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteField {
    /// Element id of the text input.
    pub input: String,
    /// Suggestion source, the `{field-name}` in `/ajax/autocomplete/{field-name}`.
    pub source: String,
}

impl AutocompleteField {
    pub fn new(input: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub autocomplete: Vec<AutocompleteField>,
    pub autocomplete_debounce_ms: u32,
    pub airport_limit: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            autocomplete: vec![
                AutocompleteField::new("from", "cities"),
                AutocompleteField::new("to", "cities"),
            ],
            autocomplete_debounce_ms: 150,
            airport_limit: protocol::DEFAULT_AIRPORT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Element id of the map canvas container.
    pub container_id: String,
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub discovery_delay_ms: u32,
    /// Provider script, injected when the provider is not on the page yet.
    pub provider_script_url: String,
    pub provider_key: Option<String>,
    pub marker_icon: String,
    pub marker_hint: String,
    pub theme: Vec<StyleRule>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            center_lat: -34.397,
            center_lng: 150.644,
            zoom: 5.0,
            min_zoom: 2.0,
            max_zoom: 10.0,
            discovery_delay_ms: 2000,
            provider_script_url: "https://maps.googleapis.com/maps/api/js".to_string(),
            provider_key: None,
            marker_icon: "/static/img/dot.png".to_string(),
            marker_hint: "Right Click=From  Left Click=To".to_string(),
            theme: default_theme(),
        }
    }
}

impl MapConfig {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center_lat, self.center_lng)
    }

    /// Script URL including the API key, if one is configured.
    pub fn script_url(&self) -> String {
        match self.provider_key.as_deref() {
            Some(key) if !key.is_empty() => {
                let sep = if self.provider_script_url.contains('?') {
                    '&'
                } else {
                    '?'
                };
                format!("{}{sep}key={key}", self.provider_script_url)
            }
            _ => self.provider_script_url.clone(),
        }
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// One entry of the map's styled theme, in the provider's style format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default)]
    pub stylers: Vec<Styler>,
}

/// Serializes as a single-key object: `{"hue": "#ff4400"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Styler {
    Hue(String),
    Saturation(f64),
    Lightness(f64),
    Gamma(f64),
    Weight(f64),
}

fn rule(feature: Option<&str>, element: Option<&str>, stylers: Vec<Styler>) -> StyleRule {
    StyleRule {
        feature_type: feature.map(str::to_string),
        element_type: element.map(str::to_string),
        stylers,
    }
}

fn hue(c: &str) -> Styler {
    Styler::Hue(c.to_string())
}

/// Warm land, cool water, muted transit.
pub fn default_theme() -> Vec<StyleRule> {
    use Styler::{Gamma, Lightness, Saturation, Weight};

    vec![
        rule(
            None,
            Some("geometry"),
            vec![hue("#ff4400"), Saturation(-68.0), Lightness(-4.0), Gamma(0.72)],
        ),
        rule(Some("road"), Some("labels.icon"), vec![]),
        rule(
            Some("landscape.man_made"),
            Some("geometry"),
            vec![hue("#0077ff"), Gamma(3.1)],
        ),
        rule(
            Some("water"),
            None,
            vec![hue("#00ccff"), Gamma(0.44), Saturation(-33.0)],
        ),
        rule(
            Some("poi.park"),
            None,
            vec![hue("#44ff00"), Saturation(-23.0)],
        ),
        rule(
            Some("water"),
            Some("labels.text.fill"),
            vec![hue("#007fff"), Gamma(0.77), Saturation(65.0), Lightness(99.0)],
        ),
        rule(
            Some("water"),
            Some("labels.text.stroke"),
            vec![
                Gamma(0.11),
                Weight(5.6),
                Saturation(99.0),
                hue("#0091ff"),
                Lightness(-86.0),
            ],
        ),
        rule(
            Some("transit.line"),
            Some("geometry"),
            vec![Lightness(-48.0), hue("#ff5e00"), Gamma(1.2), Saturation(-23.0)],
        ),
        rule(
            Some("transit"),
            Some("labels.text.stroke"),
            vec![
                Saturation(-64.0),
                hue("#ff9100"),
                Lightness(16.0),
                Gamma(0.47),
                Weight(2.7),
            ],
        ),
    ]
}
