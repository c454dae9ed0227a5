/// Two coordinates closer than this (in degrees, per axis) are the same place.
pub const COORD_TOLERANCE_DEG: f64 = 1e-6;

/// WGS84 position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Per-axis comparison within `tolerance_deg`.
    pub fn approx_eq(&self, other: &LatLng, tolerance_deg: f64) -> bool {
        (self.lat - other.lat).abs() < tolerance_deg && (self.lng - other.lng).abs() < tolerance_deg
    }

    /// Same place under [`COORD_TOLERANCE_DEG`].
    pub fn same_place(&self, other: &LatLng) -> bool {
        self.approx_eq(other, COORD_TOLERANCE_DEG)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// A labelled coordinate: an origin or destination picked by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPoint {
    pub position: LatLng,
    pub label: String,
}

impl LocationPoint {
    pub fn new(label: impl Into<String>, position: LatLng) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }
}
