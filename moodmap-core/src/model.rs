use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
///
/// Fields are private so every value in circulation has passed range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatLng", into = "LatLng")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Invalid coordinate ({lat}, {lng}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
pub struct InvalidCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        let lat_ok = (-90.0..=90.0).contains(&lat);
        let lng_ok = (-180.0..=180.0).contains(&lng);

        if lat_ok && lng_ok {
            Ok(Self { lat, lng })
        } else {
            Err(InvalidCoordinate { lat, lng })
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

/// Plain serde shape for [`Coordinate`]; validated on the way in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl TryFrom<LatLng> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(value: LatLng) -> Result<Self, Self::Error> {
        Coordinate::new(value.lat, value.lng)
    }
}

impl From<Coordinate> for LatLng {
    fn from(value: Coordinate) -> Self {
        Self { lat: value.lat, lng: value.lng }
    }
}

/// Nested centre point Overpass attaches to ways when asked for `out center`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RawCenter {
    pub lat: f64,
    pub lon: f64,
}

/// An element exactly as the POI source returned it. Nothing is guaranteed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawElement {
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<RawCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

fn default_kind() -> String {
    "node".to_string()
}

impl RawElement {
    /// Source identity, e.g. `node/42`. Nodes and ways share an id space upstream.
    pub fn source_id(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
    }

    /// Direct position first, then the nested centre. Out-of-range values do not resolve.
    pub fn position(&self) -> Option<Coordinate> {
        let direct = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon).ok(),
            _ => None,
        };

        direct.or_else(|| self.center.and_then(|c| Coordinate::new(c.lat, c.lon).ok()))
    }
}

/// A normalized place, ready for filtering and display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub review_count: u32,
    pub price_tier: u8,
    pub distance_km: f64,
    pub is_open_now: bool,
    pub location: Coordinate,
    pub category: String,
    pub cuisine: String,
    pub contact_phone: Option<String>,
    pub contact_website: Option<String>,
}
