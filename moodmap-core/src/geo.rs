//! Great-circle distance and the map-viewer hand-off.

use crate::model::Coordinate;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Zoom level used for map-viewer links.
pub const VIEWER_ZOOM: u8 = 17;

/// Haversine distance between two coordinates, in kilometres.
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let d_lat = (to.lat() - from.lat()).to_radians();
    let d_lng = (to.lng() - from.lng()).to_radians();
    let lat1 = from.lat().to_radians();
    let lat2 = to.lat().to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// OpenStreetMap link centred on `at` with a marker.
pub fn viewer_url(at: &Coordinate) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map={VIEWER_ZOOM}/{lat}/{lng}",
        lat = at.lat(),
        lng = at.lng(),
    )
}
