use std::{fmt::Write as _, ops::RangeInclusive};

use crate::{DiscoveryError, model::Coordinate, mood::MoodCatalog};

/// Radii the pipeline accepts, in metres.
pub const RADIUS_RANGE: RangeInclusive<u32> = 500..=5000;

/// Source-agnostic description of a search: a circle and the categories to look for.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub mood_key: String,
    pub origin: Coordinate,
    pub radius_meters: u32,
    pub category_tags: Vec<String>,
}

/// Compile a mood, origin and radius into a [`QuerySpec`].
///
/// Out-of-range radii are rejected rather than clamped.
pub fn build_query(
    catalog: &MoodCatalog,
    mood_key: &str,
    origin: Coordinate,
    radius_meters: u32,
) -> Result<QuerySpec, DiscoveryError> {
    let profile = catalog
        .get(mood_key)
        .ok_or_else(|| DiscoveryError::UnknownMood(mood_key.to_string()))?;

    if !RADIUS_RANGE.contains(&radius_meters) {
        return Err(DiscoveryError::InvalidRadius(radius_meters));
    }

    Ok(QuerySpec {
        mood_key: profile.key.clone(),
        origin,
        radius_meters,
        category_tags: profile.category_tags.clone(),
    })
}

impl QuerySpec {
    /// Overpass QL: one node and one way clause per tag, unioned, ways reduced to a centre.
    pub fn to_overpass_ql(&self, timeout_secs: u64) -> String {
        let around = format!(
            "(around:{},{},{})",
            self.radius_meters,
            self.origin.lat(),
            self.origin.lng()
        );

        let mut ql = format!("[out:json][timeout:{timeout_secs}];\n(\n");
        for tag in &self.category_tags {
            let tag = escape(tag);
            // Writing to a String cannot fail.
            let _ = writeln!(ql, "  node[\"amenity\"=\"{tag}\"]{around};");
            let _ = writeln!(ql, "  way[\"amenity\"=\"{tag}\"]{around};");
        }
        ql.push_str(");\nout center;");
        ql
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
