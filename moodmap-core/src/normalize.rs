//! Raw elements in, [`Place`]s out.
//!
//! Source data has no ratings, prices or opening state we can trust, so those
//! fields are synthesized here: price tier and open state from tags and the
//! local hour, rating and review count from an injected random source. The
//! random fields are display placeholders and differ between runs unless the
//! generator is seeded.

use chrono::{Local, Timelike};
use rand::Rng;

use crate::{
    geo::distance_km,
    model::{Coordinate, Place, RawElement},
};

pub const ADDRESS_UNAVAILABLE: &str = "Address not available";
pub const DEFAULT_CUISINE: &str = "Various";
pub const UNKNOWN_CATEGORY: &str = "unknown";

const PREMIUM_CUISINES: &[&str] = &["french", "japanese", "italian", "sushi"];

/// Turns raw elements into places. Holds the random source and the hour used for open/closed.
#[derive(Debug)]
pub struct Normalizer<R> {
    rng: R,
    local_hour: u32,
}

impl<R: Rng> Normalizer<R> {
    /// `local_hour` is taken modulo 24.
    pub fn new(rng: R, local_hour: u32) -> Self {
        Self {
            rng,
            local_hour: local_hour % 24,
        }
    }

    /// Uses the host's wall-clock hour.
    pub fn at_current_hour(rng: R) -> Self {
        Self::new(rng, Local::now().hour())
    }

    /// Keeps input order. Elements without a name or position are skipped.
    pub fn normalize(&mut self, elements: &[RawElement], origin: Coordinate) -> Vec<Place> {
        let places: Vec<Place> = elements
            .iter()
            .filter_map(|el| self.normalize_one(el, origin))
            .collect();

        tracing::debug!(
            received = elements.len(),
            kept = places.len(),
            "normalized raw elements"
        );
        places
    }

    fn normalize_one(&mut self, el: &RawElement, origin: Coordinate) -> Option<Place> {
        let Some(name) = el.tag("name") else {
            tracing::debug!(id = %el.source_id(), "skipping element without a name");
            return None;
        };

        let Some(location) = el.position() else {
            tracing::debug!(id = %el.source_id(), "skipping element without a position");
            return None;
        };

        let category = el.tag("amenity").unwrap_or(UNKNOWN_CATEGORY);
        let cuisine = el.tag("cuisine");

        Some(Place {
            id: el.source_id(),
            name: name.to_string(),
            address: compose_address(el),
            rating: self.synth_rating(),
            review_count: self.synth_review_count(),
            price_tier: price_tier(category, cuisine),
            distance_km: distance_km(&origin, &location),
            is_open_now: is_open_at(category, self.local_hour),
            location,
            category: category.to_string(),
            cuisine: cuisine.unwrap_or(DEFAULT_CUISINE).to_string(),
            contact_phone: el.tag("phone").or(el.tag("contact:phone")).map(str::to_string),
            contact_website: el
                .tag("website")
                .or(el.tag("contact:website"))
                .map(str::to_string),
        })
    }

    /// 3.5 + U * 1.5, one decimal.
    fn synth_rating(&mut self) -> f64 {
        let u: f64 = self.rng.random();
        ((3.5 + u * 1.5) * 10.0).round() / 10.0
    }

    /// 20 + floor(V * 500).
    fn synth_review_count(&mut self) -> u32 {
        let v: f64 = self.rng.random();
        20 + (v * 500.0).floor() as u32
    }
}

/// Price tier 1..=4 from category and cuisine.
///
/// `fast_food` always wins, then a `fine_dining` cuisine, then restaurants
/// with a premium cuisine. Everything else is 2.
pub fn price_tier(category: &str, cuisine: Option<&str>) -> u8 {
    let cuisines = || {
        cuisine
            .into_iter()
            .flat_map(|c| c.split(';'))
            .map(|c| c.trim().to_lowercase())
    };

    if category == "fast_food" {
        1
    } else if cuisines().any(|c| c == "fine_dining") {
        4
    } else if category == "restaurant" && cuisines().any(|c| PREMIUM_CUISINES.contains(&c.as_str())) {
        3
    } else {
        2
    }
}

/// Rough opening hours per category. Categories we know nothing about count as open.
pub fn is_open_at(category: &str, hour: u32) -> bool {
    match category {
        "cafe" => (7..22).contains(&hour),
        "restaurant" => (11..15).contains(&hour) || (17..23).contains(&hour),
        "bar" => hour >= 16 || hour < 2,
        _ => true,
    }
}

/// House number and street, else city, else a fixed marker.
pub fn compose_address(el: &RawElement) -> String {
    match (el.tag("addr:housenumber"), el.tag("addr:street")) {
        (Some(number), Some(street)) => format!("{number} {street}"),
        (None, Some(street)) => street.to_string(),
        _ => el
            .tag("addr:city")
            .map(str::to_string)
            .unwrap_or_else(|| ADDRESS_UNAVAILABLE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn origin() -> Coordinate {
        Coordinate::new(40.0, -75.0).unwrap()
    }

    fn element(id: u64, lat: Option<f64>, lon: Option<f64>, tags: &[(&str, &str)]) -> RawElement {
        RawElement {
            kind: "node".to_string(),
            id,
            lat,
            lon,
            center: None,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn normalizer(hour: u32) -> Normalizer<ChaCha8Rng> {
        Normalizer::new(ChaCha8Rng::seed_from_u64(7), hour)
    }

    #[test]
    fn elements_without_name_are_dropped() {
        let elements = vec![
            element(1, Some(40.0), Some(-75.0), &[("amenity", "cafe")]),
            element(2, Some(40.0), Some(-75.0), &[("name", ""), ("amenity", "cafe")]),
            element(3, Some(40.0), Some(-75.0), &[("name", "Kept")]),
        ];

        let places = normalizer(12).normalize(&elements, origin());
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Kept");
        assert_eq!(places[0].id, "node/3");
    }

    #[test]
    fn elements_without_position_are_dropped() {
        let mut way = element(2, None, None, &[("name", "Way")]);
        way.kind = "way".to_string();
        way.center = Some(crate::model::RawCenter { lat: 40.01, lon: -75.0 });

        let elements = vec![
            element(1, None, None, &[("name", "Nowhere")]),
            element(3, Some(40.0), None, &[("name", "Half")]),
            way,
        ];

        let places = normalizer(12).normalize(&elements, origin());
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "way/2");
        assert!(places[0].distance_km > 1.0);
    }

    #[test]
    fn order_is_preserved() {
        let elements: Vec<_> = (0..20)
            .map(|i| {
                let name = format!("P{i}");
                let mut el = element(i, Some(40.0 + i as f64 * 0.001), Some(-75.0), &[]);
                el.tags.insert("name".into(), name);
                el
            })
            .collect();

        let places = normalizer(12).normalize(&elements, origin());
        let ids: Vec<_> = places.iter().map(|p| p.id.clone()).collect();
        let expected: Vec<_> = (0..20).map(|i| format!("node/{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn synthesized_fields_stay_in_range() {
        let elements: Vec<_> = (0..500)
            .map(|i| element(i, Some(40.0), Some(-75.0), &[("name", "X")]))
            .collect();

        for place in normalizer(12).normalize(&elements, origin()) {
            assert!((3.5..=5.0).contains(&place.rating), "rating {}", place.rating);
            assert_eq!((place.rating * 10.0).round() / 10.0, place.rating);
            assert!((20..520).contains(&place.review_count));
            assert!((1..=4).contains(&place.price_tier));
            assert!(place.distance_km >= 0.0);
        }
    }

    #[test]
    fn same_seed_gives_same_placeholders() {
        let elements = vec![element(1, Some(40.0), Some(-75.0), &[("name", "X")])];
        let a = normalizer(12).normalize(&elements, origin());
        let b = normalizer(12).normalize(&elements, origin());
        assert_eq!(a, b);
    }

    #[test]
    fn optional_fields_fall_back() {
        let elements = vec![
            element(1, Some(40.0), Some(-75.0), &[("name", "Bare")]),
            element(
                2,
                Some(40.0),
                Some(-75.0),
                &[
                    ("name", "Full"),
                    ("amenity", "restaurant"),
                    ("cuisine", "sushi"),
                    ("contact:phone", "+1 555 0100"),
                    ("website", "https://full.example"),
                ],
            ),
        ];

        let places = normalizer(12).normalize(&elements, origin());

        assert_eq!(places[0].category, UNKNOWN_CATEGORY);
        assert_eq!(places[0].cuisine, DEFAULT_CUISINE);
        assert_eq!(places[0].address, ADDRESS_UNAVAILABLE);
        assert_eq!(places[0].contact_phone, None);
        assert_eq!(places[0].contact_website, None);

        assert_eq!(places[1].category, "restaurant");
        assert_eq!(places[1].cuisine, "sushi");
        assert_eq!(places[1].price_tier, 3);
        assert_eq!(places[1].contact_phone.as_deref(), Some("+1 555 0100"));
        assert_eq!(places[1].contact_website.as_deref(), Some("https://full.example"));
    }

    #[test]
    fn price_tier_rules() {
        assert_eq!(price_tier("cafe", None), 2);
        assert_eq!(price_tier("fast_food", None), 1);
        assert_eq!(price_tier("fast_food", Some("burger")), 1);
        assert_eq!(price_tier("cafe", Some("fine_dining")), 4);
        assert_eq!(price_tier("restaurant", Some("fine_dining")), 4);
        assert_eq!(price_tier("restaurant", Some("French")), 3);
        assert_eq!(price_tier("restaurant", Some("pizza;italian")), 3);
        assert_eq!(price_tier("restaurant", Some("pizza")), 2);
        assert_eq!(price_tier("restaurant", None), 2);
        assert_eq!(price_tier("cafe", Some("japanese")), 2);
    }

    #[test]
    fn fast_food_beats_fine_dining() {
        assert_eq!(price_tier("fast_food", Some("fine_dining")), 1);
    }

    #[test]
    fn opening_heuristics() {
        let open_hours = |category: &str| -> Vec<u32> {
            (0..24).filter(|&h| is_open_at(category, h)).collect()
        };

        assert_eq!(open_hours("cafe"), (7..22).collect::<Vec<_>>());
        assert_eq!(
            open_hours("restaurant"),
            (11..15).chain(17..23).collect::<Vec<_>>()
        );
        assert_eq!(open_hours("bar"), (0..2).chain(16..24).collect::<Vec<_>>());
        assert_eq!(open_hours("library").len(), 24);
    }

    #[test]
    fn open_state_uses_normalizer_hour() {
        let elements = vec![element(1, Some(40.0), Some(-75.0), &[("name", "Bean"), ("amenity", "cafe")])];

        assert!(normalizer(8).normalize(&elements, origin())[0].is_open_now);
        assert!(!normalizer(23).normalize(&elements, origin())[0].is_open_now);
        // 30 wraps to 6.
        assert!(!normalizer(30).normalize(&elements, origin())[0].is_open_now);
    }

    #[test]
    fn address_fallbacks() {
        let addr = |tags: &[(&str, &str)]| compose_address(&element(1, None, None, tags));

        assert_eq!(
            addr(&[("addr:housenumber", "12"), ("addr:street", "Main St"), ("addr:city", "Town")]),
            "12 Main St"
        );
        assert_eq!(addr(&[("addr:street", "Main St")]), "Main St");
        assert_eq!(addr(&[("addr:housenumber", "12"), ("addr:city", "Town")]), "Town");
        assert_eq!(addr(&[]), ADDRESS_UNAVAILABLE);
    }
}
