use std::{cmp::Ordering, collections::BTreeSet, convert::Infallible, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::Place;

/// User-selected filters. The default keeps everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub price_tiers: BTreeSet<u8>,
    pub min_rating: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            price_tiers: (1..=4).collect(),
            min_rating: 0.0,
        }
    }
}

impl FilterOptions {
    pub fn matches(&self, place: &Place) -> bool {
        self.price_tiers.contains(&place.price_tier) && place.rating >= self.min_rating
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Distance,
    Rating,
    PriceLow,
    PriceHigh,
    /// Leave the order as it came in.
    Unsorted,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Distance => "distance",
            SortKey::Rating => "rating",
            SortKey::PriceLow => "price_low",
            SortKey::PriceHigh => "price_high",
            SortKey::Unsorted => "unsorted",
        }
    }

    fn compare(&self, a: &Place, b: &Place) -> Ordering {
        match self {
            SortKey::Distance => a.distance_km.total_cmp(&b.distance_km),
            SortKey::Rating => b.rating.total_cmp(&a.rating),
            SortKey::PriceLow => a.price_tier.cmp(&b.price_tier),
            SortKey::PriceHigh => b.price_tier.cmp(&a.price_tier),
            SortKey::Unsorted => Ordering::Equal,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Never fails: anything unrecognized means "don't reorder".
impl FromStr for SortKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_lowercase().as_str() {
            "distance" => SortKey::Distance,
            "rating" => SortKey::Rating,
            "price_low" => SortKey::PriceLow,
            "price_high" => SortKey::PriceHigh,
            other => {
                tracing::debug!(sort_key = other, "unrecognized sort key, keeping order");
                SortKey::Unsorted
            }
        };
        Ok(key)
    }
}

/// Filter then stable-sort. Ties keep their incoming order.
pub fn apply(places: &[Place], filter: &FilterOptions, sort: SortKey) -> Vec<Place> {
    let mut kept: Vec<Place> = places.iter().filter(|p| filter.matches(p)).cloned().collect();

    if sort != SortKey::Unsorted {
        kept.sort_by(|a, b| sort.compare(a, b));
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    fn place(id: &str, rating: f64, price_tier: u8, distance_km: f64) -> Place {
        Place {
            id: id.to_string(),
            name: id.to_string(),
            address: String::new(),
            rating,
            review_count: 20,
            price_tier,
            distance_km,
            is_open_now: true,
            location: Coordinate::new(0.0, 0.0).unwrap(),
            category: "cafe".to_string(),
            cuisine: "Various".to_string(),
            contact_phone: None,
            contact_website: None,
        }
    }

    fn ids(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.id.as_str()).collect()
    }

    fn sample() -> Vec<Place> {
        vec![
            place("a", 4.0, 2, 1.2),
            place("b", 4.5, 1, 0.3),
            place("c", 4.0, 3, 2.0),
            place("d", 3.6, 4, 0.9),
            place("e", 4.5, 2, 0.1),
        ]
    }

    #[test]
    fn default_filter_keeps_everything_in_order() {
        let out = apply(&sample(), &FilterOptions::default(), SortKey::Unsorted);
        assert_eq!(ids(&out), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn filter_keeps_exactly_the_matching_places() {
        let places = sample();
        for tiers in [vec![1], vec![2, 3], vec![4], vec![], vec![1, 2, 3, 4]] {
            for min_rating in [0.0, 3.6, 4.0, 4.5, 5.0] {
                let filter = FilterOptions {
                    price_tiers: tiers.iter().copied().collect(),
                    min_rating,
                };
                let out = apply(&places, &filter, SortKey::Unsorted);

                let expected: Vec<_> = places
                    .iter()
                    .filter(|p| tiers.contains(&p.price_tier) && p.rating >= min_rating)
                    .map(|p| p.id.as_str())
                    .collect();
                assert_eq!(ids(&out), expected, "tiers {tiers:?} min {min_rating}");
            }
        }
    }

    #[test]
    fn sort_by_distance_ascending() {
        let out = apply(&sample(), &FilterOptions::default(), SortKey::Distance);
        assert_eq!(ids(&out), ["e", "b", "d", "a", "c"]);
    }

    #[test]
    fn sort_by_rating_is_descending_and_stable() {
        let out = apply(&sample(), &FilterOptions::default(), SortKey::Rating);
        assert_eq!(ids(&out), ["b", "e", "a", "c", "d"]);
        assert!(out.windows(2).all(|w| w[0].rating >= w[1].rating));
    }

    #[test]
    fn sort_by_price_both_ways_is_stable() {
        let low = apply(&sample(), &FilterOptions::default(), SortKey::PriceLow);
        assert_eq!(ids(&low), ["b", "a", "e", "c", "d"]);

        let high = apply(&sample(), &FilterOptions::default(), SortKey::PriceHigh);
        assert_eq!(ids(&high), ["d", "c", "a", "e", "b"]);
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("distance".parse::<SortKey>(), Ok(SortKey::Distance));
        assert_eq!("Rating".parse::<SortKey>(), Ok(SortKey::Rating));
        assert_eq!("price_low".parse::<SortKey>(), Ok(SortKey::PriceLow));
        assert_eq!("price_high".parse::<SortKey>(), Ok(SortKey::PriceHigh));
        assert_eq!("popularity".parse::<SortKey>(), Ok(SortKey::Unsorted));
    }

    #[test]
    fn unknown_sort_key_is_identity() {
        let key: SortKey = "nonsense".parse().unwrap();
        let out = apply(&sample(), &FilterOptions::default(), key);
        assert_eq!(ids(&out), ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn single_place_is_unchanged_by_sorting() {
        let one = vec![place("only", 4.2, 2, 0.4)];
        for key in [SortKey::Distance, SortKey::Rating, SortKey::PriceLow, SortKey::PriceHigh] {
            assert_eq!(apply(&one, &FilterOptions::default(), key), one);
        }
    }
}
