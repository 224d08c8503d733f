use moodmap_core::{MoodProfile, Place, viewer_url};

pub fn price(tier: u8) -> String {
    "$".repeat(usize::from(tier.clamp(1, 4)))
}

pub fn distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{km:.1} km")
    }
}

pub fn place(index: usize, place: &Place) -> String {
    let open = if place.is_open_now { "open now" } else { "closed" };

    let mut lines = vec![
        format!("{}. {}", index + 1, place.name),
        format!(
            "   {} · {} · {} · ★ {:.1} ({} reviews)",
            place.category,
            place.cuisine,
            price(place.price_tier),
            place.rating,
            place.review_count
        ),
        format!("   {} away · {open}", distance(place.distance_km)),
        format!("   {}", place.address),
    ];

    if let Some(phone) = &place.contact_phone {
        lines.push(format!("   tel: {phone}"));
    }
    if let Some(web) = &place.contact_website {
        lines.push(format!("   web: {web}"));
    }
    lines.push(format!("   map: {}", viewer_url(&place.location)));

    lines.join("\n")
}

pub fn mood(profile: &MoodProfile) -> String {
    let mut out = format!("{:<12} {}", profile.key, profile.label);
    if !profile.description.is_empty() {
        out.push_str(&format!(" - {}", profile.description));
    }
    out.push_str(&format!("\n{:<12} looks for: {}", "", profile.category_tags.join(", ")));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodmap_core::Coordinate;

    #[test]
    fn price_is_dollar_signs() {
        assert_eq!(price(1), "$");
        assert_eq!(price(4), "$$$$");
    }

    #[test]
    fn short_distances_in_metres() {
        assert_eq!(distance(0.1391), "139 m");
        assert_eq!(distance(2.345), "2.3 km");
    }

    #[test]
    fn place_block_has_map_link() {
        let p = Place {
            id: "node/1".into(),
            name: "Blue Cafe".into(),
            address: "12 Main St".into(),
            rating: 4.3,
            review_count: 88,
            price_tier: 2,
            distance_km: 0.14,
            is_open_now: true,
            location: Coordinate::new(40.001, -75.001).unwrap(),
            category: "cafe".into(),
            cuisine: "Various".into(),
            contact_phone: Some("+1 555 0100".into()),
            contact_website: None,
        };

        let text = place(0, &p);
        assert!(text.starts_with("1. Blue Cafe"));
        assert!(text.contains("$$"));
        assert!(text.contains("140 m away · open now"));
        assert!(text.contains("tel: +1 555 0100"));
        assert!(!text.contains("web:"));
        assert!(text.contains("map: https://www.openstreetmap.org/?mlat=40.001&mlon=-75.001"));
    }
}
