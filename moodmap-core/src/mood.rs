use serde::{Deserialize, Serialize};

/// What a mood searches for. Category tags are `amenity` values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodProfile {
    pub key: String,
    pub label: String,
    pub category_tags: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl MoodProfile {
    pub fn new(key: &str, label: &str, category_tags: &[&str], description: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            category_tags: category_tags.iter().map(|t| t.to_string()).collect(),
            description: description.to_string(),
        }
        .deduplicated()
    }

    /// Drop repeated tags, keeping first occurrence order.
    fn deduplicated(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.category_tags.len());
        self.category_tags.retain(|tag| {
            if seen.contains(tag) {
                false
            } else {
                seen.push(tag.clone());
                true
            }
        });
        self
    }
}

/// Immutable registry of moods, built once and handed to whoever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodCatalog {
    profiles: Vec<MoodProfile>,
}

impl MoodCatalog {
    pub fn new(profiles: Vec<MoodProfile>) -> Self {
        let mut catalog = Self { profiles: Vec::with_capacity(profiles.len()) };
        for profile in profiles {
            catalog.insert(profile);
        }
        catalog
    }

    /// The four moods the app ships with.
    pub fn reference() -> Self {
        Self::new(vec![
            MoodProfile::new(
                "work",
                "Work",
                &["cafe", "library", "coworking_space"],
                "Quiet places to sit down with a laptop",
            ),
            MoodProfile::new(
                "date",
                "Date",
                &["restaurant", "bar", "pub"],
                "Somewhere nice to spend an evening together",
            ),
            MoodProfile::new(
                "quick_bite",
                "Quick Bite",
                &["fast_food", "cafe", "food_court"],
                "Grab something and go",
            ),
            MoodProfile::new(
                "budget",
                "Budget",
                &["fast_food", "food_court", "ice_cream"],
                "Good food that won't empty your wallet",
            ),
        ])
    }

    /// Reference catalog with `extra` layered on top; same key replaces.
    pub fn with_overrides(extra: &[MoodProfile]) -> Self {
        let mut catalog = Self::reference();
        for profile in extra {
            catalog.insert(profile.clone());
        }
        catalog
    }

    /// Look up a mood. Keys are matched case-insensitively and `-`/space act as `_`.
    pub fn get(&self, key: &str) -> Option<&MoodProfile> {
        let wanted = normalize_key(key);
        self.profiles.iter().find(|p| p.key == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoodProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn insert(&mut self, profile: MoodProfile) {
        let mut profile = profile.deduplicated();
        profile.key = normalize_key(&profile.key);

        match self.profiles.iter_mut().find(|p| p.key == profile.key) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }
}

impl Default for MoodCatalog {
    fn default() -> Self {
        Self::reference()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace(['-', ' '], "_")
}
