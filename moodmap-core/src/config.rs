use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fs, path::PathBuf};

use crate::{
    filter::{FilterOptions, SortKey},
    location::DEFAULT_IP_ENDPOINT,
    model::Coordinate,
    mood::{MoodCatalog, MoodProfile},
    provider::overpass::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS},
};

pub const DEFAULT_USER_AGENT: &str = concat!("moodmap/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_RADIUS_METERS: u32 = 1500;

/// Where POI data comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// How to find the user when no position is given explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Example TOML:
    /// [location.home]
    /// lat = 40.0
    /// lng = -75.0
    pub home: Option<Coordinate>,
    pub ip_lookup: bool,
    pub ip_endpoint: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            home: None,
            ip_lookup: false,
            ip_endpoint: DEFAULT_IP_ENDPOINT.to_string(),
        }
    }
}

/// Defaults applied when the user doesn't say otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub default_mood: Option<String>,
    pub radius_meters: u32,
    pub sort: String,
    pub min_rating: f64,
    pub price_tiers: BTreeSet<u8>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        let filter = FilterOptions::default();
        Self {
            default_mood: None,
            radius_meters: DEFAULT_RADIUS_METERS,
            sort: SortKey::default().to_string(),
            min_rating: filter.min_rating,
            price_tiers: filter.price_tiers,
        }
    }
}

impl SearchDefaults {
    pub fn filter(&self) -> FilterOptions {
        FilterOptions {
            price_tiers: self.price_tiers.clone(),
            min_rating: self.min_rating,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        // Infallible.
        self.sort.parse().unwrap_or_default()
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub location: LocationConfig,
    pub search: SearchDefaults,

    /// Extra moods, or replacements for built-in ones with the same key.
    ///
    /// Example TOML:
    /// [[moods]]
    /// key = "sweet"
    /// label = "Sweet Tooth"
    /// category_tags = ["ice_cream"]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub moods: Vec<MoodProfile>,
}

impl Config {
    /// Built-in moods plus any configured ones.
    pub fn catalog(&self) -> MoodCatalog {
        MoodCatalog::with_overrides(&self.moods)
    }

    pub fn set_home(&mut self, home: Coordinate) {
        self.location.home = Some(home);
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "moodmap", "moodmap")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
