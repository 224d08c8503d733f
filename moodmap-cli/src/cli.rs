use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use moodmap_core::{
    Config, Coordinate, DiscoveryError, SearchOutcome, SearchRequest,
    pipeline_from_config, query::RADIUS_RANGE,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "moodmap", version, about = "Find nearby places that fit your mood")]
pub struct Cli {
    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the data source, home location and search defaults.
    Configure,

    /// List the available moods.
    Moods,

    /// Search for places matching a mood around you.
    Search {
        /// Mood key, e.g. "work" or "quick_bite". Falls back to the configured default.
        mood: Option<String>,

        /// Latitude to search around; needs --lng too.
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to search around; needs --lat too.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Search radius in metres (500-5000).
        #[arg(long, short)]
        radius: Option<u32>,

        /// Only show these price tiers (1-4). Repeatable.
        #[arg(long = "price", value_parser = clap::value_parser!(u8).range(1..=4))]
        prices: Vec<u8>,

        /// Only show places rated at least this high.
        #[arg(long)]
        min_rating: Option<f64>,

        /// distance, rating, price_low or price_high. Anything else keeps source order.
        #[arg(long)]
        sort: Option<String>,

        /// Seed for the placeholder ratings, for reproducible output.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print where the config file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Moods => {
                let config = Config::load()?;
                for profile in config.catalog().iter() {
                    println!("{}", render::mood(profile));
                }
                Ok(())
            }
            Command::Search {
                mood,
                lat,
                lng,
                radius,
                prices,
                min_rating,
                sort,
                seed,
            } => {
                let config = Config::load()?;

                let origin = match (lat, lng) {
                    (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)?),
                    _ => None,
                };

                let mood = mood.or_else(|| config.search.default_mood.clone()).ok_or_else(|| {
                    anyhow!(
                        "No mood given and no default configured.\n\
                         Hint: run `moodmap moods` to see the options."
                    )
                })?;

                let mut request = SearchRequest::new(
                    &mood,
                    radius.unwrap_or(config.search.radius_meters),
                );
                request.origin = origin;
                request.filter = config.search.filter();
                if !prices.is_empty() {
                    request.filter.price_tiers = prices.into_iter().collect();
                }
                if let Some(min) = min_rating {
                    request.filter.min_rating = min;
                }
                request.sort = match sort {
                    Some(key) => key.parse().unwrap_or_default(),
                    None => config.search.sort_key(),
                };

                search(&config, request, seed).await
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn search(config: &Config, request: SearchRequest, seed: Option<u64>) -> anyhow::Result<()> {
    let mut pipeline = pipeline_from_config(config, request.origin)?;
    if let Some(seed) = seed {
        pipeline = pipeline.with_seed(seed);
    }

    let label = pipeline
        .catalog()
        .get(&request.mood)
        .map(|p| p.label.clone())
        .unwrap_or_else(|| request.mood.clone());

    match pipeline.search(&request).await {
        Ok(SearchOutcome::Empty) => {
            println!("No matches for {label} within {} m.", request.radius_meters);
        }
        Ok(SearchOutcome::Found(places)) if places.is_empty() => {
            println!("Places were found for {label}, but none pass the current filters.");
        }
        Ok(SearchOutcome::Found(places)) => {
            println!(
                "{} places for {label} within {} m (sorted by {}):\n",
                places.len(),
                request.radius_meters,
                request.sort
            );
            for (i, place) in places.iter().enumerate() {
                println!("{}\n", render::place(i, place));
            }
        }
        Err(err @ DiscoveryError::LocationUnavailable) => {
            return Err(anyhow!(
                "{err}.\nHint: pass --lat/--lng, or run `moodmap configure` to set a home location or enable IP lookup."
            ));
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/// Interactive configuration; current values are offered as defaults.
fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    config.source.endpoint = Text::new("Overpass endpoint:")
        .with_default(&config.source.endpoint)
        .prompt()
        .context("Failed to read endpoint")?;

    let set_home = Confirm::new("Set a home location?")
        .with_default(config.location.home.is_some())
        .prompt()
        .context("Failed to read answer")?;

    if set_home {
        let current = config.location.home;
        let lat = CustomType::<f64>::new("Home latitude:")
            .with_default(current.map(|c| c.lat()).unwrap_or(0.0))
            .prompt()
            .context("Failed to read latitude")?;
        let lng = CustomType::<f64>::new("Home longitude:")
            .with_default(current.map(|c| c.lng()).unwrap_or(0.0))
            .prompt()
            .context("Failed to read longitude")?;
        config.set_home(Coordinate::new(lat, lng)?);
    } else {
        config.location.home = None;
    }

    config.location.ip_lookup = Confirm::new("Fall back to IP-based location lookup?")
        .with_default(config.location.ip_lookup)
        .prompt()
        .context("Failed to read answer")?;

    let radius = CustomType::<u32>::new("Default search radius in metres (500-5000):")
        .with_default(config.search.radius_meters)
        .prompt()
        .context("Failed to read radius")?;
    if !RADIUS_RANGE.contains(&radius) {
        return Err(anyhow!("Radius {radius} m is outside 500..=5000 m; nothing saved."));
    }
    config.search.radius_meters = radius;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
