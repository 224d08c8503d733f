//! Core library for the `moodmap` CLI.
//!
//! This crate defines:
//! - The mood catalog and the query it compiles to
//! - Abstractions over location and POI sources, with Overpass and IP-lookup implementations
//! - Normalization of raw POI data into places, plus filtering and sorting
//! - The search pipeline and its presentation state
//! - Configuration handling
//!
//! It is used by `moodmap-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod location;
pub mod model;
pub mod mood;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod query;
pub mod state;

pub use config::Config;
pub use error::{DiscoveryError, SourceError};
pub use filter::{FilterOptions, SortKey};
pub use geo::{distance_km, viewer_url};
pub use location::{FixedLocator, IpLocator, Locator};
pub use model::{Coordinate, InvalidCoordinate, Place, RawElement};
pub use mood::{MoodCatalog, MoodProfile};
pub use normalize::Normalizer;
pub use pipeline::{Pipeline, SearchOutcome, SearchRequest};
pub use provider::PoiSource;
pub use query::{QuerySpec, build_query};
pub use state::{SearchEvent, SearchState};

/// Build a pipeline from config. `origin` wins over anything configured.
pub fn pipeline_from_config(config: &Config, origin: Option<Coordinate>) -> anyhow::Result<Pipeline> {
    let locator = location::locator_from_config(config, origin)?;
    let source = provider::source_from_config(config)?;

    Ok(Pipeline::new(config.catalog(), locator, source))
}
