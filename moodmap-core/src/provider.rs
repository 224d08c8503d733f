use crate::{
    Config, QuerySpec,
    error::SourceError,
    model::RawElement,
    provider::overpass::OverpassSource,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod overpass;

/// Anything that can answer a [`QuerySpec`] with raw tagged elements.
#[async_trait]
pub trait PoiSource: Send + Sync + Debug {
    /// One request, no retries. An empty vector is a valid answer.
    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<RawElement>, SourceError>;
}

/// Construct the configured POI source.
pub fn source_from_config(config: &Config) -> anyhow::Result<Box<dyn PoiSource>> {
    let source = OverpassSource::new(
        &config.source.endpoint,
        config.source.timeout_secs,
        &config.source.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("Failed to set up POI source '{}': {e}", config.source.endpoint))?;

    Ok(Box::new(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_from_default_config_builds() {
        let cfg = Config::default();
        assert!(source_from_config(&cfg).is_ok());
    }
}
