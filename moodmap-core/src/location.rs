//! Where is the user right now?
//!
//! A [`Locator`] makes exactly one attempt per call; callers retry if they want to.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{Config, DiscoveryError, model::Coordinate};

pub const DEFAULT_IP_ENDPOINT: &str = "http://ip-api.com/json/";
const IP_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinate, DiscoveryError>;
}

/// A position the host already knows, such as one passed on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocator(pub Option<Coordinate>);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinate, DiscoveryError> {
        self.0.ok_or(DiscoveryError::LocationUnavailable)
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    endpoint: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(endpoint: &str, user_agent: &str) -> Result<Self, DiscoveryError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(IP_LOOKUP_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()
            .map_err(|_| DiscoveryError::LocationUnavailable)?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinate, DiscoveryError> {
        let denied = |reason: String| {
            tracing::warn!(endpoint = %self.endpoint, %reason, "ip geolocation failed");
            DiscoveryError::LocationDenied(reason)
        };

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| denied(format!("lookup request failed: {e}")))?;

        if !res.status().is_success() {
            return Err(denied(format!("lookup returned status {}", res.status())));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| denied(format!("lookup response unreadable: {e}")))?;

        if body.status != "success" {
            let message = body.message.unwrap_or_else(|| body.status.clone());
            return Err(denied(format!("lookup refused: {message}")));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(denied("lookup response had no coordinates".to_string()));
        };

        let at = Coordinate::new(lat, lon).map_err(|e| denied(e.to_string()))?;
        tracing::info!(%at, "resolved location from ip address");
        Ok(at)
    }
}

/// Pick a locator: an explicit position, then the configured home, then IP lookup if enabled.
pub fn locator_from_config(
    config: &Config,
    explicit: Option<Coordinate>,
) -> anyhow::Result<Box<dyn Locator>> {
    if let Some(at) = explicit.or(config.location.home) {
        return Ok(Box::new(FixedLocator(Some(at))));
    }

    if config.location.ip_lookup {
        let locator = IpLocator::new(&config.location.ip_endpoint, &config.source.user_agent)
            .map_err(|e| anyhow::anyhow!("Failed to set up IP location lookup: {e}"))?;
        return Ok(Box::new(locator));
    }

    Ok(Box::new(FixedLocator(None)))
}
