use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{SourceError, truncate_body},
    model::RawElement,
    query::QuerySpec,
};

use super::PoiSource;

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

#[derive(Debug, Clone)]
pub struct OverpassSource {
    endpoint: String,
    timeout_secs: u64,
    http: Client,
}

impl OverpassSource {
    pub fn new(endpoint: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            timeout_secs,
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<serde_json::Value>,
}

/// Parses the response envelope strictly and each element leniently.
/// Elements that do not fit [`RawElement`] are dropped.
fn parse_elements(body: &str) -> Result<Vec<RawElement>, serde_json::Error> {
    let parsed: OverpassResponse = serde_json::from_str(body)?;
    let received = parsed.elements.len();

    let elements: Vec<RawElement> = parsed
        .elements
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawElement>(value) {
            Ok(el) => Some(el),
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed element");
                None
            }
        })
        .collect();

    tracing::debug!(received, kept = elements.len(), "overpass returned elements");
    Ok(elements)
}

#[async_trait]
impl PoiSource for OverpassSource {
    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<RawElement>, SourceError> {
        let ql = query.to_overpass_ql(self.timeout_secs);
        tracing::debug!(endpoint = %self.endpoint, %ql, "sending overpass query");

        // `form` sets application/x-www-form-urlencoded.
        let res = self
            .http
            .post(&self.endpoint)
            .form(&[("data", ql.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(parse_elements(&body)?)
    }
}
