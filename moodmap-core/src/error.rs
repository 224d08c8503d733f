use reqwest::StatusCode;

/// Failures talking to the POI source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Request to POI source failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("POI source responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("POI source returned a malformed body: {0}")]
    Body(#[from] serde_json::Error),
}

/// Everything that can end a discovery query.
///
/// An empty result set is not in here; see [`crate::SearchOutcome::Empty`].
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Location is unavailable: no location source is configured on this host")]
    LocationUnavailable,

    #[error("Location request was denied: {0}")]
    LocationDenied(String),

    #[error("Unknown mood '{0}'. Run `moodmap moods` to see the available moods.")]
    UnknownMood(String),

    #[error("Search radius {0} m is outside the supported range of 500..=5000 m")]
    InvalidRadius(u32),

    #[error("Network error: {0}")]
    Network(#[from] SourceError),

    #[error("Query was superseded by a newer search")]
    Superseded,
}

impl DiscoveryError {
    /// Cancellation is the caller's doing, not a failure worth reporting.
    pub fn is_superseded(&self) -> bool {
        matches!(self, DiscoveryError::Superseded)
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }

    #[test]
    fn messages_are_human_readable() {
        let err = DiscoveryError::UnknownMood("vacation".into());
        assert!(err.to_string().contains("Unknown mood 'vacation'"));

        let err = DiscoveryError::InvalidRadius(400);
        assert!(err.to_string().contains("400 m"));
    }
}
