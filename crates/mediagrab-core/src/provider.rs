//! Media provider trait for the resolver's fallback chains
//!
//! Each provider is one independent attempt at turning a page URL into direct
//! media URLs. Implementations include `YtdlpProvider`, `AjaxMirrorProvider`,
//! `InstagramSessionProvider` and `FdownProvider`.

use crate::media::MediaReference;
use async_trait::async_trait;
use thiserror::Error;

/// Errors a provider can hit while resolving a URL
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),
    /// The request or child process exceeded its time bound
    #[error("Timed out")]
    Timeout,
    /// Upstream answered with a non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),
    /// Upstream answered with something we could not read
    #[error("Parse error: {0}")]
    Parse(String),
    /// The URL or content is not supported by this provider
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// The provider needs credentials that were not configured
    #[error("Missing credentials for {0}")]
    MissingCredentials(&'static str),
    /// Login was refused
    #[error("Authentication failed: {0}")]
    Auth(String),
    /// Upstream asked us to slow down (429)
    #[error("Rate limited")]
    RateLimited,
    /// The extractor reported a failure that may clear up on its own
    #[error("Extractor error: {0}")]
    Extractor(String),
    /// The provider's backend is not installed or not reachable at all
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    /// Whether the same request might succeed if tried again later
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_)
            | Self::Timeout
            | Self::RateLimited
            | Self::Extractor(_) => true,
            Self::Status(code) => *code == 429 || *code >= 500,
            Self::Parse(_)
            | Self::Unsupported(_)
            | Self::MissingCredentials(_)
            | Self::Auth(_)
            | Self::Unavailable(_) => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// What one provider produced for one URL
#[derive(Debug)]
pub enum ProviderOutcome {
    /// At least one media reference
    Found(Vec<MediaReference>),
    /// The provider ran fine but had nothing to offer
    Empty,
    /// The provider failed; the chain moves on
    Failed(ProviderError),
}

impl ProviderOutcome {
    /// Normalize a provider's internal result. An empty list becomes `Empty`.
    #[must_use]
    pub fn from_result(result: Result<Vec<MediaReference>, ProviderError>) -> Self {
        match result {
            Ok(media) if media.is_empty() => Self::Empty,
            Ok(media) => Self::Found(media),
            Err(e) => Self::Failed(e),
        }
    }

    /// The media list, empty unless `Found`
    #[must_use]
    pub fn into_media(self) -> Vec<MediaReference> {
        match self {
            Self::Found(media) => media,
            Self::Empty | Self::Failed(_) => Vec::new(),
        }
    }
}

/// Unified interface for media providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProvider: Send + Sync {
    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;

    /// Try to resolve `url` into direct media references.
    ///
    /// Implementations never panic or propagate; every failure becomes
    /// `ProviderOutcome::Failed`.
    async fn resolve(&self, url: &str) -> ProviderOutcome;
}

/// Turn a list of optional URL strings into references, dropping blanks.
pub(crate) fn collect_references<I, S>(urls: I) -> Vec<MediaReference>
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    urls.into_iter()
        .flatten()
        .filter_map(MediaReference::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        assert!(matches!(
            ProviderOutcome::from_result(Ok(Vec::new())),
            ProviderOutcome::Empty
        ));

        let media = collect_references([Some("https://a.example/b.jpg")]);
        assert!(matches!(
            ProviderOutcome::from_result(Ok(media)),
            ProviderOutcome::Found(ref m) if m.len() == 1
        ));

        let failed = ProviderOutcome::from_result(Err(ProviderError::RateLimited));
        assert!(failed.into_media().is_empty());
    }

    #[test]
    fn test_collect_references_drops_absent_values() {
        let media = collect_references([
            Some("https://a.example/1.mp4".to_string()),
            None,
            Some(String::new()),
            Some("https://a.example/2.jpg".to_string()),
        ]);
        let urls: Vec<&str> = media.iter().map(MediaReference::as_str).collect();
        assert_eq!(urls, vec!["https://a.example/1.mp4", "https://a.example/2.jpg"]);
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Network("reset".into()).is_transient());
        assert!(ProviderError::Status(503).is_transient());
        assert!(ProviderError::Status(429).is_transient());
        assert!(!ProviderError::Status(404).is_transient());
        assert!(!ProviderError::MissingCredentials("instagram").is_transient());
        assert!(!ProviderError::Unsupported("nope".into()).is_transient());
    }
}
