//! fdown.net HTML scraper, last resort for Facebook videos.

use super::http::{create_http_client, ensure_success};
use crate::media::MediaReference;
use crate::provider::{collect_references, MediaProvider, ProviderError, ProviderOutcome};
use async_trait::async_trait;
use lazy_regex::regex;
use reqwest::Client as HttpClient;
use std::time::Duration;
use tracing::{debug, warn};

/// fdown download page
pub const FDOWN_ENDPOINT: &str = "https://fdown.net/download.php";

/// Find JSON-escaped video links (`https:\/\/video...\.mp4`) and unescape them.
#[must_use]
pub fn scan_video_links(html: &str) -> Vec<MediaReference> {
    collect_references(
        regex!(r#"https:\\/\\/video[^"]+\.mp4"#)
            .find_iter(html)
            .map(|m| Some(m.as_str().replace("\\/", "/"))),
    )
}

/// Scrapes the fdown mirror's download page
pub struct FdownProvider {
    endpoint: String,
    client: HttpClient,
}

impl FdownProvider {
    /// Create a provider against the public fdown endpoint
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_endpoint(FDOWN_ENDPOINT, timeout)
    }

    /// Create a provider against a custom endpoint
    #[must_use]
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: create_http_client(timeout),
        }
    }

    async fn scrape(&self, url: &str) -> Result<Vec<MediaReference>, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("URLz", url)])
            .send()
            .await?;

        let html = ensure_success(response)?.text().await?;
        Ok(scan_video_links(&html))
    }
}

#[async_trait]
impl MediaProvider for FdownProvider {
    fn name(&self) -> &'static str {
        "fdown"
    }

    async fn resolve(&self, url: &str) -> ProviderOutcome {
        debug!(url = %url, "Scraping fdown");
        let result = self.scrape(url).await;
        if let Err(ref e) = result {
            warn!(provider = "fdown", error = %e, "fdown scrape failed");
        }
        ProviderOutcome::from_result(result)
    }
}
