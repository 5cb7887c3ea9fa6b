//! Mirror-scrape providers (saveig, snapinsta)
//!
//! Both services expose the same `ajaxSearch` endpoint: a form POST with the
//! page URL in `q`, answered by JSON carrying a `medias` list.

use super::http::{create_http_client, ensure_success};
use crate::media::MediaReference;
use crate::provider::{collect_references, MediaProvider, ProviderError, ProviderOutcome};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// saveig search endpoint
pub const SAVEIG_ENDPOINT: &str = "https://saveig.app/api/ajaxSearch";

/// snapinsta search endpoint
pub const SNAPINSTA_ENDPOINT: &str = "https://snapinsta.app/api/ajaxSearch";

#[derive(Debug, Deserialize)]
struct AjaxSearchResponse {
    #[serde(default)]
    medias: Vec<AjaxMedia>,
}

#[derive(Debug, Deserialize)]
struct AjaxMedia {
    #[serde(default)]
    url: Option<serde_json::Value>,
}

/// Extract every string `url` from an `ajaxSearch` JSON body
///
/// # Errors
///
/// Returns `ProviderError::Parse` if the body is not the expected JSON shape.
pub fn parse_ajax_medias(body: &str) -> Result<Vec<MediaReference>, ProviderError> {
    let response: AjaxSearchResponse = serde_json::from_str(body)?;
    Ok(collect_references(response.medias.into_iter().map(|m| {
        m.url.and_then(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
    })))
}

/// Provider backed by a third-party `ajaxSearch` mirror
pub struct AjaxMirrorProvider {
    name: &'static str,
    endpoint: String,
    client: HttpClient,
}

impl AjaxMirrorProvider {
    /// Create a provider for an arbitrary mirror endpoint
    #[must_use]
    pub fn new(name: &'static str, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name,
            endpoint: endpoint.into(),
            client: create_http_client(timeout),
        }
    }

    /// The saveig.app mirror
    #[must_use]
    pub fn saveig(timeout: Duration) -> Self {
        Self::new("saveig", SAVEIG_ENDPOINT, timeout)
    }

    /// The snapinsta.app mirror
    #[must_use]
    pub fn snapinsta(timeout: Duration) -> Self {
        Self::new("snapinsta", SNAPINSTA_ENDPOINT, timeout)
    }

    async fn search(&self, url: &str) -> Result<Vec<MediaReference>, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", url)])
            .send()
            .await?;

        let body = ensure_success(response)?.text().await?;
        parse_ajax_medias(&body)
    }
}

#[async_trait]
impl MediaProvider for AjaxMirrorProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn resolve(&self, url: &str) -> ProviderOutcome {
        debug!(provider = self.name, url = %url, "Querying mirror");
        let result = self.search(url).await;
        if let Err(ref e) = result {
            warn!(provider = self.name, error = %e, "Mirror lookup failed");
        }
        ProviderOutcome::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::http::test_server::{serve_once, stall};

    #[test]
    fn test_parse_collects_url_fields_only() {
        let body = r#"{
            "status": "ok",
            "medias": [
                {"url": "https://cdn.example/1.mp4", "type": "video"},
                {"type": "image"},
                {"url": null},
                {"url": "https://cdn.example/2.jpg"}
            ]
        }"#;

        let media = parse_ajax_medias(body).expect("valid body");
        let urls: Vec<&str> = media.iter().map(MediaReference::as_str).collect();
        assert_eq!(urls, vec!["https://cdn.example/1.mp4", "https://cdn.example/2.jpg"]);
    }

    #[test]
    fn test_parse_missing_medias_is_empty() {
        let media = parse_ajax_medias(r#"{"status": "error"}"#).expect("valid body");
        assert!(media.is_empty());
    }

    #[test]
    fn test_parse_rejects_html() {
        let err = parse_ajax_medias("<!DOCTYPE html><html></html>").expect_err("not json");
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_softly() {
        let provider = AjaxMirrorProvider::new(
            "local",
            "http://127.0.0.1:9/api/ajaxSearch",
            Duration::from_secs(2),
        );
        let outcome = provider.resolve("https://www.instagram.com/p/abc/").await;
        assert!(matches!(outcome, ProviderOutcome::Failed(_)));
        assert_eq!(provider.name(), "local");
    }

    #[tokio::test]
    async fn test_posts_form_and_reads_medias() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"status":"ok","medias":[{"url":"https://cdn.example/reel.mp4"}]}"#,
        )
        .await;
        let provider = AjaxMirrorProvider::new(
            "local",
            format!("{base}/api/ajaxSearch"),
            Duration::from_secs(5),
        );

        let outcome = provider.resolve("https://www.instagram.com/p/abc/").await;
        let request = server.await.expect("server task");

        assert!(request.starts_with("POST /api/ajaxSearch "));
        assert!(request.contains("application/x-www-form-urlencoded"));
        assert!(request.ends_with("q=https%3A%2F%2Fwww.instagram.com%2Fp%2Fabc%2F"));
        assert!(matches!(
            outcome,
            ProviderOutcome::Found(ref m) if m[0].as_str() == "https://cdn.example/reel.mp4"
        ));
    }

    #[tokio::test]
    async fn test_server_error_yields_nothing() {
        let (base, server) = serve_once("500 Internal Server Error", "oops").await;
        let provider = AjaxMirrorProvider::new("local", base, Duration::from_secs(5));

        let outcome = provider.resolve("https://www.instagram.com/p/abc/").await;
        server.await.expect("server task");

        assert!(matches!(
            outcome,
            ProviderOutcome::Failed(ProviderError::Status(500))
        ));
        assert!(outcome.into_media().is_empty());
    }

    #[tokio::test]
    async fn test_stalled_mirror_times_out() {
        let (base, _server) = stall().await;
        let provider = AjaxMirrorProvider::new("local", base, Duration::from_secs(1));

        let outcome = provider.resolve("https://www.instagram.com/p/abc/").await;
        assert!(matches!(
            outcome,
            ProviderOutcome::Failed(ProviderError::Timeout)
        ));
    }
}
