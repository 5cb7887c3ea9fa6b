//! HTTP helpers shared by the scraping providers.

use crate::config::BROWSER_USER_AGENT;
use crate::provider::ProviderError;
use reqwest::{Client as HttpClient, Response};
use std::time::Duration;

/// Creates an HTTP client bounded by `timeout`.
///
/// Falls back to a default client if the builder fails, so a provider is
/// always constructible.
#[must_use]
pub(crate) fn create_http_client(timeout: Duration) -> HttpClient {
    HttpClient::builder()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Rejects non-2xx responses with `ProviderError::Status`.
pub(crate) fn ensure_success(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status.as_u16() == 429 {
        Err(ProviderError::RateLimited)
    } else {
        Err(ProviderError::Status(status.as_u16()))
    }
}
