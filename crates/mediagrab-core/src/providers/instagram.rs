//! Session-based Instagram client
//!
//! Logs in with the configured account through the web login flow, then asks
//! the GraphQL shortcode query for the post. Every call gets a fresh cookie
//! jar; nothing survives between messages.

use super::http::ensure_success;
use crate::config::{InstagramCredentials, BROWSER_USER_AGENT};
use crate::media::MediaReference;
use crate::provider::{collect_references, MediaProvider, ProviderError, ProviderOutcome};
use async_trait::async_trait;
use lazy_regex::regex_is_match;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

const LOGIN_PAGE: &str = "https://www.instagram.com/accounts/login/";
const LOGIN_AJAX: &str = "https://www.instagram.com/accounts/login/ajax/";
const GRAPHQL_QUERY: &str = "https://www.instagram.com/graphql/query/";

/// Persisted query for a post looked up by shortcode
const POST_QUERY_HASH: &str = "2b0673e0dc4580674a88d426fe00ea90";

/// Instagram web app ID (public, embedded in the web client)
const IG_APP_ID: &str = "936619743392459";

/// Derive the post shortcode from the URL's final path segment.
///
/// Query string and fragment are ignored.
///
/// # Errors
///
/// Returns `ProviderError::Unsupported` if the segment is not a shortcode.
///
/// # Examples
///
/// ```
/// use mediagrab_core::providers::instagram::shortcode_from_url;
///
/// let code = shortcode_from_url("https://www.instagram.com/reel/C9xYz_1-a/?igsh=abc")
///     .expect("post URL");
/// assert_eq!(code, "C9xYz_1-a");
/// ```
pub fn shortcode_from_url(url: &str) -> Result<String, ProviderError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if regex_is_match!(r"^[A-Za-z0-9_-]+$", segment) {
        Ok(segment.to_string())
    } else {
        Err(ProviderError::Unsupported(format!("no shortcode in {url}")))
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    authenticated: Option<bool>,
    #[serde(default)]
    two_factor_required: Option<bool>,
    #[serde(default)]
    checkpoint_url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl LoginResponse {
    fn into_result(self, status: StatusCode) -> Result<(), ProviderError> {
        if self.authenticated == Some(true) {
            return Ok(());
        }
        if self.two_factor_required == Some(true) {
            return Err(ProviderError::Auth("two-factor authentication required".into()));
        }
        if self.checkpoint_url.is_some() {
            return Err(ProviderError::Auth("checkpoint required".into()));
        }
        Err(ProviderError::Auth(
            self.message
                .unwrap_or_else(|| format!("login refused (HTTP {status})")),
        ))
    }
}

/// Pick the post's video URL, falling back to its display URL.
///
/// # Errors
///
/// Returns `ProviderError::Auth` when Instagram demands a login or checkpoint,
/// `ProviderError::Unsupported` when the post is missing.
pub fn parse_post_media(body: &Value) -> Result<Vec<MediaReference>, ProviderError> {
    let Some(media) = body
        .pointer("/data/shortcode_media")
        .or_else(|| body.pointer("/data/xdt_shortcode_media"))
        .filter(|m| !m.is_null())
    else {
        if let Some(message) = body.pointer("/message").and_then(Value::as_str) {
            if message.contains("checkpoint_required") || message.contains("login_required") {
                return Err(ProviderError::Auth(message.to_string()));
            }
        }
        return Err(ProviderError::Unsupported(
            "post not found or media unavailable".into(),
        ));
    };

    let field = |name: &str| {
        media
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    Ok(collect_references([field("video_url").or_else(|| field("display_url"))]))
}

/// Authenticated Instagram client, last in the Instagram chain
pub struct InstagramSessionProvider {
    credentials: Option<InstagramCredentials>,
    timeout: Duration,
}

impl InstagramSessionProvider {
    /// Create a provider; without credentials every call fails fast
    #[must_use]
    pub const fn new(credentials: Option<InstagramCredentials>, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }

    fn session_client(&self) -> Result<HttpClient, ProviderError> {
        HttpClient::builder()
            .cookie_store(true)
            .user_agent(BROWSER_USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))
    }

    async fn login(
        client: &HttpClient,
        credentials: &InstagramCredentials,
    ) -> Result<(), ProviderError> {
        let page = ensure_success(client.get(LOGIN_PAGE).send().await?)?;
        let csrf_token = page
            .cookies()
            .find(|c| c.name() == "csrftoken")
            .map(|c| c.value().to_string())
            .ok_or_else(|| ProviderError::Auth("no CSRF token on login page".into()))?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            chrono::Utc::now().timestamp(),
            credentials.password()
        );

        let response = client
            .post(LOGIN_AJAX)
            .header("X-CSRFToken", csrf_token)
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", LOGIN_PAGE)
            .form(&[
                ("username", credentials.username.as_str()),
                ("enc_password", enc_password.as_str()),
                ("queryParams", "{}"),
                ("optIntoOneTap", "false"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        let login: LoginResponse = match response.json().await {
            Ok(login) => login,
            Err(_) if !status.is_success() => return Err(ProviderError::Status(status.as_u16())),
            Err(e) => return Err(ProviderError::Parse(e.to_string())),
        };
        login.into_result(status)
    }

    async fn fetch_post(
        client: &HttpClient,
        shortcode: &str,
    ) -> Result<Vec<MediaReference>, ProviderError> {
        let variables = json!({ "shortcode": shortcode }).to_string();
        let response = client
            .get(GRAPHQL_QUERY)
            .header("X-IG-App-ID", IG_APP_ID)
            .query(&[("query_hash", POST_QUERY_HASH), ("variables", variables.as_str())])
            .send()
            .await?;

        let body: Value = ensure_success(response)?.json().await?;
        parse_post_media(&body)
    }

    async fn lookup(&self, url: &str) -> Result<Vec<MediaReference>, ProviderError> {
        let shortcode = shortcode_from_url(url)?;
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::MissingCredentials("instagram"))?;

        let client = self.session_client()?;
        Self::login(&client, credentials).await?;
        info!(username = %credentials.username, "Instagram session established");

        debug!(shortcode = %shortcode, "Fetching Instagram post");
        Self::fetch_post(&client, &shortcode).await
    }
}

#[async_trait]
impl MediaProvider for InstagramSessionProvider {
    fn name(&self) -> &'static str {
        "instagram_session"
    }

    async fn resolve(&self, url: &str) -> ProviderOutcome {
        let result = self.lookup(url).await;
        if let Err(ref e) = result {
            warn!(provider = "instagram_session", error = %e, "Instagram session lookup failed");
        }
        ProviderOutcome::from_result(result)
    }
}
