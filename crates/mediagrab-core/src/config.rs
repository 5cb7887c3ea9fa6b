//! Configuration and settings management
//!
//! Loads resolver settings from config files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Upper bound for calls to mirror/scraping services (seconds).
pub const SCRAPE_TIMEOUT_SECS: u64 = 10;

/// Upper bound for one yt-dlp invocation (seconds).
pub const YTDLP_TIMEOUT_SECS: u64 = 120;

/// Default yt-dlp executable looked up on `PATH`.
pub const YTDLP_DEFAULT_PATH: &str = "yt-dlp";

/// Link offered to the user when every provider came back empty.
pub const MANUAL_DOWNLOAD_BASE: &str = "https://www.hitube.io/en?url=";

/// Browser user agent sent to scraping endpoints.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Build the layered configuration shared by all crates.
///
/// Sources, later ones overriding earlier ones:
/// `config/default`, `config/{RUN_MODE}`, `config/local`,
/// `APP_`-prefixed environment, then plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a present config file cannot be parsed.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg.. `APP_YTDLP_PATH=/opt/yt-dlp ./target/app`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Plain UPPER_SNAKE_CASE variables map to snake_case keys; empty ones count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

/// Settings consumed by the media resolver and its providers
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelaySettings {
    /// Instagram account used by the session-based client
    pub ig_username: Option<String>,
    /// Password for `ig_username`
    pub ig_password: Option<String>,

    /// Timeout for mirror and scraping services
    #[serde(default = "default_scrape_timeout_secs")]
    pub scrape_timeout_secs: u64,

    /// yt-dlp executable
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
    /// Timeout for one yt-dlp run
    #[serde(default = "default_ytdlp_timeout_secs")]
    pub ytdlp_timeout_secs: u64,
}

const fn default_scrape_timeout_secs() -> u64 {
    SCRAPE_TIMEOUT_SECS
}

const fn default_ytdlp_timeout_secs() -> u64 {
    YTDLP_TIMEOUT_SECS
}

fn default_ytdlp_path() -> String {
    YTDLP_DEFAULT_PATH.to_string()
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            ig_username: None,
            ig_password: None,
            scrape_timeout_secs: SCRAPE_TIMEOUT_SECS,
            ytdlp_path: default_ytdlp_path(),
            ytdlp_timeout_secs: YTDLP_TIMEOUT_SECS,
        }
    }
}

impl RelaySettings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mediagrab_core::config::RelaySettings;
    ///
    /// let settings = RelaySettings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Instagram credentials, if both halves are configured
    #[must_use]
    pub fn instagram_credentials(&self) -> Option<InstagramCredentials> {
        match (&self.ig_username, &self.ig_password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(InstagramCredentials::new(username.clone(), password.clone()))
            }
            _ => None,
        }
    }

    /// Bound applied to scraping requests
    #[must_use]
    pub const fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_secs)
    }

    /// Bound applied to a yt-dlp run
    #[must_use]
    pub const fn ytdlp_timeout(&self) -> Duration {
        Duration::from_secs(self.ytdlp_timeout_secs)
    }
}

/// Login for the session-based Instagram client
#[derive(Clone)]
pub struct InstagramCredentials {
    /// Account name
    pub username: String,
    password: String,
}

impl InstagramCredentials {
    /// Bundle a username and password
    #[must_use]
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// The account password
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Keep the password out of `{:?}` output.
impl fmt::Debug for InstagramCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstagramCredentials")
            .field("username", &self.username)
            .field("password", &"[MASKED]")
            .finish()
    }
}
