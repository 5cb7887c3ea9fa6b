//! YT-DLP Provider - generic media-info extraction
//!
//! Runs yt-dlp as a child process in metadata-only mode and reads the direct
//! media URL(s) from its JSON dump. This is the first provider in every chain.

use crate::media::MediaReference;
use crate::provider::{collect_references, MediaProvider, ProviderError, ProviderOutcome};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Patterns indicating the content can never be resolved by yt-dlp
const FATAL_ERROR_PATTERNS: &[&str] = &[
    "Unsupported URL",
    "is not a valid URL",
    "Video unavailable",
    "Private video",
    "This video is private",
    "This video is not available",
    "Sign in to confirm your age",
    "age-restricted",
    "members-only",
    "removed by the uploader",
    "This video has been removed",
    "no longer available",
    "blocked it in your country",
    "geo-restricted",
    "copyright claim",
    "terminated account",
    "Requested format is not available",
    "HTTP Error 403",
    "HTTP Error 404",
    "There is no video in this post",
];

/// Patterns indicating transient errors
const RETRYABLE_ERROR_PATTERNS: &[&str] = &[
    "Connection reset",
    "Connection timed out",
    "Unable to download webpage",
    "HTTP Error 429",
    "HTTP Error 503",
    "Read timed out",
    "network is unreachable",
    "Temporary failure in name resolution",
];

/// Map a failed run's stderr to a provider error.
#[must_use]
pub fn classify_ytdlp_failure(stderr: &str) -> ProviderError {
    let message = stderr
        .lines()
        .rev()
        .find(|line| line.contains("ERROR"))
        .or_else(|| stderr.lines().rev().find(|line| !line.trim().is_empty()))
        .unwrap_or("yt-dlp exited with an error")
        .trim()
        .to_string();

    if RETRYABLE_ERROR_PATTERNS.iter().any(|p| stderr.contains(p)) {
        ProviderError::Extractor(message)
    } else if FATAL_ERROR_PATTERNS.iter().any(|p| stderr.contains(p)) {
        ProviderError::Unsupported(message)
    } else {
        ProviderError::Extractor(message)
    }
}

#[derive(Debug, Deserialize)]
struct YtdlpInfo {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    entries: Option<Vec<Option<YtdlpInfo>>>,
}

/// Read direct URLs from a `--dump-single-json` document.
///
/// A playlist yields each entry's `url`; a single item yields its own `url`.
/// Entries without a direct URL are dropped.
///
/// # Errors
///
/// Returns `ProviderError::Parse` if `json` is not a yt-dlp info document.
pub fn parse_ytdlp_json(json: &str) -> Result<Vec<MediaReference>, ProviderError> {
    let info: YtdlpInfo = serde_json::from_str(json)?;

    let media = match info.entries {
        Some(entries) => collect_references(entries.into_iter().map(|e| e.and_then(|e| e.url))),
        None => collect_references([info.url]),
    };
    Ok(media)
}

/// Provider that shells out to yt-dlp
pub struct YtdlpProvider {
    binary: String,
    timeout: Duration,
}

impl YtdlpProvider {
    /// Create a new provider running `binary` with a per-run `timeout`
    #[must_use]
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Execute yt-dlp and return stdout
    async fn exec_ytdlp(&self, url: &str) -> Result<String, ProviderError> {
        let mut cmd = Command::new(&self.binary);
        cmd.args([
            "--dump-single-json",
            "--skip-download",
            "--no-warnings",
            "--format",
            "best",
            "--",
            url,
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        debug!(binary = %self.binary, url = %url, "Executing yt-dlp");

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ProviderError::Unavailable(format!(
                    "{} not found",
                    self.binary
                )));
            }
            Ok(Err(e)) => return Err(ProviderError::Unavailable(e.to_string())),
            Err(_) => return Err(ProviderError::Timeout),
        };

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(classify_ytdlp_failure(&String::from_utf8_lossy(
                &output.stderr,
            )))
        }
    }

    async fn extract(&self, url: &str) -> Result<Vec<MediaReference>, ProviderError> {
        let stdout = self.exec_ytdlp(url).await?;
        parse_ytdlp_json(&stdout)
    }
}

#[async_trait]
impl MediaProvider for YtdlpProvider {
    fn name(&self) -> &'static str {
        "yt_dlp"
    }

    async fn resolve(&self, url: &str) -> ProviderOutcome {
        let result = self.extract(url).await;
        if let Err(ref e) = result {
            warn!(
                provider = "yt_dlp",
                error = %e,
                transient = e.is_transient(),
                "yt-dlp extraction failed"
            );
        }
        ProviderOutcome::from_result(result)
    }
}
