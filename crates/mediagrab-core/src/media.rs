//! Resolved media references and the video/photo heuristic.

use crate::delivery::DeliveryError;
use std::fmt;

/// Suffixes that mark a direct video file
const VIDEO_SUFFIXES: &[&str] = &[".mp4"];

/// Hosts that only ever serve video streams
const STREAMING_HOST_MARKERS: &[&str] = &["googlevideo.com"];

/// A direct URL to a video or image asset.
///
/// Carries no metadata; the media kind is guessed from the URL on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaReference(String);

impl MediaReference {
    /// Wrap a URL, rejecting blank strings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            None
        } else {
            Some(Self(url))
        }
    }

    /// The raw URL
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Video or photo, by suffix and host heuristic
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        MediaKind::classify(&self.0)
    }

    /// Parse into a URL suitable for upload-by-URL requests.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::InvalidUrl` if the reference is not an absolute URL.
    pub fn parse_url(&self) -> Result<reqwest::Url, DeliveryError> {
        reqwest::Url::parse(&self.0)
            .map_err(|e| DeliveryError::InvalidUrl(format!("{}: {e}", self.0)))
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MediaReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a reference is delivered to the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Sent with the video primitive
    Video,
    /// Sent with the photo primitive
    Photo,
}

impl MediaKind {
    /// `Video` for known video suffixes or streaming hosts, `Photo` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediagrab_core::media::MediaKind;
    ///
    /// assert_eq!(MediaKind::classify("https://cdn.example/clip.mp4"), MediaKind::Video);
    /// assert_eq!(MediaKind::classify("https://cdn.example/pic.jpg"), MediaKind::Photo);
    /// ```
    #[must_use]
    pub fn classify(url: &str) -> Self {
        let is_video = VIDEO_SUFFIXES.iter().any(|s| url.ends_with(s))
            || STREAMING_HOST_MARKERS.iter().any(|h| url.contains(h));

        if is_video {
            Self::Video
        } else {
            Self::Photo
        }
    }
}
