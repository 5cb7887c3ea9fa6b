//! Source platform detection by URL substring.

use std::fmt;

const YOUTUBE_MARKERS: &[&str] = &["youtube.com", "youtu.be"];
const INSTAGRAM_MARKERS: &[&str] = &["instagram.com"];
const FACEBOOK_MARKERS: &[&str] = &["facebook.com"];

/// Platform a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// youtube.com / youtu.be
    Youtube,
    /// instagram.com
    Instagram,
    /// facebook.com
    Facebook,
    /// Anything else
    Unknown,
}

impl Platform {
    /// Classify a URL. First match wins: youtube, then instagram, then facebook.
    ///
    /// # Examples
    ///
    /// ```
    /// use mediagrab_core::platform::Platform;
    ///
    /// assert_eq!(Platform::classify("https://youtu.be/dQw4w9WgXcQ"), Platform::Youtube);
    /// assert_eq!(Platform::classify("https://example.com/video.mp4"), Platform::Unknown);
    /// ```
    #[must_use]
    pub fn classify(url: &str) -> Self {
        let contains_any = |markers: &[&str]| markers.iter().any(|m| url.contains(m));

        if contains_any(YOUTUBE_MARKERS) {
            Self::Youtube
        } else if contains_any(INSTAGRAM_MARKERS) {
            Self::Instagram
        } else if contains_any(FACEBOOK_MARKERS) {
            Self::Facebook
        } else {
            Self::Unknown
        }
    }

    /// Lowercase tag, e.g. `youtube`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Unknown => "unknown",
        }
    }

    /// Capitalized name for user-facing text, e.g. `Youtube`
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Youtube => "Youtube",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
