//! Delivery of resolved media to the chat
//!
//! The reply channel is abstracted behind [`ReplySink`] so the dispatcher does
//! not depend on any bot framework.

use crate::media::{MediaKind, MediaReference};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors returned by a reply channel
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The media reference is not a usable URL
    #[error("Invalid media URL: {0}")]
    InvalidUrl(String),
    /// The messaging transport rejected or failed the request
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Reply primitives on the originating chat
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Send a plain text message
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError>;

    /// Send a video by URL
    async fn send_video(&self, media: &MediaReference) -> Result<(), DeliveryError>;

    /// Send a photo by URL
    async fn send_photo(&self, media: &MediaReference) -> Result<(), DeliveryError>;
}

/// Text sent instead of a media item that could not be delivered
#[must_use]
pub fn send_failed_message(media: &MediaReference) -> String {
    format!("⚠️ Failed to send media. Try downloading:\n{media}")
}

/// Counters for one `deliver_all` run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Items sent as video or photo
    pub delivered: usize,
    /// Items replaced by a fallback text
    pub fallbacks: usize,
}

/// Send every item in order as video or photo.
///
/// A failed send is logged and replaced by a text carrying the raw URL;
/// later items are still sent.
pub async fn deliver_all(sink: &dyn ReplySink, media: &[MediaReference]) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for item in media {
        let kind = item.kind();
        debug!(url = %item, ?kind, "Sending media");

        let sent = match kind {
            MediaKind::Video => sink.send_video(item).await,
            MediaKind::Photo => sink.send_photo(item).await,
        };

        match sent {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!(url = %item, error = %e, "Failed to send media, sending link instead");
                report.fallbacks += 1;
                if let Err(e) = sink.send_text(&send_failed_message(item)).await {
                    error!(url = %item, error = %e, "Failed to send fallback link");
                }
            }
        }
    }

    report
}
