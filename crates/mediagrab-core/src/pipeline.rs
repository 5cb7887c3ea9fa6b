//! Per-message flow: extract links, resolve each one, reply.

use crate::config::{RelaySettings, MANUAL_DOWNLOAD_BASE};
use crate::delivery::{deliver_all, ReplySink};
use crate::links::extract_links;
use crate::platform::Platform;
use crate::resolver::Resolver;
use tracing::{debug, info, instrument, warn};

/// Counters for one handled message
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MessageSummary {
    /// Links found in the text
    pub links: usize,
    /// Links for which some provider returned media
    pub resolved: usize,
    /// Media items sent as video or photo
    pub delivered: usize,
    /// Fallback texts sent (manual-download hints and failed-send links)
    pub fallbacks: usize,
}

/// Progress note sent before a link is resolved
#[must_use]
pub fn fetching_message(platform: Platform) -> String {
    format!("🔍 Fetching media from {platform}...")
}

/// Text sent when no provider could resolve `url`
///
/// # Examples
///
/// ```
/// use mediagrab_core::pipeline::not_found_message;
/// use mediagrab_core::platform::Platform;
///
/// let text = not_found_message(Platform::Youtube, "https://youtu.be/x");
/// assert!(text.starts_with("❌ Could not fetch media from Youtube."));
/// assert!(text.ends_with("https://www.hitube.io/en?url=https://youtu.be/x"));
/// ```
#[must_use]
pub fn not_found_message(platform: Platform, url: &str) -> String {
    format!(
        "❌ Could not fetch media from {}.\n🔗 Try manually: {MANUAL_DOWNLOAD_BASE}{url}",
        platform.title()
    )
}

/// Framework-independent message handler
#[derive(Clone)]
pub struct MediaPipeline {
    resolver: Resolver,
}

impl MediaPipeline {
    /// Wrap a resolver
    #[must_use]
    pub const fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Pipeline over the production provider chains
    #[must_use]
    pub fn standard(settings: &RelaySettings) -> Self {
        Self::new(Resolver::standard(settings))
    }

    /// Handle one inbound text.
    ///
    /// Links are processed one after another in the order they appear.
    /// Nothing is sent when the text contains no link.
    #[instrument(skip_all)]
    pub async fn handle_text(&self, sink: &dyn ReplySink, text: &str) -> MessageSummary {
        let links = extract_links(text);
        let mut summary = MessageSummary {
            links: links.len(),
            ..MessageSummary::default()
        };

        if links.is_empty() {
            debug!("No links in message");
            return summary;
        }

        for url in links {
            let platform = Platform::classify(url);
            info!(%platform, url = %url, "Processing link");

            if let Err(e) = sink.send_text(&fetching_message(platform)).await {
                warn!(url = %url, error = %e, "Failed to send status message");
            }

            let media = self.resolver.resolve(platform, url).await;
            if media.is_empty() {
                summary.fallbacks += 1;
                if let Err(e) = sink.send_text(&not_found_message(platform, url)).await {
                    warn!(url = %url, error = %e, "Failed to send manual download hint");
                }
                continue;
            }

            summary.resolved += 1;
            let report = deliver_all(sink, &media).await;
            summary.delivered += report.delivered;
            summary.fallbacks += report.fallbacks;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::MockReplySink;

    #[tokio::test]
    async fn test_no_links_sends_nothing() {
        let mut sink = MockReplySink::new();
        sink.expect_send_text().times(0);
        sink.expect_send_video().times(0);
        sink.expect_send_photo().times(0);

        let pipeline = MediaPipeline::new(Resolver::new());
        let summary = pipeline.handle_text(&sink, "hello there, no links").await;
        assert_eq!(summary, MessageSummary::default());
    }

    #[tokio::test]
    async fn test_unknown_platform_gets_hint() {
        let mut sink = MockReplySink::new();
        sink.expect_send_text()
            .withf(|t| t.starts_with("🔍"))
            .times(1)
            .returning(|_| Ok(()));
        sink.expect_send_text()
            .withf(|t| t.contains("Try manually: https://www.hitube.io/en?url=https://example.com/a"))
            .times(1)
            .returning(|_| Ok(()));

        let pipeline = MediaPipeline::new(Resolver::new());
        let summary = pipeline
            .handle_text(&sink, "look https://example.com/a")
            .await;
        assert_eq!(summary.links, 1);
        assert_eq!(summary.resolved, 0);
        assert_eq!(summary.fallbacks, 1);
    }

    #[test]
    fn test_fetching_message_uses_lowercase_platform() {
        assert_eq!(
            fetching_message(Platform::Instagram),
            "🔍 Fetching media from instagram..."
        );
    }
}
