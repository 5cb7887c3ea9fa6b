//! Per-platform fallback chains of media providers.

use crate::config::RelaySettings;
use crate::media::MediaReference;
use crate::platform::Platform;
use crate::provider::{MediaProvider, ProviderOutcome};
use crate::providers::{
    AjaxMirrorProvider, FdownProvider, InstagramSessionProvider, YtdlpProvider,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ordered provider chains keyed by platform.
///
/// The first provider that finds media wins; later ones are not called.
/// A platform without a chain always resolves to nothing.
#[derive(Default, Clone)]
pub struct Resolver {
    chains: HashMap<Platform, Vec<Arc<dyn MediaProvider>>>,
}

impl Resolver {
    /// A resolver with no chains
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chain for `platform`
    #[must_use]
    pub fn with_chain(
        mut self,
        platform: Platform,
        providers: Vec<Arc<dyn MediaProvider>>,
    ) -> Self {
        self.chains.insert(platform, providers);
        self
    }

    /// The production chains:
    ///
    /// - youtube: yt-dlp
    /// - instagram: yt-dlp, saveig, snapinsta, Instagram session
    /// - facebook: yt-dlp, fdown
    #[must_use]
    pub fn standard(settings: &RelaySettings) -> Self {
        let ytdlp: Arc<dyn MediaProvider> = Arc::new(YtdlpProvider::new(
            settings.ytdlp_path.clone(),
            settings.ytdlp_timeout(),
        ));
        let scrape_timeout = settings.scrape_timeout();

        Self::new()
            .with_chain(Platform::Youtube, vec![ytdlp.clone()])
            .with_chain(
                Platform::Instagram,
                vec![
                    ytdlp.clone(),
                    Arc::new(AjaxMirrorProvider::saveig(scrape_timeout)),
                    Arc::new(AjaxMirrorProvider::snapinsta(scrape_timeout)),
                    Arc::new(InstagramSessionProvider::new(
                        settings.instagram_credentials(),
                        scrape_timeout,
                    )),
                ],
            )
            .with_chain(
                Platform::Facebook,
                vec![ytdlp, Arc::new(FdownProvider::new(scrape_timeout))],
            )
    }

    /// Providers tried for `platform`, in order
    #[must_use]
    pub fn chain(&self, platform: Platform) -> &[Arc<dyn MediaProvider>] {
        self.chains
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Run the chain for `platform` until a provider finds media.
    ///
    /// Returns an empty list when every provider came back empty or failed.
    #[instrument(skip(self))]
    pub async fn resolve(&self, platform: Platform, url: &str) -> Vec<MediaReference> {
        for provider in self.chain(platform) {
            match provider.resolve(url).await {
                ProviderOutcome::Found(media) => {
                    info!(provider = provider.name(), count = media.len(), "Media resolved");
                    return media;
                }
                ProviderOutcome::Empty => {
                    debug!(provider = provider.name(), "Provider returned nothing");
                }
                ProviderOutcome::Failed(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        transient = e.is_transient(),
                        "Provider failed, trying next"
                    );
                }
            }
        }

        info!("All providers exhausted");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockMediaProvider, ProviderError};
    use mockall::Sequence;

    fn refs(urls: &[&str]) -> Vec<MediaReference> {
        urls.iter().filter_map(|u| MediaReference::new(*u)).collect()
    }

    fn never_called(name: &'static str) -> Arc<dyn MediaProvider> {
        let mut mock = MockMediaProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_resolve().times(0);
        Arc::new(mock)
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let mut first = MockMediaProvider::new();
        first.expect_name().return_const("generic");
        first
            .expect_resolve()
            .times(1)
            .returning(|_| ProviderOutcome::Found(refs(&["a.mp4"])));

        let resolver = Resolver::new().with_chain(
            Platform::Instagram,
            vec![
                Arc::new(first),
                never_called("mirror_a"),
                never_called("mirror_b"),
                never_called("session"),
            ],
        );

        let media = resolver
            .resolve(Platform::Instagram, "https://www.instagram.com/p/abc/")
            .await;
        assert_eq!(media, refs(&["a.mp4"]));
    }

    #[tokio::test]
    async fn test_falls_through_in_order() {
        let mut seq = Sequence::new();
        let outcomes: Vec<fn() -> ProviderOutcome> = vec![
            || ProviderOutcome::Empty,
            || ProviderOutcome::Failed(ProviderError::Status(503)),
            || ProviderOutcome::Empty,
            || ProviderOutcome::Found(refs(&["b.jpg"])),
        ];

        let mut chain: Vec<Arc<dyn MediaProvider>> = Vec::new();
        for outcome in outcomes {
            let mut mock = MockMediaProvider::new();
            mock.expect_name().return_const("mock");
            mock.expect_resolve()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| outcome());
            chain.push(Arc::new(mock));
        }

        let resolver = Resolver::new().with_chain(Platform::Instagram, chain);
        let media = resolver
            .resolve(Platform::Instagram, "https://www.instagram.com/p/abc/")
            .await;
        assert_eq!(media, refs(&["b.jpg"]));
    }

    #[tokio::test]
    async fn test_all_empty_yields_nothing() {
        let mut only = MockMediaProvider::new();
        only.expect_name().return_const("generic");
        only.expect_resolve()
            .times(1)
            .returning(|_| ProviderOutcome::Empty);

        let resolver = Resolver::new().with_chain(Platform::Youtube, vec![Arc::new(only)]);
        assert!(resolver
            .resolve(Platform::Youtube, "https://youtu.be/abc")
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_platform_without_chain() {
        let resolver = Resolver::new();
        assert!(resolver.chain(Platform::Unknown).is_empty());
        assert!(resolver
            .resolve(Platform::Unknown, "https://example.com/x")
            .await
            .is_empty());
    }

    #[test]
    fn test_standard_chain_order() {
        let resolver = Resolver::standard(&RelaySettings::default());

        let names = |platform: Platform| -> Vec<&'static str> {
            resolver.chain(platform).iter().map(|p| p.name()).collect()
        };

        assert_eq!(names(Platform::Youtube), vec!["yt_dlp"]);
        assert_eq!(
            names(Platform::Instagram),
            vec!["yt_dlp", "saveig", "snapinsta", "instagram_session"]
        );
        assert_eq!(names(Platform::Facebook), vec!["yt_dlp", "fdown"]);
        assert!(names(Platform::Unknown).is_empty());
    }
}
