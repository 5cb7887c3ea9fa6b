//! Telegram transport settings.

use config::ConfigError;
use mediagrab_core::config::RelaySettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Telegram transport settings loaded from environment variables.
#[derive(Deserialize, Serialize, Clone, Default)]
pub struct TelegramSettings {
    /// Telegram Bot API token (`BOT_TOKEN`).
    pub bot_token: String,
}

impl fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &"[TELEGRAM_TOKEN]")
            .finish()
    }
}

impl TelegramSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or `BOT_TOKEN` is missing or empty.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = mediagrab_core::config::build_config()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot_token.trim().is_empty() {
            return Err(ConfigError::NotFound("bot_token".to_string()));
        }
        Ok(())
    }
}

/// Combined settings used by the Telegram transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Resolver settings shared across transport handlers.
    pub relay: Arc<RelaySettings>,
    /// Telegram-specific settings.
    pub telegram: Arc<TelegramSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(relay: RelaySettings, telegram: TelegramSettings) -> Self {
        Self {
            relay: Arc::new(relay),
            telegram: Arc::new(telegram),
        }
    }
}
