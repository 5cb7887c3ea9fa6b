use config::ConfigError;
use dotenvy::dotenv;
use mediagrab_core::config::RelaySettings;
use mediagrab_transport_telegram::config::{BotSettings, TelegramSettings};
use mediagrab_transport_telegram::runner::run_bot;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Redaction rules, applied in order
struct RedactionPatterns {
    rules: Vec<(Regex, &'static str)>,
}

impl RedactionPatterns {
    /// Compile the token and password rules
    ///
    /// `ig_password` is masked verbatim wherever it appears.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new(ig_password: Option<&str>) -> Result<Self, regex::Error> {
        let mut rules = vec![
            (
                Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)")?,
                "$1[TELEGRAM_TOKEN]$3",
            ),
            (
                Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
                "[TELEGRAM_TOKEN]",
            ),
            (
                Regex::new(r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+")?,
                "$1[TELEGRAM_TOKEN]",
            ),
            (
                Regex::new(r"IG_PASSWORD=[^\s&]+")?,
                "IG_PASSWORD=[MASKED]",
            ),
            (
                Regex::new(r"(#PWD_INSTAGRAM_BROWSER:[0-9]+:[0-9]+:)[^\s&]+")?,
                "$1[MASKED]",
            ),
        ];

        if let Some(password) = ig_password.filter(|p| !p.is_empty()) {
            rules.push((Regex::new(&regex::escape(password))?, "[MASKED]"));
        }

        Ok(Self { rules })
    }

    /// Rules masking the Instagram password from whichever source configured it
    fn for_relay(relay: Option<&RelaySettings>) -> Result<Self, regex::Error> {
        Self::new(relay.and_then(|r| r.ig_password.as_deref()))
    }

    fn redact(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |text, (pattern, replacement)| {
                pattern.replace_all(&text, *replacement).into_owned()
            })
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // Report the original length; the redacted text may differ in size.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), self.patterns.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    // Resolver settings load before logging so the configured password is masked
    let relay = RelaySettings::new();
    let patterns = Arc::new(
        RedactionPatterns::for_relay(relay.as_ref().ok()).map_err(|e| {
            eprintln!("Failed to compile regex patterns: {e}");
            e
        })?,
    );

    init_logging(patterns);

    info!("Starting Mediagrab TG Bot...");

    let settings = init_settings(relay);

    run_bot(settings).await;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let filter = if debug_mode {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "mediagrab_core=info,mediagrab_transport_telegram=info,hyper=warn,reqwest=warn,teloxide=warn",
            )
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings(relay: Result<RelaySettings, ConfigError>) -> Arc<BotSettings> {
    let relay_settings = match relay {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load resolver configuration: {}", e);
            std::process::exit(1);
        }
    };
    let telegram_settings = match TelegramSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load telegram configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration loaded successfully.");
    Arc::new(BotSettings::new(relay_settings, telegram_settings))
}

#[cfg(test)]
mod tests {
    use super::RedactionPatterns;
    use mediagrab_core::config::RelaySettings;

    #[test]
    fn test_redacts_bot_token_in_api_url() {
        let patterns = RedactionPatterns::new(None).expect("patterns compile");
        let line = "error sending request for url (https://api.telegram.org/bot123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw/SendVideo)";
        let redacted = patterns.redact(line);
        assert!(!redacted.contains("AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw"));
        assert!(redacted.contains("[TELEGRAM_TOKEN]"));
    }

    #[test]
    fn test_redacts_instagram_password() {
        let patterns = RedactionPatterns::new(Some("hunter2.!")).expect("patterns compile");

        let redacted = patterns.redact("login failed for someone with hunter2.!");
        assert!(!redacted.contains("hunter2"));

        let redacted = patterns.redact("IG_PASSWORD=abc123 other");
        assert_eq!(redacted, "IG_PASSWORD=[MASKED] other");

        let redacted = patterns.redact("enc_password=#PWD_INSTAGRAM_BROWSER:0:1700000000:pw&x=1");
        assert_eq!(
            redacted,
            "enc_password=#PWD_INSTAGRAM_BROWSER:0:1700000000:[MASKED]&x=1"
        );
    }

    #[test]
    fn test_redacts_password_from_loaded_settings() {
        let relay = RelaySettings {
            ig_username: Some("someone".to_string()),
            ig_password: Some("from-local-toml$1".to_string()),
            ..RelaySettings::default()
        };
        let patterns = RedactionPatterns::for_relay(Some(&relay)).expect("patterns compile");

        let redacted = patterns.redact("session for someone: from-local-toml$1 rejected");
        assert_eq!(redacted, "session for someone: [MASKED] rejected");

        let unconfigured = RedactionPatterns::for_relay(None).expect("patterns compile");
        assert_eq!(unconfigured.redact("plain line"), "plain line");
    }
}
