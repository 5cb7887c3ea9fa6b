use crate::bot::TelegramReplies;
use anyhow::Result;
use mediagrab_core::MediaPipeline;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;

/// Greeting sent on `/start`
pub const WELCOME_TEXT: &str = "Send a YouTube, Instagram, or Facebook link to download media.";

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Start the bot.")]
    Start,
    /// List commands
    #[command(description = "Show this help.")]
    Help,
}

/// Whether `text` looks like a bot command (recognized or not)
///
/// # Examples
///
/// ```
/// use mediagrab_transport_telegram::bot::handlers::is_command_text;
/// assert!(is_command_text("/unknown arg"));
/// assert!(!is_command_text("https://youtu.be/abc"));
/// ```
#[must_use]
pub fn is_command_text(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Start command handler
///
/// # Errors
///
/// Returns an error if the welcome message cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    info!("User {user_id} initiated /start command.");
    bot.send_message(msg.chat.id, WELCOME_TEXT).await?;
    Ok(())
}

/// Help command handler
///
/// # Errors
///
/// Returns an error if the help message cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Run a text message through the media pipeline, replying in its chat.
///
/// # Errors
///
/// Currently infallible; delivery failures are reported in the chat by the pipeline.
pub async fn handle_text(bot: Bot, msg: Message, pipeline: Arc<MediaPipeline>) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if is_command_text(text) {
        return Ok(());
    }

    let user_id = get_user_id_safe(&msg);
    let replies = TelegramReplies::for_message(bot, &msg);
    let summary = pipeline.handle_text(&replies, text).await;

    if summary.links > 0 {
        info!(
            user_id,
            links = summary.links,
            resolved = summary.resolved,
            delivered = summary.delivered,
            fallbacks = summary.fallbacks,
            "Message handled"
        );
    }
    Ok(())
}
