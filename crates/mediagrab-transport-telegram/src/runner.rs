use crate::bot;
use crate::bot::handlers::{is_command_text, Command};
use crate::config::BotSettings;
use mediagrab_core::MediaPipeline;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::{error, info};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let pipeline = Arc::new(MediaPipeline::standard(&settings.relay));
    info!(
        ytdlp = %settings.relay.ytdlp_path,
        instagram_login = settings.relay.instagram_credentials().is_some(),
        "Media pipeline initialized."
    );

    let bot = Bot::new(settings.telegram.bot_token.clone());
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pipeline])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(|t| !is_command_text(t)))
                .endpoint(handle_link_text),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg).await,
        Command::Help => bot::handlers::help(bot, msg).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_link_text(
    bot: Bot,
    msg: Message,
    pipeline: Arc<MediaPipeline>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_text(bot, msg, pipeline).await {
        error!("Text handler error: {}", e);
    }
    respond(())
}
