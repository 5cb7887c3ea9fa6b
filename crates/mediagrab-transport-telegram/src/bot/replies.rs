//! `ReplySink` over the Telegram Bot API.

use async_trait::async_trait;
use mediagrab_core::delivery::{DeliveryError, ReplySink};
use mediagrab_core::media::MediaReference;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, ReplyParameters};
use teloxide::RequestError;

/// Replies in the chat of one inbound message, quoting that message.
///
/// Videos and photos are sent by URL; Telegram fetches them itself.
#[derive(Clone)]
pub struct TelegramReplies {
    bot: Bot,
    chat_id: ChatId,
    reply_to: MessageId,
}

impl TelegramReplies {
    /// Bind to the chat and id of `msg`
    #[must_use]
    pub fn for_message(bot: Bot, msg: &Message) -> Self {
        Self {
            bot,
            chat_id: msg.chat.id,
            reply_to: msg.id,
        }
    }

    fn reply_parameters(&self) -> ReplyParameters {
        ReplyParameters::new(self.reply_to).allow_sending_without_reply()
    }
}

fn transport_error(e: RequestError) -> DeliveryError {
    DeliveryError::Transport(e.to_string())
}

#[async_trait]
impl ReplySink for TelegramReplies {
    async fn send_text(&self, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(self.chat_id, text)
            .reply_parameters(self.reply_parameters())
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    async fn send_video(&self, media: &MediaReference) -> Result<(), DeliveryError> {
        let url = media.parse_url()?;
        self.bot
            .send_video(self.chat_id, InputFile::url(url))
            .reply_parameters(self.reply_parameters())
            .await
            .map_err(transport_error)?;
        Ok(())
    }

    async fn send_photo(&self, media: &MediaReference) -> Result<(), DeliveryError> {
        let url = media.parse_url()?;
        self.bot
            .send_photo(self.chat_id, InputFile::url(url))
            .reply_parameters(self.reply_parameters())
            .await
            .map_err(transport_error)?;
        Ok(())
    }
}
