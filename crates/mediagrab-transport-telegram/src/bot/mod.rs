/// Command and message handlers
pub mod handlers;
/// Reply channel bound to the originating Telegram message
pub mod replies;

pub use replies::TelegramReplies;
