//! Telegram Bot API adapter.
//!
//! `BotApi` is the seam between the workflow and the wire: the real
//! client talks HTTP to api.telegram.org, the mock records calls for
//! tests.

pub mod api;
pub mod mock;
pub mod poller;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
use types::{BotCommand, Message, Update};

/// Error type for Bot API operations.
#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Outbound and polling surface of the Telegram Bot API.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Send a plain text message and return the message as created.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError>;

    /// Delete a message by id.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError>;

    /// Upload a JPEG as a photo reply.
    async fn send_photo(&self, chat_id: i64, jpeg_bytes: Vec<u8>) -> Result<Message, TelegramError>;

    /// Register the bot's command menu.
    async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError>;

    /// Long-poll for new updates starting at `offset`.
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError>;
}
