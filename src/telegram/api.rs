//! reqwest-backed Telegram Bot API client.

use super::types::{ApiResponse, BotCommand, Message, Update};
use super::{BotApi, TelegramError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout passed to getUpdates.
pub const LONG_POLL_TIMEOUT_SECS: u64 = 30;

/// Telegram Bot API client.
pub struct TelegramApi {
    token: String,
    client: Client,
}

impl TelegramApi {
    pub fn new(token: String) -> Self {
        // The client timeout must outlast the getUpdates long poll.
        let client = Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_TIMEOUT_SECS + 30))
            .build()
            .expect("Failed to create HTTP client");

        Self { token, client }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_API_BASE, self.token, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, TelegramError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| TelegramError::Network(e.to_string()))?;

        Self::unwrap_envelope(method, response).await
    }

    async fn unwrap_envelope<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, TelegramError> {
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| TelegramError::MalformedResponse(format!("{}: {}", method, e)))?;

        if !envelope.ok {
            return Err(TelegramError::Api(format!(
                "{}: {}",
                method,
                envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_string())
            )));
        }

        envelope.result.ok_or_else(|| {
            TelegramError::MalformedResponse(format!("{}: ok response without result", method))
        })
    }
}

#[async_trait]
impl BotApi for TelegramApi {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        self.call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        // deleteMessage returns a bare boolean result
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, jpeg_bytes: Vec<u8>) -> Result<Message, TelegramError> {
        let photo = Part::bytes(jpeg_bytes)
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| TelegramError::Api(format!("sendPhoto: {}", e)))?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", photo);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TelegramError::Network(e.to_string()))?;

        Self::unwrap_envelope("sendPhoto", response).await
    }

    async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError> {
        let _: bool = self
            .call("setMyCommands", json!({ "commands": commands }))
            .await?;
        Ok(())
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message"]
            }),
        )
        .await
    }
}
