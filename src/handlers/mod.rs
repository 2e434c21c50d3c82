//! Inbound update handling: command replies and the prompt workflow.

use crate::services::image::{self, ImageError};
use crate::services::providers::ProviderError;
use crate::startup::AppState;
use crate::telegram::types::{Message, Update};
use crate::telegram::TelegramError;
use thiserror::Error;

const GENERATING_NOTICE: &str = "🎨 Generating your image, please wait...";

const FAILURE_NOTICE: &str = "😥 Sorry, something went wrong. The prompt may have been \
    rejected or the service is busy. Try a different prompt.";

fn welcome_text(first_name: &str) -> String {
    format!(
        "👋 Hi {}!\n\nI'm an image generation bot. Just send me a text description, \
         and I'll create an image for you.",
        first_name
    )
}

const HELP_TEXT: &str = "Here's how to use me:\n\n\
    1. Simply type a description of the image you want to create.\n\
    2. I will generate it and send it back to you.\n\n\
    Tips for good prompts:\n\
    ✅ Be descriptive!\n\
    ✅ Include styles (e.g., 'in the style of Van Gogh').\n\
    ✅ Mention lighting or mood (e.g., 'dramatic lighting').";

/// Route one inbound update. Never fails: every error is contained and
/// logged here so the poll loop stays alive.
pub async fn handle_update(state: &AppState, update: Update) {
    let Some(message) = update.message else { return };

    match message.text.as_deref() {
        // Empty or absent text: silently ignored
        None | Some("") => {}
        Some(text) if text.starts_with('/') => handle_command(state, &message, text).await,
        Some(text) => handle_prompt(state, message.chat.id, text).await,
    }
}

async fn handle_command(state: &AppState, message: &Message, text: &str) {
    let command = text.split_whitespace().next().unwrap_or(text);
    // Strip the @botname suffix used in group chats
    let command = command.split('@').next().unwrap_or(command);

    match command {
        "/start" => {
            let first_name = message
                .from
                .as_ref()
                .map(|user| user.first_name.as_str())
                .unwrap_or("there");
            if let Err(e) = state
                .bot
                .send_message(message.chat.id, &welcome_text(first_name))
                .await
            {
                tracing::error!(chat_id = message.chat.id, "Failed to send welcome: {}", e);
            }
        }
        "/help" => {
            if let Err(e) = state.bot.send_message(message.chat.id, HELP_TEXT).await {
                tracing::error!(chat_id = message.chat.id, "Failed to send help: {}", e);
            }
        }
        other => {
            tracing::debug!(command = other, "Ignoring unknown command");
        }
    }
}

/// The prompt workflow: status notice, generation, JPEG normalization,
/// photo reply. The status notice is deleted exactly once on every path
/// that created it.
async fn handle_prompt(state: &AppState, chat_id: i64, prompt: &str) {
    tracing::info!(chat_id, prompt, "Received prompt");

    // Acquire the status notice. All fallible work below runs to a
    // Result before the single release at the bottom.
    let notice = match state.bot.send_message(chat_id, GENERATING_NOTICE).await {
        Ok(notice) => notice,
        Err(e) => {
            tracing::error!(chat_id, "Failed to send status notice: {}", e);
            return;
        }
    };

    if let Err(e) = generate_and_reply(state, chat_id, prompt).await {
        tracing::error!(chat_id, "Prompt handling failed: {}", e);
        if let Err(e) = state.bot.send_message(chat_id, FAILURE_NOTICE).await {
            tracing::error!(chat_id, "Failed to send failure notice: {}", e);
        }
    }

    // Release. The notice may already be gone (deleted by an admin or a
    // race); that is logged but not surfaced to the user.
    if let Err(e) = state
        .bot
        .delete_message(chat_id, notice.message_id)
        .await
    {
        tracing::warn!(
            chat_id,
            message_id = notice.message_id,
            "Failed to delete status notice: {}",
            e
        );
    }
}

#[derive(Debug, Error)]
enum PromptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Telegram(#[from] TelegramError),
}

async fn generate_and_reply(state: &AppState, chat_id: i64, prompt: &str) -> Result<(), PromptError> {
    let generated = state.provider.generate(prompt).await?;
    let jpeg = image::to_jpeg(&generated.bytes)?;
    state.bot.send_photo(chat_id, jpeg).await?;
    Ok(())
}
