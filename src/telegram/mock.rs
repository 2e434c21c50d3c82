//! Recording bot implementation for testing.

use super::types::{BotCommand, Chat, Message, Update, User};
use super::{BotApi, TelegramError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One outbound call observed by the mock, in order.
#[derive(Debug, Clone)]
pub enum OutboundCall {
    Text {
        chat_id: i64,
        message_id: i64,
        text: String,
    },
    Deleted {
        chat_id: i64,
        message_id: i64,
    },
    Photo {
        chat_id: i64,
        message_id: i64,
        jpeg_bytes: Vec<u8>,
    },
}

/// Mock bot that records every outbound call and serves queued inbound
/// updates from `get_updates`.
#[derive(Default)]
pub struct MockBot {
    calls: Mutex<Vec<OutboundCall>>,
    pending: Mutex<VecDeque<Update>>,
    next_message_id: AtomicI64,
    fail_delete: AtomicBool,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an inbound update for the next get_updates call.
    pub fn queue_update(&self, update: Update) {
        self.pending.lock().unwrap().push_back(update);
    }

    /// Make every subsequent delete_message call fail.
    pub fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the outbound calls recorded so far.
    pub fn calls(&self) -> Vec<OutboundCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts sent so far, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                OutboundCall::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: OutboundCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_id(&self) -> i64 {
        self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Build an inbound text update shaped the way getUpdates delivers it.
pub fn text_update(update_id: i64, chat_id: i64, first_name: &str, text: Option<&str>) -> Update {
    Update {
        update_id,
        message: Some(Message {
            message_id: update_id + 1000,
            from: Some(User {
                id: chat_id,
                first_name: first_name.to_string(),
            }),
            chat: Chat { id: chat_id },
            text: text.map(|t| t.to_string()),
        }),
    }
}

#[async_trait]
impl BotApi for MockBot {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, TelegramError> {
        let message_id = self.next_id();
        self.record(OutboundCall::Text {
            chat_id,
            message_id,
            text: text.to_string(),
        });

        Ok(Message {
            message_id,
            from: None,
            chat: Chat { id: chat_id },
            text: Some(text.to_string()),
        })
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), TelegramError> {
        self.record(OutboundCall::Deleted {
            chat_id,
            message_id,
        });

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(TelegramError::Api(
                "deleteMessage: message to delete not found".to_string(),
            ));
        }
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, jpeg_bytes: Vec<u8>) -> Result<Message, TelegramError> {
        let message_id = self.next_id();
        self.record(OutboundCall::Photo {
            chat_id,
            message_id,
            jpeg_bytes,
        });

        Ok(Message {
            message_id,
            from: None,
            chat: Chat { id: chat_id },
            text: None,
        })
    }

    async fn set_my_commands(&self, _commands: &[BotCommand]) -> Result<(), TelegramError> {
        Ok(())
    }

    async fn get_updates(&self, _offset: i64, _timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        let drained: Vec<Update> = self.pending.lock().unwrap().drain(..).collect();
        if drained.is_empty() {
            // Simulate an empty long poll without busy-looping the caller
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        Ok(drained)
    }
}
