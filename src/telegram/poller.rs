//! getUpdates long-poll loop and dispatch.

use super::api::LONG_POLL_TIMEOUT_SECS;
use super::types::BotCommand;
use crate::handlers;
use crate::startup::AppState;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Pause before retrying after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Resolve once the shutdown signal has fired. Owns its receiver and
/// drops the watch read guard internally, keeping any future composed
/// from this one Send.
async fn wait_for_stop(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|&stopped| stopped).await;
}

/// Long-poll loop: pulls updates and dispatches each one on its own
/// task, so overlapping prompts from any chat make progress
/// independently.
pub struct UpdatePoller {
    state: AppState,
}

impl UpdatePoller {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Poll until the shutdown signal fires, then drain in-flight
    /// handlers, tolerating their individual failures.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        self.register_commands().await;

        let mut offset: i64 = 0;
        let mut tasks: JoinSet<()> = JoinSet::new();

        loop {
            let updates = tokio::select! {
                _ = wait_for_stop(shutdown.clone()) => break,
                result = self.state.bot.get_updates(offset, LONG_POLL_TIMEOUT_SECS) => match result {
                    Ok(updates) => updates,
                    Err(e) => {
                        tracing::warn!("getUpdates failed: {}", e);
                        tokio::select! {
                            _ = wait_for_stop(shutdown.clone()) => break,
                            _ = tokio::time::sleep(POLL_RETRY_DELAY) => continue,
                        }
                    }
                },
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let state = self.state.clone();
                tasks.spawn(async move {
                    handlers::handle_update(&state, update).await;
                });
            }
        }

        tracing::info!(
            in_flight = tasks.len(),
            "Update polling stopped, draining in-flight handlers"
        );
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Handler task failed during drain: {}", e);
            }
        }
    }

    /// Register the bot's command menu. A failure here is logged and
    /// otherwise ignored; the bot still answers the commands.
    async fn register_commands(&self) {
        let commands = [
            BotCommand {
                command: "start".to_string(),
                description: "Start the bot".to_string(),
            },
            BotCommand {
                command: "help".to_string(),
                description: "Get help and tips".to_string(),
            },
        ];

        match self.state.bot.set_my_commands(&commands).await {
            Ok(()) => tracing::info!("Bot command menu registered"),
            Err(e) => tracing::warn!("Failed to register bot command menu: {}", e),
        }
    }
}
