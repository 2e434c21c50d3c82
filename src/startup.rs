//! Application startup and lifecycle management.
//!
//! Wires the Telegram long-poll loop and the health-check HTTP server
//! into one process, and tears both down on the shutdown signal.

use crate::config::BotConfig;
use crate::error::AppError;
use crate::services::providers::gemini::GeminiImageProvider;
use crate::services::providers::ImageProvider;
use crate::telegram::api::TelegramApi;
use crate::telegram::poller::UpdatePoller;
use crate::telegram::BotApi;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Shared application state: the two reentrant-safe adapter handles
/// every dispatched update borrows.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<dyn BotApi>,
    pub provider: Arc<dyn ImageProvider>,
}

/// Once-only shutdown trigger fanning out over a watch channel.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    triggered: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fire the shutdown signal. Subsequent calls are no-ops, so a
    /// repeated SIGINT/SIGTERM cannot re-enter the stop sequence.
    /// `send_replace` updates the channel value even with no receiver
    /// subscribed yet, so a trigger in the startup window still stops
    /// the app once it begins waiting.
    pub fn trigger(&self) {
        if self.triggered.swap(true, Ordering::SeqCst) {
            tracing::debug!("Shutdown already in progress, ignoring repeated signal");
            return;
        }
        self.tx.send_replace(true);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Liveness probe for the hosting platform. Fixed body: this reflects
/// process liveness only, not messaging-client health.
async fn health_check() -> &'static str {
    "OK"
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build with the real Telegram and Gemini adapters.
    pub async fn build(config: BotConfig) -> Result<Self, AppError> {
        let bot: Arc<dyn BotApi> = Arc::new(TelegramApi::new(config.telegram.token.clone()));
        let provider: Arc<dyn ImageProvider> = Arc::new(GeminiImageProvider::new(
            config.gemini.clone(),
            Duration::from_secs(config.generation.timeout_secs),
        ));

        tracing::info!(
            model = %config.gemini.model,
            "Initialized Gemini image provider"
        );

        Self::build_with(config, bot, provider).await
    }

    /// Build with injected adapters (used by the integration tests).
    pub async fn build_with(
        config: BotConfig,
        bot: Arc<dyn BotApi>,
        provider: Arc<dyn ImageProvider>,
    ) -> Result<Self, AppError> {
        // Bind the health listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind health listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Health endpoint listening on port {}", port);

        let state = AppState { bot, provider };

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Port the health server is listening on (useful with port 0).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the health server and the update poller until `shutdown`
    /// fires, then wait for both to stop.
    pub async fn run_until_stopped(self, shutdown: Shutdown) -> std::io::Result<()> {
        let router = Router::new().route("/health", get(health_check));

        let mut http_shutdown = shutdown.subscribe();
        let listener = self.listener;
        let http_server = async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = http_shutdown.wait_for(|&stopped| stopped).await;
                })
                .await
        };

        let poller = UpdatePoller::new(self.state).run(shutdown.subscribe());

        let (http_result, ()) = tokio::join!(http_server, poller);
        if let Err(e) = http_result {
            tracing::error!("Health server error: {}", e);
            return Err(std::io::Error::other(format!("Health server error: {}", e)));
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
