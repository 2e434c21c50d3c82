//! Integration tests for the health endpoint and process lifecycle.
//!
//! Run with: cargo test --test health_check

use imagen_bot::config::{BotConfig, GeminiConfig, GenerationConfig, TelegramConfig};
use imagen_bot::services::providers::mock::MockImageProvider;
use imagen_bot::startup::{Application, Shutdown};
use imagen_bot::telegram::mock::MockBot;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> BotConfig {
    BotConfig {
        port: 0, // Random port
        telegram: TelegramConfig {
            token: "test-token".to_string(),
        },
        gemini: GeminiConfig {
            api_key: "test-api-key".to_string(),
            model: "imagen-3.0-generate-002".to_string(),
        },
        generation: GenerationConfig { timeout_secs: 5 },
    }
}

/// Spawn the application with mock adapters and return its port and
/// shutdown handle.
async fn spawn_app() -> (u16, Shutdown) {
    let bot = Arc::new(MockBot::new());
    let provider = Arc::new(MockImageProvider::new(true));

    let app = Application::build_with(test_config(), bot, provider)
        .await
        .expect("Failed to build application");
    let port = app.port();

    let shutdown = Shutdown::new();
    let run_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = app.run_until_stopped(run_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    (port, shutdown)
}

#[tokio::test]
async fn health_check_returns_plain_ok() {
    let (port, shutdown) = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("http://localhost:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body = response.text().await.expect("Failed to read body");
    assert_eq!(body, "OK");

    shutdown.trigger();
}

#[tokio::test]
async fn trigger_in_startup_window_is_not_lost() {
    let bot = Arc::new(MockBot::new());
    let provider = Arc::new(MockImageProvider::new(true));
    let app = Application::build_with(test_config(), bot, provider)
        .await
        .expect("Failed to build application");

    // Signal lands before run_until_stopped subscribes
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), app.run_until_stopped(shutdown)).await;
    assert!(result.is_ok(), "app must stop after a pre-run trigger");
}

#[tokio::test]
async fn repeated_shutdown_trigger_is_a_no_op() {
    let (port, shutdown) = spawn_app().await;

    shutdown.trigger();
    shutdown.trigger();
    shutdown.trigger();

    // Give the graceful shutdown time to release the listener
    tokio::time::sleep(Duration::from_millis(500)).await;

    let client = Client::new();
    let result = client
        .get(format!("http://localhost:{}/health", port))
        .timeout(Duration::from_secs(1))
        .send()
        .await;

    assert!(result.is_err(), "health listener should be closed");
}
