//! Telegram image-generation bot.
//!
//! Receives text prompts over Telegram, forwards them to Google's Imagen
//! API, and replies with the generated picture re-encoded as a JPEG. A
//! minimal HTTP server exposes `GET /health` for the hosting platform's
//! liveness probes.

pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod services;
pub mod startup;
pub mod telegram;
