//! Image generation provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for image providers,
//! allowing easy swapping between backends (Gemini, mock).

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// One generated image, with its transport encoding already stripped.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Raw encoded image bytes (typically PNG).
    pub bytes: Vec<u8>,

    /// MIME type reported by the provider.
    pub mime_type: String,
}

/// Trait for image generation providers (e.g., Gemini).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate a single image for the prompt.
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError>;
}
