//! Mock provider implementation for testing.

use super::{GeneratedImage, ImageProvider, ProviderError};
use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock image provider for testing.
pub struct MockImageProvider {
    enabled: bool,
    generate_calls: AtomicUsize,
}

impl MockImageProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            generate_calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls observed so far.
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Deterministic 8x8 RGBA PNG, so callers exercise the alpha-channel
    /// normalization path.
    pub fn sample_png() -> Vec<u8> {
        let mut img = RgbaImage::new(8, 8);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgba([(x * 32) as u8, (y * 32) as u8, 128, 200]);
        }

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode sample png");
        buf.into_inner()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);

        if !self.enabled {
            return Err(ProviderError::ApiError(
                "simulated generation failure".to_string(),
            ));
        }

        // Simulate some processing
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Ok(GeneratedImage {
            bytes: Self::sample_png(),
            mime_type: "image/png".to_string(),
        })
    }
}
