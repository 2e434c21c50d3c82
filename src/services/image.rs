//! Image payload normalization.
//!
//! Generated images arrive in whatever encoding the provider chose,
//! often PNG with an alpha channel. Telegram photo uploads want a plain
//! JPEG, so everything is flattened to 8-bit RGB before re-encoding.

use image::DynamicImage;
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(image::ImageError),
}

/// Decode `bytes`, normalize to three-channel RGB, re-encode as JPEG.
/// Dimensions are preserved.
pub fn to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(ImageError::Decode)?;

    // JPEG carries no alpha channel
    let rgb = match decoded {
        DynamicImage::ImageRgb8(_) => decoded,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, image::ImageFormat::Jpeg)
        .map_err(ImageError::Encode)?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn rgba_png(width: u32, height: u32) -> Vec<u8> {
        let mut img = RgbaImage::new(width, height);
        for px in img.pixels_mut() {
            *px = Rgba([10, 20, 30, 128]);
        }
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn rgba_png_becomes_rgb_jpeg_with_same_dimensions() {
        let jpeg = to_jpeg(&rgba_png(12, 7)).unwrap();

        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }

    #[test]
    fn undecodable_bytes_fail_with_decode_error() {
        let result = to_jpeg(b"definitely not an image");
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }
}
