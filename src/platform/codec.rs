//! Image codec adapter built on the `image` crate.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat, ImageReader};
use thiserror::Error;

use super::ImageCodec;

/// Errors raised while decoding or encoding images
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// [`ImageCodec`] producing JPEG thumbnails
#[derive(Debug, Clone, Copy)]
pub struct ImageCrateCodec {
    filter: FilterType,
}

impl Default for ImageCrateCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl ImageCodec for ImageCrateCodec {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), CodecError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode(e.to_string()))?
            .into_dimensions()
            .map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn thumbnail(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CodecError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;

        let resized = image.resize_exact(width.max(1), height.max(1), self.filter);

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut encoded = Cursor::new(Vec::new());
        rgb.write_to(&mut encoded, ImageFormat::Jpeg)
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        Ok(encoded.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn test_dimensions() {
        let codec = ImageCrateCodec::new();
        assert_eq!(codec.dimensions(&png_bytes(64, 48)).unwrap(), (64, 48));
    }

    #[test]
    fn test_thumbnail_is_resized_jpeg() {
        let codec = ImageCrateCodec::new();
        let thumbnail = codec.thumbnail(&png_bytes(64, 48), 20, 15).unwrap();

        assert_eq!(&thumbnail[..2], &[0xFF, 0xD8]);
        assert_eq!(codec.dimensions(&thumbnail).unwrap(), (20, 15));
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let codec = ImageCrateCodec::new();
        assert!(matches!(
            codec.dimensions(b"not an image"),
            Err(CodecError::Decode(_))
        ));
        assert!(matches!(
            codec.thumbnail(b"not an image", 10, 10),
            Err(CodecError::Decode(_))
        ));
    }
}
