// src/services/image_processor.rs
use base64::{Engine as _, engine::general_purpose};
use image::{GenericImageView, ImageFormat};

use crate::errors::ProxyError;
use crate::models::ImagePayload;

const MAX_DIMENSION: u32 = 4096;

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalizes a caller-supplied base64 image into the form the adapters
    /// expect: any `data:<mime>;base64,` prefix stripped, bytes verified to
    /// decode as a real image, MIME type taken from the actual content.
    pub fn prepare(&self, encoded: &str) -> Result<ImagePayload, ProxyError> {
        let cleaned = strip_data_url_prefix(encoded.trim());
        if cleaned.is_empty() {
            return Err(ProxyError::InvalidInput("image is empty".to_string()));
        }

        let bytes = general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| ProxyError::InvalidInput(format!("image is not valid base64: {}", e)))?;

        let format = image::guess_format(&bytes).map_err(|e| {
            ProxyError::InvalidInput(format!("unrecognized image format: {}", e))
        })?;

        let img = image::load_from_memory(&bytes)
            .map_err(|e| ProxyError::InvalidInput(format!("image failed to decode: {}", e)))?;

        let (width, height) = img.dimensions();
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ProxyError::InvalidInput(format!(
                "image dimensions {}x{} exceed {}x{}",
                width, height, MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        Ok(ImagePayload {
            base64: cleaned.to_string(),
            mime_type: mime_for(format),
        })
    }
}

fn strip_data_url_prefix(encoded: &str) -> &str {
    match encoded.strip_prefix("data:") {
        Some(rest) => rest.split_once(";base64,").map(|(_, b64)| b64).unwrap_or(encoded),
        None => encoded,
    }
}

fn mime_for(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png_base64() -> String {
        let img = image::DynamicImage::new_rgb8(2, 2);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn accepts_raw_base64_png() {
        let payload = ImageProcessor::new().prepare(&tiny_png_base64()).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert!(!payload.base64.is_empty());
    }

    #[test]
    fn strips_data_url_prefix() {
        let encoded = format!("data:image/png;base64,{}", tiny_png_base64());
        let payload = ImageProcessor::new().prepare(&encoded).unwrap();
        assert_eq!(payload.base64, tiny_png_base64());
        assert!(payload.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn rejects_garbage() {
        let processor = ImageProcessor::new();
        assert!(matches!(
            processor.prepare("not-base64!!"),
            Err(ProxyError::InvalidInput(_))
        ));
        // Valid base64 but not an image.
        let b64 = general_purpose::STANDARD.encode(b"hello world");
        assert!(matches!(
            processor.prepare(&b64),
            Err(ProxyError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(matches!(
            ImageProcessor::new().prepare("   "),
            Err(ProxyError::InvalidInput(_))
        ));
    }
}
