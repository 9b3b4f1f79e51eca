//! Batch outcome types: decoded images and per-attempt failures.

use std::fmt;
use std::io::Cursor;

use base64::Engine;
use image::{DynamicImage, ImageFormat};

use crate::error::GenerationError;
use crate::ports::image_generator::InlineData;

/// An image decoded from an inline response payload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// 1-based index of the attempt that produced this image.
    pub index: u32,
    /// Decoded pixel buffer.
    pub image: DynamicImage,
    /// Container format the payload was encoded in.
    pub format: ImageFormat,
    /// MIME type reported alongside the payload.
    pub mime_type: String,
}

impl DecodedImage {
    /// Decode a base64 inline payload produced by attempt `index`.
    ///
    /// # Errors
    ///
    /// Returns `ImageDecode` if the payload is not valid base64 or not a
    /// decodable image.
    pub fn from_inline(index: u32, inline: &InlineData) -> Result<Self, GenerationError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data.trim())
            .map_err(|e| GenerationError::ImageDecode(format!("Failed to decode base64: {e}")))?;

        let format = image::guess_format(&bytes)
            .ok()
            .or_else(|| ImageFormat::from_mime_type(&inline.mime_type))
            .ok_or_else(|| {
                GenerationError::ImageDecode(format!(
                    "Unrecognized image payload (mime type {})",
                    inline.mime_type
                ))
            })?;

        let image = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| GenerationError::ImageDecode(format!("Failed to decode image: {e}")))?;

        Ok(Self {
            index,
            image,
            format,
            mime_type: inline.mime_type.clone(),
        })
    }

    /// Re-encode the pixels into `format` bytes.
    ///
    /// JPEG output drops the alpha channel.
    ///
    /// # Errors
    ///
    /// Returns `ImageEncode` if the encoder rejects the image.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, GenerationError> {
        let converted;
        let source = match format {
            ImageFormat::Jpeg => {
                converted = DynamicImage::ImageRgb8(self.image.to_rgb8());
                &converted
            }
            ImageFormat::WebP => {
                converted = DynamicImage::ImageRgba8(self.image.to_rgba8());
                &converted
            }
            _ => &self.image,
        };

        let mut buf = Cursor::new(Vec::new());
        source.write_to(&mut buf, format).map_err(|e| {
            GenerationError::ImageEncode(format!("Failed to encode as {format:?}: {e}"))
        })?;
        Ok(buf.into_inner())
    }
}

/// Why an attempt produced no image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network, credential, quota, or malformed-request failure.
    Transport,
    /// The call succeeded but carried no inline image part.
    EmptyResponse,
    /// An inline part was present but could not be decoded.
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::EmptyResponse => write!(f, "empty response"),
            Self::Decode => write!(f, "decode"),
        }
    }
}

/// A recorded failure for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// 1-based attempt index.
    pub index: u32,
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub message: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image {} failed ({}): {}", self.index, self.kind, self.message)
    }
}

/// Outcome of a batch: successes and failures, each in attempt order.
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// Decoded images.
    pub images: Vec<DecodedImage>,
    /// Attempts that produced no image.
    pub failures: Vec<AttemptFailure>,
}

impl GenerationResult {
    /// True when no attempt produced an image.
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        self.images.is_empty()
    }

    /// The single aggregated notice to show when nothing was generated.
    #[must_use]
    pub fn failure_notice(&self) -> Option<String> {
        if !self.is_total_failure() {
            return None;
        }
        let reason = self
            .failures
            .last()
            .map_or_else(String::new, |f| format!(" Last error: {}", f.message));
        Some(format!(
            "No image could be generated ({} attempt(s) failed). Try a different prompt.{reason}",
            self.failures.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_inline(width: u32, height: u32) -> InlineData {
        let mut img = image::RgbaImage::new(width, height);
        for (x, y, px) in img.enumerate_pixels_mut() {
            #[allow(clippy::cast_possible_truncation)]
            let v = ((x * 31 + y * 17) % 256) as u8;
            *px = image::Rgba([v, 255 - v, v / 2, 200]);
        }
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img).write_to(&mut buf, ImageFormat::Png).unwrap();
        InlineData {
            mime_type: "image/png".into(),
            data: base64::engine::general_purpose::STANDARD.encode(buf.into_inner()),
        }
    }

    #[test]
    fn decodes_png_payload() {
        let decoded = DecodedImage::from_inline(2, &png_inline(4, 3)).unwrap();
        assert_eq!(decoded.index, 2);
        assert_eq!(decoded.format, ImageFormat::Png);
        assert_eq!(decoded.image.width(), 4);
        assert_eq!(decoded.image.height(), 3);
    }

    #[test]
    fn png_round_trip_is_pixel_identical() {
        let decoded = DecodedImage::from_inline(1, &png_inline(8, 8)).unwrap();
        let bytes = decoded.encode(ImageFormat::Png).unwrap();
        let again = image::load_from_memory(&bytes).unwrap();
        assert_eq!(again.to_rgba8().into_raw(), decoded.image.to_rgba8().into_raw());
    }

    #[test]
    fn jpeg_encoding_drops_alpha() {
        let decoded = DecodedImage::from_inline(1, &png_inline(4, 4)).unwrap();
        let bytes = decoded.encode(ImageFormat::Jpeg).unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn invalid_base64_is_decode_error() {
        let inline = InlineData { mime_type: "image/png".into(), data: "not base64!!".into() };
        let err = DecodedImage::from_inline(1, &inline).unwrap_err();
        assert!(matches!(err, GenerationError::ImageDecode(_)));
    }

    #[test]
    fn garbage_bytes_are_decode_error() {
        let inline = InlineData {
            mime_type: "image/png".into(),
            data: base64::engine::general_purpose::STANDARD.encode(b"definitely not a png"),
        };
        assert!(DecodedImage::from_inline(1, &inline).is_err());
    }

    #[test]
    fn failure_notice_only_on_total_failure() {
        let mut result = GenerationResult {
            images: Vec::new(),
            failures: vec![AttemptFailure {
                index: 1,
                kind: FailureKind::Transport,
                message: "quota exceeded".into(),
            }],
        };
        let notice = result.failure_notice().unwrap();
        assert!(notice.starts_with("No image could be generated (1 attempt(s) failed)"));
        assert!(notice.contains("quota exceeded"));

        result.images.push(DecodedImage::from_inline(2, &png_inline(1, 1)).unwrap());
        assert!(result.failure_notice().is_none());
    }

    #[test]
    fn attempt_failure_display() {
        let failure = AttemptFailure {
            index: 2,
            kind: FailureKind::EmptyResponse,
            message: "no image".into(),
        };
        assert_eq!(failure.to_string(), "image 2 failed (empty response): no image");
    }
}
