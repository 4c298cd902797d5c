//! Shapes-pane thumbnails.
//!
//! A thumbnail is the source image re-encoded as an uncompressed bitmap and
//! base64 encoded, as the masters index expects. Thumbnail failures are
//! independent of sizing: a master without a thumbnail is still written, it is
//! only left out of the masters index.

use std::{io::Cursor, path::Path};

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use log::warn;

/// Outcome of thumbnail generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    /// Base64 encoded bitmap.
    Encoded(String),
    /// The image could not be decoded or encoded for thumbnailing.
    Unsupported,
}

impl Thumbnail {
    /// Returns the encoded payload, if any.
    pub fn into_option(self) -> Option<String> {
        match self {
            Thumbnail::Encoded(data) => Some(data),
            Thumbnail::Unsupported => None,
        }
    }
}

/// Produces the thumbnail of a source image.
pub trait ThumbnailEncoder {
    fn encode(&self, path: &Path) -> Thumbnail;
}

/// Encodes the full image as a 32-bit BMP.
#[derive(Debug, Clone, Copy, Default)]
pub struct BmpThumbnailEncoder;

impl BmpThumbnailEncoder {
    /// Encodes an already decoded image.
    pub fn encode_image(image: &DynamicImage) -> Result<String, ImageError> {
        let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
        let mut cursor = Cursor::new(Vec::new());
        rgba.write_to(&mut cursor, ImageFormat::Bmp)?;
        Ok(general_purpose::STANDARD.encode(cursor.into_inner()))
    }

    /// Opens an image, detecting the format from its content like the raster decoder does.
    fn load(path: &Path) -> Result<DynamicImage, ImageError> {
        ImageReader::open(path)?.with_guessed_format()?.decode()
    }
}

impl ThumbnailEncoder for BmpThumbnailEncoder {
    fn encode(&self, path: &Path) -> Thumbnail {
        let encoded = Self::load(path).and_then(|image| Self::encode_image(&image));
        match encoded {
            Ok(data) => Thumbnail::Encoded(data),
            Err(err) => {
                warn!(path:? = path, err:%; "Unsupported image format for thumbnail");
                Thumbnail::Unsupported
            }
        }
    }
}
