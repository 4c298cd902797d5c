//! Raster decoding with resolution metadata.
//!
//! Pixels are decoded by the `image` crate. The pixel density, which the
//! scaling step needs and `image` does not expose, is read straight from the
//! container headers:
//!
//! - PNG: the `pHYs` chunk, as decoded by the `png` crate
//! - JPEG: the JFIF `APP0` segment (unit `1` is per inch, `2` per centimeter),
//!   falling back to the EXIF resolution tags when JFIF carries no unit
//! - BMP: the info header's horizontal and vertical pixels per meter
//!
//! Anything else, or a header without a unit, yields an unknown resolution.

use std::{fs, io, io::Cursor, path::Path};

use easel_core::scale::{Resolution, ResolutionUnit};
use image::{DynamicImage, ImageFormat};
use log::trace;
use thiserror::Error;

/// Per-image decode and encode failures.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot read image: {0}")]
    Io(#[from] io::Error),

    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A decoded raster with its resolution metadata.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    resolution: Resolution,
    image: DynamicImage,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, resolution: Resolution) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            resolution,
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Source of decoded images for the assembler.
pub trait RasterDecoder {
    /// Decodes the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError`] when the file cannot be read or decoded. The
    /// assembler treats this as a per-image skip.
    fn decode(&self, path: &Path) -> Result<DecodedImage, RasterError>;
}

/// Decodes images from the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRasterDecoder;

impl RasterDecoder for FileRasterDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, RasterError> {
        let bytes = fs::read(path)?;
        decode_bytes(&bytes)
    }
}

/// Decodes an in-memory image and reads its resolution metadata.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, RasterError> {
    let format = image::guess_format(bytes)?;
    let image = image::load_from_memory_with_format(bytes, format)?;

    let resolution = match format {
        ImageFormat::Png => png_resolution(bytes),
        ImageFormat::Jpeg => jfif_resolution(bytes)
            .filter(|resolution| resolution.unit() != ResolutionUnit::Unknown)
            .or_else(|| exif_resolution(bytes)),
        ImageFormat::Bmp => bmp_resolution(bytes),
        _ => None,
    }
    .unwrap_or_else(Resolution::unknown);

    trace!(
        format:? = format,
        width = image.width(),
        height = image.height(),
        unit:% = resolution.unit();
        "Decoded image"
    );

    Ok(DecodedImage::new(image, resolution))
}

/// Re-encodes an image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, RasterError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Reads the `pHYs` chunk through the PNG header decoder.
fn png_resolution(bytes: &[u8]) -> Option<Resolution> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    let unit = match dims.unit {
        png::Unit::Meter => ResolutionUnit::PixelsPerMeter,
        png::Unit::Unspecified => ResolutionUnit::Unknown,
    };
    Some(Resolution::new(
        unit,
        f64::from(dims.xppu),
        f64::from(dims.yppu),
    ))
}

/// Reads the density fields of a JFIF `APP0` segment.
fn jfif_resolution(bytes: &[u8]) -> Option<Resolution> {
    let mut pos = 2; // SOI
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(pos + 1)?;
        match marker {
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // Start of scan or end of image: no more headers.
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let length = usize::from(be_u16(bytes, pos + 2)?);
        let segment = bytes.get(pos + 4..pos + 2 + length)?;
        if marker == 0xE0 && segment.starts_with(b"JFIF\0") {
            let unit = match *segment.get(7)? {
                1 => ResolutionUnit::PixelsPerInch,
                2 => ResolutionUnit::PixelsPerCentimeter,
                _ => ResolutionUnit::Unknown,
            };
            let x = be_u16(segment, 8)?;
            let y = be_u16(segment, 10)?;
            return Some(Resolution::new(unit, f64::from(x), f64::from(y)));
        }
        pos += 2 + length;
    }
}

/// Reads `XResolution`/`YResolution` from the primary EXIF image.
fn exif_resolution(bytes: &[u8]) -> Option<Resolution> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let x = rational_field(&exif, exif::Tag::XResolution)?;
    let y = rational_field(&exif, exif::Tag::YResolution)?;

    // An absent ResolutionUnit means inches.
    let unit = match exif
        .get_field(exif::Tag::ResolutionUnit, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
    {
        None | Some(2) => ResolutionUnit::PixelsPerInch,
        Some(3) => ResolutionUnit::PixelsPerCentimeter,
        Some(_) => ResolutionUnit::Unknown,
    };
    Some(Resolution::new(unit, x, y))
}

fn rational_field(exif: &exif::Exif, tag: exif::Tag) -> Option<f64> {
    match exif.get_field(tag, exif::In::PRIMARY)?.value {
        exif::Value::Rational(ref values) => values.first().map(exif::Rational::to_f64),
        _ => None,
    }
}

/// Reads the pixels-per-meter fields of a `BITMAPINFOHEADER` (or later) header.
fn bmp_resolution(bytes: &[u8]) -> Option<Resolution> {
    if !bytes.starts_with(b"BM") {
        return None;
    }
    let header_size = le_u32(bytes, 14)?;
    if header_size < 40 {
        // BITMAPCOREHEADER has no resolution fields.
        return None;
    }

    let x = le_i32(bytes, 38)?;
    let y = le_i32(bytes, 42)?;
    if x <= 0 || y <= 0 {
        return Some(Resolution::unknown());
    }
    Some(Resolution::new(
        ResolutionUnit::PixelsPerMeter,
        f64::from(x),
        f64::from(y),
    ))
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    Some(u16::from_be_bytes(bytes.get(at..at + 2)?.try_into().ok()?))
}

fn le_u32(bytes: &[u8], at: usize) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}

fn le_i32(bytes: &[u8], at: usize) -> Option<i32> {
    Some(i32::from_le_bytes(bytes.get(at..at + 4)?.try_into().ok()?))
}
