//! Shared fixtures for the integration tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

const METERS_PER_INCH: f64 = 0.0254;

/// Encodes a blank PNG, optionally tagged with a `pHYs` density in dots per inch.
pub fn png_bytes(width: u32, height: u32, dpi: Option<f64>) -> Vec<u8> {
    let dims = dpi.map(|dpi| {
        let ppm = (dpi / METERS_PER_INCH).round() as u32;
        png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }
    });

    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(dims);
        let mut writer = encoder.write_header().expect("png header");
        writer
            .write_image_data(&vec![0; (width * height * 4) as usize])
            .expect("png data");
    }
    buf
}

/// Writes a PNG into `dir` and returns its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32, dpi: Option<f64>) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, png_bytes(width, height, dpi)).expect("write png");
    path
}

/// Reads the `V` value of the first `<Cell N="{name}" .../>` in `xml`.
pub fn cell_value(xml: &str, name: &str) -> Option<f64> {
    let marker = format!(r#"<Cell N="{name}" V=""#);
    let start = xml.find(&marker)? + marker.len();
    let end = start + xml[start..].find('"')?;
    xml[start..end].parse().ok()
}
