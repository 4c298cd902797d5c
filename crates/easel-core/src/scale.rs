//! Resolution normalization and physical sizing of master images.
//!
//! Every master is scaled so that its image covers the configured target
//! area (in square inches) while keeping the image's aspect ratio as seen at
//! its native resolution.
//!
//! # Algorithm
//!
//! 1. Normalize the resolution to dots per inch on both axes.
//! 2. Convert pixel dimensions to inches: `w_in = w_px / dpi_x`, `h_in = h_px / dpi_y`.
//! 3. `scale = sqrt(target_area / (w_px * h_px))`.
//! 4. The physical size is `(w_in * scale, h_in * scale)`, unrounded.
//!
//! # Example
//!
//! ```
//! # use easel_core::scale::{Resolution, ResolutionUnit, scale_to_area};
//! let resolution = Resolution::new(ResolutionUnit::PixelsPerInch, 100.0, 100.0);
//! let size = scale_to_area(200, 100, resolution, 4.0).unwrap();
//! // 2in x 1in at native resolution, scaled by sqrt(4 / 20000).
//! assert!((size.width() - 0.028284271247461901).abs() < 1e-12);
//! assert!((size.height() - 0.014142135623730951).abs() < 1e-12);
//! ```

use std::fmt;

use log::trace;
use thiserror::Error;

use crate::master::PhysicalSize;

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Meters per inch.
pub const METERS_PER_INCH: f64 = 0.0254;

/// Per-image sizing failures. None of them abort a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("image has no usable resolution metadata")]
    UnknownResolution,

    #[error("image resolution {x}x{y} is not positive")]
    InvalidResolution { x: f64, y: f64 },

    #[error("image has zero pixel area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },

    #[error("scaled size is not a finite number")]
    NonFinite,
}

/// Unit attached to an image's resolution values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionUnit {
    PixelsPerCentimeter,
    PixelsPerInch,
    PixelsPerMeter,
    /// No unit recorded, or an aspect-ratio-only value.
    #[default]
    Unknown,
}

impl ResolutionUnit {
    /// Factor that converts a value in this unit to dots per inch.
    pub fn dpi_factor(self) -> Option<f64> {
        match self {
            ResolutionUnit::PixelsPerCentimeter => Some(CM_PER_INCH),
            ResolutionUnit::PixelsPerInch => Some(1.0),
            ResolutionUnit::PixelsPerMeter => Some(METERS_PER_INCH),
            ResolutionUnit::Unknown => None,
        }
    }
}

impl fmt::Display for ResolutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionUnit::PixelsPerCentimeter => write!(f, "px/cm"),
            ResolutionUnit::PixelsPerInch => write!(f, "px/in"),
            ResolutionUnit::PixelsPerMeter => write!(f, "px/m"),
            ResolutionUnit::Unknown => write!(f, "unknown"),
        }
    }
}

/// Horizontal and vertical resolution together with their unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Resolution {
    unit: ResolutionUnit,
    x: f64,
    y: f64,
}

impl Resolution {
    pub fn new(unit: ResolutionUnit, x: f64, y: f64) -> Self {
        Self { unit, x, y }
    }

    /// A resolution without usable metadata.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn unit(&self) -> ResolutionUnit {
        self.unit
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Normalizes this resolution to dots per inch, as `(dpi_x, dpi_y)`.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::UnknownResolution`] for [`ResolutionUnit::Unknown`]
    /// and [`ScaleError::InvalidResolution`] when either value is not a
    /// positive finite number.
    pub fn to_dpi(&self) -> Result<(f64, f64), ScaleError> {
        let factor = self
            .unit
            .dpi_factor()
            .ok_or(ScaleError::UnknownResolution)?;

        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.x) || !valid(self.y) {
            return Err(ScaleError::InvalidResolution {
                x: self.x,
                y: self.y,
            });
        }

        Ok((self.x * factor, self.y * factor))
    }
}

/// Computes the physical size of an image scaled to `target_area` square inches.
///
/// # Errors
///
/// Returns a [`ScaleError`] when the resolution cannot be normalized, when the
/// image has no pixels, or when the result would not be finite.
pub fn scale_to_area(
    width_px: u32,
    height_px: u32,
    resolution: Resolution,
    target_area: f64,
) -> Result<PhysicalSize, ScaleError> {
    let (dpi_x, dpi_y) = resolution.to_dpi()?;

    let area_px = f64::from(width_px) * f64::from(height_px);
    if area_px == 0.0 {
        return Err(ScaleError::ZeroArea {
            width: width_px,
            height: height_px,
        });
    }

    let width_in = f64::from(width_px) / dpi_x;
    let height_in = f64::from(height_px) / dpi_y;
    let scale = (target_area / area_px).sqrt();

    let size = PhysicalSize::new(width_in * scale, height_in * scale);
    if !size.is_finite() {
        return Err(ScaleError::NonFinite);
    }

    trace!(
        width_px,
        height_px,
        dpi_x,
        dpi_y,
        scale,
        width_in = size.width(),
        height_in = size.height();
        "Scaled image"
    );

    Ok(size)
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn dimension_strategy() -> impl Strategy<Value = u32> {
        1u32..5000
    }

    fn dpi_strategy() -> impl Strategy<Value = f64> {
        1.0f64..1200.0
    }

    /// At equal DPI on both axes, the scaled size covers `target_area / dpi^2`.
    fn check_scaled_area(w: u32, h: u32, dpi: f64, area: f64) -> Result<(), TestCaseError> {
        let resolution = Resolution::new(ResolutionUnit::PixelsPerInch, dpi, dpi);
        let size = scale_to_area(w, h, resolution, area).expect("valid input");

        let expected = area / (dpi * dpi);
        let actual = size.width() * size.height();
        prop_assert!(
            approx_eq!(f64, actual, expected, epsilon = expected * 1e-9),
            "area {actual} != {expected}"
        );
        Ok(())
    }

    /// The aspect ratio of the pixel grid is preserved at equal DPI.
    fn check_aspect_ratio(w: u32, h: u32, dpi: f64) -> Result<(), TestCaseError> {
        let resolution = Resolution::new(ResolutionUnit::PixelsPerInch, dpi, dpi);
        let size = scale_to_area(w, h, resolution, 2.0).expect("valid input");

        let expected = f64::from(w) / f64::from(h);
        let actual = size.width() / size.height();
        prop_assert!(approx_eq!(f64, actual, expected, epsilon = expected * 1e-9));
        Ok(())
    }

    proptest! {
        #[test]
        fn scaled_area_matches_target(
            w in dimension_strategy(),
            h in dimension_strategy(),
            dpi in dpi_strategy(),
            area in 0.01f64..100.0,
        ) {
            check_scaled_area(w, h, dpi, area)?;
        }

        #[test]
        fn aspect_ratio_is_preserved(
            w in dimension_strategy(),
            h in dimension_strategy(),
            dpi in dpi_strategy(),
        ) {
            check_aspect_ratio(w, h, dpi)?;
        }
    }
}
