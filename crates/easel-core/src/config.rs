//! Configuration types for stencil generation.
//!
//! This module provides the configuration structures that control how source
//! images are sized and which connection points every master carries. All
//! types implement [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`StencilConfig`] - Top-level configuration combining image and connection settings.
//! - [`ImageConfig`] - Controls the physical area each master occupies.
//! - [`Connection`] - A named connection point with raw Visio formulas.
//!
//! # Example
//!
//! ```
//! # use easel_core::config::{Connection, StencilConfig};
//! let config = StencilConfig::new(4.0, vec![Connection::new("Top", "Width*0.5", "Height*1")]);
//! assert!(config.validate().is_ok());
//! assert_eq!(config.connections().len(), 1);
//! ```

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

/// Default physical area, in square inches, used when no configuration is given.
pub const DEFAULT_TARGET_AREA: f64 = 1.0;

/// Reasons a [`StencilConfig`] is rejected by [`StencilConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("target area must be a positive finite number, got {0}")]
    InvalidTargetArea(f64),

    #[error("connection name must not be empty")]
    EmptyConnectionName,

    #[error("connection `{0}` is defined more than once")]
    DuplicateConnection(String),
}

/// Top-level stencil configuration.
///
/// Groups [`ImageConfig`] and the list of [`Connection`] points into a single
/// configuration root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StencilConfig {
    /// Image sizing section.
    #[serde(default)]
    image: ImageConfig,

    /// Connection points added to every master, in declaration order.
    #[serde(default)]
    connections: Vec<Connection>,
}

impl StencilConfig {
    /// Creates a new [`StencilConfig`].
    ///
    /// # Arguments
    ///
    /// * `target_area` - Physical area in square inches for every master image.
    /// * `connections` - Connection points, rendered in the given order.
    pub fn new(target_area: f64, connections: Vec<Connection>) -> Self {
        Self {
            image: ImageConfig { target_area },
            connections,
        }
    }

    /// Returns the configured target area in square inches.
    pub fn target_area(&self) -> f64 {
        self.image.target_area
    }

    /// Returns the configured connection points.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Checks the invariants the assembler relies on.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the target area is not a positive
    /// finite number, or if a connection name is empty or repeated.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let area = self.target_area();
        if !area.is_finite() || area <= 0.0 {
            return Err(ValidationError::InvalidTargetArea(area));
        }

        let mut seen = HashSet::new();
        for connection in &self.connections {
            if connection.name.is_empty() {
                return Err(ValidationError::EmptyConnectionName);
            }
            if !seen.insert(connection.name.as_str()) {
                return Err(ValidationError::DuplicateConnection(
                    connection.name.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Image sizing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    /// Area in square inches that every scaled image occupies.
    #[serde(default = "default_target_area")]
    target_area: f64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            target_area: DEFAULT_TARGET_AREA,
        }
    }
}

fn default_target_area() -> f64 {
    DEFAULT_TARGET_AREA
}

/// A named connection point.
///
/// The `x` and `y` values are Visio formula expressions. They are not
/// evaluated here and end up verbatim in the generated master.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Connection {
    name: String,
    x: String,
    y: String,
}

impl Connection {
    /// Creates a connection point from its name and formulas.
    pub fn new(name: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            x: x.into(),
            y: y.into(),
        }
    }

    /// Returns the row name of this connection point.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the X formula.
    pub fn x(&self) -> &str {
        &self.x
    }

    /// Returns the Y formula.
    pub fn y(&self) -> &str {
        &self.y
    }
}
