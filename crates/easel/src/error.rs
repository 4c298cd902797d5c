//! Error types for Easel operations.
//!
//! [`EaselError`] covers the conditions that abort a whole run. Problems with
//! a single image (undecodable file, missing resolution, failed thumbnail)
//! are not errors: they are logged and recorded in the
//! [`StencilReport`](crate::StencilReport).

use std::io;

use thiserror::Error;

use easel_core::{config::ValidationError, ordering::OrderingError};
use easel_opc::OpcError;

/// The main error type for Easel operations.
#[derive(Debug, Error)]
pub enum EaselError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("no images to process")]
    EmptyInput,

    #[error("too many images: master IDs exhausted")]
    TooManyImages,

    #[error("template could not be loaded: {0}")]
    TemplateLoad(String),

    #[error("no masters were produced: all {skipped} images were skipped")]
    NoMastersProduced { skipped: usize },

    #[error("package error: {0}")]
    Package(#[from] OpcError),

    #[error("failed to render XML: {0}")]
    Render(#[source] OpcError),
}

impl From<OrderingError> for EaselError {
    fn from(error: OrderingError) -> Self {
        match error {
            OrderingError::EmptyInput => Self::EmptyInput,
            OrderingError::IdsExhausted => Self::TooManyImages,
        }
    }
}
