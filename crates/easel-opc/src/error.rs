//! Error types for package operations.

use std::io;

use thiserror::Error;

/// Errors raised while loading, editing or sealing a package.
#[derive(Debug, Error)]
pub enum OpcError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("invalid part name `{name}`: {reason}")]
    InvalidPartName { name: String, reason: &'static str },

    #[error("part `{0}` already exists")]
    DuplicatePart(String),

    #[error("part `{0}` does not exist")]
    MissingPart(String),

    #[error("no content type registered for part `{0}`")]
    MissingContentType(String),

    #[error("missing required attribute `{attribute}` on `{element}`")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("relationship `{id}` already exists on `{owner}`")]
    DuplicateRelationship { owner: String, id: String },

    #[error("media part `{part}` with content type `{content_type}` cannot be sealed: {reason}")]
    MediaTypeMismatch {
        part: String,
        content_type: String,
        reason: String,
    },
}

/// Result alias for package operations.
pub type Result<T> = std::result::Result<T, OpcError>;
