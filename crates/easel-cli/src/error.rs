//! Errors reported by the CLI.

use std::{io, path::PathBuf};

use thiserror::Error;

use easel::EaselError;

use crate::config::ConfigError;

/// Everything that can stop a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Easel(#[from] EaselError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("image directory `{0}` does not exist")]
    ImageDirMissing(PathBuf),

    #[error("output directory `{0}` does not exist")]
    OutputDirMissing(PathBuf),

    #[error("output file `{0}` must have the `.vssx` extension")]
    OutputExtension(PathBuf),

    #[error("invalid image pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("no images in `{dir}` match `{pattern}`")]
    NoImagesFound { dir: PathBuf, pattern: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
