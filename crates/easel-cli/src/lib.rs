//! Easel CLI library
//!
//! This module contains the core CLI logic for the Easel stencil builder.

pub mod error_adapter;

mod args;
mod config;
mod discover;
mod error;

pub use args::Args;
pub use config::ConfigError;
pub use error::CliError;

use std::path::Path;

use log::{debug, info};

use easel::{StencilBuilder, request::StencilRequest, template::BaseTemplate};

use discover::ImagePattern;

/// Run the Easel CLI application
///
/// This function collects the matching images from the image directory,
/// builds a stencil from them and writes the package to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - Missing image or output directories, or a non-`.vssx` output name
/// - Configuration loading errors
/// - No image matching the pattern
/// - Template loading errors
/// - Runs in which no image could be turned into a master
/// - File I/O and packaging errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        image_path = args.image_path,
        image_pattern = args.image_pattern,
        output_path = args.output;
        "Processing images"
    );

    let image_dir = Path::new(&args.image_path);
    let output = Path::new(&args.output);
    validate_paths(image_dir, output)?;

    // Load configuration
    let stencil_config = config::load_config(args.config.as_ref())?;

    // Collect input images
    let pattern = ImagePattern::parse(&args.image_pattern)?;
    let images = discover::find_images(image_dir, &pattern)?;
    if images.is_empty() {
        return Err(CliError::NoImagesFound {
            dir: image_dir.to_path_buf(),
            pattern: args.image_pattern.clone(),
        });
    }
    info!(count = images.len(); "Found images");
    for image in &images {
        debug!(path:? = image; "Queued image");
    }
    let request: StencilRequest = images.iter().collect();

    // Build the stencil
    let mut builder = StencilBuilder::new(stencil_config);
    if let Some(template) = &args.template {
        info!(template_path = template; "Using custom template");
        builder = builder.with_template(BaseTemplate::from_path(template)?);
    }
    let stencil = builder.build(&request)?;

    // Write output file
    stencil.write_to(output)?;

    info!(
        output_file = args.output,
        masters = stencil.report().masters().len(),
        skipped = stencil.report().skipped().len();
        "Stencil exported successfully"
    );

    Ok(())
}

/// Checks the image directory and output path before any work is done.
fn validate_paths(image_dir: &Path, output: &Path) -> Result<(), CliError> {
    if !image_dir.is_dir() {
        return Err(CliError::ImageDirMissing(image_dir.to_path_buf()));
    }

    // A bare file name has an empty parent: the current directory.
    let output_dir = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !output_dir.is_dir() {
        return Err(CliError::OutputDirMissing(output_dir.to_path_buf()));
    }

    let is_vssx = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("vssx"));
    if !is_vssx {
        return Err(CliError::OutputExtension(output.to_path_buf()));
    }

    Ok(())
}
