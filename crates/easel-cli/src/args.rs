//! Command-line argument definitions for the Easel CLI.
//!
//! Arguments select the image folder and file patterns, the output package,
//! the configuration file and base template, and the logging verbosity.

use clap::Parser;

/// Command-line arguments for the Easel stencil builder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing the source images
    #[arg(long)]
    pub image_path: String,

    /// File name patterns to include, separated by `;`
    #[arg(long, default_value = "*.png;*.jpg;*.jpeg;*.bmp")]
    pub image_pattern: String,

    /// Path to the output stencil file
    #[arg(short, long, default_value = "stencil.vssx")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Base .vssx package to build on instead of the built-in empty stencil
    #[arg(long)]
    pub template: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
