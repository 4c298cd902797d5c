//! Configuration file loading for the CLI
//!
//! This module handles finding and loading the TOML stencil configuration
//! from various locations (explicit path, local directory, system directory).
//!
//! ```toml
//! [image]
//! target_area = 1.5
//!
//! [[connections]]
//! name = "Top"
//! x = "Width*0.5"
//! y = "Height*1"
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use easel::config::{StencilConfig, ValidationError};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration file {path}: {err}")]
    Read {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (easel/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path to config file
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be read or parsed
/// - The loaded configuration is invalid
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<StencilConfig, ConfigError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("easel/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "easel", "easel") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(StencilConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<StencilConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.to_path_buf(),
        err,
    })?;

    let config: StencilConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;

    debug!(
        target_area = config.target_area(),
        connections = config.connections().len();
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_explicit_config() {
        let (_dir, path) = write_config(
            r#"
[image]
target_area = 2.5

[[connections]]
name = "Top"
x = "Width*0.5"
y = "Height*1"

[[connections]]
name = "Bottom"
x = "Width*0.5"
y = "Height*0"
"#,
        );

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.target_area(), 2.5);
        let names: Vec<&str> = config.connections().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Top", "Bottom"]);
        assert_eq!(config.connections()[1].y(), "Height*0");
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }

    #[test]
    fn test_malformed_config() {
        let (_dir, path) = write_config("[image\ntarget_area = ");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (_dir, path) = write_config("[image]\ntarget_area = -1.0\n");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::InvalidTargetArea(_))
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let (_dir, path) = write_config("[[connections]]\nname = \"Left\"\nx = \"0\"\ny = \"Height*0.5\"\n");
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.target_area(), easel::config::DEFAULT_TARGET_AREA);
        assert_eq!(config.connections().len(), 1);
    }
}
