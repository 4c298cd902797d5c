//! Error adapter for converting [`CliError`] to miette diagnostics.
//!
//! This module provides the bridge between the standard error types of the
//! library and the CLI, and miette's rich diagnostic formatting. Every error
//! carries a stable code and, where the user can act on it, a help message.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;

use easel::EaselError;

use crate::{CliError, config::ConfigError};

/// Adapter presenting a [`CliError`] as a miette diagnostic.
pub struct ErrorAdapter<'a>(pub &'a CliError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            CliError::Easel(err) => easel_code(err),
            CliError::Config(ConfigError::Parse(_)) => "easel::config::parse",
            CliError::Config(ConfigError::MissingFile(_)) => "easel::config::missing",
            CliError::Config(ConfigError::Read { .. }) => "easel::config::read",
            CliError::Config(ConfigError::Validation(_)) => "easel::config",
            CliError::ImageDirMissing(_)
            | CliError::OutputDirMissing(_)
            | CliError::OutputExtension(_)
            | CliError::Pattern(_) => "easel::args",
            CliError::NoImagesFound { .. } => "easel::empty_input",
            CliError::Io(_) => "easel::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            CliError::Easel(EaselError::Config(_)) | CliError::Config(ConfigError::Validation(_)) => {
                "target_area must be positive and connection names must be unique and non-empty"
            }
            CliError::Config(ConfigError::Parse(_)) => {
                "expected an `[image]` table with `target_area` and `[[connections]]` entries with `name`, `x` and `y`"
            }
            CliError::Easel(EaselError::TemplateLoad(_)) => {
                "pass a valid .vssx file with --template, or omit it to use the built-in template"
            }
            CliError::Easel(EaselError::NoMastersProduced { .. }) => {
                "images are sized from their resolution (DPI) metadata; run with --log-level warn to see why each image was skipped"
            }
            CliError::Easel(EaselError::EmptyInput) | CliError::NoImagesFound { .. } => {
                "check --image-path and --image-pattern (patterns are separated by `;`)"
            }
            CliError::OutputExtension(_) => "use an output file name ending in .vssx",
            CliError::Pattern(_) => {
                "patterns are relative to --image-path and use `*`, `?`, `**` and `[...]`"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

fn easel_code(err: &EaselError) -> &'static str {
    match err {
        EaselError::Io(_) => "easel::io",
        EaselError::Config(_) => "easel::config",
        EaselError::EmptyInput => "easel::empty_input",
        EaselError::TooManyImages => "easel::too_many_images",
        EaselError::TemplateLoad(_) => "easel::template",
        EaselError::NoMastersProduced { .. } => "easel::no_masters",
        EaselError::Package(_) => "easel::package",
        EaselError::Render(_) => "easel::render",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use easel::config::ValidationError;

    use super::*;

    fn code_of(err: &CliError) -> Option<String> {
        ErrorAdapter(err).code().map(|code| code.to_string())
    }

    fn help_of(err: &CliError) -> Option<String> {
        ErrorAdapter(err).help().map(|help| help.to_string())
    }

    #[test]
    fn test_library_error_codes() {
        let cases = [
            (EaselError::EmptyInput, "easel::empty_input"),
            (EaselError::TemplateLoad("bad zip".into()), "easel::template"),
            (
                EaselError::NoMastersProduced { skipped: 3 },
                "easel::no_masters",
            ),
            (
                EaselError::Config(ValidationError::EmptyConnectionName),
                "easel::config",
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(code_of(&CliError::Easel(err)).as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_cli_error_codes() {
        let missing = CliError::ImageDirMissing(PathBuf::from("icons"));
        assert_eq!(code_of(&missing).as_deref(), Some("easel::args"));

        let pattern = CliError::Pattern(glob::Pattern::new("[oops").unwrap_err());
        assert_eq!(code_of(&pattern).as_deref(), Some("easel::args"));
        assert!(help_of(&pattern).unwrap().contains("**"));

        let parse = CliError::Config(ConfigError::Parse("unexpected eof".into()));
        assert_eq!(code_of(&parse).as_deref(), Some("easel::config::parse"));
    }

    #[test]
    fn test_help_for_actionable_errors() {
        let no_masters = CliError::Easel(EaselError::NoMastersProduced { skipped: 1 });
        assert!(help_of(&no_masters).unwrap().contains("DPI"));

        let no_images = CliError::NoImagesFound {
            dir: PathBuf::from("icons"),
            pattern: "*.png".into(),
        };
        assert!(help_of(&no_images).unwrap().contains("--image-pattern"));

        let io = CliError::Io(std::io::Error::other("disk full"));
        assert!(help_of(&io).is_none());
    }

    #[test]
    fn test_display_delegates_to_error() {
        let err = CliError::Easel(EaselError::NoMastersProduced { skipped: 2 });
        assert_eq!(ErrorAdapter(&err).to_string(), err.to_string());
    }

    #[test]
    fn test_graphical_render_includes_code_and_help() {
        let err = CliError::Easel(EaselError::TemplateLoad("not a zip archive".into()));
        let mut rendered = String::new();
        miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
            .with_width(200)
            .render_report(&mut rendered, &ErrorAdapter(&err))
            .unwrap();

        assert!(rendered.contains("easel::template"));
        assert!(rendered.contains("not a zip archive"));
        assert!(rendered.contains("--template"));
    }
}
