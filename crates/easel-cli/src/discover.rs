//! Image discovery.
//!
//! Finds the files under a directory whose paths, relative to that directory,
//! match a list of `;`-separated glob patterns such as `*.png;icons/**/*.jpg`.
//! `*` and `?` stay within one path segment, `**` spans any number of
//! directories and matching ignores case.

use std::{
    collections::BTreeSet,
    io,
    path::{Path, PathBuf},
};

use glob::{MatchOptions, Pattern, PatternError};
use log::trace;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A set of `;`-separated glob patterns, relative to an image directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePattern {
    patterns: Vec<String>,
}

impl ImagePattern {
    /// Splits `source` on `;`, ignoring blank entries.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for the first malformed pattern.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let patterns = source
            .split(';')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| Pattern::new(pattern).map(|_| pattern.to_string()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Lists the files under `dir` that match `pattern`, sorted by path.
///
/// # Errors
///
/// Returns an I/O error if a directory visited by a pattern cannot be read.
pub fn find_images(dir: &Path, pattern: &ImagePattern) -> io::Result<Vec<PathBuf>> {
    let base = Pattern::escape(&dir.to_string_lossy());
    let mut images = BTreeSet::new();

    for relative in &pattern.patterns {
        let full = format!("{base}/{relative}");
        let paths = glob::glob_with(&full, MATCH_OPTIONS)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        for path in paths {
            let path = path.map_err(glob::GlobError::into_error)?;
            if path.is_file() {
                images.insert(path);
            } else {
                trace!(path:? = path; "Skipping matched directory");
            }
        }
    }

    Ok(images.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn found(root: &Path, pattern: &str) -> Vec<String> {
        let pattern = ImagePattern::parse(pattern).unwrap();
        find_images(root, &pattern)
            .unwrap()
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for relative in [
            "b.png",
            "A.PNG",
            "readme.md",
            "icon-1.png",
            "icon-12.png",
            "sub/nested.png",
            "sub/deeper/deep.png",
            "other/photo.jpg",
        ] {
            touch(dir.path(), relative);
        }
        fs::create_dir(dir.path().join("folder.png")).unwrap();
        dir
    }

    #[test]
    fn test_top_level_patterns_ignore_case() {
        let dir = fixture();
        assert_eq!(
            found(dir.path(), "*.png"),
            vec!["A.PNG", "b.png", "icon-1.png", "icon-12.png"]
        );
    }

    #[test]
    fn test_question_mark_matches_one_character() {
        let dir = fixture();
        assert_eq!(found(dir.path(), "icon-?.png"), vec!["icon-1.png"]);
    }

    #[test]
    fn test_subdirectory_pattern() {
        let dir = fixture();
        assert_eq!(found(dir.path(), "sub/*.png"), vec!["sub/nested.png"]);
    }

    #[test]
    fn test_recursive_pattern() {
        let dir = fixture();
        assert_eq!(
            found(dir.path(), "**/*.png"),
            vec![
                "A.PNG",
                "b.png",
                "icon-1.png",
                "icon-12.png",
                "sub/deeper/deep.png",
                "sub/nested.png",
            ]
        );
    }

    #[test]
    fn test_multiple_patterns_are_merged_without_duplicates() {
        let dir = fixture();
        assert_eq!(
            found(dir.path(), "b.png; *.PNG ;;other/*.jpg"),
            vec!["A.PNG", "b.png", "icon-1.png", "icon-12.png", "other/photo.jpg"]
        );
    }

    #[test]
    fn test_blank_and_invalid_patterns() {
        assert!(ImagePattern::parse(" ; ;").unwrap().is_empty());
        assert!(ImagePattern::parse("[unclosed").is_err());

        let dir = fixture();
        assert!(found(dir.path(), "").is_empty());
    }
}
