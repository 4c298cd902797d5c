//! Part names and relative target resolution.

use std::{cmp::Ordering, fmt, hash};

use crate::{OpcError, Result};

/// Absolute name of a part inside a package, such as `/visio/document.xml`.
///
/// Part names compare case-insensitively (ASCII), as the container format
/// requires, but keep their original spelling for serialization.
#[derive(Debug, Clone)]
pub struct PartName {
    name: String,
    key: String,
}

impl PartName {
    /// Validates and creates a part name.
    ///
    /// # Errors
    ///
    /// Returns [`OpcError::InvalidPartName`] when the name is not absolute,
    /// has empty, `.` or `..` segments, or ends with a slash.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let invalid = |reason| OpcError::InvalidPartName {
            name: name.clone(),
            reason,
        };

        let Some(rest) = name.strip_prefix('/') else {
            return Err(invalid("must start with `/`"));
        };
        if rest.is_empty() {
            return Err(invalid("must not be the package root"));
        }
        for segment in rest.split('/') {
            match segment {
                "" => return Err(invalid("contains an empty segment")),
                "." | ".." => return Err(invalid("contains a relative segment")),
                s if s.ends_with('.') => return Err(invalid("segment ends with `.`")),
                _ => {}
            }
        }

        let key = name.to_ascii_lowercase();
        Ok(Self { name, key })
    }

    /// Creates a part name from a ZIP entry name (no leading slash).
    pub fn from_zip_name(entry: &str) -> Result<Self> {
        Self::new(format!("/{entry}"))
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The ZIP entry name: the part name without its leading slash.
    pub fn zip_name(&self) -> &str {
        &self.name[1..]
    }

    /// The lower-cased extension of the last segment, if any.
    pub fn extension(&self) -> Option<String> {
        let file = self.file_name();
        let (stem, ext) = file.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// The last segment of the name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    /// Directory segments, without the file name.
    fn directory_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.zip_name().split('/').collect();
        segments.pop();
        segments
    }

    /// Name of the relationships part that belongs to this part.
    ///
    /// `/visio/document.xml` maps to `/visio/_rels/document.xml.rels`.
    pub fn relationships_part(&self) -> PartName {
        let mut segments = self.directory_segments();
        let file = format!("{}.rels", self.file_name());
        segments.push("_rels");
        segments.push(&file);
        let name = format!("/{}", segments.join("/"));
        Self {
            key: name.to_ascii_lowercase(),
            name,
        }
    }

    /// Returns `true` if this is a relationships part (`.../_rels/*.rels`).
    pub fn is_relationships_part(&self) -> bool {
        let segments = self.directory_segments();
        segments.last() == Some(&"_rels") && self.file_name().ends_with(".rels")
    }

    /// For a relationships part, the name of the part that owns it.
    ///
    /// Returns `Ok(None)` for the package-level `/_rels/.rels` part.
    pub fn relationships_owner(&self) -> Result<Option<PartName>> {
        let mut segments = self.directory_segments();
        segments.pop();
        let owner_file = self
            .file_name()
            .strip_suffix(".rels")
            .unwrap_or_else(|| self.file_name());
        if owner_file.is_empty() {
            return Ok(None);
        }
        segments.push(owner_file);
        Self::new(format!("/{}", segments.join("/"))).map(Some)
    }

    /// Resolves a relationship target written relative to this part.
    ///
    /// Absolute targets are taken as-is.
    pub fn resolve(&self, target: &str) -> Result<PartName> {
        if target.starts_with('/') {
            return PartName::new(target);
        }

        let mut segments = self.directory_segments();
        for segment in target.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(OpcError::InvalidPartName {
                            name: target.to_string(),
                            reason: "escapes the package root",
                        });
                    }
                }
                s => segments.push(s),
            }
        }
        PartName::new(format!("/{}", segments.join("/")))
    }

    /// Relative reference from a part named `source` to this part.
    ///
    /// `/visio/media/image1.png` seen from `/visio/masters/master1.xml` is
    /// `../media/image1.png`.
    pub fn relative_to(&self, source: &PartName) -> String {
        let from = source.directory_segments();
        let to: Vec<&str> = self.zip_name().split('/').collect();
        let to_dir = &to[..to.len() - 1];

        let common = from
            .iter()
            .zip(to_dir.iter())
            .take_while(|(a, b)| a.eq_ignore_ascii_case(b))
            .count();

        let mut parts: Vec<&str> = std::iter::repeat_n("..", from.len() - common).collect();
        parts.extend(&to[common..]);
        parts.join("/")
    }

    /// Relative reference from the package root, as used in `/_rels/.rels`.
    pub fn relative_to_root(&self) -> String {
        self.zip_name().to_string()
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for PartName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PartName {}

impl hash::Hash for PartName {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for PartName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PartName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PartName {
        PartName::new(s).unwrap()
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["", "visio/document.xml", "/", "/a//b", "/a/../b", "/a/./b", "/a/", "/a."] {
            assert!(PartName::new(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_case_insensitive_equality() {
        assert_eq!(name("/Visio/Document.XML"), name("/visio/document.xml"));
        assert_eq!(name("/Visio/Document.XML").as_str(), "/Visio/Document.XML");
    }

    #[test]
    fn test_extension() {
        assert_eq!(name("/media/image1.PNG").extension().as_deref(), Some("png"));
        assert_eq!(name("/media/noext").extension(), None);
        assert_eq!(name("/_rels/.rels").extension(), None);
        assert_eq!(name("/[Content_Types].xml").extension().as_deref(), Some("xml"));
    }

    #[test]
    fn test_relationships_part() {
        assert_eq!(
            name("/visio/document.xml").relationships_part().as_str(),
            "/visio/_rels/document.xml.rels"
        );
        assert_eq!(
            name("/visio/masters/master3.xml").relationships_part().as_str(),
            "/visio/masters/_rels/master3.xml.rels"
        );
    }

    #[test]
    fn test_relationships_owner() {
        let rels = name("/visio/masters/_rels/masters.xml.rels");
        assert!(rels.is_relationships_part());
        assert_eq!(
            rels.relationships_owner().unwrap(),
            Some(name("/visio/masters/masters.xml"))
        );

        assert!(name("/_rels/.rels").is_relationships_part());
        assert_eq!(name("/_rels/.rels").relationships_owner().unwrap(), None);

        assert!(!name("/visio/document.xml").is_relationships_part());
    }

    #[test]
    fn test_relative_to() {
        let master = name("/visio/masters/master1.xml");
        let masters = name("/visio/masters/masters.xml");
        let image = name("/visio/media/image1.png");
        let document = name("/visio/document.xml");

        assert_eq!(image.relative_to(&master), "../media/image1.png");
        assert_eq!(master.relative_to(&masters), "master1.xml");
        assert_eq!(masters.relative_to(&document), "masters/masters.xml");
        assert_eq!(document.relative_to_root(), "visio/document.xml");
    }

    #[test]
    fn test_resolve() {
        let master = name("/visio/masters/master1.xml");

        assert_eq!(
            master.resolve("../media/image1.png").unwrap(),
            name("/visio/media/image1.png")
        );
        assert_eq!(master.resolve("/docProps/app.xml").unwrap(), name("/docProps/app.xml"));
        assert!(master.resolve("../../../x.xml").is_err());
    }
}
