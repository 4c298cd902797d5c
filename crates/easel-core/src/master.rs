//! Stencil master identifiers and derived per-image data.
//!
//! A [`Master`] is produced for every source image that could be decoded and
//! scaled. Its [`MasterId`] is the image's position in the sorted request and
//! drives every part name and relationship ID derived from it.

use std::{
    fmt,
    num::NonZeroU32,
    path::{Path, PathBuf},
};

/// 1-based identifier of a stencil master.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MasterId(NonZeroU32);

impl MasterId {
    /// The first master identifier.
    pub const FIRST: MasterId = MasterId(NonZeroU32::MIN);

    /// Creates an identifier, returning `None` for zero.
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(Self)
    }

    /// Returns the raw numeric value.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns the identifier following this one, or `None` on overflow.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for MasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Physical size of a master shape in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSize {
    width: f64,
    height: f64,
}

impl PhysicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns `true` when both dimensions are finite.
    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// One processed stencil master.
#[derive(Debug, Clone, PartialEq)]
pub struct Master {
    id: MasterId,
    source_path: PathBuf,
    file_name: String,
    display_name: String,
    size: PhysicalSize,
    thumbnail: Option<String>,
}

impl Master {
    /// Creates a master for `source_path`.
    ///
    /// The display name is the file name without its extension.
    pub fn new(id: MasterId, source_path: impl Into<PathBuf>, size: PhysicalSize) -> Self {
        let source_path = source_path.into();
        let file_name = file_name_of(&source_path);
        let display_name = display_name_of(&source_path);

        Self {
            id,
            source_path,
            file_name,
            display_name,
            size,
            thumbnail: None,
        }
    }

    /// Attaches a base64 encoded thumbnail (builder style).
    pub fn with_thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    pub fn id(&self) -> MasterId {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// File name including the extension, as shown in the shape data.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }
}

/// Returns the file name of `path` without its extension.
pub fn display_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_id_is_one_based() {
        assert!(MasterId::new(0).is_none());
        assert_eq!(MasterId::FIRST.get(), 1);
        assert_eq!(MasterId::FIRST.next().map(MasterId::get), Some(2));
        assert_eq!(MasterId::new(u32::MAX).and_then(MasterId::next), None);
    }

    #[test]
    fn test_master_names() {
        let master = Master::new(
            MasterId::FIRST,
            "/tmp/icons/Server Rack.png",
            PhysicalSize::new(1.0, 0.5),
        );

        assert_eq!(master.display_name(), "Server Rack");
        assert_eq!(master.file_name(), "Server Rack.png");
        assert!(master.thumbnail().is_none());
    }

    #[test]
    fn test_display_name_keeps_inner_dots() {
        assert_eq!(display_name_of(Path::new("a/b/icon.v2.png")), "icon.v2");
        assert_eq!(display_name_of(Path::new("noext")), "noext");
    }

    #[test]
    fn test_physical_size_finiteness() {
        assert!(PhysicalSize::new(0.1, 0.2).is_finite());
        assert!(!PhysicalSize::new(f64::INFINITY, 0.2).is_finite());
        assert!(!PhysicalSize::new(0.1, f64::NAN).is_finite());
    }
}
