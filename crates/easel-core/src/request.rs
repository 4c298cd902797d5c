//! The stencil request: which images go into the stencil.

use std::path::{Path, PathBuf};

/// Ordered collection of source image paths.
///
/// The order given here is not significant for ID assignment; see
/// [`crate::ordering::order_images`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StencilRequest {
    image_paths: Vec<PathBuf>,
}

impl StencilRequest {
    /// Creates a request from a list of image paths.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            image_paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Appends one image path.
    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.image_paths.push(path.into());
    }

    /// Returns the image paths in input order.
    pub fn image_paths(&self) -> &[PathBuf] {
        &self.image_paths
    }

    pub fn len(&self) -> usize {
        self.image_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_paths.is_empty()
    }
}

impl<P: AsRef<Path>> FromIterator<P> for StencilRequest {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            image_paths: iter.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }
}
