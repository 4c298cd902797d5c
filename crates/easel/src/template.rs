//! The base container every stencil starts from.
//!
//! The built-in template is an empty one-page stencil: document, page,
//! windows and document-properties parts with their relationships. A
//! caller-supplied `.vssx` can be used instead.

use std::{fs, path::Path};

use easel_opc::{Package, PartName, TargetMode};
use log::debug;

use crate::{
    EaselError,
    schema::{content_type, part, rel_type},
};

/// Parts of the built-in template: name, content type, content.
const BUILTIN_PARTS: [(&str, &str, &str); 6] = [
    (
        part::DOCUMENT,
        content_type::DOCUMENT,
        include_str!("../template/visio/document.xml"),
    ),
    (
        part::PAGES,
        content_type::PAGES,
        include_str!("../template/visio/pages/pages.xml"),
    ),
    (
        part::PAGE_1,
        content_type::PAGE,
        include_str!("../template/visio/pages/page1.xml"),
    ),
    (
        part::WINDOWS,
        content_type::WINDOWS,
        include_str!("../template/visio/windows.xml"),
    ),
    (
        part::APP_PROPERTIES,
        content_type::EXTENDED_PROPERTIES,
        include_str!("../template/docProps/app.xml"),
    ),
    (
        part::CORE_PROPERTIES,
        content_type::CORE_PROPERTIES,
        include_str!("../template/docProps/core.xml"),
    ),
];

/// Parts a template must contain.
const REQUIRED_PARTS: [&str; 2] = [part::DOCUMENT, part::APP_PROPERTIES];

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplateSource {
    Builtin,
    Bytes(Vec<u8>),
}

/// Source of the container a stencil is assembled into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseTemplate {
    source: TemplateSource,
}

impl BaseTemplate {
    /// The embedded empty stencil.
    pub fn builtin() -> Self {
        Self {
            source: TemplateSource::Builtin,
        }
    }

    /// A template given as `.vssx` bytes. The bytes are validated by [`open`](Self::open).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: TemplateSource::Bytes(bytes.into()),
        }
    }

    /// Reads a `.vssx` template from disk.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::TemplateLoad`] when the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EaselError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|err| EaselError::TemplateLoad(format!("{}: {err}", path.display())))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Loads the template into a mutable package.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::TemplateLoad`] when the bytes are not a valid
    /// package or when the document or app-properties part is missing.
    pub fn open(&self) -> Result<Package, EaselError> {
        let package = match &self.source {
            TemplateSource::Builtin => builtin_package(),
            TemplateSource::Bytes(bytes) => Package::from_bytes(bytes),
        }
        .map_err(|err| EaselError::TemplateLoad(err.to_string()))?;

        for required in REQUIRED_PARTS {
            let name =
                PartName::new(required).map_err(|err| EaselError::TemplateLoad(err.to_string()))?;
            if !package.contains(&name) {
                return Err(EaselError::TemplateLoad(format!(
                    "required part `{required}` is missing"
                )));
            }
        }

        debug!(parts = package.part_names().count(); "Template opened");
        Ok(package)
    }

    /// Serializes the template as `.vssx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EaselError> {
        match &self.source {
            TemplateSource::Builtin => Ok(builtin_package()?.seal()?),
            TemplateSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

impl Default for BaseTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_package() -> easel_opc::Result<Package> {
    let mut package = Package::new();
    for (name, content_type, content) in BUILTIN_PARTS {
        package.create_part(PartName::new(name)?, content_type, content.as_bytes().to_vec())?;
    }

    let document = PartName::new(part::DOCUMENT)?;
    let pages = PartName::new(part::PAGES)?;
    let page = PartName::new(part::PAGE_1)?;
    let windows = PartName::new(part::WINDOWS)?;

    package.add_package_relationship(&document, rel_type::DOCUMENT, Some("rId1"))?;
    package.add_package_relationship(
        &PartName::new(part::CORE_PROPERTIES)?,
        rel_type::CORE_PROPERTIES,
        Some("rId2"),
    )?;
    package.add_package_relationship(
        &PartName::new(part::APP_PROPERTIES)?,
        rel_type::EXTENDED_PROPERTIES,
        Some("rId3"),
    )?;

    package.add_relationship(&document, &pages, rel_type::PAGES, Some("rId1"), TargetMode::Internal)?;
    package.add_relationship(
        &document,
        &windows,
        rel_type::WINDOWS,
        Some("rId2"),
        TargetMode::Internal,
    )?;
    package.add_relationship(&pages, &page, rel_type::PAGE, Some("rId1"), TargetMode::Internal)?;

    Ok(package)
}
