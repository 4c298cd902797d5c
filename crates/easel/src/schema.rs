//! Part names, content types, relationship types and namespaces of a Visio stencil.

use easel_core::master::MasterId;

pub mod content_type {
    pub const DOCUMENT: &str = "application/vnd.ms-visio.stencil.main+xml";
    pub const PAGES: &str = "application/vnd.ms-visio.pages+xml";
    pub const PAGE: &str = "application/vnd.ms-visio.page+xml";
    pub const WINDOWS: &str = "application/vnd.ms-visio.windows+xml";
    pub const MASTERS: &str = "application/vnd.ms-visio.masters+xml";
    pub const MASTER: &str = "application/vnd.ms-visio.master+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const PNG: &str = "image/png";
}

pub mod rel_type {
    pub const DOCUMENT: &str = "http://schemas.microsoft.com/visio/2010/relationships/document";
    pub const PAGES: &str = "http://schemas.microsoft.com/visio/2010/relationships/pages";
    pub const PAGE: &str = "http://schemas.microsoft.com/visio/2010/relationships/page";
    pub const WINDOWS: &str = "http://schemas.microsoft.com/visio/2010/relationships/windows";
    pub const MASTERS: &str = "http://schemas.microsoft.com/visio/2010/relationships/masters";
    pub const MASTER: &str = "http://schemas.microsoft.com/visio/2010/relationships/master";
    pub const IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
}

pub mod ns {
    pub const VISIO: &str = "http://schemas.microsoft.com/office/visio/2012/main";
    pub const RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
    pub const VT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";
}

pub mod part {
    use easel_core::master::MasterId;
    use easel_opc::{PartName, Result};

    pub const DOCUMENT: &str = "/visio/document.xml";
    pub const PAGES: &str = "/visio/pages/pages.xml";
    pub const PAGE_1: &str = "/visio/pages/page1.xml";
    pub const WINDOWS: &str = "/visio/windows.xml";
    pub const MASTERS: &str = "/visio/masters/masters.xml";
    pub const APP_PROPERTIES: &str = "/docProps/app.xml";
    pub const CORE_PROPERTIES: &str = "/docProps/core.xml";

    /// `/visio/masters/master{id}.xml`
    pub fn master(id: MasterId) -> Result<PartName> {
        PartName::new(format!("/visio/masters/master{id}.xml"))
    }

    /// `/visio/media/image{id}.png`
    pub fn image(id: MasterId) -> Result<PartName> {
        PartName::new(format!("/visio/media/image{id}.png"))
    }
}

/// Relationship ID of the single master → image relationship.
pub const MASTER_IMAGE_REL_ID: &str = "rId1";

/// Relationship ID of the masters index → master relationship for `id`.
pub fn master_rel_id(id: MasterId) -> String {
    format!("rId{id}")
}
