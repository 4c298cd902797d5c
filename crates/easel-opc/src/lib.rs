//! Open Packaging Conventions (OPC) containers for Easel.
//!
//! An OPC package is a ZIP archive of named parts. Each part has a content
//! type, registered in `[Content_Types].xml`, and an optional set of typed
//! relationships to other parts, stored in a sibling `_rels/*.rels` part.
//!
//! This crate keeps the whole package in memory:
//!
//! - [`PartName`]: validated absolute part names and relative target math
//! - [`ContentTypes`]: extension defaults and per-part overrides
//! - [`Relationships`]: the relationship set of one part (or of the package)
//! - [`Package`]: load from bytes, mutate, then [`Package::seal`] back to bytes
//! - [`xml`]: a small structured XML writer shared by the serializers
//!
//! # Example
//!
//! ```
//! # use easel_opc::{Package, PartName, TargetMode};
//! let mut package = Package::new();
//! let doc = PartName::new("/doc/main.xml").unwrap();
//! let img = PartName::new("/media/image1.png").unwrap();
//!
//! package.create_part(doc.clone(), "application/xml", b"<main/>".to_vec()).unwrap();
//! package.create_part(img.clone(), "image/png", vec![0x89]).unwrap();
//! package
//!     .add_relationship(&doc, &img, "urn:example:image", Some("rId1"), TargetMode::Internal)
//!     .unwrap();
//!
//! let bytes = package.seal().unwrap();
//! let reloaded = Package::from_bytes(&bytes).unwrap();
//! assert_eq!(reloaded.part(&doc).unwrap().relationships().len(), 1);
//! ```

pub mod xml;

mod content_types;
mod error;
mod package;
mod part_name;
mod relationships;

pub use content_types::ContentTypes;
pub use error::{OpcError, Result};
pub use package::{Package, Part};
pub use part_name::PartName;
pub use relationships::{Relationship, Relationships, TargetMode};
