//! In-memory OPC package: loading, editing and sealing.

use std::{
    collections::BTreeMap,
    io::{Cursor, Read, Write},
};

use log::{debug, trace};

use crate::{
    ContentTypes, OpcError, PartName, Relationship, Relationships, Result, TargetMode,
    content_types::is_media_type,
};

/// ZIP entry holding the content type registry.
const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";

/// Name of the package-level relationships part.
const PACKAGE_RELATIONSHIPS: &str = "/_rels/.rels";

const RELS_CONTENT_TYPE: &str = "application/vnd.openxmlformats-package.relationships+xml";
const XML_CONTENT_TYPE: &str = "application/xml";

/// One part of a package: its content type, bytes and outgoing relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    content_type: String,
    data: Vec<u8>,
    relationships: Relationships,
}

impl Part {
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }
}

/// An OPC package held in memory.
///
/// Part names are unique and relationship IDs are unique per owning part.
/// Content types are registered as parts are created, and the content type
/// registry and all `.rels` parts are regenerated by [`Package::seal`].
#[derive(Debug, Clone)]
pub struct Package {
    parts: BTreeMap<PartName, Part>,
    relationships: Relationships,
    content_types: ContentTypes,
}

impl Package {
    /// Creates an empty package with the `rels` and `xml` defaults registered.
    pub fn new() -> Self {
        let mut content_types = ContentTypes::new();
        content_types.set_default("rels", RELS_CONTENT_TYPE);
        content_types.set_default("xml", XML_CONTENT_TYPE);

        Self {
            parts: BTreeMap::new(),
            relationships: Relationships::new(),
            content_types,
        }
    }

    /// Loads a package from ZIP bytes.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a ZIP archive, when `[Content_Types].xml`
    /// is missing or malformed, when a part has no content type, or when a
    /// `.rels` part is malformed or belongs to a part that does not exist.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;

        let mut content_types_xml = None;
        let mut entries = BTreeMap::new();
        for index in 0..zip.len() {
            let mut file = zip.by_index(index)?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
            file.read_to_end(&mut data)?;

            if name == CONTENT_TYPES_ENTRY {
                content_types_xml = Some(data);
            } else {
                entries.insert(PartName::from_zip_name(&name)?, data);
            }
        }

        let content_types_xml = content_types_xml
            .ok_or_else(|| OpcError::MissingPart(format!("/{CONTENT_TYPES_ENTRY}")))?;
        let content_types = ContentTypes::parse(&content_types_xml)?;

        let mut package = Self {
            parts: BTreeMap::new(),
            relationships: Relationships::new(),
            content_types,
        };

        let mut pending = Vec::new();
        for (name, data) in entries {
            if name.is_relationships_part() {
                pending.push((name, data));
                continue;
            }

            let content_type = package
                .content_types
                .content_type_of(&name)
                .ok_or_else(|| OpcError::MissingContentType(name.to_string()))?
                .to_string();
            trace!(part = name.as_str(), content_type; "Loaded part");
            package.parts.insert(
                name,
                Part {
                    content_type,
                    data,
                    relationships: Relationships::new(),
                },
            );
        }

        for (rels_name, data) in pending {
            match rels_name.relationships_owner()? {
                None => {
                    package.relationships = Relationships::parse(&data, "/")?;
                }
                Some(owner) => {
                    let relationships = Relationships::parse(&data, owner.as_str())?;
                    let part = package
                        .parts
                        .get_mut(&owner)
                        .ok_or_else(|| OpcError::MissingPart(owner.to_string()))?;
                    part.relationships = relationships;
                }
            }
        }

        debug!(parts = package.parts.len(); "Package loaded");
        Ok(package)
    }

    /// Returns the part with the given name.
    pub fn part(&self, name: &PartName) -> Option<&Part> {
        self.parts.get(name)
    }

    pub fn contains(&self, name: &PartName) -> bool {
        self.parts.contains_key(name)
    }

    /// Iterates over all part names in canonical order.
    pub fn part_names(&self) -> impl Iterator<Item = &PartName> {
        self.parts.keys()
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    /// Package-level relationships (`/_rels/.rels`).
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Creates a new part and registers its content type.
    ///
    /// # Errors
    ///
    /// Returns [`OpcError::DuplicatePart`] if the name is taken and
    /// [`OpcError::InvalidPartName`] for names reserved for relationships.
    pub fn create_part(
        &mut self,
        name: PartName,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        if self.parts.contains_key(&name) {
            return Err(OpcError::DuplicatePart(name.to_string()));
        }
        if name.is_relationships_part() {
            return Err(OpcError::InvalidPartName {
                name: name.to_string(),
                reason: "is reserved for relationships",
            });
        }

        self.content_types.register(&name, content_type);
        debug!(part = name.as_str(), content_type, bytes = data.len(); "Created part");
        self.parts.insert(
            name,
            Part {
                content_type: content_type.to_string(),
                data,
                relationships: Relationships::new(),
            },
        );
        Ok(())
    }

    /// Replaces the content of an existing part.
    pub fn set_part_data(&mut self, name: &PartName, data: Vec<u8>) -> Result<()> {
        let part = self
            .parts
            .get_mut(name)
            .ok_or_else(|| OpcError::MissingPart(name.to_string()))?;
        debug!(part = name.as_str(), bytes = data.len(); "Rewrote part");
        part.data = data;
        Ok(())
    }

    /// Adds an internal relationship from `source` to `target`.
    ///
    /// The target is stored relative to the source part. When `id` is `None`
    /// the next free `rId{n}` of the source part is used. Returns the ID.
    ///
    /// # Errors
    ///
    /// Returns [`OpcError::MissingPart`] if either part does not exist and
    /// [`OpcError::DuplicateRelationship`] if `id` is already used on `source`.
    pub fn add_relationship(
        &mut self,
        source: &PartName,
        target: &PartName,
        rel_type: &str,
        id: Option<&str>,
        target_mode: TargetMode,
    ) -> Result<String> {
        if !self.parts.contains_key(target) {
            return Err(OpcError::MissingPart(target.to_string()));
        }
        let part = self
            .parts
            .get_mut(source)
            .ok_or_else(|| OpcError::MissingPart(source.to_string()))?;

        let id = id.map_or_else(|| part.relationships.next_id(), str::to_string);
        let relationship = Relationship::new(
            id.clone(),
            rel_type,
            target.relative_to(source),
            target_mode,
        );
        part.relationships.insert(relationship, source.as_str())?;

        trace!(source = source.as_str(), target = target.as_str(), id; "Added relationship");
        Ok(id)
    }

    /// Adds a package-level relationship to `target`. Returns the ID.
    pub fn add_package_relationship(
        &mut self,
        target: &PartName,
        rel_type: &str,
        id: Option<&str>,
    ) -> Result<String> {
        if !self.parts.contains_key(target) {
            return Err(OpcError::MissingPart(target.to_string()));
        }

        let id = id.map_or_else(|| self.relationships.next_id(), str::to_string);
        let relationship = Relationship::new(
            id.clone(),
            rel_type,
            target.relative_to_root(),
            TargetMode::Internal,
        );
        self.relationships.insert(relationship, "/")?;
        Ok(id)
    }

    /// Resolves the target of an internal relationship owned by `source`.
    pub fn resolve_target(&self, source: &PartName, relationship: &Relationship) -> Result<PartName> {
        source.resolve(relationship.target())
    }

    /// Checks that every media part is typed through a matching extension default.
    ///
    /// # Errors
    ///
    /// Returns [`OpcError::MediaTypeMismatch`] for an `image/*` part without
    /// an extension, or whose extension default is missing or different.
    pub fn validate_media(&self) -> Result<()> {
        for (name, part) in &self.parts {
            if !is_media_type(&part.content_type) {
                continue;
            }

            let mismatch = |reason: String| OpcError::MediaTypeMismatch {
                part: name.to_string(),
                content_type: part.content_type.clone(),
                reason,
            };

            let Some(extension) = name.extension() else {
                return Err(mismatch("part name has no extension".to_string()));
            };
            match self.content_types.default_for(&extension) {
                Some(default) if default == part.content_type => {}
                Some(default) => {
                    return Err(mismatch(format!(
                        "extension `{extension}` is registered as `{default}`"
                    )));
                }
                None => {
                    return Err(mismatch(format!(
                        "extension `{extension}` has no registered content type"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Serializes the package to ZIP bytes, consuming it.
    ///
    /// Output is deterministic: entries are written in part-name order with
    /// fixed timestamps, so equal packages produce equal bytes.
    pub fn seal(mut self) -> Result<Vec<u8>> {
        self.validate_media()?;

        let has_relationships = !self.relationships.is_empty()
            || self.parts.values().any(|p| !p.relationships.is_empty());
        if has_relationships && self.content_types.default_for("rels").is_none() {
            self.content_types.set_default("rels", RELS_CONTENT_TYPE);
        }

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        zip.start_file(CONTENT_TYPES_ENTRY, options)?;
        zip.write_all(&self.content_types.to_xml()?)?;

        if !self.relationships.is_empty() {
            zip.start_file(&PACKAGE_RELATIONSHIPS[1..], options)?;
            zip.write_all(&self.relationships.to_xml()?)?;
        }

        for (name, part) in &self.parts {
            zip.start_file(name.zip_name(), options)?;
            zip.write_all(&part.data)?;

            if !part.relationships.is_empty() {
                let rels_name = name.relationships_part();
                zip.start_file(rels_name.zip_name(), options)?;
                zip.write_all(&part.relationships.to_xml()?)?;
            }
        }

        let cursor = zip.finish()?;
        debug!(parts = self.parts.len(); "Package sealed");
        Ok(cursor.into_inner())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}
