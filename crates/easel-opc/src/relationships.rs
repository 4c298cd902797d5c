//! Relationship sets and their `.rels` serialization.

use std::fmt;

use quick_xml::{Reader, events::Event};

use crate::{OpcError, Result, xml::XmlBuilder};

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Whether a relationship points inside the package or to an external resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetMode::Internal => write!(f, "Internal"),
            TargetMode::External => write!(f, "External"),
        }
    }
}

/// One typed, ID-keyed edge from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    id: String,
    rel_type: String,
    target: String,
    target_mode: TargetMode,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        rel_type: impl Into<String>,
        target: impl Into<String>,
        target_mode: TargetMode,
    ) -> Self {
        Self {
            id: id.into(),
            rel_type: rel_type.into(),
            target: target.into(),
            target_mode,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn rel_type(&self) -> &str {
        &self.rel_type
    }

    /// The target reference, relative to the source part's directory.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn target_mode(&self) -> TargetMode {
        self.target_mode
    }
}

/// The relationships owned by one part, in insertion order.
///
/// IDs are unique within a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `.rels` document. `owner` is only used in error messages.
    pub fn parse(xml: &[u8], owner: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut relationships = Self::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e)
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut rel_type = None;
                    let mut target = None;
                    let mut target_mode = TargetMode::Internal;
                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = attr.unescape_value()?;
                        match attr.key.local_name().as_ref() {
                            b"Id" => id = Some(value.into_owned()),
                            b"Type" => rel_type = Some(value.into_owned()),
                            b"Target" => target = Some(value.into_owned()),
                            b"TargetMode" if value == "External" => {
                                target_mode = TargetMode::External
                            }
                            _ => {}
                        }
                    }

                    let missing = |attribute| OpcError::MissingAttribute {
                        element: "Relationship",
                        attribute,
                    };
                    let relationship = Relationship::new(
                        id.ok_or_else(|| missing("Id"))?,
                        rel_type.ok_or_else(|| missing("Type"))?,
                        target.ok_or_else(|| missing("Target"))?,
                        target_mode,
                    );
                    relationships.insert(relationship, owner)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(relationships)
    }

    /// Adds a relationship.
    ///
    /// # Errors
    ///
    /// Returns [`OpcError::DuplicateRelationship`] when the ID is taken.
    pub fn insert(&mut self, relationship: Relationship, owner: &str) -> Result<()> {
        if self.get(relationship.id()).is_some() {
            return Err(OpcError::DuplicateRelationship {
                owner: owner.to_string(),
                id: relationship.id,
            });
        }
        self.entries.push(relationship);
        Ok(())
    }

    /// Returns the relationship with the given ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Returns all relationships of the given type.
    pub fn by_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.entries.iter().filter(move |r| r.rel_type == rel_type)
    }

    /// The smallest `rId{n}` (n >= 1) not yet used in this set.
    pub fn next_id(&self) -> String {
        (1..)
            .map(|n| format!("rId{n}"))
            .find(|id| self.get(id).is_none())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the set as a `.rels` document.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlBuilder::new();
        xml.declaration(true)?;
        xml.start("Relationships", &[("xmlns", RELATIONSHIPS_NS)])?;
        for rel in &self.entries {
            let mut attributes = vec![
                ("Id", rel.id.as_str()),
                ("Type", rel.rel_type.as_str()),
                ("Target", rel.target.as_str()),
            ];
            if rel.target_mode == TargetMode::External {
                attributes.push(("TargetMode", "External"));
            }
            xml.empty("Relationship", &attributes)?;
        }
        xml.finish()
    }
}

impl<'a> IntoIterator for &'a Relationships {
    type Item = &'a Relationship;
    type IntoIter = std::slice::Iter<'a, Relationship>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
