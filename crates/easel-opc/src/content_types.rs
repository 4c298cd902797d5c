//! The `[Content_Types].xml` registry.

use std::collections::BTreeMap;

use quick_xml::{Reader, events::Event};

use crate::{OpcError, PartName, Result, xml::XmlBuilder};

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type registry of a package.
///
/// A part's content type is either given by an explicit override for its
/// name, or by the default registered for its extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<PartName, String>,
}

impl ContentTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `[Content_Types].xml` document.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                    b"Default" => {
                        let mut extension = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.local_name().as_ref() {
                                b"Extension" => {
                                    extension = Some(attr.unescape_value()?.into_owned())
                                }
                                b"ContentType" => {
                                    content_type = Some(attr.unescape_value()?.into_owned())
                                }
                                _ => {}
                            }
                        }
                        let extension = extension.ok_or(OpcError::MissingAttribute {
                            element: "Default",
                            attribute: "Extension",
                        })?;
                        let content_type = content_type.ok_or(OpcError::MissingAttribute {
                            element: "Default",
                            attribute: "ContentType",
                        })?;
                        types.set_default(&extension, content_type);
                    }
                    b"Override" => {
                        let mut part_name = None;
                        let mut content_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.local_name().as_ref() {
                                b"PartName" => {
                                    part_name = Some(attr.unescape_value()?.into_owned())
                                }
                                b"ContentType" => {
                                    content_type = Some(attr.unescape_value()?.into_owned())
                                }
                                _ => {}
                            }
                        }
                        let part_name = part_name.ok_or(OpcError::MissingAttribute {
                            element: "Override",
                            attribute: "PartName",
                        })?;
                        let content_type = content_type.ok_or(OpcError::MissingAttribute {
                            element: "Override",
                            attribute: "ContentType",
                        })?;
                        types
                            .overrides
                            .insert(PartName::new(part_name)?, content_type);
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Registers the default content type for an extension.
    pub fn set_default(&mut self, extension: &str, content_type: impl Into<String>) {
        self.defaults.insert(
            extension.trim_start_matches('.').to_ascii_lowercase(),
            content_type.into(),
        );
    }

    /// Returns the default content type for an extension.
    pub fn default_for(&self, extension: &str) -> Option<&str> {
        self.defaults
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns the content type that applies to `part`.
    pub fn content_type_of(&self, part: &PartName) -> Option<&str> {
        if let Some(content_type) = self.overrides.get(part) {
            return Some(content_type);
        }
        part.extension().and_then(|ext| self.default_for(&ext))
    }

    /// Registers `content_type` for a newly created part.
    ///
    /// Nothing is recorded when the extension default already matches. Media
    /// parts (`image/*`) with an unregistered extension get a new extension
    /// default; every other part gets an override.
    pub fn register(&mut self, part: &PartName, content_type: &str) {
        let extension = part.extension();
        if let Some(ext) = extension.as_deref() {
            match self.default_for(ext) {
                Some(existing) if existing == content_type => {
                    self.overrides.remove(part);
                    return;
                }
                None if is_media_type(content_type) => {
                    self.set_default(ext, content_type);
                    self.overrides.remove(part);
                    return;
                }
                _ => {}
            }
        }
        self.overrides.insert(part.clone(), content_type.to_string());
    }

    /// Returns the explicit override for a part, if one is registered.
    pub fn override_for(&self, part: &PartName) -> Option<&str> {
        self.overrides.get(part).map(String::as_str)
    }

    /// Serializes the registry as a `[Content_Types].xml` document.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = XmlBuilder::new();
        xml.declaration(true)?;
        xml.start("Types", &[("xmlns", CONTENT_TYPES_NS)])?;
        for (extension, content_type) in &self.defaults {
            xml.empty(
                "Default",
                &[
                    ("Extension", extension.as_str()),
                    ("ContentType", content_type.as_str()),
                ],
            )?;
        }
        for (part, content_type) in &self.overrides {
            xml.empty(
                "Override",
                &[
                    ("PartName", part.as_str()),
                    ("ContentType", content_type.as_str()),
                ],
            )?;
        }
        xml.finish()
    }
}

/// Returns `true` for binary media content types such as `image/png`.
pub(crate) fn is_media_type(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="XML" ContentType="application/xml"/>
  <Override PartName="/visio/document.xml" ContentType="application/vnd.ms-visio.stencil.main+xml"/>
</Types>"#;

    fn name(s: &str) -> PartName {
        PartName::new(s).unwrap()
    }

    #[test]
    fn test_parse_defaults_and_overrides() {
        let types = ContentTypes::parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(types.default_for("xml"), Some("application/xml"));
        assert_eq!(
            types.content_type_of(&name("/visio/document.xml")),
            Some("application/vnd.ms-visio.stencil.main+xml")
        );
        assert_eq!(
            types.content_type_of(&name("/docProps/app.xml")),
            Some("application/xml")
        );
        assert_eq!(types.content_type_of(&name("/media/a.png")), None);
    }

    #[test]
    fn test_register_media_adds_default() {
        let mut types = ContentTypes::parse(SAMPLE.as_bytes()).unwrap();
        types.register(&name("/visio/media/image1.png"), "image/png");

        assert_eq!(types.default_for("png"), Some("image/png"));
        assert_eq!(types.override_for(&name("/visio/media/image1.png")), None);
    }

    #[test]
    fn test_register_xml_adds_override() {
        let mut types = ContentTypes::parse(SAMPLE.as_bytes()).unwrap();
        let master = name("/visio/masters/master1.xml");
        types.register(&master, "application/vnd.ms-visio.master+xml");

        assert_eq!(
            types.override_for(&master),
            Some("application/vnd.ms-visio.master+xml")
        );
        assert_eq!(types.default_for("xml"), Some("application/xml"));
    }

    #[test]
    fn test_register_matching_default_adds_nothing() {
        let mut types = ContentTypes::parse(SAMPLE.as_bytes()).unwrap();
        let before = types.clone();
        types.register(&name("/custom/data.xml"), "application/xml");

        assert_eq!(types, before);
    }

    #[test]
    fn test_xml_roundtrip() {
        let mut types = ContentTypes::parse(SAMPLE.as_bytes()).unwrap();
        types.register(&name("/visio/media/image1.png"), "image/png");

        let reparsed = ContentTypes::parse(&types.to_xml().unwrap()).unwrap();
        assert_eq!(reparsed, types);
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let xml = r#"<Types><Default Extension="png"/></Types>"#;
        assert!(matches!(
            ContentTypes::parse(xml.as_bytes()),
            Err(OpcError::MissingAttribute {
                element: "Default",
                attribute: "ContentType"
            })
        ));
    }
}
