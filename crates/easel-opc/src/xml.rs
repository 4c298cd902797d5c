//! Structured XML writing.
//!
//! [`XmlBuilder`] wraps a `quick_xml` writer and keeps track of open elements,
//! so documents are always well formed: `end` closes the innermost open
//! element and `finish` closes whatever is still open. Attribute values and
//! text are escaped by `quick_xml`.
//!
//! # Example
//!
//! ```
//! # use easel_opc::xml::XmlBuilder;
//! let mut xml = XmlBuilder::new();
//! xml.declaration(true).unwrap();
//! xml.start("Types", &[("xmlns", "urn:example")]).unwrap();
//! xml.empty("Default", &[("Extension", "png"), ("ContentType", "image/png")]).unwrap();
//! let bytes = xml.finish().unwrap();
//!
//! let text = String::from_utf8(bytes).unwrap();
//! assert!(text.ends_with("</Types>"));
//! ```

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::Result;

/// In-memory XML document writer with element nesting checks.
pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
    open: Vec<String>,
}

impl XmlBuilder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            open: Vec::new(),
        }
    }

    /// Writes the `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub fn declaration(&mut self, standalone: bool) -> Result<&mut Self> {
        let standalone = standalone.then_some("yes");
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), standalone)))?;
        self.write(Event::Text(BytesText::new("\n")))?;
        Ok(self)
    }

    /// Opens an element.
    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<&mut Self> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write(Event::Start(element))?;
        self.open.push(name.to_string());
        Ok(self)
    }

    /// Closes the innermost open element. Does nothing when none is open.
    pub fn end(&mut self) -> Result<&mut Self> {
        if let Some(name) = self.open.pop() {
            self.write(Event::End(BytesEnd::new(name)))?;
        }
        Ok(self)
    }

    /// Writes a self-closing element.
    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<&mut Self> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.write(Event::Empty(element))?;
        Ok(self)
    }

    /// Writes escaped character data.
    pub fn text(&mut self, text: &str) -> Result<&mut Self> {
        self.write(Event::Text(BytesText::new(text)))?;
        Ok(self)
    }

    /// Writes `<name attrs>text</name>`.
    pub fn text_element(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> Result<&mut Self> {
        self.start(name, attributes)?;
        self.text(text)?;
        self.end()
    }

    /// Number of elements currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Closes all open elements and returns the document bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        while !self.open.is_empty() {
            self.end()?;
        }
        Ok(self.writer.into_inner())
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(quick_xml::Error::from)?;
        Ok(())
    }
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}
