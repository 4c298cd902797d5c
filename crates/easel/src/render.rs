//! XML documents of a stencil: masters, the masters index and app properties.
//!
//! Every function here is pure: it takes already-computed values and returns
//! the serialized document bytes. Element and attribute escaping is handled by
//! [`XmlBuilder`], so display names and connection formulas may contain any
//! characters.

use easel_core::{
    config::Connection,
    master::{Master, MasterId},
};
use easel_opc::{Result, xml::XmlBuilder};
use uuid::Uuid;

use crate::schema::{self, ns};

/// Fixed pin position of the master shape, in inches.
const PIN_X: &str = "3.49999985328088";
const PIN_Y: &str = "6.49999974324154";

/// Shape ID of the single foreign-image shape inside every master.
const SHAPE_ID: &str = "5";

/// Title of the single page in the app properties part.
const PAGE_TITLE: &str = "Page-1";

/// One `<Master>` element of the masters index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterEntry {
    id: MasterId,
    name: String,
    thumbnail: String,
    unique_id: String,
    base_id: String,
}

impl MasterEntry {
    /// Creates an index entry for `master` with a fresh pair of identifiers.
    ///
    /// Returns `None` when the master has no thumbnail; such masters are left
    /// out of the index.
    pub fn new(master: &Master) -> Option<Self> {
        let thumbnail = master.thumbnail()?;
        Some(Self::with_ids(
            master.id(),
            master.display_name(),
            thumbnail,
            braced_uuid(),
            braced_uuid(),
        ))
    }

    /// Creates an entry with explicit `UniqueID` and `BaseID` values.
    pub fn with_ids(
        id: MasterId,
        name: impl Into<String>,
        thumbnail: impl Into<String>,
        unique_id: impl Into<String>,
        base_id: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            thumbnail: thumbnail.into(),
            unique_id: unique_id.into(),
            base_id: base_id.into(),
        }
    }

    pub fn id(&self) -> MasterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }
}

/// A random v4 UUID in registry format, e.g. `{0f8fad5b-d9cb-469f-a165-70867728950e}`.
fn braced_uuid() -> String {
    format!("{{{}}}", Uuid::new_v4())
}

/// Renders the `Connection` section of a master shape as a standalone fragment.
///
/// An empty list still produces an (empty) section.
pub fn render_connections(connections: &[Connection]) -> Result<Vec<u8>> {
    let mut xml = XmlBuilder::new();
    write_connections(&mut xml, connections)?;
    xml.finish()
}

fn write_connections(xml: &mut XmlBuilder, connections: &[Connection]) -> Result<()> {
    xml.start("Section", &[("N", "Connection")])?;
    for connection in connections {
        xml.start("Row", &[("T", "Connection"), ("N", connection.name())])?;
        cell(xml, "X", &[("F", connection.x())])?;
        cell(xml, "Y", &[("F", connection.y())])?;
        cell(xml, "DirX", &[("V", "0")])?;
        cell(xml, "DirY", &[("V", "0")])?;
        cell(xml, "Type", &[("V", "0")])?;
        cell(xml, "AutoGen", &[("V", "0")])?;
        cell(xml, "Prompt", &[("V", ""), ("F", "No Formula")])?;
        xml.end()?;
    }
    xml.end()?;
    Ok(())
}

/// Writes `<Cell N="name" .../>`.
fn cell(xml: &mut XmlBuilder, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    let mut all = Vec::with_capacity(attributes.len() + 1);
    all.push(("N", name));
    all.extend_from_slice(attributes);
    xml.empty("Cell", &all)?;
    Ok(())
}

/// Renders the `MasterContents` document of one master.
///
/// The master holds a single foreign (bitmap) shape sized to the master's
/// physical size, whose image data is the part behind relationship `rId1`.
pub fn render_master(master: &Master, connections: &[Connection]) -> Result<Vec<u8>> {
    let width = master.size().width().to_string();
    let height = master.size().height().to_string();

    let mut xml = XmlBuilder::new();
    xml.declaration(false)?;
    xml.start(
        "MasterContents",
        &[
            ("xmlns", ns::VISIO),
            ("xmlns:r", ns::RELATIONSHIPS),
            ("xml:space", "preserve"),
        ],
    )?;
    xml.start("Shapes", &[])?;
    xml.start(
        "Shape",
        &[
            ("ID", SHAPE_ID),
            ("Type", "Foreign"),
            ("LineStyle", "2"),
            ("FillStyle", "2"),
            ("TextStyle", "2"),
        ],
    )?;

    cell(&mut xml, "PinX", &[("V", PIN_X)])?;
    cell(&mut xml, "PinY", &[("V", PIN_Y)])?;
    cell(&mut xml, "Width", &[("V", width.as_str())])?;
    cell(&mut xml, "Height", &[("V", height.as_str())])?;
    cell(&mut xml, "LocPinX", &[("F", "Width*0.5")])?;
    cell(&mut xml, "LocPinY", &[("F", "Height*0.5")])?;
    cell(&mut xml, "Angle", &[("V", "0")])?;
    cell(&mut xml, "FlipX", &[("V", "0")])?;
    cell(&mut xml, "FlipY", &[("V", "0")])?;
    cell(&mut xml, "ResizeMode", &[("V", "2")])?;
    cell(&mut xml, "ImgOffsetX", &[("V", "0"), ("F", "ImgWidth*0")])?;
    cell(&mut xml, "ImgOffsetY", &[("V", "0"), ("F", "ImgHeight*0")])?;
    cell(&mut xml, "ImgWidth", &[("F", "Width*1")])?;
    cell(&mut xml, "ImgHeight", &[("F", "Height*1")])?;
    cell(&mut xml, "ClippingPath", &[("V", ""), ("E", "#N/A")])?;
    cell(&mut xml, "EventDblClick", &[("V", "0"), ("F", "OPENTEXTWIN()")])?;
    cell(
        &mut xml,
        "TxtPinX",
        &[("V", "0.3937007874015748"), ("U", "MM"), ("F", "Width*0.5")],
    )?;
    cell(
        &mut xml,
        "TxtPinY",
        &[("V", "-0.1476377952755905"), ("U", "MM"), ("F", "Height*-0.25")],
    )?;
    cell(
        &mut xml,
        "TxtWidth",
        &[("V", "1.764904432152344"), ("F", "TEXTWIDTH(TheText)")],
    )?;
    cell(
        &mut xml,
        "TxtHeight",
        &[("V", "0.1333828247070313"), ("F", "TEXTHEIGHT(TheText,TxtWidth)")],
    )?;
    cell(&mut xml, "TxtLocPinX", &[("V", "0"), ("F", "TxtWidth*0.5")])?;
    cell(&mut xml, "TxtLocPinY", &[("V", "0"), ("F", "TxtHeight*0.5")])?;
    cell(&mut xml, "TxtAngle", &[("V", "0")])?;
    cell(&mut xml, "VerticalAlign", &[("V", "0")])?;

    xml.start("Section", &[("N", "User")])?;
    xml.start("Row", &[("N", "visAltText")])?;
    cell(&mut xml, "Value", &[("V", master.display_name()), ("U", "STR")])?;
    xml.end()?;
    xml.end()?;

    write_rectangle_geometry(&mut xml)?;

    xml.start("Section", &[("N", "Property")])?;
    xml.start("Row", &[("N", "Label")])?;
    cell(&mut xml, "Value", &[("V", master.file_name()), ("U", "STR")])?;
    cell(&mut xml, "Prompt", &[("V", master.display_name())])?;
    cell(&mut xml, "Label", &[("V", master.display_name())])?;
    cell(&mut xml, "Format", &[("V", "")])?;
    cell(&mut xml, "SortKey", &[("V", "")])?;
    cell(&mut xml, "Type", &[("V", "0")])?;
    cell(&mut xml, "Invisible", &[("V", "0")])?;
    cell(&mut xml, "Verify", &[("V", "0")])?;
    cell(&mut xml, "DataLinked", &[("V", "0")])?;
    cell(&mut xml, "LangID", &[("V", "en-US")])?;
    cell(&mut xml, "Calendar", &[("V", "0")])?;
    xml.end()?;
    xml.end()?;

    write_connections(&mut xml, connections)?;

    xml.start(
        "ForeignData",
        &[("ForeignType", "Bitmap"), ("CompressionType", "PNG")],
    )?;
    xml.empty("Rel", &[("r:id", schema::MASTER_IMAGE_REL_ID)])?;

    xml.finish()
}

/// Unit-square outline spanning the whole shape.
fn write_rectangle_geometry(xml: &mut XmlBuilder) -> Result<()> {
    const CORNERS: [(&str, &str, &str); 5] = [
        ("RelMoveTo", "0", "0"),
        ("RelLineTo", "1", "0"),
        ("RelLineTo", "1", "1"),
        ("RelLineTo", "0", "1"),
        ("RelLineTo", "0", "0"),
    ];

    xml.start("Section", &[("N", "Geometry"), ("IX", "0")])?;
    for flag in ["NoFill", "NoLine", "NoShow", "NoSnap", "NoQuickDrag"] {
        cell(xml, flag, &[("V", "0")])?;
    }
    for (index, (kind, x, y)) in CORNERS.into_iter().enumerate() {
        let ix = (index + 1).to_string();
        xml.start("Row", &[("T", kind), ("IX", ix.as_str())])?;
        cell(xml, "X", &[("V", x)])?;
        cell(xml, "Y", &[("V", y)])?;
        xml.end()?;
    }
    xml.end()?;
    Ok(())
}

/// Renders the `Masters` index document.
///
/// Each entry links to its master part through relationship `rId{id}` and
/// carries the thumbnail shown in the shapes pane.
pub fn render_masters_index(entries: &[MasterEntry]) -> Result<Vec<u8>> {
    let mut xml = XmlBuilder::new();
    xml.declaration(false)?;
    xml.start(
        "Masters",
        &[
            ("xmlns", ns::VISIO),
            ("xmlns:r", ns::RELATIONSHIPS),
            ("xml:space", "preserve"),
        ],
    )?;

    for entry in entries {
        let id = entry.id.to_string();
        let rel_id = schema::master_rel_id(entry.id);
        xml.start(
            "Master",
            &[
                ("ID", id.as_str()),
                ("NameU", entry.name.as_str()),
                ("IsCustomNameU", "1"),
                ("Name", entry.name.as_str()),
                ("IsCustomName", "1"),
                ("Prompt", ""),
                ("IconSize", "1"),
                ("AlignName", "2"),
                ("MatchByName", "0"),
                ("IconUpdate", "1"),
                ("UniqueID", entry.unique_id.as_str()),
                ("BaseID", entry.base_id.as_str()),
                ("PatternFlags", "0"),
                ("Hidden", "0"),
                ("MasterType", "2"),
            ],
        )?;
        write_page_sheet(&mut xml)?;
        xml.text_element("Icon", &[], &entry.thumbnail)?;
        xml.empty("Rel", &[("r:id", rel_id.as_str())])?;
        xml.end()?;
    }

    xml.finish()
}

/// The fixed letter-size page sheet of every master.
fn write_page_sheet(xml: &mut XmlBuilder) -> Result<()> {
    xml.start(
        "PageSheet",
        &[("LineStyle", "0"), ("FillStyle", "0"), ("TextStyle", "0")],
    )?;
    cell(xml, "PageWidth", &[("V", "8.5")])?;
    cell(xml, "PageHeight", &[("V", "11")])?;
    cell(xml, "ShdwOffsetX", &[("V", "0.125")])?;
    cell(xml, "ShdwOffsetY", &[("V", "-0.125")])?;
    cell(xml, "PageScale", &[("V", "1"), ("U", "IN_F")])?;
    cell(xml, "DrawingScale", &[("V", "1"), ("U", "IN_F")])?;
    cell(xml, "DrawingSizeType", &[("V", "0")])?;
    cell(xml, "DrawingScaleType", &[("V", "0")])?;
    cell(xml, "InhibitSnap", &[("V", "0")])?;
    cell(xml, "PageLockReplace", &[("V", "0"), ("U", "BOOL")])?;
    cell(xml, "PageLockDuplicate", &[("V", "0"), ("U", "BOOL")])?;
    cell(xml, "UIVisibility", &[("V", "0")])?;
    cell(xml, "ShdwType", &[("V", "0")])?;
    cell(xml, "ShdwObliqueAngle", &[("V", "0")])?;
    cell(xml, "ShdwScaleFactor", &[("V", "1")])?;
    cell(xml, "DrawingResizeType", &[("V", "1")])?;
    xml.end()?;
    Ok(())
}

/// Renders the extended-properties (`docProps/app.xml`) document.
///
/// `master_names` are the display names of the produced masters, in ID order.
pub fn render_app_properties<S: AsRef<str>>(master_names: &[S]) -> Result<Vec<u8>> {
    let master_count = master_names.len().to_string();
    let part_count = (master_names.len() + 1).to_string();

    let mut xml = XmlBuilder::new();
    xml.declaration(true)?;
    xml.start(
        "Properties",
        &[("xmlns", ns::EXTENDED_PROPERTIES), ("xmlns:vt", ns::VT)],
    )?;
    xml.text_element("Template", &[], "")?;
    xml.text_element("Application", &[], "Microsoft Visio")?;
    xml.text_element("ScaleCrop", &[], "false")?;

    xml.start("HeadingPairs", &[])?;
    xml.start("vt:vector", &[("size", "4"), ("baseType", "variant")])?;
    for (label, count) in [("Pages", "1"), ("Masters", master_count.as_str())] {
        xml.start("vt:variant", &[])?;
        xml.text_element("vt:lpstr", &[], label)?;
        xml.end()?;
        xml.start("vt:variant", &[])?;
        xml.text_element("vt:i4", &[], count)?;
        xml.end()?;
    }
    xml.end()?;
    xml.end()?;

    xml.start("TitlesOfParts", &[])?;
    xml.start("vt:vector", &[("size", part_count.as_str()), ("baseType", "lpstr")])?;
    xml.text_element("vt:lpstr", &[], PAGE_TITLE)?;
    for name in master_names {
        xml.text_element("vt:lpstr", &[], name.as_ref())?;
    }
    xml.end()?;
    xml.end()?;

    xml.text_element("Manager", &[], "")?;
    xml.text_element("Company", &[], "")?;
    xml.text_element("LinksUpToDate", &[], "false")?;
    xml.text_element("SharedDoc", &[], "false")?;
    xml.text_element("HyperlinkBase", &[], "")?;
    xml.text_element("HyperlinksChanged", &[], "false")?;
    xml.text_element("AppVersion", &[], "16.0000")?;

    xml.finish()
}
