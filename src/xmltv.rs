//! XMLTV document model, parser and writer.
//!
//! The pipeline never interprets guide entries beyond their identity
//! attributes, so channels and programmes are carried as retained XML
//! trees ([`XmlElement`]) rather than typed records: whatever children,
//! attributes and text a source document ships survive into the merged
//! output unchanged.
//!
//! Parsing is event-driven over `quick_xml::Reader` with an element stack;
//! only the two top-level element types the pipeline cares about
//! (`channel`, `programme`) are collected, everything else at the top
//! level is dropped. The root `<tv>` attributes are kept so the writer can
//! reproduce them on the merged document.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::error::Error;
use std::io;
use tokio::fs;
use tracing::{info, instrument};

/// A retained XML element: tag name, attributes in document order,
/// optional text content and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Tag name as it appeared in the source.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Trimmed text content, if any.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an element with no text or children yet.
    pub fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            text: None,
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Resolved display name of a channel element: the text of the first
    /// `display-name` child that has non-empty content.
    pub fn display_name(&self) -> Option<&str> {
        self.children
            .iter()
            .filter(|child| child.name == "display-name")
            .find_map(|child| child.text.as_deref().filter(|text| !text.is_empty()))
    }
}

/// A parsed XMLTV document reduced to the parts the pipeline consumes.
#[derive(Debug, Clone, Default)]
pub struct EpgDocument {
    /// Attributes of the root `<tv>` element.
    pub attributes: Vec<(String, String)>,
    /// Top-level `channel` elements in document order.
    pub channels: Vec<XmlElement>,
    /// Top-level `programme` elements in document order.
    pub programmes: Vec<XmlElement>,
}

/// Parse an XMLTV document from raw bytes.
///
/// Malformed attributes and undecodable text runs are skipped rather than
/// failing the document; a structurally broken document surfaces the
/// underlying `quick_xml` error so the source can be skipped upstream.
pub fn parse_document(xml: &[u8]) -> Result<EpgDocument, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut doc = EpgDocument::default();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let element = element_from_start(&e);
                if stack.is_empty() && element.name == "tv" {
                    doc.attributes = element.attributes;
                } else {
                    stack.push(element);
                }
            }
            Event::Empty(e) => {
                let element = element_from_start(&e);
                if stack.is_empty() && element.name == "tv" {
                    doc.attributes = element.attributes;
                } else {
                    close_element(element, &mut stack, &mut doc);
                }
            }
            Event::End(_) => {
                // The stack is empty at `</tv>`; nothing to close then.
                if let Some(element) = stack.pop() {
                    close_element(element, &mut stack, &mut doc);
                }
            }
            Event::Text(e) => {
                if let Some(open) = stack.last_mut() {
                    if let Ok(text) = e.unescape() {
                        let trimmed = text.trim();
                        if !trimmed.is_empty() {
                            open.text = Some(trimmed.to_string());
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(doc)
}

/// Build an [`XmlElement`] from a start tag, keeping attribute order.
fn element_from_start(e: &BytesStart) -> XmlElement {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let attributes = e
        .attributes()
        .filter_map(Result::ok)
        .filter_map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            attr.unescape_value()
                .ok()
                .map(|value| (key, value.into_owned()))
        })
        .collect();
    XmlElement::new(name, attributes)
}

/// Route a closed element: top-level `channel`/`programme` elements go
/// into the document, nested elements attach to their parent, anything
/// else at the top level is dropped.
fn close_element(element: XmlElement, stack: &mut Vec<XmlElement>, doc: &mut EpgDocument) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else {
        match element.name.as_str() {
            "channel" => doc.channels.push(element),
            "programme" => doc.programmes.push(element),
            _ => {}
        }
    }
}

/// Serialize a merged guide to an indented XMLTV string.
///
/// The root `<tv>` element carries `attributes`; channels are written
/// before programmes, both in the order given. Output uses an XML
/// declaration and two-space indentation.
pub fn render(
    attributes: &[(String, String)],
    channels: &[XmlElement],
    programmes: &[XmlElement],
) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut tv = BytesStart::new("tv");
    for (key, value) in attributes {
        tv.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(tv))?;
    for channel in channels {
        write_element(&mut writer, channel)?;
    }
    for programme in programmes {
        write_element(&mut writer, programme)?;
    }
    writer.write_event(Event::End(BytesEnd::new("tv")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn write_element<W: io::Write>(writer: &mut Writer<W>, element: &XmlElement) -> io::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}

/// Write the merged guide document to `path`.
///
/// # Arguments
///
/// * `path` - Output file path
/// * `attributes` - Root `<tv>` attributes, copied from the first
///   successfully fetched source
/// * `channels` - Deduplicated channel elements
/// * `programmes` - Deduplicated programme elements
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_file(
    path: &str,
    attributes: &[(String, String)],
    channels: &[XmlElement],
    programmes: &[XmlElement],
) -> Result<(), Box<dyn Error>> {
    let xml = render(attributes, channels, programmes)?;
    fs::write(path, xml).await?;
    info!(
        channels = channels.len(),
        programmes = programmes.len(),
        "Wrote XMLTV file"
    );
    Ok(())
}
