//! MusicXML writer: serializes the document tree back to XML text.
//!
//! Output always starts with a UTF-8 XML declaration followed by the
//! source DOCTYPE (if any). Elements are indented by two spaces; text
//! content stays on the same line as its element.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::ScoreError;
use crate::model::{Document, Element, XmlNode};

/// Serialize a document to a MusicXML string.
pub fn to_xml_string(doc: &Document) -> Result<String, ScoreError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    if let Some(ref doctype) = doc.doctype {
        emit(&mut writer, Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
    }
    write_element(&mut writer, &doc.root)?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|e| ScoreError::Serialize(e.to_string()))?;
    xml.push('\n');
    Ok(xml)
}

/// Serialize a document and write it to `path`.
pub fn save_file<P: AsRef<Path>>(doc: &Document, path: P) -> Result<(), ScoreError> {
    let path = path.as_ref();
    let xml = to_xml_string(doc)?;
    std::fs::write(path, xml).map_err(|source| ScoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), ScoreError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => emit(writer, Event::Text(BytesText::new(t)))?,
            XmlNode::Comment(c) => emit(writer, Event::Comment(BytesText::from_escaped(c.as_str())))?,
        }
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ScoreError> {
    writer
        .write_event(event)
        .map_err(|e| ScoreError::Serialize(e.to_string()))
}
