//! MusicXML parser: converts MusicXML text into the owned document tree.

use roxmltree::{Document as XmlDocument, Node};

use crate::error::ScoreError;
use crate::model::{Document, Element, XmlNode};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse a MusicXML XML string into a Document.
pub fn parse_musicxml(xml: &str) -> Result<Document, ScoreError> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = XmlDocument::parse_with_options(xml, options)?;
    let root = doc.root_element();

    // Verify this is a score-partwise document
    if root.tag_name().name() != "score-partwise" {
        return Err(ScoreError::UnsupportedRoot(
            root.tag_name().name().to_string(),
        ));
    }

    let mut element = convert_element(&root);
    declare_namespaces(&root, &mut element);

    Ok(Document {
        doctype: extract_doctype(xml),
        root: element,
    })
}

// ─── Tree conversion ─────────────────────────────────────────────────

fn convert_element(node: &Node) -> Element {
    let mut element = Element::new(qualified_name(node, node.tag_name().namespace(), node.tag_name().name()));

    for attr in node.attributes() {
        element
            .attributes
            .push((qualified_name(node, attr.namespace(), attr.name()), attr.value().to_string()));
    }

    for child in node.children() {
        if child.is_element() {
            element.children.push(XmlNode::Element(convert_element(&child)));
        } else if child.is_text() {
            let text = child.text().unwrap_or("");
            if !text.trim().is_empty() {
                element.children.push(XmlNode::Text(text.to_string()));
            }
        } else if child.is_comment() {
            element
                .children
                .push(XmlNode::Comment(child.text().unwrap_or("").to_string()));
        }
    }

    element
}

fn qualified_name(node: &Node, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NAMESPACE) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}:{local}"),
        _ => local.to_string(),
    }
}

/// roxmltree resolves namespace declarations instead of reporting them as
/// attributes; put them back on the root so prefixed names stay valid.
fn declare_namespaces(node: &Node, element: &mut Element) {
    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        element.set_attribute(&name, ns.uri());
    }
}

/// Body of the `<!DOCTYPE …>` declaration, which roxmltree does not keep.
fn extract_doctype(xml: &str) -> Option<String> {
    let start = xml.find("<!DOCTYPE")? + "<!DOCTYPE".len();
    let rest = &xml[start..];

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in rest.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, '>') if depth == 0 => return Some(rest[..i].trim().to_string()),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SMALL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="3.1">
  <!-- generated -->
  <part-list><score-part id="P1"><part-name>Piano</part-name></score-part></part-list>
  <part id="P1">
    <measure number="1">
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>4</duration></note>
    </measure>
  </part>
</score-partwise>"#;

    #[test]
    fn parses_tree_and_doctype() {
        let doc = parse_musicxml(SMALL).unwrap();
        assert_eq!(
            doc.doctype.as_deref(),
            Some(r#"score-partwise PUBLIC "-//Recordare//DTD MusicXML 3.1 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd""#)
        );
        assert_eq!(doc.root.attribute("version"), Some("3.1"));
        assert!(matches!(doc.root.children[0], XmlNode::Comment(ref c) if c == " generated "));
        assert_eq!(doc.parts().count(), 1);
        assert_eq!(doc.notes().count(), 1);

        let note = doc.notes().next().unwrap();
        assert_eq!(note.child_text("duration"), Some("4"));
    }

    #[test]
    fn rejects_timewise_scores() {
        let err = parse_musicxml("<score-timewise/>").unwrap_err();
        assert!(matches!(err, ScoreError::UnsupportedRoot(ref r) if r == "score-timewise"));
    }

    #[test]
    fn keeps_prefixed_attributes() {
        let xml = r#"<score-partwise xmlns:xlink="http://www.w3.org/1999/xlink"><credit><credit-image xlink:href="a.png"/></credit></score-partwise>"#;
        let doc = parse_musicxml(xml).unwrap();
        assert_eq!(
            doc.root.attribute("xmlns:xlink"),
            Some("http://www.w3.org/1999/xlink")
        );
        let image = doc.root.child("credit").and_then(|c| c.child("credit-image")).unwrap();
        assert_eq!(image.attribute("xlink:href"), Some("a.png"));
    }

    #[test]
    fn doctype_with_internal_subset() {
        let xml = r#"<!DOCTYPE score-partwise [ <!ENTITY a "x>"> ]><score-partwise/>"#;
        assert_eq!(
            extract_doctype(xml).as_deref(),
            Some(r#"score-partwise [ <!ENTITY a "x>"> ]"#)
        );
        assert_eq!(extract_doctype("<score-partwise/>"), None);
    }
}
