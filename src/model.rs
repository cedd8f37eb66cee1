//! Owned, mutable MusicXML document tree.
//!
//! The parser keeps every element, attribute and comment in document
//! order so the writer can emit the score again with only the edited
//! fields changed. Whitespace-only text between elements is not kept;
//! the writer re-indents.

/// A parsed `score-partwise` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// DOCTYPE body as it appeared in the source, without `<!DOCTYPE` and `>`
    pub doctype: Option<String>,
    /// The `<score-partwise>` element
    pub root: Element,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    Comment(String),
}

/// An element with its attributes and children in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name (e.g., "note", "xlink:href")
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

/// Address of a note inside a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteLoc {
    /// Index among the root's `<part>` elements
    pub part: usize,
    /// Index among the part's `<measure>` elements
    pub measure: usize,
    /// Index into the measure's `children` (all nodes, not only elements)
    pub child: usize,
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_element_named(&self, name: &str) -> bool {
        matches!(self, XmlNode::Element(e) if e.name == name)
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// `<name>text</name>`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: vec![XmlNode::Text(text.into())],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((name.to_string(), value.to_string())),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(XmlNode::as_element_mut)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> {
        self.elements_mut().filter(move |e| e.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Position of the first child element called `name` in `children`.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|n| n.is_element_named(name))
    }

    /// Text of the first text child.
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|n| match n {
            XmlNode::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// Trimmed text of the first child element called `name`.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text()).map(str::trim)
    }

    /// Replace all text content with `text`.
    pub fn set_text(&mut self, text: &str) {
        self.children.retain(|n| !matches!(n, XmlNode::Text(_)));
        self.children.insert(0, XmlNode::Text(text.to_string()));
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(XmlNode::Element(child));
    }

    /// Insert `child` before the first existing child whose name is in
    /// `following`, or append it when none is present. Used to keep the
    /// element order MusicXML's schema expects.
    pub fn insert_before_any(&mut self, child: Element, following: &[&str]) -> usize {
        let at = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if following.contains(&e.name.as_str())))
            .unwrap_or(self.children.len());
        self.children.insert(at, XmlNode::Element(child));
        at
    }

    /// Remove every child element called `name`; returns how many were removed.
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|n| !n.is_element_named(name));
        before - self.children.len()
    }

    pub fn element_at(&self, index: usize) -> Option<&Element> {
        self.children.get(index).and_then(XmlNode::as_element)
    }

    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.children.get_mut(index).and_then(XmlNode::as_element_mut)
    }

    /// Every descendant element called `name`, depth first in document order.
    pub fn descendants_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.name == name {
                out.push(child);
            }
            child.descendants_named(name, out);
        }
    }
}

impl Document {
    pub fn parts(&self) -> impl Iterator<Item = &Element> {
        self.root.children_named("part")
    }

    pub fn parts_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.root.children_named_mut("part")
    }

    pub fn part(&self, index: usize) -> Option<&Element> {
        self.parts().nth(index)
    }

    pub fn measure_mut(&mut self, part: usize, measure: usize) -> Option<&mut Element> {
        self.parts_mut()
            .nth(part)
            .and_then(|p| p.children_named_mut("measure").nth(measure))
    }

    pub fn note_mut(&mut self, loc: NoteLoc) -> Option<&mut Element> {
        self.measure_mut(loc.part, loc.measure)
            .and_then(|m| m.element_at_mut(loc.child))
            .filter(|e| e.name == "note")
    }

    /// Every `<note>` of every measure, in score order.
    pub fn notes(&self) -> impl Iterator<Item = &Element> {
        self.parts()
            .flat_map(|p| p.children_named("measure"))
            .flat_map(|m| m.children_named("note"))
    }

    pub fn notes_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.parts_mut()
            .flat_map(|p| p.children_named_mut("measure"))
            .flat_map(|m| m.children_named_mut("note"))
    }

    /// Every `<measure>` of every part, in score order.
    pub fn measures_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.parts_mut()
            .flat_map(|p| p.children_named_mut("measure"))
    }

    /// Number of measures in the first part.
    pub fn measure_count(&self) -> usize {
        self.parts()
            .next()
            .map_or(0, |p| p.children_named("measure").count())
    }
}

/// The `<measure>` elements of a part.
pub fn measures(part: &Element) -> impl Iterator<Item = &Element> {
    part.children_named("measure")
}
