//! XML instance documents
//!
//! A small element tree built with quick-xml. Unlike a DOM text view it
//! remembers whether character data arrived in CDATA sections, which the
//! importer needs to tell CDATA-wrapped leaves apart from plain ones.

use crate::error::ImportError;
use crate::limits::Limits;
use crate::names::local_name;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

type Result<T> = std::result::Result<T, ImportError>;

/// XML Element in the document tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Local name of the element (prefix stripped)
    pub name: String,
    /// Attributes by local name, in document order
    pub attributes: IndexMap<String, String>,
    /// Concatenated character data (text and CDATA), if any
    pub text: Option<String>,
    /// Whether any of the character data came from a CDATA section
    pub has_cdata: bool,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Direct child elements with the given local name, in document order
    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |e| e.name == name)
    }

    /// First direct child element with the given local name
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.name == name)
    }

    /// First element named `name` in document order, this element included
    pub fn find_descendant(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_descendant(name))
    }

    fn push_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }
}

/// XML Document representation
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml, &Limits::default())
    }

    /// Parse an XML document, enforcing `limits` on size and depth
    pub fn parse(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.trim_text(true);

        let mut root: Option<Element> = None;
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf).map_err(|e| {
                ImportError::new(format!("invalid XML: {}", e))
                    .with_position(reader.buffer_position())
            })?;

            match event {
                Event::Start(e) => {
                    if root.is_some() && element_stack.is_empty() {
                        return Err(multiple_roots(&reader));
                    }
                    element_stack.push(Self::parse_element(&e)?);
                    limits.check_xml_depth(element_stack.len())?;
                }
                Event::End(_) => {
                    let current = element_stack.pop().ok_or_else(|| {
                        ImportError::new("unexpected closing tag")
                            .with_position(reader.buffer_position())
                    })?;
                    match element_stack.last_mut() {
                        Some(parent) => parent.children.push(current),
                        None => root = Some(current),
                    }
                }
                Event::Empty(e) => {
                    let element = Self::parse_element(&e)?;
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    match element_stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None if root.is_some() => return Err(multiple_roots(&reader)),
                        None => root = Some(element),
                    }
                }
                Event::Text(e) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = e.unescape().map_err(|e| {
                            ImportError::new(format!("failed to unescape text: {}", e))
                                .with_position(reader.buffer_position())
                        })?;
                        current.push_text(&text);
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = element_stack.last_mut() {
                        let raw = e.into_inner();
                        let text = std::str::from_utf8(&raw).map_err(|e| {
                            ImportError::new(format!("CDATA section is not UTF-8: {}", e))
                        })?;
                        current.push_text(text);
                        current.has_cdata = true;
                    }
                }
                Event::Eof => break,
                _ => {} // Declarations, comments, processing instructions, doctype
            }
            buf.clear();
        }

        if let Some(open) = element_stack.last() {
            return Err(ImportError::new(format!(
                "unexpected end of document: <{}> is not closed",
                open.name
            ))
            .with_position(xml.len()));
        }

        root.map(|root| Document { root })
            .ok_or_else(|| ImportError::new("document has no root element"))
    }

    /// Parse element from BytesStart event
    fn parse_element(start: &BytesStart) -> Result<Element> {
        let name = std::str::from_utf8(start.local_name().as_ref())
            .map_err(|e| ImportError::new(format!("invalid element name: {}", e)))?
            .to_string();

        let mut element = Element::new(name);

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| ImportError::new(format!("failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| ImportError::new(format!("invalid attribute name: {}", e)))?;

            // Namespace declarations are not modeled
            if attr_name == "xmlns" || attr_name.starts_with("xmlns:") {
                continue;
            }

            let attr_value = attr
                .unescape_value()
                .map_err(|e| ImportError::new(format!("failed to unescape attribute value: {}", e)))?
                .to_string();

            element
                .attributes
                .insert(local_name(attr_name).to_string(), attr_value);
        }

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn multiple_roots(reader: &Reader<&[u8]>) -> ImportError {
    ImportError::new("document has more than one root element").with_position(reader.buffer_position())
}
