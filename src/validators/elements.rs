//! XSD element declarations
//!
//! [`SchemaNode`] is the schema model: one element declaration with its
//! occurrence bounds and either a complex or a simple type. A parsed schema
//! is a single tree rooted at the first top-level element.

use serde::Serialize;

use crate::paths::{Path, Segment};

use super::complex_types::ComplexType;
use super::particles::Occurs;
use super::simple_types::SimpleType;

/// The type of an element declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// Attributes and/or child elements
    Complex(ComplexType),
    /// A single scalar value
    Simple(SimpleType),
}

/// An element declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaNode {
    /// Element name, unique among siblings
    pub name: String,
    /// minOccurs / maxOccurs
    pub occurs: Occurs,
    /// Complex or simple content
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl SchemaNode {
    /// Create a complex element occurring exactly once
    pub fn complex(name: impl Into<String>, complex_type: ComplexType) -> Self {
        Self {
            name: name.into(),
            occurs: Occurs::once(),
            kind: NodeKind::Complex(complex_type),
        }
    }

    /// Create a simple element occurring exactly once
    pub fn simple(name: impl Into<String>, simple_type: SimpleType) -> Self {
        Self {
            name: name.into(),
            occurs: Occurs::once(),
            kind: NodeKind::Simple(simple_type),
        }
    }

    /// Set occurrence bounds
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = occurs;
        self
    }

    /// minOccurs != 0
    pub fn is_required(&self) -> bool {
        self.occurs.is_required()
    }

    /// maxOccurs unbounded or greater than one
    pub fn is_multiple(&self) -> bool {
        self.occurs.is_multiple()
    }

    /// Check if this is a complex element
    pub fn is_complex(&self) -> bool {
        matches!(self.kind, NodeKind::Complex(_))
    }

    /// The complex type, if any
    pub fn as_complex(&self) -> Option<&ComplexType> {
        match &self.kind {
            NodeKind::Complex(ct) => Some(ct),
            NodeKind::Simple(_) => None,
        }
    }

    /// The simple type, if any
    pub fn as_simple(&self) -> Option<&SimpleType> {
        match &self.kind {
            NodeKind::Simple(st) => Some(st),
            NodeKind::Complex(_) => None,
        }
    }

    /// Child declarations (empty for simple elements)
    pub fn children(&self) -> &[SchemaNode] {
        match &self.kind {
            NodeKind::Complex(ct) => &ct.children,
            NodeKind::Simple(_) => &[],
        }
    }

    /// Schema default for CDATA wrapping; always false for complex elements
    pub fn use_cdata(&self) -> bool {
        self.as_simple().map_or(false, |st| st.use_cdata)
    }

    /// Path addressing this node when it is the root
    pub fn root_path(&self) -> Path {
        Path::root(&self.name)
    }

    /// Declaration addressed by `path`, with this node as the root.
    ///
    /// Index segments are skipped, so `Invoice.Items.Item.0.Description`
    /// and `Invoice.Items.Item.Description` find the same declaration.
    /// Attribute paths do not address a declaration.
    pub fn find(&self, path: &Path) -> Option<&SchemaNode> {
        let mut segments = path.segments().iter();
        match segments.next() {
            Some(Segment::Name(name)) if *name == self.name => {}
            _ => return None,
        }

        let mut current = self;
        for segment in segments {
            match segment {
                Segment::Name(name) => current = current.as_complex()?.child(name)?,
                Segment::Index(_) => {}
                Segment::Attr(_) => return None,
            }
        }
        Some(current)
    }

    /// Number of element declarations in this subtree, self included
    pub fn component_count(&self) -> usize {
        1 + self.children().iter().map(SchemaNode::component_count).sum::<usize>()
    }

    /// Nesting depth of this subtree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(SchemaNode::depth).max().unwrap_or(0)
    }
}
