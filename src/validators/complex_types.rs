//! Complex type definitions
//!
//! Only the shape the form engine understands is modeled: attributes
//! declared directly on the type, and an optional `sequence` of element
//! declarations. `choice`, `all`, extensions and groups are not supported.

use serde::Serialize;

use super::attributes::AttributeNode;
use super::elements::SchemaNode;

/// A complex type: attributes plus a sequence of child elements
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplexType {
    /// Attributes in declaration order
    pub attributes: Vec<AttributeNode>,
    /// Child element declarations in sequence order
    pub children: Vec<SchemaNode>,
}

impl ComplexType {
    /// Create an empty complex type
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: AttributeNode) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: SchemaNode) -> Self {
        self.children.push(child);
        self
    }

    /// Child element declaration by name
    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Attribute declaration by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Neither attributes nor children
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::SimpleType;

    #[test]
    fn test_lookup() {
        let ct = ComplexType::new()
            .with_attribute(AttributeNode::new("id"))
            .with_child(SchemaNode::simple("Name", SimpleType::default()));

        assert!(ct.child("Name").is_some());
        assert!(ct.child("Other").is_none());
        assert!(ct.attribute("id").is_some());
        assert!(!ct.is_empty());
        assert!(ComplexType::new().is_empty());
    }
}
