//! XSD attribute declarations

use serde::Serialize;

use super::builtins::BaseType;
use super::facets::Restrictions;

/// Attribute use mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeUse {
    /// Attribute is optional (default)
    #[default]
    Optional,
    /// Attribute is required
    Required,
    /// Attribute is prohibited
    Prohibited,
}

impl AttributeUse {
    /// Parse from string value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "optional" => Some(AttributeUse::Optional),
            "required" => Some(AttributeUse::Required),
            "prohibited" => Some(AttributeUse::Prohibited),
            _ => None,
        }
    }
}

/// An attribute declared directly on a complex type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeNode {
    /// Attribute name
    pub name: String,
    /// Base type local name
    pub base_type: BaseType,
    /// How the attribute may be used
    #[serde(rename = "use")]
    pub use_mode: AttributeUse,
    /// Facets of a nested `simpleType/restriction`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Restrictions>,
}

impl AttributeNode {
    /// Create an optional, unrestricted string attribute
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: BaseType::String,
            use_mode: AttributeUse::Optional,
            restrictions: None,
        }
    }

    /// Set the base type
    pub fn with_base_type(mut self, base_type: BaseType) -> Self {
        self.base_type = base_type;
        self
    }

    /// Set the use mode
    pub fn with_use(mut self, use_mode: AttributeUse) -> Self {
        self.use_mode = use_mode;
        self
    }

    /// Set restrictions
    pub fn with_restrictions(mut self, restrictions: Restrictions) -> Self {
        self.restrictions = Some(restrictions);
        self
    }

    /// `use="required"`
    pub fn is_required(&self) -> bool {
        self.use_mode == AttributeUse::Required
    }
}
