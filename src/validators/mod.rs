//! XML Schema model, parser and form validation
//!
//! The model covers the XSD subset a generated form can represent: one root
//! element, inline complex types with attributes and a sequence, and simple
//! types with a single restriction.

pub mod attributes;
pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod facets;
pub mod parsing;
pub mod particles;
pub mod simple_types;
pub mod validation;

// Re-exports
pub use attributes::{AttributeNode, AttributeUse};
pub use builtins::{BaseType, InputType};
pub use complex_types::ComplexType;
pub use elements::{NodeKind, SchemaNode};
pub use facets::{Pattern, Restrictions};
pub use parsing::{parse_schema, parse_schema_with_limits};
pub use particles::{parse_occurs, Occurs};
pub use simple_types::{SimpleType, CDATA_PATTERN, DATE_PLACEHOLDER};
pub use validation::{validate, ValidationErrors};
