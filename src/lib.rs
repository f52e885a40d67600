//! # xsdform
//!
//! Turns a restricted XSD subset into an editable form model and maps form
//! values to and from XML.
//!
//! ## Features
//!
//! - XSD parsing into a tree of element, attribute and restriction nodes
//! - Path-addressed value store for form fields, repeated items included
//! - Field validation against required flags and simple type restrictions
//! - XML generation with per-field CDATA control
//! - XML import back into a value store
//! - Bulk fill of repeated elements from CSV rows
//! - Directory storage for saved schemas
//! - Protection against oversized and deeply nested input
//!
//! ## Example
//!
//! ```rust,ignore
//! use xsdform::{FormSession, Path};
//!
//! let mut session = FormSession::from_xsd(&std::fs::read_to_string("invoice.xsd")?)?;
//!
//! session.set_value(&"Invoice.@id".parse::<Path>()?, "INV-1");
//! session.set_value(&"Invoice.Total".parse::<Path>()?, "10.50");
//!
//! // Fails with the validation errors if any field is invalid
//! let xml = session.generate()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod paths;
pub mod documents;

// Schema model and validation
pub mod validators;

// Value conversion
pub mod converters;

// Editing and persistence
pub mod session;
pub mod storage;

// Re-exports for convenience
pub use converters::{generate, import_xml, CdataOverrides, GeneratorConfig, ValueStore};
pub use error::{Error, ImportError, ParseError, Result};
pub use limits::Limits;
pub use paths::{Path, Segment};
pub use session::{FormError, FormSession};
pub use storage::{DirectoryStorage, SchemaEntry, SchemaStorage};
pub use validators::{parse_schema, validate, SchemaNode, ValidationErrors};

/// Version of the xsdform library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
