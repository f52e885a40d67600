//! Limits for schema parsing and document import
//!
//! Every walk in the engine is recursive over an in-memory tree, so the only
//! protection against pathological input is bounding input size and nesting.

use crate::error::LimitExceeded;

type Result<T> = std::result::Result<T, LimitExceeded>;

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth of an imported XML document
    pub max_xml_depth: usize,

    /// Maximum size in bytes of an XSD or XML input text
    pub max_xml_size: usize,

    /// Maximum nesting depth of element declarations in a schema
    pub max_schema_depth: usize,

    /// Maximum number of element declarations in a schema
    pub max_schema_components: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 256,
            max_xml_size: 16 * 1024 * 1024, // 16 MB
            max_schema_depth: 64,
            max_schema_components: 10_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 64,
            max_xml_size: 1024 * 1024, // 1 MB
            max_schema_depth: 16,
            max_schema_components: 1_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 4096,
            max_xml_size: 512 * 1024 * 1024, // 512 MB
            max_schema_depth: 1024,
            max_schema_components: 1_000_000,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if input size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(LimitExceeded(format!(
                "input size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if schema depth is within limits
    pub fn check_schema_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_schema_depth {
            Err(LimitExceeded(format!(
                "schema depth {} exceeds maximum {}",
                depth, self.max_schema_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of element declarations is within limits
    pub fn check_schema_components(&self, count: usize) -> Result<()> {
        if count > self.max_schema_components {
            Err(LimitExceeded(format!(
                "schema element count {} exceeds maximum {}",
                count, self.max_schema_components
            )))
        } else {
            Ok(())
        }
    }
}
