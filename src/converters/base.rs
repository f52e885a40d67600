//! Base converter types
//!
//! Configuration shared by the XML encoder.

/// XML declaration emitted before the root element by default
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Configuration for the XML generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Spaces per nesting level
    indent: usize,
    /// Declaration line, if any
    declaration: Option<String>,
    /// Whether to escape markup characters in text and attribute values
    escape_text: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: Some(XML_DECLARATION.to_string()),
            escape_text: false,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get indentation width
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Get the declaration line
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    /// Check if text is escaped
    pub fn escape_text(&self) -> bool {
        self.escape_text
    }

    /// Set indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the declaration line; `None` omits it
    pub fn with_declaration(mut self, declaration: Option<String>) -> Self {
        self.declaration = declaration;
        self
    }

    /// Escape `<`, `&` and quotes outside CDATA sections.
    ///
    /// Off by default: generated text is emitted exactly as stored.
    pub fn with_escape_text(mut self, escape: bool) -> Self {
        self.escape_text = escape;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_config_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.indent(), 2);
        assert_eq!(config.declaration(), Some(XML_DECLARATION));
        assert!(!config.escape_text());
    }

    #[test]
    fn test_generator_config_builder() {
        let config = GeneratorConfig::new()
            .with_indent(4)
            .with_declaration(None)
            .with_escape_text(true);
        assert_eq!(config.indent(), 4);
        assert!(config.declaration().is_none());
        assert!(config.escape_text());
    }
}
