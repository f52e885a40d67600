//! Error types for xsdform
//!
//! Schema parsing and XML import fail with [`ParseError`] and [`ImportError`].
//! Field validation never fails a call: its findings are data, see
//! [`crate::validators::ValidationErrors`].

use std::fmt;
use thiserror::Error;

/// Result type alias using xsdform Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xsdform operations
#[derive(Error, Debug)]
pub enum Error {
    /// XSD parsing error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// XML import error
    #[error("import error: {0}")]
    Import(#[from] ImportError),

    /// Limit exceeded error
    #[error(transparent)]
    Limit(#[from] LimitExceeded),

    /// A value store that is not a JSON object
    #[error("invalid value store: {0}")]
    Value(String),

    /// A path that does not address the expected field
    #[error("invalid path: {0}")]
    Path(String),

    /// Schema storage error (bad filename, unreadable directory, ...)
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored schema does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A stored schema with the target name already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// XSD parsing error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Offending element, attribute or facet
    pub location: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, " (at {})", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// XML import error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    /// Error message
    pub message: String,
    /// Byte offset in the document, when the XML reader reported one
    pub position: Option<usize>,
}

impl ImportError {
    /// Create a new import error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    /// Set the byte position
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(pos) = self.position {
            write!(f, " (at byte {})", pos)?;
        }

        Ok(())
    }
}

impl std::error::Error for ImportError {}

/// A configured [`crate::limits::Limits`] bound was exceeded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("limit exceeded: {0}")]
pub struct LimitExceeded(pub String);

impl From<LimitExceeded> for ParseError {
    fn from(err: LimitExceeded) -> Self {
        ParseError::new(err.to_string())
    }
}

impl From<LimitExceeded> for ImportError {
    fn from(err: LimitExceeded) -> Self {
        ImportError::new(err.to_string())
    }
}
