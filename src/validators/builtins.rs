//! XSD built-in types
//!
//! Only the distinctions that change form behavior are modeled: the integer
//! and decimal families (shape checks, numeric inputs), dates, booleans and
//! strings. Any other built-in or user type name is carried through as
//! [`BaseType::Other`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

// Type names - String types
/// XSD string type name
pub const XSD_STRING: &str = "string";
/// XSD boolean type name
pub const XSD_BOOLEAN: &str = "boolean";
/// XSD date type name
pub const XSD_DATE: &str = "date";
/// XSD dateTime type name
pub const XSD_DATETIME: &str = "dateTime";

/// Integer family: xs:integer and the built-ins derived from it
pub const XSD_INTEGER_TYPES: &[&str] = &[
    "integer",
    "int",
    "long",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "nonPositiveInteger",
    "negativeInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
];

/// Decimal family
pub const XSD_DECIMAL_TYPES: &[&str] = &["decimal", "float", "double"];

static INTEGER_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());

static DECIMAL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]*\.?[0-9]*$").unwrap());

/// Base type of a simple element or attribute, by local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// xs:string
    String,
    /// xs:boolean
    Boolean,
    /// xs:date
    Date,
    /// xs:dateTime
    DateTime,
    /// A member of the integer family (local name kept)
    Integer(String),
    /// A member of the decimal family (local name kept)
    Decimal(String),
    /// Any other type name, carried unchanged
    Other(String),
}

impl BaseType {
    /// Classify a type's local name (`decimal`, not `xs:decimal`)
    pub fn from_local_name(name: &str) -> Self {
        match name {
            XSD_STRING => BaseType::String,
            XSD_BOOLEAN => BaseType::Boolean,
            XSD_DATE => BaseType::Date,
            XSD_DATETIME => BaseType::DateTime,
            n if XSD_INTEGER_TYPES.contains(&n) => BaseType::Integer(n.to_string()),
            n if XSD_DECIMAL_TYPES.contains(&n) => BaseType::Decimal(n.to_string()),
            n => BaseType::Other(n.to_string()),
        }
    }

    /// The type's local name
    pub fn name(&self) -> &str {
        match self {
            BaseType::String => XSD_STRING,
            BaseType::Boolean => XSD_BOOLEAN,
            BaseType::Date => XSD_DATE,
            BaseType::DateTime => XSD_DATETIME,
            BaseType::Integer(n) | BaseType::Decimal(n) | BaseType::Other(n) => n,
        }
    }

    /// xs:string exactly
    pub fn is_string(&self) -> bool {
        matches!(self, BaseType::String)
    }

    /// Member of the integer family
    pub fn is_integer(&self) -> bool {
        matches!(self, BaseType::Integer(_))
    }

    /// Member of the decimal family
    pub fn is_decimal(&self) -> bool {
        matches!(self, BaseType::Decimal(_))
    }

    /// Lexical shape check for the numeric families.
    ///
    /// Integers must look like `-?[0-9]+`, decimals like `-?[0-9]*.?[0-9]*`.
    /// Every other type accepts any text.
    pub fn matches_shape(&self, value: &str) -> bool {
        match self {
            BaseType::Integer(_) => INTEGER_SHAPE.is_match(value),
            BaseType::Decimal(_) => DECIMAL_SHAPE.is_match(value),
            _ => true,
        }
    }
}

impl Default for BaseType {
    fn default() -> Self {
        BaseType::String
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for BaseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Presentational input hint for a simple field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputType {
    /// Numeric input
    #[serde(rename = "number")]
    Number,
    /// Calendar date
    #[serde(rename = "date")]
    Date,
    /// Date and local time
    #[serde(rename = "datetime-local")]
    DateTimeLocal,
    /// Boolean toggle
    #[serde(rename = "checkbox")]
    Checkbox,
    /// Free text
    #[serde(rename = "text")]
    Text,
}

impl InputType {
    /// Input type implied by a base type
    pub fn for_base_type(base: &BaseType) -> Self {
        match base {
            BaseType::Integer(_) | BaseType::Decimal(_) => InputType::Number,
            BaseType::Date => InputType::Date,
            BaseType::DateTime => InputType::DateTimeLocal,
            BaseType::Boolean => InputType::Checkbox,
            BaseType::String | BaseType::Other(_) => InputType::Text,
        }
    }

    /// The HTML input type attribute value
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Number => "number",
            InputType::Date => "date",
            InputType::DateTimeLocal => "datetime-local",
            InputType::Checkbox => "checkbox",
            InputType::Text => "text",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
