//! XSD constraining facets
//!
//! The subset of facets a form field can carry. Checks run in a fixed
//! order and report only the first violation.

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::fmt;

/// Pattern facet, matched against the whole value
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern facet.
    ///
    /// The expression is anchored at both ends, and `.` also matches line
    /// breaks so free-text fields may span several lines.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{})$", source))
            .dot_matches_new_line(true)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole value matches
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Facets declared by a `restriction`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restrictions {
    /// pattern facet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// minLength facet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// maxLength facet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// fractionDigits facet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction_digits: Option<usize>,
    /// minInclusive facet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_inclusive: Option<f64>,
    /// maxInclusive facet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_inclusive: Option<f64>,
    /// enumeration facets, in document order (exposed, never enforced)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
}

impl Restrictions {
    /// No facet declared
    pub fn is_empty(&self) -> bool {
        *self == Restrictions::default()
    }

    /// First violated facet for a non-empty `value` of field `name`.
    ///
    /// Order: pattern, minLength, maxLength, fractionDigits, minInclusive,
    /// maxInclusive.
    pub fn violation(&self, name: &str, value: &str) -> Option<String> {
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Some(format!(
                    "{} does not match the required pattern ({})",
                    name, pattern
                ));
            }
        }

        let len = value.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                return Some(format!("{} must be at least {} characters", name, min));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Some(format!("{} must be no more than {} characters", name, max));
            }
        }

        if let Some(digits) = self.fraction_digits {
            if fraction_length(value) > digits {
                return Some(format!(
                    "{} can have at most {} decimal places",
                    name, digits
                ));
            }
        }

        if self.min_inclusive.is_some() || self.max_inclusive.is_some() {
            let number = numeric_value(value);
            // NaN fails both comparisons
            if let Some(min) = self.min_inclusive {
                if !(number >= min) {
                    return Some(format!("{} must be at least {}", name, min));
                }
            }
            if let Some(max) = self.max_inclusive {
                if !(number <= max) {
                    return Some(format!("{} must be at most {}", name, max));
                }
            }
        }

        None
    }
}

/// Number of characters after the first `.`, zero without one
fn fraction_length(value: &str) -> usize {
    match value.split('.').nth(1) {
        Some(fraction) => fraction.chars().count(),
        None => 0,
    }
}

/// Numeric reading of a field value; NaN when it is not a number
fn numeric_value(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
