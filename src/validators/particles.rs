//! Occurrence bounds of element declarations
//!
//! `minOccurs`/`maxOccurs` decide whether a form field is required and
//! whether it renders as a repeating (array-valued) section.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};

/// Occurrence bounds for an element (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// A value must be supplied (minOccurs != 0)
    pub fn is_required(&self) -> bool {
        self.min != 0
    }

    /// The element repeats (maxOccurs unbounded or greater than 1)
    pub fn is_multiple(&self) -> bool {
        match self.max {
            Some(max) => max > 1,
            None => true,
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

/// Parse minOccurs/maxOccurs from XML attribute values
pub fn parse_occurs(
    min_occurs: Option<&str>,
    max_occurs: Option<&str>,
) -> Result<Occurs, ParseError> {
    let mut occurs = Occurs::once();

    if let Some(min_str) = min_occurs {
        occurs.min = min_str.trim().parse::<u32>().map_err(|_| {
            ParseError::new(format!(
                "minOccurs value '{}' is not a valid non-negative integer",
                min_str
            ))
        })?;
    }

    match max_occurs.map(str::trim) {
        Some("unbounded") => occurs.max = None,
        Some(max_str) => {
            let max = max_str.parse::<u32>().map_err(|_| {
                ParseError::new(format!(
                    "maxOccurs value '{}' must be a non-negative integer or 'unbounded'",
                    max_str
                ))
            })?;
            if occurs.min > max {
                return Err(ParseError::new(
                    "maxOccurs must be 'unbounded' or greater than minOccurs",
                ));
            }
            occurs.max = Some(max);
        }
        None => {
            // Default maxOccurs is 1, but must be >= minOccurs
            if occurs.min > 1 {
                return Err(ParseError::new(
                    "minOccurs must be lesser or equal than maxOccurs",
                ));
            }
        }
    }

    Ok(occurs)
}
