//! Simple type definitions
//!
//! A simple element carries one scalar value. Besides its base type and
//! facets it records the presentation hints a form needs: the input type,
//! an optional placeholder and a numeric step.

use serde::Serialize;

use super::builtins::{BaseType, InputType};
use super::facets::Restrictions;

/// Pattern that, together with `minLength = 1` on a string, marks a
/// free-text field whose content is wrapped in CDATA by default
pub const CDATA_PATTERN: &str = r".*[^\s].*";

/// Placeholder shown for fields whose pattern looks like a custom date format
pub const DATE_PLACEHOLDER: &str = "DD-MM-YYYY";

/// A simple (leaf) type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleType {
    /// Base type local name
    pub base_type: BaseType,
    /// Restriction facets
    #[serde(skip_serializing_if = "Restrictions::is_empty")]
    pub restrictions: Restrictions,
    /// Content is wrapped in CDATA unless overridden
    pub use_cdata: bool,
    /// Input hint for a form renderer
    pub input_type: InputType,
}

impl SimpleType {
    /// Simple type referenced by a bare `type` attribute; the input type
    /// follows the base type
    pub fn new(base_type: BaseType) -> Self {
        let input_type = InputType::for_base_type(&base_type);
        Self {
            base_type,
            restrictions: Restrictions::default(),
            use_cdata: false,
            input_type,
        }
    }

    /// Simple type declared through an inline restriction.
    ///
    /// Only the integer and decimal families get a numeric input; every
    /// other restricted base, dates and booleans included, is edited as text.
    pub fn restricted(base_type: BaseType, restrictions: Restrictions) -> Self {
        let use_cdata = base_type.is_string()
            && restrictions.min_length == Some(1)
            && restrictions
                .pattern
                .as_ref()
                .map_or(false, |p| p.as_str() == CDATA_PATTERN);

        let input_type = if base_type.is_integer() || base_type.is_decimal() {
            InputType::Number
        } else {
            InputType::Text
        };

        Self {
            base_type,
            restrictions,
            use_cdata,
            input_type,
        }
    }

    /// Placeholder hint, set for custom date patterns on text inputs
    pub fn placeholder(&self) -> Option<&'static str> {
        if self.input_type == InputType::Text && is_date_like_pattern(&self.restrictions) {
            Some(DATE_PLACEHOLDER)
        } else {
            None
        }
    }

    /// Step hint for numeric inputs.
    ///
    /// `1` for integers; for decimals one unit in the last permitted
    /// fraction digit, `0.01` when `fractionDigits` is absent or zero.
    pub fn step(&self) -> Option<String> {
        match &self.base_type {
            BaseType::Integer(_) => Some("1".to_string()),
            BaseType::Decimal(_) => Some(match self.restrictions.fraction_digits {
                Some(digits) if digits > 0 => format!("0.{}1", "0".repeat(digits - 1)),
                _ => "0.01".to_string(),
            }),
            _ => None,
        }
    }

    /// Free-text field: eligible for CDATA wrapping
    pub fn is_string_like(&self) -> bool {
        self.base_type.is_string() || self.input_type == InputType::Text
    }
}

impl Default for SimpleType {
    fn default() -> Self {
        Self::new(BaseType::String)
    }
}

fn is_date_like_pattern(restrictions: &Restrictions) -> bool {
    restrictions
        .pattern
        .as_ref()
        .map_or(false, |p| p.as_str().contains("[0-9]") && p.as_str().contains('-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::facets::Pattern;

    fn with_pattern(pattern: &str, min_length: Option<usize>) -> Restrictions {
        Restrictions {
            pattern: Some(Pattern::new(pattern).unwrap()),
            min_length,
            ..Default::default()
        }
    }

    #[test]
    fn test_cdata_heuristic() {
        let st = SimpleType::restricted(BaseType::String, with_pattern(CDATA_PATTERN, Some(1)));
        assert!(st.use_cdata);
        assert!(st.is_string_like());
    }

    #[test]
    fn test_cdata_heuristic_is_exact() {
        // missing minLength
        let st = SimpleType::restricted(BaseType::String, with_pattern(CDATA_PATTERN, None));
        assert!(!st.use_cdata);

        // minLength other than 1
        let st = SimpleType::restricted(BaseType::String, with_pattern(CDATA_PATTERN, Some(2)));
        assert!(!st.use_cdata);

        // a different pattern
        let st = SimpleType::restricted(BaseType::String, with_pattern(r".+", Some(1)));
        assert!(!st.use_cdata);

        // not a string
        let st = SimpleType::restricted(
            BaseType::Other("token".into()),
            with_pattern(CDATA_PATTERN, Some(1)),
        );
        assert!(!st.use_cdata);
    }

    #[test]
    fn test_input_types() {
        assert_eq!(SimpleType::new(BaseType::from_local_name("int")).input_type, InputType::Number);
        assert_eq!(SimpleType::new(BaseType::Date).input_type, InputType::Date);
        assert_eq!(SimpleType::new(BaseType::Boolean).input_type, InputType::Checkbox);
        assert_eq!(SimpleType::default().input_type, InputType::Text);
    }

    #[test]
    fn test_date_pattern_forces_text() {
        let st = SimpleType::restricted(
            BaseType::Date,
            with_pattern("[0-9]{2}-[0-9]{2}-[0-9]{4}", None),
        );
        assert_eq!(st.input_type, InputType::Text);
        assert_eq!(st.placeholder(), Some(DATE_PLACEHOLDER));
        assert!(st.is_string_like());

        // numeric base types stay numeric
        let st = SimpleType::restricted(
            BaseType::from_local_name("integer"),
            with_pattern("-?[0-9]+", None),
        );
        assert_eq!(st.input_type, InputType::Number);
        assert_eq!(st.placeholder(), None);
    }

    #[test]
    fn test_restricted_non_numeric_bases_are_text() {
        for base in [BaseType::Date, BaseType::DateTime, BaseType::Boolean] {
            let st = SimpleType::restricted(base.clone(), Restrictions::default());
            assert_eq!(st.input_type, InputType::Text, "{:?}", base);
            assert!(st.is_string_like());
            assert_eq!(st.placeholder(), None);

            // the bare type keeps its specific input
            assert_ne!(SimpleType::new(base).input_type, InputType::Text);
        }

        let st = SimpleType::restricted(BaseType::from_local_name("short"), Restrictions::default());
        assert_eq!(st.input_type, InputType::Number);
        assert!(!st.is_string_like());
    }

    #[test]
    fn test_step() {
        assert_eq!(SimpleType::new(BaseType::from_local_name("long")).step().as_deref(), Some("1"));
        assert_eq!(SimpleType::new(BaseType::from_local_name("decimal")).step().as_deref(), Some("0.01"));

        let three = Restrictions {
            fraction_digits: Some(3),
            ..Default::default()
        };
        let st = SimpleType::restricted(BaseType::from_local_name("decimal"), three);
        assert_eq!(st.step().as_deref(), Some("0.001"));

        assert_eq!(SimpleType::default().step(), None);
    }
}
