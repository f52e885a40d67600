//! CDATA wrapping and per-field overrides

use indexmap::IndexMap;

use crate::paths::Path;
use crate::validators::SchemaNode;

/// Opening marker of a CDATA section
pub const CDATA_START: &str = "<![CDATA[";
/// Closing marker of a CDATA section
pub const CDATA_END: &str = "]]>";

/// User choices overriding a field's schema default for CDATA wrapping
pub type CdataOverrides = IndexMap<Path, bool>;

/// Whether the field at `path`, declared by `node`, is emitted as CDATA.
///
/// An override wins; otherwise the declaration's `use_cdata` default applies.
pub fn is_cdata_enabled(node: &SchemaNode, path: &Path, overrides: &CdataOverrides) -> bool {
    overrides.get(path).copied().unwrap_or_else(|| node.use_cdata())
}

/// Wrap `text` in a CDATA section.
///
/// A literal `]]>` in the content is split across two sections so the
/// output stays well-formed.
pub fn wrap_cdata(text: &str) -> String {
    let body = text.replace(CDATA_END, "]]]]><![CDATA[>");
    format!("{}{}{}", CDATA_START, body, CDATA_END)
}

/// Content of a `<![CDATA[...]]>` wrapper, or the text unchanged
pub fn unwrap_cdata(text: &str) -> &str {
    text.strip_prefix(CDATA_START)
        .and_then(|rest| rest.strip_suffix(CDATA_END))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{BaseType, Pattern, Restrictions, SimpleType, CDATA_PATTERN};

    #[test]
    fn test_wrap_unwrap() {
        assert_eq!(wrap_cdata("a < b"), "<![CDATA[a < b]]>");
        assert_eq!(unwrap_cdata("<![CDATA[a < b]]>"), "a < b");
        assert_eq!(unwrap_cdata("plain"), "plain");
        assert_eq!(unwrap_cdata("<![CDATA[unterminated"), "<![CDATA[unterminated");
        assert_eq!(unwrap_cdata(&wrap_cdata("")), "");
    }

    #[test]
    fn test_wrap_splits_terminator() {
        assert_eq!(wrap_cdata("x]]>y"), "<![CDATA[x]]]]><![CDATA[>y]]>");
    }

    #[test]
    fn test_override_wins() {
        let restrictions = Restrictions {
            pattern: Some(Pattern::new(CDATA_PATTERN).unwrap()),
            min_length: Some(1),
            ..Default::default()
        };
        let note = SchemaNode::simple("Note", SimpleType::restricted(BaseType::String, restrictions));
        let plain = SchemaNode::simple("Name", SimpleType::default());
        let path = Path::root("R").child("Note");

        let mut overrides = CdataOverrides::new();
        assert!(is_cdata_enabled(&note, &path, &overrides));
        assert!(!is_cdata_enabled(&plain, &path, &overrides));

        overrides.insert(path.clone(), false);
        assert!(!is_cdata_enabled(&note, &path, &overrides));

        overrides.insert(path.clone(), true);
        assert!(is_cdata_enabled(&plain, &path, &overrides));
    }
}
