//! XML name utilities
//!
//! Schema declarations name the elements and attributes the generator will
//! emit, so the parser rejects names that could not appear in a tag.

/// Check if a string is a valid XML Name
///
/// Simplified check: a letter or `_` followed by letters, digits, `_`, `-`
/// or `.`. Colons are not accepted since namespaces are not modeled.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Local part of a QName (`xs:decimal` -> `decimal`)
pub fn local_name(qname: &str) -> &str {
    split_qname(qname).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("element"));
        assert!(is_valid_name("my-element"));
        assert!(is_valid_name("my_element"));
        assert!(is_valid_name("element123"));
        assert!(is_valid_name("_element"));
        assert!(is_valid_name("Straße"));

        assert!(!is_valid_name(""));
        assert!(!is_valid_name("123element"));
        assert!(!is_valid_name("-element"));
        assert!(!is_valid_name("xs:element"));
        assert!(!is_valid_name("has space"));
    }

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("element"), (None, "element"));
        assert_eq!(split_qname("xs:element"), (Some("xs"), "element"));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("xs:decimal"), "decimal");
        assert_eq!(local_name("xsd:dateTime"), "dateTime");
        assert_eq!(local_name("string"), "string");
    }
}
