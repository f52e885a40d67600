//! Field paths
//!
//! A [`Path`] addresses one value in a form: element names, `@name` for
//! attributes and numeric indices into repeated elements. Its string form
//! joins segments with `.`, e.g. `Invoice.Items.Item.0.Price` or
//! `Invoice.@currency`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Child element
    Name(String),
    /// Attribute (written `@name`)
    Attr(String),
    /// Position within a repeated element
    Index(usize),
}

impl Segment {
    /// Key under which this segment is stored in an object
    pub fn key(&self) -> Option<String> {
        match self {
            Segment::Name(name) => Some(name.clone()),
            Segment::Attr(name) => Some(format!("@{}", name)),
            Segment::Index(_) => None,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => f.write_str(name),
            Segment::Attr(name) => write!(f, "@{}", name),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

impl FromStr for Segment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseError::new("empty path segment"));
        }
        if let Some(attr) = s.strip_prefix('@') {
            if attr.is_empty() {
                return Err(ParseError::new("attribute segment without a name").with_location(s));
            }
            return Ok(Segment::Attr(attr.to_string()));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            let index = s
                .parse()
                .map_err(|_| ParseError::new("path index out of range").with_location(s))?;
            return Ok(Segment::Index(index));
        }
        Ok(Segment::Name(s.to_string()))
    }
}

/// Address of a value in the form
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path(Vec<Segment>);

impl Path {
    /// Empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of a root element
    pub fn root(name: impl Into<String>) -> Self {
        Path(vec![Segment::Name(name.into())])
    }

    /// This path extended by a child element
    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with(Segment::Name(name.into()))
    }

    /// This path extended by an attribute
    pub fn attr(&self, name: impl Into<String>) -> Self {
        self.with(Segment::Attr(name.into()))
    }

    /// This path extended by an index
    pub fn index(&self, index: usize) -> Self {
        self.with(Segment::Index(index))
    }

    /// This path followed by all segments of `other`
    pub fn join(&self, other: &Path) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Path(segments)
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Path(segments)
    }

    /// Segments in order
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No segments
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Path without its last segment
    pub fn parent(&self) -> Option<Path> {
        match self.0.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Path(rest.to_vec())),
            _ => None,
        }
    }

    /// Whether `prefix` is a leading part of this path
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Path(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Path::new());
        }
        s.split('.')
            .map(Segment::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Path)
            .map_err(|e| e.with_location(s))
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_and_display() {
        let root = Path::root("Invoice");
        assert_eq!(root.to_string(), "Invoice");
        assert_eq!(root.attr("currency").to_string(), "Invoice.@currency");
        assert_eq!(
            root.child("Items").child("Item").index(0).child("Price").to_string(),
            "Invoice.Items.Item.0.Price"
        );
    }

    #[test]
    fn test_parse() {
        let path: Path = "Invoice.Items.Item.12.@code".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Name("Invoice".into()),
                Segment::Name("Items".into()),
                Segment::Name("Item".into()),
                Segment::Index(12),
                Segment::Attr("code".into()),
            ]
        );
        assert_eq!(path.to_string(), "Invoice.Items.Item.12.@code");
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!("a..b".parse::<Path>().is_err());
        assert!("a.@".parse::<Path>().is_err());
        assert!("".parse::<Path>().unwrap().is_empty());
    }

    #[test]
    fn test_parent_and_prefix() {
        let path: Path = "A.B.0".parse().unwrap();
        assert_eq!(path.parent().unwrap().to_string(), "A.B");
        assert!(Path::root("A").parent().is_none());
        assert!(path.starts_with(&Path::root("A")));
        assert!(!Path::root("A").starts_with(&path));
    }

    #[test]
    fn test_join() {
        let base: Path = "Invoice.Items.Item.3".parse().unwrap();
        let column: Path = "Details.Note".parse().unwrap();
        assert_eq!(base.join(&column).to_string(), "Invoice.Items.Item.3.Details.Note");
    }

    #[test]
    fn test_serde_as_string() {
        let path: Path = "Invoice.@currency".parse().unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"Invoice.@currency\"");
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_segment_keys() {
        assert_eq!(Segment::Name("a".into()).key().as_deref(), Some("a"));
        assert_eq!(Segment::Attr("a".into()).key().as_deref(), Some("@a"));
        assert_eq!(Segment::Index(0).key(), None);
    }
}
