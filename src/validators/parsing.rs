//! XSD Document Parsing
//!
//! Turns schema markup into a [`SchemaNode`] tree. Only the first top-level
//! `element` is parsed; its inline `complexType` (attributes plus one
//! `sequence`) or `simpleType` (one `restriction`) decide the node kind.
//! Navigation always follows direct children, so declarations nested in
//! unsupported constructs are never picked up by accident.

use roxmltree::{Document, Node};
use tracing::{debug, trace};

use super::attributes::{AttributeNode, AttributeUse};
use super::builtins::BaseType;
use super::complex_types::ComplexType;
use super::elements::SchemaNode;
use super::facets::{Pattern, Restrictions};
use super::particles::parse_occurs;
use super::simple_types::SimpleType;

use crate::error::ParseError;
use crate::limits::Limits;
use crate::names::{is_valid_name, local_name};

type Result<T> = std::result::Result<T, ParseError>;

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const SEQUENCE: &str = "sequence";
    pub const RESTRICTION: &str = "restriction";
    // Facets
    pub const PATTERN: &str = "pattern";
    pub const ENUMERATION: &str = "enumeration";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const FRACTION_DIGITS: &str = "fractionDigits";
    pub const MIN_INCLUSIVE: &str = "minInclusive";
    pub const MAX_INCLUSIVE: &str = "maxInclusive";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const USE: &str = "use";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
}

use xsd_attrs as attrs;
use xsd_elements as elems;

/// Parse a schema with default [`Limits`]
pub fn parse_schema(xsd: &str) -> Result<SchemaNode> {
    parse_schema_with_limits(xsd, &Limits::default())
}

/// Parse a schema, bounding input size, nesting depth and declaration count
pub fn parse_schema_with_limits(xsd: &str, limits: &Limits) -> Result<SchemaNode> {
    debug!(bytes = xsd.len(), "parsing schema");
    limits.check_xml_size(xsd.len())?;

    let doc = Document::parse(xsd)
        .map_err(|e| ParseError::new(format!("schema is not well-formed XML: {}", e)))?;

    let schema = doc
        .descendants()
        .find(|n| is_xsd(n, elems::SCHEMA))
        .ok_or_else(|| ParseError::new("no schema element found"))?;

    let root = children_named(schema, elems::ELEMENT)
        .next()
        .ok_or_else(|| ParseError::new("schema declares no top-level element"))?;

    let mut parser = SchemaParser {
        limits,
        components: 0,
    };
    let node = parser.parse_element(root, "", 1)?;

    debug!(
        root = %node.name,
        components = parser.components,
        depth = node.depth(),
        "schema parsed"
    );
    Ok(node)
}

struct SchemaParser<'a> {
    limits: &'a Limits,
    components: usize,
}

impl SchemaParser<'_> {
    fn parse_element(&mut self, elem: Node, parent: &str, depth: usize) -> Result<SchemaNode> {
        let name = declared_name(elem, elems::ELEMENT, parent)?;
        let location = if parent.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent, name)
        };

        self.limits
            .check_schema_depth(depth)
            .map_err(|e| ParseError::from(e).with_location(location.as_str()))?;
        self.components += 1;
        self.limits
            .check_schema_components(self.components)
            .map_err(|e| ParseError::from(e).with_location(location.as_str()))?;

        let occurs = parse_occurs(
            elem.attribute(attrs::MIN_OCCURS),
            elem.attribute(attrs::MAX_OCCURS),
        )
        .map_err(|e| e.with_location(location.as_str()))?;

        let node = if let Some(complex) = first_child_named(elem, elems::COMPLEX_TYPE) {
            trace!(element = %location, "complex element");
            let complex_type = self.parse_complex_type(complex, &location, depth)?;
            SchemaNode::complex(name, complex_type)
        } else if let Some(restriction) = first_child_named(elem, elems::SIMPLE_TYPE)
            .and_then(|st| first_child_named(st, elems::RESTRICTION))
        {
            trace!(element = %location, "restricted simple element");
            let base_type = restriction_base(restriction);
            let restrictions = parse_restrictions(restriction, &location)?;
            SchemaNode::simple(name, SimpleType::restricted(base_type, restrictions))
        } else {
            trace!(element = %location, "simple element");
            let base_type = elem
                .attribute(attrs::TYPE)
                .map(|t| BaseType::from_local_name(local_name(t)))
                .unwrap_or_default();
            SchemaNode::simple(name, SimpleType::new(base_type))
        };

        Ok(node.with_occurs(occurs))
    }

    fn parse_complex_type(&mut self, complex: Node, location: &str, depth: usize) -> Result<ComplexType> {
        let mut complex_type = ComplexType::new();

        for attr in children_named(complex, elems::ATTRIBUTE) {
            let attribute = parse_attribute(attr, location)?;
            if complex_type.attribute(&attribute.name).is_some() {
                return Err(ParseError::new(format!(
                    "duplicate attribute '{}'",
                    attribute.name
                ))
                .with_location(location));
            }
            complex_type.attributes.push(attribute);
        }

        if let Some(sequence) = first_child_named(complex, elems::SEQUENCE) {
            for child in children_named(sequence, elems::ELEMENT) {
                let child = self.parse_element(child, location, depth + 1)?;
                if complex_type.child(&child.name).is_some() {
                    return Err(ParseError::new(format!(
                        "duplicate child element '{}'",
                        child.name
                    ))
                    .with_location(location));
                }
                complex_type.children.push(child);
            }
        }

        Ok(complex_type)
    }
}

fn parse_attribute(attr: Node, parent: &str) -> Result<AttributeNode> {
    let name = declared_name(attr, elems::ATTRIBUTE, parent)?;
    let location = format!("{}/@{}", parent, name);

    let use_mode = match attr.attribute(attrs::USE) {
        Some(value) => AttributeUse::parse(value).ok_or_else(|| {
            ParseError::new(format!("invalid attribute use '{}'", value))
                .with_location(location.as_str())
        })?,
        None => AttributeUse::Optional,
    };

    let restriction = first_child_named(attr, elems::SIMPLE_TYPE)
        .and_then(|st| first_child_named(st, elems::RESTRICTION));

    let mut attribute = AttributeNode::new(name).with_use(use_mode);
    match restriction {
        Some(restriction) => {
            attribute = attribute
                .with_base_type(restriction_base(restriction))
                .with_restrictions(parse_restrictions(restriction, &location)?);
        }
        None => {
            if let Some(type_name) = attr.attribute(attrs::TYPE) {
                attribute = attribute.with_base_type(BaseType::from_local_name(local_name(type_name)));
            }
        }
    }

    trace!(attribute = %location, "attribute");
    Ok(attribute)
}

/// Facets of a `restriction`; repeated scalar facets keep the last value
fn parse_restrictions(restriction: Node, location: &str) -> Result<Restrictions> {
    let mut restrictions = Restrictions::default();

    for facet in restriction.children().filter(Node::is_element) {
        let facet_name = facet.tag_name().name();
        let facet_location = || format!("{}/{}", location, facet_name);

        let known = matches!(
            facet_name,
            elems::PATTERN
                | elems::ENUMERATION
                | elems::MIN_LENGTH
                | elems::MAX_LENGTH
                | elems::FRACTION_DIGITS
                | elems::MIN_INCLUSIVE
                | elems::MAX_INCLUSIVE
        );
        if !known {
            trace!(facet = facet_name, "ignoring unsupported facet");
            continue;
        }

        let value = facet.attribute(attrs::VALUE).ok_or_else(|| {
            ParseError::new(format!("{} facet has no value", facet_name)).with_location(facet_location())
        })?;

        match facet_name {
            elems::PATTERN => {
                let pattern = Pattern::new(value).map_err(|e| {
                    ParseError::new(format!("invalid pattern '{}': {}", value, e))
                        .with_location(facet_location())
                })?;
                restrictions.pattern = Some(pattern);
            }
            elems::ENUMERATION => {
                restrictions
                    .enumeration
                    .get_or_insert_with(Vec::new)
                    .push(value.to_string());
            }
            elems::MIN_LENGTH => {
                restrictions.min_length = Some(parse_count(facet_name, value, &facet_location())?);
            }
            elems::MAX_LENGTH => {
                restrictions.max_length = Some(parse_count(facet_name, value, &facet_location())?);
            }
            elems::FRACTION_DIGITS => {
                restrictions.fraction_digits = Some(parse_count(facet_name, value, &facet_location())?);
            }
            elems::MIN_INCLUSIVE => {
                restrictions.min_inclusive = Some(parse_bound(facet_name, value, &facet_location())?);
            }
            elems::MAX_INCLUSIVE => {
                restrictions.max_inclusive = Some(parse_bound(facet_name, value, &facet_location())?);
            }
            _ => {}
        }
    }

    Ok(restrictions)
}

fn parse_count(facet: &str, value: &str, location: &str) -> Result<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        ParseError::new(format!(
            "{} value '{}' is not a valid non-negative integer",
            facet, value
        ))
        .with_location(location)
    })
}

fn parse_bound(facet: &str, value: &str, location: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        ParseError::new(format!("{} value '{}' is not a number", facet, value))
            .with_location(location)
    })
}

/// Local part of a restriction's `base`, `string` when absent
fn restriction_base(restriction: Node) -> BaseType {
    restriction
        .attribute(attrs::BASE)
        .map(|b| BaseType::from_local_name(local_name(b)))
        .unwrap_or_default()
}

/// The `name` of an element or attribute declaration
fn declared_name<'a>(decl: Node<'a, '_>, kind: &str, parent: &str) -> Result<&'a str> {
    let location = if parent.is_empty() { kind.to_string() } else { parent.to_string() };
    match decl.attribute(attrs::NAME) {
        Some(name) if is_valid_name(name) => Ok(name),
        Some(name) => Err(ParseError::new(format!("invalid {} name '{}'", kind, name))
            .with_location(location)),
        None if decl.has_attribute(attrs::REF) => Err(ParseError::new(format!(
            "{} references (ref=\"{}\") are not supported",
            kind,
            decl.attribute(attrs::REF).unwrap_or_default()
        ))
        .with_location(location)),
        None => Err(ParseError::new(format!("{} declaration has no name", kind)).with_location(location)),
    }
}

fn is_xsd(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn children_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| is_xsd(c, name))
}

fn first_child_named<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is_xsd(c, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::InputType;

    fn schema(body: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{}</xs:schema>"#,
            body
        )
    }

    #[test]
    fn test_simple_root() {
        let node = parse_schema(&schema(r#"<xs:element name="Note" type="xs:string"/>"#)).unwrap();
        assert_eq!(node.name, "Note");
        assert!(node.is_required());
        assert_eq!(node.as_simple().unwrap().base_type, BaseType::String);
    }

    #[test]
    fn test_complex_with_sequence_and_attributes() {
        let xsd = schema(
            r#"
            <xs:element name="Invoice">
              <xs:complexType>
                <xs:sequence>
                  <xs:element name="Number" type="xs:string"/>
                  <xs:element name="Line" minOccurs="0" maxOccurs="unbounded">
                    <xs:complexType>
                      <xs:sequence>
                        <xs:element name="Qty" type="xs:int"/>
                      </xs:sequence>
                    </xs:complexType>
                  </xs:element>
                </xs:sequence>
                <xs:attribute name="currency" type="xs:string" use="required"/>
                <xs:attribute name="lang"/>
              </xs:complexType>
            </xs:element>"#,
        );
        let node = parse_schema(&xsd).unwrap();
        let ct = node.as_complex().unwrap();

        assert_eq!(ct.attributes.len(), 2);
        assert!(ct.attributes[0].is_required());
        assert!(!ct.attributes[1].is_required());
        assert_eq!(ct.attributes[1].base_type, BaseType::String);

        let names: Vec<_> = ct.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Number", "Line"]);

        let line = ct.child("Line").unwrap();
        assert!(line.is_multiple());
        assert!(!line.is_required());
        let qty = line.as_complex().unwrap().child("Qty").unwrap();
        assert_eq!(qty.as_simple().unwrap().input_type, InputType::Number);
    }

    #[test]
    fn test_restrictions_and_cdata() {
        let xsd = schema(
            r#"
            <xs:element name="Root">
              <xs:complexType>
                <xs:sequence>
                  <xs:element name="Description">
                    <xs:simpleType>
                      <xs:restriction base="xs:string">
                        <xs:pattern value=".*[^\s].*"/>
                        <xs:minLength value="1"/>
                      </xs:restriction>
                    </xs:simpleType>
                  </xs:element>
                  <xs:element name="Price">
                    <xs:simpleType>
                      <xs:restriction base="xs:decimal">
                        <xs:fractionDigits value="2"/>
                        <xs:minInclusive value="0"/>
                        <xs:maxInclusive value="1000.5"/>
                      </xs:restriction>
                    </xs:simpleType>
                  </xs:element>
                  <xs:element name="Colour">
                    <xs:simpleType>
                      <xs:restriction base="xs:string">
                        <xs:enumeration value="red"/>
                        <xs:enumeration value="blue"/>
                      </xs:restriction>
                    </xs:simpleType>
                  </xs:element>
                </xs:sequence>
              </xs:complexType>
            </xs:element>"#,
        );
        let node = parse_schema(&xsd).unwrap();
        let ct = node.as_complex().unwrap();

        let description = ct.child("Description").unwrap();
        assert!(description.use_cdata());

        let price = ct.child("Price").unwrap().as_simple().unwrap();
        assert!(price.base_type.is_decimal());
        assert_eq!(price.restrictions.fraction_digits, Some(2));
        assert_eq!(price.restrictions.min_inclusive, Some(0.0));
        assert_eq!(price.restrictions.max_inclusive, Some(1000.5));
        assert!(!ct.child("Price").unwrap().use_cdata());

        let colour = ct.child("Colour").unwrap().as_simple().unwrap();
        assert_eq!(
            colour.restrictions.enumeration.as_deref(),
            Some(&["red".to_string(), "blue".to_string()][..])
        );
    }

    #[test]
    fn test_restricted_attribute() {
        let xsd = schema(
            r#"
            <xs:element name="Root">
              <xs:complexType>
                <xs:attribute name="code">
                  <xs:simpleType>
                    <xs:restriction base="xs:token">
                      <xs:pattern value="[A-Z]{3}"/>
                    </xs:restriction>
                  </xs:simpleType>
                </xs:attribute>
              </xs:complexType>
            </xs:element>"#,
        );
        let node = parse_schema(&xsd).unwrap();
        let attr = &node.as_complex().unwrap().attributes[0];
        assert_eq!(attr.base_type.name(), "token");
        assert_eq!(
            attr.restrictions.as_ref().unwrap().pattern.as_ref().unwrap().as_str(),
            "[A-Z]{3}"
        );
    }

    #[test]
    fn test_restricted_dates_and_booleans_are_text() {
        let xsd = schema(
            r#"
            <xs:element name="Event">
              <xs:complexType>
                <xs:sequence>
                  <xs:element name="Day">
                    <xs:simpleType>
                      <xs:restriction base="xs:date">
                        <xs:enumeration value="2024-01-01"/>
                      </xs:restriction>
                    </xs:simpleType>
                  </xs:element>
                  <xs:element name="Public">
                    <xs:simpleType>
                      <xs:restriction base="xs:boolean">
                        <xs:pattern value="true|false"/>
                      </xs:restriction>
                    </xs:simpleType>
                  </xs:element>
                  <xs:element name="Starts" type="xs:date"/>
                  <xs:element name="Open" type="xs:boolean"/>
                </xs:sequence>
              </xs:complexType>
            </xs:element>"#,
        );
        let node = parse_schema(&xsd).unwrap();
        let ct = node.as_complex().unwrap();

        for name in ["Day", "Public"] {
            let simple = ct.child(name).unwrap().as_simple().unwrap();
            assert_eq!(simple.input_type, InputType::Text, "{}", name);
            assert!(simple.is_string_like(), "{}", name);
        }
        assert_eq!(ct.child("Day").unwrap().as_simple().unwrap().base_type, BaseType::Date);
        assert_eq!(ct.child("Starts").unwrap().as_simple().unwrap().input_type, InputType::Date);
        assert_eq!(ct.child("Open").unwrap().as_simple().unwrap().input_type, InputType::Checkbox);

        let columns = crate::converters::cdata_columns(&node);
        assert_eq!(columns.eligible, ["Day", "Public"]);
        assert!(columns.defaults.is_empty());
    }

    #[test]
    fn test_first_top_level_element_is_root() {
        let xsd = schema(
            r#"<xs:complexType name="Unused"/>
               <xs:element name="First" type="xs:string"/>
               <xs:element name="Second" type="xs:string"/>"#,
        );
        assert_eq!(parse_schema(&xsd).unwrap().name, "First");
    }

    #[test]
    fn test_nested_declarations_are_not_children() {
        // an element inside a choice is not part of the direct sequence
        let xsd = schema(
            r#"
            <xs:element name="Root">
              <xs:complexType>
                <xs:sequence>
                  <xs:element name="A" type="xs:string"/>
                  <xs:choice>
                    <xs:element name="B" type="xs:string"/>
                  </xs:choice>
                </xs:sequence>
              </xs:complexType>
            </xs:element>"#,
        );
        let node = parse_schema(&xsd).unwrap();
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn test_named_type_reference_is_carried() {
        let node = parse_schema(&schema(r#"<xs:element name="Root" type="AddressType"/>"#)).unwrap();
        assert_eq!(node.as_simple().unwrap().base_type, BaseType::Other("AddressType".into()));
    }

    #[test]
    fn test_malformed_and_missing() {
        assert!(parse_schema("<xs:schema").is_err());
        assert!(parse_schema("<root/>").unwrap_err().message.contains("no schema"));
        assert!(parse_schema(&schema(""))
            .unwrap_err()
            .message
            .contains("no top-level element"));
    }

    #[test]
    fn test_bad_numbers_name_the_offender() {
        let err = parse_schema(&schema(r#"<xs:element name="R" minOccurs="x"/>"#)).unwrap_err();
        assert!(err.message.contains("minOccurs"));
        assert_eq!(err.location.as_deref(), Some("R"));

        let xsd = schema(
            r#"<xs:element name="R"><xs:simpleType><xs:restriction base="xs:string">
               <xs:maxLength value="ten"/></xs:restriction></xs:simpleType></xs:element>"#,
        );
        let err = parse_schema(&xsd).unwrap_err();
        assert!(err.message.contains("maxLength"));
        assert_eq!(err.location.as_deref(), Some("R/maxLength"));
    }

    #[test]
    fn test_invalid_pattern_and_missing_value() {
        let xsd = schema(
            r#"<xs:element name="R"><xs:simpleType><xs:restriction base="xs:string">
               <xs:pattern value="[a-"/></xs:restriction></xs:simpleType></xs:element>"#,
        );
        assert!(parse_schema(&xsd).unwrap_err().message.contains("invalid pattern"));

        let xsd = schema(
            r#"<xs:element name="R"><xs:simpleType><xs:restriction base="xs:string">
               <xs:minLength/></xs:restriction></xs:simpleType></xs:element>"#,
        );
        assert!(parse_schema(&xsd).unwrap_err().message.contains("no value"));
    }

    #[test]
    fn test_unsupported_declarations() {
        let xsd = schema(
            r#"<xs:element name="R"><xs:complexType><xs:sequence>
               <xs:element ref="Other"/></xs:sequence></xs:complexType></xs:element>"#,
        );
        assert!(parse_schema(&xsd).unwrap_err().message.contains("ref"));

        let xsd = schema(
            r#"<xs:element name="R"><xs:complexType><xs:sequence>
               <xs:element name="A"/><xs:element name="A"/></xs:sequence></xs:complexType></xs:element>"#,
        );
        assert!(parse_schema(&xsd).unwrap_err().message.contains("duplicate"));
    }

    #[test]
    fn test_depth_limit() {
        let xsd = schema(
            r#"<xs:element name="A"><xs:complexType><xs:sequence>
               <xs:element name="B"><xs:complexType><xs:sequence>
               <xs:element name="C"/>
               </xs:sequence></xs:complexType></xs:element>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let limits = Limits {
            max_schema_depth: 2,
            ..Limits::default()
        };
        let err = parse_schema_with_limits(&xsd, &limits).unwrap_err();
        assert!(err.message.contains("limit exceeded"));
        assert!(parse_schema(&xsd).is_ok());
    }
}
