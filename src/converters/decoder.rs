//! XML import into form values
//!
//! The mirror of the encoder: the schema tree drives which elements and
//! attributes are read, so anything the schema does not declare is ignored
//! and missing optional elements leave their keys absent.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::cdata::{unwrap_cdata, CdataOverrides, CDATA_END, CDATA_START};
use super::store::ValueStore;

use crate::documents::{Document, Element};
use crate::error::ImportError;
use crate::limits::Limits;
use crate::paths::Path;
use crate::validators::{NodeKind, SchemaNode};

type Result<T> = std::result::Result<T, ImportError>;

/// Values read from a document, with the CDATA usage found in it
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    /// Field values
    pub store: ValueStore,
    /// Leaves whose CDATA wrapping differs from the schema default
    pub cdata: CdataOverrides,
}

/// Import a document into a fresh [`ValueStore`]
pub fn import_xml(schema: &SchemaNode, xml: &str) -> Result<ValueStore> {
    import_xml_detailed(schema, xml).map(|imported| imported.store)
}

/// Import a document, also reporting its CDATA usage
pub fn import_xml_detailed(schema: &SchemaNode, xml: &str) -> Result<ImportedDocument> {
    import_xml_with_limits(schema, xml, &Limits::default())
}

/// Import a document under explicit [`Limits`]
pub fn import_xml_with_limits(schema: &SchemaNode, xml: &str, limits: &Limits) -> Result<ImportedDocument> {
    debug!(bytes = xml.len(), root = %schema.name, "importing XML");
    let document = Document::parse(xml, limits)?;

    // The schema root may be wrapped in an envelope
    let root = document.root().find_descendant(&schema.name).ok_or_else(|| {
        ImportError::new(format!("no <{}> element found in the document", schema.name))
    })?;

    let mut decoder = Decoder {
        cdata: CdataOverrides::new(),
    };
    let path = schema.root_path();
    let value = decoder.node(schema, root, &path);

    let mut store = ValueStore::new();
    store.set(&path, value);

    debug!(cdata_fields = decoder.cdata.len(), "imported XML");
    Ok(ImportedDocument {
        store,
        cdata: decoder.cdata,
    })
}

struct Decoder {
    cdata: CdataOverrides,
}

impl Decoder {
    fn node(&mut self, node: &SchemaNode, element: &Element, path: &Path) -> Value {
        match &node.kind {
            NodeKind::Complex(complex) => {
                let mut map = Map::new();

                for attribute in &complex.attributes {
                    if let Some(value) = element.get_attribute(&attribute.name) {
                        map.insert(format!("@{}", attribute.name), Value::String(value.to_string()));
                    }
                }

                for child in &complex.children {
                    let child_path = path.child(&child.name);
                    if child.is_multiple() {
                        let items: Vec<Value> = element
                            .find_children(&child.name)
                            .enumerate()
                            .map(|(i, e)| self.node(child, e, &child_path.index(i)))
                            .collect();
                        if !items.is_empty() {
                            map.insert(child.name.clone(), Value::Array(items));
                        }
                    } else if let Some(e) = element.find_child(&child.name) {
                        map.insert(child.name.clone(), self.node(child, e, &child_path));
                    }
                }

                Value::Object(map)
            }
            NodeKind::Simple(_) => {
                let (text, wrapped) = leaf_text(element);
                if !text.is_empty() && wrapped != node.use_cdata() {
                    trace!(path = %path, cdata = wrapped, "CDATA usage differs from schema default");
                    self.cdata.insert(path.clone(), wrapped);
                }
                Value::String(text)
            }
        }
    }
}

/// Text of a leaf and whether it was CDATA-wrapped.
///
/// CDATA content is kept verbatim. Plain text is trimmed, and a CDATA
/// wrapper that arrived escaped as literal text is removed.
fn leaf_text(element: &Element) -> (String, bool) {
    let text = element.text.as_deref().unwrap_or_default();
    if element.has_cdata {
        return (text.to_string(), true);
    }
    let trimmed = text.trim();
    let wrapped = trimmed.starts_with(CDATA_START) && trimmed.ends_with(CDATA_END);
    (unwrap_cdata(trimmed).to_string(), wrapped)
}
