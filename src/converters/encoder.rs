//! XML generation from form values
//!
//! Renders the schema tree against a [`ValueStore`], one element per line.
//! Absent and empty values are left out entirely; only the root element is
//! always written.

use quick_xml::escape::escape;
use std::borrow::Cow;
use tracing::{debug, trace};

use super::base::GeneratorConfig;
use super::cdata::{is_cdata_enabled, wrap_cdata, CdataOverrides};
use super::store::{is_blank, leaf_text, ValueStore};

use crate::paths::Path;
use crate::validators::{ComplexType, NodeKind, SchemaNode};

/// Generate XML with the default [`GeneratorConfig`]
pub fn generate(schema: &SchemaNode, store: &ValueStore, overrides: &CdataOverrides) -> String {
    generate_with_config(schema, store, overrides, &GeneratorConfig::default())
}

/// Generate XML. Never fails; invalid values are rendered as they are.
pub fn generate_with_config(
    schema: &SchemaNode,
    store: &ValueStore,
    overrides: &CdataOverrides,
    config: &GeneratorConfig,
) -> String {
    let mut encoder = Encoder {
        store,
        overrides,
        config,
        out: String::new(),
    };

    if let Some(declaration) = config.declaration() {
        encoder.out.push_str(declaration);
        encoder.out.push('\n');
    }

    let path = schema.root_path();
    match &schema.kind {
        NodeKind::Complex(complex) => encoder.complex(schema, complex, &path, 0),
        NodeKind::Simple(_) => {
            let text = store.get_text(&path).unwrap_or_default();
            encoder.leaf(schema, &path, &text, 0);
        }
    }

    debug!(bytes = encoder.out.len(), root = %schema.name, "generated XML");
    encoder.out
}

struct Encoder<'a> {
    store: &'a ValueStore,
    overrides: &'a CdataOverrides,
    config: &'a GeneratorConfig,
    out: String,
}

impl Encoder<'_> {
    fn complex(&mut self, node: &SchemaNode, complex: &ComplexType, path: &Path, depth: usize) {
        trace!(path = %path, "encoding complex element");
        let mut open = format!("<{}", node.name);
        for attribute in &complex.attributes {
            let value = self.store.get(&path.attr(&attribute.name));
            if is_blank(value) {
                continue;
            }
            if let Some(text) = value.and_then(leaf_text) {
                open.push_str(&format!(" {}=\"{}\"", attribute.name, self.text(&text)));
            }
        }
        open.push('>');
        self.line(depth, &open);

        for child in &complex.children {
            let child_path = path.child(&child.name);
            if child.is_multiple() {
                let count = self.store.array_items(&child_path).len();
                for i in 0..count {
                    self.element(child, &child_path.index(i), depth + 1);
                }
            } else {
                self.element(child, &child_path, depth + 1);
            }
        }

        self.line(depth, &format!("</{}>", node.name));
    }

    /// A non-root element, omitted when its value is absent or empty
    fn element(&mut self, node: &SchemaNode, path: &Path, depth: usize) {
        let value = self.store.get(path);
        if is_blank(value) {
            return;
        }
        match &node.kind {
            NodeKind::Complex(complex) => self.complex(node, complex, path, depth),
            NodeKind::Simple(_) => {
                if let Some(text) = value.and_then(leaf_text) {
                    self.leaf(node, path, &text, depth);
                }
            }
        }
    }

    fn leaf(&mut self, node: &SchemaNode, path: &Path, text: &str, depth: usize) {
        let content = if is_cdata_enabled(node, path, self.overrides) {
            Cow::Owned(wrap_cdata(text))
        } else {
            self.text(text)
        };
        self.line(depth, &format!("<{0}>{1}</{0}>", node.name, content));
    }

    fn text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.config.escape_text() {
            escape(text)
        } else {
            Cow::Borrowed(text)
        }
    }

    fn line(&mut self, depth: usize, content: &str) {
        self.out.push_str(&" ".repeat(depth * self.config.indent()));
        self.out.push_str(content);
        self.out.push('\n');
    }
}
