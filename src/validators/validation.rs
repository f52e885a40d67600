//! Form validation
//!
//! Walks the schema tree alongside the value store and collects one message
//! per offending path. Validation never fails; an empty map means the form
//! can be generated.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::builtins::BaseType;
use super::elements::{NodeKind, SchemaNode};
use super::facets::Restrictions;

use crate::converters::store::{is_blank, leaf_text};
use crate::converters::ValueStore;
use crate::paths::Path;

/// Validation messages by path, in tree walk order
pub type ValidationErrors = IndexMap<Path, String>;

/// Validate `store` against `schema`
pub fn validate(schema: &SchemaNode, store: &ValueStore) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    validate_node(schema, &schema.root_path(), store, &mut errors);
    debug!(errors = errors.len(), "validated form");
    errors
}

fn validate_node(node: &SchemaNode, path: &Path, store: &ValueStore, errors: &mut ValidationErrors) {
    match &node.kind {
        NodeKind::Complex(complex) => {
            for attribute in &complex.attributes {
                let leaf = Leaf {
                    name: &attribute.name,
                    required: attribute.is_required(),
                    base_type: &attribute.base_type,
                    restrictions: attribute.restrictions.as_ref(),
                };
                leaf.check(&path.attr(&attribute.name), store, errors);
            }

            for child in &complex.children {
                let child_path = path.child(&child.name);
                if child.is_multiple() {
                    let count = store.array_items(&child_path).len();
                    if count == 0 {
                        if child.is_required() {
                            errors.insert(child_path, format!("At least one {} is required", child.name));
                        }
                        continue;
                    }
                    for i in 0..count {
                        validate_node(child, &child_path.index(i), store, errors);
                    }
                } else {
                    validate_node(child, &child_path, store, errors);
                }
            }
        }
        NodeKind::Simple(simple) => {
            let leaf = Leaf {
                name: &node.name,
                required: node.is_required(),
                base_type: &simple.base_type,
                restrictions: Some(&simple.restrictions),
            };
            leaf.check(path, store, errors);
        }
    }
}

/// What leaf validation needs from an element or attribute declaration
struct Leaf<'a> {
    name: &'a str,
    required: bool,
    base_type: &'a BaseType,
    restrictions: Option<&'a Restrictions>,
}

impl Leaf<'_> {
    fn check(&self, path: &Path, store: &ValueStore, errors: &mut ValidationErrors) {
        if let Some(message) = self.message(store.get(path)) {
            errors.insert(path.clone(), message);
        }
    }

    fn message(&self, value: Option<&Value>) -> Option<String> {
        if is_blank(value) {
            return self.required.then(|| format!("{} is required", self.name));
        }
        let text = match value.and_then(leaf_text) {
            Some(text) => text,
            None => return Some(format!("{} must be a single value", self.name)),
        };

        if let Some(message) = self.restrictions.and_then(|r| r.violation(self.name, &text)) {
            return Some(message);
        }

        if !self.base_type.matches_shape(&text) {
            return Some(if self.base_type.is_integer() {
                format!("{} must be an integer", self.name)
            } else {
                format!("{} must be a decimal number", self.name)
            });
        }

        None
    }
}
