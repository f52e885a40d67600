//! Form session
//!
//! [`FormSession`] holds everything one editing session needs: the parsed
//! schema, the field values, the user's CDATA choices and the last
//! validation result. Sessions share nothing, so several may run side by
//! side over one `Arc<SchemaNode>`.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::converters::{
    bulk, generate_with_config, import_xml_with_limits, is_cdata_enabled, CdataOverrides,
    GeneratorConfig, Row, ValueStore,
};
use crate::error::{Error, ImportError, ParseError};
use crate::limits::Limits;
use crate::paths::{Path, Segment};
use crate::validators::{parse_schema_with_limits, validate, SchemaNode, ValidationErrors};

/// Why a session could not produce a document
#[derive(Error, Debug)]
pub enum FormError {
    /// The form has validation errors
    #[error("form has {} validation error(s)", .0.len())]
    Invalid(ValidationErrors),

    /// Any other failure
    #[error(transparent)]
    Error(#[from] Error),
}

/// One form editing session
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: Arc<SchemaNode>,
    values: ValueStore,
    cdata: CdataOverrides,
    errors: ValidationErrors,
    config: GeneratorConfig,
    limits: Limits,
}

impl FormSession {
    /// Start an empty session over a parsed schema
    pub fn new(schema: Arc<SchemaNode>) -> Self {
        Self {
            schema,
            values: ValueStore::new(),
            cdata: CdataOverrides::new(),
            errors: ValidationErrors::new(),
            config: GeneratorConfig::default(),
            limits: Limits::default(),
        }
    }

    /// Parse `xsd` and start an empty session over it
    pub fn from_xsd(xsd: &str) -> Result<Self, ParseError> {
        let limits = Limits::default();
        let schema = parse_schema_with_limits(xsd, &limits)?;
        Ok(Self::new(Arc::new(schema)).with_limits(limits))
    }

    /// Set the generator configuration
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the limits applied when importing documents
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The schema
    pub fn schema(&self) -> &Arc<SchemaNode> {
        &self.schema
    }

    /// Current values
    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    /// CDATA overrides set so far
    pub fn cdata_overrides(&self) -> &CdataOverrides {
        &self.cdata
    }

    /// Result of the last validation, minus fields edited since
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Replace all values
    pub fn set_values(&mut self, values: ValueStore) {
        self.values = values;
        self.errors.clear();
    }

    /// Replace all CDATA overrides
    pub fn set_cdata_overrides(&mut self, overrides: CdataOverrides) {
        self.cdata = overrides;
    }

    /// Store a field value and forget that field's validation error.
    ///
    /// Returns `false` when the path skips past the end of an array; the
    /// write is then ignored.
    pub fn set_value(&mut self, path: &Path, value: impl Into<Value>) -> bool {
        if !self.values.set(path, value.into()) {
            return false;
        }
        self.errors.shift_remove(path);
        true
    }

    /// Value of a field
    pub fn value(&self, path: &Path) -> Option<&Value> {
        self.values.get(path)
    }

    /// Append an empty item to the repeated element at `path`.
    ///
    /// Complex items start as `{}`, simple ones as `""`. Returns the new index.
    pub fn add_array_item(&mut self, path: &Path) -> Result<usize, Error> {
        let node = self.repeated_node(path)?;
        let item = if node.is_complex() {
            Value::Object(Default::default())
        } else {
            Value::String(String::new())
        };
        let index = self.values.push_array_item(path, item);
        self.errors.shift_remove(path);
        Ok(index)
    }

    /// Remove item `index` of the repeated element at `path`.
    ///
    /// Errors recorded under the array are dropped, and CDATA overrides of
    /// later items move down with them.
    pub fn remove_array_item(&mut self, path: &Path, index: usize) -> Option<Value> {
        let removed = self.values.remove_array_item(path, index)?;
        self.errors.retain(|p, _| !p.starts_with(path));
        self.cdata = std::mem::take(&mut self.cdata)
            .into_iter()
            .filter_map(|(p, enabled)| shift_item_path(p, path, index).map(|p| (p, enabled)))
            .collect();
        Some(removed)
    }

    /// Whether the field at `path` is emitted as CDATA
    pub fn is_cdata_enabled(&self, path: &Path) -> bool {
        match self.schema.find(path) {
            Some(node) => is_cdata_enabled(node, path, &self.cdata),
            None => self.cdata.get(path).copied().unwrap_or(false),
        }
    }

    /// Flip CDATA wrapping for the field at `path`; returns the new setting
    pub fn toggle_cdata(&mut self, path: &Path) -> bool {
        let enabled = !self.is_cdata_enabled(path);
        self.cdata.insert(path.clone(), enabled);
        enabled
    }

    /// Validate all values, keeping and returning the result
    pub fn validate(&mut self) -> &ValidationErrors {
        self.errors = validate(&self.schema, &self.values);
        &self.errors
    }

    /// Validate, then generate the document
    pub fn generate(&mut self) -> Result<String, FormError> {
        if !self.validate().is_empty() {
            debug!(errors = self.errors.len(), "refusing to generate an invalid form");
            return Err(FormError::Invalid(self.errors.clone()));
        }
        Ok(self.preview())
    }

    /// Generate the document without validating
    pub fn preview(&self) -> String {
        generate_with_config(&self.schema, &self.values, &self.cdata, &self.config)
    }

    /// Replace the values with those read from `xml`.
    ///
    /// On success errors are cleared and the CDATA usage found in the
    /// document is merged into the overrides. On failure nothing changes.
    pub fn import_xml(&mut self, xml: &str) -> Result<(), ImportError> {
        let imported = import_xml_with_limits(&self.schema, xml, &self.limits)?;
        self.values = imported.store;
        self.errors.clear();
        self.cdata.extend(imported.cdata);
        Ok(())
    }

    /// Replace the repeated element at `path` with items built from `rows`.
    ///
    /// Every listed CDATA column is switched on for every imported item.
    /// Returns the number of items.
    pub fn bulk_import(&mut self, path: &Path, rows: &[Row], cdata_columns: &[String]) -> Result<usize, Error> {
        let node = self.repeated_node(path)?;
        let items = bulk::rows_to_items(node, rows);
        let count = items.len();

        let mut overrides = Vec::new();
        for i in 0..count {
            for column in cdata_columns {
                let column: Path = column.parse()?;
                let field = if node.is_complex() {
                    path.index(i).join(&column)
                } else {
                    path.index(i)
                };
                overrides.push(field);
            }
        }

        self.values.set(path, Value::Array(items));
        self.errors.retain(|p, _| !p.starts_with(path));
        for field in overrides {
            self.cdata.insert(field, true);
        }

        debug!(path = %path, items = count, "bulk import");
        Ok(count)
    }

    /// Rows for the items of the repeated element at `path`
    pub fn export_rows(&self, path: &Path) -> Result<Vec<Row>, Error> {
        let node = self.repeated_node(path)?;
        Ok(bulk::items_to_rows(node, self.values.array_items(path)))
    }

    /// Drop all values, overrides and errors
    pub fn clear(&mut self) {
        self.values.clear();
        self.cdata.clear();
        self.errors.clear();
    }

    /// At least one field holds a value
    pub fn has_data(&self) -> bool {
        self.values.has_data()
    }

    fn repeated_node(&self, path: &Path) -> Result<&SchemaNode, Error> {
        match self.schema.find(path) {
            Some(node) if node.is_multiple() && !matches!(path.last(), Some(Segment::Index(_))) => Ok(node),
            Some(_) => Err(Error::Path(format!("{} is not a repeated element", path))),
            None => Err(Error::Path(format!("{} is not declared in the schema", path))),
        }
    }
}

/// Renumber `p` after item `removed` of the array at `array` was deleted.
/// Paths into the removed item are dropped.
fn shift_item_path(p: Path, array: &Path, removed: usize) -> Option<Path> {
    if !p.starts_with(array) {
        return Some(p);
    }
    match p.segments().get(array.len()) {
        Some(Segment::Index(i)) if *i == removed => None,
        Some(Segment::Index(i)) if *i > removed => {
            let mut segments = p.segments().to_vec();
            segments[array.len()] = Segment::Index(i - 1);
            Some(Path::from(segments))
        }
        _ => Some(p),
    }
}
