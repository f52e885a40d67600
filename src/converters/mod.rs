//! Form value converters
//!
//! This module moves form values between their representations:
//! - store: the path-addressed value store itself
//! - encoder: value store to XML text
//! - decoder: XML text to value store
//! - bulk: flat table rows to and from array items
//! - cdata: CDATA wrapping and per-field overrides

mod base;
pub mod bulk;
pub mod cdata;
pub mod decoder;
pub mod encoder;
pub mod store;

pub use base::{GeneratorConfig, XML_DECLARATION};
pub use bulk::{
    cdata_columns, csv_template, expected_columns, items_to_rows, parse_csv, rows_to_items,
    write_csv, CdataColumns, Row,
};
pub use cdata::{is_cdata_enabled, unwrap_cdata, wrap_cdata, CdataOverrides};
pub use decoder::{import_xml, import_xml_detailed, import_xml_with_limits, ImportedDocument};
pub use encoder::{generate, generate_with_config};
pub use store::ValueStore;
