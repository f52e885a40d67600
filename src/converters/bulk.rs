//! Flat rows for repeated elements
//!
//! A repeated element can be filled from a table: each row maps dotted
//! column paths (relative to one item, `@name` for attributes) to text.
//! Only non-repeated descendants get columns; nested arrays are left to the
//! form.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::store::{leaf_text, ValueStore};

use crate::error::ImportError;
use crate::paths::Path;
use crate::validators::{NodeKind, SchemaNode};

/// One table row: column path to cell text
pub type Row = IndexMap<String, String>;

/// Name of the row number column added on export
pub const ROW_NUMBER_COLUMN: &str = "#";

/// Columns of an item of `node`.
///
/// Attributes come first as `@name`, then non-repeated children in order,
/// complex children flattened with dotted prefixes. A simple item is a
/// single column named after the element.
pub fn expected_columns(node: &SchemaNode) -> Vec<String> {
    let mut columns = Vec::new();
    match &node.kind {
        NodeKind::Complex(_) => collect_columns(node, "", &mut columns),
        NodeKind::Simple(_) => columns.push(node.name.clone()),
    }
    columns
}

fn collect_columns(node: &SchemaNode, prefix: &str, columns: &mut Vec<String>) {
    let Some(complex) = node.as_complex() else {
        return;
    };
    for attribute in &complex.attributes {
        columns.push(join(prefix, &format!("@{}", attribute.name)));
    }
    for child in complex.children.iter().filter(|c| !c.is_multiple()) {
        let column = join(prefix, &child.name);
        if child.is_complex() {
            collect_columns(child, &column, columns);
        } else {
            columns.push(column);
        }
    }
}

/// Columns that may be CDATA-wrapped, and those wrapped by default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CdataColumns {
    /// String-like leaf columns
    pub eligible: Vec<String>,
    /// Eligible columns whose declaration defaults to CDATA
    pub defaults: Vec<String>,
}

/// CDATA-eligible columns of an item of `node`
pub fn cdata_columns(node: &SchemaNode) -> CdataColumns {
    let mut columns = CdataColumns::default();
    match &node.kind {
        NodeKind::Complex(_) => collect_cdata_columns(node, "", &mut columns),
        NodeKind::Simple(_) => push_cdata_column(node, node.name.clone(), &mut columns),
    }
    columns
}

fn collect_cdata_columns(node: &SchemaNode, prefix: &str, columns: &mut CdataColumns) {
    for child in node.children().iter().filter(|c| !c.is_multiple()) {
        let column = join(prefix, &child.name);
        if child.is_complex() {
            collect_cdata_columns(child, &column, columns);
        } else {
            push_cdata_column(child, column, columns);
        }
    }
}

fn push_cdata_column(node: &SchemaNode, column: String, columns: &mut CdataColumns) {
    let Some(simple) = node.as_simple() else {
        return;
    };
    if !simple.is_string_like() {
        return;
    }
    if simple.use_cdata {
        columns.defaults.push(column.clone());
    }
    columns.eligible.push(column);
}

/// Convert rows into array items for `node`.
///
/// Only expected columns are read, and empty cells are skipped. Columns
/// the schema does not know are reported once and ignored.
pub fn rows_to_items(node: &SchemaNode, rows: &[Row]) -> Vec<Value> {
    let expected = expected_columns(node);

    if let Some(first) = rows.first() {
        for column in first.keys().filter(|c| !expected.contains(c) && *c != ROW_NUMBER_COLUMN) {
            warn!(column = %column, element = %node.name, "ignoring unknown column");
        }
    }

    rows.iter()
        .map(|row| match &node.kind {
            NodeKind::Simple(_) => Value::String(row.get(&node.name).cloned().unwrap_or_default()),
            NodeKind::Complex(_) => {
                let mut item = ValueStore::new();
                for column in &expected {
                    let Some(cell) = row.get(column).filter(|v| !v.is_empty()) else {
                        continue;
                    };
                    match column.parse::<Path>() {
                        Ok(path) => {
                            item.set(&path, Value::String(cell.clone()));
                        }
                        Err(e) => warn!(column = %column, error = %e, "skipping column"),
                    }
                }
                item.into_json()
            }
        })
        .collect()
}

/// Flatten array items into rows for export.
///
/// Each row starts with a 1-based `#` column. Nested objects are flattened
/// with dotted keys; nested arrays are skipped.
pub fn items_to_rows(node: &SchemaNode, items: &[Value]) -> Vec<Row> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut row = Row::new();
            row.insert(ROW_NUMBER_COLUMN.to_string(), (i + 1).to_string());
            match item {
                Value::Object(map) => flatten(map, "", &mut row),
                other => {
                    let text = leaf_text(other).map(|t| t.into_owned()).unwrap_or_default();
                    row.insert(node.name.clone(), text);
                }
            }
            row
        })
        .collect()
}

fn flatten(map: &Map<String, Value>, prefix: &str, row: &mut Row) {
    for (key, value) in map {
        let column = join(prefix, key);
        match value {
            Value::Object(nested) => flatten(nested, &column, row),
            Value::Array(_) => {}
            other => {
                let text = leaf_text(other).map(|t| t.into_owned()).unwrap_or_default();
                row.insert(column, text);
            }
        }
    }
}

/// CSV text with the header row and one empty row, for filling in
pub fn csv_template(node: &SchemaNode) -> String {
    let columns = expected_columns(node);
    let empty = vec![""; columns.len()];
    format!("{}\n{}\n", columns.join(","), empty.join(","))
}

/// Read comma-separated text with a header row.
///
/// Quoted cells may contain commas, doubled quotes and line breaks; cells
/// are trimmed and missing trailing cells read as empty. Blank lines are
/// skipped.
pub fn parse_csv(text: &str) -> Result<Vec<Row>, ImportError> {
    let mut records = split_records(text)?
        .into_iter()
        .filter(|record| record.iter().any(|cell| !cell.is_empty()));

    let headers = records
        .next()
        .ok_or_else(|| ImportError::new("CSV has no header row"))?;

    let rows: Vec<Row> = records
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| (header.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect();

    if rows.is_empty() {
        return Err(ImportError::new("CSV needs a header row and at least one data row"));
    }
    Ok(rows)
}

fn split_records(text: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => quoted = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' => quoted = true,
            ',' => record.push(std::mem::take(&mut cell).trim().to_string()),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut cell).trim().to_string());
                records.push(std::mem::take(&mut record));
            }
            _ => cell.push(c),
        }
    }

    if quoted {
        return Err(ImportError::new("unterminated quoted CSV cell").with_position(text.len()));
    }
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell.trim().to_string());
        records.push(record);
    }
    Ok(records)
}

/// Write rows as comma-separated text.
///
/// The header is the union of all row keys in first-seen order. Cells
/// containing a comma, quote or line break are quoted.
pub fn write_csv(rows: &[Row]) -> String {
    let mut headers: Vec<&str> = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !headers.contains(&key.as_str()) {
            headers.push(key);
        }
    }

    let mut out = headers.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",");
    out.push('\n');
    for row in rows {
        let line = headers
            .iter()
            .map(|h| quote(row.get(*h).map(String::as_str).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn quote(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
