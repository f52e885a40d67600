//! End-to-end tests: schema to form values to XML and back

use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use xsdform::converters::{generate, import_xml, import_xml_detailed, CdataOverrides, ValueStore};
use xsdform::validators::{parse_schema, BaseType, InputType, SchemaNode};
use xsdform::{validate, FormError, FormSession, Path};

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn invoice_schema() -> SchemaNode {
    let xsd = std::fs::read_to_string(fixtures_dir().join("invoice.xsd")).unwrap();
    parse_schema(&xsd).unwrap()
}

fn path(s: &str) -> Path {
    s.parse().unwrap()
}

fn invoice_store() -> ValueStore {
    ValueStore::from_json(json!({
        "Invoice": {
            "@id": "A1",
            "Total": "99.50",
            "Items": [{"Sku": "X1"}, {"Sku": "X2"}]
        }
    }))
    .unwrap()
}

#[test]
fn test_invoice_model() {
    let schema = invoice_schema();
    assert_eq!(schema.name, "Invoice");

    let complex = schema.as_complex().unwrap();
    assert_eq!(complex.attributes.len(), 1);
    assert!(complex.attributes[0].is_required());

    let total = schema.find(&path("Invoice.Total")).unwrap().as_simple().unwrap();
    assert_eq!(total.base_type, BaseType::Decimal("decimal".to_string()));
    assert_eq!(total.input_type, InputType::Number);

    let items = schema.find(&path("Invoice.Items")).unwrap();
    assert!(items.is_multiple());
    assert!(items.is_required());

    assert!(schema.find(&path("Invoice.Note")).unwrap().use_cdata());
    assert!(schema.find(&path("Invoice.Items.0.Sku")).is_some());
}

#[test]
fn test_invoice_generate_exact_output() {
    let schema = invoice_schema();
    let store = invoice_store();
    assert!(validate(&schema, &store).is_empty());

    let xml = generate(&schema, &store, &CdataOverrides::new());
    let expected = std::fs::read_to_string(fixtures_dir().join("invoice.xml")).unwrap();
    assert_eq!(xml, expected);
}

#[test]
fn test_invoice_reimport_is_identical() {
    let schema = invoice_schema();
    let store = invoice_store();
    let xml = generate(&schema, &store, &CdataOverrides::new());

    let imported = import_xml_detailed(&schema, &xml).unwrap();
    assert_eq!(imported.store, store);
    assert!(imported.cdata.is_empty());
}

#[test]
fn test_cdata_field_round_trip() {
    let schema = invoice_schema();
    let mut store = invoice_store();
    store.set(&path("Invoice.Note"), json!("  <b>fragile</b> & raw  "));

    let xml = generate(&schema, &store, &CdataOverrides::new());
    assert!(xml.contains("<Note><![CDATA[  <b>fragile</b> & raw  ]]></Note>"));

    assert_eq!(import_xml(&schema, &xml).unwrap(), store);
}

#[test]
fn test_override_round_trip_is_reported() {
    let schema = invoice_schema();
    let store = invoice_store();
    let mut overrides = CdataOverrides::new();
    overrides.insert(path("Invoice.Items.1.Sku"), true);

    let xml = generate(&schema, &store, &overrides);
    assert!(xml.contains("<Sku>X1</Sku>"));
    assert!(xml.contains("<Sku><![CDATA[X2]]></Sku>"));

    let imported = import_xml_detailed(&schema, &xml).unwrap();
    assert_eq!(imported.store, store);
    assert_eq!(imported.cdata, overrides);
}

#[test]
fn test_invalid_values_are_reported_per_field() {
    let schema = invoice_schema();
    let store = ValueStore::from_json(json!({
        "Invoice": {
            "Total": "12.x",
            "Items": [{"Sku": "A", "Quantity": "150"}, {"Quantity": "abc"}]
        }
    }))
    .unwrap();

    let errors = validate(&schema, &store);
    let reported: Vec<String> = errors.keys().map(|p| p.to_string()).collect();
    assert_eq!(
        reported,
        vec![
            "Invoice.@id",
            "Invoice.Total",
            "Invoice.Items.0.Quantity",
            "Invoice.Items.1.Sku",
            "Invoice.Items.1.Quantity",
        ]
    );
    assert_eq!(errors[&path("Invoice.@id")], "id is required");
    assert_eq!(errors[&path("Invoice.Items.0.Quantity")], "Quantity must be at most 100");
}

#[test]
fn test_session_flow() {
    let schema = Arc::new(invoice_schema());
    let mut session = FormSession::new(schema.clone());

    match session.generate() {
        Err(FormError::Invalid(errors)) => {
            assert_eq!(errors[&path("Invoice.Items")], "At least one Items is required");
        }
        other => panic!("expected validation errors, got {:?}", other),
    }

    let items = path("Invoice.Items");
    session.set_value(&path("Invoice.@id"), "A1");
    session.set_value(&path("Invoice.Total"), "99.50");
    for sku in ["X1", "X2"] {
        let index = session.add_array_item(&items).unwrap();
        session.set_value(&items.index(index).child("Sku"), sku);
    }

    let xml = session.generate().unwrap();
    assert_eq!(xml, generate(&schema, &invoice_store(), &CdataOverrides::new()));

    let mut other = FormSession::new(schema);
    other.import_xml(&xml).unwrap();
    assert_eq!(other.values(), session.values());
}
