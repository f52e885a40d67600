//! Invoice Form Example
//!
//! This example fills an invoice form, validates it, generates XML and
//! imports the result back.
//!
//! Run with: cargo run --example invoice_form

use std::path::PathBuf;
use xsdform::{FormError, FormSession, Path};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

    // Load the schema
    let schema_path = fixtures_dir.join("invoice.xsd");
    println!("Loading schema: {}", schema_path.display());
    let mut session = FormSession::from_xsd(&std::fs::read_to_string(&schema_path)?)?;
    println!("Root element: {}\n", session.schema().name);

    // An empty form cannot be generated
    match session.generate() {
        Err(FormError::Invalid(errors)) => {
            println!("Empty form has {} error(s):", errors.len());
            for (path, message) in &errors {
                println!("  - {}: {}", path, message);
            }
            println!();
        }
        other => println!("Unexpected result: {:?}\n", other),
    }

    // Fill it in
    let items: Path = "Invoice.Items".parse()?;
    session.set_value(&"Invoice.@id".parse()?, "A1");
    session.set_value(&"Invoice.Total".parse()?, "99.50");
    session.set_value(&"Invoice.Note".parse()?, "Deliver <after> 5pm");
    for sku in ["X1", "X2"] {
        let index = session.add_array_item(&items)?;
        session.set_value(&items.index(index).child("Sku"), sku);
    }

    let xml = session.generate()?;
    println!("Generated XML:\n{}", xml);

    // Import it into a fresh session
    let mut imported = FormSession::new(session.schema().clone());
    imported.import_xml(&xml)?;
    println!("Imported values:\n{}", serde_json::to_string_pretty(imported.values().to_json())?);

    if imported.values() == session.values() {
        println!("\nRound trip preserved every value");
    } else {
        println!("\nRound trip changed the values");
    }

    Ok(())
}
