//! Property tests for generate/import round trips

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use xsdform::converters::{generate, import_xml, unwrap_cdata, wrap_cdata, CdataOverrides, ValueStore};
use xsdform::validators::{parse_schema, SchemaNode};
use xsdform::{validate, Path};

const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Invoice">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Total" type="xs:decimal"/>
        <xs:element name="Note" minOccurs="0">
          <xs:simpleType>
            <xs:restriction base="xs:string">
              <xs:pattern value=".*[^\s].*"/>
              <xs:minLength value="1"/>
            </xs:restriction>
          </xs:simpleType>
        </xs:element>
        <xs:element name="Items" maxOccurs="unbounded">
          <xs:complexType>
            <xs:sequence>
              <xs:element name="Sku" type="xs:string"/>
              <xs:element name="Label" type="xs:string" minOccurs="0"/>
            </xs:sequence>
            <xs:attribute name="line" type="xs:integer"/>
          </xs:complexType>
        </xs:element>
      </xs:sequence>
      <xs:attribute name="id" type="xs:string" use="required"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

fn schema() -> SchemaNode {
    parse_schema(SCHEMA).unwrap()
}

fn word() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9_-]{0,9}"
}

fn item() -> impl Strategy<Value = Value> {
    (word(), proptest::option::of(word()), proptest::option::of(0u32..1000)).prop_map(|(sku, label, line)| {
        let mut map = Map::new();
        if let Some(line) = line {
            map.insert("@line".to_string(), json!(line.to_string()));
        }
        map.insert("Sku".to_string(), json!(sku));
        if let Some(label) = label {
            map.insert("Label".to_string(), json!(label));
        }
        Value::Object(map)
    })
}

fn invoice() -> impl Strategy<Value = ValueStore> {
    (
        word(),
        "-?[0-9]{1,6}(\\.[0-9]{1,2})?",
        proptest::option::of("[ a-z<>&']{0,4}[a-z][ a-z<>&']{0,4}"),
        proptest::collection::vec(item(), 1..5),
    )
        .prop_map(|(id, total, note, items)| {
            let mut invoice = Map::new();
            invoice.insert("@id".to_string(), json!(id));
            invoice.insert("Total".to_string(), json!(total));
            if let Some(note) = note {
                invoice.insert("Note".to_string(), json!(note));
            }
            invoice.insert("Items".to_string(), Value::Array(items));
            ValueStore::from_json(json!({ "Invoice": invoice })).unwrap()
        })
}

proptest! {
    #[test]
    fn prop_valid_store_round_trips(store in invoice()) {
        let schema = schema();
        prop_assert!(validate(&schema, &store).is_empty());

        let xml = generate(&schema, &store, &CdataOverrides::new());
        let imported = import_xml(&schema, &xml).unwrap();
        prop_assert_eq!(imported, store);
    }

    #[test]
    fn prop_overrides_do_not_change_values(store in invoice(), wrap_all in any::<bool>()) {
        let schema = schema();
        let mut overrides = CdataOverrides::new();
        for (i, _) in store.array_items(&"Invoice.Items".parse().unwrap()).iter().enumerate() {
            overrides.insert(format!("Invoice.Items.{}.Sku", i).parse::<Path>().unwrap(), wrap_all);
        }

        let xml = generate(&schema, &store, &overrides);
        prop_assert_eq!(import_xml(&schema, &xml).unwrap(), store);
    }

    #[test]
    fn prop_blank_values_are_omitted(store in invoice(), blank_label in any::<bool>()) {
        let schema = schema();
        let mut store = store;
        store.set(&"Invoice.Note".parse().unwrap(), json!(""));
        if blank_label {
            store.set(&"Invoice.Items.0.Label".parse().unwrap(), json!(""));
        } else {
            store.remove(&"Invoice.Items.0.Label".parse().unwrap());
        }

        let xml = generate(&schema, &store, &CdataOverrides::new());
        prop_assert!(!xml.contains("<Note"));
        let first_item = xml.split("</Items>").next().unwrap();
        prop_assert!(!first_item.contains("<Label"));
    }

    #[test]
    fn prop_cdata_unwrap_inverts_wrap(text in "[^\\]]*") {
        let wrapped = wrap_cdata(&text);
        prop_assert_eq!(unwrap_cdata(&wrapped), text.as_str());
    }
}
