use fedconf_codec::{decode, EncodeOptions};
use fedconf_mapping::wire::SourceType;
use fedconf_mapping::{fulfillment_descriptor, Assembler, FulfillmentAssembler};
use fedconf_value::DynamicValue;
use proptest::prelude::*;
use serde_json::{json, Value as JsonValue};

fn fulfillment(doc: JsonValue) -> DynamicValue {
    decode(&doc, fulfillment_descriptor()).expect("valid fulfillment")
}

#[test]
fn text_source_drops_null_id_on_standard_write() {
    let value = fulfillment(json!({
        "subject": {"source": {"type": "TEXT", "id": null}, "value": "static"}
    }));
    let subject = value
        .as_map()
        .ok()
        .and_then(|entries| entries.get("subject"))
        .expect("subject entry");
    let source = subject.attribute("source").expect("source declared");
    assert_eq!(source.attribute("type").and_then(DynamicValue::as_str), Ok("TEXT"));
    assert_eq!(source.attribute("id").map(DynamicValue::is_null), Ok(true));
    assert_eq!(subject.attribute("value").and_then(DynamicValue::as_str), Ok("static"));

    let assembler = FulfillmentAssembler::with_options(EncodeOptions::standard());
    let wire = assembler.to_wire(&value).expect("valid").expect("present");
    assert_eq!(
        serde_json::to_value(&wire).ok(),
        Some(json!({"subject": {"source": {"type": "TEXT"}, "value": "static"}}))
    );
}

#[test]
fn decoded_map_keeps_exactly_the_wire_keys() {
    let value = fulfillment(json!({
        "USER_NAME": {"source": {"type": "ADAPTER"}, "value": "username"},
        "USER_KEY": {"source": {"type": "ADAPTER"}, "value": "subject"}
    }));
    let keys: Vec<&str> = value.as_map().expect("map").keys().map(String::as_str).collect();
    assert_eq!(keys, ["USER_KEY", "USER_NAME"]);

    let wire = FulfillmentAssembler::new().to_wire(&value).expect("valid").expect("present");
    assert_eq!(wire.keys().collect::<Vec<_>>(), ["USER_KEY", "USER_NAME"]);
}

#[test]
fn legacy_write_keeps_null_value_of_no_mapping() {
    let value = fulfillment(json!({"unused": {"source": {"type": "NO_MAPPING"}}}));
    let wire = FulfillmentAssembler::new().to_wire(&value).expect("valid").expect("present");
    assert_eq!(
        serde_json::to_value(&wire).ok(),
        Some(json!({"unused": {"source": {"type": "NO_MAPPING"}, "value": null}}))
    );
}

fn source_type() -> impl Strategy<Value = SourceType> {
    proptest::sample::select(SourceType::ALL.to_vec())
}

proptest! {
    #[test]
    fn every_source_type_round_trips(kind in source_type(), text in "[a-z][a-z0-9_]{0,11}") {
        let value_text = (kind != SourceType::NoMapping).then_some(text);
        let written = fulfillment(json!({
            "attr": {"source": {"type": kind.as_str(), "id": "ds1"}, "value": value_text}
        }));
        let expected_id = kind.requires_id().then_some("ds1");
        let expected = fulfillment(json!({
            "attr": {"source": {"type": kind.as_str(), "id": expected_id}, "value": value_text}
        }));

        let assembler = FulfillmentAssembler::new();
        let wire = assembler.to_wire(&written).expect("valid").expect("present");
        prop_assert_eq!(wire["attr"].source.id.as_deref(), expected_id);
        prop_assert_eq!(assembler.from_wire(Some(&wire)), Ok(expected));
    }
}
