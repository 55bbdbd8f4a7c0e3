use domain::{BufferEntry, TagValue, VariantValue};
use serde_json::json;
use stager_lineproto::{ConvertError, convert, decode_entry, decode_entry_str};

#[test]
fn decodes_frame_preserving_order() {
    let entry = decode_entry(&json!({
        "entity_type": "frame",
        "data": {
            "measurement": "frames",
            "tags": { "line": "A", "zone": 2 },
            "fields": { "zeta": "1", "alpha": "two words" },
            "timestamp": 1704067200000_i64
        }
    }))
    .expect("entry");

    let BufferEntry::FrameRecord(frame) = &entry else {
        panic!("expected frame record");
    };
    assert_eq!(frame.tags[1], ("zone".to_string(), TagValue::Int(2)));
    assert_eq!(frame.fields[0].0, "zeta");
    assert_eq!(frame.fields[1].0, "alpha");
    assert_eq!(
        convert(&entry).expect("line"),
        "frames,line=A,zone=2 zeta=1,alpha=\"twowords\" 1704067200000"
    );
}

#[test]
fn decodes_industrial_point() {
    let entry = decode_entry_str(
        r#"{"entity_type":"opcua","data":{"meas":"m","tag":"t","var":"v","datatype":"Double",
            "status_code":"Good","source_timestamp":"2024-01-01T00:00:00Z","value":3.5}}"#,
    )
    .expect("entry");

    let BufferEntry::IndustrialPoint(point) = &entry else {
        panic!("expected industrial point");
    };
    assert_eq!(point.value, VariantValue::Float(3.5));
    assert_eq!(point.source_timestamp.timestamp(), 1_704_067_200);
    assert!(convert(&entry).is_ok());
}

#[test]
fn numeric_tags_keep_their_json_form() {
    let entry = decode_entry_str(
        r#"{"entity_type":"frame","data":{"measurement":"f",
            "tags":{"big":18446744073709551615,"t":1.0},"fields":{"n":"7"},"timestamp":7}}"#,
    )
    .expect("entry");

    let BufferEntry::FrameRecord(frame) = &entry else {
        panic!("expected frame record");
    };
    assert_eq!(frame.tags[0], ("big".to_string(), TagValue::UInt(u64::MAX)));
    assert_eq!(frame.tags[1], ("t".to_string(), TagValue::Float(1.0)));
    assert_eq!(
        convert(&entry).expect("line"),
        "f,big=18446744073709551615,t=1.0 n=7 7"
    );
}

#[test]
fn non_string_field_is_invalid() {
    let err = decode_entry(&json!({
        "entity_type": "frame",
        "data": { "measurement": "m", "tags": {}, "fields": { "x": 10 }, "timestamp": 1 }
    }))
    .expect_err("invalid");
    assert!(matches!(err, ConvertError::InvalidValue { ref key, .. } if key == "x"));
}

#[test]
fn missing_key_is_reported() {
    let err = decode_entry(&json!({
        "entity_type": "frame",
        "data": { "measurement": "m", "tags": {}, "timestamp": 1 }
    }))
    .expect_err("missing");
    assert_eq!(err, ConvertError::MissingKey("fields".to_string()));
}

#[test]
fn unknown_entity_type_is_rejected() {
    let err = decode_entry(&json!({ "entity_type": "lidar", "data": {} })).expect_err("kind");
    assert_eq!(err, ConvertError::UnknownKind("lidar".to_string()));
}

#[test]
fn malformed_json_is_invalid() {
    let err = decode_entry_str("{not json").expect_err("json");
    assert!(matches!(err, ConvertError::InvalidValue { .. }));
}
