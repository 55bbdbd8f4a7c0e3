use chrono::{TimeZone, Utc};
use domain::{BufferEntry, FrameRecord, IndustrialPoint, TagValue, VariantValue};
use stager_lineproto::{ConvertError, ToLineProtocol, convert, convert_pair, to_local_epoch_millis};

fn sample_point(datatype: &str, value: VariantValue, status_code: &str) -> IndustrialPoint {
    IndustrialPoint {
        measurement: "meas1".to_string(),
        tag: "T1".to_string(),
        variable: "V1".to_string(),
        value,
        datatype: datatype.to_string(),
        source_timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        status_code: status_code.to_string(),
    }
}

fn sample_frame(fields: Vec<(&str, &str)>) -> FrameRecord {
    FrameRecord {
        measurement: "frames".to_string(),
        tags: vec![("line".to_string(), TagValue::Text("A".to_string()))],
        fields: fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        timestamp_ms: 1_704_067_200_000,
    }
}

fn ts() -> i64 {
    to_local_epoch_millis(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

#[test]
fn good_double_point_converts() {
    let entry = BufferEntry::from(sample_point("Double", VariantValue::Float(3.5), "Good"));
    let line = convert(&entry).expect("line");
    assert_eq!(
        line,
        format!(
            "meas1,tag=T1,var=V1,datatype=Double,statuscode=Good num_value=3.5 {}",
            ts()
        )
    );
    assert_eq!(entry.to_line_protocol().expect("line"), line);
}

#[test]
fn non_good_status_is_rejected() {
    for status in ["Bad", "Uncertain", "good", ""] {
        let entry = BufferEntry::from(sample_point("Double", VariantValue::Float(1.0), status));
        assert_eq!(
            convert(&entry),
            Err(ConvertError::QualityRejected(status.to_string()))
        );
        assert_eq!(convert_pair(&entry), (false, String::new()));
    }
}

#[test]
fn boolean_renders_as_integer() {
    let entry = BufferEntry::from(sample_point("Boolean", VariantValue::Boolean(true), "Good"));
    let line = convert(&entry).expect("line");
    assert!(line.contains(" num_value=1 "), "{line}");

    let entry = BufferEntry::from(sample_point("Boolean", VariantValue::Boolean(false), "Good"));
    assert!(convert(&entry).expect("line").contains(" num_value=0 "));
}

#[test]
fn string_datatype_is_quoted() {
    let entry = BufferEntry::from(sample_point(
        "String",
        VariantValue::String("running".to_string()),
        "Good",
    ));
    let line = convert(&entry).expect("line");
    assert!(line.ends_with(&format!(" str_value=\"running\" {}", ts())), "{line}");
}

#[test]
fn unknown_datatype_is_unquoted() {
    let entry = BufferEntry::from(sample_point(
        "DateTime",
        VariantValue::Other("2024-01-01".to_string()),
        "Good",
    ));
    let line = convert(&entry).expect("line");
    assert!(line.contains("datatype=DateTime"));
    assert!(line.ends_with(&format!(" str_value=2024-01-01 {}", ts())), "{line}");
}

#[test]
fn integer_datatypes_use_natural_form() {
    let entry = BufferEntry::from(sample_point("Int16", VariantValue::Int(-12), "Good"));
    assert!(convert(&entry).expect("line").contains(" num_value=-12 "));

    let entry = BufferEntry::from(sample_point("UInt64", VariantValue::UInt(u64::MAX), "Good"));
    assert!(
        convert(&entry)
            .expect("line")
            .contains(&format!(" num_value={} ", u64::MAX))
    );
}

#[test]
fn inconsistent_variant_is_a_failure() {
    let entry = BufferEntry::from(sample_point(
        "Double",
        VariantValue::String("3.5".to_string()),
        "Good",
    ));
    assert!(matches!(
        convert(&entry),
        Err(ConvertError::ValueMismatch { .. })
    ));

    let entry = BufferEntry::from(sample_point("Boolean", VariantValue::Int(1), "Good"));
    assert!(matches!(
        convert(&entry),
        Err(ConvertError::ValueMismatch { .. })
    ));

    let entry = BufferEntry::from(sample_point("Float", VariantValue::Float(f64::NAN), "Good"));
    assert_eq!(
        convert(&entry),
        Err(ConvertError::NonFinite("Float".to_string()))
    );
}

#[test]
fn frame_fields_follow_numeric_rule() {
    let entry = BufferEntry::from(sample_frame(vec![("x", "10"), ("label", "ok status")]));
    let line = convert(&entry).expect("line");
    assert_eq!(line, "frames,line=A x=10,label=\"okstatus\" 1704067200000");
}

#[test]
fn frame_tags_strip_whitespace_and_keep_numbers() {
    let mut frame = sample_frame(vec![("count", "3")]);
    frame.tags = vec![
        ("camera".to_string(), TagValue::Text("cam 01".to_string())),
        ("zone".to_string(), TagValue::Int(4)),
        ("gain".to_string(), TagValue::Float(1.5)),
    ];
    let line = convert(&BufferEntry::from(frame)).expect("line");
    assert_eq!(line, "frames,camera=cam01,zone=4,gain=1.5 count=3 1704067200000");
}

#[test]
fn integral_float_tag_keeps_decimal_point() {
    let frame = FrameRecord {
        measurement: "f".to_string(),
        tags: vec![("t".to_string(), TagValue::Float(1.0))],
        fields: vec![("n".to_string(), "7".to_string())],
        timestamp_ms: 7,
    };
    assert_eq!(convert(&BufferEntry::from(frame)).expect("line"), "f,t=1.0 n=7 7");
}

#[test]
fn integral_float_and_integer_tags_are_distinct() {
    let mut frame = sample_frame(vec![("x", "1")]);
    frame.tags = vec![
        ("a".to_string(), TagValue::Int(2)),
        ("b".to_string(), TagValue::Float(2.0)),
        ("c".to_string(), TagValue::UInt(u64::MAX)),
    ];
    let line = convert(&BufferEntry::from(frame)).expect("line");
    assert_eq!(
        line,
        format!("frames,a=2,b=2.0,c={} x=1 1704067200000", u64::MAX)
    );
}

#[test]
fn frame_negative_and_decimal_fields_are_quoted() {
    let entry = BufferEntry::from(sample_frame(vec![("offset", "-5"), ("ratio", "0.5")]));
    let line = convert(&entry).expect("line");
    assert_eq!(
        line,
        "frames,line=A offset=\"-5\",ratio=\"0.5\" 1704067200000"
    );
}

#[test]
fn frame_without_fields_is_rejected() {
    let entry = BufferEntry::from(sample_frame(Vec::new()));
    assert_eq!(convert(&entry), Err(ConvertError::EmptyFields));
    assert_eq!(convert_pair(&entry), (false, String::new()));
}

#[test]
fn frame_without_tags_still_converts() {
    let mut frame = sample_frame(vec![("x", "1")]);
    frame.tags.clear();
    let line = convert(&BufferEntry::from(frame)).expect("line");
    assert_eq!(line, "frames x=1 1704067200000");
}
