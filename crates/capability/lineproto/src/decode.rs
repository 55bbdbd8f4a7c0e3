//! 采集端 JSON 条目解码。
//!
//! 输入格式：
//! ```json
//! { "entity_type": "opcua", "data": { "meas": "m", "tag": "t", "var": "v",
//!   "datatype": "Double", "status_code": "Good",
//!   "source_timestamp": "2024-01-01T00:00:00Z", "value": 3.5 } }
//!
//! { "entity_type": "frame", "data": { "measurement": "m", "tags": { "line": "A" },
//!   "fields": { "x": "10" }, "timestamp": 1704067200000 } }
//! ```

use crate::error::ConvertError;
use chrono::{DateTime, Utc};
use domain::{BufferEntry, EntryKind, FrameRecord, IndustrialPoint, TagValue, VariantValue};
use serde_json::{Map, Value};

/// 解码一行 JSON 文本。
pub fn decode_entry_str(raw: &str) -> Result<BufferEntry, ConvertError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| ConvertError::InvalidValue {
        key: "entry".to_string(),
        reason: err.to_string(),
    })?;
    decode_entry(&value)
}

/// 按 `entity_type` 解码带类别标记的条目。
pub fn decode_entry(value: &Value) -> Result<BufferEntry, ConvertError> {
    let root = as_object(value, "entry")?;
    let entity_type = required_str(root, "entity_type")?;
    let data = as_object(required(root, "data")?, "data")?;

    if entity_type == EntryKind::IndustrialPoint.as_str() {
        decode_industrial(data).map(BufferEntry::IndustrialPoint)
    } else if entity_type == EntryKind::FrameRecord.as_str() {
        decode_frame(data).map(BufferEntry::FrameRecord)
    } else {
        Err(ConvertError::UnknownKind(entity_type.to_string()))
    }
}

fn decode_industrial(data: &Map<String, Value>) -> Result<IndustrialPoint, ConvertError> {
    let raw_timestamp = required_str(data, "source_timestamp")?;
    let source_timestamp = DateTime::parse_from_rfc3339(raw_timestamp)
        .map_err(|err| invalid("source_timestamp", err.to_string()))?
        .with_timezone(&Utc);

    Ok(IndustrialPoint {
        measurement: required_str(data, "meas")?.to_string(),
        tag: required_str(data, "tag")?.to_string(),
        variable: required_str(data, "var")?.to_string(),
        value: variant_from_json(required(data, "value")?),
        datatype: required_str(data, "datatype")?.to_string(),
        source_timestamp,
        status_code: required_str(data, "status_code")?.to_string(),
    })
}

fn variant_from_json(value: &Value) -> VariantValue {
    match value {
        Value::Bool(flag) => VariantValue::Boolean(*flag),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                VariantValue::Int(int)
            } else if let Some(uint) = number.as_u64() {
                VariantValue::UInt(uint)
            } else {
                number
                    .as_f64()
                    .map(VariantValue::Float)
                    .unwrap_or_else(|| VariantValue::Other(number.to_string()))
            }
        }
        Value::String(text) => VariantValue::String(text.clone()),
        other => VariantValue::Other(other.to_string()),
    }
}

fn decode_frame(data: &Map<String, Value>) -> Result<FrameRecord, ConvertError> {
    let measurement = required_str(data, "measurement")?.to_string();

    let mut tags = Vec::new();
    for (key, value) in as_object(required(data, "tags")?, "tags")? {
        let tag = match value {
            Value::String(text) => TagValue::Text(text.clone()),
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    TagValue::Int(int)
                } else if let Some(uint) = number.as_u64() {
                    TagValue::UInt(uint)
                } else {
                    TagValue::Float(
                        number
                            .as_f64()
                            .ok_or_else(|| invalid(key, "number out of range"))?,
                    )
                }
            }
            other => return Err(invalid(key, format!("expected string or number, got {other}"))),
        };
        tags.push((key.clone(), tag));
    }

    let mut fields = Vec::new();
    for (key, value) in as_object(required(data, "fields")?, "fields")? {
        let text = value
            .as_str()
            .ok_or_else(|| invalid(key, format!("expected string, got {value}")))?;
        fields.push((key.clone(), text.to_string()));
    }

    let timestamp = required(data, "timestamp")?;
    let timestamp_ms = timestamp
        .as_i64()
        .ok_or_else(|| invalid("timestamp", format!("expected integer, got {timestamp}")))?;

    Ok(FrameRecord {
        measurement,
        tags,
        fields,
        timestamp_ms,
    })
}

fn required<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value, ConvertError> {
    map.get(key)
        .ok_or_else(|| ConvertError::MissingKey(key.to_string()))
}

fn required_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str, ConvertError> {
    let value = required(map, key)?;
    value
        .as_str()
        .ok_or_else(|| invalid(key, format!("expected string, got {value}")))
}

fn as_object<'a>(value: &'a Value, key: &str) -> Result<&'a Map<String, Value>, ConvertError> {
    value
        .as_object()
        .ok_or_else(|| invalid(key, format!("expected object, got {value}")))
}

fn invalid(key: &str, reason: impl Into<String>) -> ConvertError {
    ConvertError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
}
