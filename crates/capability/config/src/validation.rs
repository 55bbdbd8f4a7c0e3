//! 配置文档结构校验。

use serde_json::{Map, Value};

const VALID_MESSAGE: &str = "Given JSON data is Valid";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 校验结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            message: VALID_MESSAGE.to_string(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// 校验配置文档，返回 `(valid, message)` 语义的结果。
///
/// 规则：
/// - 根必须是对象，且包含 `buffer` 对象；
/// - `buffer.max_size` 为正整数；
/// - `drain`（可选）中的 `interval_ms`、`max_batch` 为正整数；
/// - `log.level`（可选）为 trace/debug/info/warn/error 之一。
pub fn validate_document(document: &Value) -> Validation {
    match check_document(document) {
        Ok(()) => Validation::ok(),
        Err(message) => Validation::fail(message),
    }
}

fn check_document(document: &Value) -> Result<(), String> {
    let root = document
        .as_object()
        .ok_or_else(|| "document must be a JSON object".to_string())?;

    let buffer = required_object(root, "buffer", "")?;
    required_positive_integer(buffer, "max_size", "buffer")?;

    if let Some(drain) = optional_object(root, "drain", "")? {
        optional_positive_integer(drain, "interval_ms", "drain")?;
        optional_positive_integer(drain, "max_batch", "drain")?;
    }

    if let Some(log) = optional_object(root, "log", "")? {
        if let Some(level) = log.get("level") {
            let level = level
                .as_str()
                .ok_or_else(|| "log.level must be a string".to_string())?;
            if !LOG_LEVELS.contains(&level) {
                return Err(format!(
                    "log.level must be one of {}, got '{level}'",
                    LOG_LEVELS.join("/")
                ));
            }
        }
    }
    Ok(())
}

fn path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn required_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<&'a Map<String, Value>, String> {
    optional_object(map, key, parent)?
        .ok_or_else(|| format!("'{}' is a required property", path(parent, key)))
}

fn optional_object<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<Option<&'a Map<String, Value>>, String> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Object(object)) => Ok(Some(object)),
        Some(other) => Err(format!("{} must be an object, got {other}", path(parent, key))),
    }
}

fn required_positive_integer(
    map: &Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<u64, String> {
    optional_positive_integer(map, key, parent)?
        .ok_or_else(|| format!("'{}' is a required property", path(parent, key)))
}

fn optional_positive_integer(
    map: &Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<Option<u64>, String> {
    let Some(value) = map.get(key) else {
        return Ok(None);
    };
    match value.as_u64() {
        Some(number) if number > 0 => Ok(Some(number)),
        _ => Err(format!(
            "{} must be a positive integer, got {value}",
            path(parent, key)
        )),
    }
}
