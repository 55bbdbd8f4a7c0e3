//! 帧记录 → 行协议。

use crate::error::ConvertError;
use domain::{FrameRecord, TagValue};

/// 转换单条帧记录。
///
/// - 文本 tag 去除全部空白，数值 tag 直接输出；
/// - 纯数字字段不加引号，其他字段去除空白后加双引号；
/// - 字段按插入顺序以逗号连接。
pub fn convert_frame(frame: &FrameRecord) -> Result<String, ConvertError> {
    if frame.fields.is_empty() {
        return Err(ConvertError::EmptyFields);
    }

    let mut line = frame.measurement.clone();
    for (key, value) in &frame.tags {
        line.push(',');
        line.push_str(key);
        line.push('=');
        match value {
            TagValue::Text(text) => line.push_str(&strip_whitespace(text)),
            numeric => line.push_str(&numeric.to_string()),
        }
    }

    line.push(' ');
    let fields = frame
        .fields
        .iter()
        .map(|(key, value)| {
            if is_numeric(value) {
                format!("{key}={value}")
            } else {
                format!("{key}=\"{}\"", strip_whitespace(value))
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    line.push_str(&fields);

    line.push(' ');
    line.push_str(&frame.timestamp_ms.to_string());
    Ok(line)
}

/// 非空且每个字符都是数字字符；`-` 与 `.` 不算数字。
fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(char::is_numeric)
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_detection_is_literal() {
        assert!(is_numeric("10"));
        assert!(is_numeric("007"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("-5"));
        assert!(!is_numeric("1.5"));
        assert!(!is_numeric("1 0"));
    }

    #[test]
    fn strips_every_whitespace_kind() {
        assert_eq!(strip_whitespace(" a\tb\nc "), "abc");
    }
}
