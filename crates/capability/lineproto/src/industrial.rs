//! 工业点位 → 行协议。

use crate::error::ConvertError;
use crate::timestamp::to_local_epoch_millis;
use domain::{IndustrialPoint, VariantValue};

/// 唯一允许通过质量门的状态码。
pub const GOOD_STATUS: &str = "Good";

/// 以 `num_value` 原样输出的数值类 datatype。
pub const NUMERIC_DATATYPES: [&str; 10] = [
    "Double", "SByte", "Byte", "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64", "Float",
];

/// 转换单个工业点位。
///
/// 行格式：
/// `measurement,tag=<tag>,var=<var>,datatype=<datatype>,statuscode=<status> <field>=<value> <ts>`
pub fn convert_industrial(point: &IndustrialPoint) -> Result<String, ConvertError> {
    if point.status_code != GOOD_STATUS {
        return Err(ConvertError::QualityRejected(point.status_code.clone()));
    }

    let field = encode_field(&point.datatype, &point.value)?;
    let timestamp = to_local_epoch_millis(point.source_timestamp);

    Ok(format!(
        "{},tag={},var={},datatype={},statuscode={} {} {}",
        point.measurement,
        point.tag,
        point.variable,
        point.datatype,
        point.status_code,
        field,
        timestamp
    ))
}

fn encode_field(datatype: &str, value: &VariantValue) -> Result<String, ConvertError> {
    match datatype {
        "String" => Ok(format!("str_value=\"{value}\"")),
        "Boolean" => match value {
            VariantValue::Boolean(flag) => Ok(format!("num_value={}", u8::from(*flag))),
            other => Err(mismatch(datatype, other)),
        },
        numeric if NUMERIC_DATATYPES.contains(&numeric) => match value {
            VariantValue::Float(number) if !number.is_finite() => {
                Err(ConvertError::NonFinite(datatype.to_string()))
            }
            number if number.is_numeric() => Ok(format!("num_value={number}")),
            other => Err(mismatch(datatype, other)),
        },
        // 其他类型不加引号，与 `String` 分支不同。
        _ => Ok(format!("str_value={value}")),
    }
}

fn mismatch(datatype: &str, value: &VariantValue) -> ConvertError {
    ConvertError::ValueMismatch {
        datatype: datatype.to_string(),
        value: format!("{value:?}"),
    }
}
