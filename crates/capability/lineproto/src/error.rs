//! 行协议转换错误类型定义

/// 转换失败原因。任何失败都不会产出部分行。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// 质量码不是 Good
    #[error("quality rejected: status {0}")]
    QualityRejected(String),

    /// 帧记录没有任何字段
    #[error("frame record has no fields")]
    EmptyFields,

    /// 无法识别的条目类别
    #[error("unknown entry kind: {0}")]
    UnknownKind(String),

    /// 值与声明的数据类型不一致
    #[error("value {value} does not match datatype {datatype}")]
    ValueMismatch { datatype: String, value: String },

    /// 数值字段为 NaN 或无穷
    #[error("non-finite value for datatype {0}")]
    NonFinite(String),

    /// 解码时缺少必需键
    #[error("missing key: {0}")]
    MissingKey(String),

    /// 解码时值类型不符合要求
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
