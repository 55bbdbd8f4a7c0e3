use chrono::{DateTime, Utc};
use std::fmt;

/// 工业点位读数的值（OPC UA Variant 的封闭表示）。
#[derive(Debug, Clone, PartialEq)]
pub enum VariantValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Boolean(bool),
    String(String),
    /// 无法归入以上分支的值，保存其字符串形式。
    Other(String),
}

impl VariantValue {
    /// 是否属于数值分支。
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::UInt(_) | Self::Float(_))
    }
}

impl fmt::Display for VariantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write_float(f, *v),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) | Self::Other(v) => f.write_str(v),
        }
    }
}

/// 工业采集端（OPC UA）的单个点位读数。
#[derive(Debug, Clone, PartialEq)]
pub struct IndustrialPoint {
    pub measurement: String,
    pub tag: String,
    pub variable: String,
    pub value: VariantValue,
    /// Variant 类型名，如 `Double`、`Boolean`、`String`。
    pub datatype: String,
    pub source_timestamp: DateTime<Utc>,
    /// 质量码名称，仅 `Good` 可以被转换。
    pub status_code: String,
}

/// 帧记录 tag 的值。
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Text(String),
    Int(i64),
    /// 超出 `i64` 范围的非负整数。
    UInt(u64),
    Float(f64),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write_float(f, *v),
        }
    }
}

/// 浮点数的文本形式：有限的整值保留 `.0`（`1.0` 而非 `1`），
/// 与整数分支区分开。
fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_finite() && v.fract() == 0.0 {
        write!(f, "{v:.1}")
    } else {
        write!(f, "{v}")
    }
}

/// 视觉采集端上报的帧记录。
///
/// `tags` 与 `fields` 均按插入顺序保存。
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub measurement: String,
    pub tags: Vec<(String, TagValue)>,
    pub fields: Vec<(String, String)>,
    pub timestamp_ms: i64,
}

/// 条目类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    IndustrialPoint,
    FrameRecord,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndustrialPoint => "opcua",
            Self::FrameRecord => "frame",
        }
    }
}

/// 缓冲条目：构造后不可变，仅其在缓冲中的位置会变化。
#[derive(Debug, Clone, PartialEq)]
pub enum BufferEntry {
    IndustrialPoint(IndustrialPoint),
    FrameRecord(FrameRecord),
}

impl BufferEntry {
    pub fn kind(&self) -> EntryKind {
        match self {
            Self::IndustrialPoint(_) => EntryKind::IndustrialPoint,
            Self::FrameRecord(_) => EntryKind::FrameRecord,
        }
    }

    pub fn measurement(&self) -> &str {
        match self {
            Self::IndustrialPoint(point) => &point.measurement,
            Self::FrameRecord(frame) => &frame.measurement,
        }
    }
}

impl From<IndustrialPoint> for BufferEntry {
    fn from(point: IndustrialPoint) -> Self {
        Self::IndustrialPoint(point)
    }
}

impl From<FrameRecord> for BufferEntry {
    fn from(frame: FrameRecord) -> Self {
        Self::FrameRecord(frame)
    }
}
