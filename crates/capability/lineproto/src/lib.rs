//! # 行协议转换能力模块
//!
//! 将缓冲条目转换为时序库的行协议（InfluxDB line protocol，毫秒时间戳）：
//!
//! ```text
//! measurement[,tag=value]* field=value[,field=value]* timestamp_ms
//! ```
//!
//! - **工业点位**：质量门（仅 `Good`）+ 按 datatype 选择 `num_value` / `str_value`
//! - **帧记录**：tag 去空白，纯数字字段不加引号，其余字段加引号
//!
//! 转换无状态、不输出诊断，任何失败都以 [`ConvertError`] 返回，不会产出部分行。
//! 不做标识符转义：调用方需保证名称与值中不含逗号、空格、等号。

mod decode;
mod error;
mod frame;
mod industrial;
pub mod timestamp;

pub use decode::{decode_entry, decode_entry_str};
pub use error::ConvertError;
pub use frame::convert_frame;
pub use industrial::{GOOD_STATUS, NUMERIC_DATATYPES, convert_industrial};
pub use timestamp::to_local_epoch_millis;

use domain::BufferEntry;

/// 按条目类别分派转换。
pub fn convert(entry: &BufferEntry) -> Result<String, ConvertError> {
    match entry {
        BufferEntry::IndustrialPoint(point) => convert_industrial(point),
        BufferEntry::FrameRecord(frame) => convert_frame(frame),
    }
}

/// `(ok, line)` 形式的转换结果；失败时行为空串。
pub fn convert_pair(entry: &BufferEntry) -> (bool, String) {
    match convert(entry) {
        Ok(line) => (true, line),
        Err(_) => (false, String::new()),
    }
}

/// 条目的行协议转换能力。
pub trait ToLineProtocol {
    fn to_line_protocol(&self) -> Result<String, ConvertError>;
}

impl ToLineProtocol for BufferEntry {
    fn to_line_protocol(&self) -> Result<String, ConvertError> {
        convert(self)
    }
}
