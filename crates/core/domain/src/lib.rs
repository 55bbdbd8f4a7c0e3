//! 暂存层共享的领域模型。

pub mod data;

pub use data::{BufferEntry, EntryKind, FrameRecord, IndustrialPoint, TagValue, VariantValue};
