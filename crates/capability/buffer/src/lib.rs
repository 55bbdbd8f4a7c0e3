//! # 有界 FIFO 缓冲
//!
//! 条目在上传前暂存于此。容量固定，超出时先淘汰最旧条目再追加，
//! 任何时刻都满足 `len <= capacity`。
//!
//! 移除操作使用的下标是当前位置而非稳定标识：调用方应先取快照，
//! 再根据快照计算待移除下标。

mod shared;

pub use shared::SharedBuffer;

use domain::BufferEntry;
use stager_config::BufferConfig;
use stager_telemetry::{
    DiagnosticLevel, DiagnosticsSink, record_entry_added, record_entry_evicted,
    record_entry_removed, record_invalid_index,
};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

const MODULE_NAME: &str = "Buffer";

/// 缓冲构造错误。
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("invalid capacity: {0}")]
    InvalidCapacity(usize),
}

/// 有界 FIFO 缓冲（单线程使用；多线程请用 [`SharedBuffer`]）。
pub struct Buffer {
    capacity: usize,
    items: VecDeque<BufferEntry>,
    evictions: u64,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Buffer {
    pub fn new(capacity: usize, sink: Arc<dyn DiagnosticsSink>) -> Result<Self, BufferError> {
        if capacity == 0 {
            return Err(BufferError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            items: VecDeque::with_capacity(capacity.min(1024)),
            evictions: 0,
            sink,
        })
    }

    pub fn from_config(
        config: &BufferConfig,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Result<Self, BufferError> {
        Self::new(config.max_size, sink)
    }

    /// 追加条目；已满时先淘汰下标 0 的条目。
    pub fn add(&mut self, entry: BufferEntry) {
        if self.items.len() == self.capacity {
            let size = self.items.len();
            self.items.pop_front();
            self.evictions += 1;
            record_entry_evicted();
            self.log(DiagnosticLevel::Warn, &format!("Buffer is full ({size})"));
        }

        self.items.push_back(entry);
        record_entry_added();
        self.log(
            DiagnosticLevel::Info,
            &format!("Point copied into buffer (size={})", self.items.len()),
        );
    }

    /// 移除指定位置的条目，后续条目前移一位。下标越界时仅告警并返回 `false`。
    pub fn remove_at(&mut self, index: usize) -> bool {
        if self.items.remove(index).is_none() {
            record_invalid_index();
            self.log(
                DiagnosticLevel::Warn,
                &format!("{index} element does not exist in buffer"),
            );
            return false;
        }

        record_entry_removed();
        self.log(
            DiagnosticLevel::Info,
            &format!(
                "Point {index} removed from buffer (size={})",
                self.items.len()
            ),
        );
        true
    }

    /// 批量移除：去重后按下标降序逐个移除，保证未处理的下标不因前移而失效。
    ///
    /// 返回实际移除的条目数。
    pub fn remove_many(&mut self, indices: impl IntoIterator<Item = usize>) -> usize {
        let unique: BTreeSet<usize> = indices.into_iter().collect();
        let mut removed = 0;
        for index in unique.iter().rev() {
            if self.remove_at(*index) {
                removed += 1;
            }
        }

        self.log(
            DiagnosticLevel::Info,
            &format!(
                "{} points removed from buffer (size={})",
                unique.len(),
                self.items.len()
            ),
        );
        removed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 累计淘汰次数（单调递增）。两次读数之差即为期间所有条目前移的位数。
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn get(&self, index: usize) -> Option<&BufferEntry> {
        self.items.get(index)
    }

    /// 当前内容的独立副本；之后对缓冲的修改不会反映到副本中，反之亦然。
    pub fn snapshot(&self) -> Vec<BufferEntry> {
        self.items.iter().cloned().collect()
    }

    fn log(&self, level: DiagnosticLevel, message: &str) {
        self.sink.log(MODULE_NAME, "", level, message);
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.capacity)
            .field("len", &self.items.len())
            .field("evictions", &self.evictions)
            .finish()
    }
}
