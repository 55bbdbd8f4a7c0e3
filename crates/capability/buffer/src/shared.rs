//! 多线程共享的缓冲句柄。

use crate::{Buffer, BufferError};
use domain::BufferEntry;
use stager_telemetry::DiagnosticsSink;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 以单把互斥锁保护的缓冲。
///
/// 每个操作在持锁期间原子完成；跨操作的"快照 → 计算下标 → 移除"
/// 需通过 [`SharedBuffer::with_lock`] 在同一次持锁内完成。
#[derive(Clone, Debug)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Buffer>>,
}

impl SharedBuffer {
    pub fn new(capacity: usize, sink: Arc<dyn DiagnosticsSink>) -> Result<Self, BufferError> {
        Ok(Self::from_buffer(Buffer::new(capacity, sink)?))
    }

    pub fn from_buffer(buffer: Buffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    pub fn add(&self, entry: BufferEntry) {
        self.lock().add(entry);
    }

    pub fn remove_at(&self, index: usize) -> bool {
        self.lock().remove_at(index)
    }

    pub fn remove_many(&self, indices: impl IntoIterator<Item = usize>) -> usize {
        self.lock().remove_many(indices)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<BufferEntry> {
        self.lock().snapshot()
    }

    /// 在一次持锁内执行多步操作。
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut Buffer) -> R) -> R {
        f(&mut self.lock())
    }

    // 缓冲的每个操作要么完成要么未开始，锁中毒后可继续使用。
    fn lock(&self) -> MutexGuard<'_, Buffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
