//! 追踪、诊断输出与运行计数。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// 诊断级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        })
    }
}

/// 诊断输出抽象：即发即弃，永不让调用方失败。
pub trait DiagnosticsSink: Send + Sync {
    fn log(&self, module: &str, context: &str, level: DiagnosticLevel, message: &str);
}

/// 转发到 tracing 的诊断输出。
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn log(&self, module: &str, context: &str, level: DiagnosticLevel, message: &str) {
        match level {
            DiagnosticLevel::Info => {
                info!(target: "stager.diagnostics", module, context, "{}", message)
            }
            DiagnosticLevel::Warn => {
                warn!(target: "stager.diagnostics", module, context, "{}", message)
            }
            DiagnosticLevel::Error => {
                error!(target: "stager.diagnostics", module, context, "{}", message)
            }
        }
    }
}

/// 丢弃所有诊断。
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn log(&self, _module: &str, _context: &str, _level: DiagnosticLevel, _message: &str) {}
}

/// 单条诊断记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub module: String,
    pub context: String,
    pub level: DiagnosticLevel,
    pub message: String,
}

/// 内存诊断输出（用于测试与本地排查）。
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 指定级别的记录条数。
    pub fn count(&self, level: DiagnosticLevel) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|record| record.level == level)
            .count()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn log(&self, module: &str, context: &str, level: DiagnosticLevel, message: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(DiagnosticRecord {
                module: module.to_string(),
                context: context.to_string(),
                level,
                message: message.to_string(),
            });
    }
}

/// 计数快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub entries_added: u64,
    pub entries_evicted: u64,
    pub entries_removed: u64,
    pub invalid_indices: u64,
    pub lines_converted: u64,
    pub quality_rejected: u64,
    pub convert_failed: u64,
    pub upload_success: u64,
    pub upload_failure: u64,
    pub drain_cycles: u64,
}

/// 进程级运行计数。
#[derive(Debug, Default)]
pub struct TelemetryMetrics {
    entries_added: AtomicU64,
    entries_evicted: AtomicU64,
    entries_removed: AtomicU64,
    invalid_indices: AtomicU64,
    lines_converted: AtomicU64,
    quality_rejected: AtomicU64,
    convert_failed: AtomicU64,
    upload_success: AtomicU64,
    upload_failure: AtomicU64,
    drain_cycles: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries_added: self.entries_added.load(Ordering::Relaxed),
            entries_evicted: self.entries_evicted.load(Ordering::Relaxed),
            entries_removed: self.entries_removed.load(Ordering::Relaxed),
            invalid_indices: self.invalid_indices.load(Ordering::Relaxed),
            lines_converted: self.lines_converted.load(Ordering::Relaxed),
            quality_rejected: self.quality_rejected.load(Ordering::Relaxed),
            convert_failed: self.convert_failed.load(Ordering::Relaxed),
            upload_success: self.upload_success.load(Ordering::Relaxed),
            upload_failure: self.upload_failure.load(Ordering::Relaxed),
            drain_cycles: self.drain_cycles.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（输出到 stderr）；`RUST_LOG` 优先于传入的默认级别。
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 生成排空周期标识。
pub fn new_cycle_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn record_entry_added() {
    metrics().entries_added.fetch_add(1, Ordering::Relaxed);
}

/// 记录因容量上限被淘汰的条目。
pub fn record_entry_evicted() {
    metrics().entries_evicted.fetch_add(1, Ordering::Relaxed);
}

pub fn record_entry_removed() {
    metrics().entries_removed.fetch_add(1, Ordering::Relaxed);
}

pub fn record_invalid_index() {
    metrics().invalid_indices.fetch_add(1, Ordering::Relaxed);
}

pub fn record_line_converted() {
    metrics().lines_converted.fetch_add(1, Ordering::Relaxed);
}

/// 记录质量码非 Good 的拒绝次数。
pub fn record_quality_rejected() {
    metrics().quality_rejected.fetch_add(1, Ordering::Relaxed);
}

pub fn record_convert_failed() {
    metrics().convert_failed.fetch_add(1, Ordering::Relaxed);
}

pub fn record_upload_success() {
    metrics().upload_success.fetch_add(1, Ordering::Relaxed);
}

pub fn record_upload_failure() {
    metrics().upload_failure.fetch_add(1, Ordering::Relaxed);
}

pub fn record_drain_cycle() {
    metrics().drain_cycles.fetch_add(1, Ordering::Relaxed);
}
