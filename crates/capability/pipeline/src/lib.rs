//! 排空流水线：快照 → 转换 → 上传 → 移除。

use async_trait::async_trait;
use domain::BufferEntry;
use stager_buffer::SharedBuffer;
use stager_config::DrainSettings;
use stager_lineproto::{ConvertError, convert};
use stager_telemetry::{
    new_cycle_id, record_convert_failed, record_drain_cycle, record_line_converted,
    record_quality_rejected, record_upload_failure, record_upload_success,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, warn};

/// Pipeline 处理错误。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("upload error: {0}")]
    Upload(String),
}

/// 排空参数。
#[derive(Debug, Clone)]
pub struct DrainConfig {
    /// 单个周期最多处理的条目数（从缓冲头部起算）。
    pub max_batch: usize,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self { max_batch: 500 }
    }
}

impl DrainConfig {
    fn sanitized(mut self) -> Self {
        if self.max_batch == 0 {
            self.max_batch = 1;
        }
        self
    }
}

impl From<&DrainSettings> for DrainConfig {
    fn from(settings: &DrainSettings) -> Self {
        Self {
            max_batch: settings.max_batch,
        }
    }
}

/// 单个排空周期的结果。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub converted: usize,
    pub rejected: usize,
    pub failed: usize,
    pub uploaded: usize,
    pub removed: usize,
}

/// 行协议上传抽象。
#[async_trait]
pub trait LineUploader: Send + Sync {
    async fn upload(&self, lines: &[String]) -> Result<(), PipelineError>;
}

/// 空上传器（用于接线与测试）。
#[derive(Debug, Default)]
pub struct NoopUploader;

#[async_trait]
impl LineUploader for NoopUploader {
    async fn upload(&self, _lines: &[String]) -> Result<(), PipelineError> {
        Ok(())
    }
}

/// 收集所有上传行的内存上传器。
#[derive(Debug, Default)]
pub struct MemoryUploader {
    lines: Mutex<Vec<String>>,
}

impl MemoryUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lines(&self) -> Vec<String> {
        self.lines.lock().await.clone()
    }
}

#[async_trait]
impl LineUploader for MemoryUploader {
    async fn upload(&self, lines: &[String]) -> Result<(), PipelineError> {
        self.lines.lock().await.extend_from_slice(lines);
        Ok(())
    }
}

/// 缓冲排空器。
///
/// 转换失败（含质量门拒绝）的条目永远无法成功，随同周期移除；
/// 上传失败时已转换的条目保留在缓冲中等待下个周期。
#[derive(Clone)]
pub struct Drainer {
    buffer: SharedBuffer,
    uploader: Arc<dyn LineUploader>,
    config: DrainConfig,
}

impl Drainer {
    pub fn new(buffer: SharedBuffer, uploader: Arc<dyn LineUploader>) -> Self {
        Self::with_config(buffer, uploader, DrainConfig::default())
    }

    pub fn with_config(
        buffer: SharedBuffer,
        uploader: Arc<dyn LineUploader>,
        config: DrainConfig,
    ) -> Self {
        Self {
            buffer,
            uploader,
            config: config.sanitized(),
        }
    }

    pub async fn drain_once(&self) -> Result<DrainReport, PipelineError> {
        let cycle_id = new_cycle_id();
        let span = tracing::info_span!("drain", cycle_id = %cycle_id);
        self.drain_cycle().instrument(span).await
    }

    async fn drain_cycle(&self) -> Result<DrainReport, PipelineError> {
        record_drain_cycle();
        let max_batch = self.config.max_batch;
        let (snapshot, evictions) = self.buffer.with_lock(|buffer| {
            let mut snapshot = buffer.snapshot();
            snapshot.truncate(max_batch);
            (snapshot, buffer.evictions())
        });
        if snapshot.is_empty() {
            return Ok(DrainReport::default());
        }

        let mut report = DrainReport::default();
        let mut lines = Vec::new();
        let mut converted_indices = Vec::new();
        let mut dropped_indices = Vec::new();
        for (index, entry) in snapshot.iter().enumerate() {
            match convert(entry) {
                Ok(line) => {
                    record_line_converted();
                    report.converted += 1;
                    converted_indices.push(index);
                    lines.push(line);
                }
                Err(ConvertError::QualityRejected(status)) => {
                    record_quality_rejected();
                    debug!(
                        target: "stager.pipeline",
                        index,
                        status = %status,
                        "quality_rejected"
                    );
                    report.rejected += 1;
                    dropped_indices.push(index);
                }
                Err(err) => {
                    record_convert_failed();
                    warn!(
                        target: "stager.pipeline",
                        index,
                        kind = entry.kind().as_str(),
                        error = %err,
                        "convert_failed"
                    );
                    report.failed += 1;
                    dropped_indices.push(index);
                }
            }
        }

        let upload = if lines.is_empty() {
            Ok(())
        } else {
            self.uploader.upload(&lines).await
        };

        let mut removable = dropped_indices;
        match &upload {
            Ok(()) => {
                if !lines.is_empty() {
                    record_upload_success();
                }
                report.uploaded = lines.len();
                removable.extend(converted_indices);
            }
            Err(err) => {
                record_upload_failure();
                warn!(
                    target: "stager.pipeline",
                    lines = lines.len(),
                    error = %err,
                    "upload_failed"
                );
            }
        }

        report.removed = self.remove_settled(&snapshot, evictions, removable);
        upload?;

        info!(
            target: "stager.pipeline",
            converted = report.converted,
            rejected = report.rejected,
            failed = report.failed,
            removed = report.removed,
            "drain_completed"
        );
        Ok(report)
    }

    /// 按快照以来的淘汰次数换算当前下标后移除。
    ///
    /// 快照下标减去淘汰数即为条目现在的位置；结果为负说明条目已被淘汰，跳过。
    /// 换算后的位置若不再是快照中的条目（被其他调用方移除过），同样跳过。
    fn remove_settled(
        &self,
        snapshot: &[BufferEntry],
        evictions_at_snapshot: u64,
        indices: Vec<usize>,
    ) -> usize {
        if indices.is_empty() {
            return 0;
        }
        self.buffer.with_lock(|buffer| {
            let evicted = buffer.evictions().saturating_sub(evictions_at_snapshot);
            let shift = usize::try_from(evicted).unwrap_or(usize::MAX);
            let current = indices
                .into_iter()
                .filter_map(|index| {
                    let position = index.checked_sub(shift)?;
                    (buffer.get(position) == snapshot.get(index)).then_some(position)
                })
                .collect::<Vec<_>>();
            buffer.remove_many(current)
        })
    }

    /// 按固定周期排空，直到 `shutdown` 完成。
    ///
    /// 退出前连续排空，直到缓冲为空、上传失败或某一周期没有移除任何条目。
    pub async fn run(&self, interval: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.drain_once().await {
                        warn!(target: "stager.pipeline", error = %err, "drain_cycle_failed");
                    }
                }
                _ = &mut shutdown => break,
            }
        }

        while !self.buffer.is_empty() {
            match self.drain_once().await {
                Ok(report) if report.removed > 0 => {}
                Ok(_) => break,
                Err(err) => {
                    warn!(target: "stager.pipeline", error = %err, "final_drain_failed");
                    break;
                }
            }
        }
        info!(target: "stager.pipeline", remaining = self.buffer.len(), "drain_stopped");
    }
}
