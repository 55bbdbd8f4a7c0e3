//! 暂存代理：标准输入采集 → 有界缓冲 → 周期排空为行协议。

mod ingest;
mod upload;

use stager_buffer::{Buffer, SharedBuffer};
use stager_config::StagerConfig;
use stager_pipeline::{DrainConfig, Drainer};
use stager_telemetry::{DiagnosticsSink, TracingSink, init_tracing, metrics};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::{info, warn};
use upload::WriterUploader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 读取配置文件并应用环境变量覆盖
    let config = StagerConfig::from_env()?;
    // 初始化结构化日志
    init_tracing(&config.log.level);

    let sink: Arc<dyn DiagnosticsSink> = Arc::new(TracingSink);
    let buffer = SharedBuffer::from_buffer(Buffer::from_config(&config.buffer, sink)?);
    let drainer = Drainer::with_config(
        buffer.clone(),
        Arc::new(WriterUploader::stdout()),
        DrainConfig::from(&config.drain),
    );

    info!(
        target: "stager.agent",
        max_size = config.buffer.max_size,
        interval_ms = config.drain.interval_ms,
        max_batch = config.drain.max_batch,
        "stager_started"
    );

    let mut reader = tokio::spawn(ingest::read_entries(
        BufReader::new(tokio::io::stdin()),
        buffer.clone(),
    ));

    // ctrl-c 或标准输入结束时退出主循环
    let shutdown = async {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(target: "stager.agent", "ctrl_c_received");
            }
            result = &mut reader => match result {
                Ok(Ok(added)) => info!(target: "stager.agent", added, "stdin_closed"),
                Ok(Err(err)) => warn!(target: "stager.agent", error = %err, "stdin_read_failed"),
                Err(err) => warn!(target: "stager.agent", error = %err, "reader_task_failed"),
            },
        }
        // 停止采集后再做退出前的排空
        reader.abort();
    };
    drainer
        .run(Duration::from_millis(config.drain.interval_ms), shutdown)
        .await;

    let snapshot = metrics().snapshot();
    info!(
        target: "stager.agent",
        remaining = buffer.len(),
        added = snapshot.entries_added,
        evicted = snapshot.entries_evicted,
        converted = snapshot.lines_converted,
        rejected = snapshot.quality_rejected,
        failed = snapshot.convert_failed,
        "stager_stopped"
    );
    Ok(())
}
