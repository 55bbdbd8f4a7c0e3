//! 标准输入采集：每行一个带类别标记的 JSON 条目。

use stager_buffer::SharedBuffer;
use stager_lineproto::decode_entry_str;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

/// 逐行解码并写入缓冲，直到输入结束；返回成功写入的条目数。
///
/// 无法解码的行仅告警，不中断读取。
pub async fn read_entries<R>(reader: R, buffer: SharedBuffer) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut added = 0;
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match decode_entry_str(line) {
            Ok(entry) => {
                debug!(
                    target: "stager.ingest",
                    line_no,
                    kind = entry.kind().as_str(),
                    "entry_decoded"
                );
                buffer.add(entry);
                added += 1;
            }
            Err(err) => {
                warn!(target: "stager.ingest", line_no, error = %err, "entry_decode_failed");
            }
        }
    }
    Ok(added)
}
