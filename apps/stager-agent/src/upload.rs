//! 上传器：将行协议逐行写到标准输出，交由外部进程写入时序库。

use async_trait::async_trait;
use stager_pipeline::{LineUploader, PipelineError};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// 逐行写出到任意异步输出。
pub struct WriterUploader<W> {
    writer: Mutex<W>,
}

impl<W> WriterUploader<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl WriterUploader<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait]
impl<W> LineUploader for WriterUploader<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn upload(&self, lines: &[String]) -> Result<(), PipelineError> {
        let mut payload = lines.join("\n");
        payload.push('\n');
        let mut writer = self.writer.lock().await;
        writer
            .write_all(payload.as_bytes())
            .await
            .map_err(|err| PipelineError::Upload(err.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|err| PipelineError::Upload(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_one_line_per_entry() {
        let uploader = WriterUploader::new(Vec::new());
        uploader
            .upload(&["a x=1 1".to_string(), "b y=\"z\" 2".to_string()])
            .await
            .expect("upload");
        let written = uploader.writer.lock().await.clone();
        assert_eq!(String::from_utf8(written).expect("utf8"), "a x=1 1\nb y=\"z\" 2\n");
    }
}
