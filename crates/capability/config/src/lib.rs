//! 暂存代理运行配置加载。
//!
//! 配置来源依次为：JSON 配置文件（`STAGER_CONFIG`，默认 `config.json`），
//! 再由环境变量覆盖个别字段。文档在反序列化前先经过结构校验。

mod validation;

pub use validation::{Validation, validate_document};

use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::path::Path;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
    #[error("read config {0}: {1}")]
    Io(String, std::io::Error),
    #[error("parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config schema violation: {0}")]
    Schema(String),
}

/// 缓冲配置。
#[derive(Debug, Clone, Deserialize)]
pub struct BufferConfig {
    pub max_size: usize,
}

/// 排空周期配置。
#[derive(Debug, Clone, Deserialize)]
pub struct DrainSettings {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
}

impl Default for DrainSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_batch: default_max_batch(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_batch() -> usize {
    500
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 暂存代理运行配置。
#[derive(Debug, Clone, Deserialize)]
pub struct StagerConfig {
    pub buffer: BufferConfig,
    #[serde(default)]
    pub drain: DrainSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl StagerConfig {
    /// 校验并解析已读入的配置文档。
    pub fn from_value(document: Value) -> Result<Self, ConfigError> {
        let validation = validate_document(&document);
        if !validation.valid {
            return Err(ConfigError::Schema(validation.message));
        }
        Ok(serde_json::from_value(document)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(raw)?;
        Self::from_value(document)
    }

    /// 从 JSON 文件加载配置。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(path.display().to_string(), err))?;
        Self::from_json_str(&raw)
    }

    /// 读取 `STAGER_CONFIG` 指向的文件，并应用环境变量覆盖。
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = env::var("STAGER_CONFIG").unwrap_or_else(|_| "config.json".to_string());
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// 环境变量覆盖：`STAGER_BUFFER_MAX_SIZE`、`STAGER_DRAIN_INTERVAL_MS`、
    /// `STAGER_DRAIN_MAX_BATCH`、`STAGER_LOG_LEVEL`。
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(max_size) = read_optional_positive("STAGER_BUFFER_MAX_SIZE")? {
            self.buffer.max_size = max_size as usize;
        }
        if let Some(interval_ms) = read_optional_positive("STAGER_DRAIN_INTERVAL_MS")? {
            self.drain.interval_ms = interval_ms;
        }
        if let Some(max_batch) = read_optional_positive("STAGER_DRAIN_MAX_BATCH")? {
            self.drain.max_batch = max_batch as usize;
        }
        if let Some(level) = read_optional("STAGER_LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_optional_positive(key: &str) -> Result<Option<u64>, ConfigError> {
    let Some(value) = read_optional(key) else {
        return Ok(None);
    };
    match value.parse::<u64>() {
        Ok(number) if number > 0 => Ok(Some(number)),
        _ => Err(ConfigError::Invalid(key.to_string(), value)),
    }
}
