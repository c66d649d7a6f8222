//! Run configuration module / 运行配置模块
//!
//! Loads configuration from config.json, falls back to built-in defaults
//! when the file does not exist / 配置文件不存在时使用默认配置

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocscanError, Result};

/// Default config file name / 默认配置文件名
pub const CONFIG_FILE: &str = "config.json";

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Input locations / 输入配置
    pub input: InputConfig,
    /// Output artifacts / 输出配置
    pub output: OutputConfig,
    /// Pipeline tuning / 流水线配置
    pub pipeline: PipelineConfig,
}

/// Input configuration / 输入配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Keyword list, one query per line / 关键词文件
    pub keywords_file: String,
    /// Directory scanned for documents / 文档目录
    pub documents_dir: String,
    /// Accepted file extensions (case-insensitive) / 接受的扩展名
    pub extensions: Vec<String>,
}

/// Output configuration / 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Activity log / 活动日志
    pub log_file: String,
    /// Summary report / 汇总报告
    pub report_file: String,
    /// Index snapshot directory, recreated each run / 索引目录
    pub index_dir: String,
}

/// Pipeline configuration / 流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker threads for extraction and querying (0 = CPU count) / 工作线程数
    pub workers: usize,
    /// Sort documents by natural filename order / 按文件名自然排序
    pub sort_documents: bool,
    /// Fallback encoding label for non UTF-8 text files / 文本回退编码
    pub text_encoding: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            keywords_file: "queries.txt".to_string(),
            documents_dir: "tikadataset".to_string(),
            extensions: vec!["pdf".to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_file: "log.txt".to_string(),
            report_file: "output.txt".to_string(),
            index_dir: "index".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            sort_documents: true,
            text_encoding: "utf-8".to_string(),
        }
    }
}

impl AppConfig {
    pub fn keywords_path(&self) -> PathBuf {
        PathBuf::from(&self.input.keywords_file)
    }

    pub fn documents_path(&self) -> PathBuf {
        PathBuf::from(&self.input.documents_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(&self.output.log_file)
    }

    pub fn report_path(&self) -> PathBuf {
        PathBuf::from(&self.output.report_file)
    }

    pub fn index_path(&self) -> PathBuf {
        PathBuf::from(&self.output.index_dir)
    }

    /// Effective worker count / 实际工作线程数
    pub fn worker_count(&self) -> usize {
        if self.pipeline.workers == 0 {
            num_cpus::get()
        } else {
            self.pipeline.workers
        }
    }

    /// Reject settings the pipeline cannot run with / 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.input.extensions.is_empty() {
            return Err(DocscanError::Config(
                "input.extensions must name at least one extension".to_string(),
            ));
        }
        if encoding_rs::Encoding::for_label(self.pipeline.text_encoding.as_bytes()).is_none() {
            return Err(DocscanError::Config(format!(
                "unknown text encoding: {}",
                self.pipeline.text_encoding
            )));
        }
        Ok(())
    }
}

/// Get the default config file path / 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Load configuration from file, or use defaults if not exists / 加载配置文件，不存在则使用默认配置
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let config = if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .map_err(|e| DocscanError::Config(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| DocscanError::Config(format!("Failed to parse config file: {}", e)))?;

        tracing::info!("Loaded configuration from {:?}", config_path);
        config
    } else {
        tracing::info!("No configuration at {:?}, using defaults", config_path);
        AppConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Save configuration to file / 保存配置到文件
pub fn save_config(config: &AppConfig, config_path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| DocscanError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(config_path, content)
        .map_err(|e| DocscanError::Config(format!("Failed to write config file: {}", e)))?;

    Ok(())
}
