//! Extraction adapter - document file to plain text + metadata / 文本提取
//!
//! The pipeline only depends on the `Extractor` trait; `DefaultExtractor`
//! handles PDF and plain-text documents.

pub mod language;
pub mod pdf;
pub mod text;

use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use encoding_rs::Encoding;
use serde::Serialize;
use std::path::Path;

use crate::config::PipelineConfig;
use crate::error::{DocscanError, Result};

/// Document metadata / 文档元数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub author: Option<String>,
    pub content_type: String,
    pub last_modified: Option<DateTime<FixedOffset>>,
    /// ISO 639-1 code or "unknown" / 语言代码
    pub detected_language: String,
}

impl DocumentMetadata {
    pub fn last_modified_display(&self) -> String {
        self.last_modified
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Extracted text and metadata / 提取结果
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Turns one document file into text; failures are per document / 文本提取接口
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument>;
}

/// Extension dispatching extractor / 按扩展名分发的提取器
pub struct DefaultExtractor {
    fallback_encoding: &'static Encoding,
}

impl DefaultExtractor {
    pub fn new(fallback_encoding: &'static Encoding) -> Self {
        Self { fallback_encoding }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let encoding = Encoding::for_label(config.text_encoding.as_bytes()).ok_or_else(|| {
            DocscanError::Config(format!("unknown text encoding: {}", config.text_encoding))
        })?;
        Ok(Self::new(encoding))
    }
}

impl Default for DefaultExtractor {
    fn default() -> Self {
        Self::new(encoding_rs::UTF_8)
    }
}

impl Extractor for DefaultExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "pdf" => pdf::extract(path),
            "txt" | "text" | "md" | "markdown" | "csv" | "tsv" | "log" => {
                text::extract(path, self.fallback_encoding)
            }
            _ => Err(DocscanError::extraction(
                file_name(path),
                format!("unsupported document type: .{}", ext),
            )),
        }
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// File system modification time / 文件修改时间
pub(crate) fn file_mtime(path: &Path) -> Option<DateTime<FixedOffset>> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).fixed_offset())
}
