//! Error taxonomy / 错误分类
//!
//! Fatal errors abort the run before a report is written.
//! Recoverable errors are handled per document or per keyword.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocscanError {
    /// Keyword list could not be read / 关键词文件不可读
    #[error("keyword source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document directory missing or unreadable / 文档目录不可读
    #[error("document directory unavailable: {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction failed for \"{file}\": {cause}")]
    ExtractionFailed { file: String, cause: String },

    #[error("query parse failed for \"{keyword}\": {cause}")]
    QueryParseFailed { keyword: String, cause: String },

    #[error("activity log unwritable: {0}")]
    LogUnwritable(#[source] std::io::Error),

    #[error("index commit failed: {0}")]
    IndexCommit(String),

    #[error("index snapshot corrupt: {0}")]
    IndexCorrupt(String),

    #[error("report unwritable: {0}")]
    ReportUnwritable(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DocscanError>;

impl DocscanError {
    pub fn extraction(file: impl Into<String>, cause: impl ToString) -> Self {
        DocscanError::ExtractionFailed {
            file: file.into(),
            cause: cause.to_string(),
        }
    }

    /// Per-item failures that must not abort the run / 可恢复错误（跳过当前项）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DocscanError::ExtractionFailed { .. } | DocscanError::QueryParseFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_split() {
        assert!(DocscanError::extraction("a.pdf", "corrupt").is_recoverable());
        assert!(DocscanError::QueryParseFailed {
            keyword: "(".into(),
            cause: "unbalanced".into(),
        }
        .is_recoverable());
        assert!(!DocscanError::IndexCommit("disk full".into()).is_recoverable());
        assert!(!DocscanError::LogUnwritable(std::io::Error::other("ro")).is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = DocscanError::extraction("doc1.pdf", "document is encrypted");
        assert_eq!(
            err.to_string(),
            "extraction failed for \"doc1.pdf\": document is encrypted"
        );
    }
}
