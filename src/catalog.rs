//! Keyword catalog / 关键词目录
//!
//! One entry per non-empty line of the keyword source, in file order.
//! Duplicates are kept and counted independently.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DocscanError, Result};

/// Keyword query and its running hit counter / 关键词及命中计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub text: String,
    pub hit_count: u64,
}

impl KeywordEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hit_count: 0,
        }
    }
}

/// Load keywords from a file / 从文件加载关键词
///
/// An empty file is a valid, empty catalog.
pub fn load(path: &Path) -> Result<Vec<KeywordEntry>> {
    let content = std::fs::read(path).map_err(|source| DocscanError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = from_text(&String::from_utf8_lossy(&content));
    tracing::info!("Loaded {} keyword(s) from {:?}", entries.len(), path);
    Ok(entries)
}

/// Parse keyword lines / 解析关键词行
pub fn from_text(text: &str) -> Vec<KeywordEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(KeywordEntry::new)
        .collect()
}

/// Comma-joined keyword list in catalog order / 逗号连接的关键词列表
pub fn joined(entries: &[KeywordEntry]) -> String {
    entries
        .iter()
        .map(|e| e.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_and_duplicates() {
        let entries = from_text("alpha\nbeta\r\n\n   \nalpha\n  gamma delta  \n");
        let texts: Vec<_> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "beta", "alpha", "gamma delta"]);
        assert!(entries.iter().all(|e| e.hit_count == 0));
    }

    #[test]
    fn test_empty_source_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.txt");
        std::fs::write(&path, "").unwrap();

        let entries = load(&path).unwrap();
        assert!(entries.is_empty());
        assert_eq!(joined(&entries), "");
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, DocscanError::SourceUnavailable { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_joined() {
        let entries = from_text("alpha\nbeta\nalpha");
        assert_eq!(joined(&entries), "alpha, beta, alpha");
    }
}
