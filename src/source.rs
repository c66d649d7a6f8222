//! Document source - enumerate candidate documents in a directory / 文档来源
//!
//! Filtering is a plain predicate over the file name; the default predicate
//! is built from the configured extensions.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::{DocscanError, Result};

/// Enumerated document file / 枚举到的文档文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub path: PathBuf,
    /// File name only, used as the document's identity in logs and the index
    pub filename: String,
}

/// Case-insensitive whole-name extension match / 扩展名过滤（不区分大小写）
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    pattern: Regex,
}

impl ExtensionFilter {
    pub fn new(extensions: &[String]) -> Result<Self> {
        let alternatives = extensions
            .iter()
            .map(|ext| regex::escape(ext.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?is)^.*\.(?:{})$", alternatives))
            .map_err(|e| DocscanError::Config(format!("invalid extension pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    pub fn accept(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// List accepted regular files of `dir` / 列出目录中被接受的文件
///
/// With `sort` the result is in natural filename order, otherwise in the
/// order the file system returns entries.
pub fn enumerate<F>(dir: &Path, accept: F, sort: bool) -> Result<Vec<DocumentFile>>
where
    F: Fn(&str) -> bool,
{
    let unavailable = |source| DocscanError::DirectoryUnavailable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unavailable)? {
        let entry = entry.map_err(unavailable)?;
        let filename = entry.file_name().to_string_lossy().to_string();
        if !accept(&filename) {
            continue;
        }

        let path = entry.path();
        if !path.is_file() {
            tracing::debug!("Skipping non-file entry {:?}", path);
            continue;
        }
        files.push(DocumentFile { path, filename });
    }

    if sort {
        files.sort_by(|a, b| natord::compare(&a.filename, &b.filename));
    }

    tracing::info!("Enumerated {} document(s) in {:?}", files.len(), dir);
    Ok(files)
}
