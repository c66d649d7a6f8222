//! Report generator / 报告生成
//!
//! The report is rendered from the final run summary and written once,
//! through a temporary sibling file renamed into place.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::catalog::{self, KeywordEntry};
use crate::error::{DocscanError, Result};

/// Aggregate of one run, computed once at the end / 运行汇总
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub keywords: Vec<KeywordEntry>,
    pub documents_processed: usize,
    pub documents_with_hits: usize,
}

/// Render the report text / 生成报告文本
pub fn emit(keywords: &[KeywordEntry], total_documents: usize, documents_with_hits: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Keyword(s) used: {}\n", catalog::joined(keywords)));
    out.push_str(&format!("No of files processed: {}\n", total_documents));
    out.push_str(&format!("No of files containing keyword(s): {}\n", documents_with_hits));
    out.push('\n');
    out.push_str("No of occurrences of each keyword:\n");
    out.push_str("----------------------------------\n");
    for entry in keywords {
        out.push_str(&format!("\t{}: {}\n", entry.text, entry.hit_count));
    }
    out
}

impl RunSummary {
    pub fn render(&self) -> String {
        emit(&self.keywords, self.documents_processed, self.documents_with_hits)
    }
}

/// Remove a report left by an earlier run / 删除旧报告
pub fn discard_previous(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("Removed previous report {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DocscanError::ReportUnwritable(e)),
    }
}

/// Write the report atomically / 原子写入报告
///
/// On failure the temporary file is removed and no report is left behind.
pub fn write(path: &Path, summary: &RunSummary) -> Result<()> {
    let temp_path = temp_path(path);

    // 替换原文件
    let result = write_temp(&temp_path, summary)
        .and_then(|_| std::fs::rename(&temp_path, path))
        .map_err(DocscanError::ReportUnwritable);
    if let Err(e) = result {
        if let Err(cleanup) = std::fs::remove_file(&temp_path) {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Cannot remove {:?}: {}", temp_path, cleanup);
            }
        }
        return Err(e);
    }

    tracing::info!("Report written to {:?}", path);
    Ok(())
}

fn write_temp(temp_path: &Path, summary: &RunSummary) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(summary.render().as_bytes())?;
    writer.flush()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
