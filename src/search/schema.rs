//! Search index schema definition / 搜索索引的 Schema 定义

use serde::{Deserialize, Serialize};

/// Document number inside one index snapshot / 文档编号
pub type DocId = u32;

/// Name of the only searchable field / 唯一可检索字段
pub const CONTENT_FIELD: &str = "content";

/// One document handed to the index builder / 索引条目
///
/// `filename` is stored and returned by queries; `full_text` is only
/// searchable and is not kept in the snapshot.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub filename: String,
    pub full_text: String,
}

impl IndexEntry {
    pub fn new(filename: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            full_text: full_text.into(),
        }
    }
}

/// Folded character offsets of one term inside one document, ascending / 词项在文档中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub positions: Vec<u32>,
}

/// Index statistics / 索引统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub document_count: usize,
    pub term_count: usize,
    /// Commit time (Unix timestamp) / 提交时间
    pub committed_at: Option<i64>,
}
