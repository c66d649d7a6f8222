//! Run context - every counter of one run lives here / 运行上下文
//!
//! Passed through the pipeline instead of global state, so repeated or
//! parallel runs never share counters.

use chrono::{DateTime, Local};
use std::collections::HashMap;

use crate::catalog::KeywordEntry;
use crate::report::RunSummary;

/// One enumerated document / 文档记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub filename: String,
    pub contains_any_keyword: bool,
}

/// One (keyword, document) hit / 命中记录
#[derive(Debug, Clone, PartialEq)]
pub struct HitLogRecord {
    pub timestamp: DateTime<Local>,
    pub keyword: String,
    pub filename: String,
}

#[derive(Debug, Default)]
pub struct RunContext {
    pub keywords: Vec<KeywordEntry>,
    pub documents: Vec<DocumentRecord>,
    pub hits: Vec<HitLogRecord>,
    by_name: HashMap<String, usize>,
}

impl RunContext {
    pub fn new(keywords: Vec<KeywordEntry>) -> Self {
        Self {
            keywords,
            ..Default::default()
        }
    }

    /// Register an enumerated document, returns its slot / 登记文档
    pub fn register_document(&mut self, filename: &str) -> usize {
        if let Some(&slot) = self.by_name.get(filename) {
            return slot;
        }
        let slot = self.documents.len();
        self.documents.push(DocumentRecord {
            filename: filename.to_string(),
            contains_any_keyword: false,
        });
        self.by_name.insert(filename.to_string(), slot);
        slot
    }

    pub fn document_slot(&self, filename: &str) -> Option<usize> {
        self.by_name.get(filename).copied()
    }

    /// Zero all hit state before a query phase / 查询前清零
    pub fn reset_hits(&mut self) {
        for entry in &mut self.keywords {
            entry.hit_count = 0;
        }
        for doc in &mut self.documents {
            doc.contains_any_keyword = false;
        }
        self.hits.clear();
    }

    pub fn documents_processed(&self) -> usize {
        self.documents.len()
    }

    pub fn documents_with_hits(&self) -> usize {
        self.documents.iter().filter(|d| d.contains_any_keyword).count()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            keywords: self.keywords.clone(),
            documents_processed: self.documents_processed(),
            documents_with_hits: self.documents_with_hits(),
        }
    }
}
