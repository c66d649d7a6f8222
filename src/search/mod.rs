//! Search module - only provides index primitives, does not control flow / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Search module only exposes primitive operations: add, commit, search
//! - The pipeline controls enumeration, extraction, concurrency, error recovery
//! - Call direction: Pipeline → Search (unidirectional) / 调用方向
//!
//! Index features / 索引特性：
//! - Inverted index with positions, directory-backed snapshot per run
//! - Multilingual tokenization (jieba + lowercase)
//! - Free-text queries: terms, phrases, boolean operators, wildcards

pub mod engine;
pub mod query;
pub mod schema;
pub mod store;
pub mod tokenizer;

pub use engine::{IndexBuilder, SealedIndex};
pub use query::{parse, ParseError, Query};
pub use schema::{DocId, IndexEntry, IndexStats};
