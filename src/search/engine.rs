//! Search engine - inverted index with an explicit commit barrier / 搜索引擎
//!
//! Two states, two types / 两种状态，两个类型：
//! - `IndexBuilder`: open, accepts `add` / 可写
//! - `SealedIndex`: committed to disk, accepts queries only / 只读
//!
//! `IndexBuilder::commit` consumes the builder, so a query before commit or
//! an add after commit does not compile.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use regex::Regex;

use super::query::Query;
use super::schema::{DocId, IndexEntry, IndexStats, Posting};
use super::store;
use super::tokenizer::tokenize_positions;
use crate::error::{DocscanError, Result};

/// Open index accepting documents / 可写索引
pub struct IndexBuilder {
    dir: PathBuf,
    filenames: Vec<String>,
    /// Inverted index: token -> postings sorted by doc id / 倒排索引
    postings: BTreeMap<String, Vec<Posting>>,
}

impl IndexBuilder {
    /// Create a fresh index at `dir`; prior contents are removed / 创建新索引
    pub fn create(dir: &Path) -> Result<Self> {
        store::recreate_dir(dir)?;
        tracing::info!("Index directory: {:?}", dir);
        Ok(Self {
            dir: dir.to_path_buf(),
            filenames: Vec::new(),
            postings: BTreeMap::new(),
        })
    }

    /// Index a single document (primitive operation) / 索引单个文档
    pub fn add(&mut self, entry: IndexEntry) -> DocId {
        let doc_id = self.filenames.len() as DocId;

        let mut occurrences: HashMap<String, Vec<u32>> = HashMap::new();
        for token in tokenize_positions(&entry.full_text) {
            occurrences.entry(token.term).or_default().push(token.start);
        }
        for (term, mut positions) in occurrences {
            positions.sort_unstable();
            positions.dedup();
            self.postings
                .entry(term)
                .or_default()
                .push(Posting { doc_id, positions });
        }

        self.filenames.push(entry.filename);
        doc_id
    }

    pub fn document_count(&self) -> usize {
        self.filenames.len()
    }

    /// Write the snapshot and seal the index / 提交并封存索引
    pub fn commit(self) -> Result<SealedIndex> {
        let stats = IndexStats {
            document_count: self.filenames.len(),
            term_count: self.postings.len(),
            committed_at: Some(chrono::Utc::now().timestamp()),
        };
        store::write_snapshot(&self.dir, &self.filenames, &self.postings, &stats)?;

        tracing::info!(
            "Index committed: {} document(s), {} term(s)",
            stats.document_count,
            stats.term_count
        );

        Ok(SealedIndex {
            filenames: self.filenames,
            postings: self.postings,
            stats,
        })
    }
}

/// Committed, read-only index / 已提交的只读索引
#[derive(Debug)]
pub struct SealedIndex {
    filenames: Vec<String>,
    postings: BTreeMap<String, Vec<Posting>>,
    stats: IndexStats,
}

impl SealedIndex {
    /// Load a committed snapshot / 加载已提交的索引
    pub fn open(dir: &Path) -> Result<Self> {
        let snapshot = store::read_snapshot(dir)?;
        Ok(Self {
            filenames: snapshot.filenames,
            postings: snapshot.postings,
            stats: snapshot.stats,
        })
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    pub fn filename(&self, doc_id: DocId) -> Option<&str> {
        self.filenames.get(doc_id as usize).map(String::as_str)
    }

    /// Matching documents in doc id order / 按文档编号返回匹配文档
    pub fn search(&self, query: &Query) -> Result<Vec<DocId>> {
        Ok(self.evaluate(query)?.into_iter().collect())
    }

    /// Matching filenames in doc id order / 返回匹配的文件名
    pub fn search_filenames(&self, query: &Query) -> Result<Vec<String>> {
        Ok(self
            .search(query)?
            .into_iter()
            .filter_map(|id| self.filename(id).map(str::to_string))
            .collect())
    }

    fn evaluate(&self, query: &Query) -> Result<BTreeSet<DocId>> {
        Ok(match query {
            Query::MatchNone => BTreeSet::new(),
            Query::Term(tokens) => tokens.iter().flat_map(|t| self.docs_with(t)).collect(),
            Query::Phrase(text) => self.phrase_docs(text),
            Query::Wildcard(pattern) => self.wildcard_docs(pattern)?,
            Query::Bool {
                must,
                should,
                must_not,
            } => {
                let mut matched = if !must.is_empty() {
                    let mut clauses = must.iter();
                    let mut acc = match clauses.next() {
                        Some(first) => self.evaluate(first)?,
                        None => BTreeSet::new(),
                    };
                    for clause in clauses {
                        let docs = self.evaluate(clause)?;
                        acc.retain(|id| docs.contains(id));
                    }
                    acc
                } else {
                    // Purely negative queries match nothing
                    let mut acc = BTreeSet::new();
                    for clause in should {
                        acc.extend(self.evaluate(clause)?);
                    }
                    acc
                };
                for clause in must_not {
                    for id in self.evaluate(clause)? {
                        matched.remove(&id);
                    }
                }
                matched
            }
        })
    }

    fn docs_with(&self, token: &str) -> impl Iterator<Item = DocId> + '_ {
        self.postings
            .get(token)
            .into_iter()
            .flat_map(|list| list.iter().map(|p| p.doc_id))
    }

    /// Documents where indexed words tile `phrase` end to end / 短语匹配
    ///
    /// `phrase` is in folded form (see `normalize_phrase`). Each state is a
    /// (document, offset) pair reached after consuming a prefix of the phrase.
    /// Any indexed word may cover the next stretch, so overlapping sub-words
    /// from search-mode segmentation still chain up.
    fn phrase_docs(&self, phrase: &str) -> BTreeSet<DocId> {
        let chars: Vec<char> = phrase.chars().collect();
        let n = chars.len();
        let mut reached: Vec<BTreeSet<(DocId, u32)>> = vec![BTreeSet::new(); n + 1];

        for j in 0..n {
            if j > 0 && reached[j].is_empty() {
                continue;
            }
            if chars[j] == ' ' {
                // One separator run in the text
                let next: Vec<_> = reached[j].iter().map(|&(doc, pos)| (doc, pos + 1)).collect();
                reached[j + 1].extend(next);
                continue;
            }

            let mut found = Vec::new();
            for k in (j + 1)..=n {
                if chars[k - 1] == ' ' {
                    break;
                }
                let term: String = chars[j..k].iter().collect();
                let Some(list) = self.postings.get(&term) else {
                    continue;
                };
                let len = (k - j) as u32;

                if j == 0 {
                    for posting in list {
                        for &pos in &posting.positions {
                            found.push((k, posting.doc_id, pos + len));
                        }
                    }
                } else {
                    for &(doc, pos) in &reached[j] {
                        let hit = find_posting(list, doc)
                            .is_some_and(|p| p.positions.binary_search(&pos).is_ok());
                        if hit {
                            found.push((k, doc, pos + len));
                        }
                    }
                }
            }
            for (k, doc, pos) in found {
                reached[k].insert((doc, pos));
            }
        }

        reached[n].iter().map(|&(doc, _)| doc).collect()
    }

    fn wildcard_docs(&self, pattern: &str) -> Result<BTreeSet<DocId>> {
        let mut matched = BTreeSet::new();

        // Trailing '*' only: walk the sorted term range / 前缀匹配
        if let Some(prefix) = pattern.strip_suffix('*') {
            if !prefix.contains(['*', '?']) {
                for (_, list) in self
                    .postings
                    .range(prefix.to_string()..)
                    .take_while(|(term, _)| term.starts_with(prefix))
                {
                    matched.extend(list.iter().map(|p| p.doc_id));
                }
                return Ok(matched);
            }
        }

        let regex = wildcard_regex(pattern)?;
        for (term, list) in &self.postings {
            if regex.is_match(term) {
                matched.extend(list.iter().map(|p| p.doc_id));
            }
        }
        Ok(matched)
    }
}

fn find_posting(list: &[Posting], doc_id: DocId) -> Option<&Posting> {
    list.binary_search_by_key(&doc_id, |p| p.doc_id)
        .ok()
        .map(|idx| &list[idx])
}

fn wildcard_regex(pattern: &str) -> Result<Regex> {
    let mut source = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            _ => source.push_str(&regex::escape(&c.to_string())),
        }
    }
    source.push('$');
    Regex::new(&source)
        .map_err(|e| DocscanError::QueryParseFailed {
            keyword: pattern.to_string(),
            cause: e.to_string(),
        })
}
