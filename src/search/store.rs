//! 索引快照 - 流式写入 + 流式读取
//!
//! 快照目录结构（每行一条记录，TSV格式）：
//! - docs.tsv:     doc_id\tfilename
//! - postings.tsv: term\tdoc_id:pos,pos;doc_id:pos
//! - meta.json:    IndexStats
//!
//! 字段中的 `\`、制表符和换行会被转义

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use super::schema::{DocId, IndexStats, Posting};
use crate::error::{DocscanError, Result};

pub const DOCS_FILE: &str = "docs.tsv";
pub const POSTINGS_FILE: &str = "postings.tsv";
pub const META_FILE: &str = "meta.json";

/// 快照内容
pub struct Snapshot {
    pub filenames: Vec<String>,
    pub postings: BTreeMap<String, Vec<Posting>>,
    pub stats: IndexStats,
}

/// 重新创建索引目录（旧内容不保留）
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| {
            DocscanError::IndexCommit(format!("cannot clear index directory {:?}: {}", dir, e))
        })?;
    }
    std::fs::create_dir_all(dir).map_err(|e| {
        DocscanError::IndexCommit(format!("cannot create index directory {:?}: {}", dir, e))
    })
}

/// 写入快照（提交）
pub fn write_snapshot(
    dir: &Path,
    filenames: &[String],
    postings: &BTreeMap<String, Vec<Posting>>,
    stats: &IndexStats,
) -> Result<()> {
    let commit_err = |e: std::io::Error| DocscanError::IndexCommit(e.to_string());

    let mut docs = create_writer(&dir.join(DOCS_FILE)).map_err(commit_err)?;
    for (doc_id, filename) in filenames.iter().enumerate() {
        writeln!(docs, "{}\t{}", doc_id, escape(filename)).map_err(commit_err)?;
    }
    docs.flush().map_err(commit_err)?;

    let mut writer = create_writer(&dir.join(POSTINGS_FILE)).map_err(commit_err)?;
    for (term, list) in postings {
        let encoded = list
            .iter()
            .map(|p| {
                let positions = p
                    .positions
                    .iter()
                    .map(|pos| pos.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}:{}", p.doc_id, positions)
            })
            .collect::<Vec<_>>()
            .join(";");
        writeln!(writer, "{}\t{}", escape(term), encoded).map_err(commit_err)?;
    }
    writer.flush().map_err(commit_err)?;

    let meta = serde_json::to_string_pretty(stats)
        .map_err(|e| DocscanError::IndexCommit(e.to_string()))?;
    std::fs::write(dir.join(META_FILE), meta).map_err(commit_err)?;

    Ok(())
}

/// 读取快照
pub fn read_snapshot(dir: &Path) -> Result<Snapshot> {
    let stats: IndexStats = {
        let content = std::fs::read_to_string(dir.join(META_FILE))
            .map_err(|e| corrupt(format!("{}: {}", META_FILE, e)))?;
        serde_json::from_str(&content).map_err(|e| corrupt(format!("{}: {}", META_FILE, e)))?
    };

    let mut filenames = Vec::with_capacity(stats.document_count);
    for (line_no, line) in open_lines(&dir.join(DOCS_FILE))?.enumerate() {
        let line = line.map_err(|e| corrupt(format!("{}: {}", DOCS_FILE, e)))?;
        let (id, name) = line
            .split_once('\t')
            .ok_or_else(|| corrupt(format!("{} line {}: missing field", DOCS_FILE, line_no + 1)))?;
        if id.parse::<usize>().ok() != Some(filenames.len()) {
            return Err(corrupt(format!("{} line {}: unexpected doc id {}", DOCS_FILE, line_no + 1, id)));
        }
        filenames.push(unescape(name));
    }

    let mut postings = BTreeMap::new();
    for (line_no, line) in open_lines(&dir.join(POSTINGS_FILE))?.enumerate() {
        let line = line.map_err(|e| corrupt(format!("{}: {}", POSTINGS_FILE, e)))?;
        let bad_line = || corrupt(format!("{} line {}: malformed posting", POSTINGS_FILE, line_no + 1));

        let (term, encoded) = line.split_once('\t').ok_or_else(bad_line)?;
        let mut list = Vec::new();
        for entry in encoded.split(';') {
            let (doc, positions) = entry.split_once(':').ok_or_else(bad_line)?;
            let doc_id: DocId = doc.parse().map_err(|_| bad_line())?;
            if doc_id as usize >= filenames.len() {
                return Err(bad_line());
            }
            let positions = positions
                .split(',')
                .map(|p| p.parse::<u32>())
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| bad_line())?;
            list.push(Posting { doc_id, positions });
        }
        postings.insert(unescape(term), list);
    }

    if filenames.len() != stats.document_count || postings.len() != stats.term_count {
        return Err(corrupt(format!(
            "{} does not match snapshot contents ({} docs, {} terms)",
            META_FILE,
            filenames.len(),
            postings.len()
        )));
    }

    Ok(Snapshot {
        filenames,
        postings,
        stats,
    })
}

fn create_writer(path: &Path) -> std::io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::with_capacity(64 * 1024, file)) // 64KB缓冲
}

fn open_lines(path: &Path) -> Result<std::io::Lines<BufReader<File>>> {
    let file = File::open(path).map_err(|e| corrupt(format!("{:?}: {}", path, e)))?;
    Ok(BufReader::with_capacity(256 * 1024, file).lines())
}

fn corrupt(message: String) -> DocscanError {
    DocscanError::IndexCorrupt(message)
}

fn escape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
