//! Query executor and query phase / 查询执行
//!
//! Keywords are evaluated on the worker pool against the sealed index;
//! hits are recorded afterwards in catalog order, one keyword at a time.

use rayon::prelude::*;
use std::io::Write;

use super::context::RunContext;
use super::recorder::HitRecorder;
use crate::activity_log::ActivityLog;
use crate::error::{DocscanError, Result};
use crate::search::{self, SealedIndex};

pub struct QueryExecutor<'a> {
    index: &'a SealedIndex,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(index: &'a SealedIndex) -> Self {
        Self { index }
    }

    /// Filenames matching one keyword / 执行单个关键词查询
    pub fn execute(&self, keyword: &str) -> Result<Vec<String>> {
        let query = search::parse(keyword).map_err(|e| DocscanError::QueryParseFailed {
            keyword: keyword.to_string(),
            cause: e.to_string(),
        })?;
        self.index.search_filenames(&query)
    }
}

/// Keywords whose query could not be parsed / 查询阶段结果
#[derive(Debug, Default)]
pub struct QueryPhaseOutcome {
    pub skipped_keywords: Vec<String>,
}

/// Run every keyword against the index and record hits / 查询阶段
pub fn run_queries<W: Write>(
    index: &SealedIndex,
    context: &mut RunContext,
    log: &mut ActivityLog<W>,
    pool: &rayon::ThreadPool,
) -> Result<QueryPhaseOutcome> {
    context.reset_hits();

    let executor = QueryExecutor::new(index);
    let results: Vec<Result<Vec<String>>> = pool.install(|| {
        context
            .keywords
            .par_iter()
            .map(|entry| executor.execute(&entry.text))
            .collect()
    });

    let mut outcome = QueryPhaseOutcome::default();
    let mut recorder = HitRecorder::new(context, log);
    for (keyword, result) in results.into_iter().enumerate() {
        match result {
            Ok(filenames) => {
                for filename in &filenames {
                    recorder.record(keyword, filename)?;
                }
            }
            Err(DocscanError::QueryParseFailed { keyword: text, cause }) => {
                tracing::warn!("Skipping keyword \"{}\": {}", text, cause);
                outcome.skipped_keywords.push(text);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}
