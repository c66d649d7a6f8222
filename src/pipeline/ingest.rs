//! Ingestion phase / 文档摄取
//!
//! Extraction runs on the worker pool in batches; metadata logging and
//! index writes happen on the calling thread in enumeration order.

use rayon::prelude::*;
use std::io::Write;

use super::context::RunContext;
use crate::activity_log::ActivityLog;
use crate::error::{DocscanError, Result};
use crate::extract::{ExtractedDocument, Extractor};
use crate::search::{IndexBuilder, IndexEntry};
use crate::source::DocumentFile;

/// Documents extracted concurrently before being written out / 批大小倍数
const BATCH_PER_WORKER: usize = 4;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub indexed: usize,
    pub failed_documents: Vec<String>,
}

pub fn ingest<W: Write>(
    files: &[DocumentFile],
    extractor: &dyn Extractor,
    builder: &mut IndexBuilder,
    context: &mut RunContext,
    log: &mut ActivityLog<W>,
    pool: &rayon::ThreadPool,
) -> Result<IngestOutcome> {
    for file in files {
        context.register_document(&file.filename);
    }

    let batch = (pool.current_num_threads() * BATCH_PER_WORKER).max(1);
    let mut outcome = IngestOutcome::default();

    for chunk in files.chunks(batch) {
        let extracted: Vec<Result<ExtractedDocument>> = pool.install(|| {
            chunk
                .par_iter()
                .map(|file| extractor.extract(&file.path))
                .collect()
        });

        for (file, result) in chunk.iter().zip(extracted) {
            match result {
                Ok(doc) => {
                    log.metadata(&file.filename, &doc.metadata)?;
                    builder.add(IndexEntry::new(file.filename.clone(), doc.text));
                    outcome.indexed += 1;
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Skipping \"{}\": {}", file.filename, e);
                    let cause = match &e {
                        DocscanError::ExtractionFailed { cause, .. } => cause.clone(),
                        other => other.to_string(),
                    };
                    log.extraction_failed(&file.filename, &cause)?;
                    outcome.failed_documents.push(file.filename.clone());
                }
                Err(e) => return Err(e),
            }
        }
    }

    tracing::info!(
        "Ingested {} document(s), {} failed",
        outcome.indexed,
        outcome.failed_documents.len()
    );
    Ok(outcome)
}
