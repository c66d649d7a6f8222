//! Pipeline orchestration / 流水线编排
//!
//! Fixed phase order / 固定阶段顺序：
//! 1. discard previous report, open activity log
//! 2. load keyword catalog, enumerate documents
//! 3. ingest (extract + log + add), commit index
//! 4. query phase (evaluate keywords, record hits)
//! 5. write report
//!
//! Any fatal error returns before step 5, so no report exists for a failed run.

pub mod context;
pub mod executor;
pub mod ingest;
pub mod recorder;

pub use context::{DocumentRecord, HitLogRecord, RunContext};
pub use executor::{run_queries, QueryExecutor, QueryPhaseOutcome};
pub use ingest::{ingest, IngestOutcome};
pub use recorder::HitRecorder;

use crate::activity_log::ActivityLog;
use crate::catalog;
use crate::config::AppConfig;
use crate::error::{DocscanError, Result};
use crate::extract::{DefaultExtractor, Extractor};
use crate::report::{self, RunSummary};
use crate::search::{IndexBuilder, IndexStats};
use crate::source::{self, ExtensionFilter};

/// Everything a finished run produced / 运行结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub documents: Vec<DocumentRecord>,
    pub hits: Vec<HitLogRecord>,
    pub failed_documents: Vec<String>,
    pub skipped_keywords: Vec<String>,
    pub index_stats: IndexStats,
}

pub struct Pipeline {
    config: AppConfig,
    extractor: Box<dyn Extractor>,
}

impl Pipeline {
    /// Pipeline with the built-in extractor / 使用默认提取器
    pub fn new(config: AppConfig) -> Result<Self> {
        let extractor = DefaultExtractor::from_config(&config.pipeline)?;
        Ok(Self::with_extractor(config, Box::new(extractor)))
    }

    pub fn with_extractor(config: AppConfig, extractor: Box<dyn Extractor>) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Execute one complete run / 执行一次完整运行
    pub fn run(&self) -> Result<RunOutcome> {
        let config = &self.config;
        config.validate()?;

        let report_path = config.report_path();
        report::discard_previous(&report_path)?;

        let mut log = ActivityLog::create(&config.log_path())?;

        let keywords = catalog::load(&config.keywords_path())?;
        tracing::info!("Loaded {} keyword(s)", keywords.len());

        let filter = ExtensionFilter::new(&config.input.extensions)?;
        let files = source::enumerate(
            &config.documents_path(),
            |name| filter.accept(name),
            config.pipeline.sort_documents,
        )?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_count())
            .thread_name(|i| format!("docscan-worker-{}", i))
            .build()
            .map_err(|e| DocscanError::Config(format!("Failed to build worker pool: {}", e)))?;

        let mut context = RunContext::new(keywords);
        let mut builder = IndexBuilder::create(&config.index_path())?;
        let ingested = ingest(
            &files,
            self.extractor.as_ref(),
            &mut builder,
            &mut context,
            &mut log,
            &pool,
        )?;

        let index = builder.commit()?;
        let queried = run_queries(&index, &mut context, &mut log, &pool)?;

        let summary = context.summary();
        report::write(&report_path, &summary)?;

        tracing::info!(
            "Run complete: {} processed, {} with hits, {} hit(s) logged",
            summary.documents_processed,
            summary.documents_with_hits,
            context.hits.len()
        );

        Ok(RunOutcome {
            summary,
            documents: context.documents,
            hits: context.hits,
            failed_documents: ingested.failed_documents,
            skipped_keywords: queried.skipped_keywords,
            index_stats: index.stats().clone(),
        })
    }
}

/// Run with the built-in extractor / 便捷入口
pub fn run(config: &AppConfig) -> Result<RunOutcome> {
    Pipeline::new(config.clone())?.run()
}
