//! End-to-end runs over a temporary workspace / 端到端测试

use std::fs;
use std::path::Path;

use docscan::config::AppConfig;
use docscan::error::{DocscanError, Result};
use docscan::extract::{DocumentMetadata, ExtractedDocument, Extractor};
use docscan::search::{self, SealedIndex};
use docscan::Pipeline;
use tempfile::TempDir;

fn workspace(keywords: &str, docs: &[(&str, &str)]) -> (TempDir, AppConfig) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("queries.txt"), keywords).unwrap();
    fs::create_dir(root.join("docs")).unwrap();
    for (name, body) in docs {
        fs::write(root.join("docs").join(name), body).unwrap();
    }

    let mut config = AppConfig::default();
    config.input.keywords_file = path_str(&root.join("queries.txt"));
    config.input.documents_dir = path_str(&root.join("docs"));
    config.input.extensions = vec!["txt".to_string()];
    config.output.log_file = path_str(&root.join("log.txt"));
    config.output.report_file = path_str(&root.join("output.txt"));
    config.output.index_dir = path_str(&root.join("index"));
    config.pipeline.workers = 2;
    (dir, config)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn read(path: &str) -> String {
    fs::read_to_string(path).unwrap()
}

fn hit_lines(log: &str) -> Vec<&str> {
    log.lines().filter(|l| l.contains("\" found in file \"")).collect()
}

#[test]
fn test_alpha_beta_report() {
    let (_dir, config) = workspace(
        "alpha\nbeta\n",
        &[
            ("doc1.txt", "alpha alpha and once more alpha"),
            ("doc2.txt", "nothing to see here"),
        ],
    );

    let outcome = Pipeline::new(config.clone()).unwrap().run().unwrap();
    assert_eq!(outcome.summary.documents_processed, 2);
    assert_eq!(outcome.summary.documents_with_hits, 1);

    let report = read(&config.output.report_file);
    assert_eq!(
        report,
        "Keyword(s) used: alpha, beta\n\
         No of files processed: 2\n\
         No of files containing keyword(s): 1\n\
         \n\
         No of occurrences of each keyword:\n\
         ----------------------------------\n\
         \talpha: 1\n\
         \tbeta: 0\n"
    );

    let log = read(&config.output.log_file);
    assert!(log.contains(" --  data on file \"doc1.txt\"\n"));
    assert!(log.contains(" --  data on file \"doc2.txt\"\n"));
    assert_eq!(hit_lines(&log).len(), 1);
    assert!(hit_lines(&log)[0].ends_with(" -- \"alpha\" found in file \"doc1.txt\""));
}

#[test]
fn test_empty_catalog() {
    let (_dir, config) = workspace("", &[("a.txt", "alpha"), ("b.txt", "beta")]);

    Pipeline::new(config.clone()).unwrap().run().unwrap();

    let report = read(&config.output.report_file);
    assert!(report.starts_with("Keyword(s) used: \nNo of files processed: 2\n"));
    assert!(report.contains("No of files containing keyword(s): 0\n"));
    assert!(report.ends_with("----------------------------------\n"));
    assert!(hit_lines(&read(&config.output.log_file)).is_empty());
}

#[test]
fn test_corrupt_document_counts_as_processed() {
    let (dir, mut config) = workspace("alpha\n", &[]);
    config.input.extensions = vec!["pdf".to_string()];
    fs::write(dir.path().join("docs").join("broken.pdf"), b"this is not a pdf").unwrap();

    let outcome = Pipeline::new(config.clone()).unwrap().run().unwrap();
    assert_eq!(outcome.summary.documents_processed, 1);
    assert_eq!(outcome.summary.documents_with_hits, 0);
    assert_eq!(outcome.summary.keywords[0].hit_count, 0);
    assert_eq!(outcome.failed_documents, vec!["broken.pdf"]);

    let log = read(&config.output.log_file);
    assert!(log.contains(" --  data on file \"broken.pdf\"\nextraction failed: "));
    assert!(!log.contains("lang: "));
}

#[test]
fn test_malformed_keyword_is_skipped() {
    let (_dir, config) = workspace(
        "\"unterminated\n(alpha\nbeta\n",
        &[("doc1.txt", "alpha beta gamma")],
    );

    let outcome = Pipeline::new(config.clone()).unwrap().run().unwrap();
    assert_eq!(outcome.skipped_keywords, vec!["\"unterminated", "(alpha"]);

    let report = read(&config.output.report_file);
    assert!(report.contains("\t\"unterminated: 0\n"));
    assert!(report.contains("\t(alpha: 0\n"));
    assert!(report.contains("\tbeta: 1\n"));
}

#[test]
fn test_hit_accounting_matches_log() {
    let (_dir, config) = workspace(
        "alpha\nbeta\nalpha OR beta\n\"quick fox\"\nzeta\n",
        &[
            ("1.txt", "alpha and the quick fox"),
            ("2.txt", "beta only"),
            ("10.txt", "the fox is quick"),
            ("3.txt", "alpha beta"),
        ],
    );

    let outcome = Pipeline::new(config.clone()).unwrap().run().unwrap();
    let log = read(&config.output.log_file);
    let lines = hit_lines(&log);

    let total: u64 = outcome.summary.keywords.iter().map(|k| k.hit_count).sum();
    assert_eq!(total as usize, lines.len());
    assert_eq!(outcome.hits.len(), lines.len());

    // A document is flagged exactly when some hit line names it
    for doc in &outcome.documents {
        let named = lines
            .iter()
            .any(|l| l.ends_with(&format!("found in file \"{}\"", doc.filename)));
        assert_eq!(doc.contains_any_keyword, named, "{}", doc.filename);
    }

    let counts: Vec<_> = outcome.summary.keywords.iter().map(|k| k.hit_count).collect();
    assert_eq!(counts, vec![2, 2, 3, 1, 0]);
    assert_eq!(outcome.summary.documents_with_hits, 3);
}

#[test]
fn test_documents_in_natural_order() {
    let (_dir, config) = workspace(
        "",
        &[("doc10.txt", "x"), ("doc2.txt", "x"), ("doc1.txt", "x")],
    );

    let outcome = Pipeline::new(config).unwrap().run().unwrap();
    let names: Vec<_> = outcome.documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["doc1.txt", "doc2.txt", "doc10.txt"]);
}

#[test]
fn test_extension_filter_is_case_insensitive() {
    let (_dir, config) = workspace(
        "alpha\n",
        &[("upper.TXT", "alpha"), ("notes.md", "alpha"), ("lower.txt", "beta")],
    );

    let outcome = Pipeline::new(config).unwrap().run().unwrap();
    assert_eq!(outcome.summary.documents_processed, 2);
    assert_eq!(outcome.summary.keywords[0].hit_count, 1);
}

#[test]
fn test_missing_directory_leaves_no_report() {
    let (dir, mut config) = workspace("alpha\n", &[]);
    fs::write(&config.output.report_file, "stale report").unwrap();
    config.input.documents_dir = path_str(&dir.path().join("does-not-exist"));

    let err = Pipeline::new(config.clone()).unwrap().run().unwrap_err();
    assert!(matches!(err, DocscanError::DirectoryUnavailable { .. }));
    assert!(!Path::new(&config.output.report_file).exists());
}

#[test]
fn test_missing_keyword_source_is_fatal() {
    let (dir, config) = workspace("alpha\n", &[("a.txt", "alpha")]);
    fs::remove_file(dir.path().join("queries.txt")).unwrap();

    let err = Pipeline::new(config.clone()).unwrap().run().unwrap_err();
    assert!(matches!(err, DocscanError::SourceUnavailable { .. }));
    assert!(!err.is_recoverable());
    assert!(!Path::new(&config.output.report_file).exists());
}

#[test]
fn test_rerun_replaces_artifacts() {
    let (_dir, config) = workspace("alpha\n", &[("a.txt", "alpha")]);
    let pipeline = Pipeline::new(config.clone()).unwrap();

    let first = pipeline.run().unwrap();
    let second = pipeline.run().unwrap();
    assert_eq!(first.summary, second.summary);

    // Log is truncated per run, not appended
    assert_eq!(hit_lines(&read(&config.output.log_file)).len(), 1);
}

#[test]
fn test_snapshot_is_searchable_after_run() {
    let (_dir, config) = workspace(
        "",
        &[("a.txt", "red apple"), ("b.txt", "green apple"), ("c.txt", "red car")],
    );
    let outcome = Pipeline::new(config.clone()).unwrap().run().unwrap();
    assert_eq!(outcome.index_stats.document_count, 3);

    let index = SealedIndex::open(Path::new(&config.output.index_dir)).unwrap();
    let query = search::parse("apple AND NOT green").unwrap();
    assert_eq!(index.search_filenames(&query).unwrap(), vec!["a.txt"]);
}

/// Extractor serving canned text, independent of file contents
struct CannedExtractor;

impl Extractor for CannedExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        let text = match name.as_str() {
            "doc1.pdf" => "alpha alpha alpha",
            "doc2.pdf" => "unrelated words",
            _ => return Err(DocscanError::extraction(name, "no canned text")),
        };
        Ok(ExtractedDocument {
            text: text.to_string(),
            metadata: DocumentMetadata {
                author: Some("Tester".to_string()),
                content_type: "application/pdf".to_string(),
                last_modified: None,
                detected_language: "en".to_string(),
            },
        })
    }
}

#[test]
fn test_custom_extractor() {
    let (dir, mut config) = workspace("alpha\nbeta\n", &[]);
    config.input.extensions = vec!["pdf".to_string()];
    for name in ["doc1.pdf", "doc2.pdf", "doc3.pdf"] {
        fs::write(dir.path().join("docs").join(name), b"").unwrap();
    }

    let outcome = Pipeline::with_extractor(config.clone(), Box::new(CannedExtractor))
        .run()
        .unwrap();
    assert_eq!(outcome.summary.documents_processed, 3);
    assert_eq!(outcome.summary.documents_with_hits, 1);
    assert_eq!(outcome.failed_documents, vec!["doc3.pdf"]);

    let log = read(&config.output.log_file);
    assert!(log.contains(
        " --  data on file \"doc1.pdf\"\nlang: en\nauthor: Tester\ntype: application/pdf\nlast modified: unknown\n\n"
    ));
}

/// Accepts `budget` flushed entries, then refuses every write
struct FailingSink {
    written: Vec<u8>,
    budget: usize,
}

impl std::io::Write for FailingSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.budget == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.budget = self.budget.saturating_sub(1);
        Ok(())
    }
}

#[test]
fn test_log_failure_mid_query_keeps_progress() {
    use docscan::activity_log::ActivityLog;
    use docscan::catalog;
    use docscan::pipeline::{run_queries, RunContext};
    use docscan::search::{IndexBuilder, IndexEntry};

    let dir = tempfile::tempdir().unwrap();
    let mut builder = IndexBuilder::create(dir.path()).unwrap();
    builder.add(IndexEntry::new("doc1.pdf", "alpha beta"));
    builder.add(IndexEntry::new("doc2.pdf", "beta"));
    let index = builder.commit().unwrap();

    let mut ctx = RunContext::new(catalog::from_text("alpha\nbeta"));
    ctx.register_document("doc1.pdf");
    ctx.register_document("doc2.pdf");

    // metadata block, alpha/doc1, beta/doc1, then beta/doc2 fails
    let mut log = ActivityLog::new(FailingSink {
        written: Vec::new(),
        budget: 3,
    });
    let meta = DocumentMetadata {
        author: None,
        content_type: "application/pdf".to_string(),
        last_modified: None,
        detected_language: "en".to_string(),
    };
    log.metadata("doc1.pdf", &meta).unwrap();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    let err = run_queries(&index, &mut ctx, &mut log, &pool).unwrap_err();
    assert!(matches!(err, DocscanError::LogUnwritable(_)));
    assert!(!err.is_recoverable());

    assert_eq!(ctx.keywords[0].hit_count, 1);
    assert_eq!(ctx.keywords[1].hit_count, 1);
    assert_eq!(ctx.hits.len(), 2);
    assert!(ctx.documents[0].contains_any_keyword);
    assert!(!ctx.documents[1].contains_any_keyword);

    let text = String::from_utf8(log.into_inner().written).unwrap();
    assert!(text.starts_with(" --  data on file \"doc1.pdf\"\nlang: en\n"));
    let lines = hit_lines(&text);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" -- \"alpha\" found in file \"doc1.pdf\""));
    assert!(lines[1].ends_with(" -- \"beta\" found in file \"doc1.pdf\""));
    assert!(!text.contains("doc2.pdf"));
}
