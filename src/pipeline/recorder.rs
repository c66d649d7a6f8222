//! Hit recorder / 命中记录器
//!
//! One call: log line, keyword counter, document flag, in-memory record.
//! The log line is written first, so a failed write leaves counters untouched.

use chrono::Local;
use std::io::Write;

use super::context::{HitLogRecord, RunContext};
use crate::activity_log::ActivityLog;
use crate::error::{DocscanError, Result};

pub struct HitRecorder<'a, W: Write> {
    context: &'a mut RunContext,
    log: &'a mut ActivityLog<W>,
}

impl<'a, W: Write> HitRecorder<'a, W> {
    pub fn new(context: &'a mut RunContext, log: &'a mut ActivityLog<W>) -> Self {
        Self { context, log }
    }

    /// Record that keyword number `keyword` matched `filename` / 记录命中
    pub fn record(&mut self, keyword: usize, filename: &str) -> Result<()> {
        let slot = self.context.document_slot(filename).ok_or_else(|| {
            DocscanError::IndexCorrupt(format!("index returned unknown document \"{}\"", filename))
        })?;
        let text = match self.context.keywords.get(keyword) {
            Some(entry) => entry.text.clone(),
            None => {
                return Err(DocscanError::IndexCorrupt(format!(
                    "keyword #{} out of range",
                    keyword
                )))
            }
        };

        let timestamp = Local::now();
        self.log.hit(&timestamp, &text, filename)?;

        self.context.keywords[keyword].hit_count += 1;
        self.context.documents[slot].contains_any_keyword = true;
        self.context.hits.push(HitLogRecord {
            timestamp,
            keyword: text,
            filename: filename.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::from_text;

    #[test]
    fn test_record_updates_everything() {
        let mut ctx = RunContext::new(from_text("alpha\nbeta"));
        ctx.register_document("doc1.pdf");
        ctx.register_document("doc2.pdf");
        let mut log = ActivityLog::new(Vec::new());

        {
            let mut recorder = HitRecorder::new(&mut ctx, &mut log);
            recorder.record(0, "doc1.pdf").unwrap();
            recorder.record(1, "doc1.pdf").unwrap();
        }

        assert_eq!(ctx.keywords[0].hit_count, 1);
        assert_eq!(ctx.keywords[1].hit_count, 1);
        // Flag is idempotent: two hits, one document
        assert_eq!(ctx.documents_with_hits(), 1);
        assert_eq!(ctx.hits.len(), 2);

        let text = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" -- \"alpha\" found in file \"doc1.pdf\""));
        assert!(lines[1].ends_with(" -- \"beta\" found in file \"doc1.pdf\""));
    }

    #[test]
    fn test_unknown_document_rejected() {
        let mut ctx = RunContext::new(from_text("alpha"));
        let mut log = ActivityLog::new(Vec::new());
        let err = HitRecorder::new(&mut ctx, &mut log)
            .record(0, "ghost.pdf")
            .unwrap_err();
        assert!(matches!(err, DocscanError::IndexCorrupt(_)));
        assert_eq!(ctx.keywords[0].hit_count, 0);
    }
}
