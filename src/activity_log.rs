//! Activity log - append-only run audit trail / 活动日志
//!
//! Every block or line is flushed immediately so an aborted run leaves a
//! readable partial log. Write failures are fatal.

use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{DocscanError, Result};
use crate::extract::DocumentMetadata;

/// Hit timestamp layout, e.g. `Fri Oct 16 09:17:00 +08:00 2026` / 命中时间格式
///
/// The zone is the local UTC offset; chrono has no zone abbreviations.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %Z %Y";

pub struct ActivityLog<W: Write = BufWriter<File>> {
    sink: W,
}

impl ActivityLog<BufWriter<File>> {
    /// Create (truncate) the log file / 创建日志文件
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(DocscanError::LogUnwritable)?;
        tracing::info!("Activity log: {:?}", path);
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> ActivityLog<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Metadata block for an extracted document / 文档元数据块
    pub fn metadata(&mut self, filename: &str, meta: &DocumentMetadata) -> Result<()> {
        let block = format!(
            " --  data on file \"{}\"\nlang: {}\nauthor: {}\ntype: {}\nlast modified: {}\n\n",
            filename,
            meta.detected_language,
            meta.author.as_deref().unwrap_or("unknown"),
            meta.content_type,
            meta.last_modified_display(),
        );
        self.write(&block)
    }

    /// Failure marker in place of the metadata block / 提取失败标记
    pub fn extraction_failed(&mut self, filename: &str, cause: &str) -> Result<()> {
        let block = format!(
            " --  data on file \"{}\"\nextraction failed: {}\n\n",
            filename, cause
        );
        self.write(&block)
    }

    /// One keyword hit / 命中记录
    pub fn hit(&mut self, timestamp: &DateTime<Local>, keyword: &str, filename: &str) -> Result<()> {
        let line = format!(
            "{} -- \"{}\" found in file \"{}\"\n",
            timestamp.format(TIMESTAMP_FORMAT),
            keyword,
            filename
        );
        self.write(&line)
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write(&mut self, text: &str) -> Result<()> {
        self.sink
            .write_all(text.as_bytes())
            .and_then(|_| self.sink.flush())
            .map_err(DocscanError::LogUnwritable)
    }
}
