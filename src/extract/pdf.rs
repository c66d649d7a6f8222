//! PDF documents / PDF 文档
//!
//! Text comes from pdf-extract, metadata from the document information
//! dictionary read with lopdf.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use lopdf::{Dictionary, Document, Object};
use std::path::Path;

use super::{file_mtime, file_name, language, DocumentMetadata, ExtractedDocument};
use crate::error::{DocscanError, Result};

pub const CONTENT_TYPE: &str = "application/pdf";

pub fn extract(path: &Path) -> Result<ExtractedDocument> {
    let name = file_name(path);
    let bytes = std::fs::read(path).map_err(|e| DocscanError::extraction(&name, e))?;

    let document = Document::load_mem(&bytes).map_err(|e| DocscanError::extraction(&name, e))?;
    if document.trailer.get(b"Encrypt").is_ok() {
        return Err(DocscanError::extraction(&name, "document is encrypted"));
    }

    let info = info_dictionary(&document);
    let author = info.and_then(|dict| info_string(dict, b"Author"));
    let modified = info
        .and_then(|dict| info_string(dict, b"ModDate"))
        .and_then(|raw| parse_pdf_date(&raw));

    // pdf-extract can panic on malformed documents
    let text = match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes)) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(DocscanError::extraction(&name, e)),
        Err(_) => return Err(DocscanError::extraction(&name, "text extraction panicked")),
    };

    let metadata = DocumentMetadata {
        author,
        content_type: CONTENT_TYPE.to_string(),
        last_modified: modified.or_else(|| file_mtime(path)),
        detected_language: language::detect(&text),
    };

    Ok(ExtractedDocument { text, metadata })
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, or 8-bit) / 解码 PDF 字符串
pub fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    let text = if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        encoding_rs::UTF_16BE.decode_without_bom_handling(rest).0.into_owned()
    } else {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
        }
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse a PDF date such as `D:20200102030405+01'00'` / 解析 PDF 日期
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }

    let field = |start: usize, default: u32| -> u32 {
        digits
            .get(start..start + 2)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    };
    let year: i32 = digits[0..4].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4, 1), field(6, 1))?;
    let naive = date.and_hms_opt(field(8, 0), field(10, 0), field(12, 0))?;

    let zone = &s[digits.len()..];
    let offset_secs = match zone.chars().next() {
        Some(sign @ ('+' | '-')) => {
            let tz: String = zone[1..].chars().filter(|c| c.is_ascii_digit()).collect();
            let hours: i32 = tz.get(0..2).and_then(|v| v.parse().ok()).unwrap_or(0);
            let minutes: i32 = tz.get(2..4).and_then(|v| v.parse().ok()).unwrap_or(0);
            let secs = hours * 3600 + minutes * 60;
            if sign == '-' {
                -secs
            } else {
                secs
            }
        }
        _ => 0,
    };

    FixedOffset::east_opt(offset_secs)?
        .from_local_datetime(&naive)
        .single()
}
