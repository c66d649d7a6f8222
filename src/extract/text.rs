//! Plain text documents / 纯文本文档
//!
//! Decoding order: BOM, UTF-8, configured fallback encoding.

use encoding_rs::Encoding;
use std::path::Path;

use super::{file_mtime, file_name, language, DocumentMetadata, ExtractedDocument};
use crate::error::{DocscanError, Result};

/// Bytes inspected for binary content / 二进制检测窗口
const SNIFF_LEN: usize = 8 * 1024;

pub fn extract(path: &Path, fallback: &'static Encoding) -> Result<ExtractedDocument> {
    let name = file_name(path);
    let bytes = std::fs::read(path).map_err(|e| DocscanError::extraction(&name, e))?;
    let text = decode(&bytes, fallback).ok_or_else(|| DocscanError::extraction(&name, "binary content"))?;

    let metadata = DocumentMetadata {
        author: None,
        content_type: mime_guess::from_path(path)
            .first_or_text_plain()
            .essence_str()
            .to_string(),
        last_modified: file_mtime(path),
        detected_language: language::detect(&text),
    };

    Ok(ExtractedDocument { text, metadata })
}

/// Decode text bytes, `None` for binary data / 解码文本
pub fn decode(bytes: &[u8], fallback: &'static Encoding) -> Option<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Some(text.into_owned());
    }

    if bytes[..bytes.len().min(SNIFF_LEN)].contains(&0) {
        return None;
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(_) => {
            let (text, _) = fallback.decode_without_bom_handling(bytes);
            Some(text.into_owned())
        }
    }
}
