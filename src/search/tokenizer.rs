//! Tokenizer - uses jieba-rs for word segmentation / 分词器
//!
//! Supports / 支持：
//! - Chinese word segmentation (jieba) / 中文分词
//! - English word segmentation (whitespace and punctuation + lowercase) / 英文分词
//! - Mixed text processing / 混合文本处理
//!
//! Indexed text and query terms go through the same analysis.

use jieba_rs::{Jieba, TokenizeMode};
use once_cell::sync::Lazy;

/// Global jieba tokenizer instance / 全局 jieba 分词器实例
static JIEBA: Lazy<Jieba> = Lazy::new(Jieba::new);

/// Token with its start offset / 带位置的词项
///
/// Offsets count characters with every run of non-alphanumeric characters
/// folded into one, so `"quick, fox"` and `"quick fox"` place `fox` at 6.
/// Search mode emits overlapping sub-words; they keep their own offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken {
    pub term: String,
    pub start: u32,
}

/// Tokenize text with offsets / 分词并记录位置
pub fn tokenize_positions(text: &str) -> Vec<PositionedToken> {
    let offsets = folded_offsets(text);

    // Search mode, finer granularity / 搜索引擎模式
    JIEBA
        .tokenize(text, TokenizeMode::Search, true)
        .into_iter()
        .filter_map(|token| {
            let word = token.word.trim();
            if word.is_empty() || !word.chars().any(char::is_alphanumeric) {
                return None;
            }
            let lead = token.word.chars().take_while(|c| c.is_whitespace()).count();
            Some(PositionedToken {
                term: word.to_lowercase(),
                start: offsets[token.start + lead],
            })
        })
        .collect()
}

/// Tokenize text / 对文本进行分词
///
/// Tokens are lowercased; tokens without any letter or digit are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_positions(text)
        .into_iter()
        .map(|token| token.term)
        .collect()
}

/// Folded offset of every character, plus one past the end / 折叠后的字符位置
fn folded_offsets(text: &str) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(text.chars().count() + 1);
    let mut next = 0u32;
    let mut in_gap = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            offsets.push(next);
            next += 1;
            in_gap = false;
        } else if in_gap {
            offsets.push(next - 1);
        } else {
            offsets.push(next);
            next += 1;
            in_gap = true;
        }
    }
    offsets.push(next);
    offsets
}

/// Phrase text in the same folded form: lowercase, separators collapsed to
/// one space, trimmed / 短语标准化
pub fn normalize_phrase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_gap = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_gap && !out.is_empty() {
                out.push(' ');
            }
            pending_gap = false;
            out.push(c);
        } else {
            pending_gap = true;
        }
    }
    out
}

/// Tokenize a query term (same analysis as indexing) / 对查询词进行分词
pub fn tokenize_query(query: &str) -> Vec<String> {
    tokenize(query)
}

/// Normalize a wildcard pattern; wildcards bypass segmentation / 通配符模式标准化
pub fn normalize_pattern(pattern: &str) -> String {
    pattern.trim().to_lowercase()
}

/// Check if character is a CJK ideograph / 是否为中文字符
pub fn is_han(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}')
}

/// Check if character is Hiragana or Katakana / 平假名或片假名
pub fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309f}' | '\u{30a0}'..='\u{30ff}')
}

/// Check if character is a Hangul syllable / 韩文音节
pub fn is_hangul(c: char) -> bool {
    matches!(c, '\u{ac00}'..='\u{d7af}')
}
