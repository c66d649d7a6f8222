//! Language detection / 语言检测
//!
//! CJK languages are recognised by script, European languages by a
//! stop-word profile. Short or ambiguous text yields "unknown".

use crate::search::tokenizer::{is_han, is_hangul, is_kana};

pub const UNKNOWN: &str = "unknown";

/// Characters inspected / 检测的字符数上限
const SAMPLE_CHARS: usize = 20_000;
/// Minimum stop-word hits for a verdict / 最少命中数
const MIN_HITS: usize = 3;

static PROFILES: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "of", "to", "is", "that", "it", "for", "with", "was", "this", "are", "be", "by", "which"]),
    ("fr", &["le", "la", "les", "et", "des", "est", "une", "dans", "pour", "que", "qui", "du", "sur", "pas", "au"]),
    ("de", &["der", "die", "das", "und", "ist", "nicht", "mit", "ein", "eine", "den", "von", "zu", "sich", "auf", "für"]),
    ("es", &["el", "los", "las", "y", "que", "en", "una", "por", "para", "con", "del", "se", "es", "como", "su"]),
    ("it", &["il", "di", "che", "e", "la", "per", "una", "sono", "con", "non", "gli", "della", "del", "un", "le"]),
    ("pt", &["o", "os", "as", "que", "de", "não", "uma", "para", "com", "do", "da", "em", "por", "é", "são"]),
    ("nl", &["de", "het", "een", "en", "van", "is", "dat", "niet", "op", "met", "voor", "zijn", "te", "ook", "die"]),
];

/// Detect the dominant language of `text` / 检测文本主要语言
pub fn detect(text: &str) -> String {
    let mut letters = 0usize;
    let mut han = 0usize;
    let mut kana = 0usize;
    let mut hangul = 0usize;

    for c in text.chars().take(SAMPLE_CHARS) {
        if !c.is_alphabetic() {
            continue;
        }
        letters += 1;
        if is_kana(c) {
            kana += 1;
        } else if is_hangul(c) {
            hangul += 1;
        } else if is_han(c) {
            han += 1;
        }
    }

    if letters == 0 {
        return UNKNOWN.to_string();
    }
    let cjk = han + kana + hangul;
    if cjk * 3 >= letters {
        return if kana * 10 >= cjk {
            "ja"
        } else if hangul >= han {
            "ko"
        } else {
            "zh"
        }
        .to_string();
    }

    let words: Vec<String> = text
        .chars()
        .take(SAMPLE_CHARS)
        .collect::<String>()
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut best: Option<(&str, usize)> = None;
    for (code, stopwords) in PROFILES {
        let hits = words.iter().filter(|w| stopwords.contains(&w.as_str())).count();
        if hits >= MIN_HITS && best.map_or(true, |(_, top)| hits > top) {
            best = Some((*code, hits));
        }
    }

    best.map(|(code, _)| code.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}
