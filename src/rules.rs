//! Per-feed rule file.
//!
//! One feed per line, `#` starts a comment:
//!
//! ```text
//! URL [| INCLUDE_SPEC [| EXCLUDE_SPEC]]
//! ```
//!
//! A spec is an optional sentinel followed by whitespace separated words:
//! `=` overrides the global words, `+` (or no sentinel) adds to them and `&`
//! requires a hit from both the global and the feed words. An include spec of
//! `ALL`, `*` or `ALL!` lets every entry of the feed through, subject only to
//! exclusion.

use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

const FIELD_DELIMITER: char = '|';
const COMMENT_MARKER: char = '#';
const PASS_ALL_TOKENS: [&str; 3] = ["ALL", "*", "ALL!"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncludeMode {
    /// Feed words replace the global include words.
    Override,
    /// Feed words are added to the global include words.
    #[default]
    Add,
    /// A global word and a feed word must both be present.
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcludeMode {
    Override,
    #[default]
    Add,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRule {
    pub url: String,
    pub pass_all: bool,
    pub include_mode: IncludeMode,
    pub include_words: Vec<String>,
    pub exclude_mode: ExcludeMode,
    pub exclude_words: Vec<String>,
}

impl FeedRule {
    /// A rule that applies the global words unchanged.
    pub fn with_defaults(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pass_all: false,
            include_mode: IncludeMode::Add,
            include_words: Vec::new(),
            exclude_mode: ExcludeMode::Add,
            exclude_words: Vec::new(),
        }
    }
}

/// Legacy encodings a hand-edited rule file may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, with an optional byte order mark.
    Utf8Sig,
    /// Windows code page 932 (Shift_JIS as written by Japanese Windows editors).
    Cp932,
}

/// Decoders tried in order; the first clean decode wins.
pub const DECODE_ORDER: [TextEncoding; 2] = [TextEncoding::Utf8Sig, TextEncoding::Cp932];

impl TextEncoding {
    /// Decode without replacement characters; `None` if the bytes are not valid.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8Sig => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(Cow::into_owned)
            }
            TextEncoding::Cp932 => encoding_rs::SHIFT_JIS
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned),
        }
    }
}

/// Decode rule file bytes, falling back to lossy UTF-8 with bad bytes dropped.
pub fn decode_rules(bytes: &[u8]) -> String {
    for encoding in DECODE_ORDER {
        if let Some(text) = encoding.decode(bytes) {
            debug!("Decoded rule file as {:?}", encoding);
            return text;
        }
    }

    warn!("Rule file is neither UTF-8 nor CP932, dropping undecodable bytes");
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect()
}

/// Read and parse a rule file. A missing file yields no rules.
pub fn read_rules_file<P: AsRef<Path>>(path: P) -> Result<Vec<FeedRule>> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("Rule file {} not found", path.display());
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path)?;
    Ok(parse_rules(&decode_rules(&bytes)))
}

/// Rules used when no rule file is configured: global words, nothing else.
pub fn default_rules<S: AsRef<str>>(urls: &[S]) -> Vec<FeedRule> {
    urls.iter()
        .map(|url| FeedRule::with_defaults(url.as_ref()))
        .collect()
}

pub fn parse_rules(text: &str) -> Vec<FeedRule> {
    let mut rules = Vec::new();

    // bare `\r` also ends a line
    let text = text.replace("\r\n", "\n");
    for (index, line) in text.split(['\n', '\r']).enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        match parse_line(line) {
            Some(rule) => rules.push(rule),
            None => warn!("Dropping rule on line {} without a url: {:?}", index + 1, line),
        }
    }

    rules
}

fn parse_line(line: &str) -> Option<FeedRule> {
    let mut fields = line.split(FIELD_DELIMITER).map(str::trim);
    let url = fields.next().unwrap_or_default();
    if url.is_empty() {
        return None;
    }
    let include_spec = fields.next().unwrap_or_default();
    let exclude_spec = fields.next().unwrap_or_default();

    let (exclude_sentinel, exclude_words) = parse_spec(exclude_spec);
    let exclude_mode = match exclude_sentinel {
        Sentinel::Override => ExcludeMode::Override,
        // `&` has no meaning for exclusion and falls back to adding
        Sentinel::Add | Sentinel::Both => ExcludeMode::Add,
    };

    let pass_all = PASS_ALL_TOKENS
        .iter()
        .any(|token| include_spec.eq_ignore_ascii_case(token));

    let (include_mode, include_words) = if pass_all {
        (IncludeMode::Override, Vec::new())
    } else {
        let (sentinel, words) = parse_spec(include_spec);
        let mode = match sentinel {
            Sentinel::Override => IncludeMode::Override,
            Sentinel::Add => IncludeMode::Add,
            Sentinel::Both => IncludeMode::Both,
        };
        (mode, words)
    };

    Some(FeedRule {
        url: url.to_string(),
        pass_all,
        include_mode,
        include_words,
        exclude_mode,
        exclude_words,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sentinel {
    Override,
    Add,
    Both,
}

fn parse_spec(spec: &str) -> (Sentinel, Vec<String>) {
    let spec = spec.trim();
    let (sentinel, rest) = match spec.chars().next() {
        Some('=') => (Sentinel::Override, &spec[1..]),
        Some('+') | Some('-') => (Sentinel::Add, &spec[1..]),
        Some('&') => (Sentinel::Both, &spec[1..]),
        _ => (Sentinel::Add, spec),
    };
    let words = rest.split_whitespace().map(str::to_string).collect();
    (sentinel, words)
}
