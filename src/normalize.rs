//! Text canonicalization used on both haystacks and keywords.

use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Fold width and compatibility variants (NFKC), then lowercase.
///
/// Full-width `ＰＦＩ` and half-width `ﾏﾝｼｮﾝ` end up as `pfi` and `マンション`,
/// so keywords match regardless of how a source happened to type them.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

/// Turn an HTML fragment from a feed into plain text.
///
/// Entities are decoded before tags are stripped, so escaped markup is removed too.
pub fn clean_html(fragment: &str) -> String {
    let decoded = decode_html_entities(fragment);
    TAG_RE.replace_all(&decoded, "").into_owned()
}

/// Collapse every whitespace run into a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
