//! Merges a feed's rule with the global word sets.

use std::collections::HashSet;

use crate::normalize::normalize;
use crate::rules::{ExcludeMode, FeedRule, IncludeMode};

/// Process-wide topic and negative keywords, fixed for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalWordSets {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl GlobalWordSets {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }
}

/// How an entry's haystack must match the include words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Every entry passes.
    AlwaysTrue,
    /// At least one word occurs. An empty list never matches.
    AnyOf(Vec<String>),
    /// Every inner strategy matches. An empty list never matches.
    AllOf(Vec<MatchStrategy>),
}

/// A fully resolved rule set for one feed. All words are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveRuleSet {
    pub strategy: MatchStrategy,
    pub exclude: Vec<String>,
}

pub fn resolve(rule: &FeedRule, globals: &GlobalWordSets) -> EffectiveRuleSet {
    let strategy = if rule.pass_all {
        MatchStrategy::AlwaysTrue
    } else {
        match rule.include_mode {
            IncludeMode::Override => MatchStrategy::AnyOf(word_set([&rule.include_words])),
            IncludeMode::Add => {
                MatchStrategy::AnyOf(word_set([&globals.include, &rule.include_words]))
            }
            IncludeMode::Both => MatchStrategy::AllOf(vec![
                MatchStrategy::AnyOf(word_set([&globals.include])),
                MatchStrategy::AnyOf(word_set([&rule.include_words])),
            ]),
        }
    };

    let exclude = match rule.exclude_mode {
        ExcludeMode::Override => word_set([&rule.exclude_words]),
        ExcludeMode::Add => word_set([&globals.exclude, &rule.exclude_words]),
    };

    EffectiveRuleSet { strategy, exclude }
}

/// Normalized union of the given lists, first occurrence order, no empties.
///
/// An empty word would be a substring of every haystack, so it is dropped.
fn word_set<const N: usize>(lists: [&Vec<String>; N]) -> Vec<String> {
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .map(|word| normalize(word.trim()))
        .filter(|word| !word.is_empty() && seen.insert(word.clone()))
        .collect()
}
