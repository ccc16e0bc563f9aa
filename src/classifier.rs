//! Accept/reject gate for a single feed entry.

use crate::item::CandidateItem;
use crate::normalize::normalize;
use crate::resolver::{EffectiveRuleSet, MatchStrategy};

impl MatchStrategy {
    /// Evaluate against an already normalized haystack.
    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            MatchStrategy::AlwaysTrue => true,
            MatchStrategy::AnyOf(words) => any_hit(haystack, words),
            MatchStrategy::AllOf(parts) => {
                !parts.is_empty() && parts.iter().all(|part| part.matches(haystack))
            }
        }
    }
}

/// Build the normalized haystack for an entry: title, newline, body.
pub fn haystack(candidate: &CandidateItem) -> String {
    normalize(&format!("{}\n{}", candidate.title, candidate.body))
}

pub fn accept(candidate: &CandidateItem, rules: &EffectiveRuleSet) -> bool {
    accept_haystack(&haystack(candidate), rules)
}

/// Exclusion is checked first and always wins, even for pass-all feeds.
pub fn accept_haystack(haystack: &str, rules: &EffectiveRuleSet) -> bool {
    if any_hit(haystack, &rules.exclude) {
        return false;
    }
    rules.strategy.matches(haystack)
}

fn any_hit(haystack: &str, words: &[String]) -> bool {
    words.iter().any(|word| haystack.contains(word.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{resolve, GlobalWordSets};
    use crate::rules::parse_rules;

    fn candidate(title: &str, body: &str) -> CandidateItem {
        CandidateItem {
            title: title.to_string(),
            body: body.to_string(),
            link: "https://www.city.morioka.iwate.jp/news/1.html".to_string(),
            published: None,
            updated: None,
        }
    }

    fn globals() -> GlobalWordSets {
        GlobalWordSets::new(
            vec!["住宅".into(), "ＰＦＩ".into()],
            vec!["火災".into(), "クマ".into()],
        )
    }

    fn rules_for(line: &str) -> EffectiveRuleSet {
        resolve(&parse_rules(line)[0], &globals())
    }

    mod exclusion_tests {
        use super::*;

        #[test]
        fn test_exclusion_beats_include_hit() {
            let rules = rules_for("http://x");
            assert!(!accept(&candidate("盛岡市で住宅火災", ""), &rules));
        }

        #[test]
        fn test_exclusion_beats_pass_all() {
            let rules = rules_for("http://x|ALL");
            assert!(!accept(&candidate("公園にクマ出没", ""), &rules));
            assert!(accept(&candidate("公園の整備", ""), &rules));
        }

        #[test]
        fn test_exclusion_checks_body() {
            let rules = rules_for("http://x");
            assert!(!accept(&candidate("住宅の情報", "近隣で火災が発生"), &rules));
        }

        #[test]
        fn test_exclusion_is_width_insensitive() {
            let rules = resolve(
                &parse_rules("http://x|ALL|=ｲﾍﾞﾝﾄ")[0],
                &GlobalWordSets::default(),
            );
            assert!(!accept(&candidate("夏のイベント", ""), &rules));
        }

        #[test]
        fn test_pass_all_with_exclude_override_drops_globals() {
            let rules = rules_for("http://x|ALL|=台風");
            assert!(accept(&candidate("住宅火災", ""), &rules));
            assert!(!accept(&candidate("台風情報", ""), &rules));
        }
    }

    mod any_of_tests {
        use super::*;

        #[test]
        fn test_add_matches_global_word() {
            let rules = rules_for("http://x|+盛岡");
            assert!(accept(&candidate("県営住宅の入居者募集", ""), &rules));
        }

        #[test]
        fn test_add_matches_feed_word() {
            let rules = rules_for("http://x|+盛岡");
            assert!(accept(&candidate("盛岡市の公園整備", ""), &rules));
        }

        #[test]
        fn test_override_ignores_global_words() {
            let rules = rules_for("http://x|=盛岡");
            assert!(!accept(&candidate("県営住宅の入居者募集", ""), &rules));
            assert!(accept(&candidate("盛岡市の公園整備", ""), &rules));
        }

        #[test]
        fn test_empty_include_set_never_accepts() {
            let rules = rules_for("http://x|=");
            assert_eq!(rules.strategy, MatchStrategy::AnyOf(vec![]));
            assert!(!accept(&candidate("住宅", "盛岡"), &rules));
            assert!(!accept(&candidate("", ""), &rules));
        }

        #[test]
        fn test_match_in_body_only() {
            let rules = rules_for("http://x");
            assert!(accept(&candidate("お知らせ", "ＰＦＩ事業の公募"), &rules));
        }

        #[test]
        fn test_keyword_spanning_title_and_body_does_not_match() {
            let rules = rules_for("http://x|=住宅");
            assert!(!accept(&candidate("市営住", "宅"), &rules));
        }
    }

    mod both_tests {
        use super::*;

        fn both() -> EffectiveRuleSet {
            resolve(
                &parse_rules("http://x|&盛岡")[0],
                &GlobalWordSets::new(vec!["住宅".into()], vec![]),
            )
        }

        #[test]
        fn test_feed_word_alone_rejected() {
            assert!(!accept(&candidate("盛岡市の公園整備", ""), &both()));
        }

        #[test]
        fn test_global_word_alone_rejected() {
            assert!(!accept(&candidate("花巻市で住宅供給", ""), &both()));
        }

        #[test]
        fn test_both_words_accepted() {
            assert!(accept(&candidate("盛岡市で住宅供給", ""), &both()));
        }

        #[test]
        fn test_words_may_come_from_title_and_body() {
            assert!(accept(&candidate("盛岡市からのお知らせ", "住宅供給公社"), &both()));
        }
    }

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_always_true_accepts_empty_haystack() {
            assert!(MatchStrategy::AlwaysTrue.matches(""));
        }

        #[test]
        fn test_empty_all_of_never_matches() {
            assert!(!MatchStrategy::AllOf(vec![]).matches("anything"));
        }

        #[test]
        fn test_empty_entry_rejected_unless_pass_all() {
            let empty = candidate("", "");
            assert!(!accept(&empty, &rules_for("http://x")));
            assert!(!accept(&empty, &rules_for("http://x|&盛岡")));
            assert!(accept(&empty, &rules_for("http://x|ALL")));
        }

        #[test]
        fn test_haystack_is_normalized() {
            assert_eq!(haystack(&candidate("ＰＦＩ", "Ｂody")), "pfi\nbody");
        }
    }
}
