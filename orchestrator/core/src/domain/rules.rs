// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Rule Extractor
//!
//! Deterministic, I/O-free extraction of the trusted person, duration,
//! activation code and situation intent from a free-text command.
//!
//! Keyword classification is expressed as ordered rule tables
//! ([`ACTIVATION_RULES`], [`INTENT_RULES`]) evaluated top to bottom with
//! first-match-wins semantics. All keyword matching is substring
//! containment on the lower-cased input, not word-boundary matching.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements rule-based command extraction

use crate::domain::intent::{is_duration_digits, ActivationCategory, ActivationCode, Intent};
use regex::Regex;
use std::sync::LazyLock;

/// One row of a classification table.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<T: 'static> {
    pub keywords: &'static [&'static str],
    pub outcome: T,
}

impl<T: Copy> KeywordRule<T> {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Activation categories in priority order. `SURVIVAL` is the fallback
/// when no row matches.
pub const ACTIVATION_RULES: &[KeywordRule<ActivationCategory>] = &[
    KeywordRule {
        keywords: &["hiking", "hicking", "trek"],
        outcome: ActivationCategory::Hiking,
    },
    KeywordRule {
        keywords: &["outside", "out", "away"],
        outcome: ActivationCategory::Out,
    },
    KeywordRule {
        keywords: &["travel"],
        outcome: ActivationCategory::Travel,
    },
];

/// Situation intents in priority order. `NORMAL` is the fallback.
pub const INTENT_RULES: &[KeywordRule<Intent>] = &[
    KeywordRule {
        keywords: &[
            "hiking", "hicking", "trek", "outside", "out", "away", "travel", "journey",
            "overnight",
        ],
        outcome: Intent::Traveling,
    },
    KeywordRule {
        keywords: &["lost", "stolen", "robbed", "snatched"],
        outcome: Intent::Aggressive,
    },
    KeywordRule {
        keywords: &["crowd", "crowded"],
        outcome: Intent::Crowded,
    },
    KeywordRule {
        keywords: &["battery", "save power"],
        outcome: Intent::SaveBattery,
    },
];

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:to|for)\s+([a-z]+)").expect("name pattern is valid")
});

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:hour|hr)").expect("duration pattern is valid")
});

/// Evaluate a rule table against already lower-cased text.
pub fn first_match<T: Copy>(rules: &[KeywordRule<T>], lowered: &str) -> Option<T> {
    rules.iter().find(|rule| rule.matches(lowered)).map(|rule| rule.outcome)
}

/// First run of letters after the word "to" or "for", capitalized.
///
/// Returns an empty string when nothing matches. Only the first match
/// counts and the token is not checked for being an actual name.
pub fn extract_name(text: &str) -> String {
    NAME_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| capitalize(m.as_str()))
        .unwrap_or_default()
}

/// Duration marker such as `2H` from "2 hours" / "5hr". The digits are
/// kept as written; an all-zero duration yields nothing.
pub fn infer_duration(text: &str) -> Option<String> {
    duration_digits(text).map(|digits| format!("{}H", digits))
}

fn duration_digits(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let caps = DURATION_PATTERN.captures(&lowered)?;
    let digits = caps.get(1)?.as_str();
    is_duration_digits(digits).then(|| digits.to_string())
}

pub fn infer_activation_code(text: &str) -> ActivationCode {
    let lowered = text.to_lowercase();
    match first_match(ACTIVATION_RULES, &lowered) {
        Some(category) => ActivationCode::new(category, duration_digits(text)),
        None => ActivationCode::survival(),
    }
}

pub fn infer_intent(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    first_match(INTENT_RULES, &lowered).unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_name_after_to_or_for() {
        assert_eq!(extract_name("set up agent to aryan's number"), "Aryan");
        assert_eq!(extract_name("Set up agent FOR MARIA please"), "Maria");
        assert_eq!(extract_name("protect me, my phone was stolen"), "");
    }

    #[test]
    fn test_extract_name_first_match_wins() {
        assert_eq!(
            extract_name("set up agent to Maria for 3 hours hiking"),
            "Maria"
        );
        // Not validated as a real name
        assert_eq!(extract_name("going for a walk"), "A");
    }

    #[test]
    fn test_extract_name_requires_whole_word() {
        assert_eq!(extract_name("take a photo now"), "");
        assert_eq!(extract_name("therefore stay safe"), "");
        assert_eq!(extract_name("send it into Maria"), "");
        assert_eq!(extract_name("copy onto Ravi's phone"), "");
    }

    #[test]
    fn test_infer_duration() {
        assert_eq!(infer_duration("hiking for 2 hours"), Some("2H".to_string()));
        assert_eq!(infer_duration("out for 5HR"), Some("5H".to_string()));
        assert_eq!(infer_duration("out for 12hrs"), Some("12H".to_string()));
        assert_eq!(infer_duration("out for a while"), None);
        assert_eq!(infer_duration("out for 0 hours"), None);
    }

    #[test]
    fn test_duration_digits_kept_verbatim() {
        assert_eq!(infer_duration("out for 02 hours"), Some("02H".to_string()));
        assert_eq!(
            infer_duration("hiking for 5000000000 hours"),
            Some("5000000000H".to_string())
        );
        assert_eq!(
            infer_activation_code("hiking for 5000000000 hours").to_string(),
            "HIKING-5000000000H"
        );
        assert_eq!(infer_activation_code("out for 02 hours").to_string(), "OUT-02H");
    }

    #[test]
    fn test_activation_code_priority() {
        assert_eq!(infer_activation_code("trek then travel 3 hours").to_string(), "HIKING-3H");
        assert_eq!(infer_activation_code("going away for 4 hr").to_string(), "OUT-4H");
        assert_eq!(infer_activation_code("travel to Pune").to_string(), "TRAVEL");
        assert_eq!(infer_activation_code("hicking trip").to_string(), "HIKING");
    }

    #[test]
    fn test_survival_ignores_duration_words() {
        let code = infer_activation_code("protect me for 6 hours");
        assert_eq!(code.to_string(), "SURVIVAL");
        assert_eq!(code.hours(), None);
    }

    #[test]
    fn test_intent_priority_traveling_before_aggressive() {
        assert_eq!(infer_intent("lost my phone while hiking"), Intent::Traveling);
        assert_eq!(infer_intent("my phone was STOLEN"), Intent::Aggressive);
        assert_eq!(infer_intent("it is crowded here"), Intent::Crowded);
        assert_eq!(infer_intent("please save power"), Intent::SaveBattery);
        assert_eq!(infer_intent("low Battery"), Intent::SaveBattery);
        assert_eq!(infer_intent("set up agent to aryan"), Intent::Normal);
    }

    #[test]
    fn test_intent_substring_matching() {
        // "about" contains "out"
        assert_eq!(infer_intent("worried about tonight"), Intent::Traveling);
    }

    #[test]
    fn test_rule_tables_are_ordered() {
        assert_eq!(ACTIVATION_RULES[0].outcome, ActivationCategory::Hiking);
        assert_eq!(INTENT_RULES[0].outcome, Intent::Traveling);
        assert_eq!(INTENT_RULES.last().map(|r| r.outcome), Some(Intent::SaveBattery));
    }

    #[test]
    fn test_infer_intent_always_in_closed_set() {
        for text in ["", "???", "crowd battery stolen", "journey", "日本語"] {
            assert!(Intent::ALL.contains(&infer_intent(text)));
        }
    }

    /// Text that cannot select any activation category
    fn without_activation_keywords(text: &str) -> bool {
        let lowered = text.to_lowercase();
        !ACTIVATION_RULES.iter().any(|rule| rule.matches(&lowered))
    }

    proptest! {
        #[test]
        fn prop_intent_stays_in_closed_set(text in any::<String>()) {
            prop_assert!(Intent::ALL.contains(&infer_intent(&text)));
        }

        #[test]
        fn prop_survival_never_carries_duration(
            prefix in any::<String>().prop_filter("no activation keyword", |s| without_activation_keywords(s)),
            hours in 0u64..100_000,
            unit in prop::sample::select(vec!["hours", "hour", "hr", "hrs"]),
        ) {
            let text = format!("{} {} {}", prefix, hours, unit);
            prop_assume!(without_activation_keywords(&text));

            let code = infer_activation_code(&text);
            prop_assert_eq!(code.category(), ActivationCategory::Survival);
            prop_assert_eq!(code.to_string(), "SURVIVAL");
            prop_assert_eq!(code.hours(), None);
        }
    }
}
