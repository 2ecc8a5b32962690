//! Classification: question type from the fields, difficulty from the stem.

use crate::config::ExtractionConfig;
use crate::output::{Difficulty, QuestionType};
use crate::pipeline::fields::ParsedFields;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TRUE_FALSE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:true|false)\b").unwrap());

/// `Mcq` iff options were found; otherwise `TrueFalse` when the block
/// mentions `true` or `false` as a whole word; otherwise `Short`.
pub fn classify_type(fields: &ParsedFields) -> QuestionType {
    if !fields.options.is_empty() {
        QuestionType::Mcq
    } else if RE_TRUE_FALSE_WORD.is_match(&fields.block_text) {
        QuestionType::TrueFalse
    } else {
        QuestionType::Short
    }
}

/// Fragments that mark a question as asking for reasoning. Matched anywhere
/// in the lower-cased stem, so "show" counts through "how".
pub const HARD_KEYWORDS: [&str; 6] = ["explain", "analyze", "why", "how", "difference", "describe"];

/// Estimate difficulty with the default word threshold.
pub fn classify_difficulty(question: &str) -> Difficulty {
    classify_difficulty_with(question, &ExtractionConfig::default())
}

/// Reasoning keywords win over length: a short "Why …?" is still `Hard`.
pub fn classify_difficulty_with(question: &str, config: &ExtractionConfig) -> Difficulty {
    let lower = question.to_lowercase();
    if HARD_KEYWORDS.iter().any(|k| lower.contains(*k)) {
        Difficulty::Hard
    } else if question.split_whitespace().count() <= config.easy_max_words {
        Difficulty::Easy
    } else {
        Difficulty::Medium
    }
}
