//! Field extraction: question stem, options and answer from one block.
//!
//! A block arrives as a handful of lines such as
//!
//! ```text
//! Q1. What is 2+2?
//! A) 3 B) 4 C) 5 D) 6
//! Answer: B
//! ```
//!
//! and leaves as [`ParsedFields`]. Extraction works on the block joined
//! into one line, so options split across lines by OCR still parse.

use crate::config::ExtractionConfig;
use crate::error::BlockRejection;
use crate::output::{Answer, OptionLabel, OptionMap};
use crate::pipeline::segment::QuestionBlock;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fields recovered from one question block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFields {
    /// Stem text before the first option marker. Never empty.
    pub question: String,
    pub options: OptionMap,
    pub answer: Option<Answer>,
    /// The block after structural cleanup and numbering removal, with any
    /// `True / False` label still in place for the type classifier.
    pub block_text: String,
}

/// Extract fields with the default configuration.
pub fn extract_fields(block: &QuestionBlock) -> Result<ParsedFields, BlockRejection> {
    extract_fields_with(block, &ExtractionConfig::default())
}

pub fn extract_fields_with(
    block: &QuestionBlock,
    config: &ExtractionConfig,
) -> Result<ParsedFields, BlockRejection> {
    if config.skip_instruction_blocks {
        check_instructions(block)?;
    }

    let block_text = strip_numbering(&remove_structural_noise(block));
    let text = RE_TRUE_FALSE_LABEL.replace_all(&block_text, "").into_owned();

    let (body, answer) = match RE_ANSWER_MARKER.find(&text) {
        Some(m) => (&text[..m.start()], parse_answer(&text[m.start()..])),
        None => (text.as_str(), None),
    };

    let dotted = RE_DOTTED_RUN.find(body).map(|m| m.start());
    let cut = RE_FIRST_OPTION
        .find(body)
        .map(|m| m.start())
        .into_iter()
        .chain(dotted)
        .min()
        .unwrap_or(body.len());
    let question = body[..cut].trim().to_string();
    if question.is_empty() {
        return Err(BlockRejection::EmptyQuestion);
    }

    Ok(ParsedFields {
        question,
        options: scan_options(&body[cut..], dotted.is_some()),
        answer,
        block_text,
    })
}

// ── Instruction filter ───────────────────────────────────────────────────────

/// Phrases that mark a block as paper instructions rather than a question.
pub const INSTRUCTION_KEYWORDS: [&str; 5] = [
    "section",
    "true / false",
    "choose one",
    "short answer",
    "instructions",
];

const MIN_BLOCK_CHARS: usize = 15;

fn check_instructions(block: &QuestionBlock) -> Result<(), BlockRejection> {
    let joined = block.joined();
    if joined.chars().count() < MIN_BLOCK_CHARS {
        return Err(BlockRejection::Instruction {
            keyword: "too short",
        });
    }
    let lower = joined.to_lowercase();
    match INSTRUCTION_KEYWORDS.iter().copied().find(|k| lower.contains(*k)) {
        Some(keyword) => Err(BlockRejection::Instruction { keyword }),
        None => Ok(()),
    }
}

// ── Structural noise ─────────────────────────────────────────────────────────

static RE_SECTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^section\s+[a-z]").unwrap());
static RE_TRUE_FALSE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)true\s*/\s*false").unwrap());

/// Book emojis used as section decorations, and their UTF-8-read-as-Latin-1 forms.
const DECORATIONS: [&str; 8] = [
    "\u{1F4D7}",
    "\u{1F4D9}",
    "\u{1F4D5}",
    "\u{1F4D8}",
    "ðŸ“—",
    "ðŸ“™",
    "ðŸ“•",
    "ðŸ“˜",
];

fn remove_structural_noise(block: &QuestionBlock) -> String {
    let joined = block
        .lines()
        .iter()
        .filter(|line| !RE_SECTION_LINE.is_match(line))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let mut text = joined;
    for deco in DECORATIONS {
        text = text.replace(deco, "");
    }
    text.trim().to_string()
}

// ── Numbering ────────────────────────────────────────────────────────────────

static RE_Q_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Q[\dA-Za-z]+[.)]\s*").unwrap());
static RE_BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s*").unwrap());

fn strip_numbering(text: &str) -> String {
    let s = RE_Q_NUMBER.replace(text, "");
    RE_BARE_NUMBER.replace(&s, "").trim().to_string()
}

// ── Answer ───────────────────────────────────────────────────────────────────

static RE_ANSWER_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)answer\s*:").unwrap());
static RE_ANSWER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^answer\s*:\s*(?:option\s*)?\(?([A-D]|true|false)\b").unwrap()
});

/// Parse the answer token following an `Answer:` marker.
///
/// The token must be a whole word: `Answer: Delhi` has no answer key.
fn parse_answer(tail: &str) -> Option<Answer> {
    RE_ANSWER
        .captures(tail)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

// ── Options ──────────────────────────────────────────────────────────────────

/// Where the stem ends: the first `A)` / `A.` / `a)` marker.
static RE_FIRST_OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:A[).]|a\))").unwrap());

/// Lower-case dotted options need an `a.` followed by a `b.`; a lone
/// `a.` is ordinary prose ("Name a. hormone").
static RE_DOTTED_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\ba\.\s.*?\bb\.\s").unwrap());

/// Position of an option marker within the scanned text.
struct Marker {
    label: OptionLabel,
    start: usize,
    end: usize,
}

fn find_markers(text: &str, lower_dotted: bool) -> Vec<Marker> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut markers = Vec::new();
    for (i, &(pos, c)) in chars.iter().enumerate() {
        let Some(&(_, next)) = chars.get(i + 1) else {
            break;
        };
        let spaced = chars.get(i + 2).is_some_and(|&(_, after)| after.is_whitespace());
        let is_marker = match c {
            'A'..='D' => matches!(next, ')' | '.'),
            'a'..='d' => next == ')' || (lower_dotted && next == '.' && spaced),
            _ => false,
        };
        let detached = i == 0 || !chars[i - 1].1.is_alphanumeric();
        if is_marker && detached {
            if let Some(label) = OptionLabel::from_char(c) {
                markers.push(Marker {
                    label,
                    start: pos,
                    end: pos + c.len_utf8() + next.len_utf8(),
                });
            }
        }
    }
    markers
}

/// Collect `label → text` pairs; each value runs to the next marker.
fn scan_options(region: &str, lower_dotted: bool) -> OptionMap {
    let markers = find_markers(region, lower_dotted);
    let mut options = OptionMap::new();
    for (i, marker) in markers.iter().enumerate() {
        let value_end = markers.get(i + 1).map_or(region.len(), |m| m.start);
        let value = region[marker.end..value_end]
            .trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
        if !value.is_empty() {
            options.insert(marker.label, value);
        }
    }
    options
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> QuestionBlock {
        QuestionBlock::from_lines(text.lines()).unwrap()
    }

    fn parse(text: &str) -> ParsedFields {
        extract_fields(&block(text)).unwrap()
    }

    #[test]
    fn test_inline_mcq() {
        let f = parse("Q1. What is 2+2? A) 3 B) 4 C) 5 D) 6 Answer: B");
        assert_eq!(f.question, "What is 2+2?");
        assert_eq!(f.options.len(), 4);
        assert_eq!(f.options.get(OptionLabel::A), Some("3"));
        assert_eq!(f.options.get(OptionLabel::D), Some("6"));
        assert_eq!(f.answer, Some(Answer::Label(OptionLabel::B)));
    }

    #[test]
    fn test_multiline_mcq() {
        let f = parse("3. Which gas do plants absorb?\nA. Oxygen\nB. Carbon dioxide\nC. Nitrogen\nD. Helium\nAnswer: Option B");
        assert_eq!(f.question, "Which gas do plants absorb?");
        assert_eq!(f.options.get(OptionLabel::B), Some("Carbon dioxide"));
        assert_eq!(f.answer, Some(Answer::Label(OptionLabel::B)));
    }

    #[test]
    fn test_lower_case_options_and_answer() {
        let f = parse("Q2) Pick the prime a) 4 b) 6 c) 7 d) 9 answer: (c)");
        assert_eq!(f.question, "Pick the prime");
        assert_eq!(f.options.get(OptionLabel::D), Some("9"));
        assert_eq!(f.answer, Some(Answer::Label(OptionLabel::C)));

        // lower-case `a.` is not a marker
        let f = parse("Q5. Name a. hormone");
        assert_eq!(f.question, "Name a. hormone");
        assert!(f.options.is_empty());

        let f = parse("Q2) Pick the prime A) 4 b) 6 c) 7 d) 9");
        assert_eq!(f.question, "Pick the prime");
        assert_eq!(f.options.labels(), OptionLabel::ALL.to_vec());
        assert_eq!(f.options.get(OptionLabel::C), Some("7"));
    }

    #[test]
    fn test_lower_case_dotted_options() {
        let f = parse("Q3. The capital of France is\na. Berlin b. Paris\nc. Rome d. Madrid\nAnswer: b");
        assert_eq!(f.question, "The capital of France is");
        assert_eq!(f.options.labels(), OptionLabel::ALL.to_vec());
        assert_eq!(f.options.get(OptionLabel::A), Some("Berlin"));
        assert_eq!(f.options.get(OptionLabel::D), Some("Madrid"));
        assert_eq!(f.answer, Some(Answer::Label(OptionLabel::B)));

        // a dotted `a.` on its own stays in the stem
        let f = parse("Q5. Name a. hormone made by the pancreas");
        assert_eq!(f.question, "Name a. hormone made by the pancreas");
        assert!(f.options.is_empty());

        // glued to a word is never a marker
        let f = parse("Q6. Define the term data. b. none");
        assert!(f.options.is_empty());
    }

    #[test]
    fn test_true_false() {
        let f = parse("1. The sky is blue. True/False Answer: True");
        assert_eq!(f.question, "The sky is blue.");
        assert!(f.options.is_empty());
        assert_eq!(f.answer, Some(Answer::True));
        assert!(f.block_text.contains("True/False"));

        let f = parse("2. The Earth is flat. True / False");
        assert_eq!(f.question, "The Earth is flat.");
        assert_eq!(f.answer, None);
        assert_eq!(f.block_text, "The Earth is flat. True / False");
    }

    #[test]
    fn test_short_question_without_answer() {
        let f = parse("5. Explain the water cycle in detail.");
        assert_eq!(f.question, "Explain the water cycle in detail.");
        assert!(f.options.is_empty());
        assert_eq!(f.answer, None);
    }

    #[test]
    fn test_answer_must_be_whole_word() {
        let f = parse("Q4. Capital of India? Answer: Delhi");
        assert_eq!(f.question, "Capital of India?");
        assert_eq!(f.answer, None);
    }

    #[test]
    fn test_answer_text_not_in_options() {
        let f = parse("Q1. Largest planet? A) Mars B) Jupiter Answer: B) Jupiter");
        assert_eq!(f.options.len(), 2);
        assert_eq!(f.options.get(OptionLabel::B), Some("Jupiter"));
        assert_eq!(f.answer, Some(Answer::Label(OptionLabel::B)));
    }

    #[test]
    fn test_empty_question_rejected() {
        let err = extract_fields(&block("Q7. A) yes B) no")).unwrap_err();
        assert_eq!(err, BlockRejection::EmptyQuestion);

        let err = extract_fields(&block("Q8. Answer: A")).unwrap_err();
        assert_eq!(err, BlockRejection::EmptyQuestion);
    }

    #[test]
    fn test_option_values_trimmed_and_empties_dropped() {
        let f = parse("Q1. Choose A) : red - B) C) blue");
        assert_eq!(f.options.get(OptionLabel::A), Some("red"));
        assert_eq!(f.options.get(OptionLabel::B), None);
        assert_eq!(f.options.get(OptionLabel::C), Some("blue"));
    }

    #[test]
    fn test_repeated_label_overwrites_in_place() {
        let f = parse("Q1. Pick A) one B) two A) three");
        assert_eq!(f.options.labels(), vec![OptionLabel::A, OptionLabel::B]);
        assert_eq!(f.options.get(OptionLabel::A), Some("three"));
    }

    #[test]
    fn test_markers_inside_words_ignored() {
        let f = parse("Q1. Name it A) DNA. B) RNA.");
        assert_eq!(f.options.get(OptionLabel::A), Some("DNA."));
        assert_eq!(f.options.get(OptionLabel::B), Some("RNA."));
    }

    #[test]
    fn test_section_line_removed() {
        let f = parse("Q9. Define force.\nSECTION B\nIt is a push or pull.");
        assert_eq!(f.question, "Define force. It is a push or pull.");
    }

    #[test]
    fn test_decorations_removed() {
        let f = parse("Q3. \u{1F4D7} Define work ðŸ“˜");
        assert_eq!(f.question, "Define work");
    }

    #[test]
    fn test_numbering_variants() {
        assert_eq!(strip_numbering("Q12) Name it"), "Name it");
        assert_eq!(strip_numbering("qi. Name it"), "Name it");
        assert_eq!(strip_numbering("7. Name it"), "Name it");
        assert_eq!(strip_numbering("Name 7. it"), "Name 7. it");
    }

    #[test]
    fn test_instruction_blocks_only_skipped_when_enabled() {
        let b = block("Write short answer questions below.");
        assert!(extract_fields(&b).is_ok());

        let config = ExtractionConfig::builder()
            .skip_instruction_blocks(true)
            .build()
            .unwrap();
        assert_eq!(
            extract_fields_with(&b, &config).unwrap_err(),
            BlockRejection::Instruction {
                keyword: "short answer"
            }
        );
        assert!(matches!(
            extract_fields_with(&block("Q1. Why?"), &config),
            Err(BlockRejection::Instruction { .. })
        ));
        assert!(extract_fields_with(&block("Q1. What is the speed of light?"), &config).is_ok());
    }
}
