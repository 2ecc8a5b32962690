//! Segmentation: partition normalized text into per-question blocks.
//!
//! The segmenter walks the lines once, in order, and asks a boundary
//! predicate whether each line opens a new question. Everything up to the
//! next opening line belongs to the current block (stem continuation,
//! options, the answer line).
//!
//! ## Boundary rules
//!
//! The predicate is a rule table evaluated top to bottom; the first rule
//! with an opinion decides. Precedence matters: an option line such as
//! `A) What is it?` ends with `?` and would satisfy [`BoundaryRule::QuestionMark`],
//! so [`BoundaryRule::OptionMarker`] must reject it first.

use crate::config::ExtractionConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// A contiguous, non-empty run of lines hypothesized to be one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    lines: Vec<String>,
}

impl QuestionBlock {
    fn open(first: String) -> Self {
        Self { lines: vec![first] }
    }

    /// Build a block from explicit lines. Blank lines are dropped and the
    /// rest trimmed; returns `None` if nothing remains.
    pub fn from_lines<I, S>(lines: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<String> = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(Self { lines })
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn first_line(&self) -> &str {
        &self.lines[0]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The block as one string, lines joined with single spaces.
    pub fn joined(&self) -> String {
        self.lines.join(" ")
    }
}

// ── Line splitting ───────────────────────────────────────────────────────────

/// Split text into trimmed, non-blank lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace('\r', "\n")
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Boundary predicate ───────────────────────────────────────────────────────

/// Outcome of the boundary predicate for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The line opens a new question block.
    Start,
    /// The line continues the current block (or is discarded if none is open).
    Continue,
}

/// One rule of the boundary predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRule {
    /// Reject lines shorter than the configured minimum.
    TooShort,
    /// Reject lines that begin with an option marker (`A) `, `b. `).
    OptionMarker,
    /// Accept `Q1.` / `q12)` prefixes, including OCR'd `Qi.` / `Ql.`.
    QuestionNumber,
    /// Accept bare `1. ` / `12) ` prefixes.
    BareNumber,
    /// Accept sentence-like lines ending in `?` (more than three words).
    QuestionMark,
    /// Accept lines opening with a question or instruction word.
    QuestionWord,
}

/// Rules in precedence order.
pub const BOUNDARY_RULES: [BoundaryRule; 6] = [
    BoundaryRule::TooShort,
    BoundaryRule::OptionMarker,
    BoundaryRule::QuestionNumber,
    BoundaryRule::BareNumber,
    BoundaryRule::QuestionMark,
    BoundaryRule::QuestionWord,
];

/// Words that open a question when followed by a space. Includes a few
/// Hindi transliterations common on bilingual papers.
pub const QUESTION_WORDS: [&str; 22] = [
    "what",
    "why",
    "how",
    "when",
    "where",
    "who",
    "whom",
    "which",
    "define",
    "explain",
    "describe",
    "discuss",
    "write",
    "differentiate",
    "compare",
    "list",
    "state",
    "give reason",
    "short note",
    "kya",
    "kyon",
    "kaise",
];

static RE_OPTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Da-d][.)]\s+").unwrap());
static RE_QUESTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^q(?:\d+|[il]\d*)[.)]").unwrap());
static RE_BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+[.)]\s+").unwrap());

impl BoundaryRule {
    pub fn name(self) -> &'static str {
        match self {
            BoundaryRule::TooShort => "too-short",
            BoundaryRule::OptionMarker => "option-marker",
            BoundaryRule::QuestionNumber => "question-number",
            BoundaryRule::BareNumber => "bare-number",
            BoundaryRule::QuestionMark => "question-mark",
            BoundaryRule::QuestionWord => "question-word",
        }
    }

    /// `Some(verdict)` if this rule decides the line, `None` to defer.
    pub fn apply(self, line: &str, min_len: usize) -> Option<Verdict> {
        let decided = match self {
            BoundaryRule::TooShort => line.chars().count() < min_len,
            BoundaryRule::OptionMarker => RE_OPTION_LINE.is_match(line),
            BoundaryRule::QuestionNumber => RE_QUESTION_NUMBER.is_match(line),
            BoundaryRule::BareNumber => RE_BARE_NUMBER.is_match(line),
            BoundaryRule::QuestionMark => {
                line.ends_with('?') && line.split_whitespace().count() > 3
            }
            BoundaryRule::QuestionWord => starts_with_question_word(line),
        };
        if !decided {
            return None;
        }
        Some(match self {
            BoundaryRule::TooShort | BoundaryRule::OptionMarker => Verdict::Continue,
            _ => Verdict::Start,
        })
    }
}

fn starts_with_question_word(line: &str) -> bool {
    let lower = line.to_lowercase();
    QUESTION_WORDS.iter().any(|w| {
        lower
            .strip_prefix(w)
            .is_some_and(|rest| rest.starts_with(' '))
    })
}

/// Run the rule table over a (trimmed) line.
///
/// Returns the verdict and the rule that produced it; `None` means no rule
/// matched and the line defaulted to [`Verdict::Continue`].
pub fn boundary_verdict(line: &str, min_len: usize) -> (Verdict, Option<BoundaryRule>) {
    let line = line.trim();
    BOUNDARY_RULES
        .iter()
        .find_map(|rule| rule.apply(line, min_len).map(|v| (v, Some(*rule))))
        .unwrap_or((Verdict::Continue, None))
}

/// Does this line open a new question? Uses the default minimum length.
pub fn is_question_start(line: &str) -> bool {
    is_question_start_with(line, &ExtractionConfig::default())
}

pub fn is_question_start_with(line: &str, config: &ExtractionConfig) -> bool {
    boundary_verdict(line, config.min_line_len).0 == Verdict::Start
}

// ── Segmentation ─────────────────────────────────────────────────────────────

/// Scan state: the only mutable thing in the segmenter.
#[derive(Debug)]
enum ScanState {
    NoOpenBlock,
    OpenBlock(QuestionBlock),
}

#[derive(Debug)]
struct Segmentation {
    blocks: Vec<QuestionBlock>,
    state: ScanState,
    discarded: usize,
}

impl Segmentation {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            state: ScanState::NoOpenBlock,
            discarded: 0,
        }
    }

    fn step(mut self, line: String, config: &ExtractionConfig) -> Self {
        let starts = is_question_start_with(&line, config);
        self.state = match (std::mem::replace(&mut self.state, ScanState::NoOpenBlock), starts) {
            (ScanState::OpenBlock(block), true) => {
                self.blocks.push(block);
                ScanState::OpenBlock(QuestionBlock::open(line))
            }
            (ScanState::NoOpenBlock, true) => ScanState::OpenBlock(QuestionBlock::open(line)),
            (ScanState::OpenBlock(mut block), false) => {
                block.lines.push(line);
                ScanState::OpenBlock(block)
            }
            (ScanState::NoOpenBlock, false) if config.keep_leading_text => {
                ScanState::OpenBlock(QuestionBlock::open(line))
            }
            (ScanState::NoOpenBlock, false) => {
                self.discarded += 1;
                ScanState::NoOpenBlock
            }
        };
        self
    }

    fn finish(mut self) -> (Vec<QuestionBlock>, usize) {
        if let ScanState::OpenBlock(block) = self.state {
            self.blocks.push(block);
        }
        (self.blocks, self.discarded)
    }
}

/// Partition normalized text into question blocks with the default configuration.
pub fn segment(normalized: &str) -> Vec<QuestionBlock> {
    segment_with(normalized, &ExtractionConfig::default())
}

/// Partition normalized text into question blocks.
///
/// Lines before the first question start are discarded unless
/// `config.keep_leading_text` is set.
pub fn segment_with(normalized: &str, config: &ExtractionConfig) -> Vec<QuestionBlock> {
    let (blocks, discarded) = split_lines(normalized)
        .into_iter()
        .fold(Segmentation::new(), |acc, line| acc.step(line, config))
        .finish();
    debug!(
        "Segmented into {} blocks ({} leading lines discarded)",
        blocks.len(),
        discarded
    );
    blocks
}

// ── Tests ────────────────────────────────────────────────────────────────────
