//! Output types: the question record and the per-document / batch results.
//!
//! [`OutputRecord`] is the stable, serialisable shape consumers persist or
//! send over the wire. Its JSON form is:
//!
//! ```json
//! {
//!   "id": "0b0c…",
//!   "question": "What is 2+2?",
//!   "type": "MCQ",
//!   "difficulty": "EASY",
//!   "options": { "A": "3", "B": "4", "C": "5", "D": "6" },
//!   "answer": "B",
//!   "source": "paper.txt",
//!   "meta": { "length": 3, "created_at": "2026-…Z", "version": "1.0" }
//! }
//! ```

use crate::error::{DocumentError, ExtractError};
use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Schema version stamped into every record's metadata.
pub const SCHEMA_VERSION: &str = "1.0";

// ── Classification enums ─────────────────────────────────────────────────

/// Kind of question, derived from the extracted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    /// Multiple choice: the block carried at least one labelled option.
    Mcq,
    /// True/false: no options, but the block mentions `true` or `false`.
    TrueFalse,
    /// Anything else.
    Short,
}

/// Difficulty tier estimated from the question text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl QuestionType {
    /// Wire name, as serialised.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::TrueFalse => "TRUE_FALSE",
            QuestionType::Short => "SHORT",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Option labels ────────────────────────────────────────────────────────

/// One of the fixed option identifiers A–D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    /// Map a letter (either case) to its label.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLabel::A => "A",
            OptionLabel::B => "B",
            OptionLabel::C => "C",
            OptionLabel::D => "D",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                OptionLabel::from_char(c).ok_or_else(|| format!("not an option label: {s:?}"))
            }
            _ => Err(format!("not an option label: {s:?}")),
        }
    }
}

impl Serialize for OptionLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptionLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Insertion-ordered label → text mapping, at most one entry per label.
///
/// Serialises as a JSON object whose key order is the order the options
/// appeared in the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    entries: Vec<(OptionLabel, String)>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. A repeated label keeps its original position.
    pub fn insert(&mut self, label: OptionLabel, text: impl Into<String>) {
        let text = text.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((label, text)),
        }
    }

    pub fn get(&self, label: OptionLabel) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionLabel, &str)> {
        self.entries.iter().map(|(l, t)| (*l, t.as_str()))
    }

    pub fn labels(&self) -> Vec<OptionLabel> {
        self.entries.iter().map(|(l, _)| *l).collect()
    }
}

impl FromIterator<(OptionLabel, String)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (OptionLabel, String)>>(iter: I) -> Self {
        let mut map = OptionMap::new();
        for (label, text) in iter {
            map.insert(label, text);
        }
        map
    }
}

impl Serialize for OptionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, text) in &self.entries {
            map.serialize_entry(label.as_str(), text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionMapVisitor;

        impl<'de> Visitor<'de> for OptionMapVisitor {
            type Value = OptionMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of option labels A-D to text")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut map = OptionMap::new();
                while let Some((label, text)) = access.next_entry::<OptionLabel, String>()? {
                    map.insert(label, text);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OptionMapVisitor)
    }
}

// ── Answers ──────────────────────────────────────────────────────────────

/// The answer key recovered from an `Answer:` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Answer {
    Label(OptionLabel),
    True,
    False,
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Label(l) => f.write_str(l.as_str()),
            Answer::True => f.write_str("TRUE"),
            Answer::False => f.write_str("FALSE"),
        }
    }
}

impl FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("true") {
            Ok(Answer::True)
        } else if t.eq_ignore_ascii_case("false") {
            Ok(Answer::False)
        } else {
            t.parse::<OptionLabel>()
                .map(Answer::Label)
                .map_err(|_| format!("not an answer: {s:?}"))
        }
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ── Records ──────────────────────────────────────────────────────────────

/// Bookkeeping attached to every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Word count of the question text as extracted.
    pub length: usize,
    pub created_at: DateTime<Utc>,
    pub version: String,
}

/// One structured exam question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub options: OptionMap,
    pub answer: Option<Answer>,
    pub source: String,
    pub meta: RecordMeta,
}

/// Response envelope: a count plus the records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub total: usize,
    pub questions: Vec<OutputRecord>,
}

impl From<Vec<OutputRecord>> for ExtractionOutput {
    fn from(questions: Vec<OutputRecord>) -> Self {
        Self {
            total: questions.len(),
            questions,
        }
    }
}

// ── Per-document and batch results ───────────────────────────────────────

/// Counters for one document's pass through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStats {
    /// Non-blank lines after normalization.
    pub lines: usize,
    /// Blocks produced by segmentation.
    pub blocks: usize,
    /// Blocks that yielded no record.
    pub rejected: usize,
    /// Records produced.
    pub questions: usize,
    pub duration_ms: u64,
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Source label (usually the file name).
    pub source: String,
    pub records: Vec<OutputRecord>,
    pub stats: DocumentStats,
    /// Set when the document could not be processed; `records` is then empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DocumentError>,
}

impl DocumentResult {
    pub(crate) fn failed(source: impl Into<String>, error: DocumentError) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
            stats: DocumentStats::default(),
            error: Some(error),
        }
    }
}

/// Counters for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_documents: usize,
    pub processed_documents: usize,
    pub failed_documents: usize,
    pub total_questions: usize,
    pub duration_ms: u64,
}

/// Result of a batch run over several documents, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub documents: Vec<DocumentResult>,
    pub stats: BatchStats,
}

impl BatchOutput {
    /// All records of all successful documents, in document order.
    pub fn records(&self) -> impl Iterator<Item = &OutputRecord> {
        self.documents.iter().flat_map(|d| d.records.iter())
    }

    pub fn into_records(self) -> Vec<OutputRecord> {
        self.documents
            .into_iter()
            .flat_map(|d| d.records.into_iter())
            .collect()
    }

    /// Treat any failed document as an error.
    pub fn into_result(self) -> Result<Self, ExtractError> {
        if self.stats.failed_documents > 0 {
            return Err(ExtractError::PartialFailure {
                success: self.stats.processed_documents,
                failed: self.stats.failed_documents,
                total: self.stats.total_documents,
            });
        }
        Ok(self)
    }
}
