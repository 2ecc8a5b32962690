//! # exam-extract
//!
//! Turn recognized exam-paper text into structured question records.
//!
//! ## Why this crate?
//!
//! OCR engines and PDF/DOCX readers give back a flat wall of text: running
//! headers on every page, page numbers, bullet glyphs, options glued to
//! their labels. This crate cleans that text and recovers each question
//! with its type (MCQ, true/false, short answer), options, answer key and a
//! difficulty estimate, using fixed, inspectable heuristics.
//!
//! ## Pipeline Overview
//!
//! ```text
//! recognized text
//!  │
//!  ├─ 1. Normalize  drop headers, page numbers, glyph noise; tidy spacing
//!  ├─ 2. Segment    split lines into question blocks
//!  ├─ 3. Fields     stem, options A–D, answer key
//!  ├─ 4. Classify   MCQ / TRUE_FALSE / SHORT, EASY / MEDIUM / HARD
//!  └─ 5. Format     UUID, timestamp, schema version
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use exam_extract::{extract_questions, normalize, Answer, OptionLabel};
//!
//! let raw = "SCHOOL EXAM\nQ1. What is 2+2?\nA)3 B)4 C)5 D)6\nAnswer: B\nPage 1";
//! let records = extract_questions(&normalize(raw), "paper.txt");
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].question, "What is 2+2?");
//! assert_eq!(records[0].answer, Some(Answer::Label(OptionLabel::B)));
//! ```
//!
//! For files on disk use [`extract_file`] or the concurrent
//! [`extract_files`]; [`extract_to_file`] writes a JSON dataset.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `exam-extract` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! exam-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::{BlockRejection, DocumentError, ExtractError};
pub use extract::{
    extract_file, extract_files, extract_from_bytes, extract_questions, extract_questions_with,
    extract_sync, extract_text, extract_to_file, write_dataset,
};
pub use output::{
    Answer, BatchOutput, BatchStats, Difficulty, DocumentResult, DocumentStats, ExtractionOutput,
    OptionLabel, OptionMap, OutputRecord, QuestionType, RecordMeta,
};
pub use pipeline::classify::{classify_difficulty, classify_type};
pub use pipeline::fields::{extract_fields, ParsedFields};
pub use pipeline::format::format_record;
pub use pipeline::normalize::normalize;
pub use pipeline::segment::{is_question_start, segment, QuestionBlock};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{extract_stream, DocumentStream};
