//! Configuration types for question extraction.
//!
//! Every heuristic threshold the pipeline uses lives in
//! [`ExtractionConfig`], built via its [`ExtractionConfigBuilder`]. The
//! defaults reproduce the tuned behaviour for typical exam papers; the knobs
//! exist for recognizers whose output is noisier or cleaner than usual.

use crate::error::ExtractError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for a question-extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use exam_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .easy_max_words(10)
///     .concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Lines shorter than this that are all upper case with no digit are
    /// dropped as running headers. Default: 30.
    ///
    /// Exam papers repeat the school name or paper title at the top of every
    /// page. Those lines are short and shouted; real question lines almost
    /// always carry a number or lower-case text.
    pub header_max_len: usize,

    /// Lines shorter than this never start a question. Default: 6.
    ///
    /// OCR splits margins and stray marks into tiny fragments such as `1.`
    /// or `Q)`; treating them as boundaries would shred real questions.
    pub min_line_len: usize,

    /// Questions with at most this many words are `EASY` unless they carry
    /// a hard keyword. Default: 8.
    pub easy_max_words: usize,

    /// Keep text that precedes the first detected question as its own block.
    /// Default: false (such text is discarded).
    pub keep_leading_text: bool,

    /// Repair common OCR glyph misreadings of option markers (`©)` → `C)`).
    /// Default: true.
    pub fix_ocr_glyphs: bool,

    /// Reject blocks that read as paper instructions ("Instructions",
    /// "Choose one", …) or are shorter than 15 characters. Default: false.
    pub skip_instruction_blocks: bool,

    /// Number of documents processed at once by the batch entry points.
    /// Default: 4.
    pub concurrency: usize,

    /// Optional per-document progress events for batch runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            header_max_len: 30,
            min_line_len: 6,
            easy_max_words: 8,
            keep_leading_text: false,
            fix_ocr_glyphs: true,
            skip_instruction_blocks: false,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("header_max_len", &self.header_max_len)
            .field("min_line_len", &self.min_line_len)
            .field("easy_max_words", &self.easy_max_words)
            .field("keep_leading_text", &self.keep_leading_text)
            .field("fix_ocr_glyphs", &self.fix_ocr_glyphs)
            .field("skip_instruction_blocks", &self.skip_instruction_blocks)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn header_max_len(mut self, len: usize) -> Self {
        self.config.header_max_len = len;
        self
    }

    pub fn min_line_len(mut self, len: usize) -> Self {
        self.config.min_line_len = len.max(1);
        self
    }

    pub fn easy_max_words(mut self, words: usize) -> Self {
        self.config.easy_max_words = words;
        self
    }

    pub fn keep_leading_text(mut self, v: bool) -> Self {
        self.config.keep_leading_text = v;
        self
    }

    pub fn fix_ocr_glyphs(mut self, v: bool) -> Self {
        self.config.fix_ocr_glyphs = v;
        self
    }

    pub fn skip_instruction_blocks(mut self, v: bool) -> Self {
        self.config.skip_instruction_blocks = v;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.header_max_len > 200 {
            return Err(ExtractError::InvalidConfig(format!(
                "header_max_len must be ≤ 200, got {}",
                c.header_max_len
            )));
        }
        if c.min_line_len == 0 {
            return Err(ExtractError::InvalidConfig(
                "min_line_len must be ≥ 1".into(),
            ));
        }
        if c.concurrency == 0 {
            return Err(ExtractError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
