//! Error types for the exam-extract library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`ExtractError`] (**Fatal**): the extraction cannot proceed at all
//!   (missing file, a binary format that needs an external reader, output
//!   file cannot be written). Returned as `Err(ExtractError)` from the
//!   file-level `extract*` functions.
//!
//! * [`DocumentError`] (**Non-fatal**): one document of a batch failed but
//!   the others are fine. Stored inside [`crate::output::DocumentResult`]
//!   so callers can inspect partial success.
//!
//! * [`BlockRejection`] (**Expected**): a question block carried no
//!   recoverable question text. The composed pipeline drops these silently;
//!   they are values, not failures.
//!
//! Data-quality problems in the text itself never surface as errors: empty
//! or garbled input simply yields no records.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the exam-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a usable path.
    #[error("Invalid input '{input}': not a file path or '-' for stdin")]
    InvalidInput { input: String },

    /// The file extension is not one the pipeline knows about.
    #[error("Unsupported file type '.{extension}' for '{path}'")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file is a container format whose text must be recognized upstream.
    #[error(
        "'{path}' is a {format} file; extract its text with a {format} reader \
         or OCR first and pass the resulting .txt"
    )]
    ExternalReaderRequired { path: PathBuf, format: String },

    /// The file claims to be plain text but starts with a binary signature.
    #[error("File is not plain text: '{path}'\nFirst bytes: {magic:?}")]
    NotPlainText { path: PathBuf, magic: [u8; 4] },

    /// Reading the file failed after it was opened.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch call was given nothing to process.
    #[error("No input documents were given")]
    NoInputs,

    // ── Batch errors ──────────────────────────────────────────────────────
    /// Every document in the batch failed.
    #[error("All {total} documents failed.\nFirst error: {first_error}")]
    AllDocumentsFailed { total: usize, first_error: String },

    /// Some documents succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::BatchOutput::into_result`] when the
    /// caller wants to treat any document failure as an error.
    #[error("{failed}/{total} documents failed during extraction")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output dataset file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Records could not be serialised to JSON.
    #[error("Failed to serialise records: {0}")]
    SerializeFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document of a batch.
///
/// Stored alongside [`crate::output::DocumentResult`] when a document fails.
/// The batch continues unless ALL documents fail.
#[derive(Debug, Clone, Error, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// The document could not be read.
    #[error("{source_label}: read failed: {detail}")]
    ReadFailed { source_label: String, detail: String },

    /// The document's format needs an external reader or is unknown.
    #[error("{source_label}: unsupported input: {detail}")]
    Unsupported { source_label: String, detail: String },

    /// The worker task running the pipeline died.
    #[error("{source_label}: extraction task failed: {detail}")]
    TaskFailed { source_label: String, detail: String },
}

impl DocumentError {
    /// Classify a fatal single-document error into its batch-level form.
    pub fn from_extract(source_label: impl Into<String>, err: &ExtractError) -> Self {
        let source_label = source_label.into();
        let detail = err.to_string();
        match err {
            ExtractError::UnsupportedFormat { .. }
            | ExtractError::ExternalReaderRequired { .. }
            | ExtractError::NotPlainText { .. } => DocumentError::Unsupported {
                source_label,
                detail,
            },
            ExtractError::Internal(_) => DocumentError::TaskFailed {
                source_label,
                detail,
            },
            _ => DocumentError::ReadFailed {
                source_label,
                detail,
            },
        }
    }
}

/// Why a question block yielded no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BlockRejection {
    /// Nothing was left of the question stem after cleaning.
    #[error("block has no question text after cleaning")]
    EmptyQuestion,

    /// The block reads as paper instructions rather than a question.
    #[error("block looks like instructions (matched '{keyword}')")]
    Instruction { keyword: &'static str },
}
