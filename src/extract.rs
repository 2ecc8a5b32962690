//! Eager extraction entry points.
//!
//! The core is [`extract_questions`]: already-cleaned text in, records out,
//! synchronous and pure apart from id/timestamp generation. The functions
//! around it add the outer layers: [`extract_text`] normalizes first and
//! records stats, [`extract_file`] reads a document, [`extract_files`]
//! processes a batch concurrently, and [`extract_to_file`] writes the
//! combined dataset. Use [`crate::stream::extract_stream`] to receive
//! documents as they finish instead.

use crate::config::ExtractionConfig;
use crate::error::{DocumentError, ExtractError};
use crate::output::{BatchOutput, BatchStats, DocumentResult, DocumentStats, OutputRecord};
use crate::pipeline::{classify, fields, format, input, normalize, segment};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

// ── Core composition ─────────────────────────────────────────────────────

/// Extract question records from normalized text.
///
/// Segments the text, extracts fields from every block, classifies each
/// question and formats the records, in document order. Blocks that yield
/// no question are dropped. Empty input yields an empty vector.
///
/// # Example
/// ```rust
/// use exam_extract::{extract_questions, normalize, QuestionType};
///
/// let text = normalize("Q1. What is 2+2? A) 3 B) 4 C) 5 D) 6 Answer: B");
/// let records = extract_questions(&text, "paper.txt");
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].question_type, QuestionType::Mcq);
/// ```
pub fn extract_questions(cleaned_text: &str, source: &str) -> Vec<OutputRecord> {
    extract_questions_with(cleaned_text, source, &ExtractionConfig::default())
}

pub fn extract_questions_with(
    cleaned_text: &str,
    source: &str,
    config: &ExtractionConfig,
) -> Vec<OutputRecord> {
    run_pipeline(cleaned_text, source, config).0
}

fn run_pipeline(
    cleaned_text: &str,
    source: &str,
    config: &ExtractionConfig,
) -> (Vec<OutputRecord>, DocumentStats) {
    let lines = segment::split_lines(cleaned_text).len();
    let blocks = segment::segment_with(cleaned_text, config);

    let mut rejected = 0;
    let records: Vec<OutputRecord> = blocks
        .iter()
        .filter_map(|block| match fields::extract_fields_with(block, config) {
            Ok(parsed) => {
                let question_type = classify::classify_type(&parsed);
                let difficulty = classify::classify_difficulty_with(&parsed.question, config);
                Some(format::format_record(parsed, question_type, difficulty, source))
            }
            Err(reason) => {
                rejected += 1;
                debug!("{}: dropped block {:?}: {}", source, block.first_line(), reason);
                None
            }
        })
        .collect();

    let stats = DocumentStats {
        lines,
        blocks: blocks.len(),
        rejected,
        questions: records.len(),
        duration_ms: 0,
    };
    (records, stats)
}

// ── Document entry points ────────────────────────────────────────────────

/// Normalize raw recognized text and extract its questions.
///
/// Never fails: text without questions produces an empty result.
pub fn extract_text(raw: &str, source: &str, config: &ExtractionConfig) -> DocumentResult {
    let start = Instant::now();
    let cleaned = normalize::normalize_with(raw, config);
    let (records, mut stats) = run_pipeline(&cleaned, source, config);
    stats.duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        "{}: {} lines, {} blocks, {} rejected, {} questions",
        source, stats.lines, stats.blocks, stats.rejected, stats.questions
    );
    DocumentResult {
        source: source.to_string(),
        records,
        stats,
        error: None,
    }
}

/// Extract questions from in-memory bytes (decoded as lossy UTF-8).
pub fn extract_from_bytes(bytes: &[u8], source: &str, config: &ExtractionConfig) -> DocumentResult {
    extract_text(&input::decode_lossy(bytes), source, config)
}

/// Read a plain-text document (or `-` for stdin) and extract its questions.
///
/// # Errors
/// Fatal errors only: the file is missing, unreadable, or not plain text.
pub async fn extract_file(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<DocumentResult, ExtractError> {
    let input_str = input_str.as_ref();
    info!("Extracting questions: {}", input_str);

    let source = input::resolve_input(input_str).await?;

    // CPU-bound regex work stays off the async workers
    let cfg = config.clone();
    let result = tokio::task::spawn_blocking(move || extract_text(&source.text, &source.label, &cfg))
        .await
        .map_err(|e| ExtractError::Internal(format!("extraction task panicked: {e}")))?;

    info!(
        "{}: {} questions ({} blocks rejected) in {}ms",
        result.source, result.stats.questions, result.stats.rejected, result.stats.duration_ms
    );
    Ok(result)
}

/// Synchronous wrapper around [`extract_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<DocumentResult, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_file(input_str, config))
}

// ── Batch entry points ───────────────────────────────────────────────────

/// Process one document of a batch, firing progress events. Failures are
/// folded into the result instead of aborting the batch.
pub(crate) async fn process_document(
    doc_num: usize,
    total: usize,
    input_str: &str,
    config: &ExtractionConfig,
) -> DocumentResult {
    if let Some(ref cb) = config.progress_callback {
        cb.on_document_start(doc_num, total);
    }

    let result = match extract_file(input_str, config).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Document {}/{} failed: {}", doc_num, total, e);
            let label = input::input_label(input_str);
            let error = DocumentError::from_extract(label.clone(), &e);
            DocumentResult::failed(label, error)
        }
    };

    if let Some(ref cb) = config.progress_callback {
        match &result.error {
            None => cb.on_document_complete(doc_num, total, result.records.len()),
            Some(e) => cb.on_document_error(doc_num, total, e.to_string()),
        }
    }
    result
}

/// Extract questions from several documents concurrently.
///
/// Up to `config.concurrency` documents are in flight at once. Results are
/// returned in input order.
///
/// # Errors
/// - [`ExtractError::NoInputs`] for an empty input list
/// - [`ExtractError::AllDocumentsFailed`] when not a single document could
///   be processed; partial failures are reported per document instead
pub async fn extract_files<S: AsRef<str>>(
    inputs: &[S],
    config: &ExtractionConfig,
) -> Result<BatchOutput, ExtractError> {
    let total = inputs.len();
    if total == 0 {
        return Err(ExtractError::NoInputs);
    }
    let start = Instant::now();
    info!("Starting batch extraction of {} documents", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut indexed: Vec<(usize, DocumentResult)> =
        stream::iter(inputs.iter().enumerate().map(|(idx, input_str)| {
            let input_str = input_str.as_ref().to_string();
            let cfg = config.clone();
            async move { (idx, process_document(idx + 1, total, &input_str, &cfg).await) }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;
    indexed.sort_by_key(|(idx, _)| *idx);
    let documents: Vec<DocumentResult> = indexed.into_iter().map(|(_, doc)| doc).collect();

    let processed = documents.iter().filter(|d| d.error.is_none()).count();
    let failed = total - processed;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, processed);
    }

    if processed == 0 {
        let first_error = documents
            .iter()
            .find_map(|d| d.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ExtractError::AllDocumentsFailed { total, first_error });
    }

    let stats = BatchStats {
        total_documents: total,
        processed_documents: processed,
        failed_documents: failed,
        total_questions: documents.iter().map(|d| d.records.len()).sum(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} documents, {} questions, {}ms",
        processed, total, stats.total_questions, stats.duration_ms
    );

    Ok(BatchOutput { documents, stats })
}

/// Extract a batch and write every record to `output_path` as a JSON array.
pub async fn extract_to_file<S: AsRef<str>>(
    inputs: &[S],
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<BatchStats, ExtractError> {
    let batch = extract_files(inputs, config).await?;
    let stats = batch.stats.clone();
    write_dataset(&batch.into_records(), output_path)?;
    Ok(stats)
}

/// Write records as a pretty-printed JSON array.
///
/// Uses atomic write (temp file in the target directory + rename) so a
/// reader never sees a half-written dataset. An empty record list still
/// writes `[]`, with a warning.
pub fn write_dataset(
    records: &[OutputRecord],
    output_path: impl AsRef<Path>,
) -> Result<(), ExtractError> {
    let path = output_path.as_ref();
    let write_err = |source: std::io::Error| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if records.is_empty() {
        warn!("No questions extracted; writing empty dataset to {}", path.display());
    }

    let json = serde_json::to_string_pretty(records)
        .map_err(|e| ExtractError::SerializeFailed(e.to_string()))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    info!("Saved {} questions to {}", records.len(), path.display());
    Ok(())
}
