//! Streaming extraction API: emit documents as they complete.
//!
//! Unlike the eager [`crate::extract::extract_files`], which returns only
//! after every document finishes, [`extract_stream`] yields each
//! [`DocumentResult`] through a `Stream` as soon as it is ready. Documents
//! are processed concurrently and arrive in completion order (sort by
//! position in the input list if order matters).

use crate::config::ExtractionConfig;
use crate::error::{DocumentError, ExtractError};
use crate::extract::process_document;
use crate::output::DocumentResult;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = Result<DocumentResult, DocumentError>> + Send>>;

/// Extract questions from several documents, streaming results as they are ready.
///
/// # Returns
/// - `Ok(DocumentStream)`: a stream of `Result<DocumentResult, DocumentError>`
/// - `Err(ExtractError::NoInputs)`: nothing to process
///
/// # Example
/// ```rust,no_run
/// use exam_extract::{extract_stream, ExtractionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let mut stream = extract_stream(vec!["paper1.txt", "paper2.txt"], &config)?;
/// while let Some(doc) = stream.next().await {
///     match doc {
///         Ok(d) => println!("{}: {} questions", d.source, d.records.len()),
///         Err(e) => eprintln!("Error: {e}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub fn extract_stream<I, S>(inputs: I, config: &ExtractionConfig) -> Result<DocumentStream, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let inputs: Vec<String> = inputs.into_iter().map(|s| s.as_ref().to_string()).collect();
    let total = inputs.len();
    if total == 0 {
        return Err(ExtractError::NoInputs);
    }
    info!("Starting streaming extraction of {} documents", total);

    let concurrency = config.concurrency;
    let config_clone = config.clone();

    let s = stream::iter(inputs.into_iter().enumerate().map(move |(idx, input_str)| {
        let cfg = config_clone.clone();
        async move {
            let mut result = process_document(idx + 1, total, &input_str, &cfg).await;
            match result.error.take() {
                None => Ok(result),
                Some(err) => Err(err),
            }
        }
    }))
    .buffer_unordered(concurrency);

    Ok(Box::pin(s))
}
