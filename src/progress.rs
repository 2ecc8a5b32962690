//! Progress-callback trait for per-document extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as a batch run works through its documents. The trait is
//! `Send + Sync` because documents are processed concurrently.
//!
//! # Example
//!
//! ```rust
//! use exam_extract::{ExtractionProgressCallback, ExtractionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     questions: Arc<AtomicUsize>,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, doc_num: usize, total: usize, questions: usize) {
//!         self.questions.fetch_add(questions, Ordering::SeqCst);
//!         eprintln!("Document {}/{} done ({} questions)", doc_num, total, questions);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     questions: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch entry points as they process each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `on_document_*` may be called concurrently from
/// different threads.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once before any document is read.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document is read.
    ///
    /// # Arguments
    /// * `doc_num`: 1-indexed position of the document in the batch
    /// * `total`: number of documents in the batch
    fn on_document_start(&self, doc_num: usize, total: usize) {
        let _ = (doc_num, total);
    }

    /// Called when a document has been fully processed.
    ///
    /// # Arguments
    /// * `doc_num`: 1-indexed position of the document
    /// * `total`: number of documents in the batch
    /// * `questions`: records produced for this document
    fn on_document_complete(&self, doc_num: usize, total: usize, questions: usize) {
        let _ = (doc_num, total, questions);
    }

    /// Called when a document could not be processed.
    ///
    /// Takes the message by value so implementations can move it into
    /// spawned tasks.
    fn on_document_error(&self, doc_num: usize, total: usize, error: String) {
        let _ = (doc_num, total, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
