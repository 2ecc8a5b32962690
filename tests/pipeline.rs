//! Integration tests for exam-extract.
//!
//! Fixture papers live in `./test_cases/`. They imitate what OCR engines
//! and document readers hand over: running headers, page numbers, bullet
//! glyphs, options glued to their labels.
//!
//! Run with:
//!   cargo test --test pipeline -- --nocapture

use exam_extract::pipeline::segment::{segment_with, split_lines};
use exam_extract::{
    extract_file, extract_files, extract_questions, extract_stream, extract_sync,
    extract_to_file, normalize, segment, Answer, Difficulty, DocumentError, ExtractError,
    ExtractionConfig, ExtractionOutput, ExtractionProgressCallback, NoopProgressCallback,
    OptionLabel, OutputRecord, QuestionType,
};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_case(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_cases")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn questions(records: &[OutputRecord]) -> Vec<&str> {
    records.iter().map(|r| r.question.as_str()).collect()
}

/// Run raw text through normalize + extract_questions.
fn extract_raw(raw: &str) -> Vec<OutputRecord> {
    extract_questions(&normalize(raw), "inline")
}

// ── Worked examples ──────────────────────────────────────────────────────────

#[test]
fn test_inline_mcq_example() {
    let records = extract_raw("Q1. What is 2+2? A) 3 B) 4 C) 5 D) 6 Answer: B");
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.question, "What is 2+2?");
    assert_eq!(r.question_type, QuestionType::Mcq);
    assert_eq!(r.difficulty, Difficulty::Easy);
    assert_eq!(r.answer, Some(Answer::Label(OptionLabel::B)));
    let options: Vec<(OptionLabel, &str)> = r.options.iter().collect();
    assert_eq!(
        options,
        vec![
            (OptionLabel::A, "3"),
            (OptionLabel::B, "4"),
            (OptionLabel::C, "5"),
            (OptionLabel::D, "6"),
        ]
    );
}

#[test]
fn test_true_false_example() {
    let records = extract_raw("1. The sky is blue. True/False Answer: True");
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.question_type, QuestionType::TrueFalse);
    assert_eq!(r.answer, Some(Answer::True));
    assert!(r.options.is_empty());
}

#[test]
fn test_short_hard_example() {
    let records = extract_raw("5. Explain the water cycle in detail.");
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.question_type, QuestionType::Short);
    assert_eq!(r.difficulty, Difficulty::Hard);
    assert!(r.options.is_empty());
    assert_eq!(r.answer, None);
}

#[test]
fn test_lower_case_dotted_options() {
    let records = extract_raw(
        "Q3. The capital of France is\na. Berlin b. Paris\nc. Rome d. Madrid\nAnswer: b",
    );
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.question, "The capital of France is");
    assert_eq!(r.question_type, QuestionType::Mcq);
    assert_eq!(r.options.len(), 4);
    assert_eq!(r.options.get(OptionLabel::B), Some("Paris"));
    assert_eq!(r.answer, Some(Answer::Label(OptionLabel::B)));
}

#[test]
fn test_empty_text() {
    assert!(segment("").is_empty());
    assert!(extract_questions("", "empty.txt").is_empty());
    assert!(extract_raw(" \r\n\t ").is_empty());
}

// ── Properties ───────────────────────────────────────────────────────────────

#[test]
fn test_every_line_kept_with_leading_text() {
    let config = ExtractionConfig::builder()
        .keep_leading_text(true)
        .build()
        .unwrap();
    let text = normalize(&std::fs::read_to_string(test_case("mixed_exam.txt")).unwrap());
    let blocks = segment_with(&text, &config);

    let from_blocks: Vec<String> = blocks.iter().flat_map(|b| b.lines().to_vec()).collect();
    assert_eq!(from_blocks, split_lines(&text));
}

#[test]
fn test_option_lines_never_open_a_block() {
    let text = normalize(&std::fs::read_to_string(test_case("noisy_ocr.txt")).unwrap());
    for block in segment(&text) {
        let first = block.first_line();
        let mut chars = first.chars();
        let label = chars.next().unwrap();
        let marker = chars.next();
        let looks_like_option = "ABCDabcd".contains(label)
            && matches!(marker, Some(')') | Some('.'))
            && chars.next().is_some_and(char::is_whitespace);
        assert!(!looks_like_option, "block opened by option line {first:?}");
    }
}

#[test]
fn test_no_answer_marker_means_no_answer() {
    let records = extract_raw("1. Name a noble gas.\nA) Neon B) Iron\n2. Define density");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.answer.is_none()));
}

#[test]
fn test_mcq_iff_options() {
    let text = normalize(&std::fs::read_to_string(test_case("mixed_exam.txt")).unwrap());
    for r in extract_questions(&text, "mixed_exam.txt") {
        assert_eq!(r.question_type == QuestionType::Mcq, !r.options.is_empty());
    }
}

// ── Fixture papers ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_mixed_exam_paper() {
    let doc = extract_file(test_case("mixed_exam.txt"), &ExtractionConfig::default())
        .await
        .unwrap();

    assert_eq!(doc.source, "mixed_exam.txt");
    assert!(doc.error.is_none());
    assert_eq!(
        questions(&doc.records),
        vec![
            "What is the chemical symbol for water?",
            "Which planet is known as the Red Planet?",
            "The Sun is a star.",
            "Water boils at 50 degrees Celsius at sea level.",
            "Explain the water cycle in detail.",
            "Name the process by which plants make their own food using sunlight and water.",
        ]
    );

    let types: Vec<QuestionType> = doc.records.iter().map(|r| r.question_type).collect();
    assert_eq!(
        types,
        vec![
            QuestionType::Mcq,
            QuestionType::Mcq,
            QuestionType::TrueFalse,
            QuestionType::TrueFalse,
            QuestionType::Short,
            QuestionType::Short,
        ]
    );

    let difficulties: Vec<Difficulty> = doc.records.iter().map(|r| r.difficulty).collect();
    assert_eq!(
        difficulties,
        vec![
            Difficulty::Easy,
            Difficulty::Easy,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Medium,
        ]
    );

    let answers: Vec<Option<Answer>> = doc.records.iter().map(|r| r.answer).collect();
    assert_eq!(
        answers,
        vec![
            Some(Answer::Label(OptionLabel::A)),
            Some(Answer::Label(OptionLabel::B)),
            Some(Answer::True),
            Some(Answer::False),
            None,
            None,
        ]
    );

    assert_eq!(doc.records[0].options.get(OptionLabel::C), Some("NaCl"));
    assert_eq!(doc.records[1].options.get(OptionLabel::D), Some("Saturn"));
    assert_eq!(doc.stats.blocks, 6);
    assert_eq!(doc.stats.rejected, 0);
}

#[tokio::test]
async fn test_noisy_ocr_paper() {
    let doc = extract_file(test_case("noisy_ocr.txt"), &ExtractionConfig::default())
        .await
        .unwrap();

    assert_eq!(
        questions(&doc.records),
        vec![
            "Name the gas plants release during photosynthesis",
            "Why do we see lightning before we hear thunder?",
            "The capital of France is",
        ]
    );

    let gas = &doc.records[0];
    assert_eq!(gas.question_type, QuestionType::Mcq);
    assert_eq!(gas.options.get(OptionLabel::C), Some("Helium"));
    assert_eq!(gas.answer, Some(Answer::Label(OptionLabel::A)));

    let thunder = &doc.records[1];
    assert_eq!(thunder.question_type, QuestionType::Short);
    assert_eq!(thunder.difficulty, Difficulty::Hard);

    let capital = &doc.records[2];
    assert_eq!(capital.options.get(OptionLabel::B), Some("Paris"));
    assert_eq!(capital.answer, Some(Answer::Label(OptionLabel::B)));
}

#[test]
fn test_noisy_ocr_without_glyph_repair_loses_option_c() {
    let config = ExtractionConfig::builder()
        .fix_ocr_glyphs(false)
        .build()
        .unwrap();
    let doc = extract_sync(test_case("noisy_ocr.txt"), &config).unwrap();
    let gas = &doc.records[0];
    assert_eq!(gas.options.get(OptionLabel::C), None);
    assert_eq!(gas.options.get(OptionLabel::B), Some("Nitrogen ©)Helium"));
}

#[test]
fn test_extract_file_with_tokio_test_runtime() {
    let doc = tokio_test::block_on(extract_file(
        test_case("noisy_ocr.txt"),
        &ExtractionConfig::default(),
    ))
    .unwrap();
    assert_eq!(doc.records.len(), 3);
    assert!(doc.records.iter().all(|r| r.source == "noisy_ocr.txt"));
}

// ── Input errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_file() {
    let err = extract_file(test_case("no_such_paper.txt"), &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::FileNotFound { .. }));
}

#[tokio::test]
async fn test_disguised_binary() {
    let err = extract_file(test_case("disguised.txt"), &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::NotPlainText { .. }));
}

// ── Batch, dataset and stream ────────────────────────────────────────────────

struct CountingCallback {
    started: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
    questions: AtomicUsize,
}

impl ExtractionProgressCallback for CountingCallback {
    fn on_document_start(&self, _doc_num: usize, _total: usize) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_document_complete(&self, _doc_num: usize, _total: usize, questions: usize) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.questions.fetch_add(questions, Ordering::SeqCst);
    }

    fn on_document_error(&self, _doc_num: usize, _total: usize, _error: String) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_batch_with_partial_failure() {
    let counter = Arc::new(CountingCallback {
        started: AtomicUsize::new(0),
        completed: AtomicUsize::new(0),
        failed: AtomicUsize::new(0),
        questions: AtomicUsize::new(0),
    });
    let config = ExtractionConfig::builder()
        .concurrency(2)
        .progress_callback(counter.clone() as Arc<dyn ExtractionProgressCallback>)
        .build()
        .unwrap();

    let inputs = vec![
        test_case("mixed_exam.txt"),
        test_case("scan.pdf"),
        test_case("noisy_ocr.txt"),
    ];
    let batch = extract_files(&inputs, &config).await.unwrap();

    // input order, not completion order
    let sources: Vec<&str> = batch.documents.iter().map(|d| d.source.as_str()).collect();
    assert_eq!(sources, vec!["mixed_exam.txt", "scan.pdf", "noisy_ocr.txt"]);
    match &batch.documents[1].error {
        Some(DocumentError::Unsupported { detail, .. }) => assert!(detail.contains("PDF reader")),
        other => panic!("expected an unsupported-format error, got {other:?}"),
    }

    assert_eq!(batch.stats.total_documents, 3);
    assert_eq!(batch.stats.processed_documents, 2);
    assert_eq!(batch.stats.failed_documents, 1);
    assert_eq!(batch.stats.total_questions, 9);
    assert_eq!(batch.records().count(), 9);

    assert_eq!(counter.started.load(Ordering::SeqCst), 3);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
    assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
    assert_eq!(counter.questions.load(Ordering::SeqCst), 9);

    assert!(matches!(
        batch.into_result(),
        Err(ExtractError::PartialFailure {
            success: 2,
            failed: 1,
            total: 3
        })
    ));
}

#[tokio::test]
async fn test_batch_all_failed() {
    let inputs = [test_case("missing_a.txt"), test_case("missing_b.txt")];
    let err = extract_files(&inputs, &ExtractionConfig::default())
        .await
        .unwrap_err();
    match err {
        ExtractError::AllDocumentsFailed { total, first_error } => {
            assert_eq!(total, 2);
            assert!(first_error.contains("missing_a.txt"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_extract_to_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dataset.json");

    let stats = extract_to_file(
        &[test_case("mixed_exam.txt")],
        &out,
        &ExtractionConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(stats.total_questions, 6);

    let json = std::fs::read_to_string(&out).unwrap();
    assert!(json.starts_with('['));
    let records: Vec<OutputRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].meta.version, "1.0");
    assert_eq!(records[0].source, "mixed_exam.txt");

    // no temp files left behind
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn test_stream_yields_every_document() {
    let config = ExtractionConfig::builder()
        .progress_callback(Arc::new(NoopProgressCallback))
        .build()
        .unwrap();
    let stream = extract_stream(
        vec![
            test_case("mixed_exam.txt"),
            test_case("noisy_ocr.txt"),
            test_case("disguised.txt"),
        ],
        &config,
    )
    .unwrap();
    let items: Vec<_> = stream.collect().await;
    assert_eq!(items.len(), 3);

    let mut counts: Vec<usize> = items
        .iter()
        .filter_map(|i| i.as_ref().ok())
        .map(|d| d.records.len())
        .collect();
    counts.sort_unstable();
    assert_eq!(counts, vec![3, 6]);

    let errors: Vec<&DocumentError> = items.iter().filter_map(|i| i.as_ref().err()).collect();
    assert!(matches!(errors.as_slice(), [DocumentError::Unsupported { .. }]));
}

// ── JSON shape ───────────────────────────────────────────────────────────────

#[test]
fn test_envelope_json_shape() {
    let output = ExtractionOutput::from(extract_raw(
        "Q1. What is 2+2? A) 3 B) 4 C) 5 D) 6 Answer: B\n2. The Earth is flat. True/False",
    ));
    let v = serde_json::to_value(&output).unwrap();

    assert_eq!(v["total"], 2);
    let first = &v["questions"][0];
    assert_eq!(first["type"], "MCQ");
    assert_eq!(first["difficulty"], "EASY");
    assert_eq!(first["answer"], "B");
    assert_eq!(first["options"]["C"], "5");
    assert_eq!(first["meta"]["length"], 3);
    assert_eq!(first["meta"]["version"], "1.0");
    assert!(first["meta"]["created_at"].as_str().unwrap().ends_with('Z'));

    let second = &v["questions"][1];
    assert_eq!(second["type"], "TRUE_FALSE");
    assert!(second["answer"].is_null());
    assert_eq!(second["options"], serde_json::json!({}));
}

#[test]
fn test_noop_callback_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NoopProgressCallback>();
    assert_send_sync::<ExtractionConfig>();
}
