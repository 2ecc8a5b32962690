//! CLI binary for exam-extract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use exam_extract::pipeline::{input, normalize};
use exam_extract::{
    extract_files, extract_to_file, ExtractionConfig, ExtractionOutput,
    ExtractionProgressCallback, OutputRecord, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// finished document. Documents finish out of order, so start times are
/// keyed by document number.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed_secs(&self, doc_num: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&doc_num)
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting questions from {total_documents} documents…"))
        ));
    }

    fn on_document_start(&self, doc_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(doc_num, Instant::now());
    }

    fn on_document_complete(&self, doc_num: usize, total: usize, questions: usize) {
        let secs = self.elapsed_secs(doc_num);
        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {:<14}  {}",
            green("✓"),
            doc_num,
            total,
            dim(&format!("{questions:>4} questions")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, doc_num: usize, total: usize, error: String) {
        let secs = self.elapsed_secs(doc_num);

        // Keep one line per document.
        let first_line = error.lines().next().unwrap_or_default();
        let msg = if first_line.chars().count() > 80 {
            format!("{}\u{2026}", first_line.chars().take(79).collect::<String>())
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {}  {}",
            red("✗"),
            doc_num,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let failed = total_documents.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents processed successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents processed  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract questions from recognized text (JSON envelope on stdout)
  exam-extract paper.txt

  # Several papers into one dataset file
  exam-extract paper1.txt paper2.txt -o dataset.json

  # Read from a pipe (e.g. straight out of an OCR engine)
  tesseract scan.png - | exam-extract -

  # Human-readable listing
  exam-extract --format text paper.txt

  # Inspect what the normalizer does to a noisy scan
  exam-extract --normalize-only scan.txt

  # Stricter paper: drop instruction blocks, treat up to 12 words as easy
  exam-extract --skip-instructions --easy-max-words 12 paper.txt

INPUT FORMATS:
  Plain text only (.txt, .text, .md, or '-' for stdin). PDF, DOCX, XLSX
  and images must be converted to text by an external reader or OCR
  engine first.

ENVIRONMENT VARIABLES:
  RUST_LOG                          Override the log filter (e.g. exam_extract=debug)
  EXAM_EXTRACT_OUTPUT               Default for --output
  EXAM_EXTRACT_CONCURRENCY          Default for --concurrency
"#;

/// Extract structured exam questions from recognized document text.
#[derive(Parser, Debug)]
#[command(
    name = "exam-extract",
    version,
    about = "Extract structured exam questions from recognized document text",
    long_about = "Clean OCR or reader output of exam papers and extract every question with \
its type (MCQ, TRUE_FALSE, SHORT), options, answer key and estimated difficulty.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Plain-text files to process, or '-' for stdin.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write all records to this file as a JSON array instead of stdout.
    #[arg(short, long, env = "EXAM_EXTRACT_OUTPUT")]
    output: Option<PathBuf>,

    /// Stdout format.
    #[arg(long, env = "EXAM_EXTRACT_FORMAT", value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the normalized text and exit.
    #[arg(long)]
    normalize_only: bool,

    /// Short all-caps lines below this length are dropped as headers.
    #[arg(long, env = "EXAM_EXTRACT_HEADER_MAX_LEN", default_value_t = 30)]
    header_max_len: usize,

    /// Lines shorter than this never start a question.
    #[arg(long, env = "EXAM_EXTRACT_MIN_LINE_LEN", default_value_t = 6)]
    min_line_len: usize,

    /// Questions with at most this many words are EASY.
    #[arg(long, env = "EXAM_EXTRACT_EASY_MAX_WORDS", default_value_t = 8)]
    easy_max_words: usize,

    /// Keep text before the first detected question as its own block.
    #[arg(long, env = "EXAM_EXTRACT_KEEP_LEADING_TEXT")]
    keep_leading_text: bool,

    /// Do not repair OCR'd option glyphs such as '©)'.
    #[arg(long, env = "EXAM_EXTRACT_NO_OCR_FIXES")]
    no_ocr_fixes: bool,

    /// Drop blocks that look like paper instructions.
    #[arg(long, env = "EXAM_EXTRACT_SKIP_INSTRUCTIONS")]
    skip_instructions: bool,

    /// Number of documents processed at once.
    #[arg(short, long, env = "EXAM_EXTRACT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Disable progress bar.
    #[arg(long, env = "EXAM_EXTRACT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "EXAM_EXTRACT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "EXAM_EXTRACT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// `{"total": N, "questions": [...]}`
    Json,
    /// One readable entry per question.
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar gives all the feedback that matters; keep INFO logs
    // out of its way unless asked.
    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.normalize_only && cli.inputs.len() > 1;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Normalize-only mode ──────────────────────────────────────────────
    if cli.normalize_only {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for input_str in &cli.inputs {
            let source = input::resolve_input(input_str)
                .await
                .with_context(|| format!("Failed to read {input_str}"))?;
            let cleaned = normalize::normalize_with(&source.text, &config);
            if cli.inputs.len() > 1 {
                writeln!(handle, "==> {} <==", source.label).context("Failed to write to stdout")?;
            }
            writeln!(handle, "{cleaned}").context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    // ── Run extraction ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = extract_to_file(&cli.inputs, output_path, &config)
            .await
            .context("Extraction failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} documents  {} questions  {}ms  →  {}",
                if stats.failed_documents == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.processed_documents,
                stats.total_documents,
                stats.total_questions,
                stats.duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let batch = extract_files(&cli.inputs, &config)
        .await
        .context("Extraction failed")?;
    let stats = batch.stats.clone();

    // Failed documents were already reported by the progress bar.
    if !cli.quiet && !show_progress {
        for doc in &batch.documents {
            if let Some(ref e) = doc.error {
                eprintln!("{} {}", red("✗"), e);
            }
        }
    }

    let output = ExtractionOutput::from(batch.into_records());
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match cli.format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
        }
        OutputFormat::Text => {
            for (i, record) in output.questions.iter().enumerate() {
                handle
                    .write_all(render_text(i + 1, record).as_bytes())
                    .context("Failed to write to stdout")?;
            }
        }
    }

    if !cli.quiet && !show_progress {
        eprintln!(
            "Extracted {} questions from {}/{} documents in {}ms",
            stats.total_questions,
            stats.processed_documents,
            stats.total_documents,
            stats.duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .header_max_len(cli.header_max_len)
        .min_line_len(cli.min_line_len)
        .easy_max_words(cli.easy_max_words)
        .keep_leading_text(cli.keep_leading_text)
        .fix_ocr_glyphs(!cli.no_ocr_fixes)
        .skip_instruction_blocks(cli.skip_instructions)
        .concurrency(cli.concurrency);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// One record as a readable block for `--format text`.
fn render_text(n: usize, record: &OutputRecord) -> String {
    let mut out = format!(
        "[{n}] {}  {}\n    {}\n",
        bold(&format!("{} / {}", record.question_type, record.difficulty)),
        dim(&record.source),
        record.question
    );
    for (label, text) in record.options.iter() {
        out.push_str(&format!("    {label}) {text}\n"));
    }
    if let Some(answer) = record.answer {
        out.push_str(&format!("    Answer: {}\n", green(&answer.to_string())));
    }
    out.push('\n');
    out
}
