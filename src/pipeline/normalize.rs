//! Normalization: deterministic cleanup of recognized document text.
//!
//! Recognizers hand us text with Windows line endings, running headers on
//! every page, page numbers, bullet glyphs, table-of-contents leader dots
//! and ragged spacing. None of that is question content, and all of it
//! confuses the line-based segmenter downstream.
//!
//! ## Rule Order
//!
//! Line endings are unified first so the line-oriented rules see one line
//! per `\n`. Header and page-number suppression run before glyph removal
//! so a page footer like `- 3 -` is still recognizable as a whole line.
//! Option-marker spacing runs last, after spaces have been collapsed.

use crate::config::ExtractionConfig;
use once_cell::sync::Lazy;
use regex::Regex;

/// Clean raw recognized text with the default configuration.
///
/// Total: empty or whitespace-only input yields an empty string.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &ExtractionConfig::default())
}

/// Clean raw recognized text.
///
/// Rules (applied in order):
/// 1. Unify line breaks to `\n`, tabs to spaces
/// 2. Drop short all-caps lines without digits (running headers/footers)
/// 3. Drop standalone page numbers (`Page 3`, `3/10`, `- 3 -`)
/// 4. Repair OCR'd option glyphs, then blank out stray bullets and boxes
/// 5. Replace leader runs of 3+ dots or hyphens with a space
/// 6. Collapse spaces and blank lines; space out glued option markers
pub fn normalize_with(raw: &str, config: &ExtractionConfig) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    let s = normalise_line_breaks(raw);
    let s = remove_headers_footers(&s, config.header_max_len);
    let s = remove_page_numbers(&s);
    let s = if config.fix_ocr_glyphs {
        fix_option_glyphs(&s)
    } else {
        s
    };
    let s = remove_noise_glyphs(&s);
    let s = collapse_leader_runs(&s);
    let s = collapse_spacing(&s);
    let s = space_option_markers(&s);
    s.trim().to_string()
}

// ── Rule 1: Line breaks and tabs ─────────────────────────────────────────────

fn normalise_line_breaks(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', " ")
}

// ── Rule 2: Running headers and footers ──────────────────────────────────────

fn remove_headers_footers(input: &str, max_len: usize) -> String {
    input
        .split('\n')
        .filter(|line| !is_running_header(line, max_len))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A running header is short, shouted, and carries no digit.
///
/// Length is counted with internal whitespace runs collapsed so that the
/// verdict does not change once rule 6 has tidied the line.
pub(crate) fn is_running_header(line: &str, max_len: usize) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return false;
    }
    let collapsed_len = trimmed.split_whitespace().map(|w| w.chars().count()).sum::<usize>()
        + trimmed.split_whitespace().count().saturating_sub(1);
    let has_upper = trimmed.chars().any(char::is_uppercase);
    let has_lower = trimmed.chars().any(char::is_lowercase);
    let has_digit = trimmed.chars().any(|c| c.is_numeric());
    has_upper && !has_lower && !has_digit && collapsed_len < max_len
}

// ── Rule 3: Page numbers ─────────────────────────────────────────────────────

static RE_PAGE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^page\s*\d+$").unwrap());
static RE_PAGE_FRACTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s*/\s*\d+$").unwrap());
static RE_PAGE_DASHED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s*\d+\s*-$").unwrap());

pub(crate) fn is_page_number(line: &str) -> bool {
    let trimmed = line.trim();
    RE_PAGE_WORD.is_match(trimmed)
        || RE_PAGE_FRACTION.is_match(trimmed)
        || RE_PAGE_DASHED.is_match(trimmed)
}

fn remove_page_numbers(input: &str) -> String {
    input
        .split('\n')
        .filter(|line| !is_page_number(line))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Glyph repair and noise removal ───────────────────────────────────
//
// Tesseract regularly reads a circled or bold `C` as the copyright sign.
// Only the marker forms are repaired; a bare `©` elsewhere is left alone.

fn fix_option_glyphs(input: &str) -> String {
    input.replace("©)", "C)").replace("©.", "C.")
}

const NOISE_GLYPHS: [char; 8] = [
    '\u{FFFD}', '•', '►', '■', '◆', '▪', '●', '□',
];

fn remove_noise_glyphs(input: &str) -> String {
    input.replace(NOISE_GLYPHS, " ")
}

// ── Rule 5: Leader runs ──────────────────────────────────────────────────────

static RE_LEADER_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}|-{3,}").unwrap());

fn collapse_leader_runs(input: &str) -> String {
    RE_LEADER_RUN.replace_all(input, " ").to_string()
}

// ── Rule 6: Spacing ──────────────────────────────────────────────────────────

static RE_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_spacing(input: &str) -> String {
    let s = RE_SPACE_RUN.replace_all(input, " ");
    RE_BLANK_LINES.replace_all(&s, "\n\n").to_string()
}

/// Insert a space after `A)`..`D)` / `A.`..`D.` when text is glued to it.
///
/// Hand-rolled instead of a regex replace so overlapping markers
/// (`B.C.D`) are all handled in one pass, which keeps normalization
/// idempotent.
fn space_option_markers(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    for (i, &c) in chars.iter().enumerate() {
        out.push(c);
        let is_marker_end = matches!(c, ')' | '.')
            && i > 0
            && matches!(chars[i - 1], 'A'..='D');
        if is_marker_end {
            if let Some(next) = chars.get(i + 1) {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }
    out
}

// ── Tests ────────────────────────────────────────────────────────────────────
