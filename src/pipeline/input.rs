//! Input resolution: turn a user-supplied path (or `-`) into recognized text.
//!
//! The pipeline only ever sees plain text. Container formats (PDF, DOCX,
//! XLSX) and images need an external reader or OCR engine first; those are
//! recognized by extension and refused with a pointed error instead of being
//! fed to the normalizer as binary garbage. A `.txt` file that is secretly a
//! PDF or ZIP is caught by its magic bytes.

use crate::error::ExtractError;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Source label used when reading from standard input.
pub const STDIN_LABEL: &str = "stdin";

/// Document kind, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    PlainText,
    Pdf,
    WordDocument,
    Spreadsheet,
    Image,
}

impl SourceFormat {
    /// Classify a path by extension (case-insensitive). `None` if unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" | "md" => Some(SourceFormat::PlainText),
            "pdf" => Some(SourceFormat::Pdf),
            "docx" => Some(SourceFormat::WordDocument),
            "xlsx" => Some(SourceFormat::Spreadsheet),
            "png" | "jpg" | "jpeg" => Some(SourceFormat::Image),
            _ => None,
        }
    }

    /// Whether this crate can read the format directly.
    pub fn is_plain_text(self) -> bool {
        self == SourceFormat::PlainText
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFormat::PlainText => "plain text",
            SourceFormat::Pdf => "PDF",
            SourceFormat::WordDocument => "DOCX",
            SourceFormat::Spreadsheet => "XLSX",
            SourceFormat::Image => "image",
        })
    }
}

/// Recognized text ready for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    /// File name (or `stdin`), copied into every record's `source`.
    pub label: String,
    pub text: String,
}

/// Resolve a path or `-` to its text.
pub async fn resolve_input(input: &str) -> Result<SourceText, ExtractError> {
    if input.trim().is_empty() {
        return Err(ExtractError::InvalidInput {
            input: input.to_string(),
        });
    }
    if input == "-" {
        return read_stdin().await;
    }
    resolve_local(Path::new(input)).await
}

async fn read_stdin() -> Result<SourceText, ExtractError> {
    let mut bytes = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut bytes)
        .await
        .map_err(|source| ExtractError::ReadFailed {
            path: PathBuf::from(STDIN_LABEL),
            source,
        })?;
    debug!("Read {} bytes from stdin", bytes.len());
    Ok(SourceText {
        label: STDIN_LABEL.to_string(),
        text: decode_lossy(&bytes),
    })
}

async fn resolve_local(path: &Path) -> Result<SourceText, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = match SourceFormat::from_path(path) {
        Some(f) => f,
        None => {
            return Err(ExtractError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })
        }
    };
    if !format.is_plain_text() {
        return Err(ExtractError::ExternalReaderRequired {
            path: path.to_path_buf(),
            format: format.to_string(),
        });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ExtractError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if let Some(magic) = binary_signature(&bytes) {
        return Err(ExtractError::NotPlainText {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Resolved {} ({} bytes)", path.display(), bytes.len());
    Ok(SourceText {
        label: source_label(path),
        text: decode_lossy(&bytes),
    })
}

/// Label for a raw input argument without reading it.
pub fn input_label(input: &str) -> String {
    if input == "-" {
        STDIN_LABEL.to_string()
    } else {
        source_label(Path::new(input))
    }
}

/// File name of the path, or the whole path if it has none.
pub fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Invalid UTF-8 becomes U+FFFD, which the normalizer blanks out.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

const SIGNATURES: [&[u8]; 4] = [
    b"%PDF",
    b"PK\x03\x04",
    b"\x89PNG",
    b"\xFF\xD8\xFF",
];

/// First four bytes, if they match a known binary container signature.
fn binary_signature(bytes: &[u8]) -> Option<[u8; 4]> {
    if !SIGNATURES.iter().any(|sig| bytes.starts_with(sig)) {
        return None;
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Some(magic)
}
