//! Errors surfaced by the converters and document I/O.

use std::path::PathBuf;

/// Errors that can occur while loading, converting or saving metadata.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A path input did not resolve to an existing file.
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input was neither a mapping nor a resolvable file path.
    #[error("expected string, path, or mapping input, got {0}")]
    InvalidInput(String),

    /// A field the target format cannot do without was missing.
    #[error("required field missing: {0}")]
    MissingField(String),

    #[error("unknown output format: {0}. Use 'turtle', 'ntriples' or 'jsonld'")]
    UnknownFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
