//! Error types for the protdiff library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum ProtdiffError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("directory not found (or not a directory): {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("unknown test '{0}' (expected one of: t-test, welch, mann-whitney)")]
    UnknownTest(String),

    #[error(
        "unknown correction method '{0}' (expected one of: none, bonferroni, holm, sidak, fdr_bh, fdr_by)"
    )]
    UnknownCorrectionMethod(String),

    #[error("Invalid measurement '{value}' at row {row}, column {col}")]
    InvalidMeasurement {
        value: String,
        row: usize,
        col: usize,
    },

    #[error("Missing column '{0}' in result table")]
    MissingColumn(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ProtdiffError>;
