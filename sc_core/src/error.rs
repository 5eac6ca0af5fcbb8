use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the feature engines and their loaders.
///
/// Configuration errors (window, dimensions, parameters) are raised before
/// any computation starts. Degenerate data never produces an error.
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Invalid insulation window size {0} (must be at least 1)")]
    InvalidWindow(usize),

    #[error("Dimension mismatch: {what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Contact matrix is not square ({rows} x {cols})")]
    NotSquare { rows: usize, cols: usize },

    #[error("Invalid matrix entry at ({row}, {col}): {message}")]
    InvalidEntry {
        row: usize,
        col: usize,
        message: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Error accessing array file {path}: {message}")]
    ArrayFile { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FeatureError>;

impl FeatureError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn array_file(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ArrayFile {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
