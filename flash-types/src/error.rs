// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Errors raised while reading a device catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Line {line}: '{column}' is empty")]
    EmptyField { line: u64, column: &'static str },

    #[error("Catalog contains no devices")]
    Empty,
}

/// A progress line that could not be turned into a percentage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressParseError {
    #[error("no number before '%' in \"{0}\"")]
    MissingNumber(String),

    #[error("invalid progress value \"{token}\" in \"{line}\"")]
    InvalidNumber { token: String, line: String },
}
