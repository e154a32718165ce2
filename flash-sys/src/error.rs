// SPDX-License-Identifier: GPL-3.0-only

use flash_types::CatalogError;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for host operations
#[derive(Error, Debug)]
pub enum SysError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Catalog file not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("Flash script {name} not found (searched: {searched})")]
    ScriptNotFound { name: String, searched: String },

    #[error("Required program not found in PATH: {0}")]
    ToolNotFound(&'static str),

    #[error("Failed to start {command}: {reason}")]
    SpawnFailed { command: String, reason: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type alias for host operations
pub type Result<T> = std::result::Result<T, SysError>;
