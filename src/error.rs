//! Error taxonomy.
//!
//! `ConfigError` aborts a run. `FileError` is contained to the file it
//! concerns: the file is recorded as skipped and the scan continues.
//! Per-declaration problems are not errors at all; they surface as
//! `ViolationReason` values on the classification.

use crate::models::token::Category;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("token registry not found: {}", .0.display())]
    RegistryMissing(PathBuf),
    #[error("failed to read token registry {}: {source}", .path.display())]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed token registry at line {line}: {message}")]
    RegistryMalformed { line: usize, message: String },
    #[error("token registry defines no '{0}' tokens")]
    MissingCategory(Category),
    #[error("root path does not exist: {}", .0.display())]
    RootMissing(PathBuf),
    #[error("invalid glob pattern '{pattern}': {message}")]
    BadGlob { pattern: String, message: String },
    #[error("invalid configuration {}: {message}", .path.display())]
    BadConfig { path: PathBuf, message: String },
    #[error("unknown token or colour '{0}'")]
    UnknownColor(String),
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("{path}: read failed: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: not valid UTF-8")]
    NotUtf8 { path: String },
    #[error("{path}: symlink not followed")]
    Symlink { path: String },
    #[error("{path}: extraction exceeded {budget_ms}ms budget")]
    Timeout { path: String, budget_ms: u64 },
}

impl FileError {
    pub fn path(&self) -> &str {
        match self {
            FileError::Read { path, .. }
            | FileError::NotUtf8 { path }
            | FileError::Symlink { path }
            | FileError::Timeout { path, .. } => path,
        }
    }

    /// Short reason recorded in the report's skipped list.
    pub fn reason(&self) -> String {
        match self {
            FileError::Read { source, .. } => format!("read error: {}", source),
            FileError::NotUtf8 { .. } => "not utf-8".to_string(),
            FileError::Symlink { .. } => "symlink".to_string(),
            FileError::Timeout { .. } => "timeout".to_string(),
        }
    }
}
