//! Errors raised while loading board data from disk.
//!
//! The engine itself never fails; only the file-facing edges (config,
//! level packs, high scores) return these.

use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read or written.
    Io { path: PathBuf, source: io::Error },
    /// The file was read but is not valid JSON for the expected type.
    Json { path: PathBuf, source: serde_json::Error },
    /// A level table parsed but does not fit the board.
    InvalidLevel { level: String, reason: String },
}

impl LoadError {
    pub fn invalid_level(level: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLevel {
            level: level.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "failed to access {:?}: {}", path, source),
            LoadError::Json { path, source } => write!(f, "failed to parse {:?}: {}", path, source),
            LoadError::InvalidLevel { level, reason } => {
                write!(f, "level '{}' is invalid: {}", level, reason)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Json { source, .. } => Some(source),
            LoadError::InvalidLevel { .. } => None,
        }
    }
}
