//! Error types for FileBatch
//!
//! Errors only flow through the filesystem collaborator, configuration,
//! plan loading and status persistence. The batch operations themselves
//! fold every failure into their per-file records and return a status.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for FileBatch
#[derive(Error, Debug)]
pub enum FileBatchError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// Path the failing operation was acting on
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File or directory not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Source and destination resolve to the same file
    #[error("Source and destination are the same: {0}")]
    SameSourceAndDestination(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Batch plan could not be read or parsed
    #[error("Plan error: {0}")]
    PlanError(String),

    /// Status snapshot could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FileBatchError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a plan error
    pub fn plan(message: impl Into<String>) -> Self {
        Self::PlanError(message.into())
    }

    /// Check if this error means the path does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::NotFound(path)
            | Self::SameSourceAndDestination(path) => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for FileBatch operations
pub type Result<T> = std::result::Result<T, FileBatchError>;

impl From<std::io::Error> for FileBatchError {
    fn from(err: std::io::Error) -> Self {
        FileBatchError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for FileBatchError {
    fn from(err: serde_json::Error) -> Self {
        FileBatchError::Serialization(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| FileBatchError::io(path, e))
    }
}
