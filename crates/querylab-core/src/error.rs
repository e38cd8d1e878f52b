//! Error types for querylab

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuerylabError {
    // Dataset errors
    #[error("Dataset not found: {name}")]
    DatasetNotFound { name: String },

    #[error("Dataset file missing: {path}")]
    DatasetFileMissing { path: PathBuf },

    #[error("Malformed dataset file {path} at line {line}: {reason}")]
    DatasetFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    // Index errors
    #[error("Index not built at {path}. Run 'querylab index' first")]
    IndexNotBuilt { path: PathBuf },

    #[error("Index at {path} was built for dataset '{built_for}', not '{requested}'. Rebuild with --force")]
    IndexStale {
        path: PathBuf,
        built_for: String,
        requested: String,
    },

    #[error("Index engine error: {0}")]
    Engine(String),

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for QuerylabError {
    fn from(err: serde_json::Error) -> Self {
        QuerylabError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuerylabError>;
