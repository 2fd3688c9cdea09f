//! Error types for cdmerge-core

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while merging a component descriptor
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("archive '{archive}' does not contain expected file '{expected}'")]
    ArchiveFormat { archive: PathBuf, expected: String },

    #[error("malformed fragment document '{file}': {source}")]
    FragmentParse {
        file: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("post-condition violated: {0}")]
    PostCondition(String),

    #[error("blob '{blob}' digest mismatch: expected {expected}, got {actual}")]
    BlobDigestMismatch {
        blob: String,
        expected: String,
        actual: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
