//! Error types for wcr-core.

use std::path::PathBuf;

use thiserror::Error;

/// A single row could not be turned into a [`crate::types::RowContext`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowBuildError {
    /// The row carries more cells than the table has headers.
    #[error("row has {cells} cells but the header defines {headers} columns")]
    RaggedRow { cells: usize, headers: usize },
}

/// A vocabulary table violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    /// A canonical name is itself a variant of a different canonical name,
    /// so reconciling twice would not be a no-op.
    #[error("canonical field '{canonical}' is also mapped as a variant to '{remapped_to}'")]
    NonIdempotent { canonical: String, remapped_to: String },

    /// A variant or canonical name is empty after trimming.
    #[error("vocabulary contains an empty field name")]
    EmptyName,
}

/// All errors that can arise from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure while reading the config file.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error: includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The explicitly requested config file does not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// The configured vocabulary is invalid.
    #[error("invalid vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// The line group layout is unusable.
    #[error("invalid line group layout: {0}")]
    LineGroups(String),
}
