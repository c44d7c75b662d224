//! Error types for wcr-batch.

use std::path::PathBuf;

use thiserror::Error;

use wcr_core::ConfigError;
use wcr_ingest::IngestError;
use wcr_renderer::RenderError;

/// Pipeline-level errors. Per-row problems never surface here; they are
/// recorded in the batch outcome instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("input error: {0}")]
    Ingest(#[from] IngestError),

    /// The template could not be loaded or compiled.
    #[error("template error: {0}")]
    Template(#[source] RenderError),

    #[error("packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (batch report).
    #[error("report JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors assembling one archive.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("duplicate archive entry '{name}'")]
    DuplicateEntry { name: String },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive buffer error: {0}")]
    Buffer(#[source] std::io::Error),

    /// The archive could not be written to, or cleared from, the output
    /// directory.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`BatchError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BatchError {
    BatchError::Io {
        path: path.into(),
        source,
    }
}
