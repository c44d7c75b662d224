//! Error types for wcr-convert.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {secs}s")]
    Timeout { program: String, secs: u64 },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("converter produced no output at {path}")]
    MissingOutput { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input could not be read as a Word container.
    #[error("unreadable document: {0}")]
    Document(String),

    #[error("PDF layout error: {0}")]
    Pdf(String),
}

/// Helper: wrap an I/O error with its path.
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConvertError {
    ConvertError::Io {
        path: path.into(),
        source,
    }
}
