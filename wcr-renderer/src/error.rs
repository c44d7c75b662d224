//! Error types for wcr-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template loading and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error. `message` carries the full cause chain,
    /// which Tera keeps out of its top-level message.
    #[error("template engine error: {message}")]
    Tera {
        message: String,
        #[source]
        source: tera::Error,
    },

    /// The template is not a readable zip container, or writing the output
    /// container failed.
    #[error("document container error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// In-memory buffer error while assembling the document.
    #[error("document buffer error: {0}")]
    Buffer(#[source] std::io::Error),

    /// Filesystem error while loading the template.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// A templated XML part is not valid UTF-8.
    #[error("template part '{part}' is not valid UTF-8")]
    Encoding { part: String },

    /// The container has no `word/document.xml`.
    #[error("template is not a Word document: missing word/document.xml")]
    NotAWordDocument,
}

impl From<tera::Error> for RenderError {
    fn from(source: tera::Error) -> Self {
        let mut message = source.to_string();
        let mut cause = std::error::Error::source(&source);
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }
        RenderError::Tera { message, source }
    }
}
