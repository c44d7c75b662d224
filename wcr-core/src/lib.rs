//! WCR core library: row-to-context materialization.
//!
//! Public API surface:
//! - [`types`]: newtypes, cell values, tables, contexts, artifacts
//! - [`normalize`]: value normalizer
//! - [`vocabulary`]: column reconciler
//! - [`synthesize`]: per-line sequence markers
//! - [`context`]: row context builder
//! - [`config`]: YAML configuration
//! - [`error`]: [`RowBuildError`], [`VocabularyError`], [`ConfigError`]

pub mod config;
pub mod context;
pub mod error;
pub mod normalize;
pub mod synthesize;
pub mod types;
pub mod vocabulary;

pub use config::{ConverterKind, WcrConfig};
pub use context::{PreparedColumns, RowContextBuilder};
pub use error::{ConfigError, RowBuildError, VocabularyError};
pub use normalize::{normalize, normalize_identifier};
pub use synthesize::LineGroupLayout;
pub use types::{
    Artifact, ArtifactKind, Batch, CanonicalField, CellValue, ColumnName, InputTable, RowContext,
};
pub use vocabulary::{ColumnMapping, Vocabulary};
