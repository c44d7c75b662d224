//! # wcr-batch
//!
//! Batch orchestration, archive packaging and atomic output.
//!
//! Call [`run_batch`] to turn an in-memory table into document and
//! converted batches, or [`pipeline::run`] to go from an input file to
//! archives, loose files and `WCR_report.json` on disk.

pub mod error;
pub mod orchestrator;
pub mod package;
pub mod pipeline;
pub mod report;
pub mod writer;

pub use error::{BatchError, PackagingError};
pub use orchestrator::{
    artifact_stem, run_batch, BatchOutcome, RowError, RowFailure, RowWarning, WarningKind,
};
pub use package::package;
pub use pipeline::PipelineSummary;
pub use writer::WrittenFile;
