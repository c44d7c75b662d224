//! Shared generation pipeline entrypoint used by the CLI.
//!
//! load config-derived builder → read input → compile template → run batch
//! → write loose files → package archives → save report.

use std::path::{Path, PathBuf};

use wcr_convert::build_converter;
use wcr_core::{Batch, WcrConfig};
use wcr_ingest::load_table;
use wcr_renderer::DocxTemplate;

use crate::error::{BatchError, PackagingError};
use crate::orchestrator::{run_batch, BatchOutcome};
use crate::package::package;
use crate::report::{self, BatchReport};
use crate::writer::{atomic_write, remove_stale, WrittenFile};

/// What a pipeline run left on disk, plus the in-memory outcome.
#[derive(Debug)]
pub struct PipelineSummary {
    pub outcome: BatchOutcome,
    pub archives: Vec<WrittenFile>,
    pub loose_files: Vec<WrittenFile>,
    pub report: PathBuf,
    /// Archives that failed to assemble. The rest of the run still completes.
    pub packaging_errors: Vec<(String, PackagingError)>,
}

/// Run the full pipeline for `input` with the settings in `config`.
pub fn run(config: &WcrConfig, input: &Path) -> Result<PipelineSummary, BatchError> {
    let builder = config.context_builder()?;
    let table = load_table(input)?;
    let template = DocxTemplate::from_path(&config.template).map_err(BatchError::Template)?;
    let converter = config
        .convert
        .then(|| build_converter(config.converter, &config.office));

    let outcome = run_batch(&table, &builder, &template, converter.as_deref());

    let out = &config.output_dir;
    std::fs::create_dir_all(out).map_err(|e| crate::error::io_err(out, e))?;

    let mut loose_files = Vec::new();
    if config.write_loose_files {
        for artifact in outcome
            .documents
            .artifacts
            .iter()
            .chain(outcome.converted.artifacts.iter())
        {
            loose_files.push(atomic_write(&out.join(&artifact.name), &artifact.bytes)?);
        }
    }

    let mut archives = Vec::new();
    let mut packaging_errors = Vec::new();
    for (batch, name) in [
        (&outcome.documents, &config.archives.documents),
        (&outcome.converted, &config.archives.converted),
    ] {
        match write_archive(batch, &out.join(name)) {
            Ok(Some(written)) => archives.push(written),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("{name}: {e}");
                packaging_errors.push((name.clone(), e));
            }
        }
    }

    let report = BatchReport::new(input, &config.template, &outcome, archives.clone());
    let report = report::save_at(out, &report)?;

    Ok(PipelineSummary {
        outcome,
        archives,
        loose_files,
        report,
        packaging_errors,
    })
}

/// Package `batch` into `path`. An empty batch writes nothing and removes
/// an archive left there by an earlier run. Every failure is confined to
/// this archive.
fn write_archive(batch: &Batch, path: &Path) -> Result<Option<WrittenFile>, PackagingError> {
    let archive_io = |err: BatchError| match err {
        BatchError::Io { path, source } => PackagingError::Io { path, source },
        other => PackagingError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::other(other.to_string()),
        },
    };
    match package(batch)? {
        Some(bytes) => Ok(Some(atomic_write(path, &bytes).map_err(archive_io)?)),
        None => {
            remove_stale(path).map_err(archive_io)?;
            Ok(None)
        }
    }
}
