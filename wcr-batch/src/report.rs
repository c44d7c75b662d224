//! Batch report: `WCR_report.json` beside the archives.
//!
//! Records what one run produced (name, size and SHA-256 per file), which
//! rows failed or raised warnings, and the fidelity of converted output.
//! Saved with the same `.tmp` + rename pattern as every other output.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use wcr_convert::Fidelity;

use crate::error::{io_err, BatchError};
use crate::orchestrator::{BatchOutcome, WarningKind};
use crate::writer::WrittenFile;

pub const REPORT_FILE: &str = "WCR_report.json";

#[derive(Debug, Clone, Serialize)]
pub struct ReportFailure {
    pub row: usize,
    pub label: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportWarning {
    pub row: usize,
    pub label: String,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub fidelity: Fidelity,
    pub full_fidelity: bool,
}

/// On-disk report payload. Row numbers are 1-based.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub template: String,
    pub rows: usize,
    pub conversion: Option<ConversionSummary>,
    pub archives: Vec<WrittenFile>,
    pub documents: Vec<WrittenFile>,
    pub converted: Vec<WrittenFile>,
    pub failures: Vec<ReportFailure>,
    pub warnings: Vec<ReportWarning>,
}

impl BatchReport {
    /// Assemble the report for `outcome`. `documents` and `converted`
    /// describe the artifacts even when no loose copies were written.
    pub fn new(
        input: &Path,
        template: &Path,
        outcome: &BatchOutcome,
        archives: Vec<WrittenFile>,
    ) -> Self {
        let describe = |batch: &wcr_core::Batch| {
            batch
                .artifacts
                .iter()
                .map(|a| WrittenFile {
                    path: PathBuf::from(&a.name),
                    name: a.name.clone(),
                    size: a.bytes.len() as u64,
                    sha256: crate::writer::digest(&a.bytes),
                })
                .collect()
        };
        BatchReport {
            generated_at: Utc::now(),
            input: input.display().to_string(),
            template: template.display().to_string(),
            rows: outcome.rows,
            conversion: outcome.fidelity.map(|fidelity| ConversionSummary {
                fidelity,
                full_fidelity: fidelity.is_full(),
            }),
            archives,
            documents: describe(&outcome.documents),
            converted: describe(&outcome.converted),
            failures: outcome
                .failures
                .iter()
                .map(|f| ReportFailure {
                    row: f.row_index + 1,
                    label: f.label.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            warnings: outcome
                .warnings
                .iter()
                .map(|w| {
                    let (kind, message) = match &w.kind {
                        WarningKind::ConversionFailed { message } => {
                            ("conversion_failed", message.clone())
                        }
                        WarningKind::RenamedDuplicate { original, renamed } => {
                            ("renamed_duplicate", format!("{original} -> {renamed}"))
                        }
                    };
                    ReportWarning {
                        row: w.row_index + 1,
                        label: w.label.clone(),
                        kind,
                        message,
                    }
                })
                .collect(),
        }
    }
}

/// `<dir>/WCR_report.json`
pub fn report_path_at(dir: &Path) -> PathBuf {
    dir.join(REPORT_FILE)
}

/// Save the report atomically under `dir`.
pub fn save_at(dir: &Path, report: &BatchReport) -> Result<PathBuf, BatchError> {
    let path = report_path_at(dir);
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(report)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}
