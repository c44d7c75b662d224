//! Batch orchestration: drives every input row through context building,
//! rendering and optional conversion.
//!
//! ## Per-row states
//!
//! | State                    | Document | Converted | Recorded as          |
//! |--------------------------|----------|-----------|----------------------|
//! | Succeeded                | yes      | yes / n.a.| –                    |
//! | Rendered, not converted  | yes      | no        | `ConversionFailed`   |
//! | Failed                   | no       | no        | [`RowFailure`]       |
//!
//! A failing row never stops the batch. Rows are processed sequentially and
//! every batch keeps input row order.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use wcr_convert::{Converter, Fidelity};
use wcr_core::{
    Artifact, ArtifactKind, Batch, InputTable, RowBuildError, RowContext, RowContextBuilder,
};
use wcr_renderer::{DocumentRenderer, RenderError};

/// Prefix shared by every artifact name.
pub const ARTIFACT_PREFIX: &str = "WCR_";

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

/// Why a row produced no document.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Build(#[from] RowBuildError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A row that produced no document.
#[derive(Debug)]
pub struct RowFailure {
    /// 0-based input row.
    pub row_index: usize,
    /// Work-order number, or `Row{n}` when it is unknown or blank.
    pub label: String,
    pub error: RowError,
}

/// Non-fatal per-row conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// The document was kept but has no converted counterpart.
    ConversionFailed { message: String },
    /// The natural name was taken earlier in the batch.
    RenamedDuplicate { original: String, renamed: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWarning {
    pub row_index: usize,
    pub label: String,
    pub kind: WarningKind,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            WarningKind::ConversionFailed { message } => {
                write!(f, "{}: conversion failed: {message}", self.label)
            }
            WarningKind::RenamedDuplicate { original, renamed } => {
                write!(f, "{}: {original} already used, saved as {renamed}", self.label)
            }
        }
    }
}

/// Everything one run produced.
#[derive(Debug)]
pub struct BatchOutcome {
    pub rows: usize,
    pub documents: Batch,
    pub converted: Batch,
    pub failures: Vec<RowFailure>,
    pub warnings: Vec<RowWarning>,
    /// Fidelity of `converted`; `None` when no converter ran.
    pub fidelity: Option<Fidelity>,
}

impl BatchOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// `Row{n}` with a 1-based row number.
pub fn row_label(row_index: usize) -> String {
    format!("Row{}", row_index + 1)
}

/// Replace characters that cannot appear in a file name with `-`.
pub fn sanitize_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// `WCR_{work order}` or `WCR_Row{n}` when the work order is blank.
pub fn artifact_stem(context: &RowContext, row_index: usize) -> String {
    let id = context
        .work_order_number()
        .map(sanitize_component)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| row_label(row_index));
    format!("{ARTIFACT_PREFIX}{id}")
}

fn label_for(context: &RowContext, row_index: usize) -> String {
    context
        .work_order_number()
        .map(str::to_string)
        .unwrap_or_else(|| row_label(row_index))
}

/// Hands out unique stems, suffixing `_2`, `_3`, … on reuse.
#[derive(Debug, Default)]
struct StemAllocator {
    used: HashSet<String>,
}

impl StemAllocator {
    fn allocate(&mut self, natural: String) -> (String, bool) {
        if self.used.insert(natural.clone()) {
            return (natural, false);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{natural}_{n}");
            if self.used.insert(candidate.clone()) {
                return (candidate, true);
            }
            n += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// run_batch
// ---------------------------------------------------------------------------

/// Process every row of `table`.
///
/// With `converter` set, each rendered document is also converted; a
/// conversion failure is a warning and the document still counts.
pub fn run_batch(
    table: &InputTable,
    builder: &RowContextBuilder,
    renderer: &dyn DocumentRenderer,
    converter: Option<&dyn Converter>,
) -> BatchOutcome {
    let prepared = builder.prepare(table.headers());
    let mut outcome = BatchOutcome {
        rows: table.row_count(),
        documents: Batch::new(ArtifactKind::Document),
        converted: Batch::new(ArtifactKind::Converted),
        failures: Vec::new(),
        warnings: Vec::new(),
        fidelity: converter.map(|c| c.fidelity()),
    };
    let mut stems = StemAllocator::default();

    for (row_index, row) in table.rows().iter().enumerate() {
        let context = match builder.build(&prepared, row) {
            Ok(ctx) => ctx,
            Err(e) => {
                let label = row_label(row_index);
                tracing::warn!("{label}: {e}");
                outcome.failures.push(RowFailure {
                    row_index,
                    label,
                    error: e.into(),
                });
                continue;
            }
        };
        tracing::debug!("{}: context with {} fields", row_label(row_index), context.len());
        let label = label_for(&context, row_index);

        let document = match renderer.render(&context) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("{label}: {e}");
                outcome.failures.push(RowFailure {
                    row_index,
                    label,
                    error: e.into(),
                });
                continue;
            }
        };

        let natural = artifact_stem(&context, row_index);
        let (stem, renamed) = stems.allocate(natural.clone());
        let doc_name = format!("{stem}.{}", ArtifactKind::Document.extension());
        if renamed {
            let warning = RowWarning {
                row_index,
                label: label.clone(),
                kind: WarningKind::RenamedDuplicate {
                    original: format!("{natural}.{}", ArtifactKind::Document.extension()),
                    renamed: doc_name.clone(),
                },
            };
            tracing::warn!("{warning}");
            outcome.warnings.push(warning);
        }

        if let Some(converter) = converter {
            match converter.convert(&doc_name, &document) {
                Ok(bytes) => outcome.converted.push(Artifact {
                    name: format!("{stem}.{}", ArtifactKind::Converted.extension()),
                    bytes,
                    row_index,
                }),
                Err(e) => {
                    let warning = RowWarning {
                        row_index,
                        label: label.clone(),
                        kind: WarningKind::ConversionFailed {
                            message: e.to_string(),
                        },
                    };
                    tracing::warn!("{warning}");
                    outcome.warnings.push(warning);
                }
            }
        }

        outcome.documents.push(Artifact {
            name: doc_name,
            bytes: document,
            row_index,
        });
    }

    tracing::info!(
        "batch: {} rows, {} documents, {} converted, {} failed",
        outcome.rows,
        outcome.documents.len(),
        outcome.converted.len(),
        outcome.failures.len()
    );
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("WO-1", "WCR_WO-1")]
    #[case("  WO 7  ", "WCR_WO 7")]
    #[case("A/B\\C", "WCR_A-B-C")]
    #[case("x:y*z?", "WCR_x-y-z-")]
    #[case("1234", "WCR_1234")]
    fn stem_uses_sanitized_work_order(#[case] wo: &str, #[case] expected: &str) {
        let ctx: RowContext = [("wo_no", wo)].into_iter().collect();
        assert_eq!(artifact_stem(&ctx, 0), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_work_order_falls_back_to_row_number(#[case] wo: &str) {
        let ctx: RowContext = [("wo_no", wo)].into_iter().collect();
        assert_eq!(artifact_stem(&ctx, 4), "WCR_Row5");
    }

    #[test]
    fn absent_work_order_falls_back_to_row_number() {
        assert_eq!(artifact_stem(&RowContext::default(), 0), "WCR_Row1");
    }

    #[test]
    fn allocator_suffixes_repeats() {
        let mut stems = StemAllocator::default();
        assert_eq!(stems.allocate("WCR_X".into()), ("WCR_X".into(), false));
        assert_eq!(stems.allocate("WCR_X".into()), ("WCR_X_2".into(), true));
        assert_eq!(stems.allocate("WCR_X".into()), ("WCR_X_3".into(), true));
        assert_eq!(stems.allocate("WCR_Y".into()), ("WCR_Y".into(), false));
    }

    #[test]
    fn allocator_skips_suffixes_taken_by_real_work_orders() {
        let mut stems = StemAllocator::default();
        stems.allocate("WCR_X_2".into());
        stems.allocate("WCR_X".into());
        assert_eq!(stems.allocate("WCR_X".into()), ("WCR_X_3".into(), true));
    }
}
