//! Row context builder: reconciler, normalizer and synthesizer composed.

use std::collections::BTreeMap;

use crate::error::RowBuildError;
use crate::normalize::{normalize, normalize_identifier};
use crate::synthesize::{synthesize_markers, LineGroupLayout};
use crate::types::{CanonicalField, CellValue, ColumnName, RowContext};
use crate::vocabulary::{ColumnMapping, Vocabulary};

/// Header mapping computed once per batch and shared by every row.
#[derive(Debug, Clone)]
pub struct PreparedColumns {
    mapping: ColumnMapping,
    identifier: Vec<bool>,
}

impl PreparedColumns {
    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn width(&self) -> usize {
        self.mapping.len()
    }
}

/// Builds [`RowContext`]s from raw rows.
#[derive(Debug, Clone, Default)]
pub struct RowContextBuilder {
    vocabulary: Vocabulary,
    layout: LineGroupLayout,
}

impl RowContextBuilder {
    pub fn new(vocabulary: Vocabulary, layout: LineGroupLayout) -> Self {
        RowContextBuilder { vocabulary, layout }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn layout(&self) -> &LineGroupLayout {
        &self.layout
    }

    /// Reconcile the header row. Call once per batch.
    pub fn prepare(&self, headers: &[ColumnName]) -> PreparedColumns {
        let mapping = self.vocabulary.reconcile(headers);
        let identifier = mapping
            .canonical_fields()
            .map(|field| self.vocabulary.is_identifier(field))
            .collect();
        PreparedColumns { mapping, identifier }
    }

    /// Normalize one row into a context.
    ///
    /// Later columns overwrite earlier ones that reconcile to the same
    /// canonical field. Sequence markers are added last.
    pub fn build(
        &self,
        prepared: &PreparedColumns,
        row: &[CellValue],
    ) -> Result<RowContext, RowBuildError> {
        if row.len() > prepared.width() {
            return Err(RowBuildError::RaggedRow {
                cells: row.len(),
                headers: prepared.width(),
            });
        }

        let mut values: BTreeMap<String, String> = BTreeMap::new();
        let missing = CellValue::Missing;
        for (i, (_, field)) in prepared.mapping.entries().iter().enumerate() {
            let cell = row.get(i).unwrap_or(&missing);
            let text = if prepared.identifier[i] {
                normalize_identifier(cell)
            } else {
                normalize(cell)
            };
            values.insert(field_key(field), text);
        }

        for (key, value) in synthesize_markers(&values, &self.layout) {
            values.insert(key, value);
        }
        Ok(RowContext::from_map(values))
    }
}

fn field_key(field: &CanonicalField) -> String {
    field.as_str().to_owned()
}
