//! Domain types for WCR generation.
//!
//! Cell values are classified once, when a table is read, into [`CellValue`].
//! Everything downstream of the context builder works on display strings only.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A raw header string exactly as it appeared in the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnName(pub String);

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ColumnName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ColumnName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A normalized field identifier, used as a template context key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalField(pub String);

impl CanonicalField {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CanonicalField {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CanonicalField {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// Text markers that read as "no value", matching the NA markers a pandas
/// based reader applies by default.
pub const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// One raw cell, classified at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell or an NA marker.
    Missing,
    /// A date or date-time cell.
    Temporal(NaiveDateTime),
    /// A number. `literal` holds the trimmed source text when the number was
    /// recognised inside a text cell.
    Numeric { value: f64, literal: Option<String> },
    /// Anything else, untrimmed.
    Text(String),
}

impl CellValue {
    /// A numeric cell that did not come from text.
    pub fn number(value: f64) -> Self {
        if value.is_nan() {
            return CellValue::Missing;
        }
        CellValue::Numeric { value, literal: None }
    }

    /// Classify a text cell: NA markers are missing, text that parses as a
    /// float is numeric, everything else stays text.
    pub fn from_text(raw: &str) -> Self {
        if NA_MARKERS.contains(&raw) {
            return CellValue::Missing;
        }
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_nan() => CellValue::Missing,
            Ok(value) => CellValue::Numeric {
                value,
                literal: Some(trimmed.to_owned()),
            },
            Err(_) => CellValue::Text(raw.to_owned()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::Temporal(dt)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::number(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::from_text(s)
    }
}

// ---------------------------------------------------------------------------
// Input table
// ---------------------------------------------------------------------------

/// A header row plus data rows, loaded once per batch.
///
/// Rows shorter than the header are padded with [`CellValue::Missing`] on
/// insertion. Longer rows are stored as read and rejected when their context
/// is built, so one malformed line does not sink the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTable {
    headers: Vec<ColumnName>,
    rows: Vec<Vec<CellValue>>,
}

impl InputTable {
    pub fn new(headers: Vec<ColumnName>) -> Self {
        InputTable { headers, rows: Vec::new() }
    }

    /// Append a data row, padding it to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        if row.len() < self.headers.len() {
            row.resize(self.headers.len(), CellValue::Missing);
        }
        self.rows.push(row);
    }

    pub fn with_rows(headers: Vec<ColumnName>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = InputTable::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn headers(&self) -> &[ColumnName] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop trailing rows in which every cell is missing.
    pub fn trim_trailing_blank_rows(&mut self) {
        while self
            .rows
            .last()
            .is_some_and(|row| row.iter().all(CellValue::is_missing))
        {
            self.rows.pop();
        }
    }
}

// ---------------------------------------------------------------------------
// Row context
// ---------------------------------------------------------------------------

/// Canonical field carrying the work order number.
pub const WORK_ORDER_FIELD: &str = "wo_no";

/// Per-row mapping from canonical field to display text.
///
/// Built by [`crate::context::RowContextBuilder`]; immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RowContext {
    values: BTreeMap<String, String>,
}

impl RowContext {
    pub(crate) fn from_map(values: BTreeMap<String, String>) -> Self {
        RowContext { values }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// The field value, or `""` when the field is absent.
    pub fn get_or_blank(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// The trimmed work order number, `None` when absent or blank.
    pub fn work_order_number(&self) -> Option<&str> {
        self.get(WORK_ORDER_FIELD)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RowContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RowContext {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Kind of generated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Rendered template (`.docx`).
    Document,
    /// Converted counterpart (`.pdf`).
    Converted,
}

impl ArtifactKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Document => "docx",
            ArtifactKind::Converted => "pdf",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Document => write!(f, "document"),
            ArtifactKind::Converted => write!(f, "converted"),
        }
    }
}

/// One generated file, named deterministically from its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
    /// 0-based input row the artifact was produced from.
    pub row_index: usize,
}

/// Ordered artifacts of one kind from a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub kind: ArtifactKind,
    pub artifacts: Vec<Artifact>,
}

impl Batch {
    pub fn new(kind: ArtifactKind) -> Self {
        Batch { kind, artifacts: Vec::new() }
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(ColumnName::from("wo no").to_string(), "wo no");
        assert_eq!(CanonicalField::from("wo_no").to_string(), "wo_no");
    }

    #[test]
    fn from_text_classifies_na_markers_as_missing() {
        for marker in ["", "NaN", "N/A", "null", "#N/A"] {
            assert_eq!(CellValue::from_text(marker), CellValue::Missing, "{marker:?}");
        }
    }

    #[test]
    fn from_text_keeps_numeric_literal() {
        match CellValue::from_text(" 007 ") {
            CellValue::Numeric { value, literal } => {
                assert_eq!(value, 7.0);
                assert_eq!(literal.as_deref(), Some("007"));
            }
            other => panic!("expected numeric, got {other:?}"),
        }
    }

    #[test]
    fn from_text_leaves_words_untrimmed() {
        assert_eq!(
            CellValue::from_text("  Pune site "),
            CellValue::Text("  Pune site ".to_string())
        );
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = InputTable::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec![CellValue::from_text("x")]);
        assert_eq!(table.rows()[0].len(), 3);
        assert!(table.rows()[0][2].is_missing());
    }

    #[test]
    fn trailing_blank_rows_are_dropped() {
        let mut table = InputTable::with_rows(
            vec!["a".into()],
            vec![
                vec![CellValue::Missing],
                vec![CellValue::from_text("x")],
                vec![CellValue::Missing],
                vec![CellValue::Missing],
            ],
        );
        table.trim_trailing_blank_rows();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn work_order_number_ignores_blank() {
        let mut map = BTreeMap::new();
        map.insert(WORK_ORDER_FIELD.to_string(), "  ".to_string());
        assert!(RowContext::from_map(map).work_order_number().is_none());
    }
}
