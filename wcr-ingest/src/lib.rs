//! Table loading for `wcr-ingest`.
//!
//! `load_table(path)` reads the first worksheet of a spreadsheet (or a CSV
//! file) into an [`InputTable`]. The first row is the header. Every cell is
//! classified once here into a [`CellValue`]; nothing downstream re-inspects
//! raw input.
//!
//! Format is chosen by file extension:
//!
//! | Extension                        | Reader     |
//! |----------------------------------|------------|
//! | `xlsx`, `xlsm`, `xlsb`, `xls`, `ods` | calamine |
//! | `csv`                            | csv        |

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use wcr_core::types::{CellValue, ColumnName, InputTable};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Csv,
}

/// Errors from table loading.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read spreadsheet {path}: {source}")]
    Spreadsheet {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' contains no worksheets")]
    NoWorksheet { path: PathBuf },

    #[error("'{path}' has no header row")]
    MissingHeader { path: PathBuf },

    #[error("unsupported input format for '{path}'; expected .xlsx, .xlsm, .xlsb, .xls, .ods or .csv")]
    UnsupportedFormat { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Infer the input format from the file extension (case-insensitive).
pub fn detect_format(path: &Path) -> Option<InputFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(InputFormat::Spreadsheet),
        "csv" => Some(InputFormat::Csv),
        _ => None,
    }
}

/// Load the table at `path`. Trailing all-blank rows are dropped.
pub fn load_table(path: &Path) -> Result<InputTable, IngestError> {
    if !path.exists() {
        return Err(IngestError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        });
    }
    let mut table = match detect_format(path) {
        Some(InputFormat::Spreadsheet) => load_spreadsheet(path)?,
        Some(InputFormat::Csv) => load_csv(path)?,
        None => {
            return Err(IngestError::UnsupportedFormat { path: path.to_path_buf() });
        }
    };
    table.trim_trailing_blank_rows();
    tracing::debug!(
        "loaded {} rows x {} columns from {}",
        table.row_count(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Spreadsheets
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path) -> Result<InputTable, IngestError> {
    let spreadsheet_err = |source| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(spreadsheet_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::NoWorksheet { path: path.to_path_buf() })?
        .map_err(spreadsheet_err)?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| IngestError::MissingHeader { path: path.to_path_buf() })?;
    let headers = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| header_from_data(i, cell))
        .collect();

    let mut table = InputTable::new(headers);
    for row in rows {
        table.push_row(row.iter().map(cell_from_data).collect());
    }
    Ok(table)
}

/// Header text for a spreadsheet cell. Blank headers are named
/// `Unnamed: {index}`.
pub fn header_from_data(index: usize, cell: &Data) -> ColumnName {
    let text = match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        ColumnName::from(format!("Unnamed: {index}"))
    } else {
        ColumnName::from(text)
    }
}

/// Classify one spreadsheet cell.
pub fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Missing,
        Data::Int(i) => CellValue::number(*i as f64),
        Data::Float(f) => CellValue::number(*f),
        Data::Bool(b) => CellValue::number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => CellValue::from_text(s),
        Data::DateTime(dt) => {
            if dt.is_duration() || dt.as_f64() < 1.0 {
                match dt.as_datetime() {
                    Some(value) => CellValue::Text(value.time().format("%H:%M:%S").to_string()),
                    None => CellValue::number(dt.as_f64()),
                }
            } else {
                match dt.as_datetime() {
                    Some(value) => CellValue::Temporal(value),
                    None => CellValue::number(dt.as_f64()),
                }
            }
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Temporal)
            .unwrap_or_else(|| CellValue::from_text(s)),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::from_text(&e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<InputTable, IngestError> {
    let csv_err = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let raw_headers = reader.headers().map_err(csv_err)?.clone();
    if raw_headers.is_empty() {
        return Err(IngestError::MissingHeader { path: path.to_path_buf() });
    }
    let headers = raw_headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            if h.trim().is_empty() {
                ColumnName::from(format!("Unnamed: {i}"))
            } else {
                ColumnName::from(h)
            }
        })
        .collect();

    let mut table = InputTable::new(headers);
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        table.push_row(record.iter().map(CellValue::from_text).collect());
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(detect_format(Path::new("in.XLSX")), Some(InputFormat::Spreadsheet));
        assert_eq!(detect_format(Path::new("in.csv")), Some(InputFormat::Csv));
        assert_eq!(detect_format(Path::new("in.txt")), None);
        assert_eq!(detect_format(Path::new("noext")), None);
    }

    #[test]
    fn spreadsheet_scalars_are_classified() {
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Missing);
        assert_eq!(cell_from_data(&Data::Float(5.0)), CellValue::number(5.0));
        assert_eq!(cell_from_data(&Data::Int(7)), CellValue::number(7.0));
        assert_eq!(cell_from_data(&Data::Bool(true)), CellValue::number(1.0));
        assert_eq!(
            cell_from_data(&Data::String("N/A".into())),
            CellValue::Missing
        );
        assert_eq!(
            cell_from_data(&Data::String("Site B".into())),
            CellValue::Text("Site B".into())
        );
    }

    #[test]
    fn iso_dates_become_temporal() {
        let cell = cell_from_data(&Data::DateTimeIso("2024-03-07".into()));
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(cell, CellValue::Temporal(expected));
    }

    #[test]
    fn blank_headers_get_positional_names() {
        assert_eq!(header_from_data(3, &Data::Empty).0, "Unnamed: 3");
        assert_eq!(header_from_data(0, &Data::Float(2024.0)).0, "2024");
        assert_eq!(header_from_data(1, &Data::String("wo no".into())).0, "wo no");
    }
}
