//! `wcr columns`: header-to-field mapping for an input file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use super::{load_config, load_input};

/// Arguments for `wcr columns`.
#[derive(Args, Debug)]
pub struct ColumnsArgs {
    /// Spreadsheet or CSV to inspect.
    pub input: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Configuration file (YAML).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize, Tabled)]
struct ColumnRow {
    #[tabled(rename = "Column")]
    column: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl ColumnsArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let (table, builder) = load_input(&self.input, &config)?;
        let prepared = builder.prepare(table.headers());
        let mapping = prepared.mapping();
        let collisions = mapping.collisions();
        let variants = builder.vocabulary().variants();

        let rows: Vec<ColumnRow> = mapping
            .entries()
            .iter()
            .map(|(column, field)| {
                let mut notes = Vec::new();
                if !variants.contains_key(column.0.trim()) {
                    notes.push("unmapped");
                }
                if collisions.contains(&field) {
                    notes.push("shared, last column wins");
                }
                if builder.vocabulary().is_identifier(field) {
                    notes.push("verbatim");
                }
                ColumnRow {
                    column: column.0.clone(),
                    field: field.0.clone(),
                    note: notes.join(", "),
                }
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!(
            "{} columns, {} rows, vocabulary v{}",
            rows.len(),
            table.row_count(),
            builder.vocabulary().version()
        );
        let mut out = Table::new(rows);
        out.with(Style::rounded());
        println!("{out}");
        if !collisions.is_empty() {
            println!(
                "{}",
                format!("{} field(s) fed by more than one column", collisions.len()).yellow()
            );
        }
        Ok(())
    }
}
