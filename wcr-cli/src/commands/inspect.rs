//! `wcr inspect`: the template context for a single row.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use super::{load_config, load_input};

/// Arguments for `wcr inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Spreadsheet or CSV to read.
    pub input: PathBuf,

    /// 1-based data row.
    #[arg(long, default_value_t = 1)]
    pub row: usize,

    /// Emit the context as a JSON object.
    #[arg(long)]
    pub json: bool,

    /// Configuration file (YAML).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl InspectArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let (table, builder) = load_input(&self.input, &config)?;
        if self.row == 0 || self.row > table.row_count() {
            bail!(
                "row {} out of range; '{}' has {} data rows",
                self.row,
                self.input.display(),
                table.row_count()
            );
        }

        let prepared = builder.prepare(table.headers());
        let context = builder
            .build(&prepared, &table.rows()[self.row - 1])
            .with_context(|| format!("row {} cannot be used", self.row))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&context)?);
            return Ok(());
        }

        let rows: Vec<FieldRow> = context
            .iter()
            .map(|(field, value)| FieldRow {
                field: field.to_string(),
                value: value.to_string(),
            })
            .collect();
        let mut out = Table::new(rows);
        out.with(Style::rounded());
        println!("{out}");
        Ok(())
    }
}
