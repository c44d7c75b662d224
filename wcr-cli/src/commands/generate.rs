//! `wcr generate`: render, convert and package reports for every row.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use wcr_batch::{pipeline, PipelineSummary, WarningKind};
use wcr_core::ConverterKind;

use super::load_config;

/// Arguments for `wcr generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Spreadsheet (.xlsx, .xls, .ods) or CSV with one report per row.
    pub input: PathBuf,

    /// Word template (.docx). Defaults to the configured template.
    #[arg(long, short)]
    pub template: Option<PathBuf>,

    /// Output directory for archives, loose files and the report.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Also convert every document to PDF.
    #[arg(long)]
    pub pdf: bool,

    /// Conversion backend; implies `--pdf`.
    #[arg(long, value_name = "office|reflow|stub")]
    pub converter: Option<ConverterKind>,

    /// Only write the archives, not the individual files.
    #[arg(long)]
    pub no_loose: bool,

    /// Exit non-zero when any row fails.
    #[arg(long)]
    pub strict: bool,

    /// Print the batch report as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,

    /// Configuration file (YAML).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn run(self) -> Result<()> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(out) = self.out {
            config.output_dir = out;
        }
        if let Some(kind) = self.converter {
            config.converter = kind;
            config.convert = true;
        }
        if self.pdf {
            config.convert = true;
        }
        if self.no_loose {
            config.write_loose_files = false;
        }

        let summary = pipeline::run(&config, &self.input)
            .with_context(|| format!("generation failed for '{}'", self.input.display()))?;

        if self.json {
            let report = std::fs::read_to_string(&summary.report)
                .with_context(|| format!("failed to read '{}'", summary.report.display()))?;
            println!("{report}");
        } else {
            print_summary(&summary, &config.output_dir);
        }

        if !summary.packaging_errors.is_empty() {
            bail!("{} archive(s) could not be written", summary.packaging_errors.len());
        }
        if self.strict && summary.outcome.has_failures() {
            bail!("{} row(s) failed (--strict)", summary.outcome.failures.len());
        }
        Ok(())
    }
}

fn print_summary(summary: &PipelineSummary, out: &std::path::Path) {
    let outcome = &summary.outcome;
    let mark = if outcome.has_failures() {
        "!".yellow().bold()
    } else {
        "✓".green().bold()
    };
    println!(
        "{mark} {} of {} rows rendered → {}",
        outcome.documents.len(),
        outcome.rows,
        out.display()
    );

    if let Some(fidelity) = outcome.fidelity {
        let line = format!("  {} converted ({fidelity})", outcome.converted.len());
        if fidelity.is_full() {
            println!("{line}");
        } else {
            println!(
                "{}",
                format!("{line}, not a faithful rendering of the Word documents").yellow()
            );
        }
    }

    for archive in &summary.archives {
        println!("  ▣  {} ({} bytes)", archive.name, archive.size);
    }
    if !summary.loose_files.is_empty() {
        println!("  ✎  {} individual files", summary.loose_files.len());
    }
    println!("  ·  {}", summary.report.display());

    for failure in &outcome.failures {
        println!("{} {}: {}", "✗".red().bold(), failure.label, failure.error);
    }
    for warning in &outcome.warnings {
        let tag = match warning.kind {
            WarningKind::ConversionFailed { .. } => "pdf",
            WarningKind::RenamedDuplicate { .. } => "name",
        };
        println!("{} [{tag}] {warning}", "⚠".yellow());
    }
    for (archive, error) in &summary.packaging_errors {
        println!("{} {archive}: {error}", "✗".red().bold());
    }
}
