//! WCR: Work Completion Report batch generator.
//!
//! # Usage
//!
//! ```text
//! wcr generate <input> [--template <docx>] [--out <dir>] [--pdf] [--converter office|reflow|stub]
//!              [--no-loose] [--strict] [--json] [--config <yaml>]
//! wcr columns <input> [--json] [--config <yaml>]
//! wcr inspect <input> [--row <n>] [--json] [--config <yaml>]
//! wcr template <path> [--force]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    columns::ColumnsArgs, generate::GenerateArgs, inspect::InspectArgs, template::TemplateArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "wcr",
    version,
    about = "Generate Work Completion Reports from a spreadsheet and a Word template",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one report per row, optionally convert to PDF, and package the results.
    Generate(GenerateArgs),

    /// Show how input headers map onto template fields.
    Columns(ColumnsArgs),

    /// Print the template context built for one input row.
    Inspect(InspectArgs),

    /// Write the built-in sample template.
    Template(TemplateArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => args.run(),
        Commands::Columns(args) => args.run(),
        Commands::Inspect(args) => args.run(),
        Commands::Template(args) => args.run(),
    }
}
