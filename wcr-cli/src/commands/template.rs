//! `wcr template`: write the built-in sample template.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

/// Arguments for `wcr template`.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Destination `.docx` path.
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

impl TemplateArgs {
    pub fn run(self) -> Result<()> {
        if self.path.exists() && !self.force {
            bail!(
                "'{}' already exists; pass --force to overwrite",
                self.path.display()
            );
        }
        let bytes = wcr_renderer::sample_template().context("failed to build sample template")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create '{}'", parent.display()))?;
        }
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("failed to write '{}'", self.path.display()))?;
        println!("✓ sample template written to {}", self.path.display());
        Ok(())
    }
}
