pub mod columns;
pub mod generate;
pub mod inspect;
pub mod template;

use std::path::Path;

use anyhow::{Context, Result};
use wcr_core::{config, InputTable, RowContextBuilder, WcrConfig};

/// Config from `--config`, the default location, or built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<WcrConfig> {
    config::load(explicit).context("failed to load configuration")
}

/// Input table plus the context builder configured for it.
pub fn load_input(input: &Path, config: &WcrConfig) -> Result<(InputTable, RowContextBuilder)> {
    let builder = config
        .context_builder()
        .context("invalid vocabulary or line-group configuration")?;
    let table = wcr_ingest::load_table(input)
        .with_context(|| format!("failed to read '{}'", input.display()))?;
    Ok((table, builder))
}
