//! YAML configuration for batch runs.
//!
//! # Resolution order
//!
//! 1. `--config <path>`: must exist.
//! 2. `<config_dir>/wcr/config.yaml`: used when present.
//! 3. Built-in defaults.
//!
//! # API pattern
//!
//! As with the rest of the workspace, every loader has two forms:
//! - `fn_at(dir: &Path, …)`: explicit base directory; used in tests
//! - `fn(…)`: derives the directory from `dirs::config_dir()`, delegates to `_at`

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::RowContextBuilder;
use crate::error::ConfigError;
use crate::synthesize::LineGroupLayout;
use crate::vocabulary::Vocabulary;

pub const CONFIG_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Converter selection
// ---------------------------------------------------------------------------

/// Which conversion backend to use when conversion is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Office suite running headless.
    #[default]
    Office,
    /// Paragraph/table re-flow renderer.
    Reflow,
    /// Placeholder output for environments without a converter.
    Stub,
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConverterKind::Office => write!(f, "office"),
            ConverterKind::Reflow => write!(f, "reflow"),
            ConverterKind::Stub => write!(f, "stub"),
        }
    }
}

impl FromStr for ConverterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "office" => Ok(ConverterKind::Office),
            "reflow" => Ok(ConverterKind::Reflow),
            "stub" => Ok(ConverterKind::Stub),
            other => Err(format!(
                "unknown converter '{other}'; expected: office, reflow, stub"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeConfig {
    /// Office suite executable.
    #[serde(default = "default_office_program")]
    pub program: String,
    /// Per-document conversion timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        OfficeConfig {
            program: default_office_program(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveNames {
    #[serde(default = "default_documents_archive")]
    pub documents: String,
    #[serde(default = "default_converted_archive")]
    pub converted: String,
}

impl Default for ArchiveNames {
    fn default() -> Self {
        ArchiveNames {
            documents: default_documents_archive(),
            converted: default_converted_archive(),
        }
    }
}

/// Additions merged over the built-in vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VocabularyConfig {
    #[serde(default)]
    pub variants: BTreeMap<String, String>,
    #[serde(default)]
    pub identifier_fields: Vec<String>,
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// Root of `config.yaml`. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WcrConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub convert: bool,
    #[serde(default)]
    pub converter: ConverterKind,
    #[serde(default)]
    pub office: OfficeConfig,
    #[serde(default = "default_true")]
    pub write_loose_files: bool,
    #[serde(default)]
    pub archives: ArchiveNames,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub line_groups: LineGroupLayout,
}

impl Default for WcrConfig {
    fn default() -> Self {
        WcrConfig {
            version: default_version(),
            template: default_template(),
            output_dir: default_output_dir(),
            convert: false,
            converter: ConverterKind::default(),
            office: OfficeConfig::default(),
            write_loose_files: true,
            archives: ArchiveNames::default(),
            vocabulary: VocabularyConfig::default(),
            line_groups: LineGroupLayout::default(),
        }
    }
}

impl WcrConfig {
    /// The built-in vocabulary with this config's additions merged in.
    pub fn vocabulary(&self) -> Result<Vocabulary, ConfigError> {
        Ok(Vocabulary::builtin().extended(
            &self.vocabulary.variants,
            &self.vocabulary.identifier_fields,
        )?)
    }

    /// A context builder for this configuration.
    pub fn context_builder(&self) -> Result<RowContextBuilder, ConfigError> {
        self.line_groups.validate()?;
        Ok(RowContextBuilder::new(
            self.vocabulary()?,
            self.line_groups.clone(),
        ))
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_template() -> PathBuf {
    PathBuf::from("sample.docx")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("Result")
}
fn default_true() -> bool {
    true
}
fn default_office_program() -> String {
    "soffice".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_documents_archive() -> String {
    "WCR_Word_Files.zip".to_string()
}
fn default_converted_archive() -> String {
    "WCR_PDF_Files.zip".to_string()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// `<dir>/wcr/config.yaml`: pure, no I/O.
pub fn default_path_at(config_dir: &Path) -> PathBuf {
    config_dir.join("wcr").join("config.yaml")
}

/// Parse the config file at `path`.
pub fn load_file(path: &Path) -> Result<WcrConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.to_path_buf() });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config: WcrConfig = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.line_groups.validate()?;
    Ok(config)
}

/// Resolve configuration against an explicit config directory.
pub fn load_at(config_dir: &Path, explicit: Option<&Path>) -> Result<WcrConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_file(path);
    }
    let path = default_path_at(config_dir);
    if path.exists() {
        load_file(&path)
    } else {
        Ok(WcrConfig::default())
    }
}

/// `load_at` convenience wrapper. Falls back to defaults when no config
/// directory can be determined.
pub fn load(explicit: Option<&Path>) -> Result<WcrConfig, ConfigError> {
    match dirs::config_dir() {
        Some(dir) => load_at(&dir, explicit),
        None => match explicit {
            Some(path) => load_file(path),
            None => Ok(WcrConfig::default()),
        },
    }
}
