//! # wcr-convert
//!
//! Turns a rendered Word document into PDF. One capability trait,
//! [`Converter`], three backends chosen by [`ConverterKind`]:
//!
//! | Kind     | Backend             | Fidelity      |
//! |----------|---------------------|---------------|
//! | `office` | [`OfficeConverter`] | `Native`      |
//! | `reflow` | [`ReflowConverter`] | `Reflow`      |
//! | `stub`   | [`StubConverter`]   | `Placeholder` |
//!
//! Anything below `Native` is flagged wherever converted files are reported.

pub mod error;
pub mod office;
pub mod reflow;
pub mod stub;

use std::fmt;

use serde::Serialize;
use wcr_core::config::OfficeConfig;
use wcr_core::ConverterKind;

pub use error::ConvertError;
pub use office::OfficeConverter;
pub use reflow::ReflowConverter;
pub use stub::StubConverter;

/// How faithfully converted output reproduces the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fidelity {
    Native,
    Reflow,
    Placeholder,
}

impl Fidelity {
    pub fn is_full(self) -> bool {
        self == Fidelity::Native
    }
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Fidelity::Native => "native",
            Fidelity::Reflow => "reflow",
            Fidelity::Placeholder => "placeholder",
        };
        f.write_str(s)
    }
}

/// Document-to-PDF conversion. `name` is the source artifact name and is
/// only used for titles and diagnostics.
pub trait Converter {
    fn convert(&self, name: &str, document: &[u8]) -> Result<Vec<u8>, ConvertError>;

    fn fidelity(&self) -> Fidelity;
}

/// Construct the backend for `kind`.
pub fn build_converter(kind: ConverterKind, office: &OfficeConfig) -> Box<dyn Converter> {
    match kind {
        ConverterKind::Office => Box::new(OfficeConverter::new(office)),
        ConverterKind::Reflow => Box::new(ReflowConverter),
        ConverterKind::Stub => Box::new(StubConverter),
    }
}
