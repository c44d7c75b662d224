use crate::error::ConvertError;
use crate::{Converter, Fidelity};

/// Emits a minimal placeholder PDF that names its source document. For
/// environments without an office suite; never full fidelity.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubConverter;

impl Converter for StubConverter {
    fn convert(&self, name: &str, _document: &[u8]) -> Result<Vec<u8>, ConvertError> {
        let source = name.replace(['\r', '\n'], " ");
        Ok(format!("%PDF-1.4\n% WCR placeholder: converted from {source}\n%%EOF\n").into_bytes())
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Placeholder
    }
}
