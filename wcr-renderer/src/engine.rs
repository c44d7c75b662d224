//! Tera rendering engine: the [`DocumentRenderer`] boundary and
//! [`DocxTemplate`].
//!
//! # Templated parts
//!
//! | Part                      | Rendered |
//! |---------------------------|----------|
//! | `word/document.xml`       | yes      |
//! | `word/header*.xml`        | yes      |
//! | `word/footer*.xml`        | yes      |
//! | everything else           | copied   |
//!
//! Part names double as Tera template names, so the `.xml` suffix turns on
//! Tera's autoescaping and context values are emitted XML-safe.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use tera::Tera;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use wcr_core::RowContext;

use crate::context::to_tera_context;
use crate::error::RenderError;
use crate::word_xml::prepare_part;

const DOCUMENT_PART: &str = "word/document.xml";

// ---------------------------------------------------------------------------
// DocumentRenderer
// ---------------------------------------------------------------------------

/// Turns one row context into document bytes.
pub trait DocumentRenderer {
    fn render(&self, context: &RowContext) -> Result<Vec<u8>, RenderError>;
}

// ---------------------------------------------------------------------------
// DocxTemplate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Part {
    Templated { name: String },
    Copied { name: String, bytes: Vec<u8> },
}

impl Part {
    fn name(&self) -> &str {
        match self {
            Part::Templated { name } | Part::Copied { name, .. } => name,
        }
    }
}

fn is_templated_part(name: &str) -> bool {
    name == DOCUMENT_PART
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

/// A `.docx` template compiled once and rendered per row.
///
/// Undefined variables are errors; templates that tolerate absent columns
/// use `{{ field | default(value="") }}`.
pub struct DocxTemplate {
    tera: Tera,
    parts: Vec<Part>,
}

impl DocxTemplate {
    /// Load and compile the template at `path`.
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Compile a template from the bytes of a `.docx` container.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        let mut sources: Vec<(String, String)> = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut raw = Vec::new();
            entry.read_to_end(&mut raw).map_err(RenderError::Buffer)?;

            if is_templated_part(&name) {
                let xml = String::from_utf8(raw)
                    .map_err(|_| RenderError::Encoding { part: name.clone() })?;
                sources.push((name.clone(), prepare_part(&xml)));
                parts.push(Part::Templated { name });
            } else {
                parts.push(Part::Copied { name, bytes: raw });
            }
        }

        if !sources.iter().any(|(name, _)| name == DOCUMENT_PART) {
            return Err(RenderError::NotAWordDocument);
        }

        let mut tera = Tera::default();
        tera.autoescape_on(vec![".xml"]);
        tera.add_raw_templates(sources)?;
        Ok(DocxTemplate { tera, parts })
    }

    /// Names of the parts rendered through Tera, in container order.
    pub fn templated_parts(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Templated { .. }))
            .map(Part::name)
            .collect()
    }
}

impl DocumentRenderer for DocxTemplate {
    fn render(&self, context: &RowContext) -> Result<Vec<u8>, RenderError> {
        let tera_ctx = to_tera_context(context)?;
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for part in &self.parts {
            writer.start_file(part.name(), options)?;
            match part {
                Part::Templated { name } => {
                    let xml = self.tera.render(name, &tera_ctx)?;
                    writer.write_all(xml.as_bytes()).map_err(RenderError::Buffer)?;
                }
                Part::Copied { bytes, .. } => {
                    writer.write_all(bytes).map_err(RenderError::Buffer)?;
                }
            }
        }
        Ok(writer.finish()?.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_template;

    fn read_part(docx: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    fn docx_with(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn header_and_footer_parts_are_templated() {
        assert!(is_templated_part("word/document.xml"));
        assert!(is_templated_part("word/header1.xml"));
        assert!(is_templated_part("word/footer2.xml"));
        assert!(!is_templated_part("word/styles.xml"));
        assert!(!is_templated_part("word/_rels/document.xml.rels"));
    }

    #[test]
    fn sample_template_compiles() {
        let template = DocxTemplate::from_bytes(&sample_template().unwrap()).unwrap();
        assert_eq!(template.templated_parts(), vec!["word/document.xml"]);
    }

    #[test]
    fn copied_parts_are_preserved_byte_for_byte() {
        let bytes = docx_with(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", "<w:t>{{ wo_no }}</w:t>"),
            ("word/styles.xml", "<w:styles>{{ not_rendered }}</w:styles>"),
        ]);
        let template = DocxTemplate::from_bytes(&bytes).unwrap();
        let ctx: RowContext = [("wo_no", "WO-1")].into_iter().collect();
        let out = template.render(&ctx).unwrap();
        assert_eq!(read_part(&out, "word/styles.xml"), "<w:styles>{{ not_rendered }}</w:styles>");
        assert_eq!(read_part(&out, "word/document.xml"), "<w:t>WO-1</w:t>");
        assert_eq!(read_part(&out, "[Content_Types].xml"), "<Types/>");
    }

    #[test]
    fn values_are_xml_escaped() {
        let bytes = docx_with(&[("word/document.xml", "<w:t>{{ Site_Name }}</w:t>")]);
        let template = DocxTemplate::from_bytes(&bytes).unwrap();
        let ctx: RowContext = [("Site_Name", "A & B <North>")].into_iter().collect();
        let xml = read_part(&template.render(&ctx).unwrap(), "word/document.xml");
        assert_eq!(xml, "<w:t>A &amp; B &lt;North&gt;</w:t>");
    }

    #[test]
    fn undefined_variable_is_a_render_error() {
        let bytes = docx_with(&[("word/document.xml", "<w:t>{{ Payment_Terms }}</w:t>")]);
        let template = DocxTemplate::from_bytes(&bytes).unwrap();
        let err = template.render(&RowContext::default()).unwrap_err();
        assert!(matches!(err, RenderError::Tera { .. }), "got: {err}");
        assert!(err.to_string().contains("Payment_Terms"), "got: {err}");
    }

    #[test]
    fn container_without_document_part_is_rejected() {
        let bytes = docx_with(&[("xl/workbook.xml", "<workbook/>")]);
        assert!(matches!(
            DocxTemplate::from_bytes(&bytes),
            Err(RenderError::NotAWordDocument)
        ));
    }

    #[test]
    fn non_zip_bytes_are_an_archive_error() {
        assert!(matches!(
            DocxTemplate::from_bytes(b"plain text"),
            Err(RenderError::Archive(_))
        ));
    }
}
