//! Built-in sample template.
//!
//! A minimal Word document carrying every variable the default vocabulary
//! produces, with one conditional table row per line group. `wcr template`
//! writes it out as a starting point.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::RenderError;

const SAMPLE_PARTS: &[(&str, &str)] = &[
    ("[Content_Types].xml", include_str!("templates/content_types.xml")),
    ("_rels/.rels", include_str!("templates/rels.xml")),
    ("word/document.xml", include_str!("templates/document.xml")),
];

/// Assemble the sample `.docx` container.
pub fn sample_template() -> Result<Vec<u8>, RenderError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in SAMPLE_PARTS {
        writer.start_file(*name, options)?;
        writer
            .write_all(body.as_bytes())
            .map_err(RenderError::Buffer)?;
    }
    Ok(writer.finish()?.into_inner())
}
