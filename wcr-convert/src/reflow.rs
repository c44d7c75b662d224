//! Re-flow backend: pulls the text of every body paragraph and table row out
//! of `word/document.xml` and typesets it as plain A4 pages with `printpdf`.
//!
//! Styling, images and exact positioning are lost; the result carries the
//! report's content, not its appearance.

use std::io::{BufWriter, Cursor, Read};
use std::sync::LazyLock;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use regex::Regex;
use zip::ZipArchive;

use crate::error::ConvertError;
use crate::{Converter, Fidelity};

static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:tbl[ >].*?</w:tbl>|<w:p[ >].*?</w:p>|<w:p/>")
        .expect("BLOCK regex should compile")
});
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:tr[ >].*?</w:tr>").expect("ROW regex should compile"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:tc[ >].*?</w:tc>").expect("CELL regex should compile"));
static RUN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?: [^>]*)?>(.*?)</w:t>|<w:tab/>").expect("RUN_TEXT regex should compile")
});

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP: Mm = Mm(280.0);
const BOTTOM: Mm = Mm(20.0);
const LEFT: Mm = Mm(20.0);
const LINE_STEP: Mm = Mm(5.0);
const WRAP_CHARS: usize = 95;

/// One line-level unit of extracted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Row(Vec<String>),
}

/// Converts by extracting text and laying it out again.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflowConverter;

impl Converter for ReflowConverter {
    fn convert(&self, name: &str, document: &[u8]) -> Result<Vec<u8>, ConvertError> {
        let xml = read_document_xml(document)?;
        layout(name, &extract_blocks(&xml))
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Reflow
    }
}

fn read_document_xml(document: &[u8]) -> Result<String, ConvertError> {
    let mut archive =
        ZipArchive::new(Cursor::new(document)).map_err(|e| ConvertError::Document(e.to_string()))?;
    let mut part = archive
        .by_name("word/document.xml")
        .map_err(|e| ConvertError::Document(format!("word/document.xml: {e}")))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ConvertError::Document(format!("word/document.xml: {e}")))?;
    Ok(xml)
}

/// Body paragraphs and table rows, in document order.
pub fn extract_blocks(xml: &str) -> Vec<Block> {
    BLOCK
        .find_iter(xml)
        .flat_map(|m| {
            let span = m.as_str();
            if span.starts_with("<w:tbl") {
                ROW.find_iter(span)
                    .map(|row| {
                        Block::Row(CELL.find_iter(row.as_str()).map(|c| run_text(c.as_str())).collect())
                    })
                    .collect::<Vec<_>>()
            } else {
                vec![Block::Paragraph(run_text(span))]
            }
        })
        .collect()
}

fn run_text(xml: &str) -> String {
    let mut text = String::new();
    for caps in RUN_TEXT.captures_iter(xml) {
        match caps.get(1) {
            Some(t) => text.push_str(&unescape(t.as_str())),
            None => text.push('\t'),
        }
    }
    text.trim().to_string()
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&#x2F;", "/")
        .replace("&amp;", "&")
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

struct PageCursor {
    layer: PdfLayerReference,
    y: Mm,
}

impl PageCursor {
    fn line(&mut self, doc: &PdfDocumentReference, text: &str, size: f32, font: &IndirectFontRef) {
        if self.y < BOTTOM {
            let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            self.layer = doc.get_page(page).get_layer(layer);
            self.y = TOP;
        }
        if !text.is_empty() {
            self.layer.use_text(text, size, LEFT, self.y, font);
        }
        self.y -= LINE_STEP;
    }
}

fn layout(title: &str, blocks: &[Block]) -> Result<Vec<u8>, ConvertError> {
    let (doc, page1, layer1) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ConvertError::Pdf(format!("font: {e}")))?;
    let mono = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ConvertError::Pdf(format!("font: {e}")))?;

    let mut cursor = PageCursor {
        layer: doc.get_page(page1).get_layer(layer1),
        y: TOP,
    };
    for block in blocks {
        match block {
            Block::Paragraph(text) => {
                for line in wrap_text(text, WRAP_CHARS) {
                    cursor.line(&doc, &line, 10.0, &font);
                }
            }
            Block::Row(cells) => {
                for line in wrap_text(&cells.join(" | "), WRAP_CHARS) {
                    cursor.line(&doc, &line, 8.5, &mono);
                }
            }
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ConvertError::Pdf(format!("save: {e}")))?;
    buf.into_inner()
        .map_err(|e| ConvertError::Pdf(format!("buffer: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_and_rows_keep_document_order() {
        let xml = concat!(
            "<w:body>",
            "<w:p><w:r><w:t>Title</w:t></w:r></w:p>",
            "<w:tbl><w:tblPr/>",
            "<w:tr><w:tc><w:p><w:r><w:t>1</w:t></w:r></w:p></w:tc>",
            "<w:tc><w:p><w:r><w:t xml:space=\"preserve\">Done</w:t></w:r></w:p></w:tc></w:tr>",
            "</w:tbl>",
            "<w:p/>",
            "<w:p w:rsidR=\"00\"><w:pPr/><w:r><w:t>A &amp; B</w:t></w:r></w:p>",
            "</w:body>",
        );
        assert_eq!(
            extract_blocks(xml),
            vec![
                Block::Paragraph("Title".into()),
                Block::Row(vec!["1".into(), "Done".into()]),
                Block::Paragraph(String::new()),
                Block::Paragraph("A & B".into()),
            ]
        );
    }

    #[test]
    fn split_runs_are_concatenated() {
        let xml = "<w:p><w:r><w:t>Work </w:t></w:r><w:r><w:t>Order</w:t></w:r></w:p>";
        assert_eq!(extract_blocks(xml), vec![Block::Paragraph("Work Order".into())]);
    }

    #[test]
    fn long_text_wraps_on_word_boundaries() {
        let text = "alpha beta gamma delta";
        assert_eq!(wrap_text(text, 11), vec!["alpha beta", "gamma delta"]);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn non_zip_input_is_a_document_error() {
        let err = ReflowConverter.convert("x.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, ConvertError::Document(_)), "got: {err}");
    }

    #[test]
    fn many_lines_spill_onto_further_pages() {
        let blocks: Vec<Block> = (0..200).map(|i| Block::Paragraph(format!("line {i}"))).collect();
        let pdf = layout("long", &blocks).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
