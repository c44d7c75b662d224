//! # wcr-renderer
//!
//! Fills a Word (`.docx`) template with one [`RowContext`](wcr_core::RowContext)
//! per row. The document XML parts are compiled as Tera templates after a
//! clean-up pass that undoes Word's run splitting; every other part of the
//! container is copied through unchanged.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wcr_renderer::{DocumentRenderer, DocxTemplate};
//! use wcr_core::RowContext;
//!
//! fn render_one(ctx: &RowContext) {
//!     if let Ok(template) = DocxTemplate::from_path(Path::new("sample.docx")) {
//!         if let Ok(bytes) = template.render(ctx) {
//!             println!("{} bytes", bytes.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod sample;
pub mod word_xml;

pub use engine::{DocumentRenderer, DocxTemplate};
pub use error::RenderError;
pub use sample::sample_template;
