//! Template context: the rendering payload built from a [`RowContext`].

use wcr_core::RowContext;

use crate::error::RenderError;

/// Convert a row context to a [`tera::Context`]. Every key becomes a
/// top-level template variable holding its display string.
pub fn to_tera_context(row: &RowContext) -> Result<tera::Context, RenderError> {
    tera::Context::from_serialize(row).map_err(RenderError::from)
}
