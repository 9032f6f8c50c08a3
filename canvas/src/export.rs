//! Clean export: render without editing chrome and encode as PNG.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::io::Cursor;

use image::ImageFormat;

use crate::render::{Compositor, Scene, Surface, new_surface};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("png encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render `scene` into a fresh offscreen surface with handles and borders off.
#[must_use]
pub fn render_clean(compositor: &Compositor, scene: &Scene<'_>) -> Surface {
    let mut surface = new_surface();
    compositor.render(&mut surface, &Scene { show_handles: false, ..*scene });
    surface
}

/// Encode a rendered surface as PNG.
///
/// # Errors
///
/// Returns `ExportError::Encode` if the encoder rejects the buffer.
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    let mut out = Cursor::new(Vec::new());
    surface.write_to(&mut out, ImageFormat::Png)?;
    tracing::debug!(bytes = out.get_ref().len(), "story exported");
    Ok(out.into_inner())
}
