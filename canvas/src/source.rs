//! Source images: encoded bytes from the upload layer and their decoded bitmaps.
//!
//! Uploads are queued undecoded. Decoding runs later, outside pointer
//! handling, and each upload carries a `PassTag` from its layer's sequencer.
//! A decode that finishes after a newer upload or a removal on the same
//! layer is dropped, so an old image can never replace a newer one.

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;

use std::cell::OnceCell;
use std::collections::VecDeque;

use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap};

use crate::layout::Layer;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("image source is empty")]
    Empty,
    #[error("image has zero width or height")]
    ZeroSized,
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode encoded bytes (PNG, JPEG, WebP) into an RGBA bitmap.
///
/// # Errors
///
/// Returns `DecodeError` for empty input, undecodable data, or a 0×0 image.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    let bitmap = image::load_from_memory(bytes)?.to_rgba8();
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return Err(DecodeError::ZeroSized);
    }
    Ok(bitmap)
}

/// Convert a straight-alpha bitmap into a premultiplied pixmap.
#[must_use]
pub fn to_pixmap(bitmap: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(bitmap.width(), bitmap.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(bitmap.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// An uploaded image. Decoding happens on first use and the outcome is kept,
/// so repeated renders during a drag do not decode again.
#[derive(Debug, Default)]
pub struct SourceImage {
    bytes: Vec<u8>,
    decoded: OnceCell<Option<Pixmap>>,
}

impl SourceImage {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, decoded: OnceCell::new() }
    }

    /// Wrap an already decoded bitmap.
    #[must_use]
    pub fn from_bitmap(bitmap: &RgbaImage) -> Self {
        Self { bytes: Vec::new(), decoded: OnceCell::from(to_pixmap(bitmap)) }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The decoded bitmap, or `None` if decoding failed. Failures are logged once.
    #[must_use]
    pub fn bitmap(&self) -> Option<&Pixmap> {
        self.decoded
            .get_or_init(|| match decode(&self.bytes) {
                Ok(bitmap) => to_pixmap(&bitmap),
                Err(e) => {
                    tracing::warn!(error = %e, len = self.bytes.len(), "source image could not be decoded");
                    None
                }
            })
            .as_ref()
    }

    /// Pixel size of the decoded bitmap.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.bitmap().map(|p| (p.width(), p.height()))
    }
}

// =============================================================
// Pass sequencing
// =============================================================

/// Identifies one upload to a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PassTag(u64);

/// Hands out increasing tags so a late decode never replaces a newer one.
#[derive(Debug, Default)]
pub struct PassSequencer {
    latest: u64,
}

impl PassSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pass. Any earlier tag becomes stale.
    pub fn begin(&mut self) -> PassTag {
        self.latest += 1;
        PassTag(self.latest)
    }

    /// Whether work done under `tag` may still be applied.
    #[must_use]
    pub fn is_current(&self, tag: PassTag) -> bool {
        tag.0 == self.latest
    }
}

// =============================================================
// Deferred decoding
// =============================================================

/// An upload waiting to be decoded.
#[derive(Debug)]
pub struct DecodeJob {
    layer: Layer,
    tag: PassTag,
    image: SourceImage,
}

impl DecodeJob {
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    #[must_use]
    pub fn tag(&self) -> PassTag {
        self.tag
    }

    /// Decode the bytes. This is the expensive step.
    #[must_use]
    pub fn run(self) -> Decoded {
        let dims = self.image.dimensions();
        Decoded { layer: self.layer, tag: self.tag, image: self.image, dims }
    }
}

/// A finished decode that has not been applied yet.
#[derive(Debug)]
pub struct Decoded {
    layer: Layer,
    tag: PassTag,
    image: SourceImage,
    dims: Option<(u32, u32)>,
}

/// What applying a finished decode did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The layer now shows the new image.
    Ready { layer: Layer, dims: (u32, u32) },
    /// The bytes are not a usable image. The layer keeps what it had.
    Failed { layer: Layer },
    /// A newer upload or a removal on the layer came first.
    Stale { layer: Layer },
}

/// The image shown on each layer, plus uploads still waiting to decode.
#[derive(Debug, Default)]
pub struct LayerSources {
    shown: [Option<SourceImage>; 2],
    passes: [PassSequencer; 2],
    queue: VecDeque<DecodeJob>,
}

impl LayerSources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue encoded bytes for `layer`. Nothing is decoded here.
    pub fn upload(&mut self, layer: Layer, bytes: Vec<u8>) -> PassTag {
        let tag = self.passes[layer.slot()].begin();
        self.queue.push_back(DecodeJob { layer, tag, image: SourceImage::new(bytes) });
        tag
    }

    /// Drop the shown image and any decode still in flight for `layer`.
    pub fn remove(&mut self, layer: Layer) {
        self.passes[layer.slot()].begin();
        self.shown[layer.slot()] = None;
    }

    /// Oldest queued upload that is still the newest for its layer.
    pub fn next_job(&mut self) -> Option<DecodeJob> {
        while let Some(job) = self.queue.pop_front() {
            if self.passes[job.layer.slot()].is_current(job.tag) {
                return Some(job);
            }
            tracing::debug!(layer = ?job.layer, tag = ?job.tag, "superseded upload skipped");
        }
        None
    }

    /// Apply a finished decode unless a newer upload or removal superseded it.
    pub fn complete(&mut self, decoded: Decoded) -> Completion {
        let Decoded { layer, tag, image, dims } = decoded;
        if !self.passes[layer.slot()].is_current(tag) {
            tracing::debug!(?layer, ?tag, "stale decode dropped");
            return Completion::Stale { layer };
        }
        match dims {
            Some(dims) => {
                self.shown[layer.slot()] = Some(image);
                Completion::Ready { layer, dims }
            }
            None => {
                tracing::debug!(?layer, "layer left unchanged after failed decode");
                Completion::Failed { layer }
            }
        }
    }

    /// Decode and apply every queued upload, oldest first.
    pub fn decode_pending(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Some(job) = self.next_job() {
            let decoded = job.run();
            done.push(self.complete(decoded));
        }
        done
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// The decoded image currently shown on `layer`.
    #[must_use]
    pub fn get(&self, layer: Layer) -> Option<&SourceImage> {
        self.shown[layer.slot()].as_ref()
    }
}
