//! Batch composition: load inputs from disk, resolve the layout and render.

#[cfg(test)]
#[path = "story_test.rs"]
mod story_test;

use std::path::{Path, PathBuf};

use story_canvas::engine::EngineCore;
use story_canvas::export::{self, ExportError};
use story_canvas::layout::{Layer, Layout};
use story_canvas::property::PropertyData;
use story_canvas::render::{Compositor, Fill, Scene, Surface, new_surface};
use story_canvas::source::SourceImage;

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("parse {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Everything one story render needs.
#[derive(Debug, Default)]
pub struct Inputs {
    pub data: PropertyData,
    pub background: Option<SourceImage>,
    pub floor_plan: Option<SourceImage>,
    /// Persisted rectangles, if any were saved.
    pub layout: Option<Layout>,
    pub fill: Option<Fill>,
}

impl Inputs {
    /// Load inputs from files. Image files are read but decoded lazily; without
    /// a data file the text layers show empty values.
    ///
    /// # Errors
    ///
    /// Returns `StoryError` if a file is unreadable or a JSON file is invalid.
    pub fn load(
        data: Option<&Path>,
        background: Option<&Path>,
        floor_plan: Option<&Path>,
        layout: Option<&Path>,
        fill: Option<Fill>,
    ) -> Result<Self, StoryError> {
        let data = match data {
            Some(path) => {
                let text = read_text(path)?;
                PropertyData::from_json(&text).map_err(|source| StoryError::Json { path: path.to_path_buf(), source })?
            }
            None => PropertyData::default(),
        };
        let layout = match layout {
            Some(path) => {
                let text = read_text(path)?;
                let parsed = serde_json::from_str(&text).map_err(|source| StoryError::Json { path: path.to_path_buf(), source })?;
                Some(parsed)
            }
            None => None,
        };
        Ok(Self {
            data,
            background: background.map(read_image).transpose()?,
            floor_plan: floor_plan.map(read_image).transpose()?,
            layout,
            fill,
        })
    }

    /// Rectangles as the editor would have them: saved values clamped, and
    /// defaults for attached images that have none. An image that does not
    /// decode counts as absent.
    #[must_use]
    pub fn resolved_layout(&self) -> Layout {
        let mut core = EngineCore::new();
        if let Some(saved) = self.layout {
            core.load_layout(saved);
        }
        for (layer, image) in [(Layer::Background, &self.background), (Layer::FloorPlan, &self.floor_plan)] {
            match image.as_ref().and_then(SourceImage::dimensions) {
                Some(dims) => core.attach_image(layer, Some(dims), 0.0),
                None => core.remove_image(layer, 0.0),
            };
        }
        core.layout()
    }

    /// Render the story. `preview` keeps the editing chrome.
    #[must_use]
    pub fn compose(&self, compositor: &Compositor, preview: bool) -> Surface {
        let layout = self.resolved_layout();
        let scene = Scene {
            background: self.background.as_ref(),
            floor_plan: self.floor_plan.as_ref(),
            background_rect: layout.background_rect,
            floor_plan_rect: layout.floor_plan_rect,
            fill: self.fill,
            show_handles: preview,
            ..Scene::new(&self.data)
        };
        if preview {
            let mut surface = new_surface();
            compositor.render(&mut surface, &scene);
            surface
        } else {
            export::render_clean(compositor, &scene)
        }
    }
}

/// Encode `surface` as PNG and write it to `out`.
///
/// # Errors
///
/// Returns `StoryError` if encoding or writing fails.
pub fn write_png(surface: &Surface, out: &Path) -> Result<(), StoryError> {
    let bytes = export::encode_png(surface)?;
    std::fs::write(out, &bytes).map_err(|source| StoryError::Write { path: out.to_path_buf(), source })?;
    tracing::info!(path = %out.display(), bytes = bytes.len(), "story written");
    Ok(())
}

fn read_text(path: &Path) -> Result<String, StoryError> {
    std::fs::read_to_string(path).map_err(|source| StoryError::Read { path: path.to_path_buf(), source })
}

fn read_image(path: &Path) -> Result<SourceImage, StoryError> {
    let bytes = std::fs::read(path).map_err(|source| StoryError::Read { path: path.to_path_buf(), source })?;
    Ok(SourceImage::new(bytes))
}
