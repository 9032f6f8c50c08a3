//! Environment-driven configuration for fonts and label tables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::{Path, PathBuf};

use story_canvas::config::{FontArc, FontError, Fonts, Labels, LabelsError, StoryConfig, load_font};

/// Regular faces tried when `STORY_FONT_PATH` is unset.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Bold faces tried when `STORY_BOLD_FONT_PATH` is unset.
const SYSTEM_BOLD_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("labels {path}: {source}")]
    Labels { path: PathBuf, source: LabelsError },
    #[error("font {path}: {source}")]
    Font { path: PathBuf, source: FontError },
}

/// Paths to presentation resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub labels_path: Option<PathBuf>,
}

impl Config {
    /// Read `STORY_FONT_PATH`, `STORY_BOLD_FONT_PATH` and `STORY_LABELS_PATH`.
    /// Unset or empty variables mean "not configured".
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            font_path: env_path("STORY_FONT_PATH"),
            bold_font_path: env_path("STORY_BOLD_FONT_PATH"),
            labels_path: env_path("STORY_LABELS_PATH"),
        }
    }

    /// Replace any configured path with an explicit one.
    #[must_use]
    pub fn with_overrides(self, font: Option<PathBuf>, bold_font: Option<PathBuf>, labels: Option<PathBuf>) -> Self {
        Self {
            font_path: font.or(self.font_path),
            bold_font_path: bold_font.or(self.bold_font_path),
            labels_path: labels.or(self.labels_path),
        }
    }

    /// Load labels and fonts.
    ///
    /// An explicitly configured file that fails to load is an error. Without
    /// one, labels use their defaults and fonts come from well-known system
    /// locations; if none exists the story renders without text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unreadable or invalid configured file.
    pub fn load(&self) -> Result<StoryConfig, ConfigError> {
        let labels = match &self.labels_path {
            Some(path) => {
                Labels::from_path(path).map_err(|source| ConfigError::Labels { path: path.clone(), source })?
            }
            None => Labels::default(),
        };

        let regular = resolve_font(self.font_path.as_deref(), SYSTEM_FONTS)?;
        let bold = resolve_font(self.bold_font_path.as_deref(), SYSTEM_BOLD_FONTS)?;
        if regular.is_none() && bold.is_none() {
            tracing::warn!("no font found; set STORY_FONT_PATH to render text");
        }

        Ok(StoryConfig { labels, fonts: Fonts::new(regular, bold) })
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn resolve_font(configured: Option<&Path>, fallbacks: &[&str]) -> Result<Option<FontArc>, ConfigError> {
    if let Some(path) = configured {
        let font = load_font(path).map_err(|source| ConfigError::Font { path: path.to_path_buf(), source })?;
        tracing::info!(path = %path.display(), "font loaded");
        return Ok(Some(font));
    }
    for candidate in fallbacks.iter().map(Path::new).filter(|p| p.is_file()) {
        match load_font(candidate) {
            Ok(font) => {
                tracing::info!(path = %candidate.display(), "system font loaded");
                return Ok(Some(font));
            }
            Err(e) => tracing::debug!(path = %candidate.display(), error = %e, "system font skipped"),
        }
    }
    Ok(None)
}
