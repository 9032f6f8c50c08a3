//! Injected presentation data: label tables, captions and fonts.
//!
//! Nothing user-visible is hard-coded in the compositor. Bank names and
//! property-type labels are looked up by the keys the form stores, captions
//! and number punctuation come from here too, and a missing key falls back to
//! the key itself so an unknown bank still prints something.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::BTreeMap;
use std::path::Path;

pub use ab_glyph::FontArc;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LabelsError {
    #[error("labels file could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("labels JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font file could not be read: {0}")]
    Io(#[from] std::io::Error),
    #[error("font data is invalid: {0}")]
    Invalid(#[from] ab_glyph::InvalidFont),
}

/// Lookup tables and captions rendered onto the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Bank key → display name.
    pub banks: BTreeMap<String, String>,
    /// Property-type key → display label.
    pub property_types: BTreeMap<String, String>,
    pub monthly_payment: String,
    pub interest_rate: String,
    pub initial_payment: String,
    pub total_cost: String,
    /// Appended to every currency amount, e.g. `" ₽"`.
    pub currency_suffix: String,
    /// Appended to the area figure, e.g. `" m²"`.
    pub area_suffix: String,
    pub thousands_separator: String,
    pub decimal_separator: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            banks: BTreeMap::new(),
            property_types: BTreeMap::new(),
            monthly_payment: "Monthly payment".into(),
            interest_rate: "Rate".into(),
            initial_payment: "Initial payment".into(),
            total_cost: "Total cost".into(),
            currency_suffix: " ₽".into(),
            area_suffix: " m²".into(),
            thousands_separator: " ".into(),
            decimal_separator: ",".into(),
        }
    }
}

impl Labels {
    /// Parse labels from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `LabelsError::Json` if the text is not a valid labels object.
    pub fn from_json(text: &str) -> Result<Self, LabelsError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a labels file.
    ///
    /// # Errors
    ///
    /// Returns `LabelsError` if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, LabelsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    #[must_use]
    pub fn bank_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.banks.get(key).map_or(key, String::as_str)
    }

    #[must_use]
    pub fn property_type_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.property_types.get(key).map_or(key, String::as_str)
    }
}

/// Faces used for story text. Without a regular face, text is not drawn.
#[derive(Debug, Clone, Default)]
pub struct Fonts {
    pub regular: Option<FontArc>,
    pub bold: Option<FontArc>,
}

impl Fonts {
    #[must_use]
    pub fn new(regular: Option<FontArc>, bold: Option<FontArc>) -> Self {
        Self { regular, bold }
    }

    /// Bold face, falling back to the regular one.
    #[must_use]
    pub fn heading(&self) -> Option<&FontArc> {
        self.bold.as_ref().or(self.regular.as_ref())
    }

    #[must_use]
    pub fn body(&self) -> Option<&FontArc> {
        self.regular.as_ref().or(self.bold.as_ref())
    }
}

/// Load a TrueType/OpenType font from disk.
///
/// # Errors
///
/// Returns `FontError` if the file is unreadable or not a font.
pub fn load_font(path: &Path) -> Result<FontArc, FontError> {
    let bytes = std::fs::read(path)?;
    Ok(FontArc::try_from_vec(bytes)?)
}

/// Everything the compositor needs besides per-render inputs.
#[derive(Debug, Clone, Default)]
pub struct StoryConfig {
    pub labels: Labels,
    pub fonts: Fonts,
}
