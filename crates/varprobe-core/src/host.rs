//! The seam between the harness and the font framework under test
//!
//! A [`FontHost`] wraps one platform's font API. The harness never looks
//! inside a font handle; every question about a font goes through the host,
//! and whatever the host answers is what gets reported.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::tag::AxisTag;
use crate::variation::{resolve, Axis, VariationMap};

/// Where a base font comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// The platform's default UI font
    SystemUi,
    /// A font file, handed to the platform as raw bytes
    File(PathBuf),
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemUi => write!(f, "system UI font"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A platform font API that can instantiate variable fonts
pub trait FontHost {
    /// Handle to a font instance at a point size
    type Font;

    /// Host name for diagnostics
    fn name(&self) -> &'static str;

    /// The default UI font at `size`
    fn system_ui_font(&self, size: f64) -> Result<Self::Font>;

    /// A font built from the bytes of `path` at `size`
    fn font_from_file(&self, path: &Path, size: f64) -> Result<Self::Font>;

    fn point_size(&self, font: &Self::Font) -> f64;

    /// Variation axes in the font's own order (empty for static fonts)
    fn axes(&self, font: &Self::Font) -> Vec<Axis>;

    /// The explicit variation overrides the font currently reports
    fn variation(&self, font: &Self::Font) -> VariationMap;

    /// Derive a font carrying `variation` at the original point size
    fn with_variation(&self, font: &Self::Font, variation: &VariationMap) -> Result<Self::Font>;

    /// Whether the platform considers the two handles equal
    fn fonts_equal(&self, a: &Self::Font, b: &Self::Font) -> bool;

    fn open(&self, source: &FontSource, size: f64) -> Result<Self::Font> {
        match source {
            FontSource::SystemUi => self.system_ui_font(size),
            FontSource::File(path) => self.font_from_file(path, size),
        }
    }

    /// Effective value of every axis; see [`resolve`]
    fn resolved_axes(&self, font: &Self::Font) -> Vec<(AxisTag, f64)> {
        resolve(&self.axes(font), &self.variation(font))
    }
}

/// A base font and the label it is reported under
///
/// The font is released when the test case goes out of scope.
pub struct TestCase<F> {
    pub font: F,
    pub label: String,
}

impl<F> TestCase<F> {
    pub fn new(font: F, label: impl Into<String>) -> Self {
        Self {
            font,
            label: label.into(),
        }
    }

    /// Label in the `"<source> @ <size>pt"` form
    pub fn label_for(source: &FontSource, size: f64) -> String {
        format!("{} @ {:.2}pt", source, size)
    }
}
