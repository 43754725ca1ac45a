//! Reference font host: a framework that keeps its promises
//!
//! Reads variation axes straight from the font's `fvar` table with skrifa and
//! models instances as plain values. Two fonts are equal exactly when they
//! share a face, a point size and a variation, so a sweep against this host
//! never produces a suspect trial. Running the same sweep here and on a
//! platform host shows which differences belong to the platform.
//!
//! Like CoreText, new instances clamp requested coordinates to the axis range,
//! drop axes the face doesn't have, and (with [`OpticalSizing::Auto`]) pin
//! `opsz` to the point size whenever a request leaves it out.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use skrifa::{FontRef, MetadataProvider};

use varprobe_core::{Axis, AxisTag, FontHost, ProbeError, Result, VariationMap};

/// How a fresh instance picks its `opsz` coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpticalSizing {
    /// Track the point size, clamped to the axis range
    #[default]
    Auto,
    /// Leave `opsz` at its default unless requested
    None,
}

/// Parsed face shared by every instance derived from it
#[derive(Debug)]
struct Face {
    axes: Vec<Axis>,
}

/// A face at a point size with explicit axis overrides
#[derive(Debug, Clone)]
pub struct ReferenceFont {
    face: Arc<Face>,
    size: f64,
    variation: VariationMap,
}

#[derive(Debug, Default)]
pub struct ReferenceHost {
    optical_sizing: OpticalSizing,
}

impl ReferenceHost {
    pub fn new(optical_sizing: OpticalSizing) -> Self {
        Self { optical_sizing }
    }

    /// Instantiate a font from raw font bytes (first face of a collection)
    pub fn font_from_bytes(&self, data: &[u8], origin: &str, size: f64) -> Result<ReferenceFont> {
        let font = FontRef::from_index(data, 0).map_err(|e| ProbeError::InvalidFont {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
        let axes = read_axes(&font);
        log::debug!(
            "ReferenceHost: {} has {} axes ({} bytes)",
            origin,
            axes.len(),
            data.len()
        );
        Ok(self.font_from_axes(axes, size))
    }

    /// Instantiate a font for an in-memory face with the given axes
    pub fn font_from_axes(&self, axes: Vec<Axis>, size: f64) -> ReferenceFont {
        let face = Arc::new(Face { axes });
        let variation = self.auto_opsz(&face, size).into_iter().collect();
        ReferenceFont {
            face,
            size,
            variation,
        }
    }

    fn auto_opsz(&self, face: &Face, size: f64) -> Option<(AxisTag, f64)> {
        if self.optical_sizing != OpticalSizing::Auto {
            return None;
        }
        face.axes
            .iter()
            .find(|axis| axis.tag == AxisTag::OPSZ)
            .map(|axis| (AxisTag::OPSZ, axis.clamp(size)))
    }
}

fn read_axes(font: &FontRef) -> Vec<Axis> {
    font.axes()
        .iter()
        .map(|axis| {
            let name = font
                .localized_strings(axis.name_id())
                .english_or_first()
                .map(|s| s.to_string());
            Axis {
                tag: AxisTag::new(axis.tag().to_be_bytes()),
                name,
                min: axis.min_value() as f64,
                default: axis.default_value() as f64,
                max: axis.max_value() as f64,
            }
        })
        .collect()
}

impl FontHost for ReferenceHost {
    type Font = ReferenceFont;

    fn name(&self) -> &'static str {
        "reference"
    }

    fn system_ui_font(&self, _size: f64) -> Result<ReferenceFont> {
        Err(ProbeError::Unsupported {
            host: "reference",
            what: "the system UI font".to_string(),
        })
    }

    fn font_from_file(&self, path: &Path, size: f64) -> Result<ReferenceFont> {
        let file = File::open(path).map_err(|e| ProbeError::FontOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| ProbeError::FontOpen {
                path: path.to_path_buf(),
                source: e,
            })?
        };
        self.font_from_bytes(&mmap, &path.display().to_string(), size)
    }

    fn point_size(&self, font: &ReferenceFont) -> f64 {
        font.size
    }

    fn axes(&self, font: &ReferenceFont) -> Vec<Axis> {
        font.face.axes.clone()
    }

    fn variation(&self, font: &ReferenceFont) -> VariationMap {
        font.variation.clone()
    }

    fn with_variation(
        &self,
        font: &ReferenceFont,
        requested: &VariationMap,
    ) -> Result<ReferenceFont> {
        let mut variation = VariationMap::new();
        for (tag, value) in requested.iter() {
            match font.face.axes.iter().find(|axis| axis.tag == tag) {
                Some(axis) => {
                    let clamped = axis.clamp(value);
                    if clamped != value {
                        log::debug!("ReferenceHost: {} clamped {} -> {}", tag, value, clamped);
                    }
                    variation.insert(tag, clamped);
                },
                None => log::debug!("ReferenceHost: dropping unknown axis {}", tag),
            }
        }
        if !requested.contains(AxisTag::OPSZ) {
            if let Some((tag, value)) = self.auto_opsz(&font.face, font.size) {
                variation.insert(tag, value);
            }
        }

        Ok(ReferenceFont {
            face: Arc::clone(&font.face),
            size: font.size,
            variation,
        })
    }

    fn fonts_equal(&self, a: &ReferenceFont, b: &ReferenceFont) -> bool {
        Arc::ptr_eq(&a.face, &b.face)
            && a.size.to_bits() == b.size.to_bits()
            && a.variation == b.variation
    }
}
